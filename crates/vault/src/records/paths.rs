//! Navigation of sensitive-field paths inside JSON records.
//!
//! Paths use dot notation; an array is expanded with a `[]` suffix, e.g.
//! `"prescriptions[].medication"`.

/// Segments of a dot-notation field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Navigate into an object property by name.
    Key(String),
    /// Expand into every element of a JSON array.
    ArrayItem,
}

/// Parse a dot-notation path into a list of [`PathSegment`]s.
///
/// `"orders[].card_number"` → `[Key("orders"), ArrayItem, Key("card_number")]`.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        if let Some(key) = part.strip_suffix("[]") {
            segments.push(PathSegment::Key(key.to_owned()));
            segments.push(PathSegment::ArrayItem);
        } else {
            segments.push(PathSegment::Key(part.to_owned()));
        }
    }
    segments
}

/// Replace every string leaf reached by `segments` with `transform(leaf)`.
///
/// Missing keys, type mismatches and non-string leaves are skipped. The first
/// transform error aborts the walk; leaves already replaced stay replaced, so
/// callers should discard `value` on error.
pub fn transform_at_path<E, F>(
    value: &mut serde_json::Value,
    segments: &[PathSegment],
    transform: &mut F,
) -> Result<(), E>
where
    F: FnMut(&str) -> Result<String, E>,
{
    let Some((head, rest)) = segments.split_first() else {
        if let serde_json::Value::String(s) = value {
            *s = transform(s)?;
        }
        return Ok(());
    };

    match head {
        PathSegment::Key(key) => {
            if let Some(child) = value.as_object_mut().and_then(|map| map.get_mut(key)) {
                transform_at_path(child, rest, transform)?;
            }
        }
        PathSegment::ArrayItem => {
            if let Some(items) = value.as_array_mut() {
                for item in items.iter_mut() {
                    transform_at_path(item, rest, transform)?;
                }
            }
        }
    }
    Ok(())
}

/// Apply `transform` to every string leaf named by any of `paths`.
pub fn transform_fields<'p, E, F>(
    value: &mut serde_json::Value,
    paths: impl IntoIterator<Item = &'p String>,
    mut transform: F,
) -> Result<(), E>
where
    F: FnMut(&str) -> Result<String, E>,
{
    for path in paths {
        let segments = parse_path(path);
        transform_at_path(value, &segments, &mut transform)?;
    }
    Ok(())
}

/// Whether any leaf reached by `segments` is neither a string nor `null`.
fn has_non_string_leaf(value: &serde_json::Value, segments: &[PathSegment]) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        return !(value.is_string() || value.is_null());
    };

    match head {
        PathSegment::Key(key) => value
            .get(key.as_str())
            .is_some_and(|child| has_non_string_leaf(child, rest)),
        PathSegment::ArrayItem => value
            .as_array()
            .is_some_and(|items| items.iter().any(|item| has_non_string_leaf(item, rest))),
    }
}

/// Return the first path in `paths` that reaches a leaf which is neither a
/// string nor `null`.
///
/// [`transform_fields`] skips such leaves, so encrypting callers must reject
/// the record instead of persisting those values in the clear.
pub fn first_non_string_leaf<'p>(
    value: &serde_json::Value,
    paths: impl IntoIterator<Item = &'p String>,
) -> Option<&'p String> {
    paths
        .into_iter()
        .find(|path| has_non_string_leaf(value, &parse_path(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::convert::Infallible;

    fn upper(s: &str) -> Result<String, Infallible> {
        Ok(s.to_uppercase())
    }

    fn paths(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_path_flat() {
        assert_eq!(parse_path("ssn"), vec![PathSegment::Key("ssn".into())]);
    }

    #[test]
    fn parse_path_nested() {
        assert_eq!(parse_path("insurance.policy.number").len(), 3);
    }

    #[test]
    fn parse_path_array() {
        let segs = parse_path("prescriptions[].medication");
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[1], PathSegment::ArrayItem);
    }

    #[test]
    fn transforms_flat_field_only() {
        let mut val = json!({"ssn": "abc", "name": "Alice"});
        transform_fields(&mut val, &paths(&["ssn"]), upper).unwrap();
        assert_eq!(val["ssn"], "ABC");
        assert_eq!(val["name"], "Alice");
    }

    #[test]
    fn transforms_nested_field() {
        let mut val = json!({"insurance": {"policy_number": "pn-1"}});
        transform_fields(&mut val, &paths(&["insurance.policy_number"]), upper).unwrap();
        assert_eq!(val["insurance"]["policy_number"], "PN-1");
    }

    #[test]
    fn transforms_every_array_element() {
        let mut val = json!({
            "prescriptions": [
                {"medication": "metformin", "dose": "500mg"},
                {"medication": "lisinopril", "dose": "10mg"}
            ]
        });
        transform_fields(&mut val, &paths(&["prescriptions[].medication"]), upper).unwrap();
        assert_eq!(val["prescriptions"][0]["medication"], "METFORMIN");
        assert_eq!(val["prescriptions"][1]["medication"], "LISINOPRIL");
        assert_eq!(val["prescriptions"][0]["dose"], "500mg");
    }

    #[test]
    fn missing_and_non_string_fields_are_noops() {
        let mut val = json!({"name": "Bob", "ssn": 123456789, "notes": null});
        transform_fields(&mut val, &paths(&["ssn", "notes", "diagnosis"]), upper).unwrap();
        assert_eq!(val, json!({"name": "Bob", "ssn": 123456789, "notes": null}));
    }

    #[test]
    fn finds_numeric_leaf_at_sensitive_path() {
        let val = json!({"ssn": "123-45-6789", "emergency_contact": {"phone": 5551234}});
        let list = paths(&["ssn", "emergency_contact.phone"]);
        assert_eq!(
            first_non_string_leaf(&val, &list).map(String::as_str),
            Some("emergency_contact.phone")
        );
    }

    #[test]
    fn finds_non_string_array_element() {
        let val = json!({"prescriptions": [{"medication": "metformin"}, {"medication": {"name": "x"}}]});
        let list = paths(&["prescriptions[].medication"]);
        assert!(first_non_string_leaf(&val, &list).is_some());
    }

    #[test]
    fn strings_nulls_and_missing_fields_pass() {
        let val = json!({"ssn": "123", "notes": null, "prescriptions": []});
        let list = paths(&["ssn", "notes", "diagnosis", "prescriptions[].medication"]);
        assert_eq!(first_non_string_leaf(&val, &list), None);
    }

    #[test]
    fn first_error_aborts() {
        let mut val = json!({"a": "x", "b": "y"});
        let mut calls = 0;
        let result: Result<(), &str> = transform_fields(&mut val, &paths(&["a", "b"]), |_| {
            calls += 1;
            Err("boom")
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(calls, 1);
    }
}
