//! [`FieldCatalog`]: which fields of each record type are encrypted at rest.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Set of dot-notation paths that are sensitive for one record type.
pub type SensitivePaths = BTreeSet<String>;

/// Errors from loading or querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read field catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse field catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("record type {0} lists an empty field path")]
    EmptyPath(String),

    #[error("unknown record type: {0}")]
    UnknownRecordType(String),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    record_types: BTreeMap<String, Vec<String>>,
}

/// Immutable map from record type to its sensitive field paths.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    record_types: BTreeMap<String, SensitivePaths>,
}

impl FieldCatalog {
    /// The EHR defaults used when no catalog file is configured.
    pub fn builtin() -> Self {
        let mut record_types = BTreeMap::new();
        record_types.insert(
            "patient".to_owned(),
            to_set(&["ssn", "insurance.policy_number", "emergency_contact.phone"]),
        );
        record_types.insert(
            "medical_record".to_owned(),
            to_set(&["diagnosis", "treatment", "notes", "prescriptions[].medication"]),
        );
        Self { record_types }
    }

    /// Parse a catalog from YAML:
    ///
    /// ```yaml
    /// record_types:
    ///   patient: [ssn, insurance.policy_number]
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] on invalid YAML and
    /// [`CatalogError::EmptyPath`] if any path is blank.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        let mut record_types = BTreeMap::new();
        for (name, paths) in file.record_types {
            if paths.iter().any(|p| p.trim().is_empty()) {
                return Err(CatalogError::EmptyPath(name));
            }
            let set = paths.into_iter().map(|p| p.trim().to_owned()).collect();
            record_types.insert(name, set);
        }
        Ok(Self { record_types })
    }

    /// Read and parse a YAML catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Sensitive paths for `record_type`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownRecordType`] if it is not in the catalog.
    pub fn sensitive_paths(&self, record_type: &str) -> Result<&SensitivePaths, CatalogError> {
        self.record_types
            .get(record_type)
            .ok_or_else(|| CatalogError::UnknownRecordType(record_type.to_owned()))
    }

    /// Number of record types in the catalog.
    pub fn len(&self) -> usize {
        self.record_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record_types.is_empty()
    }
}

fn to_set(paths: &[&str]) -> SensitivePaths {
    paths.iter().map(|p| (*p).to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_patient_and_medical_record() {
        let catalog = FieldCatalog::builtin();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.sensitive_paths("patient").unwrap().contains("ssn"));
        assert!(catalog
            .sensitive_paths("medical_record")
            .unwrap()
            .contains("prescriptions[].medication"));
    }

    #[test]
    fn unknown_record_type_returns_error() {
        let catalog = FieldCatalog::builtin();
        assert!(matches!(
            catalog.sensitive_paths("invoice"),
            Err(CatalogError::UnknownRecordType(ref t)) if t == "invoice"
        ));
    }

    #[test]
    fn parses_yaml() {
        let yaml = r#"
record_types:
  patient:
    - ssn
    - " insurance.policy_number "
  lab_result: [result_value]
"#;
        let catalog = FieldCatalog::from_yaml(yaml).unwrap();
        assert_eq!(catalog.len(), 2);
        let patient = catalog.sensitive_paths("patient").unwrap();
        assert!(patient.contains("insurance.policy_number"));
        assert!(catalog.sensitive_paths("lab_result").unwrap().contains("result_value"));
    }

    #[test]
    fn rejects_blank_path() {
        let yaml = "record_types:\n  patient: [ssn, \"\"]\n";
        assert!(matches!(
            FieldCatalog::from_yaml(yaml),
            Err(CatalogError::EmptyPath(ref t)) if t == "patient"
        ));
    }

    #[test]
    fn rejects_invalid_yaml() {
        assert!(matches!(
            FieldCatalog::from_yaml("record_types: [unterminated"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = FieldCatalog::load(Path::new("/nonexistent/catalog.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/catalog.yaml"));
    }

    #[test]
    fn default_is_empty() {
        assert!(FieldCatalog::default().is_empty());
    }
}
