//! Roles, permissions, and the static role → permission table.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a role or permission name is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind}: {name}")]
pub struct UnknownName {
    kind: &'static str,
    name: String,
}

/// The closed set of roles a principal can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access.
    Admin,
    /// Clinician with read and write access to records and appointments.
    Physician,
    /// Clinician who records observations but cannot book appointments.
    Nurse,
    /// The subject of a record; read-only.
    Patient,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 4] = [Role::Admin, Role::Physician, Role::Nurse, Role::Patient];

    /// Wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Physician => "physician",
            Role::Nurse => "nurse",
            Role::Patient => "patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownName {
                kind: "role",
                name: s.to_owned(),
            })
    }
}

/// A named operation that can be granted to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "read:record")]
    ReadRecord,
    #[serde(rename = "write:record")]
    WriteRecord,
    #[serde(rename = "delete:record")]
    DeleteRecord,
    #[serde(rename = "read:appointment")]
    ReadAppointment,
    #[serde(rename = "write:appointment")]
    WriteAppointment,
    #[serde(rename = "manage:users")]
    ManageUsers,
    #[serde(rename = "read:audit")]
    ReadAudit,
}

impl Permission {
    /// Every defined permission.
    pub const ALL: [Permission; 7] = [
        Permission::ReadRecord,
        Permission::WriteRecord,
        Permission::DeleteRecord,
        Permission::ReadAppointment,
        Permission::WriteAppointment,
        Permission::ManageUsers,
        Permission::ReadAudit,
    ];

    /// Wire name of the permission, e.g. `"read:record"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::ReadRecord => "read:record",
            Permission::WriteRecord => "write:record",
            Permission::DeleteRecord => "delete:record",
            Permission::ReadAppointment => "read:appointment",
            Permission::WriteAppointment => "write:appointment",
            Permission::ManageUsers => "manage:users",
            Permission::ReadAudit => "read:audit",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownName {
                kind: "permission",
                name: s.to_owned(),
            })
    }
}

/// An authenticated actor. The role is fixed for the lifetime of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    id: String,
    role: Role,
}

impl Principal {
    /// Create a principal with an already-verified identity and role.
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Opaque identifier from the authentication layer.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Role resolved by the authentication layer.
    pub fn role(&self) -> Role {
        self.role
    }
}

/// Immutable role → permission table.
///
/// Built once at startup and shared by reference; there is no way to mutate
/// it after construction.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    grants: HashMap<Role, HashSet<Permission>>,
}

impl AccessPolicy {
    /// Build a policy from explicit grants. Roles absent from `grants` hold
    /// no permissions.
    pub fn from_grants<I, P>(grants: I) -> Self
    where
        I: IntoIterator<Item = (Role, P)>,
        P: IntoIterator<Item = Permission>,
    {
        Self {
            grants: grants
                .into_iter()
                .map(|(role, perms)| (role, perms.into_iter().collect()))
                .collect(),
        }
    }

    /// The EHR role table.
    pub fn standard() -> Self {
        use Permission::*;
        Self::from_grants([
            (Role::Admin, Permission::ALL.to_vec()),
            (
                Role::Physician,
                vec![ReadRecord, WriteRecord, ReadAppointment, WriteAppointment],
            ),
            (Role::Nurse, vec![ReadRecord, WriteRecord, ReadAppointment]),
            (Role::Patient, vec![ReadRecord]),
        ])
    }

    /// Returns `true` iff `principal`'s role grants `permission`.
    pub fn authorize(&self, principal: &Principal, permission: Permission) -> bool {
        self.grants
            .get(&principal.role())
            .is_some_and(|perms| perms.contains(&permission))
    }

    /// Permissions granted to `role`.
    pub fn permissions(&self, role: Role) -> impl Iterator<Item = Permission> + '_ {
        self.grants.get(&role).into_iter().flatten().copied()
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
