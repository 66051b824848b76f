//! Access roles, lexical role derivation, and account-provisioning rules.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use grievance_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Access role controlling which records and actions are visible.
///
/// `Faculty` and `Hod` are distinct persisted values but route to the same
/// dashboard context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRole {
    /// Files grievances; may never mutate them after creation.
    Student,
    /// Works the hostel-related subset.
    Warden,
    /// Staff member working the full record set.
    Faculty,
    /// Head of department; same routing as faculty.
    Hod,
    /// Full access, including irreversible deletion.
    Admin,
}

impl AccessRole {
    /// Returns the stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Warden => "warden",
            Self::Faculty => "faculty",
            Self::Hod => "hod",
            Self::Admin => "admin",
        }
    }

    /// Returns whether this role may change grievance status.
    #[must_use]
    pub fn is_staff(&self) -> bool {
        !matches!(self, Self::Student)
    }
}

impl FromStr for AccessRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "student" => Ok(Self::Student),
            "warden" => Ok(Self::Warden),
            "faculty" => Ok(Self::Faculty),
            "hod" => Ok(Self::Hod),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

/// Derives a role from lexical cues in the email address.
///
/// Case-insensitive substring scan in fixed priority order; the first match
/// wins and absence of any cue falls back to `Student`. Used only when no
/// persisted role record exists, so the UI never blocks on the store
/// round-trip.
#[must_use]
pub fn derive_role_from_email(email: &str) -> AccessRole {
    let lowered = email.to_lowercase();

    if lowered.contains("admin") {
        AccessRole::Admin
    } else if lowered.contains("warden") {
        AccessRole::Warden
    } else if lowered.contains("hod") {
        AccessRole::Hod
    } else if lowered.contains("faculty") {
        AccessRole::Faculty
    } else {
        AccessRole::Student
    }
}

/// Account-provisioning checks applied before a role record is written.
///
/// When the institution configures a required email domain, identities
/// outside it are rejected. An explicitly requested `admin` role requires
/// "admin" to appear in the email address.
pub fn validate_provisioning(
    email: &str,
    requested: AccessRole,
    required_domain: Option<&str>,
) -> AppResult<()> {
    let lowered = email.to_lowercase();

    if let Some(domain) = required_domain
        && !lowered.ends_with(&format!("@{}", domain.to_lowercase()))
    {
        return Err(AppError::Validation(format!(
            "email must belong to the @{domain} domain"
        )));
    }

    if requested == AccessRole::Admin && !lowered.contains("admin") {
        return Err(AppError::Validation(
            "admin accounts must contain 'admin' in the email address".to_owned(),
        ));
    }

    Ok(())
}

/// Persisted association between an identity and its role.
///
/// Created on first successful resolution if absent; never deleted; at most
/// one per subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    subject: String,
    email: String,
    display_name: Option<String>,
    role: AccessRole,
    created_at: DateTime<Utc>,
}

impl RoleRecord {
    /// Creates a new role record for a subject.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        email: impl Into<String>,
        display_name: Option<String>,
        role: AccessRole,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject: subject.into(),
            email: email.into(),
            display_name,
            role,
            created_at,
        }
    }

    /// Returns the identity-provider subject id.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the email recorded at provisioning time.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the optional display name.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the persisted role. Authoritative over lexical cues.
    #[must_use]
    pub fn role(&self) -> AccessRole {
        self.role
    }

    /// Returns when the record was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn derivation_priority_is_fixed() {
        assert_eq!(
            derive_role_from_email("admin@sece.ac.in"),
            AccessRole::Admin
        );
        assert_eq!(
            derive_role_from_email("hostelwarden@sece.ac.in"),
            AccessRole::Warden
        );
        assert_eq!(derive_role_from_email("hod.cse@sece.ac.in"), AccessRole::Hod);
        assert_eq!(
            derive_role_from_email("faculty.ece@sece.ac.in"),
            AccessRole::Faculty
        );
        assert_eq!(
            derive_role_from_email("alice.2027@sece.ac.in"),
            AccessRole::Student
        );
    }

    #[test]
    fn admin_cue_outranks_every_other_cue() {
        // "admin" and "warden" both present: the scan order decides.
        assert_eq!(
            derive_role_from_email("warden.admin@sece.ac.in"),
            AccessRole::Admin
        );
    }

    #[test]
    fn derivation_is_case_insensitive() {
        assert_eq!(
            derive_role_from_email("WARDEN@SECE.AC.IN"),
            AccessRole::Warden
        );
    }

    #[test]
    fn provisioning_rejects_foreign_domain() {
        let result = validate_provisioning("alice@gmail.com", AccessRole::Student, Some("sece.ac.in"));
        assert!(result.is_err());
    }

    #[test]
    fn provisioning_accepts_institution_domain() {
        let result = validate_provisioning("alice@sece.ac.in", AccessRole::Student, Some("sece.ac.in"));
        assert!(result.is_ok());
    }

    #[test]
    fn provisioning_requires_admin_cue_for_admin_role() {
        let rejected = validate_provisioning("alice@sece.ac.in", AccessRole::Admin, None);
        assert!(rejected.is_err());

        let accepted = validate_provisioning("admin@sece.ac.in", AccessRole::Admin, None);
        assert!(accepted.is_ok());
    }

    #[test]
    fn role_storage_values_round_trip() {
        use std::str::FromStr;

        for role in [
            AccessRole::Student,
            AccessRole::Warden,
            AccessRole::Faculty,
            AccessRole::Hod,
            AccessRole::Admin,
        ] {
            let parsed = AccessRole::from_str(role.as_str());
            assert!(parsed.is_ok());
            assert_eq!(parsed.unwrap_or(AccessRole::Student), role);
        }
    }

    proptest! {
        #[test]
        fn derivation_is_deterministic(email in ".{0,64}") {
            prop_assert_eq!(derive_role_from_email(&email), derive_role_from_email(&email));
        }

        #[test]
        fn admin_substring_always_derives_admin(
            prefix in "[a-z0-9.]{0,12}",
            suffix in "[a-z0-9.]{0,12}",
        ) {
            let email = format!("{prefix}admin{suffix}@sece.ac.in");
            prop_assert_eq!(derive_role_from_email(&email), AccessRole::Admin);
        }
    }
}
