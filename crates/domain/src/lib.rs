//! Domain entities and invariants for the grievance cell.

#![forbid(unsafe_code)]

mod classifier;
mod grievance;
mod role;

pub use classifier::{category_keywords, suggest_category};
pub use grievance::{
    Attachment, Grievance, GrievanceCategory, GrievanceId, GrievanceStatus, MAX_ATTACHMENT_BYTES,
};
pub use role::{AccessRole, RoleRecord, derive_role_from_email, validate_provisioning};
