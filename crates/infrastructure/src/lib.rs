//! Infrastructure adapters for the grievance-cell ports.

#![forbid(unsafe_code)]

mod fs_attachment_store;
mod in_memory_attachment_store;
mod in_memory_grievance_repository;
mod in_memory_role_repository;
mod postgres_grievance_repository;
mod postgres_role_repository;

pub use fs_attachment_store::FsAttachmentStore;
pub use in_memory_attachment_store::InMemoryAttachmentStore;
pub use in_memory_grievance_repository::InMemoryGrievanceRepository;
pub use in_memory_role_repository::InMemoryRoleRepository;
pub use postgres_grievance_repository::PostgresGrievanceRepository;
pub use postgres_role_repository::PostgresRoleRepository;
