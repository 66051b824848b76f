//! Application services and ports for the grievance lifecycle engine.

#![forbid(unsafe_code)]

mod dashboard;
mod export;
mod grievance_service;
mod ports;
mod projection;
mod role_service;
mod subscription;

pub use dashboard::{DashboardContext, DashboardService, DashboardState, route, scope_for_role};
pub use export::{CSV_HEADER, export_csv};
pub use grievance_service::GrievanceService;
pub use ports::{
    AttachmentStore, AttachmentUpload, GrievanceRepository, RoleRepository, StatusUpdateInput,
    SubmitGrievanceInput,
};
pub use projection::{AdminStats, CategoryCount, GrievanceFilter, StudentStats, sort_newest_first};
pub use role_service::RoleService;
pub use subscription::{
    CancellationToken, GrievanceChange, GrievanceSubscription, SubscriptionScope,
};
