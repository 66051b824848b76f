//! Dashboard routing: which context a viewer sees, and its teardown.

use grievance_core::UserIdentity;
use grievance_domain::AccessRole;
use serde::Serialize;

use crate::grievance_service::GrievanceService;
use crate::role_service::RoleService;
use crate::subscription::{GrievanceSubscription, SubscriptionScope};

/// Dashboard lifecycle states.
///
/// `LoadingRole` is entered immediately after authentication succeeds and
/// exited once the role resolver yields a value. `Unauthenticated` is only
/// re-entered on explicit sign-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardState {
    /// No authenticated identity.
    Unauthenticated,
    /// Authenticated; role resolution in flight.
    LoadingRole,
    /// Student dashboard context.
    Student,
    /// Warden dashboard context (hostel-related scope).
    Warden,
    /// Shared faculty/HOD dashboard context.
    FacultyOrHod,
    /// Admin dashboard context.
    Admin,
}

impl DashboardState {
    /// Maps a resolved role to its dashboard context. Faculty and HOD are
    /// equivalent for routing purposes.
    #[must_use]
    pub fn for_role(role: AccessRole) -> Self {
        match role {
            AccessRole::Student => Self::Student,
            AccessRole::Warden => Self::Warden,
            AccessRole::Faculty | AccessRole::Hod => Self::FacultyOrHod,
            AccessRole::Admin => Self::Admin,
        }
    }
}

/// Pure routing function from authentication state and resolved role.
#[must_use]
pub fn route(authenticated: bool, resolved_role: Option<AccessRole>) -> DashboardState {
    if !authenticated {
        return DashboardState::Unauthenticated;
    }

    match resolved_role {
        None => DashboardState::LoadingRole,
        Some(role) => DashboardState::for_role(role),
    }
}

/// Subscription scope a dashboard context opens for a role.
#[must_use]
pub fn scope_for_role(role: AccessRole, identity: &UserIdentity) -> SubscriptionScope {
    match role {
        AccessRole::Student => SubscriptionScope::Submitter(identity.email().to_owned()),
        AccessRole::Warden => SubscriptionScope::HostelRelated,
        AccessRole::Faculty | AccessRole::Hod | AccessRole::Admin => SubscriptionScope::All,
    }
}

/// An active dashboard: the resolved role plus its live subscription.
pub struct DashboardContext {
    role: AccessRole,
    state: DashboardState,
    subscription: GrievanceSubscription,
}

impl DashboardContext {
    /// Returns the resolved role.
    #[must_use]
    pub fn role(&self) -> AccessRole {
        self.role
    }

    /// Returns the dashboard state this context renders.
    #[must_use]
    pub fn state(&self) -> DashboardState {
        self.state
    }

    /// Returns the live subscription for snapshot consumption.
    pub fn subscription_mut(&mut self) -> &mut GrievanceSubscription {
        &mut self.subscription
    }

    /// Tears the context down on sign-out. The subscription is cancelled
    /// before the context is dropped, so a subsequently signed-in identity
    /// can never receive deliveries scoped to the previous role.
    pub fn sign_out(mut self) -> DashboardState {
        self.subscription.cancel();
        DashboardState::Unauthenticated
    }
}

/// Composes the role resolver with the grievance store to activate
/// dashboard contexts.
#[derive(Clone)]
pub struct DashboardService {
    roles: RoleService,
    grievances: GrievanceService,
}

impl DashboardService {
    /// Creates a new dashboard service.
    #[must_use]
    pub fn new(roles: RoleService, grievances: GrievanceService) -> Self {
        Self { roles, grievances }
    }

    /// Resolves the identity's role and opens the matching context with its
    /// live subscription.
    pub async fn open(&self, identity: &UserIdentity) -> DashboardContext {
        let role = self.roles.resolve(identity).await;
        let subscription = self.grievances.subscribe(scope_for_role(role, identity));

        DashboardContext {
            role,
            state: DashboardState::for_role(role),
            subscription,
        }
    }
}
