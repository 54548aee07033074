//! Authorization core: per-request snapshot building, the permission gate,
//! the declarative route policy table, and the guard middleware chain
//! (authenticate -> ban enforcement -> permission check).

mod gate;
mod middleware;
mod policy;
mod principal;
mod snapshot;

pub use gate::is_allowed;
pub use middleware::{authenticate, enforce_not_banned, enforce_permission};
pub use policy::{route_policies, ActionPolicy, PolicyMap};
pub use principal::Principal;
pub use snapshot::{load_snapshot, RoleGrant, Snapshot};

/// Reserved bypass role: satisfies every permission check unconditionally.
/// Must never be handed out as an ordinary permission scope.
pub const SUPERADMIN: &str = "superadmin";

/// Permission names guarding the vendor screens. The RBAC screens themselves
/// carry no declared permission; they are reachable by any authenticated,
/// non-banned principal.
pub mod permissions {
    pub const VIEW_VENDORS: &str = "view vendors";
    pub const CREATE_VENDORS: &str = "create vendors";
    pub const EDIT_VENDORS: &str = "edit vendors";
    pub const DELETE_VENDORS: &str = "delete vendors";
}
