use super::snapshot::Snapshot;
use super::SUPERADMIN;

/// The permission gate: pure, deterministic, total.
///
/// The `superadmin` role bypasses every check. Otherwise the required
/// permission must be present in the snapshot verbatim; unknown or
/// misspelled names simply never match (fail-closed, not an error).
pub fn is_allowed(snapshot: &Snapshot, required: &str) -> bool {
    if snapshot.has_role(SUPERADMIN) {
        return true;
    }
    snapshot.permissions.contains(required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::snapshot::RoleGrant;

    fn snapshot(roles: &[&str], perms: &[&str]) -> Snapshot {
        Snapshot::from_grants(roles.iter().map(|r| RoleGrant {
            name: r.to_string(),
            permissions: perms.iter().map(|p| p.to_string()).collect(),
        }))
    }

    #[test]
    fn superadmin_is_allowed_everything() {
        let s = snapshot(&["superadmin"], &[]);
        assert!(is_allowed(&s, "view vendors"));
        assert!(is_allowed(&s, "anything at all"));
        assert!(is_allowed(&s, ""));
    }

    #[test]
    fn direct_permission_match_allows() {
        let s = snapshot(&["editor"], &["edit vendors"]);
        assert!(is_allowed(&s, "edit vendors"));
        assert!(!is_allowed(&s, "delete vendors"));
    }

    #[test]
    fn empty_snapshot_is_denied_everything() {
        let s = Snapshot::empty();
        assert!(!is_allowed(&s, "view vendors"));
        assert!(!is_allowed(&s, ""));
    }

    #[test]
    fn misspelled_permission_never_matches() {
        let s = snapshot(&["editor"], &["view vendors"]);
        assert!(!is_allowed(&s, "view vendor"));
        assert!(!is_allowed(&s, "View Vendors"));
    }
}
