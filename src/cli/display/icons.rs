//! Status icons for CLI output

use crate::domain::addon::RoleBindingState;

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Success icon (all replicas ready)
    pub const SUCCESS: &'static str = "✓";

    /// Warning icon (partial replicas ready)
    pub const WARNING: &'static str = "⚠";

    /// Error icon (no replicas ready)
    pub const ERROR: &'static str = "✗";

    /// Pending icon (value not produced yet)
    pub const PENDING: &'static str = "⏳";

    /// Unknown icon
    pub const UNKNOWN: &'static str = "?";

    /// Get status icon based on ready/total replicas
    pub fn get_replica_icon(ready: u32, total: u32) -> &'static str {
        if total == 0 {
            Self::UNKNOWN
        } else if ready == total {
            Self::SUCCESS
        } else if ready > 0 {
            Self::WARNING
        } else {
            Self::ERROR
        }
    }

    /// Get status text based on ready/total replicas
    pub fn get_status_text(ready: u32, total: u32) -> &'static str {
        if total == 0 {
            "Unknown"
        } else if ready == total {
            "Running"
        } else if ready > 0 {
            "Degraded"
        } else {
            "Failed"
        }
    }

    /// Icon for a planned resource: resolved, or still waiting on inputs
    pub fn get_resolution_icon(unknown_inputs: usize) -> &'static str {
        if unknown_inputs == 0 {
            Self::SUCCESS
        } else {
            Self::PENDING
        }
    }

    pub fn get_binding_icon(binding: &RoleBindingState) -> &'static str {
        match binding {
            RoleBindingState::Matches(_) | RoleBindingState::Annotated(_) => Self::SUCCESS,
            RoleBindingState::Unannotated => Self::WARNING,
            RoleBindingState::ServiceAccountMissing => Self::UNKNOWN,
            RoleBindingState::Mismatch { .. } => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_replica_icon() {
        assert_eq!(StatusIcon::get_replica_icon(2, 2), StatusIcon::SUCCESS);
        assert_eq!(StatusIcon::get_replica_icon(1, 2), StatusIcon::WARNING);
        assert_eq!(StatusIcon::get_replica_icon(0, 2), StatusIcon::ERROR);
        assert_eq!(StatusIcon::get_replica_icon(0, 0), StatusIcon::UNKNOWN);
    }

    #[test]
    fn test_get_status_text() {
        assert_eq!(StatusIcon::get_status_text(2, 2), "Running");
        assert_eq!(StatusIcon::get_status_text(1, 2), "Degraded");
        assert_eq!(StatusIcon::get_status_text(0, 2), "Failed");
        assert_eq!(StatusIcon::get_status_text(0, 0), "Unknown");
    }

    #[test]
    fn test_get_resolution_icon() {
        assert_eq!(StatusIcon::get_resolution_icon(0), StatusIcon::SUCCESS);
        assert_eq!(StatusIcon::get_resolution_icon(2), StatusIcon::PENDING);
    }

    #[test]
    fn test_get_binding_icon() {
        assert_eq!(
            StatusIcon::get_binding_icon(&RoleBindingState::ServiceAccountMissing),
            StatusIcon::UNKNOWN
        );
        assert_eq!(
            StatusIcon::get_binding_icon(&RoleBindingState::Annotated("arn".to_string())),
            StatusIcon::SUCCESS
        );
    }
}
