//! RBAC enforcement.

use crm_core::error::AppError;
use crm_entity::user::UserRole;

use super::policies::{Permission, RbacPolicies};

#[derive(Debug, Clone, Default)]
pub struct RbacEnforcer {
    policies: RbacPolicies,
}

impl RbacEnforcer {
    pub fn new() -> Self {
        Self {
            policies: RbacPolicies::new(),
        }
    }

    pub fn with_policies(policies: RbacPolicies) -> Self {
        Self { policies }
    }

    /// `Ok(())` if the role holds the permission, a forbidden error
    /// otherwise.
    pub fn require_permission(
        &self,
        role: &UserRole,
        permission: &Permission,
    ) -> Result<(), AppError> {
        if self.policies.has_permission(role, permission) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Role '{role}' does not have permission '{permission:?}'"
            )))
        }
    }

    pub fn has_permission(&self, role: &UserRole, permission: &Permission) -> bool {
        self.policies.has_permission(role, permission)
    }

    /// Role hierarchy: Admin > Manager > Advisor.
    pub fn require_minimum_role(
        &self,
        actual_role: &UserRole,
        minimum_role: &UserRole,
    ) -> Result<(), AppError> {
        if actual_role.has_at_least(minimum_role) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Role '{actual_role}' is insufficient; minimum required: '{minimum_role}'"
            )))
        }
    }

    pub fn policies(&self) -> &RbacPolicies {
        &self.policies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crm_core::error::ErrorKind;

    #[test]
    fn test_minimum_role() {
        let enforcer = RbacEnforcer::new();
        assert!(
            enforcer
                .require_minimum_role(&UserRole::Admin, &UserRole::Manager)
                .is_ok()
        );
        let err = enforcer
            .require_minimum_role(&UserRole::Advisor, &UserRole::Manager)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[test]
    fn test_require_permission() {
        let enforcer = RbacEnforcer::new();
        assert!(
            enforcer
                .require_permission(&UserRole::Advisor, &Permission::TaskWrite)
                .is_ok()
        );
        assert!(
            enforcer
                .require_permission(&UserRole::Advisor, &Permission::RuleTrigger)
                .is_err()
        );
    }
}
