//! Role-to-permission mapping.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crm_entity::user::UserRole;

/// An operation-level permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // Leads
    LeadRead,
    LeadWrite,
    /// Auto-assign and redistribute leads.
    LeadAssign,

    // Tasks
    TaskRead,
    TaskWrite,
    /// Edit the per-type SLA table.
    SlaManage,

    // Reminders
    ReminderManage,

    // Notification rules
    RuleView,
    RuleManage,
    /// Run the rule engine on demand.
    RuleTrigger,

    // Reporting
    MetricsView,
    CommissionView,
    CommissionManage,

    // Documents
    TeaserUpload,

    // Administration
    UserManage,
    JobView,
}

impl Permission {
    pub const ALL: [Permission; 16] = [
        Self::LeadRead,
        Self::LeadWrite,
        Self::LeadAssign,
        Self::TaskRead,
        Self::TaskWrite,
        Self::SlaManage,
        Self::ReminderManage,
        Self::RuleView,
        Self::RuleManage,
        Self::RuleTrigger,
        Self::MetricsView,
        Self::CommissionView,
        Self::CommissionManage,
        Self::TeaserUpload,
        Self::UserManage,
        Self::JobView,
    ];
}

/// Role → allowed permissions.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    policies: HashMap<UserRole, HashSet<Permission>>,
}

impl RbacPolicies {
    /// The default policy set.
    pub fn new() -> Self {
        let advisor: HashSet<Permission> = [
            Permission::LeadRead,
            Permission::LeadWrite,
            Permission::TaskRead,
            Permission::TaskWrite,
            Permission::ReminderManage,
            Permission::RuleView,
            Permission::MetricsView,
            Permission::TeaserUpload,
        ]
        .into_iter()
        .collect();

        // Manager: advisor + balancing, SLA table, rules, commissions
        let mut manager = advisor.clone();
        manager.extend([
            Permission::LeadAssign,
            Permission::SlaManage,
            Permission::RuleManage,
            Permission::RuleTrigger,
            Permission::CommissionView,
            Permission::CommissionManage,
            Permission::JobView,
        ]);

        let admin: HashSet<Permission> = Permission::ALL.into_iter().collect();

        let policies = HashMap::from([
            (UserRole::Advisor, advisor),
            (UserRole::Manager, manager),
            (UserRole::Admin, admin),
        ]);
        Self { policies }
    }

    pub fn has_permission(&self, role: &UserRole, permission: &Permission) -> bool {
        self.policies
            .get(role)
            .is_some_and(|perms| perms.contains(permission))
    }

    /// Permissions granted to a role.
    pub fn permissions_for(&self, role: &UserRole) -> Vec<Permission> {
        self.policies
            .get(role)
            .map(|perms| perms.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}
