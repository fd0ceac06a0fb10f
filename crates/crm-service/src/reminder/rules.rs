//! Static stage → reminder table.

use chrono::Duration;

use crm_entity::lead::PipelineStage;
use crm_entity::reminder::ReminderType;

/// What to schedule when an entity enters a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderRule {
    pub reminder_type: ReminderType,
    pub delay_hours: i64,
    pub message: &'static str,
}

impl ReminderRule {
    pub fn delay(&self) -> Duration {
        Duration::hours(self.delay_hours)
    }
}

const NDA: ReminderRule = ReminderRule {
    reminder_type: ReminderType::NdaFollowUp,
    delay_hours: 48,
    message: "Recordatorio: Seguimiento del NDA pendiente",
};

const PROPOSAL: ReminderRule = ReminderRule {
    reminder_type: ReminderType::ProposalFollowUp,
    delay_hours: 72,
    message: "Recordatorio: Seguimiento de la propuesta enviada",
};

const NEGOTIATION: ReminderRule = ReminderRule {
    reminder_type: ReminderType::NoActivityNegotiation,
    delay_hours: 168,
    message: "Recordatorio: Sin actividad en negociación por 7 días",
};

/// The reminder rule triggered by entering `stage`, if any.
pub fn rule_for_stage(stage: PipelineStage) -> Option<ReminderRule> {
    match stage {
        PipelineStage::Nda => Some(NDA),
        PipelineStage::Proposal => Some(PROPOSAL),
        PipelineStage::Negotiation => Some(NEGOTIATION),
        _ => None,
    }
}
