//! Reminder enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crm_core::AppError;

/// Kind of follow-up a reminder represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reminder_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderType {
    NdaFollowUp,
    ProposalFollowUp,
    NoActivityNegotiation,
}

impl ReminderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NdaFollowUp => "NDA_FOLLOW_UP",
            Self::ProposalFollowUp => "PROPOSAL_FOLLOW_UP",
            Self::NoActivityNegotiation => "NO_ACTIVITY_NEGOTIATION",
        }
    }
}

impl fmt::Display for ReminderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NDA_FOLLOW_UP" => Ok(Self::NdaFollowUp),
            "PROPOSAL_FOLLOW_UP" => Ok(Self::ProposalFollowUp),
            "NO_ACTIVITY_NEGOTIATION" => Ok(Self::NoActivityNegotiation),
            _ => Err(AppError::validation(format!("Unknown reminder type: '{s}'"))),
        }
    }
}

/// Delivery status of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reminder_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Pending,
    Sent,
    Cancelled,
}

/// Kind of record a reminder is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reminder_entity_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    #[default]
    Lead,
    Deal,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Deal => "deal",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
