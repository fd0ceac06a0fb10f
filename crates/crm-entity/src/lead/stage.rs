//! Pipeline (kanban) stages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kanban column a lead or deal sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "pipeline_stage", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Lead,
    Contacted,
    Qualified,
    Nda,
    Proposal,
    Negotiation,
    DueDiligence,
    ClosedWon,
    ClosedLost,
}

impl PipelineStage {
    /// All stages in board order.
    pub const ALL: [PipelineStage; 9] = [
        Self::Lead,
        Self::Contacted,
        Self::Qualified,
        Self::Nda,
        Self::Proposal,
        Self::Negotiation,
        Self::DueDiligence,
        Self::ClosedWon,
        Self::ClosedLost,
    ];

    /// Whether the deal is finished either way.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::ClosedWon | Self::ClosedLost)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Nda => "nda",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::DueDiligence => "due_diligence",
            Self::ClosedWon => "closed_won",
            Self::ClosedLost => "closed_lost",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PipelineStage {
    type Err = crm_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s.to_lowercase())
            .ok_or_else(|| crm_core::AppError::validation(format!("Unknown pipeline stage: '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for stage in PipelineStage::ALL {
            assert_eq!(stage.as_str().parse::<PipelineStage>().unwrap(), stage);
        }
        assert!("won".parse::<PipelineStage>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&PipelineStage::DueDiligence).unwrap();
        assert_eq!(json, "\"due_diligence\"");
    }
}
