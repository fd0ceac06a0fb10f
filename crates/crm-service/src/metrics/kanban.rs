//! Per-stage pipeline statistics.

use serde::{Deserialize, Serialize};

use crm_entity::lead::{Lead, PipelineStage};

/// Aggregates for one kanban column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageStats {
    pub stage: PipelineStage,
    pub count: u64,
    pub total_value: f64,
    pub weighted_value: f64,
    /// Mean probability of the column's leads, 0 for an empty column.
    pub avg_probability: f64,
}

/// Board-wide pipeline statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KanbanStats {
    /// One entry per stage, in board order, empty stages included.
    pub stages: Vec<StageStats>,
    pub total_count: u64,
    pub total_value: f64,
    /// Value of leads not in a closed stage.
    pub open_pipeline_value: f64,
    /// Probability-weighted value of leads not in a closed stage.
    pub weighted_pipeline_value: f64,
    /// `won / (won + lost)`, 0 when nothing is closed.
    pub win_rate: f64,
}

pub fn kanban_stats(leads: &[Lead]) -> KanbanStats {
    let stages: Vec<StageStats> = PipelineStage::ALL
        .into_iter()
        .map(|stage| {
            let in_stage: Vec<&Lead> = leads.iter().filter(|l| l.stage == stage).collect();
            let count = in_stage.len() as u64;
            let avg_probability = if in_stage.is_empty() {
                0.0
            } else {
                in_stage.iter().map(|l| f64::from(l.probability)).sum::<f64>() / count as f64
            };
            StageStats {
                stage,
                count,
                total_value: in_stage.iter().map(|l| l.value).sum(),
                weighted_value: in_stage.iter().map(|l| l.weighted_value()).sum(),
                avg_probability,
            }
        })
        .collect();

    let open: Vec<&Lead> = leads.iter().filter(|l| !l.stage.is_closed()).collect();
    let won = stage_count(&stages, PipelineStage::ClosedWon);
    let lost = stage_count(&stages, PipelineStage::ClosedLost);
    let win_rate = if won + lost == 0 {
        0.0
    } else {
        won as f64 / (won + lost) as f64
    };

    KanbanStats {
        total_count: leads.len() as u64,
        total_value: leads.iter().map(|l| l.value).sum(),
        open_pipeline_value: open.iter().map(|l| l.value).sum(),
        weighted_pipeline_value: open.iter().map(|l| l.weighted_value()).sum(),
        win_rate,
        stages,
    }
}

fn stage_count(stages: &[StageStats], stage: PipelineStage) -> u64 {
    stages
        .iter()
        .find(|s| s.stage == stage)
        .map(|s| s.count)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use uuid::Uuid;

    use crm_entity::lead::LeadStatus;

    fn lead(stage: PipelineStage, probability: i32, value: f64) -> Lead {
        let now = Utc::now();
        Lead {
            id: Uuid::new_v4(),
            name: "L".into(),
            company: None,
            email: None,
            score: 50,
            status: LeadStatus::Qualified,
            stage,
            probability,
            value,
            assigned_to_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_board() {
        let stats = kanban_stats(&[]);
        assert_eq!(stats.stages.len(), PipelineStage::ALL.len());
        assert_eq!(stats.win_rate, 0.0);
        assert!(stats.stages.iter().all(|s| s.avg_probability == 0.0));
    }

    #[test]
    fn test_stage_aggregates_and_win_rate() {
        let leads = vec![
            lead(PipelineStage::Negotiation, 80, 1000.0),
            lead(PipelineStage::Negotiation, 60, 3000.0),
            lead(PipelineStage::ClosedWon, 100, 500.0),
            lead(PipelineStage::ClosedLost, 0, 700.0),
            lead(PipelineStage::ClosedLost, 0, 300.0),
        ];
        let stats = kanban_stats(&leads);

        let negotiation = stats
            .stages
            .iter()
            .find(|s| s.stage == PipelineStage::Negotiation)
            .unwrap();
        assert_eq!(negotiation.count, 2);
        assert_eq!(negotiation.total_value, 4000.0);
        assert_eq!(negotiation.weighted_value, 800.0 + 1800.0);
        assert_eq!(negotiation.avg_probability, 70.0);

        assert_eq!(stats.total_count, 5);
        assert_eq!(stats.open_pipeline_value, 4000.0);
        assert_eq!(stats.weighted_pipeline_value, 2600.0);
        assert!((stats.win_rate - 1.0 / 3.0).abs() < 1e-9);
    }
}
