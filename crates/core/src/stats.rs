//! Derived campaign statistics
//!
//! Stats are always recomputed by scanning current lead rows, never kept
//! as incrementing counters. Re-applying the same webhook outcome to an
//! already-terminal lead therefore cannot double-count.

use serde::{Deserialize, Serialize};

use crate::lead::{Lead, LeadStatus};

/// Aggregates over a set of leads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
    /// Sum of call durations in minutes
    pub total_duration_minutes: f64,
    /// Sum of call costs in currency units
    pub total_cost: f64,
}

impl CampaignStats {
    /// Compute stats over the given lead rows. Pass the rows for a single
    /// campaign, or for the active pool, as the caller sees fit.
    pub fn compute<'a>(leads: impl IntoIterator<Item = &'a Lead>) -> Self {
        let mut stats = Self::default();
        for lead in leads {
            stats.total += 1;
            match lead.status {
                LeadStatus::Pending => stats.pending += 1,
                LeadStatus::InProgress => stats.in_progress += 1,
                LeadStatus::Completed => stats.completed += 1,
                LeadStatus::Failed => stats.failed += 1,
            }
            stats.total_duration_minutes += lead.duration_minutes;
            stats.total_cost += lead.cost;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::LeadUpdate;

    fn lead(status: LeadStatus, minutes: f64, cost: f64) -> Lead {
        let mut lead = Lead::new("Test", "5550100000").phone_id("p1");
        LeadUpdate::new()
            .status(status)
            .duration_minutes(minutes)
            .cost(cost)
            .apply(&mut lead);
        lead
    }

    #[test]
    fn test_compute_counts_and_sums() {
        let leads = vec![
            lead(LeadStatus::Completed, 1.5, 1.485),
            lead(LeadStatus::Completed, 0.5, 0.495),
            lead(LeadStatus::Failed, 0.0, 0.0),
            lead(LeadStatus::Pending, 0.0, 0.0),
        ];

        let stats = CampaignStats::compute(&leads);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.in_progress, 0);
        assert!((stats.total_duration_minutes - 2.0).abs() < 1e-9);
        assert!((stats.total_cost - 1.98).abs() < 1e-9);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let leads = vec![lead(LeadStatus::Completed, 1.5, 1.485)];
        let first = CampaignStats::compute(&leads);
        let second = CampaignStats::compute(&leads);
        assert_eq!(first, second);
    }
}
