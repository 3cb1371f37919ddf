//! Lead matching
//!
//! Resolves an outcome to a lead when the provider did not echo a usable
//! correlation id. Phone formatting differs between what we stored and
//! what the provider reports, so matching walks four steps, cheapest
//! first:
//!
//! 1. exact match on the stored phone string
//! 2. last-10-digit substring search
//! 3. bounded scan comparing digit-stripped suffixes in either direction
//! 4. loose name match filtered by the last 4 digits
//!
//! No match after all four steps is a legitimate unresolved outcome, not
//! an error.

use std::sync::Arc;

use dialer_core::{
    digits_only, last_digits, suffixes_overlap, Lead, LeadRepository, RepositoryError,
};

/// Leads fetched for the bounded-scan and name fallback steps
const SCAN_WINDOW: usize = 25;

pub struct LeadMatcher {
    repo: Arc<dyn LeadRepository>,
}

impl LeadMatcher {
    pub fn new(repo: Arc<dyn LeadRepository>) -> Self {
        Self { repo }
    }

    /// Resolve a lead from the reported phone number and, failing that,
    /// the customer name.
    pub async fn resolve(
        &self,
        phone: Option<&str>,
        customer_name: Option<&str>,
    ) -> Result<Option<Lead>, RepositoryError> {
        let Some(phone) = phone.filter(|p| !p.trim().is_empty()) else {
            return Ok(None);
        };

        // Step 1: the stored string matches exactly
        if let Some(lead) = self.repo.find_by_phone(phone).await? {
            tracing::debug!(lead_id = %lead.id, "Matched lead by exact phone");
            return Ok(Some(lead));
        }

        // Step 2: last 10 digits as a substring of stored numbers
        let last10 = last_digits(phone, 10);
        if !last10.is_empty() {
            let hits = self.repo.find_by_phone_fragment(&last10, SCAN_WINDOW).await?;
            if let Some(lead) = hits.into_iter().next() {
                tracing::debug!(lead_id = %lead.id, "Matched lead by digit fragment");
                return Ok(Some(lead));
            }
        }

        // Step 3: bounded scan, suffix comparison in either direction to
        // tolerate differing international prefixes
        let window = self.repo.list(SCAN_WINDOW).await?;
        if let Some(lead) = window
            .iter()
            .find(|lead| suffixes_overlap(&lead.phone, phone))
        {
            tracing::debug!(lead_id = %lead.id, "Matched lead by suffix scan");
            return Ok(Some(lead.clone()));
        }

        // Step 4: loose name match, anchored by the last 4 digits
        if let Some(name) = customer_name.filter(|n| !n.trim().is_empty()) {
            let last4 = last_digits(phone, 4);
            if !last4.is_empty() {
                let candidates = self.repo.find_by_name_prefix(name, SCAN_WINDOW).await?;
                if let Some(lead) = candidates
                    .iter()
                    .find(|lead| digits_only(&lead.phone).ends_with(&last4))
                {
                    tracing::debug!(lead_id = %lead.id, "Matched lead by name and phone suffix");
                    return Ok(Some(lead.clone()));
                }
            }
        }

        Ok(None)
    }
}
