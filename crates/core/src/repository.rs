//! Lead repository
//!
//! Persistent lead storage is an external collaborator; this core consumes
//! it through the `LeadRepository` trait. All operations are network calls
//! and may fail transiently. Failures are reported, not retried, here.
//!
//! `InMemoryLeadRepository` is the default for development and tests.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::RepositoryError;
use crate::lead::{Lead, LeadUpdate};
use crate::phone::digits_only;

/// Lead repository trait
///
/// Implement this trait to back the dialer with your lead store
/// (e.g. Postgres, Supabase, a CRM API).
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Get a lead by ID
    async fn get(&self, id: &str) -> Result<Lead, RepositoryError>;

    /// Exact match on the stored phone number string
    async fn find_by_phone(&self, number: &str) -> Result<Option<Lead>, RepositoryError>;

    /// Leads whose digit-stripped phone number contains the given digit
    /// fragment. Persistent implementations map this to a LIKE query.
    async fn find_by_phone_fragment(
        &self,
        digits: &str,
        limit: usize,
    ) -> Result<Vec<Lead>, RepositoryError>;

    /// Leads whose name loosely matches, case-insensitively
    async fn find_by_name_prefix(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<Lead>, RepositoryError>;

    /// Bounded listing
    async fn list(&self, limit: usize) -> Result<Vec<Lead>, RepositoryError>;

    /// Insert a new lead
    async fn insert(&self, lead: Lead) -> Result<Lead, RepositoryError>;

    /// Apply a partial update and return the updated row
    async fn update(&self, id: &str, update: LeadUpdate) -> Result<Lead, RepositoryError>;
}

/// In-memory lead repository
///
/// Keeps leads in insertion order so snapshots and listings are
/// deterministic.
#[derive(Default)]
pub struct InMemoryLeadRepository {
    leads: RwLock<Vec<Lead>>,
}

impl InMemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with an initial lead set (test/dev convenience).
    pub fn with_leads(leads: Vec<Lead>) -> Self {
        Self {
            leads: RwLock::new(leads),
        }
    }
}

#[async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn get(&self, id: &str) -> Result<Lead, RepositoryError> {
        self.leads
            .read()
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn find_by_phone(&self, number: &str) -> Result<Option<Lead>, RepositoryError> {
        Ok(self
            .leads
            .read()
            .iter()
            .find(|l| l.phone == number)
            .cloned())
    }

    async fn find_by_phone_fragment(
        &self,
        digits: &str,
        limit: usize,
    ) -> Result<Vec<Lead>, RepositoryError> {
        if digits.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .leads
            .read()
            .iter()
            .filter(|l| digits_only(&l.phone).contains(digits))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_by_name_prefix(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<Lead>, RepositoryError> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .leads
            .read()
            .iter()
            .filter(|l| {
                let stored = l.name.to_lowercase();
                stored.contains(&needle) || needle.contains(&stored)
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list(&self, limit: usize) -> Result<Vec<Lead>, RepositoryError> {
        Ok(self.leads.read().iter().take(limit).cloned().collect())
    }

    async fn insert(&self, lead: Lead) -> Result<Lead, RepositoryError> {
        let mut leads = self.leads.write();
        if leads.iter().any(|l| l.id == lead.id) {
            return Err(RepositoryError::InvalidUpdate(format!(
                "duplicate lead id: {}",
                lead.id
            )));
        }
        leads.push(lead.clone());
        Ok(lead)
    }

    async fn update(&self, id: &str, update: LeadUpdate) -> Result<Lead, RepositoryError> {
        let mut leads = self.leads.write();
        let lead = leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        update.apply(lead);
        tracing::debug!(lead_id = %id, status = ?lead.status, "Lead updated");
        Ok(lead.clone())
    }
}
