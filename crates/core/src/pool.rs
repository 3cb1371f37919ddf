//! Phone resource pool
//!
//! A finite pool of assignable calling lines. Leads are handed a phone
//! resource at intake time; a lead that never got one is never dispatched.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::ProviderError;

/// Phone-number pool trait (opaque external allocation)
#[async_trait]
pub trait PhonePool: Send + Sync {
    /// Next available phone resource id, or `None` when the pool is
    /// exhausted.
    async fn next_available(&self) -> Result<Option<String>, ProviderError>;
}

/// Round-robin pool over a fixed id list
pub struct RoundRobinPhonePool {
    ids: Vec<String>,
    next: AtomicUsize,
}

impl RoundRobinPhonePool {
    pub fn new(ids: Vec<String>) -> Self {
        Self {
            ids,
            next: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PhonePool for RoundRobinPhonePool {
    async fn next_available(&self) -> Result<Option<String>, ProviderError> {
        if self.ids.is_empty() {
            return Ok(None);
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.ids.len();
        Ok(Some(self.ids[index].clone()))
    }
}
