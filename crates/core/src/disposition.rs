//! Disposition labels
//!
//! Closed set of categorical call outcomes. The classification rules that
//! produce these live in the webhook crate; this is the shared vocabulary.

use serde::{Deserialize, Serialize};

/// Categorical outcome of a finished call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    AnsweringMachine,
    NoAnswer,
    WarmTransferEducation,
    WarmTransferJob,
    WarmTransfer,
    DoNotContact,
    LanguageBarrier,
    NotQualified,
    NotInterested,
    HangUp,
    /// End-reason present but nothing matched; carries the raw reason
    Other(String),
    Unknown,
}

impl Disposition {
    /// The label stored on the lead row and shown in reporting.
    pub fn label(&self) -> String {
        match self {
            Disposition::AnsweringMachine => "Answering Machine".to_string(),
            Disposition::NoAnswer => "No Answer".to_string(),
            Disposition::WarmTransferEducation => "Warm Transfer - Education".to_string(),
            Disposition::WarmTransferJob => "Warm Transfer - Job".to_string(),
            Disposition::WarmTransfer => "Warm Transfer".to_string(),
            Disposition::DoNotContact => "Do Not Contact".to_string(),
            Disposition::LanguageBarrier => "Language Barrier".to_string(),
            Disposition::NotQualified => "Not Qualified".to_string(),
            Disposition::NotInterested => "Not Interested".to_string(),
            Disposition::HangUp => "Hang Up".to_string(),
            Disposition::Other(reason) => format!("Other: {}", reason),
            Disposition::Unknown => "Unknown".to_string(),
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
