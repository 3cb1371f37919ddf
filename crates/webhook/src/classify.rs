//! Disposition classification
//!
//! Maps free-text call content (summary + transcript, case-folded) and
//! the provider's end-reason to exactly one disposition label.
//!
//! The rules live in an ordered table and the first match wins. Some
//! keyword sets overlap, so the ordering is part of the contract, not an
//! implementation detail: "not interested, please leave a message" is an
//! answering machine, not a refusal.

use dialer_core::Disposition;

/// A classification rule: a predicate over (content, end-reason), both
/// already lowercased, and the disposition it produces. The builder
/// receives the original-case end-reason for `Other: <reason>` labels.
struct Rule {
    name: &'static str,
    applies: fn(content: &str, reason: &str) -> bool,
    disposition: fn(original_reason: &str) -> Disposition,
}

const ANSWERING_MACHINE_CONTENT: &[&str] = &[
    "voicemail",
    "leave a message",
    "leave your name",
    "answering machine",
    "after the beep",
    "after the tone",
    "mailbox",
    "not available right now",
];

const NO_ANSWER_REASONS: &[&str] = &["did-not-answer", "no-answer", "busy"];
const NO_ANSWER_CONTENT: &[&str] = &["no answer", "did not answer", "never picked up"];

const TRANSFER_CONTENT: &[&str] = &["transfer", "forwarded", "connected the call"];
const EDUCATION_CONTENT: &[&str] = &[
    "education",
    "school",
    "college",
    "university",
    "degree",
    "enroll",
];
const JOB_CONTENT: &[&str] = &["job", "career", "employment", "resume", "hiring"];

const DO_NOT_CONTACT_CONTENT: &[&str] = &[
    "do not call",
    "don't call",
    "do not contact",
    "don't contact",
    "remove me",
    "take me off",
    "stop calling",
    "never call",
    "unsubscribe",
];

const LANGUAGE_BARRIER_CONTENT: &[&str] = &[
    "language barrier",
    "does not speak english",
    "doesn't speak english",
    "no english",
    "different language",
    "only speaks",
];

const NOT_QUALIFIED_CONTENT: &[&str] = &[
    "not qualified",
    "doesn't qualify",
    "does not qualify",
    "not eligible",
    "ineligible",
    "disqualified",
];

const NOT_INTERESTED_CONTENT: &[&str] = &[
    "not interested",
    "no interest",
    "uninterested",
    "not looking",
    "declined the offer",
];

const CUSTOMER_ENDED_REASONS: &[&str] = &[
    "customer-ended-call",
    "customer ended",
    "customer hung up",
    "caller hung up",
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn is_answering_machine(content: &str, reason: &str) -> bool {
    contains_any(content, ANSWERING_MACHINE_CONTENT) || reason.contains("voicemail")
}

fn is_no_answer(content: &str, reason: &str) -> bool {
    contains_any(reason, NO_ANSWER_REASONS) || contains_any(content, NO_ANSWER_CONTENT)
}

fn is_transfer_education(content: &str, _reason: &str) -> bool {
    contains_any(content, TRANSFER_CONTENT) && contains_any(content, EDUCATION_CONTENT)
}

fn is_transfer_job(content: &str, _reason: &str) -> bool {
    contains_any(content, TRANSFER_CONTENT) && contains_any(content, JOB_CONTENT)
}

fn is_transfer(content: &str, _reason: &str) -> bool {
    contains_any(content, TRANSFER_CONTENT)
}

fn is_do_not_contact(content: &str, _reason: &str) -> bool {
    contains_any(content, DO_NOT_CONTACT_CONTENT)
}

fn is_language_barrier(content: &str, _reason: &str) -> bool {
    contains_any(content, LANGUAGE_BARRIER_CONTENT)
}

fn is_not_qualified(content: &str, _reason: &str) -> bool {
    contains_any(content, NOT_QUALIFIED_CONTENT)
}

fn is_not_interested(content: &str, _reason: &str) -> bool {
    contains_any(content, NOT_INTERESTED_CONTENT)
}

fn is_customer_hang_up(_content: &str, reason: &str) -> bool {
    contains_any(reason, CUSTOMER_ENDED_REASONS)
}

fn has_reason(_content: &str, reason: &str) -> bool {
    !reason.is_empty()
}

/// Priority order, highest first. Reordering entries changes observable
/// classification.
const RULES: &[Rule] = &[
    Rule {
        name: "answering-machine",
        applies: is_answering_machine,
        disposition: |_| Disposition::AnsweringMachine,
    },
    Rule {
        name: "no-answer",
        applies: is_no_answer,
        disposition: |_| Disposition::NoAnswer,
    },
    Rule {
        name: "warm-transfer-education",
        applies: is_transfer_education,
        disposition: |_| Disposition::WarmTransferEducation,
    },
    Rule {
        name: "warm-transfer-job",
        applies: is_transfer_job,
        disposition: |_| Disposition::WarmTransferJob,
    },
    Rule {
        name: "warm-transfer",
        applies: is_transfer,
        disposition: |_| Disposition::WarmTransfer,
    },
    Rule {
        name: "do-not-contact",
        applies: is_do_not_contact,
        disposition: |_| Disposition::DoNotContact,
    },
    Rule {
        name: "language-barrier",
        applies: is_language_barrier,
        disposition: |_| Disposition::LanguageBarrier,
    },
    Rule {
        name: "not-qualified",
        applies: is_not_qualified,
        disposition: |_| Disposition::NotQualified,
    },
    Rule {
        name: "not-interested",
        applies: is_not_interested,
        disposition: |_| Disposition::NotInterested,
    },
    Rule {
        name: "hang-up",
        applies: is_customer_hang_up,
        disposition: |_| Disposition::HangUp,
    },
    Rule {
        name: "other",
        applies: has_reason,
        disposition: |reason| Disposition::Other(reason.to_string()),
    },
];

/// Classify one call.
///
/// `content` is the summary and transcript concatenated; `ended_reason`
/// is the provider's end-reason string. Returns `Unknown` when no rule
/// matches.
pub fn classify(content: &str, ended_reason: &str) -> Disposition {
    let content_lower = content.to_lowercase();
    let reason_trimmed = ended_reason.trim();
    let reason_lower = reason_trimmed.to_lowercase();

    for rule in RULES {
        if (rule.applies)(&content_lower, &reason_lower) {
            tracing::debug!(rule = rule.name, "Disposition rule matched");
            return (rule.disposition)(reason_trimmed);
        }
    }
    Disposition::Unknown
}
