//! Data models for booking targets, scraped result blocks and run outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a user wants to book, built once per attempt from config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredBooking {
    /// Lower-cased facility keyword, e.g. "badminton"
    pub facility_type: String,
    pub court_number: Option<String>,
    /// Free-form start time, e.g. "6:00pm", "6 pm", "18:00"
    pub time: String,
}

impl DesiredBooking {
    pub fn new(facility_type: &str, court_number: Option<&str>, time: &str) -> Self {
        Self {
            facility_type: facility_type.trim().to_lowercase(),
            court_number: court_number
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(ToString::to_string),
            time: time.to_string(),
        }
    }
}

/// A bookable time slot button inside a result block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLabel {
    pub text: String,
    pub available: bool,
}

impl SlotLabel {
    pub fn new(text: impl Into<String>, available: bool) -> Self {
        Self {
            text: text.into(),
            available,
        }
    }
}

/// One court/facility entry on the search results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateBlock {
    pub title: String,
    pub description: String,
    pub slots: Vec<SlotLabel>,
}

/// A slot that passed the availability and time filters, with its
/// position in the owning block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedSlot<'a> {
    pub index: usize,
    pub slot: &'a SlotLabel,
}

/// A block that scored positively and exposes at least one matching slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCandidate<'a> {
    /// Position of the block in the scraped sequence
    pub index: usize,
    pub block: &'a CandidateBlock,
    pub score: u32,
    pub matching_slots: Vec<MatchedSlot<'a>>,
}

/// The single decision handed back to the site for clicking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub block_index: usize,
    pub block: &'a CandidateBlock,
    pub slot_index: usize,
    pub slot: &'a SlotLabel,
    pub score: u32,
}

/// Checkout form values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetails {
    pub cell_number: String,
    pub booking_reason: String,
}

/// Result of one user's booking attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingOutcome {
    pub user: String,
    pub success: bool,
    pub court: Option<String>,
    pub slot: Option<String>,
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
}

impl BookingOutcome {
    pub fn succeeded(user: &str, court: &str, slot: &str) -> Self {
        Self {
            user: user.to_string(),
            success: true,
            court: Some(court.to_string()),
            slot: Some(slot.to_string()),
            error: None,
            finished_at: Utc::now(),
        }
    }

    pub fn failed(user: &str, error: &anyhow::Error) -> Self {
        Self {
            user: user.to_string(),
            success: false,
            court: None,
            slot: None,
            error: Some(format!("{error:#}")),
            finished_at: Utc::now(),
        }
    }
}
