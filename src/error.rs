//! Typed failures surfaced by the matching core

/// Failures returned by time parsing and court selection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("Malformed time '{0}': expected something like 6pm, 6:00 pm or 18:00")]
    MalformedTime(String),
    #[error("No facility type given to match courts against")]
    MissingFacility,
    #[error("No available {facility} court with a slot matching {time}")]
    NoAvailableCourt { facility: String, time: String },
}
