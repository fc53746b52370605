//! Time parsing and slot-label matching
//!
//! Result pages label slots inconsistently ("6:00 pm - 7:00 pm", "6pm-7pm",
//! "6:00 pm"), so the desired start time is reduced to a one-hour
//! [`CanonicalWindow`] whose label variants are compared against labels
//! with case and whitespace stripped.

use std::fmt;

use crate::error::BookingError;

const AM_MARKERS: [&str; 3] = ["am", "a.m.", "a.m"];
const PM_MARKERS: [&str; 3] = ["pm", "p.m.", "p.m"];

/// Parses a free-form time such as "6:00pm", "6 p.m." or "18:00" into a
/// 24-hour `(hour, minute)` pair.
///
/// Without an am/pm marker the hour is read as 24-hour, so "6" means
/// 06:00. Use [`is_ambiguous`] to detect that case.
///
/// # Errors
///
/// Returns [`BookingError::MalformedTime`] when no hour can be read or the
/// result falls outside 00:00-23:59.
pub fn parse_time(desired: &str) -> Result<(u32, u32), BookingError> {
    let clean = desired.trim().to_lowercase();
    let am = AM_MARKERS.iter().any(|m| clean.contains(m));
    let pm = PM_MARKERS.iter().any(|m| clean.contains(m));
    let numeric: String = clean
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ':')
        .collect();

    let malformed = || BookingError::MalformedTime(desired.to_string());

    let (hour_str, minute_str) = numeric.split_once(':').unwrap_or((numeric.as_str(), ""));
    let mut hour: u32 = hour_str.parse().map_err(|_| malformed())?;
    let minute: u32 = if minute_str.is_empty() {
        0
    } else {
        minute_str.parse().map_err(|_| malformed())?
    };

    if pm && hour < 12 {
        hour += 12;
    } else if am && hour == 12 {
        hour = 0;
    }

    if hour > 23 || minute > 59 {
        return Err(malformed());
    }

    Ok((hour, minute))
}

/// True when `desired` parses to a 1-11 hour without any am/pm marker,
/// i.e. "6" that was probably meant as 6pm.
pub fn is_ambiguous(desired: &str) -> bool {
    let clean = desired.trim().to_lowercase();
    let has_marker = AM_MARKERS
        .iter()
        .chain(PM_MARKERS.iter())
        .any(|m| clean.contains(m));

    !has_marker && matches!(parse_time(desired), Ok((1..=11, _)))
}

/// Tests whether `label` denotes the one-hour window starting at
/// `desired_hour` (24-hour).
pub fn matches_window(desired_hour: u32, label: &str) -> bool {
    CanonicalWindow::new(desired_hour, 0).matches(label)
}

/// 12-hour clock rendering: 0 -> (12, "am"), 13 -> (1, "pm")
fn to_twelve_hour(hour: u32) -> (u32, &'static str) {
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    let period = if hour < 12 { "am" } else { "pm" };
    (display, period)
}

fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// The desired one-hour window and the label variants derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalWindow {
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    range_labels: [String; 2],
    start_label: String,
}

impl CanonicalWindow {
    pub fn new(start_hour: u32, start_minute: u32) -> Self {
        let start_hour = start_hour % 24;
        let end_hour = (start_hour + 1) % 24;
        let (sh, sp) = to_twelve_hour(start_hour);
        let (eh, ep) = to_twelve_hour(end_hour);

        Self {
            start_hour,
            start_minute,
            end_hour,
            range_labels: [
                format!("{sh}:00{sp}-{eh}:00{ep}"),
                format!("{sh}{sp}-{eh}{ep}"),
            ],
            start_label: format!("{sh}:00{sp}"),
        }
    }

    /// Full-range variants, e.g. `["6:00pm-7:00pm", "6pm-7pm"]`
    pub fn range_labels(&self) -> &[String; 2] {
        &self.range_labels
    }

    /// Start-only variant, e.g. `"6:00pm"`
    pub fn start_label(&self) -> &str {
        &self.start_label
    }

    /// Start time with its minutes, e.g. `"6:30pm"`. Feeding this back
    /// into [`parse_time`] yields the same start.
    pub fn start_display(&self) -> String {
        let (h, p) = to_twelve_hour(self.start_hour);
        format!("{h}:{:02}{p}", self.start_minute)
    }

    pub fn matches(&self, label: &str) -> bool {
        let normalized = normalize_label(label);

        if self
            .range_labels
            .iter()
            .any(|variant| normalized.contains(variant.as_str()))
        {
            return true;
        }

        let start = normalized.split('-').next().unwrap_or_default();
        start == self.start_label
    }
}

impl fmt::Display for CanonicalWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.range_labels[0])
    }
}

/// Matcher bound to one desired start time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlotMatcher {
    window: CanonicalWindow,
}

impl TimeSlotMatcher {
    /// # Errors
    ///
    /// Returns [`BookingError::MalformedTime`] if `desired` cannot be parsed.
    pub fn new(desired: &str) -> Result<Self, BookingError> {
        let (hour, minute) = parse_time(desired)?;
        Ok(Self {
            window: CanonicalWindow::new(hour, minute),
        })
    }

    pub fn window(&self) -> &CanonicalWindow {
        &self.window
    }

    pub fn matches(&self, label: &str) -> bool {
        self.window.matches(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("6:00pm", (18, 0) ; "colon pm")]
    #[test_case("6 pm", (18, 0) ; "spaced pm")]
    #[test_case("6 P.M.", (18, 0) ; "dotted uppercase pm")]
    #[test_case("18:00", (18, 0) ; "twenty four hour")]
    #[test_case("12am", (0, 0) ; "midnight")]
    #[test_case("12:00 pm", (12, 0) ; "noon")]
    #[test_case("7:30 a.m.", (7, 30) ; "dotted am with minutes")]
    #[test_case("  9: ", (9, 0) ; "empty minutes")]
    #[test_case("6", (6, 0) ; "bare hour is 24 hour")]
    fn parses_desired_times(input: &str, expected: (u32, u32)) {
        assert_eq!(parse_time(input), Ok(expected));
    }

    #[test_case("" ; "empty")]
    #[test_case("evening" ; "no digits")]
    #[test_case(":30pm" ; "missing hour")]
    #[test_case("6:00:00" ; "two colons")]
    #[test_case("25:00" ; "hour out of range")]
    #[test_case("6:75pm" ; "minute out of range")]
    fn rejects_malformed_times(input: &str) {
        assert_eq!(
            parse_time(input),
            Err(BookingError::MalformedTime(input.to_string()))
        );
    }

    #[test]
    fn parse_is_idempotent_on_canonical_rendering() {
        for hour in 0..24 {
            for minute in [0, 15, 30, 59] {
                let rendered = CanonicalWindow::new(hour, minute).start_display();
                assert_eq!(parse_time(&rendered), Ok((hour, minute)), "{rendered}");
            }
        }
    }

    #[test]
    fn twelve_hour_inputs_stay_in_range() {
        for hour in 1..=12 {
            for suffix in ["am", "pm", " a.m.", " p.m."] {
                let (h, m) = parse_time(&format!("{hour}:05{suffix}")).unwrap();
                assert!(h < 24);
                assert_eq!(m, 5);
            }
        }
    }

    #[test_case(18, "6:00 pm - 7:00 pm", true ; "spaced range")]
    #[test_case(18, "6pm-7pm", true ; "compact range")]
    #[test_case(18, "6:00 pm", true ; "start only")]
    #[test_case(18, "6:00 PM - 7:00 PM", true ; "uppercase")]
    #[test_case(18, "7:00 pm - 8:00 pm", false ; "next hour")]
    #[test_case(18, "6:00 am - 7:00 am", false ; "wrong half of day")]
    #[test_case(18, "16:00 pm", false ; "longer hour prefix")]
    #[test_case(0, "12:00 am - 1:00 am", true ; "midnight")]
    #[test_case(11, "11:00 am - 12:00 pm", true ; "crosses noon")]
    #[test_case(23, "11pm-12am", true ; "crosses midnight")]
    #[test_case(12, "12:00\u{a0}pm", true ; "non breaking space")]
    fn matches_window_labels(hour: u32, label: &str, expected: bool) {
        assert_eq!(matches_window(hour, label), expected);
    }

    #[test]
    fn window_exposes_label_variants() {
        let matcher = TimeSlotMatcher::new("6:30 pm").unwrap();
        let window = matcher.window();

        assert_eq!(window.start_hour, 18);
        assert_eq!(window.start_minute, 30);
        assert_eq!(window.end_hour, 19);
        assert_eq!(
            window.range_labels(),
            &["6:00pm-7:00pm".to_string(), "6pm-7pm".to_string()]
        );
        assert_eq!(window.start_label(), "6:00pm");
        assert_eq!(window.to_string(), "6:00pm-7:00pm");
        assert!(matcher.matches("6 PM - 7 PM"));
    }

    #[test]
    fn flags_ambiguous_bare_hours() {
        assert!(is_ambiguous("6"));
        assert!(is_ambiguous("6:00"));
        assert!(!is_ambiguous("6pm"));
        assert!(!is_ambiguous("18:00"));
        assert!(!is_ambiguous("nonsense"));
    }
}
