//! Court scoring and slot selection
//!
//! Blocks are scored on how well their title and description name the
//! desired facility and court. Only blocks that also expose an available
//! slot in the desired window are selectable; the highest score wins and
//! earlier blocks win ties.

use serde::{Deserialize, Serialize};

use crate::error::BookingError;
use crate::matcher::TimeSlotMatcher;
use crate::models::{CandidateBlock, DesiredBooking, MatchedSlot, ScoredCandidate, Selection};

/// Scoring policy, overridable from the `[scoring]` config table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreTable {
    pub facility_name_match: u32,
    pub court_number_match: u32,
    pub sport_keyword_bonus: u32,
    pub availability_bonus: u32,
    /// Keywords that disambiguate multi-sport listings sharing one court
    pub sport_keywords: Vec<String>,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            facility_name_match: 100,
            court_number_match: 50,
            sport_keyword_bonus: 30,
            availability_bonus: 50,
            sport_keywords: vec!["badminton".to_string(), "pickle".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CourtSelector {
    table: ScoreTable,
}

impl CourtSelector {
    pub fn new(table: ScoreTable) -> Self {
        Self { table }
    }

    /// Name-based score of a block. Zero means the facility keyword is
    /// absent and the block is out.
    pub fn score(&self, block: &CandidateBlock, facility_type: &str, court_number: Option<&str>) -> u32 {
        let text = format!("{} {}", block.title, block.description).to_lowercase();

        if !text.contains(facility_type) {
            return 0;
        }

        let mut score = self.table.facility_name_match;

        if let Some(court) = court_number.filter(|c| !c.is_empty())
            && text.contains(&format!("{facility_type} {court}"))
        {
            score += self.table.court_number_match;
        }

        for keyword in &self.table.sport_keywords {
            if facility_type.contains(keyword.as_str()) && text.contains(keyword.as_str()) {
                score += self.table.sport_keyword_bonus;
            }
        }

        score
    }

    /// Available slots whose label falls in the matcher's window, in page order
    pub fn collect_matching_slots<'a>(
        &self,
        block: &'a CandidateBlock,
        matcher: &TimeSlotMatcher,
    ) -> Vec<MatchedSlot<'a>> {
        block
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.available && matcher.matches(&slot.text))
            .map(|(index, slot)| MatchedSlot { index, slot })
            .collect()
    }

    /// Every selectable block in input order, availability bonus applied.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::MissingFacility`] for a blank facility type,
    /// which would otherwise match every block, and
    /// [`BookingError::MalformedTime`] if the desired time cannot be parsed.
    pub fn rank<'a>(
        &self,
        blocks: &'a [CandidateBlock],
        desired: &DesiredBooking,
    ) -> Result<Vec<ScoredCandidate<'a>>, BookingError> {
        let facility = desired.facility_type.trim().to_lowercase();
        if facility.is_empty() {
            return Err(BookingError::MissingFacility);
        }
        let matcher = TimeSlotMatcher::new(&desired.time)?;

        let ranked = blocks
            .iter()
            .enumerate()
            .filter_map(|(index, block)| {
                let score = self.score(block, &facility, desired.court_number.as_deref());
                if score == 0 {
                    return None;
                }

                let matching_slots = self.collect_matching_slots(block, &matcher);
                if matching_slots.is_empty() {
                    return None;
                }

                Some(ScoredCandidate {
                    index,
                    block,
                    score: score + self.table.availability_bonus,
                    matching_slots,
                })
            })
            .collect();

        Ok(ranked)
    }

    /// Picks the best block and its first matching slot.
    ///
    /// # Errors
    ///
    /// [`BookingError::MalformedTime`] for an unparsable desired time,
    /// [`BookingError::NoAvailableCourt`] when nothing is selectable.
    pub fn select_best<'a>(
        &self,
        blocks: &'a [CandidateBlock],
        desired: &DesiredBooking,
    ) -> Result<Selection<'a>, BookingError> {
        let ranked = self.rank(blocks, desired)?;
        Self::choose(&ranked, desired)
    }

    /// Picks from an existing ranking. Highest score wins; on equal scores
    /// the earlier candidate stays.
    ///
    /// # Errors
    ///
    /// [`BookingError::NoAvailableCourt`] when `ranked` is empty.
    pub fn choose<'a>(
        ranked: &[ScoredCandidate<'a>],
        desired: &DesiredBooking,
    ) -> Result<Selection<'a>, BookingError> {
        let no_court = || BookingError::NoAvailableCourt {
            facility: desired.facility_type.clone(),
            time: desired.time.clone(),
        };

        let best = ranked
            .iter()
            .fold(None::<&ScoredCandidate<'a>>, |best, candidate| match best {
                Some(b) if b.score >= candidate.score => Some(b),
                _ => Some(candidate),
            })
            .ok_or_else(no_court)?;
        let first = best.matching_slots.first().ok_or_else(no_court)?;

        Ok(Selection {
            block_index: best.index,
            block: best.block,
            slot_index: first.index,
            slot: first.slot,
            score: best.score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SlotLabel;
    use pretty_assertions::assert_eq;

    fn block(title: &str, description: &str, slots: &[(&str, bool)]) -> CandidateBlock {
        CandidateBlock {
            title: title.to_string(),
            description: description.to_string(),
            slots: slots
                .iter()
                .map(|(text, available)| SlotLabel::new(*text, *available))
                .collect(),
        }
    }

    #[test]
    fn score_adds_court_and_keyword_bonuses() {
        let selector = CourtSelector::default();
        let court = block("Field House", "Badminton 2 - north end", &[]);

        assert_eq!(selector.score(&court, "badminton", Some("2")), 180);
        assert_eq!(selector.score(&court, "badminton", Some("3")), 130);
        assert_eq!(selector.score(&court, "badminton", None), 130);
    }

    #[test]
    fn score_is_zero_without_facility_keyword() {
        let selector = CourtSelector::default();
        let court = block("Pickleball Court 1", "Shared surface", &[]);

        assert_eq!(selector.score(&court, "badminton", Some("1")), 0);
        assert_eq!(selector.score(&court, "pickleball", None), 130);
    }

    #[test]
    fn score_without_sport_keyword_is_base_only() {
        let selector = CourtSelector::default();
        let court = block("Squash 4", "Glass back wall", &[]);

        assert_eq!(selector.score(&court, "squash", Some("4")), 150);
    }

    #[test]
    fn score_uses_configured_table() {
        let selector = CourtSelector::new(ScoreTable {
            facility_name_match: 10,
            court_number_match: 5,
            sport_keyword_bonus: 1,
            availability_bonus: 0,
            sport_keywords: vec!["tennis".to_string()],
        });
        let court = block("Tennis 1", "", &[]);

        assert_eq!(selector.score(&court, "tennis", Some("1")), 16);
    }

    #[test]
    fn collects_only_available_matching_slots_in_order() {
        let selector = CourtSelector::default();
        let matcher = TimeSlotMatcher::new("6pm").unwrap();
        let court = block(
            "Badminton Court 1",
            "",
            &[
                ("5:00 pm - 6:00 pm", true),
                ("6:00 pm - 7:00 pm", false),
                ("6pm-7pm", true),
                ("6:00 pm", true),
            ],
        );

        let indices: Vec<usize> = selector
            .collect_matching_slots(&court, &matcher)
            .iter()
            .map(|m| m.index)
            .collect();
        assert_eq!(indices, vec![2, 3]);
    }

    #[test]
    fn selects_requested_court_number() {
        let blocks = vec![
            block("Badminton Court 1", "", &[("6:00pm-7:00pm", true)]),
            block("Badminton Court 2", "", &[("7:00pm-8:00pm", true)]),
        ];
        let desired = DesiredBooking::new("badminton", Some("1"), "6pm");

        let selection = CourtSelector::default().select_best(&blocks, &desired).unwrap();

        // "badminton court 1" does not contain "badminton 1", so no court bonus
        assert_eq!(selection.block_index, 0);
        assert_eq!(selection.slot.text, "6:00pm-7:00pm");
        assert_eq!(selection.score, 100 + 30 + 50);
    }

    #[test]
    fn court_number_outranks_earlier_block() {
        let blocks = vec![
            block("Badminton 1", "Main gym", &[("6pm-7pm", true)]),
            block("Badminton 3", "Main gym", &[("6 pm - 7 pm", true)]),
        ];
        let desired = DesiredBooking::new("badminton", Some("3"), "18:00");

        let selection = CourtSelector::default().select_best(&blocks, &desired).unwrap();

        assert_eq!(selection.block_index, 1);
        assert_eq!(selection.slot_index, 0);
    }

    #[test]
    fn ties_go_to_first_block() {
        let blocks = vec![
            block("Squash A", "", &[("6:00 pm", true)]),
            block("Squash B", "", &[("6:00 pm", true)]),
        ];
        let desired = DesiredBooking::new("squash", None, "6pm");

        let selection = CourtSelector::default().select_best(&blocks, &desired).unwrap();

        assert_eq!(selection.block.title, "Squash A");
        assert_eq!(selection.score, 150);
    }

    #[test]
    fn name_match_without_slot_is_not_selectable() {
        let blocks = vec![
            block("Badminton Court 1", "", &[("6:00pm-7:00pm", false)]),
            block("Gym", "badminton nets stored here", &[("6:00pm-7:00pm", true)]),
        ];
        let desired = DesiredBooking::new("badminton", Some("1"), "6pm");

        let ranked = CourtSelector::default().rank(&blocks, &desired).unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].index, 1);
    }

    #[test]
    fn missing_facility_is_no_available_court() {
        let blocks = vec![block("Tennis 1", "", &[("6:00pm-7:00pm", true)])];
        let desired = DesiredBooking::new("badminton", None, "6pm");

        let err = CourtSelector::default().select_best(&blocks, &desired).unwrap_err();

        assert_eq!(
            err,
            BookingError::NoAvailableCourt {
                facility: "badminton".to_string(),
                time: "6pm".to_string(),
            }
        );
    }

    #[test]
    fn blank_facility_matches_nothing() {
        let blocks = vec![block("Squash A", "", &[("6:00 pm", true)])];

        for facility in ["", "   "] {
            let desired = DesiredBooking::new(facility, None, "6pm");
            let err = CourtSelector::default().select_best(&blocks, &desired).unwrap_err();
            assert_eq!(err, BookingError::MissingFacility);
        }
    }

    #[test]
    fn malformed_time_propagates() {
        let blocks = vec![block("Badminton 1", "", &[("6:00pm-7:00pm", true)])];
        let desired = DesiredBooking::new("badminton", None, "soon");

        let err = CourtSelector::default().select_best(&blocks, &desired).unwrap_err();

        assert_eq!(err, BookingError::MalformedTime("soon".to_string()));
    }
}
