use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use snafu::prelude::*;

use crate::model::*;
use crate::reference::ReferenceData;

static EMPTY_RESPONSE: CaseResponse = CaseResponse::EMPTY;

/// A single user action against the response state.
///
/// Every way of changing a response goes through one of these, which makes
/// sessions easy to record and replay.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Intent {
    SelectStakeholder {
        case: String,
        stakeholder: String,
        selected: bool,
    },
    /// `Level::None` takes the stakeholder off the board (drag to unassigned).
    SetLevel {
        case: String,
        dimension: Dimension,
        stakeholder: String,
        level: Level,
    },
    /// Drag-reorder within a board.
    MoveRanked {
        case: String,
        dimension: Dimension,
        stakeholder: String,
        index: usize,
    },
    AnswerConcern {
        case: String,
        concern: String,
        answer: Answer,
    },
    SetSeverity {
        case: String,
        concern: String,
        severity: Severity,
    },
    ToggleConcernStakeholder {
        case: String,
        concern: String,
        stakeholder: String,
        related: bool,
    },
    ToggleOutcome {
        case: String,
        outcome: String,
        selected: bool,
    },
    SetImpact {
        case: String,
        outcome: String,
        stakeholder: String,
        impact: Impact,
    },
    SetComment {
        case: String,
        text: String,
    },
}

impl Intent {
    pub fn case(&self) -> &str {
        match self {
            Intent::SelectStakeholder { case, .. }
            | Intent::SetLevel { case, .. }
            | Intent::MoveRanked { case, .. }
            | Intent::AnswerConcern { case, .. }
            | Intent::SetSeverity { case, .. }
            | Intent::ToggleConcernStakeholder { case, .. }
            | Intent::ToggleOutcome { case, .. }
            | Intent::SetImpact { case, .. }
            | Intent::SetComment { case, .. } => case,
        }
    }
}

pub type Clock = Box<dyn Fn() -> DateTime<Utc>>;

/// The responses of one session, keyed by case identifier.
///
/// Responses are created on the first accepted change to a case. Every key
/// handed to the store is checked against the reference data of that case;
/// a rejected call leaves the state as it was.
pub struct ResponseStore {
    reference: ReferenceData,
    responses: HashMap<String, CaseResponse>,
    clock: Clock,
}

impl fmt::Debug for ResponseStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseStore")
            .field("reference", &self.reference)
            .field("responses", &self.responses)
            .finish()
    }
}

impl ResponseStore {
    pub fn new(reference: ReferenceData) -> ResponseStore {
        ResponseStore::with_clock(reference, Box::new(Utc::now))
    }

    pub fn with_clock(reference: ReferenceData, clock: Clock) -> ResponseStore {
        ResponseStore {
            reference,
            responses: HashMap::new(),
            clock,
        }
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// The current response for a case. A case nobody touched yet reads as an
    /// empty response.
    pub fn snapshot(&self, case: &str) -> &CaseResponse {
        self.responses.get(case).unwrap_or(&EMPTY_RESPONSE)
    }

    pub fn has_response(&self, case: &str) -> bool {
        self.responses.contains_key(case)
    }

    /// The single entry point for intents.
    pub fn apply(&mut self, intent: &Intent) -> Result<(), ContractViolation> {
        debug!("apply: {:?}", intent);
        let res = match intent {
            Intent::SelectStakeholder {
                case,
                stakeholder,
                selected,
            } => self.select_stakeholder(case, stakeholder, *selected),
            Intent::SetLevel {
                case,
                dimension,
                stakeholder,
                level,
            } => self.set_level(case, *dimension, stakeholder, *level),
            Intent::MoveRanked {
                case,
                dimension,
                stakeholder,
                index,
            } => self.move_ranked(case, *dimension, stakeholder, *index),
            Intent::AnswerConcern {
                case,
                concern,
                answer,
            } => self.answer_concern(case, concern, *answer),
            Intent::SetSeverity {
                case,
                concern,
                severity,
            } => self.set_concern_severity(case, concern, *severity),
            Intent::ToggleConcernStakeholder {
                case,
                concern,
                stakeholder,
                related,
            } => self.toggle_concern_stakeholder(case, concern, stakeholder, *related),
            Intent::ToggleOutcome {
                case,
                outcome,
                selected,
            } => self.toggle_outcome(case, outcome, *selected),
            Intent::SetImpact {
                case,
                outcome,
                stakeholder,
                impact,
            } => self.set_outcome_impact(case, outcome, stakeholder, *impact),
            Intent::SetComment { case, text } => self.set_comment(case, text),
        };
        if let Err(e) = &res {
            warn!("apply: rejected {:?}: {}", intent, e);
        }
        res
    }

    /// Adds or removes a stakeholder from the selection. Level boards and
    /// impacts are left as they are.
    pub fn select_stakeholder(
        &mut self,
        case: &str,
        stakeholder: &str,
        selected: bool,
    ) -> Result<(), ContractViolation> {
        self.check_stakeholder(case, stakeholder)?;
        self.touch(case, |r| {
            if selected {
                r.selected_stakeholders.insert(stakeholder.to_string());
            } else {
                r.selected_stakeholders.remove(stakeholder);
            }
        });
        Ok(())
    }

    pub fn set_level(
        &mut self,
        case: &str,
        dimension: Dimension,
        stakeholder: &str,
        level: Level,
    ) -> Result<(), ContractViolation> {
        self.check_stakeholder(case, stakeholder)?;
        if level == Level::None && self.snapshot(case).level(dimension, stakeholder) == Level::None {
            debug!(
                "set_level: {:?} is already off the {} board of case {:?}",
                stakeholder,
                dimension.token(),
                case
            );
            return Ok(());
        }
        self.touch(case, |r| r.board_mut(dimension).assign(stakeholder, level));
        Ok(())
    }

    /// Moves a placed stakeholder to a new position on a board. Moving a
    /// stakeholder that is not on the board changes nothing.
    pub fn move_ranked(
        &mut self,
        case: &str,
        dimension: Dimension,
        stakeholder: &str,
        index: usize,
    ) -> Result<(), ContractViolation> {
        self.check_stakeholder(case, stakeholder)?;
        if self.snapshot(case).board(dimension).get(stakeholder) == Level::None {
            debug!(
                "move_ranked: {:?} is not placed on the {} board of case {:?}",
                stakeholder,
                dimension.token(),
                case
            );
            return Ok(());
        }
        self.touch(case, |r| {
            r.board_mut(dimension).move_to(stakeholder, index);
        });
        Ok(())
    }

    pub fn answer_concern(
        &mut self,
        case: &str,
        concern: &str,
        answer: Answer,
    ) -> Result<(), ContractViolation> {
        self.check_concern(case, concern)?;
        self.touch_concern(case, concern, |a| {
            a.verdict = ConcernVerdict::Answered(answer)
        });
        Ok(())
    }

    pub fn set_concern_severity(
        &mut self,
        case: &str,
        concern: &str,
        severity: Severity,
    ) -> Result<(), ContractViolation> {
        self.check_concern(case, concern)?;
        self.touch_concern(case, concern, |a| a.severity = severity);
        Ok(())
    }

    pub fn toggle_concern_stakeholder(
        &mut self,
        case: &str,
        concern: &str,
        stakeholder: &str,
        related: bool,
    ) -> Result<(), ContractViolation> {
        self.check_concern(case, concern)?;
        self.check_stakeholder(case, stakeholder)?;
        self.touch_concern(case, concern, |a| {
            if related {
                a.related_stakeholders.insert(stakeholder.to_string());
            } else {
                a.related_stakeholders.remove(stakeholder);
            }
        });
        Ok(())
    }

    pub fn toggle_outcome(
        &mut self,
        case: &str,
        outcome: &str,
        selected: bool,
    ) -> Result<(), ContractViolation> {
        self.check_outcome(case, outcome)?;
        self.touch(case, |r| {
            if selected {
                r.outcome_selections.insert(outcome.to_string());
            } else {
                r.outcome_selections.remove(outcome);
            }
        });
        Ok(())
    }

    pub fn set_outcome_impact(
        &mut self,
        case: &str,
        outcome: &str,
        stakeholder: &str,
        impact: Impact,
    ) -> Result<(), ContractViolation> {
        self.check_outcome(case, outcome)?;
        self.check_stakeholder(case, stakeholder)?;
        self.touch(case, |r| {
            r.outcome_impacts
                .entry(outcome.to_string())
                .or_default()
                .insert(stakeholder.to_string(), impact);
        });
        Ok(())
    }

    pub fn set_comment(&mut self, case: &str, text: &str) -> Result<(), ContractViolation> {
        self.check_case(case)?;
        self.touch(case, |r| r.comment = text.to_string());
        Ok(())
    }

    fn touch<F: FnOnce(&mut CaseResponse)>(&mut self, case: &str, f: F) {
        let now = (self.clock)();
        let r = self.responses.entry(case.to_string()).or_default();
        f(r);
        r.last_modified = Some(now);
    }

    // Creates the answer entry (unanswered, mild, no related stakeholders) on first touch.
    fn touch_concern<F: FnOnce(&mut ConcernAnswer)>(&mut self, case: &str, concern: &str, f: F) {
        self.touch(case, |r| {
            let a = r.concern_answers.entry(concern.to_string()).or_default();
            f(a)
        });
    }

    fn check_case(&self, case: &str) -> Result<(), ContractViolation> {
        ensure!(
            self.reference.case(case).is_some(),
            UnknownCaseSnafu { case }
        );
        Ok(())
    }

    fn check_stakeholder(&self, case: &str, stakeholder: &str) -> Result<(), ContractViolation> {
        self.check_case(case)?;
        ensure!(
            self.reference.has_stakeholder(case, stakeholder),
            UnknownStakeholderSnafu { case, stakeholder }
        );
        Ok(())
    }

    fn check_concern(&self, case: &str, concern: &str) -> Result<(), ContractViolation> {
        self.check_case(case)?;
        ensure!(
            self.reference.has_concern(case, concern),
            UnknownConcernSnafu { case, concern }
        );
        Ok(())
    }

    fn check_outcome(&self, case: &str, outcome: &str) -> Result<(), ContractViolation> {
        self.check_case(case)?;
        ensure!(
            self.reference.has_outcome(case, outcome),
            UnknownOutcomeSnafu { case, outcome }
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::reference::ReferenceBuilder;
    use chrono::TimeZone;

    pub(crate) fn widget_reference() -> ReferenceData {
        ReferenceBuilder::new()
            .case("1", "Widget Recall", "Safety", "Line one\nLine two")
            .stakeholders("1", &["Engineer", "Customer"])
            .concern("1", "Data leak risk")
            .outcome("1", "Recall issued")
            .case("2", "Layoffs", "Labor", "")
            .stakeholders("2", &["Union"])
            .build()
    }

    pub(crate) fn fixed_clock() -> Clock {
        Box::new(|| Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
    }

    pub(crate) fn widget_store() -> ResponseStore {
        ResponseStore::with_clock(widget_reference(), fixed_clock())
    }

    #[test]
    fn untouched_case_reads_empty() {
        let store = widget_store();
        assert_eq!(store.snapshot("1"), &CaseResponse::EMPTY);
        assert_eq!(store.snapshot("nope"), &CaseResponse::EMPTY);
        assert!(!store.has_response("1"));
    }

    #[test]
    fn select_and_deselect_keeps_levels() {
        let mut store = widget_store();
        store.select_stakeholder("1", "Engineer", true).unwrap();
        store
            .set_level("1", Dimension::Involvement, "Engineer", Level::High)
            .unwrap();
        store.select_stakeholder("1", "Engineer", false).unwrap();

        let r = store.snapshot("1");
        assert!(r.selected_stakeholders.is_empty());
        assert_eq!(r.level(Dimension::Involvement, "Engineer"), Level::High);
        assert!(r.last_modified.is_some());
    }

    #[test]
    fn setters_are_idempotent() {
        let mut store = widget_store();
        store
            .set_level("1", Dimension::DecisionPower, "Customer", Level::Medium)
            .unwrap();
        let once = store.snapshot("1").clone();
        store
            .set_level("1", Dimension::DecisionPower, "Customer", Level::Medium)
            .unwrap();
        assert_eq!(store.snapshot("1"), &once);
        assert_eq!(store.snapshot("1").decision_power.len(), 1);

        store.toggle_outcome("1", "Recall issued", true).unwrap();
        let once = store.snapshot("1").clone();
        store.toggle_outcome("1", "Recall issued", true).unwrap();
        assert_eq!(store.snapshot("1"), &once);
    }

    #[test]
    fn level_none_removes_entry() {
        let mut store = widget_store();
        store
            .set_level("1", Dimension::EthicalComplexity, "Engineer", Level::Primary)
            .unwrap();
        store
            .set_level("1", Dimension::EthicalComplexity, "Engineer", Level::None)
            .unwrap();
        assert!(store.snapshot("1").ethical_complexity.is_empty());
    }

    #[test]
    fn unassigning_an_unplaced_stakeholder_changes_nothing() {
        let mut store = widget_store();
        store
            .set_level("2", Dimension::Involvement, "Union", Level::None)
            .unwrap();
        assert!(!store.has_response("2"));
        assert!(crate::export::result_rows(&store).is_empty());
    }

    #[test]
    fn concern_entry_created_on_first_touch() {
        let mut store = widget_store();
        store
            .toggle_concern_stakeholder("1", "Data leak risk", "Customer", true)
            .unwrap();
        let a = store.snapshot("1").concern("Data leak risk").cloned().unwrap();
        assert_eq!(a.verdict, ConcernVerdict::Unanswered);
        assert_eq!(a.severity, Severity::MILD);
        assert!(a.related_stakeholders.contains("Customer"));

        store
            .set_concern_severity("1", "Data leak risk", Severity::SEVERE)
            .unwrap();
        store
            .answer_concern("1", "Data leak risk", Answer::Yes)
            .unwrap();
        let a = store.snapshot("1").concern("Data leak risk").cloned().unwrap();
        assert_eq!(a.severity(), Some(Severity::SEVERE));
        assert!(a.related_stakeholders.contains("Customer"));
    }

    #[test]
    fn unknown_keys_are_rejected_without_changes() {
        let mut store = widget_store();
        assert_eq!(
            store.select_stakeholder("1", "Union", true),
            Err(ContractViolation::UnknownStakeholder {
                case: "1".to_string(),
                stakeholder: "Union".to_string()
            })
        );
        assert!(store.answer_concern("2", "Data leak risk", Answer::No).is_err());
        assert!(store.toggle_outcome("3", "Recall issued", true).is_err());
        assert!(store.set_comment("3", "hello").is_err());
        assert!(store
            .set_outcome_impact("1", "Recall issued", "Union", Impact::Positive)
            .is_err());
        assert!(!store.has_response("1"));
        assert!(!store.has_response("2"));
    }

    #[test]
    fn impacts_and_comment() {
        let mut store = widget_store();
        store
            .set_outcome_impact("1", "Recall issued", "Customer", Impact::Positive)
            .unwrap();
        store
            .set_outcome_impact("1", "Recall issued", "Customer", Impact::Negative)
            .unwrap();
        store.set_comment("1", "Hard \"call\"").unwrap();
        let r = store.snapshot("1");
        assert_eq!(r.impact("Recall issued", "Customer"), Some(Impact::Negative));
        assert_eq!(r.impact("Recall issued", "Engineer"), None);
        assert_eq!(r.comment, "Hard \"call\"");
    }

    #[test]
    fn move_ranked_through_intents() {
        let mut store = widget_store();
        let intents = vec![
            Intent::SetLevel {
                case: "1".to_string(),
                dimension: Dimension::Involvement,
                stakeholder: "Engineer".to_string(),
                level: Level::Low,
            },
            Intent::SetLevel {
                case: "1".to_string(),
                dimension: Dimension::Involvement,
                stakeholder: "Customer".to_string(),
                level: Level::Low,
            },
            Intent::MoveRanked {
                case: "1".to_string(),
                dimension: Dimension::Involvement,
                stakeholder: "Customer".to_string(),
                index: 0,
            },
        ];
        for i in intents.iter() {
            store.apply(i).unwrap();
        }
        let order: Vec<&str> = store.snapshot("1").involvement.iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec!["Customer", "Engineer"]);

        // Not placed on this board: nothing happens, no response is created.
        store
            .move_ranked("2", Dimension::DecisionPower, "Union", 0)
            .unwrap();
        assert!(!store.has_response("2"));
    }

    #[test]
    fn timestamps_come_from_the_clock() {
        let mut store = widget_store();
        store.set_comment("2", "").unwrap();
        assert_eq!(
            store.snapshot("2").last_modified,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        );
    }
}
