// ********* Reference data structures ***********

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use snafu::prelude::*;

/// One ethical scenario, as listed in the overview table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CaseRecord {
    pub id: String,
    pub title: String,
    pub category: String,
    pub summary: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StakeholderRecord {
    pub case_id: String,
    pub name: String,
}

/// A potential concern. The description doubles as its key within the case.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ConcernRecord {
    pub case_id: String,
    pub description: String,
}

/// A possible resolution. The description doubles as its key within the case.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct OutcomeRecord {
    pub case_id: String,
    pub description: String,
}

// ********* Errors **********

/// A value handed to the response store that falls outside the closed sets
/// of the model, or that refers to something the case does not have.
///
/// The store rejects these synchronously and leaves its state untouched.
#[derive(Debug, Snafu, Eq, PartialEq, Clone)]
#[snafu(visibility(pub(crate)))]
pub enum ContractViolation {
    #[snafu(display("unknown level {token:?} (expected none, low, medium, high or primary)"))]
    UnknownLevel { token: String },
    #[snafu(display(
        "unknown dimension {token:?} (expected involvement, decision_power or ethical_complexity)"
    ))]
    UnknownDimension { token: String },
    #[snafu(display("unknown impact {token:?} (expected positive, neutral or negative)"))]
    UnknownImpact { token: String },
    #[snafu(display("unknown answer {token:?} (expected yes or no)"))]
    UnknownAnswer { token: String },
    #[snafu(display("severity must be between 1 and 3, but it was {value}"))]
    SeverityOutOfRange { value: i64 },
    #[snafu(display("unknown case {case:?}"))]
    UnknownCase { case: String },
    #[snafu(display("case {case:?} has no stakeholder {stakeholder:?}"))]
    UnknownStakeholder { case: String, stakeholder: String },
    #[snafu(display("case {case:?} has no concern {concern:?}"))]
    UnknownConcern { case: String, concern: String },
    #[snafu(display("case {case:?} has no outcome {outcome:?}"))]
    UnknownOutcome { case: String, outcome: String },
}

// ********* Answer scales **********

/// How strongly a stakeholder is tied to a case along one dimension.
///
/// The variants are declared in increasing order, so `Ord` follows the scale.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum Level {
    None,
    Low,
    Medium,
    High,
    Primary,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::None,
        Level::Low,
        Level::Medium,
        Level::High,
        Level::Primary,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Level::None => "none",
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
            Level::Primary => "primary",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::None => "None",
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
            Level::Primary => "Primary",
        }
    }
}

impl FromStr for Level {
    type Err = ContractViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .iter()
            .find(|l| l.token() == s)
            .copied()
            .context(UnknownLevelSnafu { token: s })
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The three independent scales a stakeholder is classified on.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum Dimension {
    /// The only dimension that gates completion.
    Involvement,
    DecisionPower,
    EthicalComplexity,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [
        Dimension::Involvement,
        Dimension::DecisionPower,
        Dimension::EthicalComplexity,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Dimension::Involvement => "involvement",
            Dimension::DecisionPower => "decision_power",
            Dimension::EthicalComplexity => "ethical_complexity",
        }
    }
}

impl FromStr for Dimension {
    type Err = ContractViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::ALL
            .iter()
            .find(|d| d.token() == s)
            .copied()
            .context(UnknownDimensionSnafu { token: s })
    }
}

/// How a selected outcome affects one stakeholder.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Impact {
    Positive,
    Neutral,
    Negative,
}

impl Impact {
    pub fn token(&self) -> &'static str {
        match self {
            Impact::Positive => "positive",
            Impact::Neutral => "neutral",
            Impact::Negative => "negative",
        }
    }
}

impl FromStr for Impact {
    type Err = ContractViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Impact::Positive),
            "neutral" => Ok(Impact::Neutral),
            "negative" => Ok(Impact::Negative),
            _ => UnknownImpactSnafu { token: s }.fail(),
        }
    }
}

/// Seriousness of a concern answered with yes: 1 (mild) to 3 (severe).
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct Severity(u8);

impl Severity {
    pub const MILD: Severity = Severity(1);
    pub const MODERATE: Severity = Severity(2);
    pub const SEVERE: Severity = Severity(3);

    pub fn new(value: i64) -> Result<Severity, ContractViolation> {
        ensure!((1..=3).contains(&value), SeverityOutOfRangeSnafu { value });
        Ok(Severity(value as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "Mild",
            2 => "Moderate",
            _ => "Severe",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::MILD
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn label(&self) -> &'static str {
        match self {
            Answer::Yes => "Yes",
            Answer::No => "No",
        }
    }
}

impl FromStr for Answer {
    type Err = ContractViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Answer::Yes),
            "no" => Ok(Answer::No),
            _ => UnknownAnswerSnafu { token: s }.fail(),
        }
    }
}

/// The state of a concern question. Kept as its own variant so that a
/// question nobody answered is never read as a "no".
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Default)]
pub enum ConcernVerdict {
    #[default]
    Unanswered,
    Answered(Answer),
}

// ********* Response state **********

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ConcernAnswer {
    pub verdict: ConcernVerdict,
    // Kept even when the verdict is not yes, so the slider position survives
    // a yes -> no -> yes round trip. Only exposed through `severity()`.
    pub(crate) severity: Severity,
    pub related_stakeholders: BTreeSet<String>,
}

impl ConcernAnswer {
    pub fn is_answered(&self) -> bool {
        matches!(self.verdict, ConcernVerdict::Answered(_))
    }

    /// The severity, only defined when the concern was answered with yes.
    pub fn severity(&self) -> Option<Severity> {
        match self.verdict {
            ConcernVerdict::Answered(Answer::Yes) => Some(self.severity),
            _ => None,
        }
    }
}

/// The placements of stakeholders on one dimension, in the order they were
/// placed (or reordered). Stakeholders at `Level::None` are not on the board.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct LevelBoard {
    placements: Vec<(String, Level)>,
}

impl LevelBoard {
    pub const EMPTY: LevelBoard = LevelBoard {
        placements: Vec::new(),
    };

    pub fn get(&self, stakeholder: &str) -> Level {
        self.placements
            .iter()
            .find(|(name, _)| name == stakeholder)
            .map(|(_, level)| *level)
            .unwrap_or(Level::None)
    }

    /// Places a stakeholder at the given level. `Level::None` takes it off the board.
    /// A stakeholder already on the board keeps its position.
    pub fn assign(&mut self, stakeholder: &str, level: Level) {
        let existing = self.position(stakeholder);
        match (existing, level) {
            (Some(idx), Level::None) => {
                self.placements.remove(idx);
            }
            (None, Level::None) => {}
            (Some(idx), l) => {
                self.placements[idx].1 = l;
            }
            (None, l) => {
                self.placements.push((stakeholder.to_string(), l));
            }
        }
    }

    /// Moves a stakeholder to a new position on the board. The index is clamped
    /// to the end of the board. Returns false if the stakeholder is not placed.
    pub fn move_to(&mut self, stakeholder: &str, index: usize) -> bool {
        match self.position(stakeholder) {
            Some(idx) => {
                let elt = self.placements.remove(idx);
                let target = index.min(self.placements.len());
                self.placements.insert(target, elt);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Level)> {
        self.placements.iter().map(|(n, l)| (n.as_str(), *l))
    }

    /// The placements sorted from the highest level down. Ties keep board order.
    pub fn ranked(&self) -> Vec<(&str, Level)> {
        let mut res: Vec<(&str, Level)> = self.iter().collect();
        res.sort_by_key(|(_, l)| std::cmp::Reverse(*l));
        res
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    fn position(&self, stakeholder: &str) -> Option<usize> {
        self.placements.iter().position(|(n, _)| n == stakeholder)
    }
}

/// Everything a respondent has said about one case so far.
///
/// Entries for stakeholders that were later deselected are kept in the level
/// boards and impact maps; they come back if the stakeholder is reselected.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CaseResponse {
    pub selected_stakeholders: BTreeSet<String>,
    pub involvement: LevelBoard,
    pub decision_power: LevelBoard,
    pub ethical_complexity: LevelBoard,
    pub concern_answers: BTreeMap<String, ConcernAnswer>,
    pub outcome_selections: BTreeSet<String>,
    /// outcome -> (stakeholder -> impact)
    pub outcome_impacts: BTreeMap<String, BTreeMap<String, Impact>>,
    pub comment: String,
    pub last_modified: Option<DateTime<Utc>>,
}

impl CaseResponse {
    pub const EMPTY: CaseResponse = CaseResponse {
        selected_stakeholders: BTreeSet::new(),
        involvement: LevelBoard::EMPTY,
        decision_power: LevelBoard::EMPTY,
        ethical_complexity: LevelBoard::EMPTY,
        concern_answers: BTreeMap::new(),
        outcome_selections: BTreeSet::new(),
        outcome_impacts: BTreeMap::new(),
        comment: String::new(),
        last_modified: None,
    };

    pub fn board(&self, dimension: Dimension) -> &LevelBoard {
        match dimension {
            Dimension::Involvement => &self.involvement,
            Dimension::DecisionPower => &self.decision_power,
            Dimension::EthicalComplexity => &self.ethical_complexity,
        }
    }

    pub(crate) fn board_mut(&mut self, dimension: Dimension) -> &mut LevelBoard {
        match dimension {
            Dimension::Involvement => &mut self.involvement,
            Dimension::DecisionPower => &mut self.decision_power,
            Dimension::EthicalComplexity => &mut self.ethical_complexity,
        }
    }

    pub fn level(&self, dimension: Dimension, stakeholder: &str) -> Level {
        self.board(dimension).get(stakeholder)
    }

    pub fn concern(&self, description: &str) -> Option<&ConcernAnswer> {
        self.concern_answers.get(description)
    }

    pub fn impact(&self, outcome: &str, stakeholder: &str) -> Option<Impact> {
        self.outcome_impacts
            .get(outcome)
            .and_then(|m| m.get(stakeholder))
            .copied()
    }
}

impl Default for CaseResponse {
    fn default() -> Self {
        CaseResponse::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_tokens_are_a_closed_set() {
        assert_eq!("primary".parse::<Level>(), Ok(Level::Primary));
        assert!(" Low ".parse::<Level>().is_err());
        assert!("Low".parse::<Level>().is_err());
        assert_eq!(
            "critical".parse::<Level>(),
            Err(ContractViolation::UnknownLevel {
                token: "critical".to_string()
            })
        );
        assert!(Level::None < Level::Low && Level::High < Level::Primary);
    }

    #[test]
    fn impact_and_dimension_tokens() {
        assert_eq!("negative".parse::<Impact>(), Ok(Impact::Negative));
        assert!("bad".parse::<Impact>().is_err());
        assert_eq!(
            "decision_power".parse::<Dimension>(),
            Ok(Dimension::DecisionPower)
        );
        assert!("decision-power".parse::<Dimension>().is_err());
        assert!("Yes".parse::<Answer>().is_err());
        assert_eq!("no".parse::<Answer>(), Ok(Answer::No));
        assert!("influence".parse::<Dimension>().is_err());
    }

    #[test]
    fn severity_range() {
        assert_eq!(Severity::new(2).map(|s| s.label()), Ok("Moderate"));
        assert_eq!(
            Severity::new(4),
            Err(ContractViolation::SeverityOutOfRange { value: 4 })
        );
        assert!(Severity::new(0).is_err());
        assert!(Severity::new(-1).is_err());
    }

    #[test]
    fn severity_only_defined_for_yes() {
        let mut a = ConcernAnswer {
            severity: Severity::SEVERE,
            ..Default::default()
        };
        assert_eq!(a.severity(), None);
        a.verdict = ConcernVerdict::Answered(Answer::No);
        assert_eq!(a.severity(), None);
        a.verdict = ConcernVerdict::Answered(Answer::Yes);
        assert_eq!(a.severity(), Some(Severity::SEVERE));
    }

    #[test]
    fn board_assign_move_and_rank() {
        let mut b = LevelBoard::default();
        b.assign("Engineer", Level::Low);
        b.assign("Customer", Level::High);
        b.assign("Regulator", Level::Low);
        // Re-assigning keeps the position.
        b.assign("Engineer", Level::Low);
        assert_eq!(b.len(), 3);

        assert!(b.move_to("Regulator", 0));
        assert!(!b.move_to("Nobody", 0));
        assert_eq!(
            b.ranked(),
            vec![
                ("Customer", Level::High),
                ("Regulator", Level::Low),
                ("Engineer", Level::Low)
            ]
        );

        b.assign("Customer", Level::None);
        assert_eq!(b.get("Customer"), Level::None);
        assert_eq!(b.len(), 2);

        assert!(b.move_to("Engineer", 99));
        let order: Vec<&str> = b.iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec!["Regulator", "Engineer"]);
    }
}
