// Session files: the recorded intents of a respondent, in order.

use std::fs;
use std::path::Path;

use case_eval::*;
use log::debug;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::eval::*;

/// An intent as written in the session file. Tokens are kept as strings
/// until validation.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawIntent {
    pub intent: String,
    pub case: String,
    pub stakeholder: Option<String>,
    pub dimension: Option<String>,
    pub level: Option<String>,
    pub index: Option<usize>,
    pub concern: Option<String>,
    pub answer: Option<String>,
    pub severity: Option<i64>,
    pub related: Option<bool>,
    pub outcome: Option<String>,
    pub selected: Option<bool>,
    pub impact: Option<String>,
    pub text: Option<String>,
}

pub fn read_intents(path: &Path) -> EvalResult<Vec<RawIntent>> {
    let p = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path: p })?;
    let intents: Vec<RawIntent> = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_intents: {} intents", intents.len());
    Ok(intents)
}

fn field<T: Clone>(position: usize, name: &str, value: &Option<T>) -> EvalResult<T> {
    value.clone().context(MissingIntentFieldSnafu {
        position,
        field: name,
    })
}

/// Checks the tokens of a raw intent against the closed sets of the model.
pub fn validate_intent(position: usize, raw: &RawIntent) -> EvalResult<Intent> {
    let case = raw.case.clone();
    let stakeholder = || field(position, "stakeholder", &raw.stakeholder);
    let concern = || field(position, "concern", &raw.concern);
    let outcome = || field(position, "outcome", &raw.outcome);
    let dimension = || -> EvalResult<Dimension> {
        field(position, "dimension", &raw.dimension)?
            .parse()
            .context(InvalidIntentSnafu { position })
    };

    let res = match raw.intent.as_str() {
        "select_stakeholder" => Intent::SelectStakeholder {
            case,
            stakeholder: stakeholder()?,
            selected: field(position, "selected", &raw.selected)?,
        },
        "set_level" => Intent::SetLevel {
            case,
            dimension: dimension()?,
            stakeholder: stakeholder()?,
            level: field(position, "level", &raw.level)?
                .parse()
                .context(InvalidIntentSnafu { position })?,
        },
        "move_ranked" => Intent::MoveRanked {
            case,
            dimension: dimension()?,
            stakeholder: stakeholder()?,
            index: field(position, "index", &raw.index)?,
        },
        "answer_concern" => Intent::AnswerConcern {
            case,
            concern: concern()?,
            answer: field(position, "answer", &raw.answer)?
                .parse()
                .context(InvalidIntentSnafu { position })?,
        },
        "set_severity" => Intent::SetSeverity {
            case,
            concern: concern()?,
            severity: Severity::new(field(position, "severity", &raw.severity)?)
                .context(InvalidIntentSnafu { position })?,
        },
        "toggle_concern_stakeholder" => Intent::ToggleConcernStakeholder {
            case,
            concern: concern()?,
            stakeholder: stakeholder()?,
            related: field(position, "related", &raw.related)?,
        },
        "toggle_outcome" => Intent::ToggleOutcome {
            case,
            outcome: outcome()?,
            selected: field(position, "selected", &raw.selected)?,
        },
        "set_impact" => Intent::SetImpact {
            case,
            outcome: outcome()?,
            stakeholder: stakeholder()?,
            impact: field(position, "impact", &raw.impact)?
                .parse()
                .context(InvalidIntentSnafu { position })?,
        },
        "set_comment" => Intent::SetComment {
            case,
            text: raw.text.clone().unwrap_or_default(),
        },
        x => {
            return UnknownIntentKindSnafu { position, kind: x }.fail();
        }
    };
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(js: &str) -> RawIntent {
        serde_json::from_str(js).unwrap()
    }

    #[test]
    fn valid_intents() {
        let i = validate_intent(
            0,
            &raw(r#"{"intent": "set_level", "case": "1", "dimension": "involvement", "stakeholder": "Engineer", "level": "low"}"#),
        )
        .unwrap();
        assert_eq!(
            i,
            Intent::SetLevel {
                case: "1".to_string(),
                dimension: Dimension::Involvement,
                stakeholder: "Engineer".to_string(),
                level: Level::Low
            }
        );

        let i = validate_intent(
            1,
            &raw(r#"{"intent": "set_severity", "case": "1", "concern": "Data leak risk", "severity": 3}"#),
        )
        .unwrap();
        assert_eq!(
            i,
            Intent::SetSeverity {
                case: "1".to_string(),
                concern: "Data leak risk".to_string(),
                severity: Severity::SEVERE
            }
        );
    }

    #[test]
    fn out_of_set_tokens_are_rejected() {
        let res = validate_intent(
            4,
            &raw(r#"{"intent": "set_impact", "case": "1", "outcome": "Recall issued", "stakeholder": "Engineer", "impact": "great"}"#),
        );
        match res {
            Err(EvalError::InvalidIntent { position, source }) => {
                assert_eq!(position, 4);
                assert_eq!(
                    source,
                    ContractViolation::UnknownImpact {
                        token: "great".to_string()
                    }
                );
            }
            other => panic!("unexpected result {:?}", other),
        }

        let res = validate_intent(
            2,
            &raw(r#"{"intent": "set_severity", "case": "1", "concern": "Data leak risk", "severity": 7}"#),
        );
        assert!(matches!(res, Err(EvalError::InvalidIntent { position: 2, .. })));

        // Tokens are not case folded.
        let res = validate_intent(
            5,
            &raw(r#"{"intent": "answer_concern", "case": "1", "concern": "Data leak risk", "answer": "Yes"}"#),
        );
        assert!(matches!(
            res,
            Err(EvalError::InvalidIntent {
                position: 5,
                source: ContractViolation::UnknownAnswer { .. }
            })
        ));
    }

    #[test]
    fn missing_fields_and_unknown_kinds() {
        let res = validate_intent(0, &raw(r#"{"intent": "toggle_outcome", "case": "1", "outcome": "Recall issued"}"#));
        assert!(matches!(
            res,
            Err(EvalError::MissingIntentField { position: 0, ref field }) if field == "selected"
        ));

        let res = validate_intent(3, &raw(r#"{"intent": "undo", "case": "1"}"#));
        assert!(matches!(res, Err(EvalError::UnknownIntentKind { position: 3, .. })));
    }
}
