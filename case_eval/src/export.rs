// The rows of the results table produced at the end of a session.
// Only the cell contents are built here; quoting is left to the writer.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::model::*;
use crate::reference::ReferenceData;
use crate::store::ResponseStore;

pub const RESULT_HEADERS: [&str; 11] = [
    "case_id",
    "case_title",
    "case_category",
    "selected_stakeholders",
    "stakeholder_ranking",
    "decision_power_ranking",
    "ethical_complexity_ranking",
    "concerns_data",
    "outcomes_data",
    "additional_comments",
    "timestamp",
];

pub const LIST_SEPARATOR: &str = "; ";
pub const SEGMENT_SEPARATOR: &str = " | ";

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResultRow {
    pub case_id: String,
    pub case_title: String,
    pub case_category: String,
    pub selected_stakeholders: String,
    pub stakeholder_ranking: String,
    pub decision_power_ranking: String,
    pub ethical_complexity_ranking: String,
    pub concerns_data: String,
    pub outcomes_data: String,
    pub additional_comments: String,
    pub timestamp: String,
}

impl ResultRow {
    pub fn build(case: &CaseRecord, reference: &ReferenceData, response: &CaseResponse) -> ResultRow {
        // Reference order, so rows are stable whatever order things were clicked in.
        let selected: Vec<&str> = reference
            .stakeholders(&case.id)
            .iter()
            .filter(|s| response.selected_stakeholders.contains(s.as_str()))
            .map(|s| s.as_str())
            .collect();

        let concerns: Vec<String> = reference
            .concerns(&case.id)
            .iter()
            .filter_map(|c| response.concern(c).and_then(|a| concern_segment(c, a)))
            .collect();

        let outcomes: Vec<&str> = reference
            .outcomes(&case.id)
            .iter()
            .filter(|o| response.outcome_selections.contains(o.as_str()))
            .map(|o| o.as_str())
            .collect();

        ResultRow {
            case_id: case.id.clone(),
            case_title: case.title.clone(),
            case_category: case.category.clone(),
            selected_stakeholders: selected.join(LIST_SEPARATOR),
            stakeholder_ranking: ranking_cell(response, Dimension::Involvement),
            decision_power_ranking: ranking_cell(response, Dimension::DecisionPower),
            ethical_complexity_ranking: ranking_cell(response, Dimension::EthicalComplexity),
            concerns_data: concerns.join(SEGMENT_SEPARATOR),
            outcomes_data: outcomes.join(SEGMENT_SEPARATOR),
            additional_comments: response.comment.clone(),
            timestamp: response
                .last_modified
                .map(format_timestamp)
                .unwrap_or_default(),
        }
    }

    /// The cells in the order of `RESULT_HEADERS`.
    pub fn fields(&self) -> [&str; 11] {
        [
            &self.case_id,
            &self.case_title,
            &self.case_category,
            &self.selected_stakeholders,
            &self.stakeholder_ranking,
            &self.decision_power_ranking,
            &self.ethical_complexity_ranking,
            &self.concerns_data,
            &self.outcomes_data,
            &self.additional_comments,
            &self.timestamp,
        ]
    }
}

/// `Description: Yes (Severity: Moderate)` or `Description: No`. Unanswered
/// concerns have no segment.
fn concern_segment(description: &str, answer: &ConcernAnswer) -> Option<String> {
    match (answer.verdict, answer.severity()) {
        (ConcernVerdict::Answered(a), Some(sev)) => Some(format!(
            "{}: {} (Severity: {})",
            description,
            a.label(),
            sev.label()
        )),
        (ConcernVerdict::Answered(a), None) => Some(format!("{}: {}", description, a.label())),
        (ConcernVerdict::Unanswered, _) => None,
    }
}

// Selected stakeholders only, highest level first. Entries left behind by a
// deselected stakeholder stay in the response but are not reported.
fn ranking_cell(response: &CaseResponse, dimension: Dimension) -> String {
    response
        .board(dimension)
        .ranked()
        .iter()
        .filter(|(name, _)| response.selected_stakeholders.contains(*name))
        .map(|(name, level)| format!("{}: {}", name, level))
        .collect::<Vec<String>>()
        .join(LIST_SEPARATOR)
}

pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One row per case that has a response, in overview order.
pub fn result_rows(store: &ResponseStore) -> Vec<ResultRow> {
    let reference = store.reference();
    reference
        .cases()
        .iter()
        .filter(|c| store.has_response(&c.id))
        .map(|c| ResultRow::build(c, reference, store.snapshot(&c.id)))
        .collect()
}

pub fn results_file_name(prefix: &str, generated_at: DateTime<Utc>) -> String {
    format!("{}_{}.csv", prefix, generated_at.timestamp_millis())
}
