use std::collections::HashMap;

use log::{debug, warn};

use crate::model::*;
use crate::tabular::Record;

// Column names of the reference tables.
pub const CASE_COLUMN: &str = "Case";
pub const TITLE_COLUMN: &str = "Title";
pub const CATEGORY_COLUMN: &str = "Category";
pub const SUMMARY_COLUMN: &str = "Summary";
pub const STAKEHOLDER_COLUMN: &str = "Stakeholder";
pub const DESCRIPTION_COLUMN: &str = "Description";
pub const OUTCOME_COLUMN: &str = "Outcome";

/// The cases under evaluation and, for each of them, the stakeholders,
/// concerns and outcomes a respondent can pick from.
///
/// Every list keeps the order of the input tables.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ReferenceData {
    cases: Vec<CaseRecord>,
    stakeholders: HashMap<String, Vec<String>>,
    concerns: HashMap<String, Vec<String>>,
    outcomes: HashMap<String, Vec<String>>,
}

impl ReferenceData {
    /// Assembles the four parsed tables (overview, stakeholders, concerns, outcomes).
    pub fn from_tables(
        overview: &[Record],
        stakeholders: &[Record],
        concerns: &[Record],
        outcomes: &[Record],
    ) -> ReferenceData {
        let mut res = ReferenceData::default();
        for r in overview.iter() {
            res.push_case(CaseRecord {
                id: r.get(CASE_COLUMN).to_string(),
                title: r.get(TITLE_COLUMN).to_string(),
                category: r.get(CATEGORY_COLUMN).to_string(),
                summary: r.get(SUMMARY_COLUMN).to_string(),
            });
        }
        for r in stakeholders.iter() {
            res.push_stakeholder(StakeholderRecord {
                case_id: r.get(CASE_COLUMN).to_string(),
                name: r.get(STAKEHOLDER_COLUMN).to_string(),
            });
        }
        for r in concerns.iter() {
            res.push_concern(ConcernRecord {
                case_id: r.get(CASE_COLUMN).to_string(),
                description: r.get(DESCRIPTION_COLUMN).to_string(),
            });
        }
        for r in outcomes.iter() {
            res.push_outcome(OutcomeRecord {
                case_id: r.get(CASE_COLUMN).to_string(),
                description: r.get(OUTCOME_COLUMN).to_string(),
            });
        }
        debug!(
            "from_tables: {} cases, {} stakeholders, {} concerns, {} outcomes",
            res.cases.len(),
            res.stakeholders.values().map(|v| v.len()).sum::<usize>(),
            res.concerns.values().map(|v| v.len()).sum::<usize>(),
            res.outcomes.values().map(|v| v.len()).sum::<usize>()
        );
        res
    }

    pub fn cases(&self) -> &[CaseRecord] {
        &self.cases
    }

    pub fn case(&self, case_id: &str) -> Option<&CaseRecord> {
        self.cases.iter().find(|c| c.id == case_id)
    }

    /// Position of the case in the overview order.
    pub fn position(&self, case_id: &str) -> Option<usize> {
        self.cases.iter().position(|c| c.id == case_id)
    }

    pub fn stakeholders(&self, case_id: &str) -> &[String] {
        self.stakeholders
            .get(case_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn concerns(&self, case_id: &str) -> &[String] {
        self.concerns
            .get(case_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn outcomes(&self, case_id: &str) -> &[String] {
        self.outcomes
            .get(case_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_stakeholder(&self, case_id: &str, name: &str) -> bool {
        self.stakeholders(case_id).iter().any(|s| s == name)
    }

    pub fn has_concern(&self, case_id: &str, description: &str) -> bool {
        self.concerns(case_id).iter().any(|s| s == description)
    }

    pub fn has_outcome(&self, case_id: &str, description: &str) -> bool {
        self.outcomes(case_id).iter().any(|s| s == description)
    }

    fn push_case(&mut self, case: CaseRecord) {
        if case.id.is_empty() {
            warn!("push_case: skipping overview row without a case id: {:?}", case);
            return;
        }
        if self.case(&case.id).is_some() {
            warn!("push_case: duplicate case id {:?}, keeping the first row", case.id);
            return;
        }
        self.cases.push(case);
    }

    fn push_stakeholder(&mut self, s: StakeholderRecord) {
        self.check_case_exists(&s.case_id, "stakeholder");
        push_unique(&mut self.stakeholders, s.case_id, s.name);
    }

    fn push_concern(&mut self, c: ConcernRecord) {
        self.check_case_exists(&c.case_id, "concern");
        push_unique(&mut self.concerns, c.case_id, c.description);
    }

    fn push_outcome(&mut self, o: OutcomeRecord) {
        self.check_case_exists(&o.case_id, "outcome");
        push_unique(&mut self.outcomes, o.case_id, o.description);
    }

    // Rows pointing at a case that is not in the overview are still kept.
    fn check_case_exists(&self, case_id: &str, kind: &str) {
        if !self.cases.is_empty() && self.case(case_id).is_none() {
            warn!(
                "{} row refers to case {:?}, which is not in the overview",
                kind, case_id
            );
        }
    }
}

fn push_unique(m: &mut HashMap<String, Vec<String>>, case_id: String, value: String) {
    let l = m.entry(case_id).or_default();
    if !l.contains(&value) {
        l.push(value);
    }
}

/// A builder for reference data, for callers that do not start from tables.
///
/// ```
/// use case_eval::reference::ReferenceBuilder;
///
/// let reference = ReferenceBuilder::new()
///     .case("1", "Widget Recall", "Safety", "A faulty widget.")
///     .stakeholders("1", &["Engineer", "Customer"])
///     .concern("1", "Data leak risk")
///     .outcome("1", "Recall issued")
///     .build();
///
/// assert_eq!(reference.stakeholders("1").len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ReferenceBuilder {
    data: ReferenceData,
}

impl ReferenceBuilder {
    pub fn new() -> ReferenceBuilder {
        ReferenceBuilder::default()
    }

    pub fn case(mut self, id: &str, title: &str, category: &str, summary: &str) -> ReferenceBuilder {
        self.data.push_case(CaseRecord {
            id: id.to_string(),
            title: title.to_string(),
            category: category.to_string(),
            summary: summary.to_string(),
        });
        self
    }

    pub fn stakeholders(mut self, case_id: &str, names: &[&str]) -> ReferenceBuilder {
        for name in names {
            self.data.push_stakeholder(StakeholderRecord {
                case_id: case_id.to_string(),
                name: name.to_string(),
            });
        }
        self
    }

    pub fn concern(mut self, case_id: &str, description: &str) -> ReferenceBuilder {
        self.data.push_concern(ConcernRecord {
            case_id: case_id.to_string(),
            description: description.to_string(),
        });
        self
    }

    pub fn outcome(mut self, case_id: &str, description: &str) -> ReferenceBuilder {
        self.data.push_outcome(OutcomeRecord {
            case_id: case_id.to_string(),
            description: description.to_string(),
        });
        self
    }

    pub fn build(self) -> ReferenceData {
        self.data
    }
}
