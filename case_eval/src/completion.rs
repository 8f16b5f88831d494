use log::debug;

use crate::model::*;
use crate::reference::ReferenceData;
use crate::store::ResponseStore;

/// Where a respondent stands on one case.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum CaseStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl CaseStatus {
    pub fn token(&self) -> &'static str {
        match self {
            CaseStatus::NotStarted => "not_started",
            CaseStatus::InProgress => "in_progress",
            CaseStatus::Completed => "completed",
        }
    }

    /// The mark shown next to a case in the navigation list.
    pub fn mark(&self) -> &'static str {
        match self {
            CaseStatus::NotStarted => "",
            CaseStatus::InProgress => "…",
            CaseStatus::Completed => "✓",
        }
    }
}

/// Classifies a response.
///
/// A case is completed when:
/// - at least one stakeholder is selected
/// - every concern of the case has a yes or no answer
/// - at least one outcome is selected
/// - every selected stakeholder has an involvement level
///
/// Decision power and ethical complexity do not gate completion.
pub fn classify(case: &str, reference: &ReferenceData, response: &CaseResponse) -> CaseStatus {
    let has_stakeholders = !response.selected_stakeholders.is_empty();
    let has_outcomes = !response.outcome_selections.is_empty();

    let all_concerns_answered = reference.concerns(case).iter().all(|c| {
        response
            .concern(c)
            .map(|a| a.is_answered())
            .unwrap_or(false)
    });
    let all_involved = response
        .selected_stakeholders
        .iter()
        .all(|s| response.level(Dimension::Involvement, s) != Level::None);

    if has_stakeholders && all_concerns_answered && has_outcomes && all_involved {
        return CaseStatus::Completed;
    }

    let any_concern_answered = response.concern_answers.values().any(|a| a.is_answered());
    let any_involvement = !response.involvement.is_empty();
    let status = if has_stakeholders || any_concern_answered || has_outcomes || any_involvement {
        CaseStatus::InProgress
    } else {
        CaseStatus::NotStarted
    };
    debug!(
        "classify: case {:?}: stakeholders:{} concerns:{} outcomes:{} involvement:{} -> {:?}",
        case, has_stakeholders, all_concerns_answered, has_outcomes, all_involved, status
    );
    status
}

/// Classifies every case of the store, in overview order.
pub fn statuses(store: &ResponseStore) -> Vec<(String, CaseStatus)> {
    let reference = store.reference();
    reference
        .cases()
        .iter()
        .map(|c| {
            (
                c.id.clone(),
                classify(&c.id, reference, store.snapshot(&c.id)),
            )
        })
        .collect()
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
}

impl Progress {
    pub fn from_statuses(statuses: &[(String, CaseStatus)]) -> Progress {
        let mut p = Progress {
            total: statuses.len(),
            ..Default::default()
        };
        for (_, s) in statuses.iter() {
            match s {
                CaseStatus::Completed => p.completed += 1,
                CaseStatus::InProgress => p.in_progress += 1,
                CaseStatus::NotStarted => p.not_started += 1,
            }
        }
        p
    }

    /// Share of completed cases, between 0 and 100.
    pub fn percent_complete(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.completed as f64) * 100.0 / (self.total as f64)
    }

    pub fn is_done(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

pub fn progress(store: &ResponseStore) -> Progress {
    Progress::from_statuses(&statuses(store))
}
