use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::completion::{self, CaseStatus, Progress};
use crate::model::*;
use crate::reference::ReferenceData;
use crate::store::{Intent, ResponseStore};

/// Moving between cases.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Navigation {
    Next,
    Previous,
    GoTo(usize),
}

/// One evaluation session: the responses, and which case is on screen.
#[derive(Debug)]
pub struct Session {
    store: ResponseStore,
    cursor: usize,
    started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(reference: ReferenceData) -> Session {
        Session::with_store(ResponseStore::new(reference), Utc::now())
    }

    pub fn with_store(store: ResponseStore, started_at: DateTime<Utc>) -> Session {
        info!(
            "Starting session with {} cases",
            store.reference().cases().len()
        );
        Session {
            store,
            cursor: 0,
            started_at,
        }
    }

    pub fn store(&self) -> &ResponseStore {
        &self.store
    }

    pub fn reference(&self) -> &ReferenceData {
        self.store.reference()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn apply(&mut self, intent: &Intent) -> Result<(), ContractViolation> {
        self.store.apply(intent)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&CaseRecord> {
        self.reference().cases().get(self.cursor)
    }

    pub fn current_status(&self) -> Option<CaseStatus> {
        self.current().map(|c| {
            completion::classify(&c.id, self.reference(), self.store.snapshot(&c.id))
        })
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 >= self.reference().cases().len()
    }

    /// Returns true if the cursor moved. Moving past either end, or to an
    /// index with no case, is ignored.
    pub fn navigate(&mut self, nav: Navigation) -> bool {
        let num_cases = self.reference().cases().len();
        let target = match nav {
            Navigation::Next if !self.is_last() => Some(self.cursor + 1),
            Navigation::Previous if self.cursor > 0 => Some(self.cursor - 1),
            Navigation::GoTo(idx) if idx < num_cases => Some(idx),
            _ => None,
        };
        match target {
            Some(idx) if idx != self.cursor => {
                debug!("navigate: {:?}: {} -> {}", nav, self.cursor, idx);
                self.cursor = idx;
                true
            }
            _ => false,
        }
    }

    /// "Case N of M", 1-based.
    pub fn counter_label(&self) -> String {
        let num_cases = self.reference().cases().len();
        let current = if num_cases == 0 { 0 } else { self.cursor + 1 };
        format!("Case {} of {}", current, num_cases)
    }

    pub fn statuses(&self) -> Vec<(String, CaseStatus)> {
        completion::statuses(&self.store)
    }

    pub fn progress(&self) -> Progress {
        completion::progress(&self.store)
    }
}
