/*!
Response model for structured evaluations of ethical case studies.

For every case, a respondent selects stakeholders, places them on three
independent scales (involvement, decision power, ethical complexity), answers
yes/no concern questions, picks outcomes with per-stakeholder impacts, and
leaves a comment. This crate holds:

- [`tabular`]: a forgiving reader for the comma-separated reference tables
- [`reference`]: cases, stakeholders, concerns and outcomes, grouped by case
- [`store`]: the per-case response state, changed only through [`Intent`]s
- [`completion`]: the not started / in progress / completed classification
- [`session`]: case navigation and progress
- [`export`]: the rows of the results table

```
use case_eval::*;

let reference = ReferenceBuilder::new()
    .case("1", "Widget Recall", "Safety", "")
    .stakeholders("1", &["Engineer"])
    .outcome("1", "Recall issued")
    .build();
let mut store = ResponseStore::new(reference);

store.select_stakeholder("1", "Engineer", true)?;
store.set_level("1", Dimension::Involvement, "Engineer", "high".parse()?)?;
store.toggle_outcome("1", "Recall issued", true)?;

let status = classify("1", store.reference(), store.snapshot("1"));
assert_eq!(status, CaseStatus::Completed);
# Ok::<(), ContractViolation>(())
```
*/

mod model;

pub mod completion;
pub mod export;
pub mod manual;
pub mod reference;
pub mod session;
pub mod store;
pub mod tabular;

pub use crate::completion::{classify, CaseStatus, Progress};
pub use crate::export::{result_rows, ResultRow, RESULT_HEADERS};
pub use crate::model::*;
pub use crate::reference::{ReferenceBuilder, ReferenceData};
pub use crate::session::{Navigation, Session};
pub use crate::store::{Intent, ResponseStore};
