/*!

This is the long-form manual for `case_eval` and `caseval`.

## Reference tables

A session starts from four comma-separated tables. Each has one header row.
`Case` is the join key between them.

### overview

One row per case.

```text
Case,Title,Category,Summary
1,"Widget Recall","Safety","A batch of widgets overheats.
Customers have reported burns."
```

### stakeholders

```text
Case,Stakeholder
1,Engineer
1,Customer
```

### concerns

The description is also the key of the concern within its case.

```text
Case,Description
1,"Data leak risk"
```

### outcomes

The description is also the key of the outcome within its case.

```text
Case,Outcome
1,"Recall issued"
```

### Parsing rules

- Quoted fields may contain commas and line breaks.
- A quote toggles the quoted state; `""` inside a quoted field is a literal quote.
- Fields are trimmed, and one layer of wrapping quotes is removed.
- Blank lines between rows are ignored.
- Missing trailing fields read as empty, extra fields are dropped.
- Nothing is ever rejected. In particular, a quote that is never closed makes
  the rest of the file part of the same field.

## Completion

A case is *completed* when at least one stakeholder is selected, every concern
has a yes or no answer, at least one outcome is selected, and every selected
stakeholder has an involvement level. Decision power and ethical complexity
are optional. A case with any selection, answer or involvement level is
*in progress*; otherwise it is *not started*.

## Session files

`caseval` replays a session from a JSON array of intents. Tokens are checked
against closed sets: levels `none|low|medium|high|primary`, dimensions
`involvement|decision_power|ethical_complexity`, impacts
`positive|neutral|negative`, answers `yes|no`, severities `1..=3`.

```text
[
  {"intent": "select_stakeholder", "case": "1", "stakeholder": "Engineer", "selected": true},
  {"intent": "set_level", "case": "1", "dimension": "involvement", "stakeholder": "Engineer", "level": "low"},
  {"intent": "move_ranked", "case": "1", "dimension": "involvement", "stakeholder": "Engineer", "index": 0},
  {"intent": "answer_concern", "case": "1", "concern": "Data leak risk", "answer": "yes"},
  {"intent": "set_severity", "case": "1", "concern": "Data leak risk", "severity": 2},
  {"intent": "toggle_concern_stakeholder", "case": "1", "concern": "Data leak risk", "stakeholder": "Engineer", "related": true},
  {"intent": "toggle_outcome", "case": "1", "outcome": "Recall issued", "selected": true},
  {"intent": "set_impact", "case": "1", "outcome": "Recall issued", "stakeholder": "Engineer", "impact": "neutral"},
  {"intent": "set_comment", "case": "1", "text": "Borderline"}
]
```

The whole session stops at the first invalid intent.

## Results

The results table has the columns

```text
case_id,case_title,case_category,selected_stakeholders,stakeholder_ranking,decision_power_ranking,ethical_complexity_ranking,concerns_data,outcomes_data,additional_comments,timestamp
```

- list cells join their members with `; `
- ranking cells read `Name: Level`, highest level first
- `concerns_data` has one `Description: Yes (Severity: Moderate)` or
  `Description: No` segment per answered concern, joined with ` | `
- `outcomes_data` joins the selected outcomes with ` | `
- every cell is quoted and embedded quotes are doubled

The file is named `<prefix>_<milliseconds since epoch>.csv`.

## Configuration

```text
{
  "tableSources": {
    "overview": "overview.csv",
    "stakeholders": "stakeholders.csv",
    "concerns": "concerns.csv",
    "outcomes": "outcomes.csv"
  },
  "outputSettings": {
    "outputDirectory": "results",
    "filePrefix": "evaluation_results"
  },
  "intentsFile": "session.json"
}
```

Relative paths are read from the directory of the configuration file.
 */
