use log::{debug, info, warn};

use case_eval::*;
use chrono::{DateTime, Utc};
use snafu::{prelude::*, Snafu};

use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod config_reader;
pub mod io_intents;
pub mod io_results;
pub mod io_tables;

use crate::args::Args;
use crate::eval::config_reader::*;
use crate::eval::io_intents::{read_intents, validate_intent};
use crate::eval::io_results::{resolve_output, write_output};
use crate::eval::io_tables::{load_reference_data, TablePaths};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EvalError {
    #[snafu(display(
        "Error loading evaluation data. Please check that the reference tables exist. ({table} table at {path}: {source})"
    ))]
    ResourceLoad {
        table: String,
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("Could not start the loader: {source}"))]
    Runtime { source: std::io::Error },
    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error serializing JSON: {source}"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Intent #{position} is invalid: {source}"))]
    InvalidIntent {
        position: usize,
        source: ContractViolation,
    },
    #[snafu(display("Intent #{position} is missing the field {field:?}"))]
    MissingIntentField { position: usize, field: String },
    #[snafu(display("Intent #{position} has an unknown kind {kind:?}"))]
    UnknownIntentKind { position: usize, kind: String },
    #[snafu(display("Error creating output {path}: {source}"))]
    CreatingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing results to {path}: {source}"))]
    WritingResults { source: csv::Error, path: String },
    #[snafu(display("No reference tables: pass a configuration file or a data directory"))]
    MissingSources {},
    #[snafu(display("Difference detected between the case statuses and the reference summary"))]
    ReferenceMismatch {},
}

pub type EvalResult<T> = Result<T, EvalError>;

/// The status of every case, without anything time-dependent. This is what
/// gets compared against a reference summary.
pub fn build_status_js(session: &Session) -> JSValue {
    let statuses = session.statuses();
    let p = Progress::from_statuses(&statuses);
    let cases: Vec<JSValue> = statuses
        .iter()
        .map(|(case_id, status)| json!({"case": case_id, "status": status.token()}))
        .collect();
    json!({
        "progress": {
            "total": p.total,
            "completed": p.completed,
            "inProgress": p.in_progress,
            "notStarted": p.not_started,
        },
        "cases": cases
    })
}

pub fn build_summary_js(session: &Session, completed_at: DateTime<Utc>) -> JSValue {
    let p = session.progress();
    json!({
        "evaluationInfo": {
            "startTime": export::format_timestamp(session.started_at()),
            "completionTime": export::format_timestamp(completed_at),
            "totalCases": p.total,
            "completedCases": p.completed,
        },
        "statuses": build_status_js(session)
    })
}

struct SessionPlan {
    root: PathBuf,
    config: EvalConfig,
    intents: Option<PathBuf>,
}

fn plan_session(args: &Args) -> EvalResult<SessionPlan> {
    let (root, config) = match (&args.config, &args.data_dir) {
        (Some(config_path), _) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (root, config)
        }
        (None, Some(dir)) => (PathBuf::from(dir), EvalConfig::default()),
        (None, None) => return MissingSourcesSnafu {}.fail(),
    };
    let intents = match &args.intents {
        Some(p) => Some(PathBuf::from(p)),
        None => config
            .intents_file
            .as_deref()
            .map(|p| resolve_path(&root, p)),
    };
    Ok(SessionPlan {
        root,
        config,
        intents,
    })
}

pub fn replay(session: &mut Session, intents_path: &Path) -> EvalResult<()> {
    let raw_intents = read_intents(intents_path)?;
    info!(
        "Replaying {} intents from {:?}",
        raw_intents.len(),
        intents_path
    );
    for (position, raw) in raw_intents.iter().enumerate() {
        let intent = validate_intent(position, raw)?;
        session
            .apply(&intent)
            .context(InvalidIntentSnafu { position })?;
    }
    Ok(())
}

pub fn run_session(args: &Args) -> EvalResult<()> {
    let plan = plan_session(args)?;
    info!("config: {:?}", plan.config);

    let paths = TablePaths::from_sources(&plan.root, &plan.config.table_sources);
    let reference = load_reference_data(&paths)?;
    let mut session = Session::new(reference);

    if let Some(intents_path) = &plan.intents {
        replay(&mut session, intents_path)?;
    } else {
        warn!("No intents file: the results will be empty");
    }

    for (case_id, status) in session.statuses() {
        debug!("case {}: {:?} {}", case_id, status, status.mark());
    }
    let p = session.progress();
    info!(
        "{} of {} cases completed ({:.1}%)",
        p.completed,
        p.total,
        p.percent_complete()
    );

    let completed_at = Utc::now();
    let summary_js = build_summary_js(&session, completed_at);
    let pretty_summary = serde_json::to_string_pretty(&summary_js).context(SerializingJsonSnafu {})?;
    info!("summary:{}", pretty_summary);

    let output = resolve_output(
        args.out.as_deref(),
        &plan.config.output_settings,
        &plan.root,
        completed_at,
    );
    let rows = result_rows(session.store());
    write_output(&output, &rows)?;
    if output != io_results::Output::Stdout {
        println!("summary:{}", pretty_summary);
    }

    // The reference summary, if provided for comparison
    if let Some(reference_p) = &args.reference {
        let reference_js = read_summary(reference_p)?;
        let pretty_reference =
            serde_json::to_string_pretty(&reference_js).context(SerializingJsonSnafu {})?;
        let pretty_status =
            serde_json::to_string_pretty(&build_status_js(&session))
                .context(SerializingJsonSnafu {})?;
        if pretty_reference != pretty_status {
            warn!("Found differences with the reference summary");
            print_diff(pretty_reference.as_str(), pretty_status.as_str(), "\n");
            return ReferenceMismatchSnafu {}.fail();
        }
    }

    Ok(())
}
