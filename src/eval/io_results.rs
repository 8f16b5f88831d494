// Writing of the results table.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use case_eval::export::results_file_name;
use case_eval::{ResultRow, RESULT_HEADERS};
use chrono::{DateTime, Utc};
use log::info;
use snafu::prelude::*;

use crate::eval::config_reader::{resolve_path, OutputSettings};
use crate::eval::*;

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

/// Where the results go. The command line wins over the configuration. A
/// directory receives a file named after the generation time.
pub fn resolve_output(
    out: Option<&str>,
    settings: &OutputSettings,
    root: &Path,
    generated_at: DateTime<Utc>,
) -> Output {
    let file_name = results_file_name(settings.file_prefix(), generated_at);
    match out {
        Some("stdout") => Output::Stdout,
        Some(p) if p.ends_with(".csv") => Output::File(PathBuf::from(p)),
        Some(p) => Output::File(Path::new(p).join(file_name)),
        None => {
            let dir = settings
                .output_directory
                .as_deref()
                .map(|d| resolve_path(root, d))
                .unwrap_or_else(|| root.to_path_buf());
            Output::File(dir.join(file_name))
        }
    }
}

/// The header row is written as is; every data cell is quoted and embedded
/// quotes are doubled.
pub fn write_results<W: Write>(mut w: W, rows: &[ResultRow]) -> Result<(), csv::Error> {
    writeln!(w, "{}", RESULT_HEADERS.join(","))?;
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(w);
    for row in rows.iter() {
        wtr.write_record(row.fields())?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_output(output: &Output, rows: &[ResultRow]) -> EvalResult<()> {
    match output {
        Output::Stdout => {
            let stdout = io::stdout();
            write_results(stdout.lock(), rows).context(WritingResultsSnafu { path: "stdout" })
        }
        Output::File(p) => {
            let path = p.display().to_string();
            if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(parent).context(CreatingOutputSnafu { path: path.clone() })?;
            }
            let f = fs::File::create(p).context(CreatingOutputSnafu { path: path.clone() })?;
            info!("Writing {} result rows to {:?}", rows.len(), path);
            write_results(f, rows).context(WritingResultsSnafu { path })
        }
    }
}
