use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::eval::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TableSources {
    pub overview: String,
    pub stakeholders: String,
    pub concerns: String,
    pub outcomes: String,
}

impl Default for TableSources {
    fn default() -> Self {
        TableSources {
            overview: "overview.csv".to_string(),
            stakeholders: "stakeholders.csv".to_string(),
            concerns: "concerns.csv".to_string(),
            outcomes: "outcomes.csv".to_string(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "filePrefix")]
    pub file_prefix: Option<String>,
}

impl OutputSettings {
    pub const DEFAULT_PREFIX: &'static str = "evaluation_results";

    pub fn file_prefix(&self) -> &str {
        self.file_prefix
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(OutputSettings::DEFAULT_PREFIX)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvalConfig {
    #[serde(rename = "tableSources", default)]
    pub table_sources: TableSources,
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "intentsFile")]
    pub intents_file: Option<String>,
}

pub fn read_config(path: &str) -> EvalResult<EvalConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: {:?}", contents);
    let config: EvalConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> EvalResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(&contents).context(ParsingJsonSnafu {})
}

/// Relative paths are taken from the directory of the configuration.
pub fn resolve_path(root: &Path, p: &str) -> PathBuf {
    root.join(p)
}
