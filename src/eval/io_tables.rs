// Loading of the four reference tables.

use std::path::{Path, PathBuf};

use case_eval::{tabular, ReferenceData};
use log::{debug, info};
use snafu::prelude::*;

use crate::eval::config_reader::{resolve_path, TableSources};
use crate::eval::*;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TablePaths {
    pub overview: PathBuf,
    pub stakeholders: PathBuf,
    pub concerns: PathBuf,
    pub outcomes: PathBuf,
}

impl TablePaths {
    pub fn from_sources(root: &Path, sources: &TableSources) -> TablePaths {
        TablePaths {
            overview: resolve_path(root, &sources.overview),
            stakeholders: resolve_path(root, &sources.stakeholders),
            concerns: resolve_path(root, &sources.concerns),
            outcomes: resolve_path(root, &sources.outcomes),
        }
    }
}

async fn fetch_table(table: &str, path: &Path) -> EvalResult<String> {
    info!("Attempting to read {} table {:?}", table, path);
    let contents = tokio::fs::read_to_string(path)
        .await
        .context(ResourceLoadSnafu {
            table,
            path: path.display().to_string(),
        })?;
    debug!("fetch_table: {}: {} bytes", table, contents.len());
    Ok(contents)
}

/// Reads the four tables concurrently. Any failure aborts the whole load:
/// there is no partial reference data.
pub async fn load_tables(paths: &TablePaths) -> EvalResult<ReferenceData> {
    let (overview, stakeholders, concerns, outcomes) = tokio::try_join!(
        fetch_table("overview", &paths.overview),
        fetch_table("stakeholders", &paths.stakeholders),
        fetch_table("concerns", &paths.concerns),
        fetch_table("outcomes", &paths.outcomes),
    )?;
    Ok(ReferenceData::from_tables(
        &tabular::parse(&overview),
        &tabular::parse(&stakeholders),
        &tabular::parse(&concerns),
        &tabular::parse(&outcomes),
    ))
}

pub fn load_reference_data(paths: &TablePaths) -> EvalResult<ReferenceData> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context(RuntimeSnafu {})?;
    rt.block_on(load_tables(paths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_tables(dir: &Path) {
        fs::write(
            dir.join("overview.csv"),
            "Case,Title,Category,Summary\n1,\"Widget Recall\",\"Safety\",\"Line one\nLine two\"\n",
        )
        .unwrap();
        fs::write(
            dir.join("stakeholders.csv"),
            "Case,Stakeholder\n1,Engineer\n1,Customer\n",
        )
        .unwrap();
        fs::write(dir.join("concerns.csv"), "Case,Description\n1,Data leak risk\n").unwrap();
        fs::write(dir.join("outcomes.csv"), "Case,Outcome\n1,Recall issued\n").unwrap();
    }

    #[test]
    fn loads_all_four_tables() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path());
        let paths = TablePaths::from_sources(dir.path(), &TableSources::default());
        let reference = load_reference_data(&paths).unwrap();
        assert_eq!(
            reference.case("1").map(|c| c.summary.as_str()),
            Some("Line one\nLine two")
        );
        assert_eq!(reference.stakeholders("1").len(), 2);
        assert!(reference.has_concern("1", "Data leak risk"));
        assert!(reference.has_outcome("1", "Recall issued"));
    }

    #[test]
    fn one_missing_table_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path());
        fs::remove_file(dir.path().join("concerns.csv")).unwrap();
        let paths = TablePaths::from_sources(dir.path(), &TableSources::default());
        match load_reference_data(&paths) {
            Err(EvalError::ResourceLoad { table, .. }) => assert_eq!(table, "concerns"),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
