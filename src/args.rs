use clap::Parser;

/// Replays an evaluation session over a set of ethical case studies and writes the results table.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON configuration of the session: where the reference tables are,
    /// where the results go. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (directory, optional) A directory containing overview.csv, stakeholders.csv, concerns.csv and
    /// outcomes.csv. Only used when no configuration file is given.
    #[clap(short, long, value_parser)]
    pub data_dir: Option<String>,

    /// (file path, optional) A JSON file with the intents of the session, in order. Setting this option
    /// overrides the intents file of the configuration.
    #[clap(short, long, value_parser)]
    pub intents: Option<String>,

    /// (directory, .csv file path, 'stdout' or empty) Where the results table is written. A directory
    /// receives a time-stamped file. Setting this option overrides the output directory of the configuration.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference status summary in JSON format. If provided, caseval will check that the
    /// status of every case matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
