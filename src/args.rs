use clap::Parser;

/// Reconciles the county and statewide results of one election snapshot.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file naming the snapshot files and the output directory.
    /// For more information about the file format, read the manual of the election_graph crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The version header of the snapshot. Overrides the configuration.
    #[clap(long, value_parser)]
    pub version_file: Option<String>,

    /// (file path) The county results of the snapshot. Overrides the configuration.
    #[clap(long, value_parser)]
    pub county_file: Option<String>,

    /// (file path) The statewide office results of the snapshot. Overrides the configuration.
    #[clap(long, value_parser)]
    pub office_file: Option<String>,

    /// (file path, optional) A CSV file with candidate endorsements. Overrides the configuration.
    #[clap(short, long, value_parser)]
    pub endorsements: Option<String>,

    /// (directory) Where the JSON and CSV files are written. Overrides the configuration.
    /// Defaults to the current directory.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A previously written JSON result file. If provided, txresults will
    /// check that the new result graph matches it.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, also writes the cross-tabulation of the statewide results.
    #[clap(long, takes_value = false)]
    pub crosstab: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
