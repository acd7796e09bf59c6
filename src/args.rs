use clap::Parser;

/// Assigns students to houses, balanced within every stream, semester and gender.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. All the keys are optional, see the
    /// documentation of the house_assignment crate for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (folder path, default Data) The folder containing the Excel rosters, one file per stream.
    /// Setting this option overrides the folder that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub data: Option<String>,

    /// (integer, optional) The random seed of the assignment. Without it, a seed is drawn
    /// and printed in the logs so that the run can be replayed.
    #[clap(short, long, value_parser)]
    pub seed: Option<u64>,

    /// If passed as an argument, the house cells are printed without colors.
    #[clap(long, takes_value = false)]
    pub no_color: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Shows the raw student data. Requires the admin password.
    View(ViewArgs),
    /// Assigns the houses and shows the distribution.
    Distribution(DistributionArgs),
    /// Assigns the houses and draws the charts as SVG files.
    Charts(ChartArgs),
    /// Assigns the houses and writes the workbook, one sheet per stream and gender.
    Export(ExportArgs),
    /// Checks that an exported workbook gives the same houses as a reference workbook.
    Check(CheckArgs),
}

/// The filters of a page. Each one can be repeated; without any value the
/// dimension is not filtered.
#[derive(clap::Args, Debug, Clone)]
pub struct FilterArgs {
    #[clap(long = "stream", value_parser)]
    pub streams: Vec<String>,
    #[clap(long = "semester", value_parser)]
    pub semesters: Vec<String>,
    /// (default: the configured genders)
    #[clap(long = "gender", value_parser)]
    pub genders: Vec<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ViewArgs {
    #[clap(flatten)]
    pub filters: FilterArgs,
    /// The columns to show. Can be repeated. By default, the configured default columns.
    #[clap(long = "column", value_parser)]
    pub columns: Vec<String>,
    /// The admin password.
    #[clap(short, long, value_parser)]
    pub password: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DistributionArgs {
    #[clap(flatten)]
    pub filters: FilterArgs,
    /// (file path, optional) If specified, the workbook of the whole distribution is also written there.
    #[clap(short, long, value_parser)]
    pub export: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChartArgs {
    /// The streams to draw. Can be repeated. By default, all the streams.
    #[clap(long = "stream", value_parser)]
    pub streams: Vec<String>,
    /// (All, or one gender value, default All)
    #[clap(long, value_parser)]
    pub gender: Option<String>,
    /// (folder path, default .) Where the SVG files are written.
    #[clap(short, long, value_parser)]
    pub out_dir: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ExportArgs {
    /// (file path) The workbook to write. Setting this option overrides the file name that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// (file path) The workbook to check.
    #[clap(value_parser)]
    pub input: String,
    /// (file path) The reference workbook.
    #[clap(short, long, value_parser)]
    pub reference: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_distribution() {
        let args = Args::parse_from([
            "houses",
            "--seed",
            "42",
            "distribution",
            "--stream",
            "Physics",
            "--stream",
            "Maths",
            "--export",
            "out.xlsx",
        ]);
        assert_eq!(args.seed, Some(42));
        match args.command {
            Command::Distribution(d) => {
                assert_eq!(d.filters.streams, vec!["Physics", "Maths"]);
                assert!(d.filters.genders.is_empty());
                assert_eq!(d.export.as_deref(), Some("out.xlsx"));
            }
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn parse_check() {
        let args = Args::parse_from(["houses", "check", "a.xlsx", "--reference", "b.xlsx"]);
        match args.command {
            Command::Check(c) => {
                assert_eq!(c.input, "a.xlsx");
                assert_eq!(c.reference, "b.xlsx");
            }
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn parse_view() {
        let args = Args::parse_from([
            "houses",
            "--no-color",
            "view",
            "--password",
            "pw",
            "--column",
            "Gender",
            "--semester",
            "3",
        ]);
        assert!(args.no_color);
        match args.command {
            Command::View(v) => {
                assert_eq!(v.password.as_deref(), Some("pw"));
                assert_eq!(v.columns, vec!["Gender"]);
                assert_eq!(v.filters.semesters, vec!["3"]);
            }
            x => panic!("unexpected {:?}", x),
        }
    }
}
