use log::{debug, info, warn};

use house_assignment::{AssignmentErrors, HousePalette};
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use crate::args::{Args, ChartArgs, CheckArgs, Command, DistributionArgs, ExportArgs, ViewArgs};
use crate::houses::access::{check_access, credential_store, AccessDecision};
use crate::houses::charts::{chart_page, render_charts, ChartSelection};
use crate::houses::config_reader::{read_config, HousesConfig};
use crate::houses::filters::{GenderChoice, Selection};
use crate::houses::roster::Roster;

pub mod access;
pub mod assign;
pub mod charts;
pub mod config_reader;
pub mod filters;
pub mod io_common;
pub mod io_export;
pub mod io_loader;
pub mod roster;
pub mod views;

pub const ENROLLMENT_COL: &str = "Enrollment No";
pub const STREAM_COL: &str = "Stream";
pub const NAME_COL: &str = "Student Name";
pub const GENDER_COL: &str = "Gender";
pub const SEMESTER_COL: &str = "Semester";
pub const HOUSE_COL: &str = "House";

/// The columns every roster must have once loaded.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    ENROLLMENT_COL,
    STREAM_COL,
    NAME_COL,
    GENDER_COL,
    SEMESTER_COL,
];

/// The columns shown for an assigned roster, and written to the workbook.
pub const DISPLAY_COLUMNS: [&str; 6] = [
    ENROLLMENT_COL,
    NAME_COL,
    GENDER_COL,
    STREAM_COL,
    SEMESTER_COL,
    HOUSE_COL,
];

#[derive(Debug, Snafu)]
pub enum HousesError {
    #[snafu(display("`{path}` folder not found. Please create it and add your Excel files."))]
    MissingDataFolder { path: String },
    #[snafu(display("Error listing the folder {path}"))]
    ReadingFolder {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Missing required columns: {missing:?}. Required: {required:?}"))]
    MissingColumns {
        missing: Vec<String>,
        required: Vec<String>,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Error building the workbook"))]
    BuildingExcel { source: rust_xlsxwriter::XlsxError },
    #[snafu(display("Error writing the workbook {path}"))]
    WritingExcel {
        source: rust_xlsxwriter::XlsxError,
        path: String,
    },
    #[snafu(display("Error opening the configuration file {path}"))]
    OpeningConfig {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the configuration file {path}"))]
    ParsingConfig {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Invalid color {color:?}, expected the form #RRGGBB"))]
    InvalidColor { color: String },
    #[snafu(display("Unknown column {column:?}. Available columns: {available:?}"))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },
    #[snafu(display("House distribution not found: the table has no House column"))]
    MissingHouseColumn {},
    #[snafu(display("Could not assign the houses"))]
    Assignment { source: AssignmentErrors },
    #[snafu(display("Could not render the chart {path}: {message}"))]
    RenderChart { path: String, message: String },
    #[snafu(display("Access denied. Please enter the admin password to continue."))]
    AccessDenied {},
    #[snafu(display("Difference detected between {path} and the reference {reference}"))]
    ReferenceMismatch { path: String, reference: String },
    #[snafu(display("Error writing the output {path}"))]
    CreatingOutput {
        source: std::io::Error,
        path: String,
    },
}

pub type HousesResult<T> = Result<T, HousesError>;

/// Everything a command needs: the configuration, the freshly loaded
/// roster and the seed of this run.
#[derive(Debug, Clone)]
pub struct Session {
    pub config: HousesConfig,
    pub palette: HousePalette,
    pub roster: Roster,
    pub seed: u64,
    pub color: bool,
}

pub fn open_session(args: &Args) -> HousesResult<Session> {
    let config = match &args.config {
        Some(p) => read_config(p)?,
        None => HousesConfig::default(),
    };
    debug!("open_session: config: {:?}", config);
    let palette = config.palette()?;

    let data_folder = args
        .data
        .clone()
        .unwrap_or_else(|| config.data_folder.clone());
    let roster = io_loader::load_roster(Path::new(&data_folder), config.header_row)?;
    io_loader::check_required_columns(&roster)?;
    info!(
        "open_session: loaded {} students from {:?}",
        roster.len(),
        data_folder
    );

    // Unseeded runs draw a seed so that they can be replayed.
    let seed = args
        .seed
        .or(config.random_seed)
        .unwrap_or_else(rand::random::<u64>);
    info!("open_session: random seed for this run: {}", seed);

    Ok(Session {
        config,
        palette,
        roster,
        seed,
        color: !args.no_color,
    })
}

pub fn run(args: &Args) -> HousesResult<()> {
    if let Command::Check(check_args) = &args.command {
        return run_check(check_args);
    }
    let session = open_session(args)?;
    match &args.command {
        Command::View(a) => run_view(&session, a),
        Command::Distribution(a) => run_distribution(&session, a),
        Command::Charts(a) => run_charts(&session, a),
        Command::Export(a) => run_export(&session, a),
        Command::Check(a) => run_check(a),
    }
}

fn run_view(session: &Session, view_args: &ViewArgs) -> HousesResult<()> {
    let store = credential_store(&session.config);
    let entered = view_args.password.clone().unwrap_or_default();
    let decision: AccessDecision = check_access(store.as_ref(), &entered);
    if !decision.is_granted() {
        if let Some(msg) = decision.message() {
            eprintln!("{}", msg);
        }
        warn!("run_view: access refused ({:?})", decision);
        return AccessDeniedSnafu {}.fail();
    }

    let selection = view_args.filters.to_selection(&session.config);
    let table = views::raw_view(
        &session.roster,
        &selection,
        &view_args.columns,
        &session.config,
    )?;
    println!("View Student Data ({} rows)", table.rows.len());
    print!("{}", views::render_table(&table, None, session.color));
    Ok(())
}

fn run_distribution(session: &Session, dist_args: &DistributionArgs) -> HousesResult<()> {
    let selection = dist_args.filters.to_selection(&session.config);
    let page = views::house_distribution_page(
        &session.roster,
        &selection,
        session.seed,
        &session.config,
        &session.palette,
    )?;
    for gender in page.assigned.counters.genders() {
        debug!(
            "run_distribution: gender {:?}: totals {:?}",
            gender,
            page.assigned.counters.totals(gender)
        );
    }

    if let Some(out) = &dist_args.export {
        io_export::export_workbook(
            &page.assigned.roster,
            &session.config,
            &session.palette,
            Path::new(out),
        )?;
        println!("House distribution written to {}", out);
    }

    println!("House Distribution ({} rows)", page.table.rows.len());
    print!(
        "{}",
        views::render_table(
            &page.table,
            Some((HOUSE_COL, &session.palette)),
            session.color
        )
    );
    println!();
    println!("House Stats by Gender");
    print!("{}", views::render_gender_counts(&page.gender_counts));
    Ok(())
}

fn run_charts(session: &Session, chart_args: &ChartArgs) -> HousesResult<()> {
    let selection = ChartSelection {
        streams: chart_args.streams.clone(),
        gender: chart_args
            .gender
            .as_deref()
            .map(GenderChoice::parse)
            .unwrap_or(GenderChoice::All),
    };
    let data = chart_page(
        &session.roster,
        &selection,
        session.seed,
        &session.config,
        &session.palette,
    )?;
    let data = match data {
        Some(d) => d,
        None => {
            warn!("run_charts: no data available for selected filters");
            println!("No data available for selected filters.");
            return Ok(());
        }
    };
    print!("{}", charts::render_summary(&data));
    let out_dir = PathBuf::from(chart_args.out_dir.clone().unwrap_or_else(|| ".".to_string()));
    let files = render_charts(&data, &out_dir, &session.config, &session.palette)?;
    for f in files {
        println!("Chart written to {}", f.display());
    }
    Ok(())
}

fn run_export(session: &Session, export_args: &ExportArgs) -> HousesResult<()> {
    let assigned = assign::assign_roster(&session.roster, &session.palette, session.seed)?;
    let out = export_args
        .out
        .clone()
        .unwrap_or_else(|| session.config.export_file_name.clone());
    // The download: the bytes of the workbook and their MIME type.
    let bytes = io_export::export_to_buffer(&assigned.roster, &session.config, &session.palette)?;
    fs::write(&out, bytes).context(CreatingOutputSnafu { path: out.clone() })?;
    info!("run_export: wrote {:?} (seed {})", out, assigned.seed);
    println!(
        "House distribution of {} students written to {} ({})",
        assigned.roster.len(),
        out,
        io_export::XLSX_MIME_TYPE
    );
    Ok(())
}

fn run_check(check_args: &CheckArgs) -> HousesResult<()> {
    io_export::check_against_reference(&check_args.input, &check_args.reference)?;
    println!(
        "{} matches the reference {}",
        check_args.input, check_args.reference
    );
    Ok(())
}

impl crate::args::FilterArgs {
    /// The selection of a page. Without any gender given, the configured
    /// genders are selected.
    pub fn to_selection(&self, config: &HousesConfig) -> Selection {
        Selection {
            streams: self.streams.clone(),
            semesters: self.semesters.clone(),
            genders: if self.genders.is_empty() {
                config.genders.clone()
            } else {
                self.genders.clone()
            },
        }
    }
}
