//! CLI entry point for the cohort rater.
//!
//! Provides subcommands for printing a cohort report, exporting rankings,
//! summarizing statistics and saving binary snapshots.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cohort_rater::analyzers::averages::recompute_averages;
use cohort_rater::analyzers::ranking::{rank_by_course, top_by_course, top_by_overall_average};
use cohort_rater::builder::load_cohort;
use cohort_rater::config::{LoadOptions, ParsePolicy, SectionNames};
use cohort_rater::input::open_source;
use cohort_rater::model::Cohort;
use cohort_rater::output::{
    RankingRow, append_rankings, print_json, print_pretty, render_cohort, render_course_podium,
    render_top_students,
};
use cohort_rater::snapshot;
use cohort_rater::stats::CohortStats;
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "cohort_rater")]
#[command(about = "Load a student cohort, compute weighted averages and rank students", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Cohort text file, URL, `-` for stdin, or a `.bin`/`.bin.gz` snapshot
    #[arg(value_name = "SOURCE")]
    source: String,

    /// JSON file overriding the section marker lines
    #[arg(long, env = "COHORT_SECTIONS")]
    sections: Option<String>,

    /// How to treat rows that fail to parse
    #[arg(long, value_enum, env = "COHORT_POLICY", default_value_t = ParsePolicy::Lenient)]
    policy: ParsePolicy,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every student, the best students of a course and the overall top
    Report {
        #[command(flatten)]
        input: SourceArgs,

        /// Course whose podium is printed
        #[arg(short, long, default_value = "Mathematiques")]
        course: String,

        /// Number of students in the overall top
        #[arg(short = 'n', long, default_value_t = 10)]
        top: usize,

        /// Optional: save the sorted cohort to this snapshot file
        #[arg(long)]
        save: Option<String>,
    },
    /// Rank students overall or in one course
    Rank {
        #[command(flatten)]
        input: SourceArgs,

        /// Optional: rank by this course instead of the overall average
        #[arg(short, long)]
        course: Option<String>,

        /// Number of students to keep
        #[arg(short = 'n', long, default_value_t = 3)]
        top: usize,

        /// Optional: CSV file to append the ranking to
        #[arg(long)]
        csv: Option<String>,
    },
    /// Log cohort statistics as JSON
    Stats {
        #[command(flatten)]
        input: SourceArgs,
    },
    /// Build a cohort and write it as a binary snapshot
    Save {
        #[command(flatten)]
        input: SourceArgs,

        /// Destination file; a `.gz` suffix enables compression
        #[arg(value_name = "SNAPSHOT")]
        output: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/cohort_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("cohort_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            input,
            course,
            top,
            save,
        } => {
            let mut cohort = open_cohort(&input)?;
            cohort.sort_by_overall_average();

            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", render_cohort(&cohort))?;

            if cohort.is_empty() {
                warn!("Cohort is empty, skipping course podium");
            } else {
                let podium = rank_by_course(&cohort, &course)?;
                writeln!(stdout, "{}", render_course_podium(&course, &podium))?;
            }

            let best = top_by_overall_average(&cohort, top);
            writeln!(stdout, "{}", render_top_students(&best))?;

            if let Some(path) = save {
                snapshot::save(&path, &cohort)
                    .with_context(|| format!("failed to save snapshot {path}"))?;
                info!(path = %path, "Promotion saved");
            }
        }
        Commands::Rank {
            input,
            course,
            top,
            csv,
        } => {
            let cohort = open_cohort(&input)?;

            let rows = match &course {
                Some(name) => RankingRow::from_course(name, &top_by_course(&cohort, name, top)?),
                None => RankingRow::from_overall(&top_by_overall_average(&cohort, top)),
            };

            for row in &rows {
                info!(
                    rank = row.rank,
                    student_id = row.student_id,
                    name = %format!("{} {}", row.first_name, row.last_name),
                    average = row.average,
                    "Ranked"
                );
            }

            if let Some(path) = csv {
                append_rankings(&path, &rows)?;
                info!(path = %path, rows = rows.len(), "Ranking appended");
            }
        }
        Commands::Stats { input } => {
            let cohort = open_cohort(&input)?;
            print_json(&CohortStats::from_cohort(&cohort))?;
        }
        Commands::Save { input, output } => {
            let cohort = open_cohort(&input)?;
            snapshot::save(&output, &cohort)
                .with_context(|| format!("failed to save snapshot {output}"))?;
        }
    }

    Ok(())
}

/// Loads a cohort from a snapshot file or a text source and averages it.
#[tracing::instrument(skip_all, fields(source = %input.source))]
fn open_cohort(input: &SourceArgs) -> Result<Cohort> {
    if is_snapshot(&input.source) {
        let mut cohort = snapshot::load(&input.source)
            .with_context(|| format!("failed to load snapshot {}", input.source))?;
        recompute_averages(&mut cohort);
        return Ok(cohort);
    }

    let sections = match &input.sections {
        Some(path) => SectionNames::load(path)?,
        None => SectionNames::default(),
    };
    let options = LoadOptions {
        sections,
        policy: input.policy,
    };

    let reader = open_source(&input.source)?;
    let loaded = load_cohort(reader, &options)
        .with_context(|| format!("failed to load cohort from {}", input.source))?;

    print_pretty(&loaded.report);
    for section in &loaded.report.missing_sections {
        warn!(section = %section, "Section treated as empty");
    }

    Ok(loaded.cohort)
}

fn is_snapshot(source: &str) -> bool {
    source.ends_with(".bin") || source.ends_with(".bin.gz")
}
