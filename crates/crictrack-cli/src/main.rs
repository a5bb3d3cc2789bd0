// Cricket performance tracker entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, stdout is for reports)
// 3. Load config, resolve paths against --base-dir
// 4. Dispatch the subcommand

use crictrack_cli::commands::{self, Settings};
use crictrack_core::config;
use crictrack_core::db::Database;
use crictrack_stats::SummaryOrder;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.base_dir)?;
    info!("crictrack starting up");

    let config = config::load_config(&cli.base_dir).context("failed to load configuration")?;
    let mut settings = Settings::from_config(&config, &cli.base_dir)?;
    if let Some(db) = cli.db {
        settings.db_path = db;
    }
    info!("Using database at {}", settings.db_path);

    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Load(args) => {
            let mut paths = settings.data_paths.clone();
            if let Some(p) = args.players {
                paths.players = p;
            }
            if let Some(p) = args.matches {
                paths.matches = p;
            }
            if let Some(p) = args.performances {
                paths.performances = p;
            }
            let db = Database::open(&settings.db_path)
                .with_context(|| format!("failed to open database {}", settings.db_path))?;
            let counts = commands::load(&db, &paths)?;
            commands::print_load(&mut stdout, &counts)?;
        }
        Commands::Summary(args) => {
            let analysis = commands::open_analysis(&settings.db_path, args.order.into())?;
            let threshold = settings.threshold_or_default(args.threshold)?;
            commands::summary(&mut stdout, &analysis, threshold, args.json)?;
        }
        Commands::Report(args) => {
            let player_id = settings.player_or_default(args.player_id)?;
            let analysis = commands::open_analysis(&settings.db_path, SummaryOrder::default())?;
            commands::report(&mut stdout, &analysis, &player_id, args.json)?;
        }
        Commands::Charts(args) => {
            let player_id = args.player.or_else(|| settings.default_player.clone());
            let plots_dir = args.out.unwrap_or_else(|| settings.plots_dir.clone());
            let analysis = commands::open_analysis(&settings.db_path, SummaryOrder::default())?;
            commands::charts(
                &mut stdout,
                &analysis,
                settings.bins,
                player_id.as_deref(),
                Some(&plots_dir),
            )?;
        }
        Commands::Analyze(args) => {
            let player_id = args.player_id.or_else(|| settings.default_player.clone());
            let analysis = commands::open_analysis(&settings.db_path, SummaryOrder::default())?;
            commands::analyze(&mut stdout, &analysis, &settings, player_id.as_deref())?;
        }
    }

    info!("crictrack finished");
    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Player performance tracking and reporting for a cricket league.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project directory holding config/, defaults/ and the data files.
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    /// Database path, overriding database.path from the config.
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the stored records with the contents of the CSV files.
    Load(LoadArgs),
    /// Print the league batting summary and the high performers.
    Summary(SummaryArgs),
    /// Print one player's totals and match-wise breakdown.
    Report(ReportArgs),
    /// Print text charts and write their series as CSV.
    Charts(ChartsArgs),
    /// Summary, charts and player report from one snapshot.
    Analyze(AnalyzeArgs),
}

#[derive(Parser)]
struct LoadArgs {
    /// Players CSV (player_id, full_name, role).
    #[arg(long)]
    players: Option<String>,

    /// Matches CSV (match_id, date, opponent).
    #[arg(long)]
    matches: Option<String>,

    /// Performances CSV (perf_id, player_id, match_id, runs, balls_faced, wickets, not_out).
    #[arg(long)]
    performances: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Runs,
    Average,
    StrikeRate,
    Wickets,
    Id,
}

impl From<OrderArg> for SummaryOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Runs => SummaryOrder::TotalRuns,
            OrderArg::Average => SummaryOrder::BattingAverage,
            OrderArg::StrikeRate => SummaryOrder::StrikeRate,
            OrderArg::Wickets => SummaryOrder::Wickets,
            OrderArg::Id => SummaryOrder::PlayerId,
        }
    }
}

#[derive(Parser)]
struct SummaryArgs {
    /// Row order of the league table.
    #[arg(long, value_enum, default_value = "runs")]
    order: OrderArg,

    /// High performer average threshold, overriding the config.
    #[arg(long)]
    threshold: Option<f64>,

    /// Print JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct ReportArgs {
    /// Player id; defaults to report.default_player.
    player_id: Option<String>,

    /// Print JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct ChartsArgs {
    /// Player for the runs-over-time chart; defaults to report.default_player.
    #[arg(long)]
    player: Option<String>,

    /// Directory for the CSV series, overriding report.plots_dir.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Player for the report and runs-over-time chart; defaults to report.default_player.
    player_id: Option<String>,
}

// ==============================================================================
// Logging
// ==============================================================================

fn init_tracing(base_dir: &Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("crictrack.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("crictrack=info,crictrack_core=info,crictrack_stats=info,crictrack_cli=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
