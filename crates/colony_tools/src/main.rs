//! Colony engine command-line host.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colony_core::colony::EntityId;
use colony_core::coords::Coord;
use colony_core::data::StaticData;
use colony_core::fleet::Mission;
use colony_core::kinds::{ConstructionTarget, QueueKind};
use colony_tools::args::parse_fleet;
use colony_tools::report::{render_status, render_tile};
use colony_tools::scheduler::{log_events, run_scheduler, SchedulerOptions};
use colony_tools::session::{load_config, load_data, unix_now_ms};
use colony_tools::{validate, JsonFileStore, Result, Session, ToolError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "colony")]
#[command(about = "Run and manage colony simulations")]
struct Cli {
    /// Directory holding saved colonies
    #[arg(long, global = true, default_value = "saves")]
    save_dir: PathBuf,

    /// Engine config (RON); defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Static data tables (RON); built-in tables when omitted
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Player whose colony to act on
    #[arg(long, global = true, default_value = "player")]
    player: String,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tick the colony on a timer, saving after each tick
    Run {
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// Catch up and print the colony
    Status,
    /// Order a building, research, ship or defense
    Build {
        /// Snake-case kind name, e.g. metallum_mine or light_fighter
        target: ConstructionTarget,
        /// Batch size for ships and defenses
        #[arg(long, default_value_t = 1)]
        amount: u32,
    },
    /// Cancel an order that has not started
    Cancel {
        /// building, research or shipyard
        queue: QueueKind,
        /// Order id
        id: EntityId,
    },
    /// Send ships from home
    Dispatch {
        /// Destination as x:y
        #[arg(long)]
        to: Coord,
        /// attack or explore
        #[arg(long, default_value = "attack")]
        mission: Mission,
        /// Ships as kind=count
        #[arg(required = true)]
        ships: Vec<String>,
    },
    /// Describe a map tile
    Tile {
        /// Coordinate as x:y
        coord: Coord,
    },
    /// Check a data or config file, or every data file in a directory
    Validate {
        /// File or directory
        path: PathBuf,
        /// What the file contains
        #[arg(long, value_enum, default_value_t = FileKind::Data)]
        kind: FileKind,
    },
    /// Write the static data tables as RON
    ExportData {
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FileKind {
    Data,
    Config,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    if let Err(e) = execute(cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Validate { path, kind } => return validate_path(&path, kind),
        Commands::ExportData { out } => {
            let data = load_data(cli.data.as_deref())?;
            return export_data(&data, out.as_deref());
        }
        _ => {}
    }

    let data = load_data(cli.data.as_deref())?;
    let config = load_config(cli.config.as_deref())?;
    let tick_interval_ms = config.tick_interval_ms;
    let mut session = Session::new(JsonFileStore::new(&cli.save_dir), data, config);

    if let Commands::Tile { coord } = cli.command {
        println!("{}", render_tile(session.map(), coord));
        return Ok(());
    }

    let now = unix_now_ms();
    let mut engine = session.open(&cli.player, now)?;

    match cli.command {
        Commands::Run { ticks } => {
            let mut options = SchedulerOptions::every_ms(tick_interval_ms);
            if let Some(ticks) = ticks {
                options = options.with_max_ticks(ticks);
            }
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| ToolError::io(&cli.save_dir, e))?;
            runtime.block_on(run_scheduler(&mut engine, session.store_mut(), unix_now_ms, options))?;
        }
        Commands::Status => {
            log_events(&engine.tick(now));
            println!("{}", render_status(&engine, now));
        }
        Commands::Build { target, amount } => {
            let id = engine.start_construction(target, amount, now)?;
            let queue = engine.colony().queue(target.queue());
            if let Some(item) = queue.iter().find(|item| item.id == id) {
                tracing::info!(id, %target, level_or_amount = item.level_or_amount, end_time = item.end_time, "order placed");
            }
        }
        Commands::Cancel { queue, id } => {
            let item = engine.cancel_construction(queue, id, now)?;
            tracing::info!(id, target = %item.target, "order cancelled, cost refunded");
        }
        Commands::Dispatch { to, mission, ships } => {
            let units = parse_fleet(&ships)?;
            let id = engine.dispatch_fleet(&units, to, mission, now)?;
            if let Some(fleet) = engine.colony().active_fleets.iter().find(|f| f.id == id) {
                tracing::info!(id, destination = %to, arrival_time = fleet.arrival_time, "fleet dispatched");
            }
        }
        Commands::Tile { .. } | Commands::Validate { .. } | Commands::ExportData { .. } => {}
    }

    session.save(&engine)
}

fn validate_path(path: &Path, kind: FileKind) -> Result<()> {
    match kind {
        FileKind::Data if path.is_dir() => {
            let count = validate::validate_data_directory(path)?;
            tracing::info!(count, "validation passed");
        }
        FileKind::Data => {
            validate::validate_data_file(path)?;
        }
        FileKind::Config => {
            validate::validate_config_file(path)?;
        }
    }
    Ok(())
}

fn export_data(data: &StaticData, out: Option<&Path>) -> Result<()> {
    let text = data.to_ron_string()?;
    match out {
        Some(path) => {
            std::fs::write(path, text).map_err(|e| ToolError::io(path, e))?;
            tracing::info!(path = %path.display(), "static data written");
        }
        None => println!("{text}"),
    }
    Ok(())
}
