mod script;

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use moodboard_canvas::board::{Board, BoardError};
use moodboard_canvas::config::{ConfigError, EngineConfig};
use moodboard_canvas::engine::BoardController;
use moodboard_canvas::geometry::ItemId;
use moodboard_canvas::viewport::Size;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid board: {0}")]
    Board(#[from] BoardError),
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("script line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("no item with id {0}")]
    UnknownItem(ItemId),
}

#[derive(Parser, Debug)]
#[command(name = "moodboard", about = "Run the moodboard canvas engine against a board file")]
struct Cli {
    /// Engine config as JSON. Falls back to MOODBOARD_* environment variables.
    #[arg(long, env = "MOODBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Log engine decisions to stderr at debug level.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Auto-fit the board into a container and print the viewport.
    Fit(FitArgs),
    /// Print the render plan, one item view per line, in paint order.
    Plan(PlanArgs),
    /// Replay a recorded input script and print every action.
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct BoardArgs {
    /// Board JSON: `{ "items": [...] }` or a bare item array.
    #[arg(long)]
    board: PathBuf,

    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    #[arg(long, default_value_t = 800.0)]
    height: f64,

    /// Render and interact as a viewer rather than an editor.
    #[arg(long, default_value_t = false)]
    view_only: bool,
}

#[derive(Args, Debug)]
struct FitArgs {
    #[command(flatten)]
    board: BoardArgs,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[command(flatten)]
    board: BoardArgs,

    /// Select this item before planning.
    #[arg(long)]
    select: Option<ItemId>,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    #[command(flatten)]
    board: BoardArgs,

    #[arg(long, default_value = "-", help = "Script file path, or - for stdin")]
    script: String,

    /// Print the final board after the script finishes.
    #[arg(long, default_value_t = false)]
    print_board: bool,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Fit(args) => run_fit(config, &args),
        Command::Plan(args) => run_plan(config, &args),
        Command::Replay(args) => run_replay(config, &args),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    let config = match path {
        Some(path) => serde_json::from_str::<EngineConfig>(&read_file(path)?)?,
        None => EngineConfig::from_env()?,
    };
    config.validate()?;
    tracing::debug!(?config, "engine config loaded");
    Ok(config)
}

/// Build a controller from the board file and frame it in the container.
fn open_board(config: EngineConfig, args: &BoardArgs) -> Result<BoardController, CliError> {
    let board = Board::from_json(&read_file(&args.board)?)?;
    let mut ctl = BoardController::new(config);
    ctl.editable = !args.view_only;
    ctl.load_board(board);
    ctl.auto_fit(&Size::new(args.width, args.height));
    Ok(ctl)
}

fn run_fit(config: EngineConfig, args: &FitArgs) -> Result<(), CliError> {
    let ctl = open_board(config, &args.board)?;
    print_line(&ctl.viewport)
}

fn run_plan(config: EngineConfig, args: &PlanArgs) -> Result<(), CliError> {
    let mut ctl = open_board(config, &args.board)?;
    if let Some(id) = args.select {
        if !ctl.board.contains(&id) {
            return Err(CliError::UnknownItem(id));
        }
        ctl.select(&id);
    }
    for view in ctl.render_plan() {
        print_line(&view)?;
    }
    Ok(())
}

fn run_replay(config: EngineConfig, args: &ReplayArgs) -> Result<(), CliError> {
    let mut ctl = open_board(config, &args.board)?;
    print_line(&json!({ "action": "viewportChanged", "viewport": ctl.viewport }))?;

    let reader: Box<dyn BufRead> = if args.script == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&args.script).map_err(|source| CliError::Io { path: args.script.clone(), source })?;
        Box::new(BufReader::new(file))
    };

    let mut replayed = 0_usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CliError::Io { path: args.script.clone(), source })?;
        let event = script::parse_line(&line).map_err(|source| CliError::Script { line: index + 1, source })?;
        let Some(event) = event else {
            continue;
        };
        for action in script::apply(&mut ctl, &event) {
            print_line(&action)?;
        }
        replayed = replayed.saturating_add(1);
    }

    // A script that ends mid-gesture leaves nothing staged behind.
    for action in ctl.cancel_interaction() {
        print_line(&action)?;
    }
    tracing::info!(replayed, "replay complete");

    if args.print_board {
        print_line(&ctl.board)?;
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io { path: path.display().to_string(), source })
}

fn print_line<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string(value)?;
    println!("{rendered}");
    Ok(())
}
