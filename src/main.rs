use clap::{ArgAction, Parser, ValueEnum};
use crossterm::style::{style, Stylize};
use crossterm::tty::IsTty;
use log::{error, info, LevelFilter};
use npuzzle::{BoardError, Heuristic, Pruning, PuzzleState, Solver, SolverConfig, SolverError};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "npuzzle")]
#[command(about = "Optimal n-puzzle solver")]
#[command(version)]
struct Args {
    /// Board file: the dimension n followed by n*n tiles, 0 for the blank.
    /// Read from stdin when omitted.
    #[arg(conflicts_with = "random")]
    board: Option<PathBuf>,

    /// Generate a solvable board of this dimension instead of reading one
    #[arg(long, value_name = "N")]
    random: Option<usize>,

    /// Random slides of the blank used to scramble a generated board
    #[arg(long, default_value_t = 30, requires = "random")]
    scramble: usize,

    /// Draw a uniformly random solvable board instead of scrambling the goal
    #[arg(long, requires = "random")]
    shuffle: bool,

    #[arg(long, value_enum, default_value_t = CliHeuristic::Manhattan)]
    heuristic: CliHeuristic,

    #[arg(long, value_enum, default_value_t = CliPruning::Predecessor)]
    pruning: CliPruning,

    /// Print the blank's moves instead of every board
    #[arg(long)]
    moves: bool,

    /// Never color the output
    #[arg(long)]
    no_color: bool,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliHeuristic {
    /// Tiles out of place
    Hamming,
    /// Sum of tile distances to their goal cells
    Manhattan,
    /// Manhattan plus linear conflicts
    LinearConflict,
}

impl From<CliHeuristic> for Heuristic {
    fn from(cli: CliHeuristic) -> Self {
        match cli {
            CliHeuristic::Hamming => Heuristic::Hamming,
            CliHeuristic::Manhattan => Heuristic::Manhattan,
            CliHeuristic::LinearConflict => Heuristic::LinearConflict,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliPruning {
    /// Skip only the board a node was reached from
    Predecessor,
    /// Also skip boards already reached in as few moves
    BestCost,
}

impl From<CliPruning> for Pruning {
    fn from(cli: CliPruning) -> Self {
        match cli {
            CliPruning::Predecessor => Pruning::Predecessor,
            CliPruning::BestCost => Pruning::BestCost,
        }
    }
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Could not read board: {0}")]
    Io(#[from] io::Error),
    #[error("Could not parse board: {0}")]
    Board(#[from] BoardError),
    #[error(transparent)]
    Solver(#[from] SolverError),
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .parse_default_env()
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let initial = load_board(args)?;
    let color = !args.no_color && io::stdout().is_tty();

    println!("Initial board:\n{}", render(&initial, color));

    let config = SolverConfig {
        heuristic: args.heuristic.into(),
        pruning: args.pruning.into(),
    };
    let solver = Solver::with_config(initial, config)?;
    info!("{}", solver.stats());

    let (Some(solution), Some(moves)) = (solver.solution(), solver.solution_moves()) else {
        println!("No solution possible");
        return Ok(());
    };

    println!("Minimum number of moves = {}", moves.len());
    if args.moves {
        let moves: Vec<String> = moves.iter().map(ToString::to_string).collect();
        println!("{}", moves.join(" "));
    } else {
        for (step, board) in solution.iter().enumerate().skip(1) {
            println!("{}. {}\n{}", step, moves[step - 1], render(board, color));
        }
    }

    Ok(())
}

fn load_board(args: &Args) -> Result<PuzzleState, CliError> {
    if let Some(size) = args.random {
        if size == 0 {
            return Err(BoardError::Empty.into());
        }
        let mut rng = rand::thread_rng();
        let board = if args.shuffle {
            PuzzleState::shuffled(size, &mut rng)
        } else {
            PuzzleState::scrambled(size, args.scramble, &mut rng)
        };
        return Ok(board);
    }

    let text = match &args.board {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    Ok(text.parse()?)
}

/// The grid without the dimension header, blank dimmed when `color` is set.
fn render(board: &PuzzleState, color: bool) -> String {
    let width = board.tile_width();
    let mut out = String::new();

    for row in board.rows() {
        for &val in row {
            let cell = format!(" {:>width$}", val);
            match (color, val) {
                (false, _) => out.push_str(&cell),
                (true, 0) => out.push_str(&style(cell).dark_grey().to_string()),
                (true, _) => out.push_str(&style(cell).bold().to_string()),
            }
        }
        out.push('\n');
    }

    out
}
