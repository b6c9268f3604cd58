use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use mcts_connect_four::ai::MctsEngine;
use mcts_connect_four::config::AppConfig;
use mcts_connect_four::game::{Board, Cell, GameOutcome, Player};

/// Play Connect Four against the MCTS engine in the terminal.
#[derive(Parser)]
#[command(name = "mcts-connect-four", about = "Play Connect Four against an MCTS engine")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of board rows
    #[arg(long)]
    rows: Option<usize>,

    /// Override number of board columns
    #[arg(long)]
    cols: Option<usize>,

    /// Override MCTS iterations per engine move
    #[arg(long)]
    iterations: Option<usize>,

    /// Fix the engine's RNG seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    if let Some(rows) = cli.rows {
        config.board.rows = rows;
    }
    if let Some(cols) = cli.cols {
        config.board.cols = cols;
    }
    if let Some(iterations) = cli.iterations {
        config.search.iterations = iterations;
    }
    if let Some(seed) = cli.seed {
        config.search.seed = Some(seed);
    }
    config.validate()?;

    run(config)
}

fn run(config: AppConfig) -> Result<()> {
    let mut board = Board::new(config.board.rows, config.board.cols);
    let mut engine = MctsEngine::new(config.search);
    let stdin = io::stdin();

    println!(
        "You are {}; the engine is {}. Enter a column to drop a piece.",
        Player::Red.name(),
        Player::Yellow.name()
    );

    loop {
        print_board(&board);

        let col = prompt_column(&stdin, &board)?;
        board.drop_piece(col, Player::Red)?;
        if announce_if_over(&board) {
            return Ok(());
        }

        let decision = engine.choose_move(&board, Player::Red)?;
        println!("Engine plays column {}.", decision.col);
        board = decision.board;
        if announce_if_over(&board) {
            return Ok(());
        }
    }
}

/// Read column numbers from stdin until the user names a playable one.
fn prompt_column(stdin: &io::Stdin, board: &Board) -> Result<usize> {
    loop {
        print!("Your column (0-{}): ", board.cols() - 1);
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            bail!("stdin closed before the game finished");
        }
        match line.trim().parse::<usize>() {
            Ok(col) if board.is_column_playable(col) => return Ok(col),
            Ok(col) => println!("Column {col} is not playable."),
            Err(_) => println!("Enter a column number."),
        }
    }
}

/// Print the final position and result if the game is over.
fn announce_if_over(board: &Board) -> bool {
    match board.outcome() {
        GameOutcome::Winner(player) => {
            print_board(board);
            println!("{} wins!", player.name());
            true
        }
        GameOutcome::Draw => {
            print_board(board);
            println!("Draw.");
            true
        }
        GameOutcome::Ongoing => false,
    }
}

fn print_board(board: &Board) {
    for row in 0..board.rows() {
        for col in 0..board.cols() {
            let glyph = match board.get(row, col) {
                Cell::Empty => '.',
                Cell::Red => 'R',
                Cell::Yellow => 'Y',
            };
            print!(" {glyph}");
        }
        println!();
    }
    for col in 0..board.cols() {
        print!(" {}", col % 10);
    }
    println!();
}
