//! Plays the engine against itself from the starting position.
//!
//! Run with:
//! `cargo run --release --bin self_play -- --depth 4 --plies 40`
//! `RUST_LOG=debug cargo run --release --bin self_play` shows per-iteration search output.

use anyhow::{bail, Context};
use clap::Parser;
use log::info;

use mailbox_chess::search::iterative_deepening::DEFAULT_TIME_LIMIT_MS;
use mailbox_chess::search::transposition_table::DEFAULT_TT_ENTRIES;
use mailbox_chess::utils::algebraic::long_algebraic_to_move;
use mailbox_chess::utils::render_board::render_board;
use mailbox_chess::{Board, Color, GameStatus, SearchConfig, SearchEngine};

#[derive(Parser, Debug)]
#[command(name = "self_play", about = "Engine self-play from the starting position")]
struct Args {
    #[arg(long, default_value_t = 4)]
    depth: u8,
    #[arg(long, default_value_t = 60)]
    plies: usize,
    #[arg(long, default_value_t = DEFAULT_TIME_LIMIT_MS)]
    movetime_ms: u64,
    #[arg(long, default_value_t = DEFAULT_TT_ENTRIES)]
    tt_entries: usize,
    /// Opening moves in long algebraic notation, played before the engine takes over.
    #[arg(long, value_delimiter = ',')]
    opening: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut board = Board::starting_position();
    let mut side = Color::White;
    for text in &args.opening {
        let Some(mut mv) = long_algebraic_to_move(&mut board, text)? else {
            bail!("opening move {text} is not legal here");
        };
        board.make_move(&mut mv)?;
        side = side.opposite();
    }

    let mut engine = SearchEngine::new(SearchConfig {
        max_depth: args.depth,
        time_limit_ms: Some(args.movetime_ms),
        tt_entries: args.tt_entries,
        ..SearchConfig::default()
    });

    let mut played = Vec::new();
    for ply in 0..args.plies {
        let status = board.evaluate_game_state(side)?;
        if status != GameStatus::Continue {
            println!("{status:?} after {ply} plies");
            break;
        }

        let result = engine.search(&mut board, side)?;
        let mut mv = result
            .best_move
            .context("search returned no move in a live position")?;
        info!(
            "{side:?} plays {mv} (score {}, depth {}, {} nodes, {} ms)",
            result.best_score, result.reached_depth, result.nodes, result.elapsed_ms
        );
        board.make_move(&mut mv)?;
        played.push(mv.to_string());
        side = side.opposite();
    }

    println!("{}", played.join(" "));
    println!("{}", render_board(&board));
    Ok(())
}
