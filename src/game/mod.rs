//! Core Connect Four game logic: board representation on arbitrary grid
//! sizes, player types, and exact win/draw evaluation.

mod board;
mod player;

pub use board::{Board, Cell, GameOutcome};
pub use player::Player;
