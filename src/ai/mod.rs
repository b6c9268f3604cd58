//! The search engine: an arena-backed MCTS tree and its fixed-budget driver.

mod mcts;

pub use mcts::{Decision, MctsEngine};
