//! Monte Carlo Tree Search over Connect Four boards.
//!
//! The tree is arena-backed: nodes live in a flat `Vec` and refer to each
//! other by index, with the parent index used only to walk upward during
//! backpropagation. Each node owns an independent board snapshot, so no move
//! applied in one branch is ever observable from another. Playouts run on
//! disposable board copies and never touch the tree.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::game::{Board, GameOutcome, Player};

const ROOT: usize = 0;

/// The move chosen by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Board after the engine's move.
    pub board: Board,
    /// Column the engine played.
    pub col: usize,
    /// Outcome of the resulting position.
    pub outcome: GameOutcome,
}

// ─── Tree ─────────────────────────────────────────────────────────────────────

struct Node {
    board: Board,
    /// Player whose piece was just placed to reach this state.
    mover: Player,
    /// Alternates with tree depth; gives playout outcomes a consistent sign.
    parity: u8,
    /// Column played to reach this state (unused for the root).
    col: usize,
    visits: u32,
    /// Net outcome accumulator; draws leave it untouched.
    score: i64,
    outcome: GameOutcome,
    /// Successor states not yet materialized as children, tagged with the
    /// column that produces them. Together with `children` this partitions
    /// the full successor set.
    pending: Vec<(usize, Board)>,
    children: Vec<usize>,
    /// Non-owning backlink for backpropagation.
    parent: Option<usize>,
}

impl Node {
    fn new(board: Board, mover: Player, parity: u8, col: usize, parent: Option<usize>) -> Self {
        let outcome = board.outcome();
        // A decided position admits no further play.
        let pending = if outcome.is_terminal() {
            Vec::new()
        } else {
            successors(&board, mover.other())
        };
        Node {
            board,
            mover,
            parity,
            col,
            visits: 0,
            score: 0,
            outcome,
            pending,
            children: Vec::new(),
            parent,
        }
    }

    fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }
}

/// All states reachable by one legal move of `player`, tagged by column.
fn successors(board: &Board, player: Player) -> Vec<(usize, Board)> {
    board
        .legal_columns()
        .into_iter()
        .filter_map(|col| {
            let mut next = board.clone();
            next.drop_piece(col, player).ok().map(|_| (col, next))
        })
        .collect()
}

struct Tree {
    nodes: Vec<Node>,
    exploration: f64,
}

impl Tree {
    /// Install a root wrapping the position reached when `mover` placed the
    /// last piece. Root parity is the mover's index so that wins credit the
    /// side that produced them at every depth.
    fn new(board: Board, mover: Player, exploration: f64) -> Self {
        let root = Node::new(board, mover, mover.index() as u8, 0, None);
        Tree {
            nodes: vec![root],
            exploration,
        }
    }

    /// UCB1 child selection.
    ///
    /// A never-visited child is taken immediately and unconditionally: every
    /// direct child gets one playout before the scores are comparable (and the
    /// visit count never divides zero).
    fn select_child(&self, idx: usize) -> Result<usize, SearchError> {
        let node = &self.nodes[idx];
        if node.children.is_empty() {
            return Err(SearchError::InvariantViolation(format!(
                "selection on node {idx} with no children and no pending moves"
            )));
        }

        if let Some(&child) = node.children.iter().find(|&&c| self.nodes[c].visits == 0) {
            return Ok(child);
        }

        let ln_parent = (node.visits as f64).ln();
        let mut best = node.children[0];
        let mut best_score = f64::NEG_INFINITY;
        for &c in &node.children {
            let child = &self.nodes[c];
            let visits = child.visits as f64;
            let exploitation = child.score as f64 / visits;
            let ucb = exploitation + (self.exploration * ln_parent / visits).sqrt();
            if ucb > best_score {
                best_score = ucb;
                best = c;
            }
        }
        Ok(best)
    }

    /// Materialize one pending successor, chosen uniformly at random, as a
    /// child node. Returns the new node's index.
    fn expand(&mut self, idx: usize, rng: &mut StdRng) -> Result<usize, SearchError> {
        let pending = self.nodes[idx].pending.len();
        if pending == 0 {
            return Err(SearchError::InvariantViolation(format!(
                "expansion on node {idx} with no pending moves"
            )));
        }
        let pick = rng.random_range(0..pending);
        let (col, board) = self.nodes[idx].pending.swap_remove(pick);

        let (mover, parity) = {
            let parent = &self.nodes[idx];
            (parent.mover.other(), parent.parity ^ 1)
        };
        let child = self.nodes.len();
        self.nodes.push(Node::new(board, mover, parity, col, Some(idx)));
        self.nodes[idx].children.push(child);
        Ok(child)
    }

    /// Credit a playout result to every node from `from` up to the root.
    ///
    /// Visits always increment. Wins add `+1` to nodes whose parity matches
    /// the winner and `-1` otherwise; draws adjust no scores.
    fn backpropagate(&mut self, from: usize, outcome: GameOutcome) {
        let mut current = Some(from);
        while let Some(idx) = current {
            let node = &mut self.nodes[idx];
            node.visits += 1;
            if let GameOutcome::Winner(winner) = outcome {
                if node.parity as usize == winner.index() {
                    node.score += 1;
                } else {
                    node.score -= 1;
                }
            }
            current = node.parent;
        }
    }
}

// ─── Simulation ───────────────────────────────────────────────────────────────

/// Random playout from the position reached when `last_mover` placed the last
/// piece. Runs on a disposable copy of the board; returns the terminal outcome.
fn random_playout(board: &Board, last_mover: Player, rng: &mut StdRng) -> GameOutcome {
    let mut board = board.clone();
    let mut to_move = last_mover.other();
    loop {
        let outcome = board.outcome();
        if outcome.is_terminal() {
            return outcome;
        }
        let legal = board.legal_columns();
        if legal.is_empty() {
            // No successors left: the position stands as it is.
            return outcome;
        }
        let col = legal[rng.random_range(0..legal.len())];
        board
            .drop_piece(col, to_move)
            .expect("legal column accepts a drop");
        to_move = to_move.other();
    }
}

// ─── Engine ───────────────────────────────────────────────────────────────────

/// Fixed-budget MCTS driver.
///
/// A fresh tree is built for every [`choose_move`](Self::choose_move) call and
/// discarded afterwards; nothing is shared across real moves. The RNG is owned
/// and seedable through [`SearchConfig`] for reproducible searches.
pub struct MctsEngine {
    config: SearchConfig,
    rng: StdRng,
}

impl MctsEngine {
    pub fn new(config: SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        MctsEngine { config, rng }
    }

    /// Search from `board` (the position reached when `last_mover` placed a
    /// piece) and pick the reply for the other side.
    ///
    /// Each iteration descends from the root by UCB1 selection through fully
    /// expanded nodes until it reaches either a terminal node (whose actual
    /// outcome is backpropagated) or a node with untried moves (which is
    /// expanded once, followed by a random playout from the new child).
    pub fn choose_move(
        &mut self,
        board: &Board,
        last_mover: Player,
    ) -> Result<Decision, SearchError> {
        if board.outcome().is_terminal() {
            return Err(SearchError::GameOver);
        }

        let engine_side = last_mover.other();
        let mut tree = Tree::new(board.clone(), last_mover, self.config.exploration);

        for iteration in 0..self.config.iterations {
            let mut current = ROOT;
            loop {
                if tree.nodes[current].is_terminal() {
                    let outcome = tree.nodes[current].outcome;
                    tree.backpropagate(current, outcome);
                    break;
                }
                if !tree.nodes[current].pending.is_empty() {
                    let child = tree.expand(current, &mut self.rng)?;
                    let outcome = {
                        let node = &tree.nodes[child];
                        random_playout(&node.board, node.mover, &mut self.rng)
                    };
                    tree.backpropagate(child, outcome);
                    break;
                }
                current = tree.select_child(current)?;
            }
            trace!(iteration, nodes = tree.nodes.len(), "search iteration done");
        }

        if let Some(decision) = pick_decision(&tree, engine_side) {
            debug!(
                col = decision.col,
                outcome = ?decision.outcome,
                "move selected"
            );
            return Ok(decision);
        }

        // Budget exhausted before any expansion: fall back to a uniformly
        // random legal move.
        let legal = board.legal_columns();
        if legal.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }
        let col = legal[self.rng.random_range(0..legal.len())];
        let mut next = board.clone();
        next.drop_piece(col, engine_side)?;
        let outcome = next.outcome();
        debug!(col, "fallback random move");
        Ok(Decision {
            board: next,
            col,
            outcome,
        })
    }
}

/// Convert root statistics into a move, or `None` if the root has no children.
///
/// A direct child that is already a win for the engine side is returned
/// immediately, regardless of its statistics: a discovered certain win is
/// never passed up for a merely well-visited line. Otherwise the most-visited
/// child wins, with remaining ties broken by score.
fn pick_decision(tree: &Tree, engine_side: Player) -> Option<Decision> {
    let root = &tree.nodes[ROOT];

    for &c in &root.children {
        let child = &tree.nodes[c];
        if child.outcome == GameOutcome::Winner(engine_side) {
            return Some(Decision {
                board: child.board.clone(),
                col: child.col,
                outcome: child.outcome,
            });
        }
    }

    let mut best: Option<&Node> = None;
    for &c in &root.children {
        let child = &tree.nodes[c];
        let better = match best {
            None => true,
            Some(b) => {
                child.visits > b.visits || (child.visits == b.visits && child.score > b.score)
            }
        };
        if better {
            best = Some(child);
        }
    }

    best.map(|child| Decision {
        board: child.board.clone(),
        col: child.col,
        outcome: child.outcome,
    })
}
