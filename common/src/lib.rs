use itertools::Itertools;
use rand::prelude::IndexedRandom;
use std::collections::HashSet;
use std::fmt;

/// Represents a 2D coordinate on the minesweeper board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

/// A logical statement about the board: exactly `count` of `cells` are mines.
/// For example, a revealed '2' with three undetermined neighbors becomes the
/// sentence "exactly 2 of those three cells are mines".
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Sentence {
    /// The undetermined cells this statement ranges over.
    pub cells: HashSet<Cell>,
    /// The exact number of mines among `cells`.
    pub count: usize,
}

/// The player. It accumulates sentences into a knowledge base and keeps the
/// global sets of cells it has proven to be mines or safe.
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Agent {
    pub height: usize,
    pub width: usize,
    /// Every cell the agent has chosen so far, whatever the outcome.
    pub moves_made: HashSet<Cell>,
    /// Cells proven to be mines.
    pub mines: HashSet<Cell>,
    /// Cells proven to be safe. Includes cells already revealed.
    pub safes: HashSet<Cell>,
    /// The knowledge base. Sentences narrow over time but are never removed;
    /// duplicates are rejected when appended.
    pub knowledge: Vec<Sentence>,
}

/// Where the mines actually are. The agent never reads this directly; only
/// the game orchestrator queries it to answer the agent's moves.
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Board {
    pub height: usize,
    pub width: usize,
    /// The true mine locations.
    pub mines: HashSet<Cell>,
}

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// One full playthrough: the hidden board, the agent playing it, and the
/// win/loss status.
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Game {
    pub board: Board,
    pub agent: Agent,
    /// Tracks the current status of the game (playing, won, lost).
    pub game_state: GameState,
}

// --- Grid Geometry ---

/// All valid neighbor coordinates of a cell, the cell itself excluded.
/// It correctly handles board edges and corners.
fn neighbors(height: usize, width: usize, cell: Cell) -> impl Iterator<Item = Cell> {
    (-1..=1).flat_map(move |dr| {
        (-1..=1).filter_map(move |dc| {
            // Skip the center cell itself (dr=0, dc=0)
            if dr == 0 && dc == 0 {
                return None;
            }

            let row = cell.row as isize + dr;
            let col = cell.col as isize + dc;

            // Check if the neighbor is within board bounds
            if row >= 0 && row < height as isize && col >= 0 && col < width as isize {
                Some(Cell {
                    row: row as usize,
                    col: col as usize,
                })
            } else {
                None
            }
        })
    })
}

// --- Sentence Implementation ---

impl Sentence {
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Self {
        Sentence {
            cells: cells.into_iter().collect(),
            count,
        }
    }

    /// The cells this sentence alone proves to be mines. That is every cell
    /// in the sentence when the mine count equals the number of cells, and
    /// no cell otherwise.
    pub fn known_mines(&self) -> HashSet<Cell> {
        if !self.cells.is_empty() && self.cells.len() == self.count {
            self.cells.clone()
        } else {
            HashSet::new()
        }
    }

    /// The cells this sentence alone proves to be safe. That is every cell
    /// in the sentence when the mine count is zero, and no cell otherwise.
    pub fn known_safes(&self) -> HashSet<Cell> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            HashSet::new()
        }
    }

    /// Narrows the sentence given the fact that `cell` is a mine: the cell
    /// leaves the set and takes one mine with it. Cells not in the sentence
    /// are ignored.
    pub fn mark_mine(&mut self, cell: Cell) {
        if self.cells.remove(&cell) {
            self.count = self.count.saturating_sub(1);
        }
    }

    /// Narrows the sentence given the fact that `cell` is safe. Cells not in
    /// the sentence are ignored, and the mine count is unchanged.
    pub fn mark_safe(&mut self, cell: Cell) {
        self.cells.remove(&cell);
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = self
            .cells
            .iter()
            .sorted()
            .map(|cell| format!("({}, {})", cell.row, cell.col))
            .join(", ");
        write!(f, "{{{}}} = {}", cells, self.count)
    }
}

// --- Agent Implementation (the knowledge base) ---

impl Agent {
    pub fn new(height: usize, width: usize) -> Self {
        Agent {
            height,
            width,
            moves_made: HashSet::new(),
            mines: HashSet::new(),
            safes: HashSet::new(),
            knowledge: Vec::new(),
        }
    }

    /// Records the fact that `cell` is a mine and narrows every sentence in
    /// the knowledge base with it. Safe to call repeatedly.
    pub fn mark_mine(&mut self, cell: Cell) {
        self.mines.insert(cell);
        for sentence in &mut self.knowledge {
            sentence.mark_mine(cell);
        }
    }

    /// Records the fact that `cell` is safe and narrows every sentence in
    /// the knowledge base with it. Safe to call repeatedly.
    pub fn mark_safe(&mut self, cell: Cell) {
        self.safes.insert(cell);
        for sentence in &mut self.knowledge {
            sentence.mark_safe(cell);
        }
    }

    /// The core update, called once for each revealed safe cell with the
    /// true number of mines adjacent to it.
    ///
    /// This function orchestrates the whole deduction pass for one
    /// observation:
    /// 1. Records the move and marks the revealed cell safe.
    /// 2. Builds a sentence over the cell's still-undetermined neighbors,
    ///    discounting any neighbor already known to be a mine.
    /// 3. Runs the inference rules until the knowledge base stops changing.
    pub fn add_knowledge(&mut self, cell: Cell, count: usize) {
        // --- 1. Record the Move ---
        self.moves_made.insert(cell);
        self.mark_safe(cell);

        // --- 2. Build the Sentence for This Observation ---
        let mut unknown = HashSet::new();
        let mut known_mine_count = 0;
        for neighbor in neighbors(self.height, self.width, cell) {
            if self.mines.contains(&neighbor) {
                known_mine_count += 1;
            } else if !self.safes.contains(&neighbor) {
                unknown.insert(neighbor);
            }
        }

        // Only add a sentence if it still says something about unknown cells.
        if !unknown.is_empty() {
            let sentence = Sentence::new(unknown, count.saturating_sub(known_mine_count));
            if !self.knowledge.contains(&sentence) {
                self.knowledge.push(sentence);
            }
        }

        // --- 3. Deduce Everything the New Observation Unlocks ---
        self.infer();
    }

    /// Runs the two inference rules over the knowledge base until neither
    /// produces anything new:
    ///
    /// 1. Certainty propagation: a sentence whose cells are all mines or all
    ///    safe resolves those cells globally, which narrows other sentences
    ///    and can make them certain in turn.
    /// 2. Subset subtraction: whenever one sentence's cells are a subset of
    ///    another's, the difference holds the difference of the counts.
    pub fn infer(&mut self) {
        loop {
            let mut progress = self.propagate_certainties();
            progress |= self.infer_subset_sentences();
            if !progress {
                break;
            }
        }
    }

    /// Marks every cell some sentence now proves to be a mine or safe,
    /// re-scanning until a full pass turns up nothing new. Returns whether
    /// any cell was marked.
    fn propagate_certainties(&mut self) -> bool {
        let mut progress = false;
        loop {
            let mut found_mines: HashSet<Cell> = HashSet::new();
            let mut found_safes: HashSet<Cell> = HashSet::new();
            for sentence in &self.knowledge {
                found_mines.extend(sentence.known_mines());
                found_safes.extend(sentence.known_safes());
            }

            // Marking mutates the sentences we just scanned, so collect
            // first and apply after the scan.
            found_mines.retain(|cell| !self.mines.contains(cell));
            found_safes.retain(|cell| !self.safes.contains(cell));
            if found_mines.is_empty() && found_safes.is_empty() {
                return progress;
            }

            for cell in found_mines {
                self.mark_mine(cell);
            }
            for cell in found_safes {
                self.mark_safe(cell);
            }
            progress = true;
        }
    }

    /// Derives new sentences by subtracting each sentence from every
    /// superset of it. Returns whether the knowledge base grew.
    fn infer_subset_sentences(&mut self) -> bool {
        let mut derived = Vec::new();
        for (i, j) in (0..self.knowledge.len()).tuple_combinations() {
            for (sub, sup) in [(i, j), (j, i)] {
                let sub = &self.knowledge[sub];
                let sup = &self.knowledge[sup];

                if sub.cells.is_empty() || !sub.cells.is_subset(&sup.cells) {
                    continue;
                }
                // A superset claiming fewer mines than its subset is
                // contradictory input; it yields no new sentence.
                let Some(count) = sup.count.checked_sub(sub.count) else {
                    continue;
                };
                let cells: HashSet<Cell> = sup
                    .cells
                    .difference(&sub.cells)
                    .copied()
                    .filter(|cell| !self.moves_made.contains(cell))
                    .collect();
                if cells.is_empty() {
                    continue;
                }
                derived.push(Sentence { cells, count });
            }
        }

        let mut progress = false;
        for sentence in derived {
            if !self.knowledge.contains(&sentence) {
                self.knowledge.push(sentence);
                progress = true;
            }
        }
        progress
    }

    /// A cell proven safe that has not been chosen yet, or `None` when the
    /// knowledge base cannot guarantee any move. Never mutates state.
    pub fn make_safe_move(&self) -> Option<Cell> {
        self.safes.difference(&self.moves_made).next().copied()
    }

    /// A uniformly random cell among those not yet chosen and not known to
    /// be mines, or `None` when no such cell remains.
    pub fn make_random_move(&self) -> Option<Cell> {
        let candidates: Vec<Cell> = (0..self.height)
            .cartesian_product(0..self.width)
            .map(|(row, col)| Cell { row, col })
            .filter(|cell| !self.moves_made.contains(cell) && !self.mines.contains(cell))
            .collect();
        candidates.choose(&mut rand::rng()).copied()
    }
}

// --- Board Implementation (ground truth) ---

impl Board {
    /// Builds a board with `mine_count` mines placed uniformly at random
    /// over distinct cells.
    pub fn new(height: usize, width: usize, mine_count: usize) -> Self {
        if mine_count >= height * width {
            panic!("Total mines must be less than the number of cells on the board.");
        }
        let cells: Vec<Cell> = (0..height)
            .cartesian_product(0..width)
            .map(|(row, col)| Cell { row, col })
            .collect();
        let mines = cells
            .choose_multiple(&mut rand::rng(), mine_count)
            .copied()
            .collect();
        Board {
            height,
            width,
            mines,
        }
    }

    /// Builds a board from an explicit mine layout, for scripted games.
    pub fn with_mines(height: usize, width: usize, mines: impl IntoIterator<Item = Cell>) -> Self {
        Board {
            height,
            width,
            mines: mines.into_iter().collect(),
        }
    }

    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// The number of mines within one row and one column of `cell`, the
    /// cell itself excluded.
    pub fn nearby_mines(&self, cell: Cell) -> usize {
        neighbors(self.height, self.width, cell)
            .filter(|neighbor| self.mines.contains(neighbor))
            .count()
    }
}

// --- Game Implementation (orchestrating a playthrough) ---

impl Game {
    pub fn new(height: usize, width: usize, mine_count: usize) -> Self {
        Game {
            board: Board::new(height, width, mine_count),
            agent: Agent::new(height, width),
            game_state: GameState::Playing,
        }
    }

    /// Deserializes a game state from bytes.
    pub fn deserialize(bts: &Vec<u8>) -> Self {
        bcs::from_bytes(bts).unwrap()
    }

    /// Serializes the game state to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        bcs::to_bytes(self).unwrap()
    }

    /// The primary function called to reveal a cell, whether the cell was
    /// chosen by the agent or by a player driving it.
    ///
    /// This function orchestrates the entire process for a single move:
    /// 1. Handles pre-checks: repeated reveals are no-ops, and moves after
    ///    the game has ended are rejected.
    /// 2. Ends the game if the cell is a mine.
    /// 3. Otherwise counts the mines adjacent to the cell and hands the
    ///    observation to the agent, which updates its knowledge base.
    /// 4. Checks for the win condition.
    ///
    /// Returns `Ok(false)` when the move hit a mine and `Ok(true)` otherwise.
    pub fn reveal_cell(&mut self, at: Cell) -> anyhow::Result<bool> {
        // --- 1. Pre-checks ---
        if self.agent.moves_made.contains(&at) {
            return Ok(true);
        }
        if self.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }

        // --- 2. Mine Check ---
        if self.board.is_mine(at) {
            self.game_state = GameState::Lost;
            return Ok(false);
        }

        // --- 3. Hand the Observation to the Agent ---
        let count = self.board.nearby_mines(at);
        self.agent.add_knowledge(at, count);

        // --- 4. Check for Win Condition ---
        // The game is won once the agent has identified every true mine.
        if self.agent.mines == self.board.mines {
            self.game_state = GameState::Won;
        }

        Ok(true)
    }
}
