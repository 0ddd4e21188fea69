//! Connect Four on the standard 7x6 board.
//!
//! Seat 0 ("X") moves first. A move names a column; the stone drops to the
//! lowest empty row. Four in a row horizontally, vertically or diagonally
//! wins; a full board without a line is a draw.

use std::fmt;

use crate::policy::game::Game;

/// Board width.
pub const COLS: usize = 7;
/// Board height.
pub const ROWS: usize = 6;

const EMPTY: u8 = 0;

/// Drop a stone in a column (0-6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Connect4Move(pub u8);

impl Connect4Move {
    /// Column index.
    pub fn col(&self) -> usize {
        self.0 as usize
    }
}

/// Board position. Row 0 is the bottom row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connect4State {
    /// Cells in row-major order: 0 empty, 1 seat 0, 2 seat 1.
    cells: [u8; COLS * ROWS],
    to_move: u8,
    moves: u8,
    winner: Option<u8>,
}

impl Connect4State {
    fn cell(&self, row: usize, col: usize) -> u8 {
        self.cells[row * COLS + col]
    }

    fn column_height(&self, col: usize) -> usize {
        (0..ROWS).take_while(|&r| self.cell(r, col) != EMPTY).count()
    }

    /// Seat that completed a line, if any.
    pub fn winner(&self) -> Option<usize> {
        self.winner.map(|w| w as usize)
    }

    /// Number of stones on the board.
    pub fn moves_played(&self) -> usize {
        self.moves as usize
    }

    fn is_full(&self) -> bool {
        self.moves as usize == COLS * ROWS
    }

    /// Whether the stone at (row, col) is part of a line of four.
    fn completes_line(&self, row: usize, col: usize) -> bool {
        let stone = self.cell(row, col);
        const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

        DIRECTIONS.iter().any(|&(dr, dc)| {
            let run = |sign: isize| {
                (1..4)
                    .take_while(|&k| {
                        let r = row as isize + sign * k * dr;
                        let c = col as isize + sign * k * dc;
                        (0..ROWS as isize).contains(&r)
                            && (0..COLS as isize).contains(&c)
                            && self.cell(r as usize, c as usize) == stone
                    })
                    .count()
            };
            1 + run(1) + run(-1) >= 4
        })
    }
}

impl fmt::Display for Connect4State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..ROWS).rev() {
            for col in 0..COLS {
                let c = match self.cell(row, col) {
                    1 => 'X',
                    2 => 'O',
                    _ => '.',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Connect Four rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Connect4;

impl Connect4 {
    /// Create the rules object.
    pub fn new() -> Self {
        Self
    }

    /// Empty board, seat 0 to move.
    pub fn initial_state(&self) -> Connect4State {
        Connect4State {
            cells: [EMPTY; COLS * ROWS],
            to_move: 0,
            moves: 0,
            winner: None,
        }
    }

    /// Replay a sequence of columns from the empty board.
    ///
    /// Returns `None` if a move is illegal (full column, finished game, or
    /// column out of range).
    pub fn from_moves(&self, cols: &[u8]) -> Option<Connect4State> {
        cols.iter().try_fold(self.initial_state(), |state, &col| {
            let action = Connect4Move(col);
            self.available_actions(&state)
                .contains(&action)
                .then(|| self.apply_action(&state, &action))
        })
    }
}

impl Game for Connect4 {
    type State = Connect4State;
    type Action = Connect4Move;

    fn num_players(&self) -> usize {
        2
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        (!self.is_terminal(state)).then_some(state.to_move as usize)
    }

    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.is_terminal(state) {
            return vec![];
        }
        (0..COLS)
            .filter(|&c| state.column_height(c) < ROWS)
            .map(|c| Connect4Move(c as u8))
            .collect()
    }

    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        let col = action.col();
        let row = state.column_height(col);
        debug_assert!(row < ROWS, "column {} is full", col);

        let mut next = state.clone();
        next.cells[row * COLS + col] = state.to_move + 1;
        next.moves += 1;
        if next.completes_line(row, col) {
            next.winner = Some(state.to_move);
        }
        next.to_move = 1 - state.to_move;
        next
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.winner.is_some() || state.is_full()
    }

    fn get_payoff(&self, state: &Self::State, player: usize) -> f64 {
        match state.winner() {
            Some(w) if w == player => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        }
    }

    /// Central columns first.
    fn action_priority(&self, _state: &Self::State, action: &Self::Action) -> i32 {
        (action.col() as i32 - 3).abs()
    }
}
