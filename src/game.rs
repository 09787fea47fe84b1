//! Game session: board, score, status and the per-turn protocol.
//!
//! A turn commits the move first, then waits out the settle delay before the
//! new tile is spawned and the board re-evaluated. Only one turn is in flight
//! at a time; moves submitted while settling are dropped.

use crate::GameConfig;
use crate::error::GameError;
use crate::grid::Grid;
use crate::highscores::{HighScoreStore, StoreError};
use crate::moves::{Direction, apply_move};
use crate::spawn::{TileSource, seed_grid, spawn_tile};
use crate::status::{GameStatus, StatusFlags, evaluate};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Playing,
    /// Move committed; spawn and evaluation run once `until` has passed.
    Settling { until: Instant },
}

/// What the renderer receives after each completed turn.
#[derive(Debug)]
pub struct TurnReport {
    pub merged_cells: Vec<(usize, usize)>,
    pub spawned: Option<(usize, usize)>,
    pub score: u64,
    pub score_delta: u64,
    pub high_score: u64,
    pub flags: StatusFlags,
    /// True only on the turn the win tile first appeared.
    pub newly_won: bool,
    /// High-score write failure, if any. The turn completed regardless.
    pub store_error: Option<StoreError>,
}

impl TurnReport {
    pub fn status(&self) -> GameStatus {
        self.flags.status()
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Not started, lost, or a turn is already in flight.
    Rejected,
    /// The board did not change; nothing else happens.
    Unchanged,
    /// Board committed; the spawn is waiting for the settle delay.
    Settling { merged_cells: Vec<(usize, usize)> },
    Completed(TurnReport),
}

#[derive(Debug, Default)]
struct PendingTurn {
    merged_cells: Vec<(usize, usize)>,
    score_delta: u64,
    store_error: Option<StoreError>,
}

pub struct GameSession<R> {
    grid: Grid,
    score: u64,
    high_score: u64,
    flags: StatusFlags,
    phase: Phase,
    pending: Option<PendingTurn>,
    moves: u32,
    win_tile: u32,
    settle_delay: Duration,
    rng: R,
    store: Box<dyn HighScoreStore>,
    /// False when the startup read failed; saving then would clobber an unseen record.
    store_readable: bool,
}

impl<R: TileSource> GameSession<R> {
    /// New session in `NotStarted`. A failing store read counts as a high score of 0
    /// and disables saving for this session.
    pub fn new(
        config: &GameConfig,
        rng: R,
        store: Box<dyn HighScoreStore>,
    ) -> Result<Self, GameError> {
        let grid = Grid::new(config.size)?;
        let (high_score, store_readable) = match store.load() {
            Ok(score) => (score, true),
            Err(e) => {
                warn!("could not read high score, not saving this session: {e}");
                (0, false)
            }
        };
        Ok(Self {
            grid,
            score: 0,
            high_score,
            flags: StatusFlags::default(),
            phase: Phase::NotStarted,
            pending: None,
            moves: 0,
            win_tile: config.win_tile,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            rng,
            store,
            store_readable,
        })
    }

    /// Fresh board with two random tiles. Returns the seeded cells.
    pub fn start(&mut self) -> Vec<(usize, usize)> {
        let mut grid = self.grid.clone();
        grid.clear();
        let cells = seed_grid(&mut grid, &mut self.rng);
        self.begin(grid);
        info!("new game on {0}x{0} board", self.grid.size());
        cells
    }

    /// Discard the current board and start over. Any pending turn is dropped.
    pub fn restart(&mut self) -> Vec<(usize, usize)> {
        self.start()
    }

    /// Start from a prepared board instead of random seeding.
    pub fn start_from(&mut self, grid: Grid) {
        self.begin(grid);
        info!("game from a given {0}x{0} board", self.grid.size());
    }

    fn begin(&mut self, grid: Grid) {
        self.flags = evaluate(&grid, false, self.win_tile);
        self.grid = grid;
        self.score = 0;
        self.moves = 0;
        self.pending = None;
        self.phase = Phase::Playing;
    }

    /// Run one move. Board changes are committed immediately; the spawn follows
    /// after the settle delay (see [`Self::tick`]).
    pub fn submit_move(&mut self, direction: Direction, now: Instant) -> SubmitOutcome {
        if self.phase != Phase::Playing || self.flags.lost {
            debug!("move {direction} rejected in {:?}", self.phase);
            return SubmitOutcome::Rejected;
        }

        let result = apply_move(&mut self.grid, direction);
        if !result.changed {
            return SubmitOutcome::Unchanged;
        }

        self.score += result.score_delta;
        self.moves += 1;
        let store_error = self.record_high_score();
        self.pending = Some(PendingTurn {
            merged_cells: result.merged_cells.clone(),
            score_delta: result.score_delta,
            store_error,
        });

        if self.settle_delay.is_zero() {
            return SubmitOutcome::Completed(self.finish_turn());
        }
        self.phase = Phase::Settling {
            until: now + self.settle_delay,
        };
        SubmitOutcome::Settling {
            merged_cells: result.merged_cells,
        }
    }

    /// Finish a settling turn once its delay has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<TurnReport> {
        match self.phase {
            Phase::Settling { until } if now >= until => Some(self.finish_turn()),
            _ => None,
        }
    }

    /// Host went hidden: skip the remaining settle delay so input is never left blocked.
    pub fn suspend(&mut self) -> Option<TurnReport> {
        match self.phase {
            Phase::Settling { .. } => Some(self.finish_turn()),
            _ => None,
        }
    }

    fn record_high_score(&mut self) -> Option<StoreError> {
        if self.score <= self.high_score {
            return None;
        }
        self.high_score = self.score;
        if !self.store_readable {
            return None;
        }
        match self.store.save(self.score) {
            Ok(()) => None,
            Err(e) => {
                warn!("could not save high score {}: {e}", self.score);
                Some(e)
            }
        }
    }

    fn finish_turn(&mut self) -> TurnReport {
        let pending = self.pending.take().unwrap_or_default();
        let spawned = spawn_tile(&mut self.grid, &mut self.rng);
        let was_won = self.flags.won;
        self.flags = evaluate(&self.grid, was_won, self.win_tile);
        self.phase = Phase::Playing;

        let newly_won = self.flags.won && !was_won;
        if newly_won {
            info!("reached {} after {} moves, score {}", self.win_tile, self.moves, self.score);
        }
        if self.flags.lost {
            info!("no moves left: score {}, best tile {}", self.score, self.grid.max_tile());
        }
        debug!(
            "turn {}: +{} -> {}, spawned {:?} = {:?}, board total {}",
            self.moves,
            pending.score_delta,
            self.score,
            spawned,
            spawned.and_then(|(r, c)| self.grid.get(r, c)),
            self.grid.total()
        );

        TurnReport {
            merged_cells: pending.merged_cells,
            spawned,
            score: self.score,
            score_delta: pending.score_delta,
            high_score: self.high_score,
            flags: self.flags,
            newly_won,
            store_error: pending.store_error,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn status(&self) -> GameStatus {
        self.flags.status()
    }

    pub fn is_turn_in_progress(&self) -> bool {
        matches!(self.phase, Phase::Settling { .. })
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn win_tile(&self) -> u32 {
        self.win_tile
    }
}
