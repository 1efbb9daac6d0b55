//! One independent game: board, turn state machine, score, and per-frame
//! render submission.

use std::collections::VecDeque;
use std::time::Duration;

use engine::render::{SpriteBatch, TextBatch, TextureDb};
use serde::{Deserialize, Serialize};

use crate::board_ui;
use crate::pieces::{Direction, PieceId, PieceStore};
use crate::tuning::Tuning;

/// Phases of a single turn. A direction input queues the full sequence;
/// each phase executes only once every tile is at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    Idle,
    Compress(Direction),
    Merge(Direction),
    PieceRemoval,
    AddPiece,
    CheckGameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub slot: u8,
    pub value: u16,
}

/// Stable view of a session for assertions and display, tiles sorted by
/// slot so two equal boards always snapshot identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub tiles: Vec<TileSnapshot>,
    pub score: u32,
    pub best_score: u32,
    pub phase: TurnPhase,
    pub game_over: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pieces: PieceStore,
    stale: VecDeque<PieceId>,
    turn_queue: VecDeque<TurnPhase>,
    score: u32,
    best_score: u32,
    should_add_new_piece: bool,
    game_over: bool,
    tuning: Tuning,
}

impl GameSession {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            pieces: PieceStore::new(seed),
            stale: VecDeque::new(),
            turn_queue: VecDeque::from([TurnPhase::Idle]),
            score: 0,
            best_score: 0,
            should_add_new_piece: false,
            game_over: false,
            tuning: tuning.sanitized(),
        }
    }

    /// Clears the board and spawns the starting tiles. The previous game's
    /// score rolls into the best score before resetting.
    pub fn new_game(&mut self) {
        self.best_score = self.best_score.max(self.score);
        self.score = 0;
        self.pieces.reset();
        self.stale.clear();
        self.turn_queue.clear();
        self.turn_queue.push_back(TurnPhase::Idle);
        self.should_add_new_piece = false;
        self.game_over = false;
        for _ in 0..self.tuning.spawn.starting_tiles {
            let _ = self.pieces.create_random();
        }
    }

    /// Queues a full turn for `dir`. Inputs arriving while a previous turn
    /// is still resolving are dropped, and the return value says which.
    pub fn handle_direction(&mut self, dir: Direction) -> bool {
        if self.current_phase() != TurnPhase::Idle {
            return false;
        }
        self.turn_queue.clear();
        self.turn_queue.extend([
            TurnPhase::Compress(dir),
            TurnPhase::Merge(dir),
            TurnPhase::PieceRemoval,
            TurnPhase::AddPiece,
            TurnPhase::CheckGameOver,
            TurnPhase::Idle,
        ]);
        self.should_add_new_piece = false;
        true
    }

    pub fn current_phase(&self) -> TurnPhase {
        self.turn_queue
            .front()
            .copied()
            .unwrap_or(TurnPhase::Idle)
    }

    /// One simulation tick: animate, settle values, then run at most one
    /// turn phase.
    pub fn step(&mut self, dt: Duration) {
        self.pieces
            .update_positions(dt.as_secs_f32(), &self.tuning.animation);
        self.pieces.update_values();
        self.step_turn_queue();
    }

    /// Full frame entry point for hosts: simulate, then submit this frame's
    /// sprites and text.
    pub fn on_tick(
        &mut self,
        dt: Duration,
        textures: &TextureDb,
        sprites: &mut SpriteBatch,
        text: &mut TextBatch,
    ) {
        self.step(dt);
        board_ui::submit(self, textures, sprites, text);
    }

    fn step_turn_queue(&mut self) {
        let head = self.current_phase();
        if head == TurnPhase::Idle {
            return;
        }
        if !self.pieces.idle() {
            return;
        }
        match head {
            TurnPhase::Idle => return,
            TurnPhase::Compress(dir) => {
                if self.pieces.compress(dir) {
                    self.should_add_new_piece = true;
                }
            }
            TurnPhase::Merge(dir) => {
                let outcome = self.pieces.merge(dir, &mut self.stale);
                if outcome.merged {
                    self.should_add_new_piece = true;
                }
                self.score += outcome.points;
            }
            TurnPhase::PieceRemoval => {
                while let Some(id) = self.stale.pop_front() {
                    self.pieces.delete(id);
                }
            }
            TurnPhase::AddPiece => {
                if self.should_add_new_piece {
                    let _ = self.pieces.create_random();
                }
            }
            TurnPhase::CheckGameOver => {
                if !self.pieces.has_legal_move() {
                    // Parked: the phase stays queued so the flag holds
                    // until new_game unblocks the session.
                    self.game_over = true;
                    return;
                }
                self.game_over = false;
            }
        }
        self.turn_queue.pop_front();
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score.max(self.score)
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn pieces(&self) -> &PieceStore {
        &self.pieces
    }

    /// Places a resting tile directly, bypassing the spawner. Scenario
    /// setup hook for tests and debug tooling.
    pub fn place_tile(&mut self, value: u16, slot: u8) -> Option<PieceId> {
        self.pieces.create(value, slot)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut tiles: Vec<TileSnapshot> = self
            .pieces
            .live_ids()
            .filter_map(|id| self.pieces.tile(id))
            .map(|tile| TileSnapshot {
                slot: tile.current_slot,
                value: tile.current_value,
            })
            .collect();
        tiles.sort_by_key(|t| t.slot);
        SessionSnapshot {
            tiles,
            score: self.score,
            best_score: self.best_score(),
            phase: self.current_phase(),
            game_over: self.game_over,
        }
    }
}
