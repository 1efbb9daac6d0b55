//! Scripted playout support over the headless harness.

use std::time::Duration;

use engine::GameLogic;

use crate::pieces::Direction;
use crate::session::{GameSession, TurnPhase};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInput {
    Noop,
    Move(Direction),
    Tick { ms: u64 },
    NewGame,
}

/// [`GameLogic`] adapter: each step clones the session and applies one
/// input, so every frame of a playout stays recorded and replayable.
#[derive(Debug, Clone, Copy)]
pub struct SessionLogic {
    seed: u64,
    tuning: Tuning,
}

impl SessionLogic {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            tuning: Tuning::default(),
        }
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self { seed, tuning }
    }
}

impl GameLogic for SessionLogic {
    type State = GameSession;
    type Input = SessionInput;

    fn initial_state(&self) -> Self::State {
        let mut session = GameSession::new(self.seed, self.tuning);
        session.new_game();
        session
    }

    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State {
        let mut next = state.clone();
        match input {
            SessionInput::Noop => {}
            SessionInput::Move(dir) => {
                next.handle_direction(dir);
            }
            SessionInput::Tick { ms } => next.step(Duration::from_millis(ms)),
            SessionInput::NewGame => next.new_game(),
        }
        next
    }
}

/// Ticks the session until the current turn fully resolves. Returns false
/// when `max_ticks` elapses first, which includes parking on game over.
pub fn run_until_idle(session: &mut GameSession, tick: Duration, max_ticks: usize) -> bool {
    for _ in 0..max_ticks {
        if session.current_phase() == TurnPhase::Idle && session.pieces().idle() {
            return true;
        }
        session.step(tick);
    }
    session.current_phase() == TurnPhase::Idle && session.pieces().idle()
}
