use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use engine::regression::{self, StateHashGolden};
use engine::{HeadlessRunner, TimeMachine, regression_golden_path};
use game::pieces::Direction;
use game::playtest::{SessionInput, SessionLogic};
use game::session::GameSession;

const SEED: u64 = 2048;

/// Four moves with enough ticks after each for the turn to fully resolve.
fn scripted_inputs() -> Vec<SessionInput> {
    let mut inputs = Vec::new();
    for dir in [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Down,
    ] {
        inputs.push(SessionInput::Move(dir));
        for _ in 0..10 {
            inputs.push(SessionInput::Tick { ms: 250 });
        }
    }
    inputs
}

fn unique_temp_json_path() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("s2048_test_session_timemachine_{nanos}.json"))
}

#[test]
fn scripted_playout_matches_the_stored_golden() {
    let mut runner = HeadlessRunner::new(SessionLogic::new(SEED));
    runner.run(scripted_inputs());

    let hashes = regression::hash_states(runner.history()).expect("session states serialize");
    let fresh = StateHashGolden::new("scripted_playout_seed_2048", SEED, hashes);
    let path = regression_golden_path!("scripted_playout_seed_2048");
    regression::assert_or_update_golden_json(&path, &fresh)
        .expect("playout must match the golden hashes");
}

#[test]
fn identical_seeds_hash_identically_frame_by_frame() {
    let mut a = HeadlessRunner::new(SessionLogic::new(SEED));
    let mut b = HeadlessRunner::new(SessionLogic::new(SEED));
    a.run(scripted_inputs());
    b.run(scripted_inputs());

    let hashes_a = regression::hash_states(a.history()).unwrap();
    let hashes_b = regression::hash_states(b.history()).unwrap();
    assert_eq!(hashes_a, hashes_b);

    let mut c = HeadlessRunner::new(SessionLogic::new(SEED + 1));
    c.run(scripted_inputs());
    let hashes_c = regression::hash_states(c.history()).unwrap();
    assert_ne!(hashes_a, hashes_c, "a different seed must diverge");
}

#[test]
fn session_timemachine_saves_and_replays_from_disk() {
    let mut runner = HeadlessRunner::new(SessionLogic::new(7));
    runner.run([
        SessionInput::Move(Direction::Left),
        SessionInput::Tick { ms: 1000 },
        SessionInput::Tick { ms: 1000 },
        SessionInput::Tick { ms: 1000 },
    ]);

    let out = unique_temp_json_path();
    runner
        .timemachine()
        .save_json_file(&out)
        .expect("save session timemachine json");

    let loaded = TimeMachine::<GameSession>::load_json_file(&out)
        .expect("load session timemachine json");
    let replay = HeadlessRunner::from_timemachine(SessionLogic::new(7), loaded);

    assert_eq!(replay.timemachine().len(), runner.timemachine().len());
    for frame in 0..runner.timemachine().len() {
        let a = runner.timemachine().state_at(frame).unwrap().snapshot();
        let b = replay.timemachine().state_at(frame).unwrap().snapshot();
        assert_eq!(a, b, "snapshot mismatch at frame {frame}");
    }

    let _ = fs::remove_file(out);
}

#[test]
fn rewinding_a_playout_branches_deterministically() {
    let mut runner = HeadlessRunner::new(SessionLogic::new(9));
    runner.run(scripted_inputs());
    let final_hash = regression::state_sha256_hex(runner.state()).unwrap();

    runner.seek(0);
    runner.run(scripted_inputs());
    let replayed_hash = regression::state_sha256_hex(runner.state()).unwrap();
    assert_eq!(final_hash, replayed_hash);
}
