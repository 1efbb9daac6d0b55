use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use engine::regression::{self, StateHashGolden};

fn unique_temp_golden_path() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("s2048_test_golden_{nanos}.json"))
}

fn golden(hashes: &[&str]) -> StateHashGolden {
    StateHashGolden::new(
        "harness_case",
        42,
        hashes.iter().map(|s| s.to_string()).collect(),
    )
}

#[test]
fn missing_golden_is_bootstrapped_then_enforced() {
    let path = unique_temp_golden_path();
    let fresh = golden(&["aa", "bb"]);

    // First run writes the file and accepts.
    regression::assert_or_update_golden_json(&path, &fresh).expect("bootstrap write");
    let stored = regression::load_golden_json(&path).expect("golden readable");
    assert_eq!(stored, fresh);

    // Matching rerun passes, diverging rerun fails.
    regression::assert_or_update_golden_json(&path, &fresh).expect("identical playout");
    let diverged = golden(&["aa", "cc"]);
    let err = regression::assert_or_update_golden_json(&path, &diverged)
        .expect_err("divergent playout must fail");
    assert!(err.to_string().contains("frame 1"), "{err}");

    let _ = fs::remove_file(path);
}

#[test]
fn version_bump_invalidates_stored_goldens() {
    let path = unique_temp_golden_path();
    let mut old = golden(&["aa"]);
    old.version = 0;
    regression::save_golden_json(&path, &old).expect("seed old-version golden");

    let fresh = golden(&["aa"]);
    let err = regression::assert_or_update_golden_json(&path, &fresh)
        .expect_err("stale version must fail");
    assert!(err.to_string().contains("version"), "{err}");

    let _ = fs::remove_file(path);
}

#[test]
fn golden_path_macro_stays_inside_tests_goldens() {
    let path = engine::regression_golden_path!("some case/name");
    assert!(path.ends_with("tests/goldens/some_case_name.json"));
    assert!(path.starts_with(env!("CARGO_MANIFEST_DIR")));
}
