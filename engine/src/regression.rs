//! Golden state-hash regression helpers.
//!
//! A golden file stores the sha256 of every state along a scripted playout.
//! Tests compare a fresh playout against the stored hashes; running with the
//! update flag set rewrites the file instead of asserting.

use std::{env, fs, io, path::Path};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const UPDATE_GOLDENS_ENV: &str = "S2048_UPDATE_GOLDENS";

pub fn env_flag(name: &str) -> bool {
    match env::var(name) {
        Ok(value) => {
            let value = value.trim();
            !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
        }
        Err(_) => false,
    }
}

pub fn update_goldens_enabled() -> bool {
    env_flag(UPDATE_GOLDENS_ENV)
}

/// Keeps golden names usable as file stems.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Path of a golden file under the calling crate's `tests/goldens/`.
#[macro_export]
macro_rules! regression_golden_path {
    ($name:expr) => {{
        let stem = $crate::regression::sanitize_filename($name);
        std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("goldens")
            .join(format!("{stem}.json"))
    }};
}

/// Hex sha256 over the canonical JSON encoding of a state.
pub fn state_sha256_hex<S: Serialize>(state: &S) -> serde_json::Result<String> {
    let encoded = serde_json::to_vec(state)?;
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    Ok(hex::encode(hasher.finalize()))
}

pub fn hash_states<S: Serialize>(states: &[S]) -> serde_json::Result<Vec<String>> {
    states.iter().map(state_sha256_hex).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateHashGolden {
    pub version: u32,
    pub name: String,
    pub seed: u64,
    pub hashes: Vec<String>,
}

impl StateHashGolden {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(name: &str, seed: u64, hashes: Vec<String>) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            name: name.to_owned(),
            seed,
            hashes,
        }
    }
}

pub fn load_golden_json(path: &Path) -> io::Result<StateHashGolden> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("failed parsing golden {}: {e}", path.display()),
        )
    })
}

pub fn save_golden_json(path: &Path, golden: &StateHashGolden) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(golden)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, text)
}

/// Compares a fresh playout against the stored golden.
///
/// Missing goldens are written and accepted so a new scenario bootstraps
/// itself on first run. Set [`UPDATE_GOLDENS_ENV`] to rewrite on mismatch.
pub fn assert_or_update_golden_json(path: &Path, fresh: &StateHashGolden) -> io::Result<()> {
    if update_goldens_enabled() || !path.exists() {
        save_golden_json(path, fresh)?;
        eprintln!("regression: wrote golden {}", path.display());
        return Ok(());
    }

    let stored = load_golden_json(path)?;
    if stored.version != fresh.version {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "golden {} has version {}, expected {}; rerun with {UPDATE_GOLDENS_ENV}=1",
                path.display(),
                stored.version,
                fresh.version
            ),
        ));
    }
    if stored.hashes != fresh.hashes || stored.seed != fresh.seed {
        let first_diff = stored
            .hashes
            .iter()
            .zip(fresh.hashes.iter())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| stored.hashes.len().min(fresh.hashes.len()));
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "golden {} diverges at frame {first_diff} ({} stored frames, {} fresh); \
                 rerun with {UPDATE_GOLDENS_ENV}=1 to accept",
                path.display(),
                stored.hashes.len(),
                fresh.hashes.len()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_path_separators() {
        assert_eq!(sanitize_filename("basic_playout"), "basic_playout");
        assert_eq!(sanitize_filename("a/b\\c d"), "a_b_c_d");
        assert_eq!(sanitize_filename("seed-7"), "seed-7");
    }

    #[test]
    fn state_hash_is_stable_and_value_sensitive() {
        #[derive(Serialize)]
        struct S {
            score: u32,
        }

        let a = state_sha256_hex(&S { score: 4 }).unwrap();
        let b = state_sha256_hex(&S { score: 4 }).unwrap();
        let c = state_sha256_hex(&S { score: 8 }).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn env_flag_parses_common_spellings() {
        assert!(!env_flag("S2048_FLAG_THAT_IS_NOT_SET"));
    }
}
