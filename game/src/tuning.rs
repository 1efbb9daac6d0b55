use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::pieces::SLOT_DELTA;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AnimationTuning {
    pub speed_px_per_sec: f32,
    pub snap_threshold_px: f32,
}

impl Default for AnimationTuning {
    fn default() -> Self {
        // An eighth of a slot per 60 Hz frame, same feel at any tick rate.
        Self {
            speed_px_per_sec: SLOT_DELTA * 0.125 * 60.0,
            snap_threshold_px: 2.5,
        }
    }
}

impl AnimationTuning {
    /// A non-positive speed or threshold would leave tiles sliding forever.
    pub fn clamp(mut self) -> Self {
        self.speed_px_per_sec = self.speed_px_per_sec.max(1.0);
        self.snap_threshold_px = self.snap_threshold_px.max(0.01);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpawnTuning {
    pub starting_tiles: u8,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self { starting_tiles: 2 }
    }
}

impl SpawnTuning {
    pub fn clamp(mut self) -> Self {
        self.starting_tiles = self.starting_tiles.clamp(1, 8);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Tuning {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub animation: AnimationTuning,
    #[serde(default)]
    pub spawn: SpawnTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            version: default_version(),
            animation: AnimationTuning::default(),
            spawn: SpawnTuning::default(),
        }
    }
}

impl Tuning {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.animation = self.animation.clamp();
        self.spawn = self.spawn.clamp();
        self
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct TuningStore {
    path: PathBuf,
}

impl TuningStore {
    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("S2048_TUNING_PATH") {
            return Self {
                path: PathBuf::from(explicit),
            };
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("s2048");
        path.push("tuning.json");
        Self { path }
    }

    pub fn load(&self) -> Tuning {
        let Ok(bytes) = fs::read(&self.path) else {
            return Tuning::default();
        };
        serde_json::from_slice::<Tuning>(&bytes)
            .map(Tuning::sanitized)
            .unwrap_or_else(|_| Tuning::default())
    }

    pub fn save(&self, tuning: &Tuning) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(tuning)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}
