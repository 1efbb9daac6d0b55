//! Tile storage and board-logic primitives for the 4x4 board.
//!
//! Slots are flattened row-major: slot = row * 4 + col, row 0 at the top.
//! Every tile carries a current and a target slot; the two differ only while
//! the tile is sliding, and all board mutations write targets while all board
//! reads look at currents.

use std::collections::VecDeque;

use engine::render::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::AnimationTuning;

pub const BOARD_DIM: u8 = 4;
pub const BOARD_SLOTS: u8 = BOARD_DIM * BOARD_DIM;

/// Pixel distance between adjacent slot centers.
pub const SLOT_DELTA: f32 = 121.0;

const SLOT_XS: [f32; 4] = [15.0, 136.0, 257.0, 378.0];
const SLOT_YS: [f32; 4] = [315.0, 436.0, 557.0, 678.0];

pub type PieceId = u8;

/// xorshift64* generator, embedded so playouts replay deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        // xorshift stays at zero forever; remap that one seed.
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        (x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 32) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardAddress {
    pub row: u8,
    pub col: u8,
}

/// Sentinel returned when a flat index does not name a board slot.
pub const NO_MATCH_ADDRESS: BoardAddress = BoardAddress {
    row: BOARD_SLOTS,
    col: BOARD_SLOTS,
};

pub fn deflatten_slot(slot: u8) -> BoardAddress {
    if slot < BOARD_SLOTS {
        BoardAddress {
            row: slot / BOARD_DIM,
            col: slot % BOARD_DIM,
        }
    } else {
        NO_MATCH_ADDRESS
    }
}

pub fn flatten_address(row: u8, col: u8) -> u8 {
    row * BOARD_DIM + col
}

pub fn slot_coords(slot: u8) -> Vec2 {
    let addr = deflatten_slot(slot);
    Vec2::new(SLOT_XS[addr.col as usize], SLOT_YS[addr.row as usize])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn line_kind(self) -> LineKind {
        match self {
            Direction::Left | Direction::Right => LineKind::Row,
            Direction::Up | Direction::Down => LineKind::Column,
        }
    }

    /// Whether tiles travel toward line position 3 (right edge of a row,
    /// bottom of a column).
    pub fn toward_high(self) -> bool {
        matches!(self, Direction::Right | Direction::Down)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    Row,
    Column,
}

impl LineKind {
    pub const BOTH: [LineKind; 2] = [LineKind::Row, LineKind::Column];
}

/// Occupancy of a four-slot line, X occupied and O empty, read from line
/// position 0 to 3. The discriminant doubles as the occupancy bitmask with
/// bit i set when position i holds a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum LinePattern {
    OOOO = 0b0000,
    XOOO = 0b0001,
    OXOO = 0b0010,
    XXOO = 0b0011,
    OOXO = 0b0100,
    XOXO = 0b0101,
    OXXO = 0b0110,
    XXXO = 0b0111,
    OOOX = 0b1000,
    XOOX = 0b1001,
    OXOX = 0b1010,
    XXOX = 0b1011,
    OOXX = 0b1100,
    XOXX = 0b1101,
    OXXX = 0b1110,
    XXXX = 0b1111,
}

impl LinePattern {
    pub fn from_mask(mask: u8) -> LinePattern {
        match mask & 0b1111 {
            0b0000 => LinePattern::OOOO,
            0b0001 => LinePattern::XOOO,
            0b0010 => LinePattern::OXOO,
            0b0011 => LinePattern::XXOO,
            0b0100 => LinePattern::OOXO,
            0b0101 => LinePattern::XOXO,
            0b0110 => LinePattern::OXXO,
            0b0111 => LinePattern::XXXO,
            0b1000 => LinePattern::OOOX,
            0b1001 => LinePattern::XOOX,
            0b1010 => LinePattern::OXOX,
            0b1011 => LinePattern::XXOX,
            0b1100 => LinePattern::OOXX,
            0b1101 => LinePattern::XOXX,
            0b1110 => LinePattern::OXXX,
            _ => LinePattern::XXXX,
        }
    }

    pub fn mask(self) -> u8 {
        self as u8
    }

    pub fn occupied_count(self) -> u32 {
        self.mask().count_ones()
    }
}

/// One extracted row or column, tiles keyed by line position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub slots: [Option<PieceId>; 4],
    pub pattern: LinePattern,
}

impl Line {
    pub fn count(&self) -> u32 {
        self.pattern.occupied_count()
    }
}

/// Per-pattern slide table for movement toward position 3, as (from, to)
/// line-position pairs in travel order. Only positions that actually move
/// get an entry; relative order within the line is preserved.
const COMPRESS_TOWARD_HIGH: [&[(u8, u8)]; 16] = [
    &[],                       // OOOO
    &[(0, 3)],                 // XOOO
    &[(1, 3)],                 // OXOO
    &[(0, 2), (1, 3)],         // XXOO
    &[(2, 3)],                 // OOXO
    &[(0, 2), (2, 3)],         // XOXO
    &[(1, 2), (2, 3)],         // OXXO
    &[(0, 1), (1, 2), (2, 3)], // XXXO
    &[],                       // OOOX
    &[(0, 2)],                 // XOOX
    &[(1, 2)],                 // OXOX
    &[(0, 1), (1, 2)],         // XXOX
    &[],                       // OOXX
    &[(0, 1)],                 // XOXX
    &[],                       // OXXX
    &[],                       // XXXX
];

/// Reverses the four occupancy bits, mapping a pattern onto its mirror.
fn mask_reflect(mask: u8) -> u8 {
    ((mask & 0b0001) << 3)
        | ((mask & 0b0010) << 1)
        | ((mask & 0b0100) >> 1)
        | ((mask & 0b1000) >> 3)
}

/// Slide moves for a pattern in either travel direction. Toward-low moves
/// come from the mirrored pattern with both positions reflected.
pub fn compress_moves(pattern: LinePattern, toward_high: bool, mut apply: impl FnMut(u8, u8)) {
    let mask = pattern.mask();
    if toward_high {
        for &(from, to) in COMPRESS_TOWARD_HIGH[mask as usize] {
            apply(from, to);
        }
    } else {
        for &(from, to) in COMPRESS_TOWARD_HIGH[mask_reflect(mask) as usize] {
            apply(3 - from, 3 - to);
        }
    }
}

pub fn line_can_compress(pattern: LinePattern, toward_high: bool) -> bool {
    let mask = if toward_high {
        pattern.mask()
    } else {
        mask_reflect(pattern.mask())
    };
    !COMPRESS_TOWARD_HIGH[mask as usize].is_empty()
}

fn slot_at(kind: LineKind, index: u8, pos: u8) -> u8 {
    match kind {
        LineKind::Row => flatten_address(index, pos),
        LineKind::Column => flatten_address(pos, index),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub current_value: u16,
    pub target_value: u16,
    pub current_slot: u8,
    pub target_slot: u8,
    pub position: Vec2,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            current_value: 0,
            target_value: 0,
            current_slot: 0,
            target_slot: 0,
            position: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub merged: bool,
    pub points: u32,
}

/// Fixed-capacity tile store with animation state and the board's RNG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieceStore {
    tiles: [Tile; 16],
    live: [bool; 16],
    free_ids: VecDeque<PieceId>,
    rng: Rng,
}

impl PieceStore {
    pub fn new(seed: u64) -> Self {
        Self {
            tiles: [Tile::default(); 16],
            live: [false; 16],
            free_ids: (0..BOARD_SLOTS).collect(),
            rng: Rng::new(seed),
        }
    }

    /// Clears the board. The RNG keeps its stream so consecutive games on
    /// one session stay on a single deterministic sequence.
    pub fn reset(&mut self) {
        self.live = [false; 16];
        self.free_ids = (0..BOARD_SLOTS).collect();
    }

    pub fn len(&self) -> usize {
        self.live.iter().filter(|&&l| l).count()
    }

    pub fn is_empty(&self) -> bool {
        self.live.iter().all(|&l| !l)
    }

    pub fn is_full(&self) -> bool {
        self.free_ids.is_empty()
    }

    pub fn is_live(&self, id: PieceId) -> bool {
        self.live.get(id as usize).copied().unwrap_or(false)
    }

    pub fn live_ids(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.live
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l)
            .map(|(i, _)| i as PieceId)
    }

    pub fn tile(&self, id: PieceId) -> Option<&Tile> {
        if self.is_live(id) {
            Some(&self.tiles[id as usize])
        } else {
            None
        }
    }

    pub fn slot_occupied(&self, slot: u8) -> bool {
        self.piece_at(slot).is_some()
    }

    pub fn piece_at(&self, slot: u8) -> Option<PieceId> {
        self.live_ids()
            .find(|&id| self.tiles[id as usize].current_slot == slot)
    }

    /// Places a tile at rest in `slot`. Returns `None` when all ids are in
    /// use or the slot is off the board.
    pub fn create(&mut self, value: u16, slot: u8) -> Option<PieceId> {
        if slot >= BOARD_SLOTS {
            return None;
        }
        let id = self.free_ids.pop_front()?;
        self.tiles[id as usize] = Tile {
            current_value: value,
            target_value: value,
            current_slot: slot,
            target_slot: slot,
            position: slot_coords(slot),
        };
        self.live[id as usize] = true;
        Some(id)
    }

    /// Returns false when `id` is not live, so double deletion is visible to
    /// the caller instead of corrupting the free list.
    pub fn delete(&mut self, id: PieceId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        self.live[id as usize] = false;
        self.free_ids.push_back(id);
        true
    }

    /// Spawns a 2 or 4 on a uniformly chosen empty slot.
    pub fn create_random(&mut self) -> Option<PieceId> {
        if self.is_full() {
            return None;
        }
        let value = if self.rng.next_u32() % 2 == 0 { 2 } else { 4 };
        let mut slot = (self.rng.next_u32() % BOARD_SLOTS as u32) as u8;
        while self.slot_occupied(slot) {
            slot = (self.rng.next_u32() % BOARD_SLOTS as u32) as u8;
        }
        self.create(value, slot)
    }

    /// True once every live tile has reached its target slot.
    pub fn idle(&self) -> bool {
        self.live_ids()
            .all(|id| self.tiles[id as usize].current_slot == self.tiles[id as usize].target_slot)
    }

    /// Extracts row or column `index`, tiles keyed by current slot.
    pub fn line(&self, kind: LineKind, index: u8) -> Line {
        let mut slots = [None; 4];
        for id in self.live_ids() {
            let addr = deflatten_slot(self.tiles[id as usize].current_slot);
            let pos = match kind {
                LineKind::Row if addr.row == index => addr.col,
                LineKind::Column if addr.col == index => addr.row,
                _ => continue,
            };
            slots[pos as usize] = Some(id);
        }
        let mut mask = 0u8;
        for (pos, slot) in slots.iter().enumerate() {
            if slot.is_some() {
                mask |= 1 << pos;
            }
        }
        Line {
            slots,
            pattern: LinePattern::from_mask(mask),
        }
    }

    /// Slides every line's tiles toward the `dir` edge by retargeting them.
    /// Returns true when at least one tile was retargeted.
    pub fn compress(&mut self, dir: Direction) -> bool {
        let kind = dir.line_kind();
        let toward_high = dir.toward_high();
        let mut moved = false;
        for index in 0..BOARD_DIM {
            let line = self.line(kind, index);
            compress_moves(line.pattern, toward_high, |from, to| {
                if let Some(id) = line.slots[from as usize] {
                    self.tiles[id as usize].target_slot = slot_at(kind, index, to);
                    moved = true;
                }
            });
        }
        moved
    }

    /// Merges at most one adjacent equal-valued pair per line, nearest the
    /// `dir` edge first. The edge-ward tile survives in place with its value
    /// doubled; the inner tile goes onto `stale` for later removal, and any
    /// tiles past the pair compact one position toward the edge. Points are
    /// the sum of post-merge values.
    pub fn merge(&mut self, dir: Direction, stale: &mut VecDeque<PieceId>) -> MergeOutcome {
        let kind = dir.line_kind();
        let toward_high = dir.toward_high();
        let mut outcome = MergeOutcome {
            merged: false,
            points: 0,
        };
        for index in 0..BOARD_DIM {
            let line = self.line(kind, index);
            let order: [usize; 4] = if toward_high { [3, 2, 1, 0] } else { [0, 1, 2, 3] };
            let occupied: Vec<(usize, PieceId)> = order
                .into_iter()
                .filter_map(|pos| line.slots[pos].map(|id| (pos, id)))
                .collect();
            for pair in 0..occupied.len().saturating_sub(1) {
                let (edge_pos, edge_id) = occupied[pair];
                let (inner_pos, inner_id) = occupied[pair + 1];
                let adjacent = edge_pos.abs_diff(inner_pos) == 1;
                if !adjacent
                    || self.tiles[edge_id as usize].current_value
                        != self.tiles[inner_id as usize].current_value
                {
                    continue;
                }
                let doubled = self.tiles[edge_id as usize].current_value * 2;
                self.tiles[edge_id as usize].target_value = doubled;
                stale.push_back(inner_id);
                for &(pos, id) in &occupied[pair + 2..] {
                    let shifted = if toward_high { pos + 1 } else { pos - 1 };
                    self.tiles[id as usize].target_slot = slot_at(kind, index, shifted as u8);
                }
                outcome.points += u32::from(doubled);
                outcome.merged = true;
                break;
            }
        }
        outcome
    }

    /// True while any input direction could still change the board.
    /// An empty board never counts as stuck.
    pub fn has_legal_move(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        for dir in Direction::ALL {
            for index in 0..BOARD_DIM {
                let line = self.line(dir.line_kind(), index);
                if line_can_compress(line.pattern, dir.toward_high()) {
                    return true;
                }
            }
        }
        for kind in LineKind::BOTH {
            for index in 0..BOARD_DIM {
                let line = self.line(kind, index);
                for pos in 0..3 {
                    if let (Some(a), Some(b)) = (line.slots[pos], line.slots[pos + 1]) {
                        if self.tiles[a as usize].current_value
                            == self.tiles[b as usize].current_value
                        {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Advances sliding tiles by `dt` seconds, snapping once within the
    /// snap threshold or once the step would overshoot.
    pub fn update_positions(&mut self, dt: f32, tuning: &AnimationTuning) {
        let step = tuning.speed_px_per_sec * dt;
        for slot in 0..self.live.len() {
            if !self.live[slot] {
                continue;
            }
            let tile = &mut self.tiles[slot];
            if tile.current_slot == tile.target_slot {
                continue;
            }
            let target = slot_coords(tile.target_slot);
            let delta = target - tile.position;
            let distance = delta.length();
            if distance < tuning.snap_threshold_px || step >= distance {
                tile.position = target;
                tile.current_slot = tile.target_slot;
            } else {
                tile.position = tile.position + delta * (step / distance);
            }
        }
    }

    /// Applies pending value doublings.
    pub fn update_values(&mut self) {
        for slot in 0..self.live.len() {
            if self.live[slot] {
                self.tiles[slot].current_value = self.tiles[slot].target_value;
            }
        }
    }

    /// Sum of live tile values, reading targets so a mid-merge board still
    /// accounts for pending doublings.
    pub fn total_value(&self) -> u32 {
        self.live_ids()
            .map(|id| u32::from(self.tiles[id as usize].target_value))
            .sum()
    }
}
