//! Per-frame sprite and text submission for a session.

use engine::render::{SpriteBatch, TextBatch, TextureDb, TextureHandle, Vec2};

use crate::session::GameSession;

pub const BOARD_TEXTURE_KEY: &str = "board";
pub const FONT_KEY: &str = "clear_sans";

pub const NEW_GAME_BUTTON_KEYS: [&str; 3] = [
    "new_game_release",
    "new_game_select",
    "new_game_press",
];

/// Tile sprites draw over the board background.
pub const BOARD_DEPTH: f32 = 0.1;
pub const TILE_DEPTH: f32 = 0.2;

pub const TILE_SPRITE_SIZE: f32 = 105.0;
pub const BOARD_SPRITE_SIZE: Vec2 = Vec2::new(498.0, 798.0);

const SCORE_TEXT_POS: Vec2 = Vec2::new(360.0, 58.0);
const BEST_TEXT_POS: Vec2 = Vec2::new(360.0, 178.0);
const TEXT_SCALE: f32 = 1.0;

const TILE_VALUES: [u16; 11] = [2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048];

pub fn texture_key_for_value(value: u16) -> Option<&'static str> {
    match value {
        2 => Some("pieces_2"),
        4 => Some("pieces_4"),
        8 => Some("pieces_8"),
        16 => Some("pieces_16"),
        32 => Some("pieces_32"),
        64 => Some("pieces_64"),
        128 => Some("pieces_128"),
        256 => Some("pieces_256"),
        512 => Some("pieces_512"),
        1024 => Some("pieces_1024"),
        2048 => Some("pieces_2048"),
        _ => None,
    }
}

/// Registers every key the board submits, so hosts can load the matching
/// images up front.
pub fn register_textures(textures: &mut TextureDb) {
    textures.add(BOARD_TEXTURE_KEY);
    for value in TILE_VALUES {
        if let Some(key) = texture_key_for_value(value) {
            textures.add(key);
        }
    }
    for key in NEW_GAME_BUTTON_KEYS {
        textures.add(key);
    }
}

fn handle_for_value(textures: &TextureDb, value: u16) -> Option<TextureHandle> {
    texture_key_for_value(value).and_then(|key| textures.find(key))
}

/// Submits this frame's board, tiles, and score readouts. Both batches are
/// reset first; the caller owns draw submission for anything else.
pub fn submit(
    session: &GameSession,
    textures: &TextureDb,
    sprites: &mut SpriteBatch,
    text: &mut TextBatch,
) {
    sprites.reset();
    text.reset();

    if let Some(board) = textures.find(BOARD_TEXTURE_KEY) {
        sprites.add(board, Vec2::ZERO, BOARD_SPRITE_SIZE, BOARD_DEPTH, 1.0);
    }

    let pieces = session.pieces();
    for id in pieces.live_ids() {
        let Some(tile) = pieces.tile(id) else {
            continue;
        };
        if let Some(handle) = handle_for_value(textures, tile.current_value) {
            sprites.add(
                handle,
                tile.position,
                Vec2::splat(TILE_SPRITE_SIZE),
                TILE_DEPTH,
                1.0,
            );
        }
    }

    text.add(SCORE_TEXT_POS, TEXT_SCALE, FONT_KEY, session.score().to_string());
    text.add(BEST_TEXT_POS, TEXT_SCALE, FONT_KEY, session.best_score().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tile_value_has_a_texture_key() {
        for value in TILE_VALUES {
            assert!(texture_key_for_value(value).is_some(), "value {value}");
        }
        assert_eq!(texture_key_for_value(3), None);
        assert_eq!(texture_key_for_value(4096), None);
    }

    #[test]
    fn register_covers_board_tiles_and_buttons() {
        let mut textures = TextureDb::new();
        register_textures(&mut textures);
        assert_eq!(textures.len(), 1 + TILE_VALUES.len() + NEW_GAME_BUTTON_KEYS.len());
        assert!(textures.find("pieces_2048").is_some());
        assert!(textures.find("new_game_press").is_some());
    }
}
