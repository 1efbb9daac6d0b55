pub mod board_ui;
pub mod pieces;
pub mod playtest;
pub mod session;
pub mod tuning;
