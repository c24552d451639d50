//! Drag-and-drop chess board on top of the `engine` crate.
//!
//! Legality, move generation and SAN come from `shakmaty`; this crate keeps the piece visuals,
//! drag state and move record in step with it.

pub mod app;
pub mod cli;
pub mod error;
pub mod input;
pub mod layout;
pub mod pgn;
pub mod pieces;
pub mod record;
pub mod render;
pub mod rules;
pub mod session;
pub mod settings;
pub mod sprites;
