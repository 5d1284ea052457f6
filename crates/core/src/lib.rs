//! Core companion logic for the Mafia party game. Keep this crate free of IO
//! and platform concerns.

pub mod config;
pub mod deal;
pub mod events;
pub mod glossary;
pub mod rng;
pub mod roles;
pub mod roster;
pub mod setup;
pub mod table;

pub use config::*;
pub use deal::*;
pub use events::*;
pub use glossary::*;
pub use rng::*;
pub use roles::*;
pub use roster::*;
pub use setup::*;
pub use table::*;
