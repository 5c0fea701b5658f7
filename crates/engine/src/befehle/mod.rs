//! Befehlsflaeche der Raum-Engine

mod executor;
mod types;

pub use types::{BefehlsKontext, RaumBefehl};
