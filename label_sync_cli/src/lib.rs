//! label-sync command line interface
//!
//! The binary in `main.rs` is a thin clap front end over these modules.

pub mod config;
pub mod error;
pub mod labels;
pub mod orchestrators;
pub mod output;
pub mod sync;
pub mod terminal;
