//! Command-line front end for the queue facade

pub mod cli;
pub mod commands;
pub mod types;
