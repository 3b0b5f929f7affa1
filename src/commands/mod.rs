use crate::commands::sheet::{CheckCommand, InspectCommand, NormalizeCommand};
use clap::{Parser, Subcommand};

pub mod sheet;

/// CLI for inspecting, checking and normalizing CUE sheets.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inspect(InspectCommand),
    Check(CheckCommand),
    Normalize(NormalizeCommand),
}
