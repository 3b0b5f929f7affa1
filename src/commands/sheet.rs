use clap::Parser;
use std::path::PathBuf;

/// Prints the File, Track and Index tree of a CUE sheet.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct InspectCommand {
    /// Input CUE sheet
    #[arg(value_name = "INPUT_CUE")]
    pub input_cue: PathBuf,
}

/// Parses a CUE sheet and reports every problem found.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct CheckCommand {
    /// Input CUE sheet
    #[arg(value_name = "INPUT_CUE")]
    pub input_cue: PathBuf,
}

/// Parses a CUE sheet and writes it back in canonical layout.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct NormalizeCommand {
    /// Input CUE sheet
    #[arg(value_name = "INPUT_CUE")]
    pub input_cue: PathBuf,

    /// Output CUE sheet path
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Force overwrite of the output file if it already exists
    #[arg(long, short = 'f', value_name = "FORCE", default_value_t = false)]
    pub force: bool,
}
