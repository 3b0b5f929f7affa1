use crate::cue::builder::SheetBuilder;
use crate::cue::error::CueResult;
use crate::cue::line::CueLine;
use crate::cue::observer::{ParseObserver, ParseWarning, WarningKind};
use crate::cue::segment::segment;
use crate::sheet::Sheet;
use crate::sheet::validation::ValidationProfile;
use log::debug;
use std::path::{Path, PathBuf};

mod builder;
pub mod error;
pub mod line;
pub mod observer;
mod segment;
pub mod writer;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Validation applied to every INDEX line.
    pub profile: ValidationProfile,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            profile: ValidationProfile::Parsing,
        }
    }
}

pub struct CueParser {
    cue_path: PathBuf,
    options: ParseOptions,
}

impl CueParser {
    pub fn new(cue_path: impl AsRef<Path>) -> Self {
        Self {
            cue_path: cue_path.as_ref().to_path_buf(),
            options: ParseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn parse(&self, observer: &mut dyn ParseObserver) -> CueResult<Sheet> {
        let data = tokio::fs::read(&self.cue_path).await?;
        debug!(
            "Parsing {} ({} bytes)",
            self.cue_path.display(),
            data.len()
        );
        let text = decode(&data, observer);
        parse_str(&text, self.options, observer)
    }
}

pub fn parse_str(
    text: &str,
    options: ParseOptions,
    observer: &mut dyn ParseObserver,
) -> CueResult<Sheet> {
    parse_lines(text.lines(), options, observer)
}

/// Parses already decoded lines. Line numbers in errors and warnings count
/// from one, blank lines included.
pub fn parse_lines<I, S>(
    lines: I,
    options: ParseOptions,
    observer: &mut dyn ParseObserver,
) -> CueResult<Sheet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let classified = lines
        .into_iter()
        .enumerate()
        .filter_map(|(offset, raw)| CueLine::parse(offset + 1, raw.as_ref()));
    let document = segment(classified)?;
    SheetBuilder::new(options, observer).build(document)
}

fn decode(data: &[u8], observer: &mut dyn ParseObserver) -> String {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    match std::str::from_utf8(data) {
        Ok(text) => text.to_string(),
        Err(_) => {
            observer.warning(ParseWarning::sheet(WarningKind::LossyDecoding));
            String::from_utf8_lossy(data).into_owned()
        }
    }
}
