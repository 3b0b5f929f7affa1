use crate::cue::CueParser;
use crate::cue::observer::{LogObserver, ParseWarning};
use crate::cue::writer::CueWriter;
use crate::error::{CueKitError, CueKitResult};
use crate::sheet::Sheet;
use log::{debug, info};
use std::fmt::Write as _;
use std::path::PathBuf;
use tokio::fs;

/// Parses a sheet and renders its File → Track → Index tree.
pub async fn inspect_cue(cue_path: PathBuf) -> CueKitResult<String> {
    debug!("Parsing CUE file: {:?}", cue_path);
    let sheet = CueParser::new(&cue_path).parse(&mut LogObserver).await?;
    render_tree(&sheet)
}

/// Parses a sheet and returns every warning raised on the way, consistency
/// issues included. Structural errors come back as `Err`.
pub async fn check_cue(cue_path: PathBuf) -> CueKitResult<Vec<ParseWarning>> {
    debug!("Checking CUE file: {:?}", cue_path);
    let mut warnings = Vec::new();
    let sheet = CueParser::new(&cue_path).parse(&mut warnings).await?;
    info!(
        "{} files, {} tracks, {} indices, {} warnings",
        sheet.file_count(),
        sheet.track_count(),
        sheet.index_count(),
        warnings.len()
    );
    Ok(warnings)
}

/// Parses a sheet and writes it back in canonical layout.
pub async fn normalize_cue(cue_path: PathBuf, output_path: PathBuf, force: bool) -> CueKitResult<()> {
    if fs::metadata(&output_path).await.is_ok() && !force {
        return Err(CueKitError::OutputAlreadyExists(output_path));
    }

    debug!("Parsing CUE file: {:?}", cue_path);
    let sheet = CueParser::new(&cue_path).parse(&mut LogObserver).await?;

    debug!("Writing CUE file: {:?}", output_path);
    CueWriter::save(&sheet, &output_path).await?;

    info!("Normalized {:?} into {:?}", cue_path, output_path);
    Ok(())
}

fn render_tree(sheet: &Sheet) -> CueKitResult<String> {
    let mut out = String::new();
    if let Some(title) = &sheet.info.title {
        let _ = writeln!(out, "{title}");
    }

    for (file_id, file) in sheet.files() {
        let _ = writeln!(out, "{}: {} [{}]", file.position(), file.path, file.file_type);
        for track_id in sheet.tracks_of(file_id) {
            let track = sheet.track(track_id)?;
            let title = sheet.track_title(track_id)?.unwrap_or("-");
            let performer = sheet.track_performer(track_id)?.unwrap_or("-");
            let _ = write!(
                out,
                "  TRACK {:02} {} {title} / {performer}",
                track.number(),
                track.track_type
            );
            if let Some(end) = track.eac_end_index() {
                let _ = write!(out, " (starts in previous file at {end})");
            }
            let _ = writeln!(out);

            for index_id in sheet.indices_of(track_id) {
                let index = sheet.index(index_id)?;
                let location = if index.file() == file_id {
                    String::new()
                } else {
                    format!(" in {}", sheet.file(index.file())?.path)
                };
                let _ = writeln!(
                    out,
                    "    INDEX {:02} {}{location}",
                    index.number(),
                    index.time()
                );
            }
        }
    }
    Ok(out)
}
