use crate::cue::error::CueResult;
use crate::sheet::models::{Remark, Track};
use crate::sheet::{FileId, Sheet, TrackId};
use crate::time::CueTime;
use log::debug;
use std::fmt::Write as _;
use std::path::Path;

/// Serializes a sheet back to CUE text.
///
/// A track split across two files is written the way EAC lays it out: its
/// TRACK line and the indices of the earlier file at the end of that file,
/// the remaining indices right after the next FILE line.
pub struct CueWriter;

impl CueWriter {
    pub fn write(sheet: &Sheet) -> String {
        let mut out = String::new();
        write_sheet(&mut out, sheet);
        out
    }

    pub async fn save(sheet: &Sheet, path: impl AsRef<Path>) -> CueResult<()> {
        let path = path.as_ref();
        tokio::fs::write(path, Self::write(sheet)).await?;
        debug!("Wrote cue sheet to {}", path.display());
        Ok(())
    }
}

fn write_sheet(out: &mut String, sheet: &Sheet) {
    let info = &sheet.info;
    let known = [
        ("GENRE", &info.genre),
        ("DATE", &info.date),
        ("DISCID", &info.disc_id),
        ("COMMENT", &info.comment),
        ("COMPOSER", &info.composer),
    ];
    for (field, value) in known {
        if let Some(value) = value {
            line(out, 0, format_args!("REM {field} {}", quote_if_needed(value)));
        }
    }
    remarks(out, 0, &info.remarks);
    if let Some(catalog) = &info.catalog {
        line(out, 0, format_args!("CATALOG {catalog}"));
    }
    if let Some(cd_text_file) = &info.cd_text_file {
        line(out, 0, format_args!("CDTEXTFILE {}", quote(cd_text_file)));
    }
    if let Some(performer) = &info.performer {
        line(out, 0, format_args!("PERFORMER {}", quote(performer)));
    }
    if let Some(title) = &info.title {
        line(out, 0, format_args!("TITLE {}", quote(title)));
    }
    if let Some(songwriter) = &info.songwriter {
        line(out, 0, format_args!("SONGWRITER {}", quote(songwriter)));
    }

    for (id, file) in sheet.files() {
        if file.file_type.as_str().is_empty() {
            line(out, 0, format_args!("FILE {}", quote(&file.path)));
        } else {
            line(out, 0, format_args!("FILE {} {}", quote(&file.path), file.file_type));
        }
        remarks(out, 2, &file.remarks);

        for track in sheet.tracks_of(id) {
            if sheet.is_split(track) {
                indices(out, sheet, track, id);
                gap(out, "POSTGAP", sheet.track(track).ok().and_then(|t| t.postgap));
            } else {
                write_track(out, sheet, track, id, true);
            }
        }

        // Head of a track the next file continues.
        let carried = sheet
            .next_file(id)
            .and_then(|next| sheet.tracks_of(next).next())
            .filter(|track| sheet.is_split(*track));
        if let Some(track) = carried {
            write_track(out, sheet, track, id, false);
        }
    }
}

fn write_track(out: &mut String, sheet: &Sheet, id: TrackId, file: FileId, with_postgap: bool) {
    let Ok(track) = sheet.track(id) else {
        return;
    };
    line(
        out,
        2,
        format_args!("TRACK {:02} {}", track.number(), track.track_type),
    );
    track_attributes(out, track);
    gap(out, "PREGAP", track.pregap);
    indices(out, sheet, id, file);
    if with_postgap {
        gap(out, "POSTGAP", track.postgap);
    }
}

fn track_attributes(out: &mut String, track: &Track) {
    if let Some(title) = &track.title {
        line(out, 4, format_args!("TITLE {}", quote(title)));
    }
    if let Some(performer) = &track.performer {
        line(out, 4, format_args!("PERFORMER {}", quote(performer)));
    }
    if let Some(songwriter) = &track.songwriter {
        line(out, 4, format_args!("SONGWRITER {}", quote(songwriter)));
    }
    if let Some(composer) = &track.composer {
        line(out, 4, format_args!("REM COMPOSER {}", quote(composer)));
    }
    remarks(out, 4, &track.remarks);
    if let Some(isrc) = &track.isrc {
        line(out, 4, format_args!("ISRC {isrc}"));
    }
    if !track.flags.is_empty() {
        let flags: Vec<&str> = track.flags.iter().map(|flag| flag.as_str()).collect();
        line(out, 4, format_args!("FLAGS {}", flags.join(" ")));
    }
}

fn indices(out: &mut String, sheet: &Sheet, track: TrackId, file: FileId) {
    for id in sheet.indices_of(track) {
        let Ok(index) = sheet.index(id) else {
            continue;
        };
        if index.file() == file {
            line(
                out,
                4,
                format_args!("INDEX {:02} {}", index.number(), index.time()),
            );
        }
    }
}

fn gap(out: &mut String, keyword: &str, time: Option<CueTime>) {
    if let Some(time) = time {
        line(out, 4, format_args!("{keyword} {time}"));
    }
}

fn remarks(out: &mut String, indent: usize, remarks: &[Remark]) {
    for remark in remarks {
        if remark.value.is_empty() {
            line(out, indent, format_args!("REM {}", remark.field));
        } else {
            line(
                out,
                indent,
                format_args!("REM {} {}", remark.field, quote_if_needed(&remark.value)),
            );
        }
    }
}

fn line(out: &mut String, indent: usize, content: std::fmt::Arguments<'_>) {
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{:indent$}{content}", "");
}

fn quote(value: &str) -> String {
    format!("\"{value}\"")
}

fn quote_if_needed(value: &str) -> String {
    let opens_quote = value.starts_with(['"', '\u{201C}', '\u{201E}', '\u{2018}', '\u{201A}', '\u{00AB}', '\u{00BB}']);
    if opens_quote || value.chars().any(char::is_whitespace) {
        quote(value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::models::{FileType, TrackFlag, TrackType};

    fn t(s: &str) -> CueTime {
        s.parse().unwrap()
    }

    #[test]
    fn writes_attributes_and_indices() {
        let mut sheet = Sheet::new();
        sheet.info.title = Some("Album".into());
        sheet.info.genre = Some("Rock".into());
        sheet.info.comment = Some("ExactAudioCopy v1.0".into());
        let file = sheet.add_file("a.wav", FileType::Wave).unwrap();
        let track = sheet.add_track(file, 1, TrackType::Audio).unwrap();
        {
            let track = sheet.track_mut(track).unwrap();
            track.title = Some("Intro".into());
            track.flags.insert(TrackFlag::Dcp);
            track.flags.insert(TrackFlag::PreEmphasis);
            track.pregap = Some(t("00:02:00"));
        }
        sheet.add_index(track, t("00:00:00"), None).unwrap();

        assert_eq!(
            CueWriter::write(&sheet),
            "REM GENRE Rock\n\
             REM COMMENT \"ExactAudioCopy v1.0\"\n\
             TITLE \"Album\"\n\
             FILE \"a.wav\" WAVE\n  \
             TRACK 01 AUDIO\n    \
             TITLE \"Intro\"\n    \
             FLAGS DCP PRE\n    \
             PREGAP 00:02:00\n    \
             INDEX 01 00:00:00\n"
        );
    }

    #[test]
    fn writes_split_tracks_across_file_lines() {
        let mut sheet = Sheet::new();
        let a = sheet.add_file("a.wav", FileType::Wave).unwrap();
        let b = sheet.add_file("b.wav", FileType::Wave).unwrap();
        let t1 = sheet.add_track(a, 1, TrackType::Audio).unwrap();
        sheet.add_index(t1, t("00:00:00"), None).unwrap();
        let t2 = sheet.add_track(a, 2, TrackType::Audio).unwrap();
        sheet.add_index(t2, t("04:30:12"), Some(0)).unwrap();
        sheet.promote_last_track(a).unwrap();
        sheet.add_index(t2, t("00:00:00"), None).unwrap();
        let t3 = sheet.add_track(b, 3, TrackType::Audio).unwrap();
        sheet.add_index(t3, t("03:00:00"), None).unwrap();

        assert_eq!(
            CueWriter::write(&sheet),
            "FILE \"a.wav\" WAVE\n  \
             TRACK 01 AUDIO\n    \
             INDEX 01 00:00:00\n  \
             TRACK 02 AUDIO\n    \
             INDEX 00 04:30:12\n\
             FILE \"b.wav\" WAVE\n    \
             INDEX 01 00:00:00\n  \
             TRACK 03 AUDIO\n    \
             INDEX 01 03:00:00\n"
        );
    }

    #[tokio::test]
    async fn saves_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.cue");
        let mut sheet = Sheet::new();
        sheet.info.performer = Some("Band".into());
        CueWriter::save(&sheet, &path).await.unwrap();
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "PERFORMER \"Band\"\n");
    }
}
