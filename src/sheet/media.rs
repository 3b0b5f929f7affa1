use crate::sheet::error::SheetResult;
use crate::sheet::models::TrackType;
use crate::sheet::{FileId, Sheet};
use crate::time::CueTime;
use chrono::TimeDelta;
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Properties of a media file as reported by a container reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInfo {
    pub duration: TimeDelta,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub bits_per_sample: Option<u16>,
    pub format: Option<String>,
}

impl MediaInfo {
    pub fn with_duration(duration: TimeDelta) -> Self {
        Self {
            duration,
            sample_rate: None,
            channels: None,
            bits_per_sample: None,
            format: None,
        }
    }
}

/// Reads container metadata for the files a sheet references.
///
/// `track_types` are the declared types of the tracks hosted by the file,
/// which lets a provider tell raw audio from data images.
pub trait MediaInfoProvider {
    fn media_info(&self, path: &Path, track_types: &[TrackType]) -> Option<MediaInfo>;
}

/// Provider backed by a fixed table, keyed by the resolved path.
impl MediaInfoProvider for HashMap<PathBuf, MediaInfo> {
    fn media_info(&self, path: &Path, _track_types: &[TrackType]) -> Option<MediaInfo> {
        self.get(path).cloned()
    }
}

impl Sheet {
    /// Asks `provider` for every file of the sheet, resolving relative paths
    /// against `base_dir`, and stores the reported durations. Returns how
    /// many files got one.
    pub fn apply_media_info(
        &mut self,
        base_dir: &Path,
        provider: &dyn MediaInfoProvider,
    ) -> SheetResult<usize> {
        let mut durations: Vec<(FileId, Option<CueTime>)> = Vec::new();
        for (id, file) in self.files() {
            let track_types: Vec<TrackType> = self
                .tracks_of(id)
                .filter_map(|track| self.tracks.get(track))
                .map(|track| track.track_type.clone())
                .collect();
            let path = base_dir.join(&file.path);
            let duration = provider
                .media_info(&path, &track_types)
                .map(|info| CueTime::from_duration(info.duration))
                .transpose()?;
            debug!("Media duration of {}: {:?}", path.display(), duration);
            durations.push((id, duration));
        }

        let mut found = 0;
        for (id, duration) in durations {
            if duration.is_some() {
                found += 1;
            }
            self.set_file_duration(id, duration)?;
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::error::SheetError;
    use crate::sheet::models::FileType;
    use crate::sheet::validation::Violation;

    #[test]
    fn durations_bound_index_times() {
        let mut sheet = Sheet::new();
        let file = sheet.add_file("a.wav", FileType::Wave).unwrap();
        let other = sheet.add_file("missing.wav", FileType::Wave).unwrap();
        let track = sheet.add_track(file, 1, TrackType::Audio).unwrap();

        let mut provider = HashMap::new();
        provider.insert(
            PathBuf::from("/music/a.wav"),
            MediaInfo::with_duration(TimeDelta::seconds(60)),
        );

        let found = sheet
            .apply_media_info(Path::new("/music"), &provider)
            .unwrap();
        assert_eq!(found, 1);
        assert_eq!(
            sheet.file(file).unwrap().duration(),
            Some("01:00:00".parse().unwrap())
        );
        assert_eq!(sheet.file(other).unwrap().duration(), None);

        assert!(matches!(
            sheet.add_index(track, "01:00:00".parse().unwrap(), None),
            Err(SheetError::IndexRejected(Violation::BeyondMediaEnd { .. }))
        ));
        assert!(sheet.add_index(track, "00:59:74".parse().unwrap(), None).is_ok());
    }
}
