use crate::sheet::{IndexId, Sheet};
use crate::time::CueTime;
use thiserror::Error;

/// A broken invariant found by [`Sheet::check_consistency`].
///
/// The mutation API never produces these; they show up in sheets that were
/// loaded from defective documents.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsistencyIssue {
    #[error("Track {number} follows track {previous}")]
    TrackNumberDecreases { number: u8, previous: u8 },

    #[error("Track {0} has no indices")]
    EmptyTrack(u8),

    #[error("File {0} holds neither tracks nor indices")]
    EmptyFile(String),

    #[error("Track {track}: INDEX {number:02} at {time} does not come after {previous}")]
    IndexTimeOrder {
        track: u8,
        number: u8,
        time: CueTime,
        previous: CueTime,
    },

    #[error("Track {track}: INDEX {number:02} does not follow INDEX {previous:02}")]
    IndexNumberOrder { track: u8, number: u8, previous: u8 },

    #[error("Track {0} has INDEX 00 as its only index")]
    LoneZeroIndex(u8),

    #[error("Track {0} has indices in a file that does not directly precede its own")]
    SplitNotAdjacent(u8),

    #[error("Track {track}: INDEX {number:02} at {time} lies past the end of the media at {end}")]
    BeyondMediaEnd {
        track: u8,
        number: u8,
        time: CueTime,
        end: CueTime,
    },
}

impl Sheet {
    /// Checks the whole sheet against the invariants the mutation API keeps
    /// and returns every violation found, in traversal order.
    pub fn check_consistency(&self) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();

        for (id, file) in self.files() {
            if self.tracks_of(id).next().is_none() && self.indices_in_file(id).next().is_none() {
                issues.push(ConsistencyIssue::EmptyFile(file.path.clone()));
            }
        }

        let mut previous_number: Option<u8> = None;
        for id in self.all_tracks() {
            let Some(track) = self.tracks.get(id) else {
                continue;
            };
            if let Some(previous) = previous_number {
                if track.number < previous {
                    issues.push(ConsistencyIssue::TrackNumberDecreases {
                        number: track.number,
                        previous,
                    });
                }
            }
            previous_number = Some(track.number);

            let indices: Vec<_> = self
                .indices_of(id)
                .filter_map(|index| self.indices.get(index))
                .collect();
            match indices.as_slice() {
                [] => issues.push(ConsistencyIssue::EmptyTrack(track.number)),
                [only] if only.number == 0 && !self.is_split(id) => {
                    issues.push(ConsistencyIssue::LoneZeroIndex(track.number))
                }
                _ => {}
            }

            let previous_file = self.previous_file(track.file);
            if indices
                .iter()
                .any(|index| index.file != track.file && Some(index.file) != previous_file)
            {
                issues.push(ConsistencyIssue::SplitNotAdjacent(track.number));
            }
        }

        let mut previous: Option<IndexId> = None;
        for id in self.all_indices() {
            let Some(index) = self.indices.get(id) else {
                continue;
            };
            let track_number = self
                .tracks
                .get(index.track)
                .map(|track| track.number)
                .unwrap_or_default();

            if let Some(before) = previous.and_then(|before| self.indices.get(before)) {
                if before.file == index.file && index.time <= before.time {
                    issues.push(ConsistencyIssue::IndexTimeOrder {
                        track: track_number,
                        number: index.number,
                        time: index.time,
                        previous: before.time,
                    });
                }
                if before.track == index.track && index.number <= before.number {
                    issues.push(ConsistencyIssue::IndexNumberOrder {
                        track: track_number,
                        number: index.number,
                        previous: before.number,
                    });
                }
            }

            if let Some(end) = self.files.get(index.file).and_then(|file| file.duration) {
                if index.time >= end {
                    issues.push(ConsistencyIssue::BeyondMediaEnd {
                        track: track_number,
                        number: index.number,
                        time: index.time,
                        end,
                    });
                }
            }
            previous = Some(id);
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::models::{FileType, TrackType};
    use crate::sheet::validation::ValidationProfile;

    fn t(s: &str) -> CueTime {
        s.parse().unwrap()
    }

    #[test]
    fn sheets_built_through_the_api_are_consistent() {
        let mut sheet = Sheet::new();
        let a = sheet.add_file("a.wav", FileType::Wave).unwrap();
        let b = sheet.add_file("b.wav", FileType::Wave).unwrap();
        let t1 = sheet.add_track(a, 1, TrackType::Audio).unwrap();
        sheet.add_index(t1, t("00:00:00"), None).unwrap();
        let t2 = sheet.add_track(a, 2, TrackType::Audio).unwrap();
        sheet.add_index(t2, t("03:00:00"), Some(0)).unwrap();
        sheet.promote_last_track(a).unwrap();
        sheet.add_index(t2, t("00:00:00"), None).unwrap();
        let t3 = sheet.add_track(b, 3, TrackType::Audio).unwrap();
        sheet.add_index(t3, t("04:00:00"), None).unwrap();

        assert_eq!(sheet.check_consistency(), vec![]);
    }

    #[test]
    fn reports_structural_gaps() {
        let mut sheet = Sheet::new();
        let a = sheet.add_file("a.wav", FileType::Wave).unwrap();
        sheet.add_file("b.wav", FileType::Wave).unwrap();
        let track = sheet.add_track(a, 1, TrackType::Audio).unwrap();

        assert_eq!(
            sheet.check_consistency(),
            vec![
                ConsistencyIssue::EmptyFile("b.wav".into()),
                ConsistencyIssue::EmptyTrack(1),
            ]
        );

        sheet.add_index(track, t("00:00:00"), Some(0)).unwrap();
        assert_eq!(
            sheet.check_consistency(),
            vec![
                ConsistencyIssue::EmptyFile("b.wav".into()),
                ConsistencyIssue::LoneZeroIndex(1),
            ]
        );
    }

    #[test]
    fn reports_tolerated_parsing_defects() {
        let mut sheet = Sheet::new();
        let a = sheet.add_file("a.wav", FileType::Wave).unwrap();
        let t1 = sheet.add_track(a, 1, TrackType::Audio).unwrap();
        sheet.add_index(t1, t("00:00:00"), None).unwrap();
        let t2 = sheet.add_track(a, 2, TrackType::Audio).unwrap();
        sheet
            .add_index_with(t2, t("00:00:00"), None, ValidationProfile::Parsing)
            .unwrap();
        sheet.set_file_duration(a, Some(t("00:00:00"))).unwrap();

        let issues = sheet.check_consistency();
        assert!(issues.contains(&ConsistencyIssue::IndexTimeOrder {
            track: 2,
            number: 1,
            time: t("00:00:00"),
            previous: t("00:00:00"),
        }));
        assert_eq!(
            issues
                .iter()
                .filter(|issue| matches!(issue, ConsistencyIssue::BeyondMediaEnd { .. }))
                .count(),
            2
        );
    }
}
