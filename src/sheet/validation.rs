//! Decides whether an index may take a given (time, number) at a position,
//! looking only at its immediate neighbours in sheet order.
//!
//! Times are offsets inside one physical file, so they are only compared
//! with neighbours living in the same file. Numbers are scoped to a track,
//! so they are only compared with neighbours of the same track.

use crate::cd::MAX_INDEX_NUMBER;
use crate::time::CueTime;
use thiserror::Error;

/// How strict the engine is.
///
/// `Parsing` is not "validation off": ordering violations are still fatal,
/// only a few well known real-world defects are let through and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationProfile {
    #[default]
    Strict,
    /// Tolerates an index sharing its time with a neighbour, a number that
    /// does not continue the track when the index is the first one of a
    /// new file, and indices past the known end of the media.
    Parsing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub time: CueTime,
    pub number: u8,
    pub same_track: bool,
    pub same_file: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Neighbors {
    pub before: Option<Neighbor>,
    pub after: Option<Neighbor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub time: CueTime,
    pub number: u8,
    /// Known length of the file the index points into.
    pub media_end: Option<CueTime>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    #[error("index number {0} is larger than 99")]
    NumberTooLarge(u8),

    #[error("time {0} is negative")]
    NegativeTime(CueTime),

    #[error("time {time} lies before the preceding index at {before}")]
    TimeBeforePrevious { time: CueTime, before: CueTime },

    #[error("time {0} is the same as the preceding index")]
    SameTimeAsPrevious(CueTime),

    #[error("time {time} lies after the following index at {after}")]
    TimeAfterNext { time: CueTime, after: CueTime },

    #[error("time {0} is the same as the following index")]
    SameTimeAsNext(CueTime),

    #[error("number {number} does not follow the preceding index number {before}")]
    NumberNotAfterPrevious { number: u8, before: u8 },

    #[error("number {number} does not precede the following index number {after}")]
    NumberNotBeforeNext { number: u8, after: u8 },

    #[error("time {time} lies past the end of the media at {end}")]
    BeyondMediaEnd { time: CueTime, end: CueTime },
}

/// Checks `candidate` against its neighbours.
///
/// Returns the violations the profile tolerated (always empty for
/// `Strict`), or the first violation it did not.
pub fn check_index(
    candidate: &Candidate,
    neighbors: &Neighbors,
    profile: ValidationProfile,
) -> Result<Vec<Violation>, Violation> {
    let lenient = profile == ValidationProfile::Parsing;
    let mut tolerated = Vec::new();
    let mut tolerate = |violation: Violation, allowed: bool| {
        if allowed {
            tolerated.push(violation);
            Ok(())
        } else {
            Err(violation)
        }
    };

    if candidate.number > MAX_INDEX_NUMBER {
        return Err(Violation::NumberTooLarge(candidate.number));
    }
    if candidate.time.is_negative() {
        return Err(Violation::NegativeTime(candidate.time));
    }

    let first_in_file = neighbors.before.is_none_or(|before| !before.same_file);

    if let Some(before) = neighbors.before {
        if before.same_file {
            if candidate.time < before.time {
                return Err(Violation::TimeBeforePrevious {
                    time: candidate.time,
                    before: before.time,
                });
            }
            if candidate.time == before.time {
                tolerate(Violation::SameTimeAsPrevious(candidate.time), lenient)?;
            }
        }
        if before.same_track && candidate.number <= before.number {
            tolerate(
                Violation::NumberNotAfterPrevious {
                    number: candidate.number,
                    before: before.number,
                },
                lenient && first_in_file,
            )?;
        }
    }

    if let Some(after) = neighbors.after {
        if after.same_file {
            if candidate.time > after.time {
                return Err(Violation::TimeAfterNext {
                    time: candidate.time,
                    after: after.time,
                });
            }
            if candidate.time == after.time {
                tolerate(Violation::SameTimeAsNext(candidate.time), lenient)?;
            }
        }
        if after.same_track && candidate.number >= after.number {
            tolerate(
                Violation::NumberNotBeforeNext {
                    number: candidate.number,
                    after: after.number,
                },
                lenient && !after.same_file,
            )?;
        }
    }

    if let Some(end) = candidate.media_end {
        if candidate.time >= end {
            tolerate(
                Violation::BeyondMediaEnd {
                    time: candidate.time,
                    end,
                },
                lenient,
            )?;
        }
    }

    Ok(tolerated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> CueTime {
        s.parse().unwrap()
    }

    fn candidate(time: &str, number: u8) -> Candidate {
        Candidate {
            time: t(time),
            number,
            media_end: None,
        }
    }

    fn neighbor(time: &str, number: u8, same_track: bool, same_file: bool) -> Neighbor {
        Neighbor {
            time: t(time),
            number,
            same_track,
            same_file,
        }
    }

    fn before(n: Neighbor) -> Neighbors {
        Neighbors {
            before: Some(n),
            after: None,
        }
    }

    #[test]
    fn accepts_without_neighbors() {
        assert_eq!(
            check_index(
                &candidate("00:00:00", 1),
                &Neighbors::default(),
                ValidationProfile::Strict
            ),
            Ok(vec![])
        );
    }

    #[test]
    fn time_must_increase_within_a_file() {
        let neighbors = before(neighbor("00:10:00", 1, true, true));
        assert_eq!(
            check_index(
                &candidate("00:05:00", 2),
                &neighbors,
                ValidationProfile::Strict
            ),
            Err(Violation::TimeBeforePrevious {
                time: t("00:05:00"),
                before: t("00:10:00")
            })
        );
        // Ordering stays fatal while parsing.
        assert!(
            check_index(
                &candidate("00:05:00", 2),
                &neighbors,
                ValidationProfile::Parsing
            )
            .is_err()
        );
    }

    #[test]
    fn time_is_not_compared_across_files() {
        let neighbors = before(neighbor("04:30:00", 0, true, false));
        assert_eq!(
            check_index(
                &candidate("00:00:00", 1),
                &neighbors,
                ValidationProfile::Strict
            ),
            Ok(vec![])
        );
    }

    #[test]
    fn duplicate_time_is_only_tolerated_while_parsing() {
        let neighbors = before(neighbor("00:10:00", 1, false, true));
        assert_eq!(
            check_index(
                &candidate("00:10:00", 1),
                &neighbors,
                ValidationProfile::Strict
            ),
            Err(Violation::SameTimeAsPrevious(t("00:10:00")))
        );
        assert_eq!(
            check_index(
                &candidate("00:10:00", 1),
                &neighbors,
                ValidationProfile::Parsing
            ),
            Ok(vec![Violation::SameTimeAsPrevious(t("00:10:00"))])
        );
    }

    #[test]
    fn numbers_are_only_compared_within_a_track() {
        let other_track = before(neighbor("00:10:00", 5, false, true));
        assert!(
            check_index(
                &candidate("00:20:00", 1),
                &other_track,
                ValidationProfile::Strict
            )
            .is_ok()
        );

        let same_track = before(neighbor("00:10:00", 5, true, true));
        assert_eq!(
            check_index(
                &candidate("00:20:00", 5),
                &same_track,
                ValidationProfile::Strict
            ),
            Err(Violation::NumberNotAfterPrevious {
                number: 5,
                before: 5
            })
        );
    }

    #[test]
    fn number_rule_is_relaxed_for_the_first_index_of_a_file_while_parsing() {
        let carried = before(neighbor("04:30:00", 1, true, false));
        assert_eq!(
            check_index(
                &candidate("00:00:00", 0),
                &carried,
                ValidationProfile::Parsing
            ),
            Ok(vec![Violation::NumberNotAfterPrevious {
                number: 0,
                before: 1
            }])
        );
        assert!(
            check_index(
                &candidate("00:00:00", 0),
                &carried,
                ValidationProfile::Strict
            )
            .is_err()
        );

        // Not the first index of its file: no leniency.
        let same_file = before(neighbor("00:10:00", 3, true, true));
        assert!(
            check_index(
                &candidate("00:20:00", 2),
                &same_file,
                ValidationProfile::Parsing
            )
            .is_err()
        );
    }

    #[test]
    fn following_neighbor_bounds_time_and_number() {
        let neighbors = Neighbors {
            before: Some(neighbor("00:10:00", 1, true, true)),
            after: Some(neighbor("00:20:00", 3, true, true)),
        };
        assert!(
            check_index(
                &candidate("00:15:00", 2),
                &neighbors,
                ValidationProfile::Strict
            )
            .is_ok()
        );
        assert_eq!(
            check_index(
                &candidate("00:25:00", 2),
                &neighbors,
                ValidationProfile::Strict
            ),
            Err(Violation::TimeAfterNext {
                time: t("00:25:00"),
                after: t("00:20:00")
            })
        );
        assert_eq!(
            check_index(
                &candidate("00:15:00", 3),
                &neighbors,
                ValidationProfile::Strict
            ),
            Err(Violation::NumberNotBeforeNext {
                number: 3,
                after: 3
            })
        );
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            check_index(
                &candidate("00:00:00", 100),
                &Neighbors::default(),
                ValidationProfile::Parsing
            ),
            Err(Violation::NumberTooLarge(100))
        );
        assert_eq!(
            check_index(
                &candidate("-00:00:01", 1),
                &Neighbors::default(),
                ValidationProfile::Parsing
            ),
            Err(Violation::NegativeTime(t("-00:00:01")))
        );
    }

    #[test]
    fn media_end_bounds_the_time() {
        let candidate = Candidate {
            time: t("05:00:00"),
            number: 1,
            media_end: Some(t("04:00:00")),
        };
        assert!(matches!(
            check_index(&candidate, &Neighbors::default(), ValidationProfile::Strict),
            Err(Violation::BeyondMediaEnd { .. })
        ));
        assert_eq!(
            check_index(&candidate, &Neighbors::default(), ValidationProfile::Parsing)
                .unwrap()
                .len(),
            1
        );
    }
}
