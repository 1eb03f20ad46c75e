//! Mapping a playback time onto the keyframe chain

use crate::data::Keyframe;

/// Where a playback time falls in the keyframe chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelinePosition {
    /// Keyframe the time falls in
    pub index: usize,
    /// Keyframe being moved towards, `None` past the last one
    pub next_index: Option<usize>,
    /// Progress through `index`, in `[0, 1]`
    pub phase: f64,
}

impl TimelinePosition {
    /// Whether this position sits exactly on a keyframe's pose.
    pub fn is_at_keyframe(&self) -> bool {
        self.next_index.is_none() || self.phase == 0.0 || self.phase == 1.0
    }
}

fn position_in(
    keyframes: &[Keyframe],
    slot: usize,
    time: f64,
) -> TimelinePosition {
    let keyframe = &keyframes[slot];
    let phase = if keyframe.duration > 0.0 {
        ((time - keyframe.timestamp) / keyframe.duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    TimelinePosition {
        index: keyframe.index,
        next_index: keyframes.get(slot + 1).map(|k| k.index),
        phase,
    }
}

fn past_the_end(keyframes: &[Keyframe]) -> Option<TimelinePosition> {
    keyframes.last().map(|last| TimelinePosition {
        index: last.index,
        next_index: None,
        phase: 1.0,
    })
}

/// Find the keyframe a playback time falls in.
///
/// Times before the start pin to the first keyframe at phase 0; times past
/// the end pin to the last keyframe at phase 1.
pub fn locate(keyframes: &[Keyframe], time: f64) -> Option<TimelinePosition> {
    match keyframes {
        [] => None,
        [only] => Some(TimelinePosition {
            index: only.index,
            next_index: None,
            phase: 0.0,
        }),
        _ => {
            if time.is_nan() || time <= keyframes[0].timestamp {
                return Some(position_in(keyframes, 0, keyframes[0].timestamp));
            }
            keyframes
                .iter()
                .position(|k| time >= k.timestamp && time < k.end())
                .map(|slot| position_in(keyframes, slot, time))
                .or_else(|| past_the_end(keyframes))
        }
    }
}

/// A cached `locate` for a clock that mostly moves forward.
///
/// Each call resumes scanning from the keyframe found last time, so
/// playing through a drill touches each keyframe once. Moving the clock
/// backwards falls back to a full scan. Results always equal `locate`.
#[derive(Debug, Clone, Default)]
pub struct Playhead {
    slot: usize,
    last_time: Option<f64>,
}

impl Playhead {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the cached position, e.g. after the keyframes changed.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn seek(
        &mut self,
        keyframes: &[Keyframe],
        time: f64,
    ) -> Option<TimelinePosition> {
        let rewound = self.last_time.is_some_and(|last| time < last);
        if keyframes.len() < 2
            || rewound
            || self.slot >= keyframes.len()
            || time.is_nan()
            || time <= keyframes[0].timestamp
        {
            self.slot = 0;
            self.last_time = Some(time);
            let found = locate(keyframes, time);
            if let Some(found) = found {
                self.slot = found.index.min(keyframes.len().saturating_sub(1));
            }
            return found;
        }

        self.last_time = Some(time);
        let found = keyframes[self.slot..]
            .iter()
            .position(|k| time >= k.timestamp && time < k.end())
            .map(|offset| self.slot + offset);
        match found {
            Some(slot) => {
                self.slot = slot;
                Some(position_in(keyframes, slot, time))
            }
            None => {
                self.slot = keyframes.len() - 1;
                past_the_end(keyframes)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(durations: &[f64]) -> Vec<Keyframe> {
        let mut timestamp = 0.0;
        durations
            .iter()
            .enumerate()
            .map(|(index, &duration)| {
                let k = Keyframe {
                    index,
                    timestamp,
                    duration,
                    entities: Vec::new(),
                };
                timestamp += duration;
                k
            })
            .collect()
    }

    #[test]
    fn empty_and_single() {
        assert_eq!(locate(&[], 1.0), None);
        let one = chain(&[5.0]);
        assert_eq!(
            locate(&one, 3.0),
            Some(TimelinePosition {
                index: 0,
                next_index: None,
                phase: 0.0
            })
        );
    }

    #[test]
    fn finds_bracketing_pair() {
        let frames = chain(&[5.0, 5.0, 2.0]);
        let pos = locate(&frames, 7.5).unwrap();
        assert_eq!(pos.index, 1);
        assert_eq!(pos.next_index, Some(2));
        assert!((pos.phase - 0.5).abs() < 1e-12);

        let boundary = locate(&frames, 5.0).unwrap();
        assert_eq!(boundary.index, 1);
        assert_eq!(boundary.phase, 0.0);
    }

    #[test]
    fn last_keyframe_has_no_next() {
        let frames = chain(&[5.0, 5.0]);
        let pos = locate(&frames, 6.0).unwrap();
        assert_eq!(pos.index, 1);
        assert_eq!(pos.next_index, None);
        assert!(pos.is_at_keyframe());
    }

    #[test]
    fn past_end_clamps() {
        let frames = chain(&[5.0, 5.0]);
        let pos = locate(&frames, 42.0).unwrap();
        assert_eq!(
            pos,
            TimelinePosition {
                index: 1,
                next_index: None,
                phase: 1.0
            }
        );
    }

    #[test]
    fn negative_time_pins_to_start() {
        let frames = chain(&[5.0, 5.0]);
        let pos = locate(&frames, -3.0).unwrap();
        assert_eq!(pos.index, 0);
        assert_eq!(pos.next_index, Some(1));
        assert_eq!(pos.phase, 0.0);
    }

    #[test]
    fn locate_is_monotonic() {
        let frames = chain(&[1.0, 0.25, 3.0, 0.5, 2.0]);
        let mut last = 0;
        let mut t = -1.0;
        while t < 9.0 {
            let pos = locate(&frames, t).unwrap();
            assert!(pos.index >= last, "went back at t={t}");
            last = pos.index;
            t += 0.01;
        }
    }

    #[test]
    fn playhead_matches_locate() {
        let frames = chain(&[1.0, 0.25, 3.0, 0.5, 2.0]);
        let mut playhead = Playhead::new();
        let times = [0.0, 0.5, 1.1, 1.2, 4.0, 4.3, 5.0, 7.5, 9.0, 2.0, 0.1];
        for t in times {
            assert_eq!(playhead.seek(&frames, t), locate(&frames, t), "t={t}");
        }
    }
}
