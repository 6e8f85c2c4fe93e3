//! Active speaker selection with hysteresis.
//!
//! The selector keeps at most one target face. A target is picked when
//! somebody starts talking, follows its face across frames by IoU, survives
//! short detection dropouts for the cooldown window, and only hands over to
//! another face after that face has been the sole open mouth for several
//! consecutive frames.

use enhancer_landmark_model::face::FaceBox;
use tracing::debug;

use crate::features::FaceObservation;

/// Configuration for the active speaker selector.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerConfig {
    /// Seconds an unmatched target is kept before it is cleared.
    pub cooldown_secs: f64,

    /// Consecutive frames a challenger must hold before taking over.
    pub switch_after_frames: u32,

    /// Minimum IoU for two boxes to count as the same face.
    pub match_iou: f64,
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 2.0,
            switch_after_frames: 5,
            match_iou: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveTarget {
    face_box: FaceBox,
    last_seen_secs: f64,
}

#[derive(Debug, Clone, Copy)]
struct Challenger {
    face_box: FaceBox,
    streak: u32,
}

/// Chooses which face the zoom follows.
#[derive(Debug, Clone, Default)]
pub struct ActiveSpeakerSelector {
    config: SpeakerConfig,
    active: Option<ActiveTarget>,
    challenger: Option<Challenger>,
}

impl ActiveSpeakerSelector {
    pub fn new(config: SpeakerConfig) -> Self {
        Self {
            config,
            active: None,
            challenger: None,
        }
    }

    /// The current target, if any.
    pub fn active(&self) -> Option<FaceBox> {
        self.active.map(|a| a.face_box)
    }

    /// Frames the current challenger has held its claim.
    pub fn challenger_streak(&self) -> u32 {
        self.challenger.map(|c| c.streak).unwrap_or(0)
    }

    pub fn reset(&mut self) {
        self.active = None;
        self.challenger = None;
    }

    /// Advance one frame and return the target to zoom on.
    pub fn update(
        &mut self,
        faces: &[FaceObservation],
        talking: bool,
        now_secs: f64,
    ) -> Option<FaceBox> {
        let matched = self.track_active(faces, now_secs);

        if self.active.is_none() {
            self.challenger = None;
            if talking {
                let open: Vec<usize> = (0..faces.len())
                    .filter(|&i| faces[i].is_mouth_open())
                    .collect();
                let candidates: Vec<usize> = if open.is_empty() {
                    (0..faces.len()).collect()
                } else {
                    open
                };
                if let Some(idx) = Self::largest(faces, &candidates) {
                    debug!(face = ?faces[idx].face_box, "Active speaker selected");
                    self.active = Some(ActiveTarget {
                        face_box: faces[idx].face_box,
                        last_seen_secs: now_secs,
                    });
                }
            }
            return self.active();
        }

        self.update_challenger(faces, matched, now_secs);
        self.active()
    }

    /// Re-match the active target; clear it once the cooldown has lapsed.
    /// Returns the index of the matched face.
    fn track_active(&mut self, faces: &[FaceObservation], now_secs: f64) -> Option<usize> {
        let active = self.active.as_mut()?;

        let best = faces
            .iter()
            .enumerate()
            .map(|(i, f)| (i, active.face_box.iou(&f.face_box)))
            .filter(|(_, iou)| *iou >= self.config.match_iou)
            .max_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)));

        match best {
            Some((idx, _)) => {
                active.face_box = faces[idx].face_box;
                active.last_seen_secs = now_secs;
                Some(idx)
            }
            None => {
                if now_secs - active.last_seen_secs > self.config.cooldown_secs {
                    debug!(
                        unseen_secs = now_secs - active.last_seen_secs,
                        "Active speaker lost"
                    );
                    self.active = None;
                }
                None
            }
        }
    }

    fn update_challenger(&mut self, faces: &[FaceObservation], matched: Option<usize>, now_secs: f64) {
        let active_open = matched.map(|i| faces[i].is_mouth_open()).unwrap_or(false);
        let others: Vec<usize> = (0..faces.len())
            .filter(|&i| Some(i) != matched && faces[i].is_mouth_open())
            .collect();

        if active_open || others.is_empty() {
            self.challenger = None;
            return;
        }

        let continuing = self.challenger.and_then(|c| {
            others
                .iter()
                .copied()
                .map(|i| (i, c.face_box.iou(&faces[i].face_box)))
                .filter(|(_, iou)| *iou >= self.config.match_iou)
                .max_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)))
                .map(|(i, _)| (i, c.streak + 1))
        });

        let (idx, streak) = match continuing {
            Some(found) => found,
            None => match Self::largest(faces, &others) {
                Some(i) => (i, 1),
                None => return,
            },
        };

        if streak >= self.config.switch_after_frames {
            debug!(face = ?faces[idx].face_box, streak, "Active speaker switched");
            self.active = Some(ActiveTarget {
                face_box: faces[idx].face_box,
                last_seen_secs: now_secs,
            });
            self.challenger = None;
        } else {
            self.challenger = Some(Challenger {
                face_box: faces[idx].face_box,
                streak,
            });
        }
    }

    /// Largest box among `candidates`, lowest index on ties.
    fn largest(faces: &[FaceObservation], candidates: &[usize]) -> Option<usize> {
        candidates
            .iter()
            .copied()
            .max_by(|&a, &b| {
                faces[a]
                    .face_box
                    .area()
                    .cmp(&faces[b].face_box.area())
                    .then(b.cmp(&a))
            })
    }
}
