//! Landmark feature extraction.
//!
//! Turns one frame's raw detections into the measurements the control loop
//! decides on: lip gap per face mesh, pixel-space face boxes tagged with the
//! mouth state that belongs to them, and a fist flag per hand.

use enhancer_common::config::FistPolicy;
use enhancer_landmark_model::detection::Detections;
use enhancer_landmark_model::face::FaceBox;
use enhancer_landmark_model::landmarks::{
    FaceMesh, HandLandmarks, Landmark, FINGERTIP_INDICES, FINGER_BASE_INDICES, LOWER_LIP_INDICES,
    UPPER_LIP_INDICES,
};

/// Configuration for the feature extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureConfig {
    /// Lip gap (normalized) above which a mouth counts as open.
    pub mouth_open_threshold: f64,

    /// How per-hand fist flags combine into one frame-level flag.
    pub fist_policy: FistPolicy,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            mouth_open_threshold: 0.015,
            fist_policy: FistPolicy::AnyHand,
        }
    }
}

/// Mouth measurement for one face mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouthSample {
    /// Absolute difference of mean upper and mean lower lip y.
    pub gap: f64,
    /// Whether `gap` exceeds the threshold.
    pub open: bool,
    /// Mouth centre in pixels.
    pub center: (f64, f64),
}

/// A face box with the mouth state of the mesh that maps onto it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceObservation {
    pub face_box: FaceBox,
    /// `None` when no face mesh lies inside the box.
    pub mouth_open: Option<bool>,
}

impl FaceObservation {
    pub fn is_mouth_open(&self) -> bool {
        self.mouth_open.unwrap_or(false)
    }
}

/// Everything extracted from one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameFeatures {
    /// One sample per face mesh that had every lip landmark.
    pub mouths: Vec<MouthSample>,
    /// One entry per face detection, in detector order.
    pub faces: Vec<FaceObservation>,
    /// Fist flag per hand, in detector order.
    pub hand_fists: Vec<bool>,
}

impl FrameFeatures {
    /// True when any measured mouth in the frame is open.
    pub fn any_mouth_open(&self) -> bool {
        self.mouths.iter().any(|m| m.open)
    }

    /// Whether hands were seen this frame.
    pub fn has_hands(&self) -> bool {
        !self.hand_fists.is_empty()
    }

    /// Frame-level fist flag, or `None` when no hand was seen.
    pub fn fist(&self, policy: FistPolicy) -> Option<bool> {
        match policy {
            FistPolicy::AnyHand if self.has_hands() => Some(self.hand_fists.iter().any(|f| *f)),
            FistPolicy::LastHand => self.hand_fists.last().copied(),
            _ => None,
        }
    }

    pub fn face_boxes(&self) -> Vec<FaceBox> {
        self.faces.iter().map(|f| f.face_box).collect()
    }
}

/// Mean lip separation of a mesh, or `None` if any lip landmark is missing.
pub fn mouth_gap(mesh: &FaceMesh) -> Option<f64> {
    let upper = mesh.mean_y(&UPPER_LIP_INDICES)?;
    let lower = mesh.mean_y(&LOWER_LIP_INDICES)?;
    Some((upper - lower).abs())
}

/// Strictly greater than: a gap equal to the threshold is closed.
pub fn is_mouth_open(gap: f64, threshold: f64) -> bool {
    gap > threshold
}

/// A hand is a fist when every fingertip sits at or below its base joint.
/// Missing joints mean "not a fist".
pub fn is_fist(hand: &HandLandmarks) -> bool {
    FINGERTIP_INDICES
        .iter()
        .zip(FINGER_BASE_INDICES.iter())
        .all(|(&tip, &base)| match (hand.joint(tip), hand.joint(base)) {
            (Some(tip), Some(base)) => tip.y >= base.y,
            _ => false,
        })
}

/// Stateless per-frame feature extractor.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Measure one mesh.
    pub fn mouth_sample(&self, mesh: &FaceMesh, width: u32, height: u32) -> Option<MouthSample> {
        let gap = mouth_gap(mesh)?;
        let lips: Vec<usize> = UPPER_LIP_INDICES
            .iter()
            .chain(LOWER_LIP_INDICES.iter())
            .copied()
            .collect();
        let Landmark { x, y } = mesh.centroid(&lips)?;
        Some(MouthSample {
            gap,
            open: is_mouth_open(gap, self.config.mouth_open_threshold),
            center: (x * width as f64, y * height as f64),
        })
    }

    /// Extract all features from one frame's detections.
    pub fn extract(&self, detections: &Detections, width: u32, height: u32) -> FrameFeatures {
        let mouths: Vec<MouthSample> = detections
            .face_meshes
            .iter()
            .filter_map(|mesh| self.mouth_sample(mesh, width, height))
            .collect();

        let faces = detections
            .faces
            .iter()
            .map(|det| {
                let face_box = FaceBox::from_normalized(&det.bbox, width, height);
                FaceObservation {
                    face_box,
                    mouth_open: Self::mouth_for_box(&face_box, &mouths),
                }
            })
            .collect();

        let hand_fists = detections.hands.iter().map(is_fist).collect();

        FrameFeatures {
            mouths,
            faces,
            hand_fists,
        }
    }

    /// Mouth state of the sample inside `face_box` closest to its centre.
    fn mouth_for_box(face_box: &FaceBox, mouths: &[MouthSample]) -> Option<bool> {
        let (cx, cy) = face_box.center();
        mouths
            .iter()
            .filter(|m| face_box.contains(m.center.0, m.center.1))
            .min_by(|a, b| {
                let da = (a.center.0 - cx).powi(2) + (a.center.1 - cy).powi(2);
                let db = (b.center.0 - cx).powi(2) + (b.center.1 - cy).powi(2);
                da.total_cmp(&db)
            })
            .map(|m| m.open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enhancer_landmark_model::face::{FaceDetection, NormalizedBox};

    fn hand_with_tips(tip_y: f64, base_y: f64) -> HandLandmarks {
        let mut joints = vec![Landmark::new(0.5, 0.5); 21];
        for (&tip, &base) in FINGERTIP_INDICES.iter().zip(FINGER_BASE_INDICES.iter()) {
            joints[tip] = Landmark::new(0.5, tip_y);
            joints[base] = Landmark::new(0.5, base_y);
        }
        HandLandmarks::new(joints)
    }

    #[test]
    fn test_mouth_open_is_strict() {
        assert!(!is_mouth_open(0.015, 0.015));
        assert!(is_mouth_open(0.0151, 0.015));
        assert!(!is_mouth_open(0.0, 0.015));
    }

    #[test]
    fn test_mouth_gap_exact_threshold_is_closed() {
        // Binary-exact values so the gap equals the threshold exactly.
        let mut mesh = FaceMesh::new(vec![Landmark::new(0.5, 0.25); 478]);
        for &idx in LOWER_LIP_INDICES.iter() {
            if !UPPER_LIP_INDICES.contains(&idx) {
                mesh.landmarks[idx].y = 0.25 + 0.5 * 26.0 / 14.0;
            }
        }
        let gap = mouth_gap(&mesh).unwrap();
        let extractor = FeatureExtractor::new(FeatureConfig {
            mouth_open_threshold: gap,
            ..FeatureConfig::default()
        });
        let sample = extractor.mouth_sample(&mesh, 640, 480).unwrap();
        assert!(!sample.open);
    }

    #[test]
    fn test_mesh_missing_lip_index_yields_no_sample() {
        let mesh = FaceMesh::new(vec![Landmark::new(0.5, 0.5); 100]);
        assert_eq!(mouth_gap(&mesh), None);

        let detections = Detections {
            face_meshes: vec![mesh],
            ..Detections::default()
        };
        let features = FeatureExtractor::default().extract(&detections, 640, 480);
        assert!(features.mouths.is_empty());
        assert!(!features.any_mouth_open());
    }

    #[test]
    fn test_fist_rule() {
        assert!(is_fist(&hand_with_tips(0.6, 0.5)));
        assert!(is_fist(&hand_with_tips(0.5, 0.5)));
        assert!(!is_fist(&hand_with_tips(0.4, 0.5)));

        let mut one_raised = hand_with_tips(0.6, 0.5);
        one_raised.joints[8].y = 0.45;
        assert!(!is_fist(&one_raised));

        let truncated = HandLandmarks::new(vec![Landmark::new(0.5, 0.5); 10]);
        assert!(!is_fist(&truncated));
    }

    #[test]
    fn test_fist_policies() {
        let features = FrameFeatures {
            hand_fists: vec![true, false],
            ..FrameFeatures::default()
        };
        assert_eq!(features.fist(FistPolicy::AnyHand), Some(true));
        assert_eq!(features.fist(FistPolicy::LastHand), Some(false));

        let no_hands = FrameFeatures::default();
        assert_eq!(no_hands.fist(FistPolicy::AnyHand), None);
        assert_eq!(no_hands.fist(FistPolicy::LastHand), None);
    }

    #[test]
    fn test_face_boxes_pick_up_mouth_state() {
        let detections = Detections {
            face_meshes: vec![
                FaceMesh::with_mouth(Landmark::new(0.25, 0.5), 0.05, 0.03),
                FaceMesh::with_mouth(Landmark::new(0.75, 0.5), 0.05, 0.0),
            ],
            faces: vec![
                FaceDetection::new(NormalizedBox::new(0.6, 0.3, 0.3, 0.4), 0.9),
                FaceDetection::new(NormalizedBox::new(0.1, 0.3, 0.3, 0.4), 0.9),
                FaceDetection::new(NormalizedBox::new(0.0, 0.9, 0.05, 0.05), 0.9),
            ],
            hands: vec![],
        };

        let features = FeatureExtractor::default().extract(&detections, 640, 480);
        assert_eq!(features.mouths.len(), 2);
        assert!(features.any_mouth_open());
        assert_eq!(features.faces[0].mouth_open, Some(false));
        assert_eq!(features.faces[1].mouth_open, Some(true));
        assert_eq!(features.faces[2].mouth_open, None);
        assert_eq!(features.faces[1].face_box, FaceBox::new(64, 144, 192, 192));
        assert!(!features.has_hands());
    }
}
