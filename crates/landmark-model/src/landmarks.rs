//! Face-mesh and hand landmark sets as reported by the detection engine.
//!
//! All coordinates are normalized to `[0.0, 1.0]` relative to the frame.
//! Indices follow the MediaPipe face mesh (478 points with iris refinement)
//! and hand (21 joints) topologies.

use serde::{Deserialize, Serialize};

/// Number of points in a refined face mesh.
pub const FACE_MESH_POINT_COUNT: usize = 478;

/// Number of joints in a hand landmark set.
pub const HAND_JOINT_COUNT: usize = 21;

/// Face mesh indices tracing the upper lip.
pub const UPPER_LIP_INDICES: [usize; 26] = [
    61, 185, 40, 39, 37, 0, 267, 269, 270, 409, 291, 308, 415, 310, 311, 312, 13, 82, 81, 80, 191,
    78, 95, 88, 178, 87,
];

/// Face mesh indices tracing the lower lip.
pub const LOWER_LIP_INDICES: [usize; 26] = [
    61, 146, 91, 181, 84, 17, 314, 405, 321, 375, 291, 308, 324, 318, 402, 317, 14, 87, 178, 88, 95,
    78, 191, 80, 81, 82,
];

/// Hand joint indices of the five fingertips (thumb first).
pub const FINGERTIP_INDICES: [usize; 5] = [4, 8, 12, 16, 20];

/// Hand joint indices the fingertips are compared against.
pub const FINGER_BASE_INDICES: [usize; 5] = [2, 6, 10, 14, 18];

/// Bones of the hand skeleton as joint index pairs.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (13, 17),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

/// A single normalized landmark. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Landmark {
    /// Horizontal position (0 = left edge).
    pub x: f64,
    /// Vertical position (0 = top edge, grows downward).
    pub y: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Position in pixel space for a frame of the given size.
    pub fn to_pixel(&self, width: u32, height: u32) -> (i32, i32) {
        ((self.x * width as f64) as i32, (self.y * height as f64) as i32)
    }
}

impl From<(f64, f64)> for Landmark {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Landmark> for (f64, f64) {
    fn from(l: Landmark) -> Self {
        (l.x, l.y)
    }
}

/// Landmarks for one detected face.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceMesh {
    pub landmarks: Vec<Landmark>,
}

impl FaceMesh {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Landmark at `index`, if the mesh has one.
    pub fn point(&self, index: usize) -> Option<Landmark> {
        self.landmarks.get(index).copied()
    }

    /// Mean y over `indices`. `None` when the set is empty or any index is missing.
    pub fn mean_y(&self, indices: &[usize]) -> Option<f64> {
        if indices.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        for &idx in indices {
            sum += self.point(idx)?.y;
        }
        Some(sum / indices.len() as f64)
    }

    /// Mean position over `indices`, with the same missing-index rule as [`mean_y`](Self::mean_y).
    pub fn centroid(&self, indices: &[usize]) -> Option<Landmark> {
        if indices.is_empty() {
            return None;
        }
        let (mut sx, mut sy) = (0.0, 0.0);
        for &idx in indices {
            let p = self.point(idx)?;
            sx += p.x;
            sy += p.y;
        }
        let n = indices.len() as f64;
        Some(Landmark::new(sx / n, sy / n))
    }

    /// A full mesh with every point at `center` except the lips, which are
    /// spread across `width` and separated so the mean lip gap equals `opening`.
    pub fn with_mouth(center: Landmark, width: f64, opening: f64) -> Self {
        let mut landmarks = vec![center; FACE_MESH_POINT_COUNT];
        let lower_only: Vec<usize> = LOWER_LIP_INDICES
            .iter()
            .copied()
            .filter(|i| !UPPER_LIP_INDICES.contains(i))
            .collect();
        let upper_only: Vec<usize> = UPPER_LIP_INDICES
            .iter()
            .copied()
            .filter(|i| !LOWER_LIP_INDICES.contains(i))
            .collect();

        // Shared corner points stay on the center line, so the exclusive
        // points carry the whole separation.
        let offset = opening / 2.0 * LOWER_LIP_INDICES.len() as f64 / lower_only.len() as f64;
        let spread = |k: usize, n: usize| center.x - width / 2.0 + width * k as f64 / (n.max(2) - 1) as f64;

        for (k, &idx) in upper_only.iter().enumerate() {
            landmarks[idx] = Landmark::new(spread(k, upper_only.len()), center.y - offset);
        }
        for (k, &idx) in lower_only.iter().enumerate() {
            landmarks[idx] = Landmark::new(spread(k, lower_only.len()), center.y + offset);
        }

        Self { landmarks }
    }
}

/// Joint landmarks for one detected hand.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandLandmarks {
    pub joints: Vec<Landmark>,
}

impl HandLandmarks {
    pub fn new(joints: Vec<Landmark>) -> Self {
        Self { joints }
    }

    /// Joint at `index`, if present.
    pub fn joint(&self, index: usize) -> Option<Landmark> {
        self.joints.get(index).copied()
    }

    /// An upright hand with the wrist at `wrist` and fingers `size` tall.
    /// A curled hand folds every fingertip back below its base joint.
    pub fn posed(wrist: Landmark, size: f64, curled: bool) -> Self {
        let mut joints = Vec::with_capacity(HAND_JOINT_COUNT);
        joints.push(wrist);
        for finger in 0..5 {
            let x = wrist.x + (finger as f64 - 2.0) * size * 0.2;
            for segment in 1..=4 {
                let rise = match (curled, segment) {
                    (true, 3) => 0.4,
                    (true, 4) => 0.25,
                    _ => 0.25 * segment as f64,
                };
                joints.push(Landmark::new(x, wrist.y - size * rise));
            }
        }
        Self { joints }
    }
}
