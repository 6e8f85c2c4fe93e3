//! Landmark annotation drawn onto outgoing frames.
//!
//! Drawing is output only. Nothing here feeds back into the tracking state.

use enhancer_landmark_model::detection::Detections;
use enhancer_landmark_model::face::FaceBox;
use enhancer_landmark_model::landmarks::{HAND_CONNECTIONS, LOWER_LIP_INDICES, UPPER_LIP_INDICES};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

const LIP_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const FACE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const ACTIVE_FACE_COLOR: Rgb<u8> = Rgb([255, 200, 0]);
const BONE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const JOINT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Rectangle outline thickness in pixels.
const FACE_THICKNESS: i32 = 2;

/// Draw lip points, face rectangles, and hand skeletons.
///
/// `active` is outlined in a distinct colour when it is one of `faces`.
pub fn annotate(
    image: &mut RgbImage,
    detections: &Detections,
    faces: &[FaceBox],
    active: Option<&FaceBox>,
) {
    let (width, height) = image.dimensions();

    for mesh in &detections.face_meshes {
        for &idx in UPPER_LIP_INDICES.iter().chain(LOWER_LIP_INDICES.iter()) {
            if let Some(point) = mesh.point(idx) {
                draw_filled_circle_mut(image, point.to_pixel(width, height), 1, LIP_COLOR);
            }
        }
    }

    for face in faces {
        let color = if Some(face) == active {
            ACTIVE_FACE_COLOR
        } else {
            FACE_COLOR
        };
        draw_face_box(image, face, color);
    }

    for hand in &detections.hands {
        for &(a, b) in HAND_CONNECTIONS.iter() {
            if let (Some(from), Some(to)) = (hand.joint(a), hand.joint(b)) {
                let (x0, y0) = from.to_pixel(width, height);
                let (x1, y1) = to.to_pixel(width, height);
                draw_line_segment_mut(
                    image,
                    (x0 as f32, y0 as f32),
                    (x1 as f32, y1 as f32),
                    BONE_COLOR,
                );
            }
        }
        for joint in &hand.joints {
            draw_filled_circle_mut(image, joint.to_pixel(width, height), 2, JOINT_COLOR);
        }
    }
}

fn draw_face_box(image: &mut RgbImage, face: &FaceBox, color: Rgb<u8>) {
    let (iw, ih) = (image.width() as i64, image.height() as i64);
    for inset in 0..FACE_THICKNESS as i64 {
        let x0 = face.x as i64 + inset;
        let y0 = face.y as i64 + inset;
        let x1 = face.x as i64 + face.width as i64 - inset;
        let y1 = face.y as i64 + face.height as i64 - inset;
        if x1 <= x0 || y1 <= y0 {
            break;
        }
        if x1 <= 0 || y1 <= 0 || x0 >= iw || y0 >= ih {
            continue;
        }
        // Edges past the image stay one pixel outside it.
        let (x0, y0) = (x0.max(-1), y0.max(-1));
        let (x1, y1) = (x1.min(iw + 1), y1.min(ih + 1));
        let rect = Rect::at(x0 as i32, y0 as i32).of_size((x1 - x0) as u32, (y1 - y0) as u32);
        draw_hollow_rect_mut(image, rect, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enhancer_landmark_model::landmarks::{FaceMesh, HandLandmarks, Landmark};

    #[test]
    fn test_face_box_outline() {
        let mut image = RgbImage::new(40, 40);
        let face = FaceBox::new(5, 5, 20, 20);
        annotate(&mut image, &Detections::default(), &[face], None);

        assert_eq!(image.get_pixel(5, 5), &FACE_COLOR);
        assert_eq!(image.get_pixel(6, 10), &FACE_COLOR);
        assert_eq!(image.get_pixel(15, 15), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_active_face_highlighted() {
        let mut image = RgbImage::new(40, 40);
        let face = FaceBox::new(5, 5, 20, 20);
        annotate(&mut image, &Detections::default(), &[face], Some(&face));
        assert_eq!(image.get_pixel(5, 5), &ACTIVE_FACE_COLOR);
    }

    #[test]
    fn test_degenerate_and_offscreen_shapes_do_not_panic() {
        let mut image = RgbImage::new(20, 20);
        let detections = Detections {
            face_meshes: vec![FaceMesh::with_mouth(Landmark::new(1.5, -0.2), 0.1, 0.02)],
            faces: vec![],
            hands: vec![HandLandmarks::posed(Landmark::new(0.9, 1.1), 0.5, false)],
        };
        let faces = [FaceBox::new(18, 18, 10, 10), FaceBox::new(3, 3, 0, 5)];
        annotate(&mut image, &detections, &faces, None);
    }

    #[test]
    fn test_extreme_face_boxes_are_clipped() {
        let mut image = RgbImage::new(20, 20);
        let faces = [
            FaceBox::new(i32::MAX - 3, i32::MIN, i32::MAX, i32::MAX),
            FaceBox::new(-1_000_000, -1_000_000, 1_000_010, 2_000_000),
        ];
        annotate(&mut image, &Detections::default(), &faces, None);
        // Right edge of the second box lands at x = 9.
        assert_eq!(image.get_pixel(9, 5), &FACE_COLOR);
        assert_eq!(image.get_pixel(5, 5), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_lip_points_drawn() {
        let mut image = RgbImage::new(100, 100);
        let detections = Detections {
            face_meshes: vec![FaceMesh::with_mouth(Landmark::new(0.5, 0.5), 0.2, 0.04)],
            ..Detections::default()
        };
        annotate(&mut image, &detections, &[], None);
        assert!(image.pixels().any(|p| *p == LIP_COLOR));
    }
}
