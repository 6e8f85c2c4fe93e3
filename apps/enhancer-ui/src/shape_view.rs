use eframe::egui::{self, Color32, Pos2, Sense, Stroke};
use enhancer_landmark_model::viewport::Point2D;
use enhancer_processing_core::shape::{RotatableShape, CANVAS_SIZE};

/// Draw the rotatable square and feed pointer drags into it.
pub fn show(ui: &mut egui::Ui, shape: &mut RotatableShape) {
    let size = CANVAS_SIZE as f32;
    let (response, painter) = ui.allocate_painter(egui::vec2(size, size), Sense::drag());
    let origin = response.rect.min;

    if let Some(pos) = response.interact_pointer_pos() {
        let x = f64::from(pos.x - origin.x);
        if response.drag_started() {
            shape.press(x);
        } else if response.dragged() {
            shape.drag(x);
        }
    }
    if !response.dragged() && !response.drag_started() {
        shape.release();
    }

    let to_screen = |p: Point2D| Pos2::new(origin.x + p.x as f32, origin.y + p.y as f32);

    painter.rect_filled(response.rect, 4.0, Color32::from_gray(24));
    let corners: Vec<Pos2> = shape.corners().iter().map(|c| to_screen(*c)).collect();
    painter.add(egui::Shape::convex_polygon(
        corners,
        Color32::from_rgb(40, 90, 160),
        Stroke::new(2.0, Color32::from_rgb(120, 170, 230)),
    ));

    let center = to_screen(shape.center());
    painter.line_segment(
        [center, to_screen(shape.indicator_end())],
        Stroke::new(2.0, Color32::from_rgb(255, 165, 0)),
    );
    painter.circle_filled(center, 4.0, Color32::WHITE);
    painter.text(
        response.rect.left_bottom() + egui::vec2(6.0, -6.0),
        egui::Align2::LEFT_BOTTOM,
        format!("{:.1}°", shape.angle_degrees()),
        egui::FontId::monospace(12.0),
        Color32::LIGHT_GRAY,
    );
}
