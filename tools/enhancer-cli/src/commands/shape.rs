//! Exercise the rotatable shape viewer without a window.

use enhancer_processing_core::shape::RotatableShape;

pub fn run(deltas: &[f64]) -> anyhow::Result<()> {
    let mut shape = RotatableShape::default();
    for dx in deltas {
        shape.drag_by(*dx);
    }

    let center = shape.center();
    println!("Shape:");
    println!("  Center: ({:.1}, {:.1})", center.x, center.y);
    println!("  Angle: {:.1} degrees", shape.angle_degrees());
    for (i, corner) in shape.corners().iter().enumerate() {
        println!("  Corner {}: ({:.1}, {:.1})", i + 1, corner.x, corner.y);
    }
    let end = shape.indicator_end();
    println!("  Indicator: ({:.1}, {:.1})", end.x, end.y);
    Ok(())
}
