//! Fit-to-view: choose a zoom and pan that frame a set of nodes.

#[cfg(test)]
#[path = "fit_test.rs"]
mod fit_test;

use crate::camera::{Camera, Point};

/// Canvas-space size of one node's visual footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub width: f64,
    pub height: f64,
}

/// Compute the camera that shows every node position inside the viewport.
///
/// The bounding box of `positions` is grown by `padding` on every side and by
/// the footprint on the right/bottom (positions are top-left corners). Zoom is
/// `min(viewport / content, 1.0)` per axis, so the view only ever zooms out,
/// and pan centers the scaled box. An empty set yields the identity camera.
#[must_use]
pub fn fit_to_view(positions: &[Point], viewport_w: f64, viewport_h: f64, padding: f64, footprint: Footprint) -> Camera {
    let Some(first) = positions.first() else {
        return Camera::default();
    };

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &positions[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let min_x = min_x - padding;
    let min_y = min_y - padding;
    let max_x = max_x + footprint.width + padding;
    let max_y = max_y + footprint.height + padding;

    let content_w = (max_x - min_x).max(1.0);
    let content_h = (max_y - min_y).max(1.0);
    let viewport_w = viewport_w.max(1.0);
    let viewport_h = viewport_h.max(1.0);

    let zoom = (viewport_w / content_w).min(viewport_h / content_h).min(1.0);

    Camera {
        pan_x: (viewport_w - content_w * zoom) / 2.0 - min_x * zoom,
        pan_y: (viewport_h - content_h * zoom) / 2.0 - min_y * zoom,
        zoom,
    }
}
