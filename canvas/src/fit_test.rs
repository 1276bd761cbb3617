#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

const BOX: Footprint = Footprint { width: 200.0, height: 100.0 };

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Every node footprint, projected to screen, lies inside the viewport.
fn all_visible(cam: Camera, positions: &[Point], w: f64, h: f64) -> bool {
    positions.iter().all(|p| {
        let tl = cam.world_to_screen(*p);
        let br = cam.world_to_screen(Point::new(p.x + BOX.width, p.y + BOX.height));
        tl.x >= -EPSILON && tl.y >= -EPSILON && br.x <= w + EPSILON && br.y <= h + EPSILON
    })
}

#[test]
fn empty_set_is_identity() {
    let cam = fit_to_view(&[], 800.0, 600.0, 50.0, BOX);
    assert_eq!(cam, Camera::default());
}

#[test]
fn single_node_is_centered_at_native_scale() {
    let cam = fit_to_view(&[Point::new(100.0, 100.0)], 800.0, 600.0, 50.0, BOX);
    assert_eq!(cam.zoom, 1.0);
    let center = cam.world_to_screen(Point::new(200.0, 150.0));
    assert!(approx_eq(center.x, 400.0));
    assert!(approx_eq(center.y, 300.0));
}

#[test]
fn never_zooms_in_past_one() {
    let positions = [Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
    let cam = fit_to_view(&positions, 5000.0, 5000.0, 0.0, BOX);
    assert_eq!(cam.zoom, 1.0);
}

#[test]
fn wide_content_is_limited_by_width() {
    let positions = [Point::new(0.0, 0.0), Point::new(1900.0, 0.0)];
    // content: 2200 wide, 200 tall
    let cam = fit_to_view(&positions, 1100.0, 800.0, 50.0, BOX);
    assert!(approx_eq(cam.zoom, 0.5));
    assert!(all_visible(cam, &positions, 1100.0, 800.0));
}

#[test]
fn tall_content_is_limited_by_height() {
    let positions = [Point::new(0.0, -1000.0), Point::new(0.0, 900.0)];
    let cam = fit_to_view(&positions, 1000.0, 500.0, 0.0, BOX);
    assert!(approx_eq(cam.zoom, 0.25));
    assert!(all_visible(cam, &positions, 1000.0, 500.0));
}

#[test]
fn scattered_nodes_are_all_visible() {
    let positions = [
        Point::new(-3000.0, 250.0),
        Point::new(120.0, -870.0),
        Point::new(4100.0, 3300.0),
        Point::new(17.0, 17.0),
    ];
    let cam = fit_to_view(&positions, 1280.0, 720.0, 50.0, BOX);
    assert!(cam.zoom > 0.0 && cam.zoom <= 1.0);
    assert!(all_visible(cam, &positions, 1280.0, 720.0));
}

#[test]
fn zero_area_content_does_not_divide_by_zero() {
    let none = Footprint { width: 0.0, height: 0.0 };
    let cam = fit_to_view(&[Point::new(5.0, 5.0)], 800.0, 600.0, 0.0, none);
    assert!(cam.zoom.is_finite());
    assert_eq!(cam.zoom, 1.0);
    assert!(cam.pan_x.is_finite() && cam.pan_y.is_finite());
}

#[test]
fn zero_viewport_still_gives_positive_zoom() {
    let cam = fit_to_view(&[Point::new(0.0, 0.0)], 0.0, 0.0, 50.0, BOX);
    assert!(cam.zoom > 0.0);
}
