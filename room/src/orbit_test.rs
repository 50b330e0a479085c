use super::*;

fn distance(cam: &PerspectiveCamera) -> f64 {
    (cam.pose.position - cam.pose.target).length()
}

#[test]
fn defaults() {
    let orbit = OrbitController::new();
    assert!(orbit.is_enabled());
    assert_eq!(orbit.min_distance, 500.0);
    assert_eq!(orbit.max_distance, 3000.0);
}

#[test]
fn drag_swings_camera_around_target_keeping_distance() {
    let mut orbit = OrbitController::new();
    let mut cam = PerspectiveCamera::default();
    let vp = Viewport::new(800.0, 600.0);
    let before = cam.pose.position;
    let r = distance(&cam);

    orbit.begin(Point::new(100.0, 100.0));
    assert!(orbit.drag(Point::new(160.0, 120.0), &mut cam, &vp));

    assert_ne!(cam.pose.position, before);
    assert!((distance(&cam) - r).abs() < 1e-6);
    assert_eq!(cam.pose.target, DVec3::new(0.0, 125.0, 0.0));
}

#[test]
fn drag_without_begin_does_nothing() {
    let mut orbit = OrbitController::new();
    let mut cam = PerspectiveCamera::default();
    assert!(!orbit.drag(Point::new(10.0, 10.0), &mut cam, &Viewport::default()));
    assert_eq!(cam, PerspectiveCamera::default());
}

#[test]
fn disabling_cancels_drag_and_blocks_begin() {
    let mut orbit = OrbitController::new();
    orbit.begin(Point::new(0.0, 0.0));
    orbit.set_enabled(false);
    assert!(!orbit.is_dragging());
    orbit.begin(Point::new(0.0, 0.0));
    assert!(!orbit.is_dragging());

    let mut cam = PerspectiveCamera::default();
    assert!(!orbit.zoom(&mut cam, 100.0));
}

#[test]
fn end_stops_drag() {
    let mut orbit = OrbitController::new();
    orbit.begin(Point::new(0.0, 0.0));
    orbit.end();
    assert!(!orbit.is_dragging());
}

#[test]
fn polar_angle_is_clamped_off_the_poles() {
    let orbit = OrbitController::new();
    let mut cam = PerspectiveCamera::default();
    orbit.rotate(&mut cam, 0.0, 10.0);
    let offset = cam.pose.position - cam.pose.target;
    assert!(offset.y < distance(&cam));
    assert!(offset.x.hypot(offset.z) > 0.0);
}

#[test]
fn zoom_is_clamped_to_limits() {
    let orbit = OrbitController::new();
    let mut cam = PerspectiveCamera::default();

    assert!(orbit.zoom(&mut cam, -100_000.0));
    assert!((distance(&cam) - 500.0).abs() < 1e-6);

    assert!(orbit.zoom(&mut cam, 100_000.0));
    assert!((distance(&cam) - 3000.0).abs() < 1e-6);

    assert!(!orbit.zoom(&mut cam, 100.0));
}
