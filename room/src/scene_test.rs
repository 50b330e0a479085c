#![allow(clippy::float_cmp)]

use std::f64::consts::FRAC_PI_2;

use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn l_shape() -> Layout {
    Layout::from_walls(vec![WallSegment::new(0, 0, 100, 0), WallSegment::new(100, 0, 100, 100)])
}

// =============================================================
// build
// =============================================================

#[test]
fn empty_layout_builds_empty_scene() {
    let scene = build(&Layout::new());
    assert!(scene.is_empty());
    assert!(scene.floor.is_none());
    assert!(!scene.bounds.is_bounded());
}

#[test]
fn l_shape_is_centered_on_bounding_rectangle() {
    let scene = build(&l_shape());
    assert_eq!(scene.center, (50.0, 50.0));

    let w0 = &scene.walls[0];
    assert_eq!(w0.position, DVec3::new(0.0, 125.0, -50.0));
    assert!(approx(w0.rotation_y, 0.0));
    assert_eq!(w0.length, 100.0);

    let w1 = &scene.walls[1];
    assert_eq!(w1.position, DVec3::new(50.0, 125.0, 0.0));
    assert!(approx(w1.rotation_y, -FRAC_PI_2));
}

#[test]
fn floor_spans_bounding_rectangle() {
    let scene = build(&l_shape());
    let floor = scene.floor.unwrap();
    assert_eq!((floor.width, floor.depth), (100.0, 100.0));
    assert_eq!(floor.material.color, Color::from_u32(0xF0_F0F0));
    assert_eq!(scene.bounds, SceneBounds::centered(100.0, 100.0));
}

#[test]
fn wall_dimensions_and_material() {
    let scene = build(&l_shape());
    for (i, w) in scene.walls.iter().enumerate() {
        assert_eq!(w.id, WallId(i));
        assert_eq!(w.height, WALL_HEIGHT);
        assert_eq!(w.thickness, WALL_THICKNESS);
        assert_eq!(w.material, Material::wall());
        assert!(w.material.double_sided);
    }
}

#[test]
fn wall_length_matches_segment_hypot() {
    let layout = Layout::from_walls(vec![WallSegment::new(0, 0, 60, 80), WallSegment::new(-20, 40, 20, -40)]);
    for (w, seg) in build(&layout).walls.iter().zip(layout.walls()) {
        assert!(approx(w.length, f64::from(seg.x2 - seg.x1).hypot(f64::from(seg.y2 - seg.y1))));
    }
}

#[test]
fn wall_center_lies_at_segment_midpoint() {
    let layout = Layout::from_walls(vec![WallSegment::new(-40, 20, 80, 140)]);
    let scene = build(&layout);
    let w = &scene.walls[0];
    // Single diagonal wall: its midpoint is the bounding-box center.
    assert!(approx(w.position.x, 0.0));
    assert!(approx(w.position.z, 0.0));
}

#[test]
fn rotated_wall_end_lands_on_segment_end() {
    let layout = Layout::from_walls(vec![WallSegment::new(0, 0, 60, 80)]);
    let scene = build(&layout);
    let w = &scene.walls[0];
    let end = w.transform().transform_point3(DVec3::new(w.length / 2.0, 0.0, 0.0));
    assert!(approx(end.x, 30.0));
    assert!(approx(end.z, 40.0));
}

#[test]
fn build_is_deterministic() {
    let layout = l_shape();
    assert_eq!(build(&layout), build(&layout));
}

#[test]
fn zero_length_segment_builds_zero_length_wall() {
    let layout = Layout::from_walls(vec![WallSegment::new(0, 0, 100, 0), WallSegment::point(40, 0)]);
    let scene = build(&layout);
    assert_eq!(scene.walls.len(), 2);
    assert_eq!(scene.walls[1].length, 0.0);
}

#[test]
fn collinear_layout_has_zero_depth_floor() {
    let scene = build(&Layout::from_walls(vec![WallSegment::new(0, 0, 100, 0)]));
    let floor = scene.floor.unwrap();
    assert_eq!(floor.depth, 0.0);
    assert_eq!(scene.bounds.clamp(10.0, 30.0), (10.0, 0.0));
}

// =============================================================
// Bounds
// =============================================================

#[test]
fn bounds_clamp_is_component_wise() {
    let b = SceneBounds::centered(200.0, 100.0);
    assert_eq!(b.clamp(-150.0, -80.0), (-100.0, -50.0));
    assert_eq!(b.clamp(20.0, 10.0), (20.0, 10.0));
    assert_eq!(b.clamp(500.0, 0.0), (100.0, 0.0));
}

#[test]
fn unbounded_never_clamps() {
    let b = SceneBounds::unbounded();
    assert_eq!(b.clamp(1e9, -1e9), (1e9, -1e9));
}

// =============================================================
// Painting
// =============================================================

#[test]
fn paint_changes_only_target_wall() {
    let mut scene = build(&l_shape());
    let before = scene.walls[0].clone();
    let sky = Color::from_u32(0x87_CEEB);

    assert!(scene.paint_wall(WallId(1), sky));

    assert_eq!(scene.walls[0], before);
    assert_eq!(scene.walls[1].material.color, sky);
    assert_eq!(scene.walls[1].material_revision, 1);
    assert!(scene.walls[1].material.double_sided);
}

#[test]
fn paint_unknown_wall_is_rejected() {
    let mut scene = build(&l_shape());
    assert!(!scene.paint_wall(WallId(7), Color::WHITE));
}

#[test]
fn built_walls_carry_world_bounds() {
    let scene = build(&l_shape());
    // Wall 0 runs along X at z = -50; wall 1 runs along Z at x = 50.
    let b0 = scene.walls[0].world_bounds;
    assert!(approx(b0.min.x, -50.0) && approx(b0.max.x, 50.0));
    assert!(approx(b0.min.z, -55.0) && approx(b0.max.z, -45.0));
    assert!(approx(b0.min.y, 0.0) && approx(b0.max.y, WALL_HEIGHT));

    let b1 = scene.walls[1].world_bounds;
    assert!(approx(b1.min.x, 45.0) && approx(b1.max.x, 55.0));
    assert!(approx(b1.min.z, -50.0) && approx(b1.max.z, 50.0));
}

#[test]
fn refresh_bounds_recomputes_only_dirty_walls() {
    let mut scene = build(&l_shape());
    let expected = scene.walls[0].world_bounds;
    scene.paint_wall(WallId(0), Color::WHITE);
    scene.walls[0].world_bounds = Aabb::empty();
    scene.walls[1].world_bounds = Aabb::empty();
    assert!(scene.walls[0].bounds_dirty);

    assert_eq!(scene.refresh_bounds(), 1);

    assert_eq!(scene.walls[0].world_bounds, expected);
    assert!(scene.walls[1].world_bounds.is_empty());
    assert!(scene.walls.iter().all(|w| !w.bounds_dirty));
    assert_eq!(scene.refresh_bounds(), 0);
}
