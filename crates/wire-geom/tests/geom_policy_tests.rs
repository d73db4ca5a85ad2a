// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Integration tests for wire-geom geometry policies.

use proptest::prelude::*;
use wire_geom::{
    point_on_segment, Aabb, Axis, FreeGeometry, GeometryPolicy, ManhattanGrid, Point2,
    RoutePreference,
};

#[test]
fn manhattan_snaps_to_nearest_grid_line() {
    let grid = ManhattanGrid::new(10.0, 1e-6);
    assert_eq!(grid.snap(Point2::new(14.0, 16.0)), Point2::new(10.0, 20.0));
    assert_eq!(grid.snap(Point2::new(-4.0, 5.0)), Point2::new(0.0, 10.0));
}

#[test]
fn manhattan_without_step_does_not_snap() {
    let grid = ManhattanGrid::new(0.0, 1e-6);
    let p = Point2::new(3.3, 7.7);
    assert_eq!(grid.snap(p), p);
}

#[test]
fn manhattan_route_prefers_requested_leg() {
    let grid = ManhattanGrid::default();
    let a = Point2::new(0.0, 0.0);
    let b = Point2::new(50.0, 30.0);
    assert_eq!(
        grid.route(a, b, RoutePreference::HorizontalFirst),
        vec![Point2::new(50.0, 0.0)]
    );
    assert_eq!(
        grid.route(a, b, RoutePreference::VerticalFirst),
        vec![Point2::new(0.0, 30.0)]
    );
}

#[test]
fn aligned_points_route_directly() {
    let grid = ManhattanGrid::default();
    let a = Point2::new(0.0, 0.0);
    assert!(grid
        .route(a, Point2::new(0.0, 80.0), RoutePreference::HorizontalFirst)
        .is_empty());
    assert!(grid.is_valid_segment(a, Point2::new(0.0, 80.0)));
    assert!(!grid.is_valid_segment(a, Point2::new(10.0, 80.0)));
}

#[test]
fn free_geometry_accepts_diagonals() {
    let free = FreeGeometry::default();
    let a = Point2::new(0.0, 0.0);
    let b = Point2::new(3.0, 4.0);
    assert!(free.is_valid_segment(a, b));
    assert!(free.route(a, b, RoutePreference::VerticalFirst).is_empty());
    assert!(!free.is_valid_segment(a, a));
}

proptest! {
    #[test]
    fn l_route_legs_are_axis_aligned(
        ax in -1000i32..1000, ay in -1000i32..1000,
        bx in -1000i32..1000, by in -1000i32..1000,
    ) {
        let grid = ManhattanGrid::default();
        let a = Point2::new(f64::from(ax), f64::from(ay));
        let b = Point2::new(f64::from(bx), f64::from(by));
        let mut path = vec![a];
        path.extend(grid.route(a, b, RoutePreference::HorizontalFirst));
        path.push(b);
        for pair in path.windows(2) {
            if !grid.same_point(pair[0], pair[1]) {
                prop_assert!(Axis::of(pair[0], pair[1], grid.epsilon()).is_some());
            }
        }
    }

    #[test]
    fn segment_midpoint_is_contained(
        ax in -1000i32..1000, ay in -1000i32..1000,
        bx in -1000i32..1000, by in -1000i32..1000,
    ) {
        let a = Point2::new(f64::from(ax), f64::from(ay));
        let b = Point2::new(f64::from(bx), f64::from(by));
        let mid = Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        prop_assert!(point_on_segment(mid, a, b, 1e-6));
        let bounds = Aabb::new(a, b);
        prop_assert!(bounds.contains(mid));
    }
}
