// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::types::point::Point2;

/// Returns `true` if `p` lies on the closed segment `a`–`b` within `tolerance`.
///
/// The bounding-box pre-check rejects most candidates before the
/// cross-product collinearity test runs. The collinearity test compares the
/// perpendicular distance (cross product over segment length) against the
/// tolerance so it behaves the same for short and long segments.
#[must_use]
pub fn point_on_segment(p: Point2, a: Point2, b: Point2, tolerance: f64) -> bool {
    if p.x < a.x.min(b.x) - tolerance
        || p.x > a.x.max(b.x) + tolerance
        || p.y < a.y.min(b.y) - tolerance
        || p.y > a.y.max(b.y) + tolerance
    {
        return false;
    }
    let ab = b.sub(a);
    let len = ab.length();
    if len <= tolerance {
        return p.approx_eq(a, tolerance);
    }
    (ab.cross(p.sub(a)) / len).abs() <= tolerance
}

/// Parameter `t` of the orthogonal projection of `p` onto the line through
/// `a` and `b`, where `a` maps to `0.0` and `b` to `1.0`.
///
/// Degenerate segments project everything to `0.0`.
#[must_use]
pub fn projection_parameter(p: Point2, a: Point2, b: Point2) -> f64 {
    let ab = b.sub(a);
    let len2 = ab.dot(ab);
    if len2 <= f64::EPSILON {
        return 0.0;
    }
    ab.dot(p.sub(a)) / len2
}
