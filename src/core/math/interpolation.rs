use nalgebra::{Point2, Vector3, Vector4};

/// Triangles whose doubled screen area does not exceed this are degenerate.
pub const DEGENERATE_AREA: f32 = 1e-2;

/// Largest quantized depth value.
pub const MAX_DEPTH: u8 = u8::MAX;

/// Returned for degenerate triangles. The negative weight makes every pixel
/// fail the inside test.
#[inline]
pub fn outside() -> Vector3<f32> {
    Vector3::new(-1.0, 1.0, 1.0)
}

/// Calculates the barycentric coordinates of `p` with respect to triangle
/// (a, b, c).
///
/// The weights come from the cross product of the x- and y-edge vectors
/// `(c - a, b - a, a - p)`; its z component is the doubled signed area.
/// Degenerate triangles yield [`outside`].
///
/// # Returns
/// A Vector3 where:
/// - x: weight for a
/// - y: weight for b
/// - z: weight for c
pub fn barycentric(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>, p: Point2<f32>) -> Vector3<f32> {
    let xs = Vector3::new(c.x - a.x, b.x - a.x, a.x - p.x);
    let ys = Vector3::new(c.y - a.y, b.y - a.y, a.y - p.y);
    let u = xs.cross(&ys);

    if u.z.abs() <= DEGENERATE_AREA {
        return outside();
    }
    Vector3::new(1.0 - (u.x + u.y) / u.z, u.y / u.z, u.x / u.z)
}

/// Returns true if no weight is negative.
#[inline(always)]
pub fn is_inside_triangle(bary: &Vector3<f32>) -> bool {
    bary.x >= 0.0 && bary.y >= 0.0 && bary.z >= 0.0
}

/// Rounds a screen-space depth to the nearest depth unit, clamped to
/// `[0, MAX_DEPTH]`. NaN maps to 0.
#[inline]
pub fn quantize_depth(depth: f32) -> u8 {
    (depth + 0.5).floor().clamp(0.0, MAX_DEPTH as f32) as u8
}

/// Depth of a fragment: clip-space z and w are each interpolated with the
/// screen-space weights, then divided.
pub fn fragment_depth(clip: &[Vector4<f32>; 3], bary: &Vector3<f32>) -> u8 {
    let mut z = 0.0;
    let mut w = 0.0;
    for i in 0..3 {
        z += bary[i] * clip[i].z;
        w += bary[i] * clip[i].w;
    }
    quantize_depth(z / w)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> [Point2<f32>; 3] {
        [
            Point2::new(10.0, 10.0),
            Point2::new(90.0, 20.0),
            Point2::new(40.0, 80.0),
        ]
    }

    fn assert_weights(actual: Vector3<f32>, expected: Vector3<f32>) {
        assert!(
            (actual - expected).norm() < 1e-5,
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn corners_get_unit_weights() {
        let [a, b, c] = triangle();
        assert_weights(barycentric(a, b, c, a), Vector3::new(1.0, 0.0, 0.0));
        assert_weights(barycentric(a, b, c, b), Vector3::new(0.0, 1.0, 0.0));
        assert_weights(barycentric(a, b, c, c), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn corners_are_exact_for_either_winding() {
        let [a, b, c] = triangle();
        assert_weights(barycentric(a, c, b, c), Vector3::new(0.0, 1.0, 0.0));
        assert_weights(barycentric(a, c, b, b), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn interior_weights_are_positive_and_sum_to_one() {
        let [a, b, c] = triangle();
        let centroid = Point2::from((a.coords + b.coords + c.coords) / 3.0);
        for p in [centroid, Point2::new(40.0, 30.0), Point2::new(50.0, 50.0)] {
            let bary = barycentric(a, b, c, p);
            assert!(bary.iter().all(|w| *w > 0.0), "{bary:?} at {p:?}");
            assert!((bary.sum() - 1.0).abs() < 1e-5);
        }
        assert_weights(
            barycentric(a, b, c, centroid),
            Vector3::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0),
        );
    }

    #[test]
    fn exterior_point_has_negative_weight() {
        let [a, b, c] = triangle();
        let bary = barycentric(a, b, c, Point2::new(0.0, 0.0));
        assert!(!is_inside_triangle(&bary));
    }

    #[test]
    fn degenerate_triangle_returns_sentinel() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(5.0, 5.0);
        let c = Point2::new(10.0, 10.0);
        let bary = barycentric(a, b, c, Point2::new(5.0, 5.0));
        assert_eq!(bary, outside());
        assert!(!is_inside_triangle(&bary));
    }

    #[test]
    fn quantization_rounds_and_clamps() {
        assert_eq!(quantize_depth(-12.0), 0);
        assert_eq!(quantize_depth(0.49), 0);
        assert_eq!(quantize_depth(0.5), 1);
        assert_eq!(quantize_depth(127.4), 127);
        assert_eq!(quantize_depth(300.0), 255);
        assert_eq!(quantize_depth(f32::NAN), 0);
    }

    #[test]
    fn quantization_is_idempotent_and_monotonic() {
        let mut previous = 0u8;
        let mut depth = -10.0f32;
        while depth < 270.0 {
            let q = quantize_depth(depth);
            assert_eq!(quantize_depth(q as f32), q);
            assert!(q >= previous, "{depth} quantized to {q} after {previous}");
            previous = q;
            depth += 0.37;
        }
    }

    #[test]
    fn fragment_depth_divides_interpolated_z_by_interpolated_w() {
        let clip = [
            Vector4::new(0.0, 0.0, 100.0, 1.0),
            Vector4::new(0.0, 0.0, 200.0, 2.0),
            Vector4::new(0.0, 0.0, 90.0, 0.5),
        ];
        // z = 100, w = 1 at the first corner.
        assert_eq!(fragment_depth(&clip, &Vector3::new(1.0, 0.0, 0.0)), 100);
        // z = 150, w = 1.5 halfway between the first two.
        assert_eq!(fragment_depth(&clip, &Vector3::new(0.5, 0.5, 0.0)), 100);
        // z = 95, w = 0.75 between the first and third.
        assert_eq!(fragment_depth(&clip, &Vector3::new(0.5, 0.0, 0.5)), 127);
    }
}
