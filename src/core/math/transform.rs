use crate::core::math::linalg::{checked_normalize, gauss_jordan_inverse};
use crate::error::{RenderError, Result};
use crate::scene::camera::Camera;
use nalgebra::{Matrix4, Vector3};

//=================================
// Transform Matrix Factory
//=================================

/// Factory for the three matrices of the transform stack.
/// Written out by hand so the conventions (eye on +Z at distance
/// `|eye - center|`, depth mapped to `[0, depth]`) stay explicit.
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    /// Creates a look-at View matrix (Right-Handed).
    ///
    /// The scene is translated so that `center` lands on the origin and then
    /// rotated into the camera basis; the eye ends up on +Z.
    pub fn view(eye: &Vector3<f32>, center: &Vector3<f32>, up: &Vector3<f32>) -> Result<Matrix4<f32>> {
        let z_axis = checked_normalize(&(eye - center))?;
        let x_axis = checked_normalize(&up.cross(&z_axis))?;
        let y_axis = z_axis.cross(&x_axis);

        let rotation = Matrix4::new(
            x_axis.x, x_axis.y, x_axis.z, 0.0,
            y_axis.x, y_axis.y, y_axis.z, 0.0,
            z_axis.x, z_axis.y, z_axis.z, 0.0,
            0.0,      0.0,      0.0,      1.0,
        );
        let translation = Matrix4::new(
            1.0, 0.0, 0.0, -center.x,
            0.0, 1.0, 0.0, -center.y,
            0.0, 0.0, 1.0, -center.z,
            0.0, 0.0, 0.0, 1.0,
        );

        Ok(rotation * translation)
    }

    /// Creates the projection matrix: identity except for `coeff` at row 3,
    /// column 2. `coeff = -1/distance` gives perspective, `0` orthographic.
    pub fn projection(coeff: f32) -> Matrix4<f32> {
        Matrix4::new(
            1.0, 0.0, 0.0,   0.0,
            0.0, 1.0, 0.0,   0.0,
            0.0, 0.0, 1.0,   0.0,
            0.0, 0.0, coeff, 1.0,
        )
    }

    /// Creates the Viewport matrix mapping NDC `[-1, 1]` onto the pixel
    /// rectangle `(x, y, w, h)` and depth onto `[0, depth]`.
    pub fn viewport(x: f32, y: f32, w: f32, h: f32, depth: f32) -> Matrix4<f32> {
        Matrix4::new(
            w / 2.0, 0.0,     0.0,         x + w / 2.0,
            0.0,     h / 2.0, 0.0,         y + h / 2.0,
            0.0,     0.0,     depth / 2.0, depth / 2.0,
            0.0,     0.0,     0.0,         1.0,
        )
    }
}

/// Projection coefficient for a perspective camera looking from `eye` at
/// `center`.
pub fn perspective_coeff(eye: &Vector3<f32>, center: &Vector3<f32>) -> Result<f32> {
    let distance = (eye - center).norm();
    if distance == 0.0 {
        return Err(RenderError::ZeroVector);
    }
    Ok(-1.0 / distance)
}

/// Pixel rectangle plus depth range targeted by a render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32, depth: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            depth,
        }
    }
}

//=================================
// Transform Stack
//=================================

/// View, projection and viewport matrices for one render pass.
///
/// Vertex stages only ever see `&TransformStack`, so a stack cannot change
/// while a pass is drawing with it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformStack {
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    viewport: Matrix4<f32>,
    // viewport * projection * view
    combined: Matrix4<f32>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self {
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            viewport: Matrix4::identity(),
            combined: Matrix4::identity(),
        }
    }

    /// Builds a fully configured stack for one pass.
    pub fn configure(camera: &Camera, projection_coeff: f32, viewport: &Viewport) -> Result<Self> {
        let mut stack = Self::new();
        stack.set_view(&camera.eye, &camera.center, &camera.up)?;
        stack.set_projection(projection_coeff);
        stack.set_viewport(
            viewport.x,
            viewport.y,
            viewport.width,
            viewport.height,
            viewport.depth,
        );
        Ok(stack)
    }

    pub fn set_view(
        &mut self,
        eye: &Vector3<f32>,
        center: &Vector3<f32>,
        up: &Vector3<f32>,
    ) -> Result<()> {
        self.view = TransformFactory::view(eye, center, up)?;
        self.update_combined();
        Ok(())
    }

    pub fn set_projection(&mut self, coeff: f32) {
        self.projection = TransformFactory::projection(coeff);
        self.update_combined();
    }

    pub fn set_viewport(&mut self, x: f32, y: f32, w: f32, h: f32, depth: f32) {
        self.viewport = TransformFactory::viewport(x, y, w, h, depth);
        self.update_combined();
    }

    fn update_combined(&mut self) {
        self.combined = self.viewport * self.projection * self.view;
    }

    pub fn view(&self) -> &Matrix4<f32> {
        &self.view
    }

    pub fn projection(&self) -> &Matrix4<f32> {
        &self.projection
    }

    /// The view matrix without its translation: the camera basis rotation
    /// about the look-at center.
    pub fn view_rotation(&self) -> Matrix4<f32> {
        let mut rotation = self.view;
        rotation.fixed_view_mut::<3, 1>(0, 3).fill(0.0);
        rotation
    }

    /// `viewport * projection * view`, object space to clip space.
    pub fn combined(&self) -> &Matrix4<f32> {
        &self.combined
    }

    /// Inverse of [`Self::combined`], screen space back to object space.
    pub fn combined_inverse(&self) -> Result<Matrix4<f32>> {
        gauss_jordan_inverse(&self.combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::linalg::{embed, project_divided};

    fn to_screen(stack: &TransformStack, point: &Vector3<f32>) -> Vector3<f32> {
        project_divided(&(stack.combined() * embed(point))).unwrap()
    }

    fn eye_stack() -> TransformStack {
        let camera = Camera::new(
            Vector3::new(1.0, 1.0, 3.0),
            Vector3::zeros(),
            Vector3::new(0.0, 1.0, 0.0),
        );
        let coeff = perspective_coeff(&camera.eye, &camera.center).unwrap();
        TransformStack::configure(&camera, coeff, &Viewport::new(100.0, 100.0, 600.0, 600.0, 255.0))
            .unwrap()
    }

    #[test]
    fn view_maps_eye_onto_positive_z_axis() {
        let eye = Vector3::new(0.0, 0.0, 3.0);
        let view = TransformFactory::view(&eye, &Vector3::zeros(), &Vector3::y()).unwrap();
        let mapped = view * embed(&eye);
        assert!((mapped.x).abs() < 1e-6);
        assert!((mapped.y).abs() < 1e-6);
        assert!((mapped.z - 3.0).abs() < 1e-6);
    }

    #[test]
    fn up_parallel_to_view_direction_is_rejected() {
        let mut stack = TransformStack::new();
        let result = stack.set_view(&Vector3::new(0.0, 5.0, 0.0), &Vector3::zeros(), &Vector3::y());
        assert!(matches!(result, Err(RenderError::ZeroVector)));
        // A failed setter leaves the previous configuration untouched.
        assert_eq!(stack, TransformStack::new());
    }

    #[test]
    fn viewport_maps_ndc_corners_to_pixels() {
        let m = TransformFactory::viewport(100.0, 50.0, 600.0, 400.0, 255.0);
        let low = m * Vector3::new(-1.0, -1.0, -1.0).push(1.0);
        let high = m * Vector3::new(1.0, 1.0, 1.0).push(1.0);
        assert_eq!(low.xyz(), Vector3::new(100.0, 50.0, 0.0));
        assert_eq!(high.xyz(), Vector3::new(700.0, 450.0, 255.0));
    }

    #[test]
    fn orthographic_projection_keeps_w_at_one() {
        let m = TransformFactory::projection(0.0);
        let p = m * Vector3::new(0.3, -0.2, 0.9).push(1.0);
        assert_eq!(p.w, 1.0);
    }

    #[test]
    fn combined_is_viewport_projection_view() {
        let stack = eye_stack();
        let viewport = TransformFactory::viewport(100.0, 100.0, 600.0, 600.0, 255.0);
        let expected = viewport * stack.projection() * stack.view();
        assert_eq!(*stack.combined(), expected);
    }

    #[test]
    fn view_rotation_ignores_the_center() {
        let mut shifted = TransformStack::new();
        shifted
            .set_view(&Vector3::new(3.0, 1.0, 3.0), &Vector3::new(2.0, 0.0, 0.0), &Vector3::y())
            .unwrap();
        let rotation = shifted.view_rotation();
        assert_eq!(rotation.column(3), Matrix4::<f32>::identity().column(3));
        assert_eq!(rotation.fixed_view::<3, 3>(0, 0), shifted.view().fixed_view::<3, 3>(0, 0));
        assert_eq!(rotation, eye_stack().view_rotation());
    }

    #[test]
    fn combined_round_trips_through_its_inverse() {
        let stack = eye_stack();
        let inverse = stack.combined_inverse().unwrap();
        for point in [
            Vector3::new(0.25, -0.5, 0.1),
            Vector3::new(-0.7, 0.3, -0.4),
            Vector3::new(0.0, 0.0, 0.0),
        ] {
            let screen = stack.combined() * embed(&point);
            let back = project_divided(&(inverse * screen)).unwrap();
            assert!((back - point).norm() < 1e-4, "{back:?} != {point:?}");
        }
    }

    #[test]
    fn nearer_points_get_larger_screen_depth() {
        let stack = eye_stack();
        let near = to_screen(&stack, &Vector3::new(0.1, 0.1, 0.3));
        let far = to_screen(&stack, &Vector3::new(0.1, 0.1, -0.3));
        assert!(near.z > far.z);
    }
}
