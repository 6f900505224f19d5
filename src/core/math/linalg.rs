use crate::error::{RenderError, Result};
use nalgebra::{Matrix4, SMatrix, SVector, Vector3, Vector4};

/// Embeds a 3D vector into homogeneous form by appending 1.
#[inline]
pub fn embed(v: &Vector3<f32>) -> Vector4<f32> {
    Vector4::new(v.x, v.y, v.z, 1.0)
}

/// Embeds a direction by appending 0, so translations leave it unchanged.
#[inline]
pub fn embed_direction(v: &Vector3<f32>) -> Vector4<f32> {
    Vector4::new(v.x, v.y, v.z, 0.0)
}

/// Drops the homogeneous component without dividing by it.
#[inline]
pub fn project(v: &Vector4<f32>) -> Vector3<f32> {
    v.xyz()
}

/// Divides by the homogeneous component, then drops it.
pub fn project_divided(v: &Vector4<f32>) -> Result<Vector3<f32>> {
    if v.w == 0.0 {
        return Err(RenderError::ZeroW);
    }
    Ok(v.xyz() / v.w)
}

/// Normalizes `v`, rejecting zero-length (and non-finite) input instead of
/// producing NaNs.
pub fn checked_normalize<const D: usize>(v: &SVector<f32, D>) -> Result<SVector<f32, D>> {
    let norm = v.norm();
    if norm == 0.0 || !norm.is_finite() {
        return Err(RenderError::ZeroVector);
    }
    Ok(*v / norm)
}

/// Inverts a square matrix with Gauss-Jordan elimination and partial pivoting.
///
/// The matrix is augmented with the identity and each column is cleared
/// above and below its pivot, leaving the inverse on the right-hand side.
/// A pivot is treated as zero when it falls below `N * f32::EPSILON` times
/// the largest entry of the matrix.
pub fn gauss_jordan_inverse<const N: usize>(m: &SMatrix<f32, N, N>) -> Result<SMatrix<f32, N, N>> {
    let scale = m.amax();
    if scale == 0.0 || !scale.is_finite() {
        return Err(RenderError::SingularMatrix);
    }
    let tolerance = scale * N as f32 * f32::EPSILON;

    let mut left = *m;
    let mut right = SMatrix::<f32, N, N>::identity();

    for col in 0..N {
        // Partial pivot
        let mut pivot_row = col;
        for row in (col + 1)..N {
            if left[(row, col)].abs() > left[(pivot_row, col)].abs() {
                pivot_row = row;
            }
        }
        if left[(pivot_row, col)].abs() <= tolerance {
            return Err(RenderError::SingularMatrix);
        }
        if pivot_row != col {
            left.swap_rows(col, pivot_row);
            right.swap_rows(col, pivot_row);
        }

        let pivot = left[(col, col)];
        for k in 0..N {
            left[(col, k)] /= pivot;
            right[(col, k)] /= pivot;
        }

        for row in 0..N {
            if row == col {
                continue;
            }
            let factor = left[(row, col)];
            if factor == 0.0 {
                continue;
            }
            for k in 0..N {
                left[(row, k)] -= factor * left[(col, k)];
                right[(row, k)] -= factor * right[(col, k)];
            }
        }
    }

    Ok(right)
}

/// Inverse-transpose, used to carry normals through a transform.
pub fn invert_transpose(m: &Matrix4<f32>) -> Result<Matrix4<f32>> {
    Ok(gauss_jordan_inverse(m)?.transpose())
}
