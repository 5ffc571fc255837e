//! Affine transform primitives.
//!
//! Matrices follow glam's column-vector convention: `compose(a, b)` applies
//! `b` first, then `a`.
//!
//! The `armspace_*` functions lift one component of a child's local transform
//! into armature space, given the parent's decomposed armature-space bind
//! matrix.

use glam::{Mat3, Mat4, Quat, Vec3};

use crate::errors::{Result, RigError};
use crate::math::transform::Trs;

/// Largest tolerated cosine between two normalized basis vectors.
pub const SHEAR_TOLERANCE: f32 = 1e-4;

const SCALE_EPSILON: f32 = 1e-8;

// ============================================================================
// Composition & decomposition
// ============================================================================

#[inline]
#[must_use]
pub fn compose(a: &Mat4, b: &Mat4) -> Mat4 {
    *a * *b
}

/// Largest absolute cosine between any two basis vectors of the upper 3x3.
///
/// Zero for any TRS matrix; grows with shear.
#[must_use]
pub fn basis_skew(mat: &Mat4) -> f32 {
    let x = mat.x_axis.truncate().normalize_or_zero();
    let y = mat.y_axis.truncate().normalize_or_zero();
    let z = mat.z_axis.truncate().normalize_or_zero();

    x.dot(y).abs().max(x.dot(z).abs()).max(y.dot(z).abs())
}

#[inline]
#[must_use]
pub fn is_sheared(mat: &Mat4) -> bool {
    basis_skew(mat) > SHEAR_TOLERANCE
}

/// Splits a matrix into translation, rotation and scale.
///
/// Sheared input degrades: the basis is Gram-Schmidt orthonormalized (x axis
/// kept, y made orthogonal to it) and the shear is dropped.
#[must_use]
pub fn decompose(mat: &Mat4) -> Trs {
    if is_sheared(mat) {
        return decompose_orthonormalized(mat);
    }

    let (scale, rotation, translation) = mat.to_scale_rotation_translation();
    Trs {
        translation,
        rotation: rotation.normalize(),
        scale,
    }
}

/// Strict variant of [`decompose`]: sheared input is an error.
pub fn try_decompose(mat: &Mat4) -> Result<Trs> {
    let skew = basis_skew(mat);
    if skew > SHEAR_TOLERANCE {
        return Err(RigError::ShearedTransform { skew });
    }
    Ok(decompose(mat))
}

fn decompose_orthonormalized(mat: &Mat4) -> Trs {
    let translation = mat.w_axis.truncate();
    let x = mat.x_axis.truncate();
    let y = mat.y_axis.truncate();
    let z = mat.z_axis.truncate();

    let mut scale = Vec3::new(x.length(), y.length(), z.length());
    if mat.determinant() < 0.0 {
        scale.x = -scale.x;
    }

    let bx = (x * scale.x.signum()).normalize_or_zero();
    let by = (y - bx * bx.dot(y)).normalize_or_zero();
    if bx == Vec3::ZERO || by == Vec3::ZERO {
        return Trs::new(translation, Quat::IDENTITY, scale);
    }
    let bz = bx.cross(by);

    let rotation = Quat::from_mat3(&Mat3::from_cols(bx, by, bz)).normalize();
    Trs {
        translation,
        rotation,
        scale,
    }
}

// ============================================================================
// Closed-form inverses
// ============================================================================

#[inline]
#[must_use]
pub fn invert_translation(translation: Vec3) -> Vec3 {
    -translation
}

/// Inverse of a rotation: the conjugate of the normalized quaternion.
#[inline]
#[must_use]
pub fn invert_rotation(rotation: Quat) -> Quat {
    rotation.normalize().conjugate()
}

/// Component-wise reciprocal. Degenerate (near-zero) axes map to 1 so a
/// collapsed bind scale leaves the pose scale untouched.
#[must_use]
pub fn invert_scale(scale: Vec3) -> Vec3 {
    let recip = |s: f32| if s.abs() < SCALE_EPSILON { 1.0 } else { 1.0 / s };
    Vec3::new(recip(scale.x), recip(scale.y), recip(scale.z))
}

#[inline]
#[must_use]
pub fn scale_to_matrix(scale: Vec3) -> Mat4 {
    Mat4::from_scale(scale)
}

// ============================================================================
// Armature-space composition
// ============================================================================

/// Child local translation expressed in armature space.
///
/// The parent's scale and rotation are applied to the local offset, which is
/// then added to the parent's translation.
#[inline]
#[must_use]
pub fn armspace_translation(local: Vec3, parent: &Trs) -> Vec3 {
    parent.translation + parent.rotation * (parent.scale * local)
}

/// Child local rotation expressed in armature space (parent, then child).
#[inline]
#[must_use]
pub fn armspace_rotation(local: Quat, parent: &Trs) -> Quat {
    (parent.rotation * local).normalize()
}

/// Child local scale expressed in armature space.
#[inline]
#[must_use]
pub fn armspace_scale(local: Vec3, parent: &Trs) -> Vec3 {
    parent.scale * local
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_round_trip() {
        let trs = Trs::new(
            Vec3::new(1.0, -2.0, 3.0),
            Quat::from_rotation_z(0.7),
            Vec3::new(2.0, 2.0, 0.5),
        );
        let back = decompose(&trs.to_matrix());
        assert!(back.abs_diff_eq(&trs, 1e-5));
    }

    #[test]
    fn test_sheared_matrix_is_rejected() {
        let mut mat = Mat4::IDENTITY;
        mat.y_axis.x = 0.5;
        assert!(is_sheared(&mat));
        assert!(matches!(
            try_decompose(&mat),
            Err(RigError::ShearedTransform { .. })
        ));

        // The lenient path still yields a usable rotation.
        let trs = decompose(&mat);
        assert!((trs.rotation.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_invert_scale_guards_zero() {
        let inv = invert_scale(Vec3::new(2.0, 0.0, -4.0));
        assert_eq!(inv, Vec3::new(0.5, 1.0, -0.25));
    }
}
