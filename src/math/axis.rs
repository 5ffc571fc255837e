//! glTF (Y-up) to target (Z-up) axis conversion.
//!
//! The change of basis is a +90° rotation about X: source `+Y` becomes target
//! `+Z` and source `+Z` becomes target `-Y`. Scales only permute, signs are
//! kept. All functions are pure and each `*_to_source` is the exact inverse of
//! its `*_to_target`.

use glam::{Mat4, Quat, Vec3, Vec4};

use crate::math::transform::Trs;

/// Source-to-target basis change `(x, y, z) -> (x, -z, y)`.
pub const TO_TARGET: Mat4 = Mat4::from_cols(Vec4::X, Vec4::Z, Vec4::NEG_Y, Vec4::W);

/// Target-to-source basis change `(x, y, z) -> (x, z, -y)`.
pub const TO_SOURCE: Mat4 = Mat4::from_cols(Vec4::X, Vec4::NEG_Z, Vec4::Y, Vec4::W);

#[inline]
#[must_use]
pub fn location_to_target(v: Vec3) -> Vec3 {
    Vec3::new(v.x, -v.z, v.y)
}

#[inline]
#[must_use]
pub fn location_to_source(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, -v.y)
}

/// The rotation axis is remapped like a location; the angle is unchanged.
#[inline]
#[must_use]
pub fn quaternion_to_target(q: Quat) -> Quat {
    Quat::from_xyzw(q.x, -q.z, q.y, q.w)
}

#[inline]
#[must_use]
pub fn quaternion_to_source(q: Quat) -> Quat {
    Quat::from_xyzw(q.x, q.z, -q.y, q.w)
}

#[inline]
#[must_use]
pub fn scale_to_target(s: Vec3) -> Vec3 {
    Vec3::new(s.x, s.z, s.y)
}

#[inline]
#[must_use]
pub fn scale_to_source(s: Vec3) -> Vec3 {
    Vec3::new(s.x, s.z, s.y)
}

/// Conjugates a full affine matrix into target space (`C * M * C⁻¹`).
#[inline]
#[must_use]
pub fn matrix_to_target(m: &Mat4) -> Mat4 {
    TO_TARGET * *m * TO_SOURCE
}

#[inline]
#[must_use]
pub fn matrix_to_source(m: &Mat4) -> Mat4 {
    TO_SOURCE * *m * TO_TARGET
}

/// Converts every component of a glTF local transform.
#[must_use]
pub fn trs_to_target(trs: &Trs) -> Trs {
    Trs {
        translation: location_to_target(trs.translation),
        rotation: quaternion_to_target(trs.rotation),
        scale: scale_to_target(trs.scale),
    }
}
