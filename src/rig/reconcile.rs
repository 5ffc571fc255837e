//! Pose reconciliation.
//!
//! Turns one component of a joint's local transform into the value stored on
//! its pose bone, relative to the bone's own bind matrix:
//!
//! 1. lift the local value into armature space through the parent's bind
//!    matrix ([`affine::armspace_translation`] and friends);
//! 2. remove the joint's own bind contribution.
//!
//! Reconciling the joint's bind-time local transform yields
//! [`PoseTransform::IDENTITY`]. The same code serves bind-pose placement and
//! every animation keyframe.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::document::{Document, ParentLink};
use crate::errors::{ImportIssue, ImportLog};
use crate::host::SceneHost;
use crate::math::{PoseTransform, Trs, affine};
use crate::settings::{NonJointParentPolicy, RotationContinuity};

const IDENTITY_TOLERANCE: f32 = 1e-6;

/// Decomposed parent and own bind matrices of one joint (target axis space).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BindContext {
    parent: Trs,
    bind: Trs,
}

impl BindContext {
    #[must_use]
    pub fn new(parent_bind: &Mat4, self_bind: &Mat4) -> Self {
        Self {
            parent: affine::decompose(parent_bind),
            bind: affine::decompose(self_bind),
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> &Trs {
        &self.parent
    }

    #[inline]
    #[must_use]
    pub fn bind(&self) -> &Trs {
        &self.bind
    }

    /// Whether the parent bind rotation differs from identity (either sign).
    #[must_use]
    pub fn has_rotated_parent(&self) -> bool {
        let q = self.parent.rotation;
        !(q.abs_diff_eq(Quat::IDENTITY, IDENTITY_TOLERANCE)
            || q.abs_diff_eq(-Quat::IDENTITY, IDENTITY_TOLERANCE))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PoseReconciler {
    continuity: RotationContinuity,
}

impl PoseReconciler {
    #[must_use]
    pub fn new(continuity: RotationContinuity) -> Self {
        Self { continuity }
    }

    /// Pose location: armature-space location minus the bind location,
    /// expressed in the bind rotation's frame.
    #[must_use]
    pub fn location(&self, local: Vec3, ctx: &BindContext) -> Vec3 {
        let armspace = affine::armspace_translation(local, &ctx.parent);
        let offset = armspace + affine::invert_translation(ctx.bind.translation);
        affine::invert_rotation(ctx.bind.rotation) * offset
    }

    /// Pose rotation: inverse bind rotation times armature-space rotation.
    ///
    /// `previous` is the last reconciled key of the same channel, used by
    /// [`RotationContinuity::Hemisphere`].
    #[must_use]
    pub fn rotation(&self, local: Quat, ctx: &BindContext, previous: Option<Quat>) -> Quat {
        let armspace = affine::armspace_rotation(local, &ctx.parent);
        let rotation = (affine::invert_rotation(ctx.bind.rotation) * armspace).normalize();

        match self.continuity {
            RotationContinuity::EulerRoundTrip if ctx.has_rotated_parent() => {
                euler_round_trip(rotation)
            }
            RotationContinuity::Hemisphere => match previous {
                Some(prev) if prev.dot(rotation) < 0.0 => -rotation,
                _ => rotation,
            },
            _ => rotation,
        }
    }

    /// Pose scale: armature-space scale with the bind scale divided out.
    #[must_use]
    pub fn scale(&self, local: Vec3, ctx: &BindContext) -> Vec3 {
        affine::armspace_scale(local, &ctx.parent) * affine::invert_scale(ctx.bind.scale)
    }

    /// Reconciles a whole local transform (target axis space).
    #[must_use]
    pub fn pose(&self, local: &Trs, ctx: &BindContext) -> PoseTransform {
        PoseTransform {
            location: self.location(local.translation, ctx),
            rotation: self.rotation(local.rotation, ctx, None),
            scale: self.scale(local.scale, ctx),
        }
    }
}

/// Collapses `q` and `-q` onto the sign produced by XYZ Euler reconstruction.
#[must_use]
pub fn euler_round_trip(q: Quat) -> Quat {
    let (x, y, z) = q.to_euler(EulerRot::XYZ);
    Quat::from_euler(EulerRot::XYZ, x, y, z)
}

/// Armature-space bind matrix of `node`'s parent, as seen by reconciliation.
///
/// - no parent: identity;
/// - joint parent: its resolved bind matrix;
/// - non-joint parent: identity or the host object's world matrix, per
///   `policy`;
/// - anything unresolved: identity, with an `UnresolvedParentReference`.
pub fn parent_bind_matrix<H: SceneHost>(
    document: &Document,
    host: &H,
    node: usize,
    policy: NonJointParentPolicy,
    log: &mut ImportLog,
) -> Mat4 {
    match document.parent_link(node) {
        ParentLink::None => Mat4::IDENTITY,
        ParentLink::Joint(parent) => {
            if let Some(bind) = document.nodes[parent].armature_bone_bind_matrix() {
                *bind
            } else {
                log.record(ImportIssue::UnresolvedParentReference { node, parent });
                Mat4::IDENTITY
            }
        }
        ParentLink::Object(parent) => match policy {
            NonJointParentPolicy::Identity => Mat4::IDENTITY,
            NonJointParentPolicy::ObjectWorldMatrix => {
                if let Some(object) = host.node_object(parent) {
                    host.object_world_matrix(object)
                } else {
                    log.record(ImportIssue::UnresolvedParentReference { node, parent });
                    Mat4::IDENTITY
                }
            }
        },
        ParentLink::Unresolved(parent) => {
            log.record(ImportIssue::UnresolvedParentReference { node, parent });
            Mat4::IDENTITY
        }
    }
}
