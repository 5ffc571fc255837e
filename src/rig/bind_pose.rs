use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::document::{Document, JointLevels, ParentLink};
use crate::errors::{ImportIssue, ImportLog};
use crate::host::{HostMode, ModeScope, SceneHost};
use crate::math::{affine, axis};
use crate::rig::reconcile::{BindContext, PoseReconciler, parent_bind_matrix};
use crate::settings::NonJointParentPolicy;

const SINGULAR_EPSILON: f32 = 1e-12;

/// An armature built for one skin.
pub struct BuiltArmature<H: SceneHost> {
    pub skin: usize,
    pub armature: H::Armature,
    /// Final armature name as reported by the host.
    pub name: String,
    /// Bone created for each joint node.
    pub bones: FxHashMap<usize, H::Bone>,
}

impl<H: SceneHost> BuiltArmature<H> {
    #[inline]
    #[must_use]
    pub fn bone(&self, node: usize) -> Option<H::Bone> {
        self.bones.get(&node).copied()
    }
}

/// Creates armatures, bones, bind matrices and rest poses.
///
/// Joints are visited in level order over the skin's joint subgraph, so a
/// parent's bind matrix is always resolved before any child reads it.
pub struct BindPoseBuilder<'a, H: SceneHost> {
    host: &'a mut H,
    reconciler: PoseReconciler,
    policy: NonJointParentPolicy,
}

impl<'a, H: SceneHost> BindPoseBuilder<'a, H> {
    pub fn new(host: &'a mut H, reconciler: PoseReconciler, policy: NonJointParentPolicy) -> Self {
        Self {
            host,
            reconciler,
            policy,
        }
    }

    /// Builds the armature for `document.skins[skin_index]` and annotates
    /// every joint node with its bone.
    pub fn build(
        &mut self,
        document: &mut Document,
        skin_index: usize,
        log: &mut ImportLog,
    ) -> BuiltArmature<H> {
        let skin = &document.skins[skin_index];
        let levels = JointLevels::build(document, skin);

        // Armature object sits under the root joint's non-joint parent.
        let armature_parent = skin
            .root_joint(document)
            .and_then(|root| match document.parent_link(root) {
                ParentLink::Object(parent) => self.host.node_object(parent),
                _ => None,
            });
        let armature = self.host.create_armature(&skin.armature_name(), armature_parent);
        let name = self.host.armature_name(armature);

        log::debug!(
            "Building armature '{name}' for skin {skin_index}: {} joints in {} levels",
            levels.total_joints(),
            levels.depth()
        );

        let mut bones = FxHashMap::default();
        for joint in levels.iter() {
            let bone = self.build_bone(document, skin_index, joint, armature, &bones, log);
            bones.insert(joint, bone);
        }

        BuiltArmature {
            skin: skin_index,
            armature,
            name,
            bones,
        }
    }

    fn build_bone(
        &mut self,
        document: &mut Document,
        skin_index: usize,
        joint: usize,
        armature: H::Armature,
        bones: &FxHashMap<usize, H::Bone>,
        log: &mut ImportLog,
    ) -> H::Bone {
        let bind = Self::bind_matrix(document, skin_index, joint, log);
        let parent_bind = parent_bind_matrix(document, &*self.host, joint, self.policy, log);
        let parent_bone = match document.parent_link(joint) {
            ParentLink::Joint(parent) => bones.get(&parent).copied(),
            _ => None,
        };

        let node = &document.nodes[joint];
        let local = axis::trs_to_target(&node.transform);
        let pose = self
            .reconciler
            .pose(&local, &BindContext::new(&parent_bind, &bind));

        let mut scope = ModeScope::enter(&mut *self.host, armature, HostMode::Edit);
        let bone = scope.create_bone(armature, &node.bone_name());
        scope.set_bind_matrix(bone, bind);
        if let Some(parent_bone) = parent_bone {
            scope.set_bone_parent(bone, parent_bone);
        }

        scope.switch(HostMode::Pose);
        scope.set_pose_transform(bone, &pose);
        let bone_name = scope.bone_name(bone);
        drop(scope);

        document.nodes[joint].annotate_bone(skin_index, bone_name, bind);
        bone
    }

    /// Inverse of the axis-converted inverse-bind matrix, or identity.
    fn bind_matrix(
        document: &Document,
        skin_index: usize,
        joint: usize,
        log: &mut ImportLog,
    ) -> Mat4 {
        let Some(ibm) = document.skins[skin_index].inverse_bind_matrix(joint) else {
            log.record(ImportIssue::MissingBindData {
                skin: skin_index,
                node: joint,
            });
            return Mat4::IDENTITY;
        };

        let converted = axis::matrix_to_target(ibm);
        let bind = converted.inverse();
        if converted.determinant().abs() < SINGULAR_EPSILON || !bind.is_finite() {
            log.record(ImportIssue::SingularBindMatrix {
                skin: skin_index,
                node: joint,
            });
            return Mat4::IDENTITY;
        }
        if affine::is_sheared(&bind) {
            log.record(ImportIssue::ShearedBindMatrix { node: joint });
        }
        bind
    }
}
