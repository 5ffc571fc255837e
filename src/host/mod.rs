//! Target scene-graph interface
//!
//! [`SceneHost`] is everything the importer asks of the authoring
//! application: armature and bone creation, bind and pose writes, keyframe
//! containers, vertex groups, modifiers and texture nodes. Handles are
//! associated types so a host can use its own identifiers.
//!
//! Interaction mode is explicit ([`HostMode`]). Callers switch it through a
//! [`ModeScope`], which puts the armature back into [`HostMode::Object`] when
//! dropped.
//!
//! [`MemoryHost`] is a complete in-memory implementation.

pub mod memory;

pub use memory::MemoryHost;

use std::fmt::Debug;
use std::hash::Hash;
use std::ops::{Deref, DerefMut};

use glam::{Mat4, Quat, Vec3};

use crate::document::Interpolation;
use crate::math::PoseTransform;

/// Interaction mode of an armature in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostMode {
    /// Neutral mode; nothing is being edited.
    #[default]
    Object,
    /// Bone creation, bind matrices and parenting.
    Edit,
    /// Pose-bone transforms.
    Pose,
}

/// Animatable pose-bone property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoneProperty {
    Location,
    RotationQuaternion,
    Scale,
}

impl BoneProperty {
    /// Host data path of the property.
    #[must_use]
    pub fn data_path(self) -> &'static str {
        match self {
            BoneProperty::Location => "location",
            BoneProperty::RotationQuaternion => "rotation_quaternion",
            BoneProperty::Scale => "scale",
        }
    }

    /// Keyframe group the importer files the property under.
    #[must_use]
    pub fn group(self) -> &'static str {
        match self {
            BoneProperty::Location => "location",
            BoneProperty::RotationQuaternion => "rotation",
            BoneProperty::Scale => "scale",
        }
    }
}

/// A single pose-bone property value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoseValue {
    Location(Vec3),
    Rotation(Quat),
    Scale(Vec3),
}

impl PoseValue {
    #[must_use]
    pub fn property(&self) -> BoneProperty {
        match self {
            PoseValue::Location(_) => BoneProperty::Location,
            PoseValue::Rotation(_) => BoneProperty::RotationQuaternion,
            PoseValue::Scale(_) => BoneProperty::Scale,
        }
    }

    /// Writes this value into the matching field of `pose`.
    pub fn apply_to(&self, pose: &mut PoseTransform) {
        match *self {
            PoseValue::Location(v) => pose.location = v,
            PoseValue::Rotation(q) => pose.rotation = q,
            PoseValue::Scale(v) => pose.scale = v,
        }
    }

    /// Reads the matching field of `pose`.
    #[must_use]
    pub fn read(property: BoneProperty, pose: &PoseTransform) -> Self {
        match property {
            BoneProperty::Location => PoseValue::Location(pose.location),
            BoneProperty::RotationQuaternion => PoseValue::Rotation(pose.rotation),
            BoneProperty::Scale => PoseValue::Scale(pose.scale),
        }
    }
}

/// Interpolation applied to a host keyframe point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyframeInterpolation {
    Constant,
    Linear,
    #[default]
    Bezier,
}

impl From<Interpolation> for KeyframeInterpolation {
    fn from(mode: Interpolation) -> Self {
        match mode {
            Interpolation::Step => KeyframeInterpolation::Constant,
            Interpolation::Linear => KeyframeInterpolation::Linear,
            Interpolation::CubicSpline => KeyframeInterpolation::Bezier,
        }
    }
}

/// How a vertex-group weight write combines with an existing weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightMode {
    Replace,
    Add,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureInterpolation {
    Closest,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureExtension {
    #[default]
    Repeat,
    Extend,
}

/// Settings of an image texture node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextureNodeSettings {
    pub interpolation: TextureInterpolation,
    pub extension: TextureExtension,
    pub label: Option<String>,
}

/// The target scene graph.
pub trait SceneHost {
    type Object: Copy + Eq + Hash + Debug;
    type Armature: Copy + Eq + Hash + Debug;
    type Bone: Copy + Eq + Hash + Debug;
    type Action: Copy + Eq + Hash + Debug;
    type Keyframe: Copy + Eq + Hash + Debug;
    type Material: Copy + Eq + Debug;
    type TextureNode: Copy + Eq + Debug;

    // === Scene queries ===

    /// Host object created for a glTF node, if any.
    fn node_object(&self, node: usize) -> Option<Self::Object>;

    fn object_world_matrix(&self, object: Self::Object) -> Mat4;

    /// Vertex index of every polygon loop of a mesh object, in loop order.
    fn mesh_loop_vertices(&self, object: Self::Object) -> Vec<u32>;

    // === Armatures & bones ===

    fn create_armature(&mut self, name: &str, parent: Option<Self::Object>) -> Self::Armature;

    /// Final (possibly uniquified) name of the armature object.
    fn armature_name(&self, armature: Self::Armature) -> String;

    fn set_mode(&mut self, armature: Self::Armature, mode: HostMode);

    fn create_bone(&mut self, armature: Self::Armature, name: &str) -> Self::Bone;

    /// Final (possibly uniquified) bone name.
    fn bone_name(&self, bone: Self::Bone) -> String;

    fn set_bind_matrix(&mut self, bone: Self::Bone, matrix: Mat4);

    fn set_bone_parent(&mut self, bone: Self::Bone, parent: Self::Bone);

    fn set_pose_transform(&mut self, bone: Self::Bone, pose: &PoseTransform);

    fn set_pose_value(&mut self, bone: Self::Bone, value: PoseValue);

    // === Keyframes ===

    fn find_action(&self, name: &str) -> Option<Self::Action>;

    fn create_action(&mut self, name: &str) -> Self::Action;

    fn assign_action(&mut self, armature: Self::Armature, action: Self::Action);

    /// Keys the bone's current value of `property` at `frame`.
    fn insert_keyframe(
        &mut self,
        action: Self::Action,
        bone: Self::Bone,
        property: BoneProperty,
        frame: f32,
        group: &str,
    ) -> Self::Keyframe;

    fn set_keyframe_interpolation(&mut self, keyframe: Self::Keyframe, mode: KeyframeInterpolation);

    // === Skinning ===

    fn create_vertex_group(&mut self, object: Self::Object, name: &str);

    fn add_vertex_to_group(
        &mut self,
        object: Self::Object,
        group: &str,
        vertex: u32,
        weight: f32,
        mode: WeightMode,
    );

    fn attach_armature_modifier(&mut self, object: Self::Object, armature: Self::Armature);

    // === Materials ===

    fn create_image_texture_node(&mut self, material: Self::Material, image: &str) -> Self::TextureNode;

    fn configure_texture_node(&mut self, node: Self::TextureNode, settings: &TextureNodeSettings);
}

/// Holds an armature in a non-neutral mode for the lifetime of the scope.
///
/// Derefs to the host; dropping the scope restores [`HostMode::Object`].
pub struct ModeScope<'h, H: SceneHost> {
    host: &'h mut H,
    armature: H::Armature,
}

impl<'h, H: SceneHost> ModeScope<'h, H> {
    pub fn enter(host: &'h mut H, armature: H::Armature, mode: HostMode) -> Self {
        host.set_mode(armature, mode);
        Self { host, armature }
    }

    /// Switches mode without leaving the scope.
    pub fn switch(&mut self, mode: HostMode) {
        self.host.set_mode(self.armature, mode);
    }
}

impl<H: SceneHost> Deref for ModeScope<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: SceneHost> DerefMut for ModeScope<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: SceneHost> Drop for ModeScope<'_, H> {
    fn drop(&mut self) {
        self.host.set_mode(self.armature, HostMode::Object);
    }
}
