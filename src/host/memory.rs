//! In-memory scene host.
//!
//! A plain-data implementation of [`SceneHost`]. It records everything the
//! importer writes and enforces the mode discipline of a real authoring
//! application: bone creation, bind matrices and parenting require
//! [`HostMode::Edit`]; pose writes are refused in edit mode. Refused calls are
//! logged and counted in [`MemoryHost::mode_violations`].

use glam::Mat4;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::host::{
    BoneProperty, HostMode, KeyframeInterpolation, PoseValue, SceneHost, TextureNodeSettings,
    WeightMode,
};
use crate::math::PoseTransform;

new_key_type! {
    pub struct ObjectKey;
    pub struct ArmatureKey;
    pub struct BoneKey;
    pub struct ActionKey;
    pub struct KeyframeKey;
    pub struct MaterialKey;
    pub struct TextureNodeKey;
}

/// Mesh data of a scene object: loop topology and vertex groups.
#[derive(Debug, Clone, Default)]
pub struct MeshObject {
    pub loop_vertices: Vec<u32>,
    /// Group names in declaration order.
    pub group_names: Vec<String>,
    pub groups: FxHashMap<String, FxHashMap<u32, f32>>,
    /// Number of accepted weight writes.
    pub weight_writes: usize,
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub world_matrix: Mat4,
    pub mesh: Option<MeshObject>,
    pub armature_modifiers: Vec<ArmatureKey>,
}

#[derive(Debug, Clone)]
pub struct Armature {
    pub name: String,
    pub parent: Option<ObjectKey>,
    pub bones: Vec<BoneKey>,
    pub mode: HostMode,
    pub action: Option<ActionKey>,
}

#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    pub armature: ArmatureKey,
    pub parent: Option<BoneKey>,
    pub bind_matrix: Option<Mat4>,
    pub pose: PoseTransform,
    pub pose_written: bool,
}

#[derive(Debug, Clone)]
pub struct Action {
    pub name: String,
    pub keyframes: Vec<KeyframeKey>,
}

#[derive(Debug, Clone)]
pub struct Keyframe {
    pub action: ActionKey,
    pub bone: BoneKey,
    pub property: BoneProperty,
    pub frame: f32,
    pub value: PoseValue,
    pub group: String,
    pub interpolation: KeyframeInterpolation,
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub texture_nodes: Vec<TextureNodeKey>,
}

#[derive(Debug, Clone)]
pub struct TextureNode {
    pub material: MaterialKey,
    pub image: String,
    pub settings: TextureNodeSettings,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    pub objects: SlotMap<ObjectKey, SceneObject>,
    pub armatures: SlotMap<ArmatureKey, Armature>,
    pub bones: SlotMap<BoneKey, Bone>,
    pub actions: SlotMap<ActionKey, Action>,
    pub keyframes: SlotMap<KeyframeKey, Keyframe>,
    pub materials: SlotMap<MaterialKey, Material>,
    pub texture_nodes: SlotMap<TextureNodeKey, TextureNode>,

    node_objects: FxHashMap<usize, ObjectKey>,
    mode_violations: usize,
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Scene setup (stands in for the object/mesh import stage)
    // ========================================================================

    /// Adds a plain object and maps it to glTF `node`.
    pub fn add_object(&mut self, node: usize, name: &str, world_matrix: Mat4) -> ObjectKey {
        let key = self.objects.insert(SceneObject {
            name: name.to_string(),
            world_matrix,
            mesh: None,
            armature_modifiers: Vec::new(),
        });
        self.node_objects.insert(node, key);
        key
    }

    /// Adds a mesh object with the given loop topology and maps it to `node`.
    pub fn add_mesh_object(&mut self, node: usize, name: &str, loop_vertices: Vec<u32>) -> ObjectKey {
        let key = self.add_object(node, name, Mat4::IDENTITY);
        self.objects[key].mesh = Some(MeshObject {
            loop_vertices,
            ..MeshObject::default()
        });
        key
    }

    pub fn add_material(&mut self, name: &str) -> MaterialKey {
        self.materials.insert(Material {
            name: name.to_string(),
            texture_nodes: Vec::new(),
        })
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Calls refused because the armature was in the wrong mode, or because a
    /// bind matrix was written after the pose.
    #[inline]
    #[must_use]
    pub fn mode_violations(&self) -> usize {
        self.mode_violations
    }

    #[must_use]
    pub fn armature_by_name(&self, name: &str) -> Option<ArmatureKey> {
        self.armatures
            .iter()
            .find_map(|(key, a)| (a.name == name).then_some(key))
    }

    #[must_use]
    pub fn bone_by_name(&self, armature: ArmatureKey, name: &str) -> Option<BoneKey> {
        self.armatures.get(armature)?.bones.iter().copied().find(|&b| self.bones[b].name == name)
    }

    #[must_use]
    pub fn action_by_name(&self, name: &str) -> Option<ActionKey> {
        self.actions
            .iter()
            .find_map(|(key, a)| (a.name == name).then_some(key))
    }

    /// Keyframes of one bone property in an action, in insertion order.
    #[must_use]
    pub fn keyframes_of(&self, action: ActionKey, bone: BoneKey, property: BoneProperty) -> Vec<&Keyframe> {
        let Some(action) = self.actions.get(action) else {
            return Vec::new();
        };
        action
            .keyframes
            .iter()
            .map(|&k| &self.keyframes[k])
            .filter(|k| k.bone == bone && k.property == property)
            .collect()
    }

    #[must_use]
    pub fn vertex_weight(&self, object: ObjectKey, group: &str, vertex: u32) -> Option<f32> {
        self.objects
            .get(object)?
            .mesh
            .as_ref()?
            .groups
            .get(group)?
            .get(&vertex)
            .copied()
    }

    #[must_use]
    pub fn mesh(&self, object: ObjectKey) -> Option<&MeshObject> {
        self.objects.get(object)?.mesh.as_ref()
    }

    fn violation(&mut self, what: &str) {
        log::warn!("MemoryHost: {what}");
        self.mode_violations += 1;
    }

    fn armature_mode(&self, bone: BoneKey) -> Option<HostMode> {
        let bone = self.bones.get(bone)?;
        Some(self.armatures.get(bone.armature)?.mode)
    }

    fn unique_armature_name(&self, name: &str) -> String {
        unique_name(name, |candidate| {
            self.armatures.values().any(|a| a.name == candidate)
        })
    }
}

/// Appends `.001`, `.002`, ... until `taken` rejects the candidate.
fn unique_name(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }
    (1..)
        .map(|n| format!("{name}.{n:03}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

impl SceneHost for MemoryHost {
    type Object = ObjectKey;
    type Armature = ArmatureKey;
    type Bone = BoneKey;
    type Action = ActionKey;
    type Keyframe = KeyframeKey;
    type Material = MaterialKey;
    type TextureNode = TextureNodeKey;

    fn node_object(&self, node: usize) -> Option<ObjectKey> {
        self.node_objects.get(&node).copied()
    }

    fn object_world_matrix(&self, object: ObjectKey) -> Mat4 {
        self.objects
            .get(object)
            .map_or(Mat4::IDENTITY, |o| o.world_matrix)
    }

    fn mesh_loop_vertices(&self, object: ObjectKey) -> Vec<u32> {
        self.mesh(object)
            .map(|m| m.loop_vertices.clone())
            .unwrap_or_default()
    }

    fn create_armature(&mut self, name: &str, parent: Option<ObjectKey>) -> ArmatureKey {
        let name = self.unique_armature_name(name);
        self.armatures.insert(Armature {
            name,
            parent,
            bones: Vec::new(),
            mode: HostMode::Object,
            action: None,
        })
    }

    fn armature_name(&self, armature: ArmatureKey) -> String {
        self.armatures
            .get(armature)
            .map(|a| a.name.clone())
            .unwrap_or_default()
    }

    fn set_mode(&mut self, armature: ArmatureKey, mode: HostMode) {
        if let Some(a) = self.armatures.get_mut(armature) {
            a.mode = mode;
        }
    }

    fn create_bone(&mut self, armature: ArmatureKey, name: &str) -> BoneKey {
        let mode = self.armatures.get(armature).map(|a| a.mode);
        if mode != Some(HostMode::Edit) {
            self.violation(&format!("create_bone({name}) outside edit mode"));
        }

        let existing: Vec<String> = self
            .armatures
            .get(armature)
            .map(|a| a.bones.iter().map(|&b| self.bones[b].name.clone()).collect())
            .unwrap_or_default();
        let name = unique_name(name, |candidate| existing.iter().any(|n| n == candidate));

        let key = self.bones.insert(Bone {
            name,
            armature,
            parent: None,
            bind_matrix: None,
            pose: PoseTransform::IDENTITY,
            pose_written: false,
        });
        if let Some(a) = self.armatures.get_mut(armature) {
            a.bones.push(key);
        }
        key
    }

    fn bone_name(&self, bone: BoneKey) -> String {
        self.bones
            .get(bone)
            .map(|b| b.name.clone())
            .unwrap_or_default()
    }

    fn set_bind_matrix(&mut self, bone: BoneKey, matrix: Mat4) {
        if self.armature_mode(bone) != Some(HostMode::Edit) {
            self.violation("set_bind_matrix outside edit mode");
            return;
        }
        let Some(b) = self.bones.get(bone) else {
            return;
        };
        if b.bind_matrix.is_some() || b.pose_written {
            let message = format!("bind matrix of {} written twice or after pose", b.name);
            self.violation(&message);
            return;
        }
        self.bones[bone].bind_matrix = Some(matrix);
    }

    fn set_bone_parent(&mut self, bone: BoneKey, parent: BoneKey) {
        if self.armature_mode(bone) != Some(HostMode::Edit) {
            self.violation("set_bone_parent outside edit mode");
            return;
        }
        if let Some(b) = self.bones.get_mut(bone) {
            b.parent = Some(parent);
        }
    }

    fn set_pose_transform(&mut self, bone: BoneKey, pose: &PoseTransform) {
        if self.armature_mode(bone) == Some(HostMode::Edit) {
            self.violation("set_pose_transform in edit mode");
            return;
        }
        if let Some(b) = self.bones.get_mut(bone) {
            b.pose = *pose;
            b.pose_written = true;
        }
    }

    fn set_pose_value(&mut self, bone: BoneKey, value: PoseValue) {
        if self.armature_mode(bone) == Some(HostMode::Edit) {
            self.violation("set_pose_value in edit mode");
            return;
        }
        if let Some(b) = self.bones.get_mut(bone) {
            value.apply_to(&mut b.pose);
            b.pose_written = true;
        }
    }

    fn find_action(&self, name: &str) -> Option<ActionKey> {
        self.action_by_name(name)
    }

    fn create_action(&mut self, name: &str) -> ActionKey {
        let name = unique_name(name, |candidate| {
            self.actions.values().any(|a| a.name == candidate)
        });
        self.actions.insert(Action {
            name,
            keyframes: Vec::new(),
        })
    }

    fn assign_action(&mut self, armature: ArmatureKey, action: ActionKey) {
        if let Some(a) = self.armatures.get_mut(armature) {
            a.action = Some(action);
        }
    }

    fn insert_keyframe(
        &mut self,
        action: ActionKey,
        bone: BoneKey,
        property: BoneProperty,
        frame: f32,
        group: &str,
    ) -> KeyframeKey {
        let pose = self.bones.get(bone).map_or(PoseTransform::IDENTITY, |b| b.pose);
        let value = PoseValue::read(property, &pose);

        // Keying the same property on the same frame overwrites.
        let existing = self.actions.get(action).and_then(|a| {
            a.keyframes.iter().copied().find(|&k| {
                let kf = &self.keyframes[k];
                kf.bone == bone && kf.property == property && kf.frame == frame
            })
        });
        if let Some(key) = existing {
            let kf = &mut self.keyframes[key];
            kf.value = value;
            kf.group = group.to_string();
            return key;
        }

        let key = self.keyframes.insert(Keyframe {
            action,
            bone,
            property,
            frame,
            value,
            group: group.to_string(),
            interpolation: KeyframeInterpolation::default(),
        });
        if let Some(a) = self.actions.get_mut(action) {
            a.keyframes.push(key);
        }
        key
    }

    fn set_keyframe_interpolation(&mut self, keyframe: KeyframeKey, mode: KeyframeInterpolation) {
        if let Some(kf) = self.keyframes.get_mut(keyframe) {
            kf.interpolation = mode;
        }
    }

    fn create_vertex_group(&mut self, object: ObjectKey, name: &str) {
        let Some(mesh) = self.objects.get_mut(object).and_then(|o| o.mesh.as_mut()) else {
            log::warn!("MemoryHost: vertex group {name} on an object without mesh");
            return;
        };
        if !mesh.groups.contains_key(name) {
            mesh.group_names.push(name.to_string());
            mesh.groups.insert(name.to_string(), FxHashMap::default());
        }
    }

    fn add_vertex_to_group(
        &mut self,
        object: ObjectKey,
        group: &str,
        vertex: u32,
        weight: f32,
        mode: WeightMode,
    ) {
        let Some(mesh) = self.objects.get_mut(object).and_then(|o| o.mesh.as_mut()) else {
            return;
        };
        let Some(weights) = mesh.groups.get_mut(group) else {
            log::warn!("MemoryHost: vertex group {group} was never declared");
            return;
        };
        match mode {
            WeightMode::Replace => {
                weights.insert(vertex, weight);
            }
            WeightMode::Add => {
                *weights.entry(vertex).or_insert(0.0) += weight;
            }
        }
        mesh.weight_writes += 1;
    }

    fn attach_armature_modifier(&mut self, object: ObjectKey, armature: ArmatureKey) {
        if let Some(o) = self.objects.get_mut(object) {
            o.armature_modifiers.push(armature);
        }
    }

    fn create_image_texture_node(&mut self, material: MaterialKey, image: &str) -> TextureNodeKey {
        let key = self.texture_nodes.insert(TextureNode {
            material,
            image: image.to_string(),
            settings: TextureNodeSettings::default(),
        });
        if let Some(m) = self.materials.get_mut(material) {
            m.texture_nodes.push(key);
        }
        key
    }

    fn configure_texture_node(&mut self, node: TextureNodeKey, settings: &TextureNodeSettings) {
        if let Some(n) = self.texture_nodes.get_mut(node) {
            n.settings = settings.clone();
        }
    }
}
