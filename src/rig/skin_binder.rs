use rustc_hash::FxHashSet;

use crate::document::{Document, Mesh};
use crate::errors::{ImportIssue, ImportLog};
use crate::host::{SceneHost, WeightMode};
use crate::rig::bind_pose::BuiltArmature;

/// Binds the meshes of a skin to its armature.
///
/// Runs in three passes over the skin's mesh objects: vertex-group
/// declaration, weight assignment, armature modifier attachment.
pub struct SkinBinder<'a, H: SceneHost> {
    host: &'a mut H,
}

impl<'a, H: SceneHost> SkinBinder<'a, H> {
    pub fn new(host: &'a mut H) -> Self {
        Self { host }
    }

    /// Returns the number of weight assignments made.
    pub fn bind(
        &mut self,
        document: &Document,
        armature: &BuiltArmature<H>,
        import_weights: bool,
        log: &mut ImportLog,
    ) -> usize {
        let skin = &document.skins[armature.skin];

        let targets: Vec<(usize, H::Object)> = skin
            .meshes
            .iter()
            .filter_map(|&node| {
                let object = self.host.node_object(node);
                if object.is_none() {
                    log.record(ImportIssue::MissingMeshObject {
                        skin: skin.index,
                        node,
                    });
                }
                Some((node, object?))
            })
            .collect();

        // Group names indexed by joint slot.
        let groups: Vec<Option<String>> = skin
            .joints
            .iter()
            .map(|&joint| armature.bone(joint).map(|bone| self.host.bone_name(bone)))
            .collect();

        for &(_, object) in &targets {
            for name in groups.iter().flatten() {
                self.host.create_vertex_group(object, name);
            }
        }

        let mut assigned = 0;
        if import_weights {
            for &(node, object) in &targets {
                let Some(mesh_index) = document.nodes[node].mesh else {
                    log::debug!("Skinned node {node} carries no mesh");
                    continue;
                };
                let mesh = &document.meshes[mesh_index];
                assigned += self.assign_weights(skin.index, mesh_index, mesh, object, &groups, log);
            }
        }

        for &(_, object) in &targets {
            self.host.attach_armature_modifier(object, armature.armature);
        }

        log::debug!(
            "Skin {}: {} mesh objects, {assigned} weight assignments",
            skin.index,
            targets.len()
        );
        assigned
    }

    fn assign_weights(
        &mut self,
        skin: usize,
        mesh_index: usize,
        mesh: &Mesh,
        object: H::Object,
        groups: &[Option<String>],
        log: &mut ImportLog,
    ) -> usize {
        // Loops share vertices; visit each vertex once, in first-seen order.
        let mut seen = FxHashSet::default();
        let vertices: Vec<u32> = self
            .host
            .mesh_loop_vertices(object)
            .into_iter()
            .filter(|v| seen.insert(*v))
            .collect();

        let mut assigned = 0;
        let mut offset = 0usize;
        for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
            let range = offset..offset + primitive.vertex_count;
            offset = range.end;

            if !primitive.has_skinning() {
                log.record(ImportIssue::MissingSkinningAttributes {
                    mesh: mesh_index,
                    primitive: primitive_index,
                });
                continue;
            }

            for &vertex in &vertices {
                let global = vertex as usize;
                if !range.contains(&global) {
                    continue;
                }

                for (slot, weight) in primitive.influences(global - range.start) {
                    let slot = usize::from(slot);
                    let Some(group) = groups.get(slot) else {
                        log.record(ImportIssue::InvalidJointIndex {
                            skin,
                            joint: slot,
                            joint_count: groups.len(),
                        });
                        continue;
                    };
                    let Some(group) = group else {
                        continue;
                    };
                    self.host
                        .add_vertex_to_group(object, group, vertex, weight, WeightMode::Replace);
                    assigned += 1;
                }
            }
        }

        assigned
    }
}
