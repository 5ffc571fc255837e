use glam::Mat4;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::document::{Document, ParentLink};

/// A glTF skin: joints plus their inverse-bind matrices.
#[derive(Debug, Clone, Default)]
pub struct Skin {
    pub index: usize,
    pub name: Option<String>,

    // === Core Data ===
    /// Joint node indices. `JOINTS_0` values index into this list.
    pub joints: Vec<usize>,

    /// Inverse-bind matrices in glTF axis space, index-aligned with `joints`.
    /// May be shorter than `joints`; surplus joints have no bind data.
    pub inverse_bind_matrices: Vec<Mat4>,

    /// Nodes whose mesh is deformed by this skin.
    pub meshes: Vec<usize>,

    /// Optional explicit skeleton root declared by the asset.
    pub skeleton: Option<usize>,
}

impl Skin {
    #[must_use]
    pub fn new(index: usize, joints: Vec<usize>, inverse_bind_matrices: Vec<Mat4>) -> Self {
        Self {
            index,
            name: None,
            joints,
            inverse_bind_matrices,
            meshes: Vec::new(),
            skeleton: None,
        }
    }

    /// The declared name, or `Armature_<index>`.
    #[must_use]
    pub fn armature_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Armature_{}", self.index))
    }

    /// Position of `node` in the joint list.
    #[inline]
    #[must_use]
    pub fn joint_slot(&self, node: usize) -> Option<usize> {
        self.joints.iter().position(|&j| j == node)
    }

    /// The inverse-bind matrix recorded for `node`, if any.
    #[must_use]
    pub fn inverse_bind_matrix(&self, node: usize) -> Option<&Mat4> {
        self.joint_slot(node)
            .and_then(|slot| self.inverse_bind_matrices.get(slot))
    }

    /// Finds the root joint.
    ///
    /// The declared skeleton root wins when it is one of the joints; otherwise
    /// the first joint without a joint parent inside this skin.
    #[must_use]
    pub fn root_joint(&self, document: &Document) -> Option<usize> {
        if let Some(root) = self.skeleton
            && self.joints.contains(&root)
        {
            return Some(root);
        }

        let joint_set: FxHashSet<usize> = self.joints.iter().copied().collect();
        self.joints
            .iter()
            .copied()
            .find(|&j| !matches!(document.parent_link(j), ParentLink::Joint(p) if joint_set.contains(&p)))
            .or_else(|| self.joints.first().copied())
    }
}

/// Joints grouped by depth inside a skin's joint subgraph.
///
/// `batches[0]` holds the joints without a joint parent in the skin, every
/// later batch holds the children of the previous one. Walking the batches in
/// order visits every parent before its children regardless of how the skin
/// lists its joints.
#[derive(Debug, Default, Clone)]
pub struct JointLevels {
    pub batches: Vec<Vec<usize>>,
}

impl JointLevels {
    /// Builds the level-order batches for `skin` (BFS from the root joints).
    #[must_use]
    pub fn build(document: &Document, skin: &Skin) -> Self {
        let joint_set: FxHashSet<usize> = skin.joints.iter().copied().collect();

        // Child lists restricted to the joint subgraph, in skin order.
        let mut children: FxHashMap<usize, SmallVec<[usize; 4]>> = FxHashMap::default();
        let mut roots = Vec::new();
        for &joint in &skin.joints {
            match document.parent_link(joint) {
                ParentLink::Joint(parent) if joint_set.contains(&parent) => {
                    children.entry(parent).or_default().push(joint);
                }
                _ => roots.push(joint),
            }
        }

        let mut batches = Vec::new();
        let mut visited = FxHashSet::default();
        let mut current_level = roots;

        while !current_level.is_empty() {
            let mut next_level = Vec::new();
            for &joint in &current_level {
                if let Some(kids) = children.get(&joint) {
                    next_level.extend(kids.iter().copied().filter(|k| !visited.contains(k)));
                }
            }
            visited.extend(current_level.iter().copied());
            batches.push(current_level);
            current_level = next_level;
        }

        // Only reachable through a cycle, which validation rejects.
        let stray: Vec<usize> = skin
            .joints
            .iter()
            .copied()
            .filter(|j| !visited.contains(j))
            .collect();
        if !stray.is_empty() {
            log::warn!(
                "Skin {}: {} joints unreachable from a root joint",
                skin.index,
                stray.len()
            );
            batches.push(stray);
        }

        Self { batches }
    }

    /// Flattened parent-first order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.batches.iter().flatten().copied()
    }

    #[must_use]
    pub fn total_joints(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.batches.len()
    }
}
