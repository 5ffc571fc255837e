use glam::Mat4;

use crate::math::Trs;

/// A glTF scene node as handed over by the parser.
///
/// # Hierarchy
///
/// Nodes refer to each other by index only (`parent`, `children`). The links
/// are weak: they are resolved through [`Document`](crate::document::Document)
/// and a dangling parent index is treated as "no parent".
///
/// # Bone annotations
///
/// When the node is a joint, bind-pose construction writes the created bone's
/// name, its armature-space bind matrix and the owning skin. They are written
/// once and only read afterwards (e.g. by the animation player).
#[derive(Debug, Clone)]
pub struct Node {
    pub index: usize,
    pub name: Option<String>,
    /// Local transform in glTF axis space.
    pub transform: Trs,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    /// Set when any skin lists this node among its joints.
    pub is_joint: bool,
    /// Skin used by the mesh on this node.
    pub skin: Option<usize>,
    pub mesh: Option<usize>,

    // === Derived (bind-pose construction) ===
    pub(crate) armature_bone_name: Option<String>,
    pub(crate) armature_bone_bind_matrix: Option<Mat4>,
    pub(crate) armature_skin: Option<usize>,
}

impl Node {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self {
            index,
            name: None,
            transform: Trs::IDENTITY,
            parent: None,
            children: Vec::new(),
            is_joint: false,
            skin: None,
            mesh: None,
            armature_bone_name: None,
            armature_bone_bind_matrix: None,
            armature_skin: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Low-level parent assignment. Prefer [`Document::attach`](crate::document::Document::attach)
    /// which keeps both sides of the link in sync.
    #[inline]
    pub fn set_parent(&mut self, parent: Option<usize>) {
        self.parent = parent;
    }

    /// The declared name, or `Bone_<index>`.
    #[must_use]
    pub fn bone_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Bone_{}", self.index))
    }

    #[inline]
    #[must_use]
    pub fn armature_bone_name(&self) -> Option<&str> {
        self.armature_bone_name.as_deref()
    }

    /// Armature-space bind matrix (target axis space), once resolved.
    #[inline]
    #[must_use]
    pub fn armature_bone_bind_matrix(&self) -> Option<&Mat4> {
        self.armature_bone_bind_matrix.as_ref()
    }

    /// Index of the skin whose armature owns this node's bone.
    #[inline]
    #[must_use]
    pub fn armature_skin(&self) -> Option<usize> {
        self.armature_skin
    }

    #[inline]
    #[must_use]
    pub fn has_bone(&self) -> bool {
        self.armature_bone_bind_matrix.is_some()
    }

    pub(crate) fn annotate_bone(&mut self, skin: usize, name: String, bind_matrix: Mat4) {
        if let Some(previous) = self.armature_skin
            && previous != skin
        {
            log::debug!(
                "Node {} is a joint of skins {previous} and {skin}; keeping the latter",
                self.index
            );
        }
        self.armature_bone_name = Some(name);
        self.armature_bone_bind_matrix = Some(bind_matrix);
        self.armature_skin = Some(skin);
    }
}
