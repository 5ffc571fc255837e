//! In-memory glTF document model
//!
//! The parsed form of a glTF asset as far as rig import needs it:
//! - [`Node`]: hierarchy, local TRS, joint flag, bone annotations
//! - [`Skin`]: joints, inverse-bind matrices, bound meshes
//! - [`Animation`] / [`Channel`]: keyframe tracks per node property
//! - [`Mesh`] / [`Primitive`]: `JOINTS_0` / `WEIGHTS_0` attributes
//! - [`Texture`] / [`Sampler`] / [`Image`]: texture node metadata
//!
//! All cross references are plain indices into the tables of [`Document`].

pub mod animation;
pub mod mesh;
pub mod node;
pub mod skin;
pub mod texture;

pub use animation::{Animation, Channel, ChannelData, ChannelPath, Interpolation, KeyframeTrack};
pub use mesh::{MAX_INFLUENCES, Mesh, Primitive};
pub use node::Node;
pub use skin::{JointLevels, Skin};
pub use texture::{Image, MagFilter, MinFilter, Sampler, Texture, WrappingMode};

use crate::errors::{Result, RigError};
use crate::math::Trs;

/// How a node's parent index resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentLink {
    /// Root node.
    None,
    /// Parent is a joint node.
    Joint(usize),
    /// Parent is an ordinary scene node.
    Object(usize),
    /// Parent index points past the node table.
    Unresolved(usize),
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    pub nodes: Vec<Node>,
    pub skins: Vec<Skin>,
    pub meshes: Vec<Mesh>,
    pub animations: Vec<Animation>,
    pub textures: Vec<Texture>,
    pub samplers: Vec<Sampler>,
    pub images: Vec<Image>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Appends a root node and returns its index.
    pub fn add_node(&mut self, name: Option<&str>, transform: Trs) -> usize {
        let index = self.nodes.len();
        let mut node = Node::new(index);
        node.name = name.map(str::to_string);
        node.transform = transform;
        self.nodes.push(node);
        index
    }

    /// Links `child` under `parent`, detaching it from any previous parent.
    pub fn attach(&mut self, child: usize, parent: usize) {
        if child == parent || child >= self.nodes.len() || parent >= self.nodes.len() {
            log::warn!("Ignoring invalid attach of node {child} to {parent}");
            return;
        }

        if let Some(old) = self.nodes[child].parent
            && let Some(old_parent) = self.nodes.get_mut(old)
        {
            old_parent.children.retain(|&c| c != child);
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Appends a skin, marks its joints and returns its index.
    pub fn add_skin(&mut self, mut skin: Skin) -> usize {
        let index = self.skins.len();
        skin.index = index;
        for &joint in &skin.joints {
            if let Some(node) = self.nodes.get_mut(joint) {
                node.is_joint = true;
            }
        }
        for &mesh_node in &skin.meshes {
            if let Some(node) = self.nodes.get_mut(mesh_node) {
                node.skin = Some(index);
            }
        }
        self.skins.push(skin);
        index
    }

    /// Appends a mesh, optionally placing it on `node`.
    pub fn add_mesh(&mut self, mesh: Mesh, node: Option<usize>) -> usize {
        let index = self.meshes.len();
        self.meshes.push(mesh);
        if let Some(node) = node.and_then(|n| self.nodes.get_mut(n)) {
            node.mesh = Some(index);
        }
        index
    }

    pub fn add_animation(&mut self, mut animation: Animation) -> usize {
        let index = self.animations.len();
        animation.index = index;
        self.animations.push(animation);
        index
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    #[must_use]
    pub fn parent_link(&self, index: usize) -> ParentLink {
        let Some(parent) = self.nodes.get(index).and_then(Node::parent) else {
            return ParentLink::None;
        };
        match self.nodes.get(parent) {
            Some(p) if p.is_joint => ParentLink::Joint(parent),
            Some(_) => ParentLink::Object(parent),
            None => ParentLink::Unresolved(parent),
        }
    }

    /// Host-facing image name: declared name or `Image_<index>`.
    #[must_use]
    pub fn image_name(&self, index: usize) -> String {
        self.images
            .get(index)
            .and_then(|i| i.name.clone())
            .unwrap_or_else(|| format!("Image_{index}"))
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Load-time checks: acyclic hierarchy and in-range table references.
    ///
    /// Dangling parent indices pass; they are reported per node during import.
    pub fn validate(&self) -> Result<()> {
        self.check_acyclic()?;

        let node_count = self.nodes.len();
        let check = |context: &str, index: usize, len: usize| -> Result<()> {
            if index < len {
                Ok(())
            } else {
                Err(RigError::IndexOutOfBounds {
                    context: context.to_string(),
                    index,
                })
            }
        };

        for node in &self.nodes {
            if let Some(mesh) = node.mesh {
                check(&format!("node {} mesh", node.index), mesh, self.meshes.len())?;
            }
            if let Some(skin) = node.skin {
                check(&format!("node {} skin", node.index), skin, self.skins.len())?;
            }
        }

        for skin in &self.skins {
            for &joint in &skin.joints {
                check(&format!("skin {} joint", skin.index), joint, node_count)?;
            }
            for &mesh_node in &skin.meshes {
                check(&format!("skin {} mesh node", skin.index), mesh_node, node_count)?;
            }
        }

        for animation in &self.animations {
            for channel in &animation.channels {
                check(
                    &format!("animation {} channel target", animation.index),
                    channel.node,
                    node_count,
                )?;
            }
        }

        for (i, texture) in self.textures.iter().enumerate() {
            check(&format!("texture {i} source"), texture.source, self.images.len())?;
            if let Some(sampler) = texture.sampler {
                check(&format!("texture {i} sampler"), sampler, self.samplers.len())?;
            }
        }

        Ok(())
    }

    fn check_acyclic(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut path = Vec::new();

        for start in 0..self.nodes.len() {
            if marks[start] != Mark::Unvisited {
                continue;
            }

            let mut current = Some(start);
            while let Some(index) = current {
                match marks.get(index).copied() {
                    Some(Mark::Unvisited) => {
                        marks[index] = Mark::InProgress;
                        path.push(index);
                        current = self.nodes[index].parent;
                    }
                    Some(Mark::InProgress) => {
                        return Err(RigError::CyclicHierarchy { node: index });
                    }
                    // Done, or a dangling index
                    _ => break,
                }
            }

            for index in path.drain(..) {
                marks[index] = Mark::Done;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_is_rejected() {
        let mut doc = Document::new();
        let a = doc.add_node(Some("a"), Trs::IDENTITY);
        let b = doc.add_node(Some("b"), Trs::IDENTITY);
        doc.attach(b, a);
        doc.nodes[a].set_parent(Some(b));

        assert!(matches!(doc.validate(), Err(RigError::CyclicHierarchy { .. })));
    }

    #[test]
    fn test_dangling_parent_is_tolerated() {
        let mut doc = Document::new();
        let a = doc.add_node(None, Trs::IDENTITY);
        doc.nodes[a].set_parent(Some(42));

        assert!(doc.validate().is_ok());
        assert_eq!(doc.parent_link(a), ParentLink::Unresolved(42));
    }
}
