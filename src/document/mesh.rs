use smallvec::SmallVec;

/// Maximum joint influences per vertex in one `JOINTS_n`/`WEIGHTS_n` set.
pub const MAX_INFLUENCES: usize = 4;

/// Skinning-relevant view of a glTF mesh primitive.
#[derive(Debug, Clone, Default)]
pub struct Primitive {
    pub vertex_count: usize,
    /// `JOINTS_0`: per-vertex joint slots into the skin's joint list.
    pub joints: Option<Vec<[u16; MAX_INFLUENCES]>>,
    /// `WEIGHTS_0`: per-vertex weights, index-aligned with `joints`.
    pub weights: Option<Vec<[f32; MAX_INFLUENCES]>>,
}

impl Primitive {
    #[must_use]
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            joints: None,
            weights: None,
        }
    }

    #[must_use]
    pub fn with_skinning(
        mut self,
        joints: Vec<[u16; MAX_INFLUENCES]>,
        weights: Vec<[f32; MAX_INFLUENCES]>,
    ) -> Self {
        self.joints = Some(joints);
        self.weights = Some(weights);
        self
    }

    #[inline]
    #[must_use]
    pub fn has_skinning(&self) -> bool {
        self.joints.is_some() && self.weights.is_some()
    }

    /// Non-zero `(joint slot, weight)` pairs of a vertex.
    ///
    /// Zero weights are dropped: padding entries commonly point at slot 0
    /// without meaning that joint 0 influences the vertex.
    #[must_use]
    pub fn influences(&self, vertex: usize) -> SmallVec<[(u16, f32); MAX_INFLUENCES]> {
        let (Some(joints), Some(weights)) = (&self.joints, &self.weights) else {
            return SmallVec::new();
        };
        let (Some(joint_row), Some(weight_row)) = (joints.get(vertex), weights.get(vertex)) else {
            return SmallVec::new();
        };

        joint_row
            .iter()
            .zip(weight_row.iter())
            .filter(|&(_, &w)| w != 0.0)
            .map(|(&j, &w)| (j, w))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

impl Mesh {
    #[must_use]
    pub fn new(primitives: Vec<Primitive>) -> Self {
        Self {
            name: None,
            primitives,
        }
    }
}
