use glam::{Quat, Vec3};

/// Node property targeted by an animation channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelPath {
    Translation, // Maps to pose location
    Rotation,    // Maps to pose rotation_quaternion
    Scale,       // Maps to pose scale
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpolation {
    Step,
    Linear,
    CubicSpline,
}

/// Keyframe times and values of one channel.
///
/// For `CubicSpline`, `values` holds three entries per key: in-tangent,
/// value, out-tangent.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: Interpolation,
}

impl<T: Copy> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: Interpolation) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    fn stride(&self) -> usize {
        match self.interpolation {
            Interpolation::CubicSpline => 3,
            _ => 1,
        }
    }

    /// Checks the value count against the key count.
    pub fn check(&self) -> Result<(), String> {
        let expected = self.times.len() * self.stride();
        if self.values.len() != expected {
            return Err(format!(
                "{} keys need {expected} values, found {}",
                self.times.len(),
                self.values.len()
            ));
        }
        if self.times.iter().any(|t| !t.is_finite()) {
            return Err("non-finite key time".to_string());
        }
        Ok(())
    }

    /// Unified value accessor. For `CubicSpline` the value sits at `index * 3 + 1`.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<T> {
        match self.interpolation {
            Interpolation::CubicSpline => self.values.get(index * 3 + 1).copied(),
            _ => self.values.get(index).copied(),
        }
    }

    /// `(in_tangent, out_tangent)` of a `CubicSpline` key.
    #[must_use]
    pub fn tangents_at(&self, index: usize) -> Option<(T, T)> {
        if self.interpolation != Interpolation::CubicSpline {
            return None;
        }
        let base = index * 3;
        Some((*self.values.get(base)?, *self.values.get(base + 2)?))
    }

    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.times.windows(2).all(|w| w[0] <= w[1])
    }

    /// Key indices in non-decreasing time order; ties keep their stored order.
    #[must_use]
    pub fn time_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.times.len()).collect();
        if !self.is_sorted() {
            order.sort_by(|&a, &b| self.times[a].total_cmp(&self.times[b]));
        }
        order
    }

    /// `(time, value)` pairs in time order.
    pub fn keyframes(&self) -> impl Iterator<Item = (f32, T)> + '_ {
        self.time_order()
            .into_iter()
            .filter_map(|i| Some((self.times[i], self.value_at(i)?)))
    }
}

#[derive(Debug, Clone)]
pub enum ChannelData {
    Translation(KeyframeTrack<Vec3>),
    Rotation(KeyframeTrack<Quat>),
    Scale(KeyframeTrack<Vec3>),
}

/// One animated property of one node.
#[derive(Debug, Clone)]
pub struct Channel {
    pub node: usize,
    pub data: ChannelData,
}

impl Channel {
    #[must_use]
    pub fn new(node: usize, data: ChannelData) -> Self {
        Self { node, data }
    }

    #[must_use]
    pub fn path(&self) -> ChannelPath {
        match self.data {
            ChannelData::Translation(_) => ChannelPath::Translation,
            ChannelData::Rotation(_) => ChannelPath::Rotation,
            ChannelData::Scale(_) => ChannelPath::Scale,
        }
    }

    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        match &self.data {
            ChannelData::Translation(t) | ChannelData::Scale(t) => t.interpolation,
            ChannelData::Rotation(t) => t.interpolation,
        }
    }

    pub fn check(&self) -> Result<(), String> {
        match &self.data {
            ChannelData::Translation(t) | ChannelData::Scale(t) => t.check(),
            ChannelData::Rotation(t) => t.check(),
        }
    }

    #[must_use]
    pub fn is_sorted(&self) -> bool {
        match &self.data {
            ChannelData::Translation(t) | ChannelData::Scale(t) => t.is_sorted(),
            ChannelData::Rotation(t) => t.is_sorted(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Animation {
    pub index: usize,
    pub name: Option<String>,
    pub channels: Vec<Channel>,
}

impl Animation {
    #[must_use]
    pub fn new(index: usize, name: Option<String>, channels: Vec<Channel>) -> Self {
        Self {
            index,
            name,
            channels,
        }
    }

    /// Name of the keyframe container for this animation on `object_name`.
    #[must_use]
    pub fn container_name(&self, object_name: &str) -> String {
        match &self.name {
            Some(name) => format!("{name}_{object_name}"),
            None => format!("Animation_{}_{object_name}", self.index),
        }
    }
}
