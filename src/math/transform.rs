use glam::{EulerRot, Mat4, Quat, Vec3};

/// A decomposed affine transform: translation, rotation and non-uniform scale.
///
/// Used for glTF node-local transforms (source axis space) as well as for
/// decomposed bind matrices (target axis space). The space is a property of
/// where the value came from; the type does not track it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trs {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Trs {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// glTF-style raw arrays. Rotation is `[x, y, z, w]`.
    #[must_use]
    pub fn from_arrays(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        Self {
            translation: Vec3::from_array(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from_array(scale),
        }
    }

    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    #[must_use]
    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.translation.abs_diff_eq(other.translation, max_abs_diff)
            && quat_eq(self.rotation, other.rotation, max_abs_diff)
            && self.scale.abs_diff_eq(other.scale, max_abs_diff)
    }
}

impl Default for Trs {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A bone transform expressed relative to its own bind matrix.
///
/// This is what the host stores per pose bone and per keyframe. The rest
/// state is [`PoseTransform::IDENTITY`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseTransform {
    pub location: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl PoseTransform {
    pub const IDENTITY: Self = Self {
        location: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new(location: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            location,
            rotation,
            scale,
        }
    }

    /// Helper: rotation as XYZ Euler angles.
    #[must_use]
    pub fn rotation_euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    /// Helper: sets the rotation from XYZ Euler angles.
    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }

    /// Matrix of the pose relative to the bind matrix (`T * R * S`).
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.location)
    }

    #[must_use]
    pub fn is_identity(&self, max_abs_diff: f32) -> bool {
        self.abs_diff_eq(&Self::IDENTITY, max_abs_diff)
    }

    /// Quaternions are compared up to sign, `q` and `-q` being the same rotation.
    #[must_use]
    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.location.abs_diff_eq(other.location, max_abs_diff)
            && quat_eq(self.rotation, other.rotation, max_abs_diff)
            && self.scale.abs_diff_eq(other.scale, max_abs_diff)
    }
}

impl Default for PoseTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn quat_eq(a: Quat, b: Quat, max_abs_diff: f32) -> bool {
    a.abs_diff_eq(b, max_abs_diff) || a.abs_diff_eq(-b, max_abs_diff)
}
