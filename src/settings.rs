//! Import settings.
//!
//! Every field has a default, so a settings file only needs the keys it
//! changes:
//!
//! ```rust,ignore
//! let settings = ImportSettings::from_json_str(r#"{ "frame_rate": 30.0 }"#)?;
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Rotation sign handling between consecutive reconciled keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationContinuity {
    /// Re-express the rotation through XYZ Euler angles whenever the parent
    /// bind rotation is not identity.
    #[default]
    EulerRoundTrip,
    /// Flip the quaternion onto the hemisphere of the previous key.
    Hemisphere,
    Off,
}

/// Parent transform used for a joint whose parent is not a joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonJointParentPolicy {
    /// The armature object already carries the parent; use identity.
    #[default]
    Identity,
    /// Use the parent object's world matrix.
    ObjectWorldMatrix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Target frames per second; key times in seconds are multiplied by it.
    pub frame_rate: f32,
    pub rotation_continuity: RotationContinuity,
    pub non_joint_parent: NonJointParentPolicy,
    pub import_animations: bool,
    pub import_skin_weights: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            frame_rate: 24.0,
            rotation_continuity: RotationContinuity::default(),
            non_joint_parent: NonJointParentPolicy::default(),
            import_animations: true,
            import_skin_weights: true,
        }
    }
}

impl ImportSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    #[must_use]
    pub fn with_frame_rate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = frame_rate;
        self.sanitized()
    }

    #[must_use]
    pub fn with_rotation_continuity(mut self, mode: RotationContinuity) -> Self {
        self.rotation_continuity = mode;
        self
    }

    #[must_use]
    pub fn with_non_joint_parent(mut self, policy: NonJointParentPolicy) -> Self {
        self.non_joint_parent = policy;
        self
    }

    fn sanitized(mut self) -> Self {
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            log::warn!(
                "Invalid frame rate {}; falling back to {}",
                self.frame_rate,
                Self::default().frame_rate
            );
            self.frame_rate = Self::default().frame_rate;
        }
        self
    }
}
