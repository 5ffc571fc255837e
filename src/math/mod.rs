//! Transform math
//!
//! - [`affine`]: composition, shear-aware decomposition, closed-form inverses
//!   and armature-space composition.
//! - [`axis`]: glTF Y-up to target Z-up conversion.
//! - [`transform`]: the [`Trs`] and [`PoseTransform`] value types.

pub mod affine;
pub mod axis;
pub mod transform;

pub use transform::{PoseTransform, Trs};
