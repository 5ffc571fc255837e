//! Rig import
//!
//! - [`bind_pose`]: armatures, bones, bind matrices and rest poses
//! - [`reconcile`]: local transform to pose-bone conversion
//! - [`player`]: animation channels to host keyframes
//! - [`skin_binder`]: vertex groups, weights and deform modifiers
//! - [`texture`]: image texture node settings
//! - [`session`]: the whole import in order

pub mod bind_pose;
pub mod player;
pub mod reconcile;
pub mod session;
pub mod skin_binder;
pub mod texture;

pub use bind_pose::{BindPoseBuilder, BuiltArmature};
pub use player::AnimationPlayer;
pub use reconcile::{BindContext, PoseReconciler};
pub use session::{ImportReport, RigImporter};
pub use skin_binder::SkinBinder;
pub use texture::{texture_settings, wire_texture};
