#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod document;
pub mod errors;
pub mod host;
pub mod loaders;
pub mod math;
pub mod rig;
pub mod settings;

pub use document::{Animation, Channel, ChannelData, Document, KeyframeTrack, Mesh, Node, Primitive, Skin};
pub use errors::{ImportIssue, ImportLog, Result, RigError};
pub use host::{HostMode, MemoryHost, ModeScope, SceneHost};
pub use math::{PoseTransform, Trs};
pub use rig::{ImportReport, PoseReconciler, RigImporter};
pub use settings::{ImportSettings, NonJointParentPolicy, RotationContinuity};
