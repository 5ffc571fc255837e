//! Error Types
//!
//! This module defines the error types used throughout the importer.
//!
//! # Overview
//!
//! Two kinds of failure exist:
//! - [`RigError`]: fatal conditions that stop an import before it mutates the
//!   host (malformed documents, unreadable settings, loader failures).
//! - [`ImportIssue`]: recoverable data-quality problems found while importing a
//!   single joint, primitive or channel. They are collected in an [`ImportLog`]
//!   and the import carries on with a degraded result.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, RigError>`.
//!
//! ```rust,ignore
//! use rigport::errors::{RigError, Result};
//!
//! fn check(doc: &rigport::Document) -> Result<()> {
//!     doc.validate()
//! }
//! ```

use thiserror::Error;

use crate::document::ChannelPath;

/// The main error type for the importer.
#[derive(Error, Debug)]
pub enum RigError {
    // ========================================================================
    // Document Errors
    // ========================================================================
    /// A node's parent chain loops back onto itself.
    #[error("Cyclic node hierarchy detected at node {node}")]
    CyclicHierarchy {
        /// First node found on the cycle
        node: usize,
    },

    /// A reference points past the end of a document table.
    #[error("Index out of bounds: {context} (index: {index})")]
    IndexOutOfBounds {
        /// Description of what was being accessed
        context: String,
        /// The invalid index
        index: usize,
    },

    // ========================================================================
    // Math Errors
    // ========================================================================
    /// The matrix carries shear and cannot be split into TRS exactly.
    #[error("Transform contains shear (max basis skew {skew:.6})")]
    ShearedTransform {
        /// Largest absolute cosine between two basis vectors
        skew: f32,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Import settings could not be parsed.
    #[error("Settings parse error: {0}")]
    SettingsError(#[from] serde_json::Error),

    // ========================================================================
    // I/O & Format Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// glTF parsing or loading error.
    #[cfg(feature = "gltf")]
    #[error("glTF error: {0}")]
    GltfError(String),
}

#[cfg(feature = "gltf")]
impl From<gltf::Error> for RigError {
    fn from(err: gltf::Error) -> Self {
        RigError::GltfError(err.to_string())
    }
}

/// Alias for `Result<T, RigError>`.
pub type Result<T> = std::result::Result<T, RigError>;

// ============================================================================
// Recoverable import diagnostics
// ============================================================================

/// How loudly an [`ImportIssue`] is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// A recoverable problem in the source asset.
///
/// Every variant is scoped to a single joint, primitive or channel; the
/// importer substitutes a neutral value and continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportIssue {
    /// The joint has no inverse-bind matrix; its bind matrix fell back to identity.
    #[error("No inverse bind matrix for joint node {node} in skin {skin}")]
    MissingBindData { skin: usize, node: usize },

    /// The primitive has no `JOINTS_0`/`WEIGHTS_0` pair; its vertices stay unweighted.
    #[error("Primitive {primitive} of mesh {mesh} has no skinning attributes")]
    MissingSkinningAttributes { mesh: usize, primitive: usize },

    /// The parent could not be resolved and was treated as absent.
    #[error("Node {node} references unresolved parent {parent}")]
    UnresolvedParentReference { node: usize, parent: usize },

    /// A `JOINTS_0` entry points past the end of the skin's joint list.
    #[error("Joint index {joint} out of range for skin {skin} ({joint_count} joints)")]
    InvalidJointIndex {
        skin: usize,
        joint: usize,
        joint_count: usize,
    },

    /// A channel targets a joint that never received a bone.
    #[error("Animation {animation} channel targets node {node} which has no bone")]
    UnboundChannelTarget { animation: usize, node: usize },

    /// Key and value counts of a channel disagree.
    #[error("Animation {animation} {path:?} channel on node {node} is malformed: {reason}")]
    MalformedChannel {
        animation: usize,
        node: usize,
        path: ChannelPath,
        reason: String,
    },

    /// The inverse-bind matrix cannot be inverted; the bind matrix fell back to identity.
    #[error("Inverse bind matrix of joint node {node} in skin {skin} is singular")]
    SingularBindMatrix { skin: usize, node: usize },

    /// The joint's bind matrix carries shear; TRS decomposition is approximate.
    #[error("Bind matrix of joint node {node} contains shear")]
    ShearedBindMatrix { node: usize },

    /// A skinned mesh node has no object in the host scene.
    #[error("Mesh node {node} bound to skin {skin} has no host object")]
    MissingMeshObject { skin: usize, node: usize },
}

impl ImportIssue {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            ImportIssue::UnresolvedParentReference { .. } | ImportIssue::ShearedBindMatrix { .. } => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }
}

/// Import-session diagnostic log.
///
/// Issues are forwarded to the `log` facade as they are recorded and kept for
/// the caller to surface once the import finishes.
#[derive(Debug, Default, Clone)]
pub struct ImportLog {
    issues: Vec<ImportIssue>,
}

impl ImportLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `issue` unless an identical one is already in the log.
    pub fn record(&mut self, issue: ImportIssue) {
        if self.issues.contains(&issue) {
            return;
        }
        match issue.severity() {
            Severity::Warning => log::warn!("{issue}"),
            Severity::Error => log::error!("{issue}"),
        }
        self.issues.push(issue);
    }

    #[inline]
    #[must_use]
    pub fn issues(&self) -> &[ImportIssue] {
        &self.issues
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of recorded issues at [`Severity::Error`].
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity() == Severity::Error)
            .count()
    }

    #[must_use]
    pub fn into_issues(self) -> Vec<ImportIssue> {
        self.issues
    }
}
