//! Asset loaders producing a [`Document`](crate::document::Document).

#[cfg(feature = "gltf")]
pub mod gltf;

#[cfg(feature = "gltf")]
pub use self::gltf::{from_gltf, load};
