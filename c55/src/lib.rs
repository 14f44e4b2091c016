//! The c55 voxel storage codec.
//!
//! This meta-package bundles the node model of [`c55_core`] with the versioned codecs of
//! [`c55_wire`].

pub use c55_core;
pub use c55_wire;
