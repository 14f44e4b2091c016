//! Contains the core types of the c55 voxel format: the node model, the content
//! classification table and the light and direction codecs.
//!
//! Everything in here is a pure function of its inputs and the constant classification table,
//! so all of it may be used concurrently from any number of threads.

mod content_features;
mod content_id;
mod direction;
mod light;
mod map_block;
mod map_node;

pub use content_features::*;
pub use content_id::*;
pub use direction::*;
pub use light::*;
pub use map_block::*;
pub use map_node::*;
