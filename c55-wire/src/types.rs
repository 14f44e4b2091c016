//! Data types of the c55 wire format.
//!
//! Derive macros `WireSerialize` and `WireDeserialize` are used to
//! produce ser/deser methods for the plain record structs below. The order of
//! the fields inside the struct determines the order in which they are
//! serialized/deserialized, so be careful modifying anything below.
//! Their serialized representation must stay the same.

mod arrays;
mod binary;
mod compressed;
mod map_block;
mod map_node;
mod node_metadata;
mod primitives;
mod static_object;
mod vectors;

pub use arrays::*;
pub use binary::*;
pub use compressed::*;
pub use map_block::*;
pub use map_node::*;
pub use node_metadata::*;
pub use static_object::*;
