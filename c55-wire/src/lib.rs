//! Versioned wire codec for c55 map nodes and map blocks.
//!
//! Single nodes are written with [`serialize_node`] and read with [`deserialize_node`]. Whole
//! blocks go through [`serialize_map_block`] and [`deserialize_map_block`]. Every codec takes
//! its version and compression from a [`WireContext`].
//!
//! All failures are reported as [`anyhow::Error`] whose root cause is a [`SerializeError`] or a
//! [`DeserializeError`]; use `downcast_ref` to tell them apart.

#![expect(
    missing_docs,
    clippy::missing_errors_doc,
    reason = "the wire types mirror the byte layouts documented on their modules"
)]

pub mod types;
pub mod wire;

pub use types::{
    BlockTimestamp, FixedPos, MapBlock, NodeMetadata, NodeMetadataList, StaticObject,
    StaticObjectList, StoredMapBlock, deserialize_map_block, deserialize_node, serialize_map_block,
    serialize_node, serialize_node_into, serialized_length,
};
pub use wire::context::{Compression, WireContext};
pub use wire::deser::DeserializeError;
pub use wire::ser::SerializeError;
pub use wire::version::{SER_FMT_VER_HIGHEST, SER_FMT_VER_LOWEST};
