//! Low-level plumbing of the wire format: the (de)serializer traits, the context every codec
//! receives, version constants and compression helpers.

pub mod context;
pub mod deser;
pub mod ser;
pub mod util;
pub mod version;
