//! Encoding of a single node, as used for node updates.
//!
//! | version | bytes                          |
//! |---------|--------------------------------|
//! | 0       | `content`                      |
//! | 1 - 9   | `content`, `param`             |
//! | 10 -    | `content`, `param`, `param2`   |
//!
//! Version 1 streams never carried valid light. On decode the stored `param` is replaced by `0`
//! for every content which propagates or emits light.
//!
//! Whole blocks don't use this encoding; see [`MapBlockNodes`](c55_core::MapBlockNodes).

use anyhow::bail;
use c55_core::{ContentId, MapNode};

use crate::wire::{
    context::WireContext,
    deser::{Deserialize, DeserializeError, DeserializeResult, Deserializer},
    ser::{Serialize, SerializeError, SerializeResult, Serializer, SliceSerializer, VecSerializer},
    version::ser_ver_supported,
};

/// One byte of a serialized node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeField {
    Content,
    Param,
    Param2,
}

impl NodeField {
    fn get(self, node: &MapNode) -> u8 {
        match self {
            Self::Content => node.content.0,
            Self::Param => node.param_byte(),
            Self::Param2 => node.param2,
        }
    }

    fn set(self, node: &mut MapNode, byte: u8) {
        match self {
            Self::Content => node.content = ContentId(byte),
            Self::Param => node.set_param_byte(byte),
            Self::Param2 => node.param2 = byte,
        }
    }
}

/// The fields a serialization version carries, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLayout {
    pub fields: &'static [NodeField],
    /// `false` if a stored light level must not be used.
    pub trusts_stored_light: bool,
}

/// Each layout is used from its version up to the next entry.
const NODE_LAYOUTS: [(u8, NodeLayout); 4] = [
    (
        0,
        NodeLayout {
            fields: &[NodeField::Content],
            trusts_stored_light: true,
        },
    ),
    (
        1,
        NodeLayout {
            fields: &[NodeField::Content, NodeField::Param],
            trusts_stored_light: false,
        },
    ),
    (
        2,
        NodeLayout {
            fields: &[NodeField::Content, NodeField::Param],
            trusts_stored_light: true,
        },
    ),
    (
        10,
        NodeLayout {
            fields: &[NodeField::Content, NodeField::Param, NodeField::Param2],
            trusts_stored_light: true,
        },
    ),
];

impl NodeLayout {
    /// Returns the layout of the given version or `None` if it isn't supported.
    #[must_use]
    pub fn for_version(version: u8) -> Option<&'static Self> {
        if !ser_ver_supported(version) {
            return None;
        }
        NODE_LAYOUTS
            .iter()
            .rev()
            .find(|(first, _)| *first <= version)
            .map(|(_, layout)| layout)
    }

    /// Number of bytes of a serialized node.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always `false`; every version carries the content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Returns the number of bytes a single node occupies in the given version.
pub fn serialized_length(version: u8) -> SerializeResult<usize> {
    match NodeLayout::for_version(version) {
        Some(layout) => Ok(layout.len()),
        None => bail!(SerializeError::VersionMismatch(version)),
    }
}

impl Serialize for MapNode {
    type Input = Self;

    fn serialize<S: Serializer>(value: &Self::Input, serializer: &mut S) -> SerializeResult {
        let version = serializer.context().ser_fmt;
        let Some(layout) = NodeLayout::for_version(version) else {
            bail!(SerializeError::VersionMismatch(version));
        };
        serializer.write(layout.len(), |buf| {
            for (byte, field) in buf.iter_mut().zip(layout.fields) {
                *byte = field.get(value);
            }
        })
    }
}

impl Deserialize for MapNode {
    type Output = Self;

    fn deserialize(deserializer: &mut Deserializer<'_>) -> DeserializeResult<Self::Output> {
        let version = deserializer.context().ser_fmt;
        let Some(layout) = NodeLayout::for_version(version) else {
            bail!(DeserializeError::VersionMismatch(version));
        };
        let bytes = deserializer.take(layout.len())?;
        let mut node = MapNode::default();
        for (field, byte) in layout.fields.iter().zip(bytes) {
            field.set(&mut node, *byte);
        }
        if !layout.trusts_stored_light
            && (node.content.light_propagates() || node.content.light_source() > 0)
        {
            node.param = 0;
        }
        Ok(node)
    }
}

/// Serializes a single node into a new buffer.
pub fn serialize_node(node: &MapNode, version: u8) -> SerializeResult<Vec<u8>> {
    let length = serialized_length(version)?;
    let mut ser = VecSerializer::new(WireContext::for_version(version), length);
    MapNode::serialize(node, &mut ser)?;
    Ok(ser.take())
}

/// Serializes a single node to the start of `dest` and returns the number of bytes written.
///
/// Nothing is written if the version isn't supported or `dest` is too short.
pub fn serialize_node_into(node: &MapNode, dest: &mut [u8], version: u8) -> SerializeResult<usize> {
    let length = serialized_length(version)?;
    let mut ser = SliceSerializer::new(WireContext::for_version(version), dest);
    MapNode::serialize(node, &mut ser)?;
    debug_assert_eq!(ser.written(), length, "node layout and serializer disagree");
    Ok(length)
}

/// Deserializes a single node from the start of `data`.
///
/// Bytes past the node are ignored.
pub fn deserialize_node(data: &[u8], version: u8) -> DeserializeResult<MapNode> {
    let mut deser = Deserializer::new(WireContext::for_version(version), data);
    MapNode::deserialize(&mut deser)
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use crate::wire::version::SER_FMT_VER_HIGHEST;

    use super::*;

    #[test]
    fn concrete_bytes() {
        let node = MapNode::with_params(ContentId::AIR, 7, 0);
        assert_eq!(serialize_node(&node, 10).unwrap(), [254, 7, 0]);
        assert_eq!(serialize_node(&node, 0).unwrap(), [254]);
        assert_eq!(serialize_node(&node, 5).unwrap(), [254, 7]);
        assert_eq!(
            serialize_node(&MapNode::with_params(ContentId::STONE, -1, 0x21), 17).unwrap(),
            [0, 0xff, 0x21]
        );
    }

    #[test]
    fn version_one_ignores_stored_light() {
        assert_eq!(deserialize_node(&[254, 7], 1).unwrap().param, 0);
        assert_eq!(deserialize_node(&[3, 7], 1).unwrap().param, 0);
        assert_eq!(deserialize_node(&[2, 7], 1).unwrap().param, 0);
        // opaque materials keep the raw byte
        assert_eq!(deserialize_node(&[0, 7], 1).unwrap().param, 7);
        // later versions trust it
        assert_eq!(deserialize_node(&[254, 7], 2).unwrap().param, 7);
    }

    #[test]
    fn lengths() {
        assert_eq!(serialized_length(0).unwrap(), 1);
        for version in 1..=9 {
            assert_eq!(serialized_length(version).unwrap(), 2);
        }
        for version in 10..=SER_FMT_VER_HIGHEST {
            assert_eq!(serialized_length(version).unwrap(), 3);
        }
        assert!(serialized_length(SER_FMT_VER_HIGHEST + 1).is_err());
    }

    #[test]
    fn unsupported_version() {
        let node = MapNode::with_params(ContentId::MESE, 1, 2);
        let mut dest = [0xaa; 8];

        let err = serialize_node_into(&node, &mut dest, 18).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SerializeError>(),
            Some(SerializeError::VersionMismatch(18))
        ));
        assert_eq!(dest, [0xaa; 8]);

        let err = deserialize_node(&[7, 1, 2], 18).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeserializeError>(),
            Some(DeserializeError::VersionMismatch(18))
        ));
    }

    #[test]
    fn short_destination_is_untouched() {
        let node = MapNode::with_params(ContentId::MESE, 1, 2);
        let mut dest = [0xaa; 2];
        assert!(serialize_node_into(&node, &mut dest, 10).is_err());
        assert_eq!(dest, [0xaa; 2]);

        let mut dest = [0xaa; 4];
        assert_eq!(serialize_node_into(&node, &mut dest, 10).unwrap(), 3);
        assert_eq!(dest, [7, 1, 2, 0xaa]);
    }

    #[test]
    fn truncated_node() {
        let err = deserialize_node(&[7, 1], 10).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeserializeError>(),
            Some(DeserializeError::Eof { .. })
        ));
    }

    #[test]
    fn random_round_trip() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..2000 {
            let node = MapNode::with_params(
                ContentId(rng.random()),
                rng.random(),
                rng.random(),
            );
            for version in 0..=SER_FMT_VER_HIGHEST {
                let bytes = serialize_node(&node, version).unwrap();
                let decoded = deserialize_node(&bytes, version).unwrap();
                let content = node.content;

                let mut expected = MapNode::new(content);
                if version >= 1 {
                    expected.param = node.param;
                }
                if version == 1 && (content.light_propagates() || content.light_source() > 0) {
                    expected.param = 0;
                }
                if version >= 10 {
                    expected.param2 = node.param2;
                }
                assert_eq!(decoded, expected, "version {version}, node {node:?}");
            }
        }
    }
}
