//! Encoding of a whole map block.
//!
//! Layout, all integers big endian:
//!
//! | field          | size      | present from version |
//! |----------------|-----------|----------------------|
//! | version        | 1         | 11                   |
//! | flags          | 1         | 11                   |
//! | node planes    | zlib/zstd | 11                   |
//! | node metadata  | zlib/zstd | 14                   |
//! | legacy objects | 2         | 11                   |
//! | static objects | variable  | 15                   |
//! | timestamp      | 4         | 17                   |
//!
//! Sections a version lacks decode to their empty value and are dropped on encode.

use anyhow::bail;
use c55_core::{MapBlockNodes, MapBlockPos};
use c55_wire_derive::{WireDeserialize, WireSerialize};
use log::{debug, trace, warn};

use crate::wire::{
    context::WireContext,
    deser::{Deserialize, DeserializeError, DeserializeResult, Deserializer},
    ser::{Serialize, SerializeError, SerializeResult, Serializer, VecSerializer},
    version::block_ser_ver_supported,
};

use super::{Compressed, NodeMetadataList, StaticObjectList};

const NODE_COUNT: usize = MapBlockPos::NODE_COUNT as usize;

/// The time a map block has been saved, in seconds since an epoch chosen by the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, WireSerialize, WireDeserialize)]
pub struct BlockTimestamp(pub u32);

impl BlockTimestamp {
    /// The save time is unknown.
    pub const UNDEFINED: Self = Self(u32::MAX);

    #[must_use]
    pub fn seconds(self) -> Option<u32> {
        (self != Self::UNDEFINED).then_some(self.0)
    }

    /// Seconds passed between saving and `now`.
    ///
    /// Returns `None` for an unknown save time so that no time based updates are applied.
    #[must_use]
    pub fn elapsed(self, now: u32) -> Option<u32> {
        self.seconds().map(|saved| now.saturating_sub(saved))
    }
}

impl Default for BlockTimestamp {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

/// A cube of 16³ nodes together with everything stored alongside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapBlock {
    /// Should be set to `false` if there will be no light obstructions above the block.
    pub is_underground: bool,

    /// Whether the lighting of the block is different on day and night.
    /// Only blocks that have this bit set are updated when day transforms to night.
    pub day_night_differs: bool,

    /// The light of this block needs to be recomputed.
    pub lighting_expired: bool,

    pub nodes: MapBlockNodes,

    pub node_metadata: NodeMetadataList,

    pub static_objects: StaticObjectList,

    pub timestamp: BlockTimestamp,
}

impl Default for MapBlock {
    /// An above-ground block of air whose light has yet to be computed.
    fn default() -> Self {
        Self {
            is_underground: false,
            day_night_differs: false,
            lighting_expired: true,
            nodes: MapBlockNodes::default(),
            node_metadata: NodeMetadataList::default(),
            static_objects: StaticObjectList::default(),
            timestamp: BlockTimestamp::UNDEFINED,
        }
    }
}

/// The optional sections of a map block version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    pub node_metadata: bool,
    pub static_objects: bool,
    pub timestamp: bool,
}

/// Each layout is used from its version up to the next entry.
const BLOCK_LAYOUTS: [(u8, BlockLayout); 4] = [
    (
        11,
        BlockLayout {
            node_metadata: false,
            static_objects: false,
            timestamp: false,
        },
    ),
    (
        14,
        BlockLayout {
            node_metadata: true,
            static_objects: false,
            timestamp: false,
        },
    ),
    (
        15,
        BlockLayout {
            node_metadata: true,
            static_objects: true,
            timestamp: false,
        },
    ),
    (
        17,
        BlockLayout {
            node_metadata: true,
            static_objects: true,
            timestamp: true,
        },
    ),
];

impl BlockLayout {
    /// Returns the layout of the given version or `None` if it isn't supported.
    #[must_use]
    pub fn for_version(version: u8) -> Option<&'static Self> {
        if !block_ser_ver_supported(version) {
            return None;
        }
        BLOCK_LAYOUTS
            .iter()
            .rev()
            .find(|(first, _)| *first <= version)
            .map(|(_, layout)| layout)
    }
}

///
/// This is a helper for `MapBlock` ser/deser
/// Not exposed publicly.
#[derive(Debug)]
struct MapBlockHeader {
    is_underground: bool,
    day_night_differs: bool,
    lighting_expired: bool,
}

impl MapBlockHeader {
    const IS_UNDERGROUND: u8 = 0x01;
    const DAY_NIGHT_DIFFERS: u8 = 0x02;
    const LIGHTING_EXPIRED: u8 = 0x04;
    const ALL: u8 = Self::IS_UNDERGROUND | Self::DAY_NIGHT_DIFFERS | Self::LIGHTING_EXPIRED;
}

impl Serialize for MapBlockHeader {
    type Input = Self;
    fn serialize<S: Serializer>(value: &Self::Input, ser: &mut S) -> SerializeResult {
        let mut flags: u8 = 0;
        if value.is_underground {
            flags |= MapBlockHeader::IS_UNDERGROUND;
        }
        if value.day_night_differs {
            flags |= MapBlockHeader::DAY_NIGHT_DIFFERS;
        }
        if value.lighting_expired {
            flags |= MapBlockHeader::LIGHTING_EXPIRED;
        }
        u8::serialize(&flags, ser)
    }
}

impl Deserialize for MapBlockHeader {
    type Output = Self;
    fn deserialize(deser: &mut Deserializer<'_>) -> DeserializeResult<Self> {
        let flags = u8::deserialize(deser)?;
        if flags & !MapBlockHeader::ALL != 0 {
            bail!(DeserializeError::InvalidValue(format!(
                "invalid MapBlock flags {flags:#04x}"
            )));
        }
        Ok(Self {
            is_underground: flags & MapBlockHeader::IS_UNDERGROUND != 0,
            day_night_differs: flags & MapBlockHeader::DAY_NIGHT_DIFFERS != 0,
            lighting_expired: flags & MapBlockHeader::LIGHTING_EXPIRED != 0,
        })
    }
}

/// The nodes of a block are stored as three planes to make them compress better:
/// all contents, then all `param`s, then all `param2`s.
impl Serialize for MapBlockNodes {
    type Input = Self;
    fn serialize<S: Serializer>(value: &Self::Input, ser: &mut S) -> SerializeResult {
        ser.write(NODE_COUNT, |buf| {
            for (byte, node) in buf.iter_mut().zip(&value.0) {
                *byte = node.content.0;
            }
        })?;
        ser.write(NODE_COUNT, |buf| {
            for (byte, node) in buf.iter_mut().zip(&value.0) {
                *byte = node.param_byte();
            }
        })?;
        ser.write(NODE_COUNT, |buf| {
            for (byte, node) in buf.iter_mut().zip(&value.0) {
                *byte = node.param2;
            }
        })?;
        Ok(())
    }
}

impl Deserialize for MapBlockNodes {
    type Output = Self;
    fn deserialize(deser: &mut Deserializer<'_>) -> DeserializeResult<Self> {
        let contents = deser.take(NODE_COUNT)?;
        let params = deser.take(NODE_COUNT)?;
        let param2s = deser.take(NODE_COUNT)?;
        let mut nodes = MapBlockNodes::default();
        for (((node, content), param), param2) in
            nodes.0.iter_mut().zip(contents).zip(params).zip(param2s)
        {
            node.content.0 = *content;
            node.set_param_byte(*param);
            node.param2 = *param2;
        }
        Ok(nodes)
    }
}

/// Serializes everything after the version byte, using the context's version.
impl Serialize for MapBlock {
    type Input = Self;
    fn serialize<S: Serializer>(value: &Self::Input, ser: &mut S) -> SerializeResult {
        let version = ser.context().ser_fmt;
        let Some(layout) = BlockLayout::for_version(version) else {
            bail!(SerializeError::VersionMismatch(version));
        };
        let header = MapBlockHeader {
            is_underground: value.is_underground,
            day_night_differs: value.day_night_differs,
            lighting_expired: value.lighting_expired,
        };
        MapBlockHeader::serialize(&header, ser)?;
        <Compressed<MapBlockNodes> as Serialize>::serialize(&value.nodes, ser)?;
        if layout.node_metadata {
            <Compressed<NodeMetadataList> as Serialize>::serialize(&value.node_metadata, ser)?;
        } else if !value.node_metadata.is_empty() {
            trace!("dropping node metadata unsupported by version {version}");
        }
        // the legacy object section is always empty
        u16::serialize(&0, ser)?;
        if layout.static_objects {
            StaticObjectList::serialize(&value.static_objects, ser)?;
        }
        if layout.timestamp {
            BlockTimestamp::serialize(&value.timestamp, ser)?;
        }
        Ok(())
    }
}

impl Deserialize for MapBlock {
    type Output = Self;
    fn deserialize(deser: &mut Deserializer<'_>) -> DeserializeResult<Self> {
        let version = deser.context().ser_fmt;
        let Some(layout) = BlockLayout::for_version(version) else {
            bail!(DeserializeError::VersionMismatch(version));
        };
        let header = MapBlockHeader::deserialize(deser)?;
        let nodes = <Compressed<MapBlockNodes> as Deserialize>::deserialize(deser)?;
        let node_metadata = if layout.node_metadata {
            <Compressed<NodeMetadataList> as Deserialize>::deserialize(deser)?
        } else {
            NodeMetadataList::default()
        };
        let legacy_count = u16::deserialize(deser)?;
        if legacy_count != 0 {
            bail!(DeserializeError::MalformedLegacySection(legacy_count));
        }
        let static_objects = if layout.static_objects {
            StaticObjectList::deserialize(deser)?
        } else {
            StaticObjectList::default()
        };
        let timestamp = if layout.timestamp {
            BlockTimestamp::deserialize(deser)?
        } else {
            BlockTimestamp::UNDEFINED
        };
        Ok(Self {
            is_underground: header.is_underground,
            day_night_differs: header.day_night_differs,
            lighting_expired: header.lighting_expired,
            nodes,
            node_metadata,
            static_objects,
            timestamp,
        })
    }
}

/// A map block together with the version it has been stored with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMapBlock {
    pub ser_fmt: u8,
    pub block: MapBlock,
}

/// Serializes a map block including its leading version byte.
///
/// The version and compression are taken from `context`.
pub fn serialize_map_block(block: &MapBlock, context: WireContext) -> SerializeResult<Vec<u8>> {
    let version = context.ser_fmt;
    if BlockLayout::for_version(version).is_none() {
        bail!(SerializeError::VersionMismatch(version));
    }
    let mut ser = VecSerializer::new(context, 0x2000);
    u8::serialize(&version, &mut ser)?;
    MapBlock::serialize(block, &mut ser)?;
    Ok(ser.take())
}

/// Deserializes a map block including its leading version byte.
///
/// The version stored in `data` overrides the one of `context`; the compression and size limit
/// of `context` apply.
pub fn deserialize_map_block(data: &[u8], context: WireContext) -> DeserializeResult<StoredMapBlock> {
    let mut deser = Deserializer::new(context, data);
    let version = u8::deserialize(&mut deser)?;
    if BlockLayout::for_version(version).is_none() {
        bail!(DeserializeError::VersionMismatch(version));
    }
    let mut body = Deserializer::new(
        WireContext {
            ser_fmt: version,
            ..context
        },
        deser.peek_all(),
    );
    let block = MapBlock::deserialize(&mut body)?;
    if body.remaining() > 0 {
        warn!(
            "ignoring {} trailing bytes after map block version {version}",
            body.remaining()
        );
    }
    debug!(
        "decoded map block version {version}: {} metadata entries, {} static objects, timestamp {:?}",
        block.node_metadata.len(),
        block.static_objects.objects.len(),
        block.timestamp.seconds()
    );
    Ok(StoredMapBlock {
        ser_fmt: version,
        block,
    })
}

#[cfg(test)]
mod tests {
    use c55_core::{ContentId, MapNode, MapNodeIndex};
    use glam::{IVec3, U8Vec3};

    use crate::types::{FixedPos, NodeMetadata, StaticObject};
    use crate::wire::{context::Compression, util::compress_zlib};

    use super::*;

    fn index(x: u8, y: u8, z: u8) -> MapNodeIndex {
        MapNodeIndex::from_local(U8Vec3::new(x, y, z)).unwrap()
    }

    fn sample_block() -> MapBlock {
        let mut block = MapBlock {
            is_underground: true,
            day_night_differs: true,
            lighting_expired: false,
            ..MapBlock::default()
        };
        for (position, node) in block.nodes.0.iter_mut().enumerate() {
            if position % 3 == 0 {
                *node = MapNode::with_params(ContentId::STONE, -3, 0);
            } else if position % 7 == 0 {
                *node = MapNode::with_params(ContentId::WATER, 12, 0x80);
            }
        }
        block.nodes[index(1, 2, 3)] = MapNode::with_params(ContentId::LIGHT, 14, 0b01_0000);
        block
            .node_metadata
            .metadata
            .insert(index(1, 2, 3), NodeMetadata::sign("north").unwrap());
        block.node_metadata.metadata.insert(
            index(15, 15, 15),
            NodeMetadata {
                type_id: 1,
                data: vec![1, 2, 3, 4],
            },
        );
        block.static_objects.objects = vec![
            StaticObject {
                type_id: 7,
                pos: FixedPos(IVec3::new(-1500, 2000, 160_250)),
                data: b"rat".to_vec(),
            },
            StaticObject {
                type_id: 9,
                pos: FixedPos::default(),
                data: Vec::new(),
            },
        ];
        block.timestamp = BlockTimestamp(1_234_567);
        block
    }

    fn deser_error(result: DeserializeResult<StoredMapBlock>) -> DeserializeError {
        match result.unwrap_err().downcast::<DeserializeError>() {
            Ok(err) => err,
            Err(err) => panic!("unexpected error type: {err}"),
        }
    }

    #[test]
    fn round_trip() {
        let block = sample_block();
        for compression in [Compression::default(), Compression::Zstd { level: 3 }] {
            let context = WireContext {
                compression,
                ..WireContext::latest()
            };
            let bytes = serialize_map_block(&block, context).unwrap();
            assert_eq!(bytes[0], 17);
            assert_eq!(bytes[1], 0b011);
            assert_eq!(bytes[bytes.len() - 4..], 1_234_567_u32.to_be_bytes());

            let stored = deserialize_map_block(&bytes, context).unwrap();
            assert_eq!(stored.ser_fmt, 17);
            assert_eq!(stored.block, block, "{compression}");
        }
    }

    #[test]
    fn stored_version_wins() {
        let block = sample_block();
        let bytes = serialize_map_block(&block, WireContext::for_version(15)).unwrap();
        let stored = deserialize_map_block(&bytes, WireContext::latest()).unwrap();
        assert_eq!(stored.ser_fmt, 15);
        assert_eq!(stored.block.static_objects, block.static_objects);
    }

    #[test]
    fn older_versions_drop_sections() {
        let block = sample_block();

        let bytes = serialize_map_block(&block, WireContext::for_version(14)).unwrap();
        let decoded = deserialize_map_block(&bytes, WireContext::default())
            .unwrap()
            .block;
        assert_eq!(decoded.nodes, block.nodes);
        assert_eq!(decoded.node_metadata, block.node_metadata);
        assert!(decoded.static_objects.objects.is_empty());
        assert_eq!(decoded.timestamp, BlockTimestamp::UNDEFINED);

        let bytes = serialize_map_block(&block, WireContext::for_version(11)).unwrap();
        let decoded = deserialize_map_block(&bytes, WireContext::default())
            .unwrap()
            .block;
        assert_eq!(decoded.nodes, block.nodes);
        assert!(decoded.node_metadata.is_empty());
        // version, flags, nodes, legacy count
        assert_eq!(bytes[bytes.len() - 2..], [0, 0]);
    }

    #[test]
    fn legacy_objects_are_rejected() {
        let block = MapBlock::default();
        let mut bytes = serialize_map_block(&block, WireContext::latest()).unwrap();
        // legacy count, empty static objects, timestamp
        let legacy = bytes.len() - (2 + 3 + 4);
        assert_eq!(bytes[legacy..legacy + 2], [0, 0]);
        bytes[legacy + 1] = 1;
        assert!(matches!(
            deser_error(deserialize_map_block(&bytes, WireContext::latest())),
            DeserializeError::MalformedLegacySection(1)
        ));
    }

    #[test]
    fn unsupported_versions() {
        for version in [0, 10, 18, u8::MAX] {
            // nothing past the version byte is looked at
            let bytes = [version, 0xff, 0xff];
            assert!(matches!(
                deser_error(deserialize_map_block(&bytes, WireContext::latest())),
                DeserializeError::VersionMismatch(found) if found == version
            ));

            let err = serialize_map_block(&MapBlock::default(), WireContext::for_version(version))
                .unwrap_err();
            assert!(matches!(
                err.downcast_ref::<SerializeError>(),
                Some(SerializeError::VersionMismatch(found)) if *found == version
            ));
        }
    }

    #[test]
    fn truncated_input() {
        assert!(matches!(
            deser_error(deserialize_map_block(&[], WireContext::latest())),
            DeserializeError::Eof { .. }
        ));

        let bytes = serialize_map_block(&sample_block(), WireContext::latest()).unwrap();
        for length in [1, 2, bytes.len() / 2, bytes.len() - 1] {
            assert!(
                deserialize_map_block(&bytes[..length], WireContext::latest()).is_err(),
                "{length} bytes"
            );
        }
    }

    #[test]
    fn corrupt_node_section() {
        // a valid zlib stream holding too few nodes
        let mut bytes = vec![11, 0];
        bytes.extend(compress_zlib(&[0; 100], 6));
        bytes.extend([0, 0]);
        assert!(matches!(
            deser_error(deserialize_map_block(&bytes, WireContext::latest())),
            DeserializeError::CorruptSection(_)
        ));

        // too many nodes
        let mut bytes = vec![11, 0];
        bytes.extend(compress_zlib(&[0; 3 * NODE_COUNT + 1], 6));
        bytes.extend([0, 0]);
        assert!(matches!(
            deser_error(deserialize_map_block(&bytes, WireContext::latest())),
            DeserializeError::CorruptSection(_)
        ));

        // not zlib at all
        let bytes = [11, 0, 1, 2, 3, 4, 0, 0];
        assert!(matches!(
            deser_error(deserialize_map_block(&bytes, WireContext::latest())),
            DeserializeError::CorruptSection(_)
        ));
    }

    #[test]
    fn reserved_flags() {
        let mut bytes = serialize_map_block(&MapBlock::default(), WireContext::latest()).unwrap();
        bytes[1] |= 0x08;
        assert!(matches!(
            deser_error(deserialize_map_block(&bytes, WireContext::latest())),
            DeserializeError::InvalidValue(_)
        ));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let block = sample_block();
        let mut bytes = serialize_map_block(&block, WireContext::latest()).unwrap();
        bytes.extend([1, 2, 3]);
        let stored = deserialize_map_block(&bytes, WireContext::latest()).unwrap();
        assert_eq!(stored.block, block);
    }

    #[test]
    fn timestamps() {
        assert_eq!(BlockTimestamp::default(), BlockTimestamp::UNDEFINED);
        assert_eq!(BlockTimestamp::UNDEFINED.seconds(), None);
        assert_eq!(BlockTimestamp::UNDEFINED.elapsed(1000), None);
        assert_eq!(BlockTimestamp(100).seconds(), Some(100));
        assert_eq!(BlockTimestamp(100).elapsed(160), Some(60));
        assert_eq!(BlockTimestamp(100).elapsed(50), Some(0));
    }

    #[test]
    fn node_planes() {
        let mut nodes = MapBlockNodes::default();
        nodes[MapNodeIndex::MAX] = MapNode::with_params(ContentId::MESE, -1, 5);
        let mut ser = VecSerializer::new(WireContext::latest(), 3 * NODE_COUNT);
        MapBlockNodes::serialize(&nodes, &mut ser).unwrap();
        let planes = ser.take();
        assert_eq!(planes.len(), 3 * NODE_COUNT);
        assert_eq!(planes[0], 254);
        assert_eq!(planes[NODE_COUNT - 1], 7);
        assert_eq!(planes[2 * NODE_COUNT - 1], 0xff);
        assert_eq!(planes[3 * NODE_COUNT - 1], 5);
    }
}
