use std::collections::BTreeMap;

use anyhow::bail;
use c55_core::MapNodeIndex;
use c55_wire_derive::{WireDeserialize, WireSerialize};
use log::warn;

use crate::wire::{
    context::WireContext,
    deser::{Deserialize, DeserializeError, DeserializeResult, Deserializer},
    ser::{Serialize, SerializeResult, Serializer, VecSerializer},
};

use super::BinaryData16;

/// Metadata attached to a single node.
///
/// The payload is interpreted by the node's material. Only the sign schema is known to this
/// crate; everything else is carried as opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq, WireSerialize, WireDeserialize)]
pub struct NodeMetadata {
    pub type_id: u16,
    #[wrap(BinaryData16)]
    pub data: Vec<u8>,
}

impl NodeMetadata {
    /// Type tag of a sign's metadata. The payload is a u16-prefixed text.
    pub const TYPE_SIGN: u16 = 14;

    /// Creates the metadata of a sign showing `text`.
    pub fn sign(text: &str) -> SerializeResult<Self> {
        let mut ser = VecSerializer::new(WireContext::default(), text.len() + 2);
        BinaryData16::serialize(&text.as_bytes().to_vec(), &mut ser)?;
        Ok(Self {
            type_id: Self::TYPE_SIGN,
            data: ser.take(),
        })
    }

    /// Returns the text of a sign or `None` if this isn't a sign's metadata.
    pub fn sign_text(&self) -> DeserializeResult<Option<String>> {
        if self.type_id != Self::TYPE_SIGN {
            return Ok(None);
        }
        let mut deser = Deserializer::new(WireContext::default(), &self.data);
        let text = BinaryData16::deserialize(&mut deser)?;
        match String::from_utf8(text) {
            Ok(text) => Ok(Some(text)),
            Err(err) => bail!(DeserializeError::InvalidValue(format!(
                "sign text is not valid UTF-8: {err}"
            ))),
        }
    }
}

impl Serialize for MapNodeIndex {
    type Input = Self;
    fn serialize<S: Serializer>(value: &Self::Input, ser: &mut S) -> SerializeResult {
        u16::serialize(&u16::from(*value), ser)
    }
}

impl Deserialize for MapNodeIndex {
    type Output = Self;
    fn deserialize(deser: &mut Deserializer<'_>) -> DeserializeResult<Self> {
        let raw = u16::deserialize(deser)?;
        match MapNodeIndex::try_from(raw) {
            Ok(index) => Ok(index),
            Err(raw) => bail!(DeserializeError::InvalidValue(format!(
                "node index {raw} is out of range"
            ))),
        }
    }
}

/// The metadata of all nodes of a map block which have any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMetadataList {
    pub metadata: BTreeMap<MapNodeIndex, NodeMetadata>,
}

impl NodeMetadataList {
    const VERSION: u16 = 1;

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.metadata.len()
    }
}

impl Serialize for NodeMetadataList {
    type Input = Self;
    fn serialize<S: Serializer>(value: &Self::Input, ser: &mut S) -> SerializeResult {
        u16::serialize(&NodeMetadataList::VERSION, ser)?;
        u16::serialize(&u16::try_from(value.metadata.len())?, ser)?;
        for (index, metadata) in &value.metadata {
            MapNodeIndex::serialize(index, ser)?;
            NodeMetadata::serialize(metadata, ser)?;
        }
        Ok(())
    }
}

impl Deserialize for NodeMetadataList {
    type Output = Self;
    fn deserialize(deser: &mut Deserializer<'_>) -> DeserializeResult<Self> {
        let version = u16::deserialize(deser)?;
        if version != NodeMetadataList::VERSION {
            bail!(DeserializeError::InvalidValue(format!(
                "invalid NodeMetadataList version {version}"
            )));
        }
        let count = u16::deserialize(deser)?;
        let mut metadata = BTreeMap::new();
        for _ in 0..count {
            let index = MapNodeIndex::deserialize(deser)?;
            let entry = NodeMetadata::deserialize(deser)?;
            if metadata.insert(index, entry).is_some() {
                warn!("duplicate metadata for node {index:?}; keeping the last one");
            }
        }
        Ok(Self { metadata })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign() {
        let sign = NodeMetadata::sign("Hello").unwrap();
        assert_eq!(sign.type_id, NodeMetadata::TYPE_SIGN);
        assert_eq!(sign.data, [0, 5, b'H', b'e', b'l', b'l', b'o']);
        assert_eq!(sign.sign_text().unwrap().as_deref(), Some("Hello"));

        let chest = NodeMetadata {
            type_id: 1,
            data: vec![1, 2, 3],
        };
        assert_eq!(chest.sign_text().unwrap(), None);

        let broken = NodeMetadata {
            type_id: NodeMetadata::TYPE_SIGN,
            data: vec![0, 9, b'x'],
        };
        assert!(broken.sign_text().is_err());
    }

    #[test]
    fn list_layout() {
        let mut list = NodeMetadataList::default();
        list.metadata.insert(
            MapNodeIndex::try_from(0x0102).unwrap(),
            NodeMetadata {
                type_id: 3,
                data: vec![9],
            },
        );
        let mut ser = VecSerializer::new(WireContext::default(), 16);
        NodeMetadataList::serialize(&list, &mut ser).unwrap();
        let bytes = ser.take();
        assert_eq!(bytes, [0, 1, 0, 1, 1, 2, 0, 3, 0, 1, 9]);

        let mut deser = Deserializer::new(WireContext::default(), &bytes);
        assert_eq!(NodeMetadataList::deserialize(&mut deser).unwrap(), list);
    }

    #[test]
    fn duplicate_index_keeps_last() {
        let bytes = [0, 1, 0, 2, 0, 5, 0, 1, 0, 1, 7, 0, 5, 0, 2, 0, 1, 8];
        let mut deser = Deserializer::new(WireContext::default(), &bytes);
        let list = NodeMetadataList::deserialize(&mut deser).unwrap();
        assert_eq!(list.len(), 1);
        let entry = list.metadata.get(&MapNodeIndex::try_from(5).unwrap()).unwrap();
        assert_eq!(entry.type_id, 2);
        assert_eq!(entry.data, [8]);
    }

    #[test]
    fn rejects_bad_input() {
        // wrong version
        let mut deser = Deserializer::new(WireContext::default(), &[0, 2, 0, 0]);
        assert!(NodeMetadataList::deserialize(&mut deser).is_err());
        // index past the end of the block
        let bytes = [0, 1, 0, 1, 0x10, 0, 0, 1, 0, 0];
        let mut deser = Deserializer::new(WireContext::default(), &bytes);
        let err = NodeMetadataList::deserialize(&mut deser).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeserializeError>(),
            Some(DeserializeError::InvalidValue(_))
        ));
    }
}
