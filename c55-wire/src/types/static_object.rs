use anyhow::bail;
use c55_wire_derive::{WireDeserialize, WireSerialize};
use glam::{IVec3, Vec3};

use crate::wire::{
    deser::{Deserialize, DeserializeError, DeserializeResult, Deserializer},
    ser::{Serialize, SerializeResult, Serializer},
};

use super::{Array16, BinaryData16};

/// A world position in fixed point with three decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, WireSerialize, WireDeserialize)]
pub struct FixedPos(pub IVec3);

impl FixedPos {
    /// Number of steps per world unit.
    pub const SCALE: f32 = 1000.0;

    /// Converts a position, truncating everything beyond the third decimal place.
    #[must_use]
    pub fn from_vec3(pos: Vec3) -> Self {
        Self((pos * Self::SCALE).as_ivec3())
    }

    #[must_use]
    pub fn to_vec3(self) -> Vec3 {
        self.0.as_vec3() / Self::SCALE
    }
}

/// An object stored alongside the nodes of a map block.
///
/// The payload belongs to whatever owns objects of `type_id`.
#[derive(Debug, Clone, PartialEq, Eq, WireSerialize, WireDeserialize)]
pub struct StaticObject {
    pub type_id: u8,
    pub pos: FixedPos,
    #[wrap(BinaryData16)]
    pub data: Vec<u8>,
}

/// The static objects of a map block in their stored order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticObjectList {
    pub objects: Vec<StaticObject>,
}

impl StaticObjectList {
    const VERSION: u8 = 0;
}

impl Serialize for StaticObjectList {
    type Input = Self;
    fn serialize<S: Serializer>(value: &Self::Input, ser: &mut S) -> SerializeResult {
        u8::serialize(&StaticObjectList::VERSION, ser)?;
        <Array16<StaticObject> as Serialize>::serialize(&value.objects, ser)
    }
}

impl Deserialize for StaticObjectList {
    type Output = Self;
    fn deserialize(deser: &mut Deserializer<'_>) -> DeserializeResult<Self> {
        let version = u8::deserialize(deser)?;
        if version != StaticObjectList::VERSION {
            bail!(DeserializeError::InvalidValue(format!(
                "invalid StaticObjectList version {version}"
            )));
        }
        Ok(Self {
            objects: <Array16<StaticObject> as Deserialize>::deserialize(deser)?,
        })
    }
}
