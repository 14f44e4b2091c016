use crate::wire::{
    deser::{Deserialize, DeserializeResult, Deserializer},
    ser::{Serialize, SerializeResult, Serializer},
};
use glam::IVec3;

impl Serialize for IVec3 {
    type Input = Self;

    fn serialize<S: Serializer>(value: &Self::Input, serializer: &mut S) -> SerializeResult {
        i32::serialize(&value.x, serializer)?;
        i32::serialize(&value.y, serializer)?;
        i32::serialize(&value.z, serializer)?;
        Ok(())
    }
}

impl Deserialize for IVec3 {
    type Output = Self;

    fn deserialize(deserializer: &mut Deserializer<'_>) -> DeserializeResult<Self::Output> {
        Ok(Self {
            x: i32::deserialize(deserializer)?,
            y: i32::deserialize(deserializer)?,
            z: i32::deserialize(deserializer)?,
        })
    }
}
