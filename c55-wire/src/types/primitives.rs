use crate::wire::{
    deser::{Deserialize, DeserializeResult, Deserializer},
    ser::{Serialize, SerializeResult, Serializer},
};

impl Serialize for u8 {
    type Input = Self;
    fn serialize<S: Serializer>(value: &Self::Input, ser: &mut S) -> SerializeResult {
        ser.write_bytes(&value.to_be_bytes()[..])
    }
}

impl Deserialize for u8 {
    type Output = Self;
    fn deserialize(deserializer: &mut Deserializer<'_>) -> DeserializeResult<Self> {
        let [byte] = deserializer.take_n::<1>()?;
        Ok(byte)
    }
}

impl Serialize for u16 {
    type Input = Self;
    fn serialize<S: Serializer>(value: &Self::Input, ser: &mut S) -> SerializeResult {
        ser.write_bytes(&value.to_be_bytes()[..])
    }
}

impl Deserialize for u16 {
    type Output = Self;
    fn deserialize(deserializer: &mut Deserializer<'_>) -> DeserializeResult<Self> {
        Ok(u16::from_be_bytes(deserializer.take_n::<2>()?))
    }
}

impl Serialize for u32 {
    type Input = Self;
    fn serialize<S: Serializer>(value: &Self::Input, ser: &mut S) -> SerializeResult {
        ser.write_bytes(&value.to_be_bytes()[..])
    }
}

impl Deserialize for u32 {
    type Output = Self;
    fn deserialize(deserializer: &mut Deserializer<'_>) -> DeserializeResult<Self> {
        Ok(u32::from_be_bytes(deserializer.take_n::<4>()?))
    }
}

impl Serialize for i8 {
    type Input = Self;
    fn serialize<S: Serializer>(value: &Self::Input, ser: &mut S) -> SerializeResult {
        ser.write_bytes(&value.to_be_bytes()[..])
    }
}

impl Deserialize for i8 {
    type Output = Self;
    fn deserialize(deserializer: &mut Deserializer<'_>) -> DeserializeResult<Self> {
        Ok(i8::from_be_bytes(deserializer.take_n::<1>()?))
    }
}

impl Serialize for i32 {
    type Input = Self;
    fn serialize<S: Serializer>(value: &Self::Input, ser: &mut S) -> SerializeResult {
        ser.write_bytes(&value.to_be_bytes()[..])
    }
}

impl Deserialize for i32 {
    type Output = Self;
    fn deserialize(deserializer: &mut Deserializer<'_>) -> DeserializeResult<Self> {
        Ok(i32::from_be_bytes(deserializer.take_n::<4>()?))
    }
}
