use std::marker::PhantomData;

use crate::wire::{
    deser::{Deserialize, DeserializeResult, Deserializer},
    ser::{Serialize, SerializeResult, Serializer},
};

/// An array of items with a u16 length prefix
#[derive(Debug, Clone, PartialEq)]
pub struct Array16<T>(PhantomData<T>);

impl<T: Serialize> Serialize for Array16<T>
where
    <T as Serialize>::Input: Sized,
{
    type Input = Vec<T::Input>;
    fn serialize<S: Serializer>(value: &Self::Input, ser: &mut S) -> SerializeResult {
        u16::serialize(&u16::try_from(value.len())?, ser)?;
        for item in value {
            <T as Serialize>::serialize(item, ser)?;
        }
        Ok(())
    }
}

impl<T: Deserialize> Deserialize for Array16<T> {
    type Output = Vec<T::Output>;
    fn deserialize(deser: &mut Deserializer<'_>) -> DeserializeResult<Self::Output> {
        let length = u16::deserialize(deser)? as usize;
        let mut vec = Vec::with_capacity(length);
        for _ in 0..length {
            vec.push(<T as Deserialize>::deserialize(deser)?);
        }
        Ok(vec)
    }
}
