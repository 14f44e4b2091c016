use crate::wire::{
    deser::{Deserialize, DeserializeResult, Deserializer},
    ser::{Serialize, SerializeResult, Serializer},
};

/// Binary data preceded by a u16 size
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryData16;

impl Serialize for BinaryData16 {
    type Input = Vec<u8>;
    fn serialize<S: Serializer>(value: &Self::Input, ser: &mut S) -> SerializeResult {
        u16::serialize(&u16::try_from(value.len())?, ser)?;
        ser.write_bytes(value)?;
        Ok(())
    }
}

impl Deserialize for BinaryData16 {
    type Output = Vec<u8>;
    fn deserialize(deser: &mut Deserializer<'_>) -> DeserializeResult<Self::Output> {
        let num_bytes = u16::deserialize(deser)? as usize;
        Ok(Vec::from(deser.take(num_bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use crate::wire::{context::WireContext, deser::DeserializeError, ser::VecSerializer};

    use super::*;

    #[test]
    fn length_prefix() {
        let mut ser = VecSerializer::new(WireContext::default(), 8);
        BinaryData16::serialize(&b"abc".to_vec(), &mut ser).unwrap();
        assert_eq!(ser.take(), [0, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn payload_past_end() {
        let data = [0, 5, 1, 2];
        let mut deser = Deserializer::new(WireContext::default(), &data);
        let err = BinaryData16::deserialize(&mut deser).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeserializeError>(),
            Some(DeserializeError::Eof { .. })
        ));
    }

    #[test]
    fn too_long() {
        let mut ser = VecSerializer::new(WireContext::default(), 8);
        assert!(BinaryData16::serialize(&vec![0; 70_000], &mut ser).is_err());
    }
}
