use std::marker::PhantomData;

use anyhow::bail;
use log::trace;

use crate::wire::{
    deser::{Deserialize, DeserializeError, DeserializeResult, Deserializer},
    ser::{Serialize, SerializeError, SerializeResult, Serializer, VecSerializer},
};

/// A section compressed with the algorithm of the current [`WireContext`](crate::WireContext).
///
/// There's no length prefix; the compressed stream marks its own end.
/// The decompressed section must be consumed completely by `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct Compressed<T>(PhantomData<T>);

impl<T: Serialize> Serialize for Compressed<T> {
    type Input = T::Input;
    fn serialize<S: Serializer>(value: &Self::Input, ser: &mut S) -> SerializeResult {
        // Serialize 'value' to a temporary buffer, and then compress
        let mut tmp = VecSerializer::new(ser.context(), 0x4000);
        <T as Serialize>::serialize(value, &mut tmp)?;
        let tmp = tmp.take();
        let compression = ser.context().compression;
        let compressed = match compression.compress(&tmp) {
            Ok(compressed) => compressed,
            Err(err) => bail!(SerializeError::CompressionFailed(err.to_string())),
        };
        trace!(
            "compressed section from {} to {} bytes using {compression}",
            tmp.len(),
            compressed.len()
        );
        ser.write_bytes(&compressed)
    }
}

impl<T: Deserialize> Deserialize for Compressed<T> {
    type Output = T::Output;
    fn deserialize(deser: &mut Deserializer<'_>) -> DeserializeResult<Self::Output> {
        let context = deser.context();
        let (consumed, decompressed) = match context
            .compression
            .decompress(deser.peek_all(), context.max_section_size)
        {
            Ok(result) => result,
            Err(err) => bail!(DeserializeError::CorruptSection(err.to_string())),
        };
        deser.take(consumed)?;
        trace!(
            "decompressed section from {consumed} to {} bytes",
            decompressed.len()
        );

        let mut tmp = Deserializer::new(context, &decompressed);
        let value = match <T as Deserialize>::deserialize(&mut tmp) {
            Ok(value) => value,
            Err(err) => {
                // running out of data inside a section means the section itself is broken
                let truncated = matches!(
                    err.downcast_ref::<DeserializeError>(),
                    Some(DeserializeError::Eof { .. })
                );
                if truncated {
                    bail!(DeserializeError::CorruptSection(err.to_string()));
                }
                return Err(err);
            }
        };
        if tmp.remaining() > 0 {
            bail!(DeserializeError::CorruptSection(format!(
                "{} unexpected bytes at the end of the section",
                tmp.remaining()
            )));
        }
        Ok(value)
    }
}
