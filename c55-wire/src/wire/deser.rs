use anyhow::bail;

use super::context::WireContext;

#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("serialization version {0} is not supported")]
    VersionMismatch(u8),
    #[error("input truncated: {needed} bytes needed, {remaining} remaining")]
    Eof { needed: usize, remaining: usize },
    #[error("corrupt section: {0}")]
    CorruptSection(String),
    #[error("legacy object section is not empty ({0} entries)")]
    MalformedLegacySection(u16),
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

pub type DeserializeResult<R> = anyhow::Result<R>;

pub trait Deserialize {
    type Output;
    fn deserialize(deser: &mut Deserializer<'_>) -> DeserializeResult<Self::Output>;
}

/// Reads values from a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct Deserializer<'data> {
    context: WireContext,
    data: &'data [u8],
}

impl<'data> Deserializer<'data> {
    #[must_use]
    pub fn new(context: WireContext, data: &'data [u8]) -> Self {
        Self { context, data }
    }

    #[must_use]
    pub fn context(&self) -> WireContext {
        self.context
    }

    /// Number of bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// All bytes not yet consumed, without consuming them.
    #[must_use]
    pub fn peek_all(&self) -> &'data [u8] {
        self.data
    }

    /// Consumes the next `count` bytes.
    pub fn take(&mut self, count: usize) -> DeserializeResult<&'data [u8]> {
        let Some((head, tail)) = self.data.split_at_checked(count) else {
            bail!(DeserializeError::Eof {
                needed: count,
                remaining: self.data.len(),
            });
        };
        self.data = tail;
        Ok(head)
    }

    /// Consumes the next `COUNT` bytes as an array.
    pub fn take_n<const COUNT: usize>(&mut self) -> DeserializeResult<[u8; COUNT]> {
        let Some((head, tail)) = self.data.split_first_chunk::<COUNT>() else {
            bail!(DeserializeError::Eof {
                needed: COUNT,
                remaining: self.data.len(),
            });
        };
        self.data = tail;
        Ok(*head)
    }

    /// Consumes the next `count` bytes and returns a deserializer restricted to them.
    pub fn slice(&mut self, count: usize) -> DeserializeResult<Self> {
        Ok(Self {
            context: self.context,
            data: self.take(count)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_and_remaining() {
        let data = [1, 2, 3, 4, 5];
        let mut deser = Deserializer::new(WireContext::default(), &data);
        assert_eq!(deser.take(2).unwrap(), &[1, 2]);
        assert_eq!(deser.take_n::<1>().unwrap(), [3]);
        assert_eq!(deser.remaining(), 2);
        assert_eq!(deser.peek_all(), &[4, 5]);

        let mut inner = deser.slice(1).unwrap();
        assert_eq!(inner.take_n::<1>().unwrap(), [4]);
        assert_eq!(inner.remaining(), 0);
        assert_eq!(deser.remaining(), 1);
    }

    #[test]
    fn truncated_input() {
        let data = [1, 2];
        let mut deser = Deserializer::new(WireContext::default(), &data);
        let err = deser.take_n::<4>().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeserializeError>(),
            Some(DeserializeError::Eof {
                needed: 4,
                remaining: 2
            })
        ));
        // a failed read consumes nothing
        assert_eq!(deser.remaining(), 2);
        assert!(deser.take(3).is_err());
        assert_eq!(deser.take(2).unwrap(), &[1, 2]);
    }
}
