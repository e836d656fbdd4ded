//! Call-data encoding
//!
//! Layout: a 4-byte selector (first bytes of SHA-256 over the function
//! signature) followed by the arguments in order. Addresses are a big-endian
//! `u16` length plus UTF-8 bytes; amounts are big-endian `u128`.

use crate::core::Address;
use crate::crypto::sha256;
use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

pub type Selector = [u8; 4];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("Call data truncated: need {needed} bytes, {remaining} left")]
    Truncated { needed: usize, remaining: usize },
    #[error("Unknown selector: 0x{0}")]
    UnknownSelector(String),
    #[error("Address is not valid UTF-8")]
    InvalidAddress,
    #[error("Address too long: {0} bytes")]
    AddressTooLong(usize),
    #[error("{0} trailing bytes after arguments")]
    TrailingBytes(usize),
}

impl AbiError {
    pub fn unknown_selector(selector: Selector) -> Self {
        Self::UnknownSelector(hex::encode(selector))
    }
}

/// Selector for a function signature such as `transfer(address,uint256)`
pub fn selector(signature: &str) -> Selector {
    let hash = sha256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Builds call data
pub struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    pub fn new(selector: Selector) -> Self {
        let mut buf = BytesMut::with_capacity(64);
        buf.put_slice(&selector);
        Self { buf }
    }

    /// Append an address argument.
    ///
    /// Addresses longer than `u16::MAX` bytes are rejected.
    pub fn address(mut self, address: &Address) -> Result<Self, AbiError> {
        let bytes = address.as_str().as_bytes();
        let len = u16::try_from(bytes.len()).map_err(|_| AbiError::AddressTooLong(bytes.len()))?;
        self.buf.put_u16(len);
        self.buf.put_slice(bytes);
        Ok(self)
    }

    pub fn amount(mut self, amount: u128) -> Self {
        self.buf.put_u128(amount);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

/// Reads call data produced by [`Encoder`]
pub struct Decoder<'a> {
    buf: &'a [u8],
}

impl<'a> Decoder<'a> {
    /// Split off the selector
    pub fn new(data: &'a [u8]) -> Result<(Selector, Self), AbiError> {
        let mut decoder = Self { buf: data };
        decoder.need(4)?;
        let mut selector = [0u8; 4];
        decoder.buf.copy_to_slice(&mut selector);
        Ok((selector, decoder))
    }

    fn need(&self, needed: usize) -> Result<(), AbiError> {
        if self.buf.remaining() < needed {
            return Err(AbiError::Truncated {
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn address(&mut self) -> Result<Address, AbiError> {
        self.need(2)?;
        let len = self.buf.get_u16() as usize;
        self.need(len)?;
        let raw = self.buf.copy_to_bytes(len);
        let s = std::str::from_utf8(&raw).map_err(|_| AbiError::InvalidAddress)?;
        Ok(Address::new(s))
    }

    pub fn amount(&mut self) -> Result<u128, AbiError> {
        self.need(16)?;
        Ok(self.buf.get_u128())
    }

    /// Fails if any argument bytes were left unread
    pub fn finish(self) -> Result<(), AbiError> {
        match self.buf.remaining() {
            0 => Ok(()),
            n => Err(AbiError::TrailingBytes(n)),
        }
    }
}

/// Serde adapter storing byte payloads as hex strings
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_is_stable() {
        let a = selector("transfer(address,uint256)");
        assert_eq!(a, selector("transfer(address,uint256)"));
        assert_ne!(a, selector("approve(address,uint256)"));
    }

    #[test]
    fn test_encode_decode_arguments() {
        let sel = selector("transfer(address,uint256)");
        let data = Encoder::new(sel)
            .address(&Address::from("user1"))
            .unwrap()
            .amount(1_000)
            .finish();

        // selector + (2 + 5) + 16
        assert_eq!(data.len(), 4 + 7 + 16);

        let (got, mut decoder) = Decoder::new(&data).unwrap();
        assert_eq!(got, sel);
        assert_eq!(decoder.address().unwrap(), Address::from("user1"));
        assert_eq!(decoder.amount().unwrap(), 1_000);
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn test_truncated_data() {
        assert!(matches!(
            Decoder::new(&[1, 2]),
            Err(AbiError::Truncated { needed: 4, remaining: 2 })
        ));

        let data = Encoder::new(selector("f(uint256)")).finish();
        let (_, mut decoder) = Decoder::new(&data).unwrap();
        assert!(matches!(decoder.amount(), Err(AbiError::Truncated { .. })));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let data = Encoder::new(selector("f()")).amount(1).finish();
        let (_, decoder) = Decoder::new(&data).unwrap();
        assert_eq!(decoder.finish(), Err(AbiError::TrailingBytes(16)));
    }

    #[test]
    fn test_invalid_utf8_address() {
        let mut data = selector("f(address)").to_vec();
        data.extend_from_slice(&[0, 2, 0xff, 0xfe]);

        let (_, mut decoder) = Decoder::new(&data).unwrap();
        assert_eq!(decoder.address(), Err(AbiError::InvalidAddress));
    }
}
