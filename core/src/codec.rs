//! JSON codec used by the gateway for request and response bodies.
//!
//! The gateway takes its codec as a constructor argument instead of reaching
//! for process-wide state, so tests can swap in stricter or failing codecs.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encodes request bodies and decodes response bodies.
pub trait Codec: Send + Sync {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, serde_json::Error>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, serde_json::Error>;
}

/// The default codec: plain `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(value)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
