use crate::codec::{CodecError, MessageCodec};
use crate::model::Frame;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;

/// Encodes any serde type as a JSON text frame.
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonCodec")
            .field("message", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> MessageCodec for JsonCodec<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    type Message = T;

    fn encode(&self, message: &T) -> Result<Frame, CodecError> {
        serde_json::to_string(message)
            .map(Frame::Text)
            .map_err(CodecError::Encode)
    }

    fn decode(&self, payload: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(payload).map_err(|e| {
            // Well-formed JSON of the wrong shape.
            if e.is_data() {
                CodecError::Invalid(e.to_string())
            } else {
                CodecError::Malformed(e)
            }
        })
    }
}
