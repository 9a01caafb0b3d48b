//! Binary persistence of reflection graphs.
//!
//! Every persisted value is wrapped in an [`Envelope`]: a fixed magic header,
//! the interface id of the payload's root schema, and the length-prefixed
//! payload bytes. Readers validate both the magic and the interface id before
//! decoding the payload, so a blob written for one schema is never trusted as
//! another.

use bincode::Options;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ReflectionError;
use crate::types::ReflectedType;

/// Magic bytes at the start of every envelope.
pub const ENVELOPE_MAGIC: [u8; 4] = *b"SRFL";

/// Interface id of a serialised [`ReflectedType`] graph.
pub const TYPE_GRAPH_INTERFACE_ID: u64 = 0x9c3e_51a7_2f0b_d448;

/// Upper bound on the size of a single decoded message.
const MAX_MESSAGE_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, serde::Deserialize, Serialize)]
struct Envelope {
    magic: [u8; 4],
    interface_id: u64,
    payload: Vec<u8>,
}

fn options() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_MESSAGE_BYTES)
}

/// Encodes `value` as an envelope tagged with `interface_id`.
///
/// # Errors
///
/// Returns [`ReflectionError::Encode`] when the value cannot be serialised.
pub fn encode_message<T: Serialize>(
    interface_id: u64,
    value: &T,
) -> Result<Vec<u8>, ReflectionError> {
    let payload = options().serialize(value).map_err(ReflectionError::Encode)?;
    let envelope = Envelope {
        magic: ENVELOPE_MAGIC,
        interface_id,
        payload,
    };
    options()
        .serialize(&envelope)
        .map_err(ReflectionError::Encode)
}

/// Decodes an envelope produced by [`encode_message`].
///
/// # Errors
///
/// Returns [`ReflectionError::InvalidMagic`] or
/// [`ReflectionError::InterfaceMismatch`] when the envelope does not carry the
/// expected schema, and [`ReflectionError::Decode`] when either layer is
/// malformed.
pub fn decode_message<T: DeserializeOwned>(
    interface_id: u64,
    bytes: &[u8],
) -> Result<T, ReflectionError> {
    let envelope: Envelope = options()
        .deserialize(bytes)
        .map_err(ReflectionError::Decode)?;
    if envelope.magic != ENVELOPE_MAGIC {
        return Err(ReflectionError::InvalidMagic);
    }
    if envelope.interface_id != interface_id {
        return Err(ReflectionError::InterfaceMismatch {
            expected: interface_id,
            found: envelope.interface_id,
        });
    }
    options()
        .deserialize(&envelope.payload)
        .map_err(ReflectionError::Decode)
}

/// Serialises a type graph.
///
/// # Errors
///
/// See [`encode_message`].
pub fn encode_type(ty: &ReflectedType) -> Result<Vec<u8>, ReflectionError> {
    encode_message(TYPE_GRAPH_INTERFACE_ID, ty)
}

/// Deserialises a type graph written by [`encode_type`].
///
/// # Errors
///
/// See [`decode_message`].
pub fn decode_type(bytes: &[u8]) -> Result<ReflectedType, ReflectionError> {
    decode_message(TYPE_GRAPH_INTERFACE_ID, bytes)
}
