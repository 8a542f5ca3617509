//! Native messaging framing.
//!
//! Every message is a 32-bit length in native (little-endian on every
//! platform the browser ships on) byte order followed by that many bytes of
//! UTF-8 JSON.

use crate::constants::MAX_MESSAGE_SIZE;
use crate::error::{BridgeError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, Read, Write};

/// Read one frame. Returns `Ok(None)` when the stream ends before a length prefix.
pub fn read_message<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; 4];
    let mut filled = 0;
    while filled < len_bytes.len() {
        let Some(rest) = len_bytes.get_mut(filled..) else {
            break;
        };
        match reader.read(rest) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }

    let len = usize::try_from(u32::from_le_bytes(len_bytes)).map_err(|_| {
        BridgeError::MessageTooLarge {
            len: usize::MAX,
            max: MAX_MESSAGE_SIZE,
        }
    })?;
    if len > MAX_MESSAGE_SIZE {
        return Err(BridgeError::MessageTooLarge {
            len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer)?;
    Ok(Some(buffer))
}

/// Write one frame and flush it.
pub fn write_message<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(BridgeError::MessageTooLarge {
            len: payload.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    let len = u32::try_from(payload.len()).map_err(|_| BridgeError::MessageTooLarge {
        len: payload.len(),
        max: MAX_MESSAGE_SIZE,
    })?;

    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

pub fn read_json<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<Option<T>> {
    match read_message(reader)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

pub fn write_json<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<()> {
    let json = serde_json::to_vec(message)?;
    write_message(writer, &json)
}
