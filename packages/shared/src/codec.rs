//! Newline-delimited JSON framing for envelopes.

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::Envelope;

/// Largest accepted frame, terminator included
pub const MAX_ENVELOPE_BYTES: u64 = 1024 * 1024;

/// Errors raised while reading or writing an envelope
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed envelope: {0}")]
    Json(#[from] serde_json::Error),

    #[error("connection closed before an envelope was received")]
    Closed,

    #[error("envelope exceeds {MAX_ENVELOPE_BYTES} bytes")]
    TooLarge,
}

/// Serialize one envelope, terminate it with `\n` and flush
pub async fn write_envelope<W>(writer: &mut W, envelope: &Envelope) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = serde_json::to_vec(envelope)?;
    frame.push(b'\n');
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one envelope terminated by `\n` (or by EOF)
pub async fn read_envelope<R>(reader: &mut R) -> Result<Envelope, CodecError>
where
    R: AsyncBufRead + Unpin,
{
    let mut frame = Vec::new();
    let read = reader
        .take(MAX_ENVELOPE_BYTES)
        .read_until(b'\n', &mut frame)
        .await?;

    if read == 0 {
        return Err(CodecError::Closed);
    }
    if frame.last() != Some(&b'\n') && read as u64 == MAX_ENVELOPE_BYTES {
        return Err(CodecError::TooLarge);
    }

    Ok(serde_json::from_slice(&frame)?)
}
