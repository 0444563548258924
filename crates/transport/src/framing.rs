//! Length-prefixed framing for envelope exchange.
//!
//! Each envelope travels as a `u32` little-endian payload length followed by
//! the payload bytes. Reads distinguish a clean end of stream (EOF at a
//! frame boundary) from truncation mid-frame.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default cap on a single frame's payload.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Errors that can occur while reading or writing frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Frame payload exceeds the configured cap
    #[error("frame of {size} bytes exceeds limit of {limit}")]
    TooLarge { size: usize, limit: usize },
    /// Stream ended inside a frame
    #[error("stream ended mid-frame")]
    Truncated,
    /// Underlying transport failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Write one frame and flush it.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8], limit: usize) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > limit {
        return Err(FrameError::TooLarge {
            size: payload.len(),
            limit,
        });
    }
    let len = u32::try_from(payload.len()).map_err(|_| FrameError::TooLarge {
        size: payload.len(),
        limit,
    })?;

    let mut frame = BytesMut::with_capacity(4 + payload.len());
    frame.put_u32_le(len);
    frame.put_slice(payload);
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame.
///
/// Returns `Ok(None)` when the stream ends cleanly before a new frame
/// starts. EOF inside the length prefix or the payload is `Truncated`.
/// Payloads above `limit` are rejected before allocation.
pub async fn read_frame<R>(reader: &mut R, limit: usize) -> Result<Option<Vec<u8>>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    let first = reader.read(&mut len_buf).await?;
    if first == 0 {
        return Ok(None);
    }
    if first < 4 {
        reader
            .read_exact(&mut len_buf[first..])
            .await
            .map_err(eof_as_truncation)?;
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > limit {
        return Err(FrameError::TooLarge { size: len, limit });
    }

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(eof_as_truncation)?;
    Ok(Some(payload))
}

fn eof_as_truncation(err: std::io::Error) -> FrameError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        FrameError::Truncated
    } else {
        FrameError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        write_frame(&mut a, b"hello", DEFAULT_MAX_FRAME_BYTES)
            .await
            .unwrap();
        let frame = read_frame(&mut b, DEFAULT_MAX_FRAME_BYTES).await.unwrap();
        assert_eq!(frame.as_deref(), Some(&b"hello"[..]));
    }

    #[tokio::test]
    async fn test_empty_payload() {
        let (mut a, mut b) = tokio::io::duplex(64);
        write_frame(&mut a, b"", 16).await.unwrap();
        let frame = read_frame(&mut b, 16).await.unwrap();
        assert_eq!(frame, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_sequential_frames_then_clean_eof() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        for payload in [&b"one"[..], b"two", b"three"] {
            write_frame(&mut a, payload, 64).await.unwrap();
        }
        drop(a);

        assert_eq!(read_frame(&mut b, 64).await.unwrap().unwrap(), b"one");
        assert_eq!(read_frame(&mut b, 64).await.unwrap().unwrap(), b"two");
        assert_eq!(read_frame(&mut b, 64).await.unwrap().unwrap(), b"three");
        assert!(read_frame(&mut b, 64).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_eof_mid_length_is_truncation() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&[7, 0]).await.unwrap();
        drop(a);
        let err = read_frame(&mut b, 64).await.unwrap_err();
        assert!(matches!(err, FrameError::Truncated));
    }

    #[tokio::test]
    async fn test_eof_mid_payload_is_truncation() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&10u32.to_le_bytes()).await.unwrap();
        a.write_all(b"abc").await.unwrap();
        drop(a);
        let err = read_frame(&mut b, 64).await.unwrap_err();
        assert!(matches!(err, FrameError::Truncated));
    }

    #[tokio::test]
    async fn test_oversize_rejected_on_read() {
        // A hostile length header must be refused before allocating
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&u32::MAX.to_le_bytes()).await.unwrap();
        let err = read_frame(&mut b, 1024).await.unwrap_err();
        assert!(matches!(err, FrameError::TooLarge { .. }));
    }

    #[tokio::test]
    async fn test_oversize_rejected_on_write() {
        let (mut a, _b) = tokio::io::duplex(64);
        let err = write_frame(&mut a, &[0u8; 32], 16).await.unwrap_err();
        assert!(matches!(err, FrameError::TooLarge { size: 32, limit: 16 }));
    }
}
