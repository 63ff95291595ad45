//! Native messaging framing: a native-endian `u32` byte length, then that
//! many bytes of UTF-8 JSON.

use anyhow::{bail, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest incoming message accepted.
pub const MAX_INCOMING: usize = 64 * 1024 * 1024;
/// Browsers refuse host messages larger than this.
pub const MAX_OUTGOING: usize = 1024 * 1024;

/// Read one message. `Ok(None)` on a clean EOF before the length prefix;
/// EOF inside the prefix or the body is an error.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut len_buf = [0u8; 4];
    let mut filled = 0;
    while filled < len_buf.len() {
        let n = reader.read(&mut len_buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            bail!("stream ended after {filled} of 4 length-prefix bytes");
        }
        filled += n;
    }
    let len = u32::from_ne_bytes(len_buf) as usize;
    if len > MAX_INCOMING {
        bail!("incoming message of {len} bytes exceeds {MAX_INCOMING}");
    }
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}

/// Write one message and flush.
pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, body: &[u8]) -> Result<()> {
    if body.len() > MAX_OUTGOING {
        bail!("outgoing message of {} bytes exceeds {MAX_OUTGOING}", body.len());
    }
    let len = u32::try_from(body.len())?;
    writer.write_all(&len.to_ne_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}
