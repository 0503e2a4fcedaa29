use std::future::poll_fn;
use std::io;
use std::pin::Pin;
use std::task::Poll;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

const CHUNK_SIZE: usize = 4096;

/// Reads whatever the peer has sent so far.
///
/// Waits for at least one byte, then keeps draining while more data is
/// ready without waiting. An empty result means the peer closed the stream.
pub async fn read_available<R>(reader: &mut R) -> io::Result<Bytes>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(CHUNK_SIZE);

    if reader.read_buf(&mut buffer).await? == 0 {
        return Ok(Bytes::new());
    }

    let mut chunk = [0u8; CHUNK_SIZE];
    while let Some(n) = try_read_ready(reader, &mut chunk).await? {
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    Ok(buffer.freeze())
}

/// Polls the reader exactly once. `None` means nothing is ready right now.
async fn try_read_ready<R>(reader: &mut R, chunk: &mut [u8]) -> io::Result<Option<usize>>
where
    R: AsyncRead + Unpin,
{
    poll_fn(|cx| {
        let mut buf = ReadBuf::new(&mut *chunk);
        match Pin::new(&mut *reader).poll_read(cx, &mut buf) {
            Poll::Ready(Ok(())) => Poll::Ready(Ok(Some(buf.filled().len()))),
            Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
            Poll::Pending => Poll::Ready(Ok(None)),
        }
    })
    .await
}
