//! Single-pass content hashing for request payloads.

use md5::Context;
use sha2::{Digest, Sha256};
use std::io::{self, SeekFrom};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

const READ_CHUNK: usize = 64 * 1024;

/// Digests and length of one payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentHash {
    /// MD5 of the payload, sent base64-encoded as `Content-MD5`.
    pub md5: [u8; 16],
    /// SHA-256 of the payload, sent hex-encoded as `X-Amz-Content-Sha256`.
    pub sha256: [u8; 32],
    /// Exact number of bytes read.
    pub length: u64,
}

/// Hash `reader` to its end in one pass, then seek it back to the start.
///
/// The same reader is later streamed out as the request body, so it is left
/// positioned at offset 0 on success.
pub async fn compute_hash<R>(reader: &mut R) -> io::Result<ContentHash>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let mut md5 = Context::new();
    let mut sha256 = Sha256::new();
    let mut length: u64 = 0;
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        md5.consume(&buf[..n]);
        sha256.update(&buf[..n]);
        length += n as u64;
    }

    reader.seek(SeekFrom::Start(0)).await?;

    Ok(ContentHash {
        md5: md5.compute().0,
        sha256: sha256.finalize().into(),
        length,
    })
}
