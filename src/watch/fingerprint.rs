use std::{io, path::Path};
use tokio::io::AsyncReadExt;
/// MD5 of at most the first `limit` bytes of `path`.
///
/// Edits confined to later offsets go unnoticed. For photos the usual
/// overwrite rewrites the header/EXIF block, which sits at the front.
pub async fn partial_digest(path: &Path, limit: usize) -> io::Result<md5::Digest> {
    let file = tokio::fs::File::open(path).await?;
    let mut buf = Vec::with_capacity(limit.min(1 << 20));
    file.take(limit as u64).read_to_end(&mut buf).await?;
    Ok(md5::compute(&buf))
}
