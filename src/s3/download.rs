//! Object download as a stream plus suggested file name

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::s3::client::StorageClient;
use crate::s3::error::{Failure, Outcome};

/// Content of a single object, handed over to the caller to consume
#[derive(Debug)]
pub struct ObjectContent {
    pub key: String,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    pub body: ByteStream,
}

/// A download ready to be sent back to the requester.
///
/// `filename` is the object key verbatim, path separators included.
/// Callers writing to a filesystem must sanitize it themselves.
#[derive(Debug)]
pub struct Download {
    pub filename: String,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    body: ByteStream,
}

impl From<ObjectContent> for Download {
    fn from(content: ObjectContent) -> Self {
        Self {
            filename: content.key,
            content_length: content.content_length,
            content_type: content.content_type,
            body: content.body,
        }
    }
}

impl Download {
    /// Next chunk of the body, `None` once exhausted
    pub async fn next_chunk(&mut self) -> Option<Outcome<Bytes>> {
        self.body
            .next()
            .await
            .map(|chunk| chunk.map_err(|e| body_failure(&self.filename, e)))
    }

    /// Copy the whole body into `writer`, returning the byte count
    pub async fn write_to<W>(mut self, writer: &mut W) -> Outcome<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let mut written = 0u64;
        while let Some(chunk) = self.next_chunk().await {
            let chunk = chunk?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| Failure::generic(format!("Failed to write {}: {}", self.filename, e)))?;
            written += chunk.len() as u64;
        }
        writer
            .flush()
            .await
            .map_err(|e| Failure::generic(format!("Failed to write {}: {}", self.filename, e)))?;
        Ok(written)
    }

    /// Collect the whole body in memory
    pub async fn into_bytes(self) -> Outcome<Bytes> {
        let filename = self.filename;
        self.body
            .collect()
            .await
            .map(|data| data.into_bytes())
            .map_err(|e| body_failure(&filename, e))
    }

    /// Split into the suggested file name and the raw byte stream
    pub fn into_parts(self) -> (ByteStream, String) {
        (self.body, self.filename)
    }
}

fn body_failure(filename: &str, error: impl std::fmt::Display) -> Failure {
    let failure = Failure::generic(format!("Failed to read {}: {}", filename, error));
    tracing::warn!("{}", failure);
    failure
}

/// Open `bucket/key` for download.
///
/// Either a stream is returned or a failure; never both.
pub async fn stream_object(client: &StorageClient, bucket: &str, key: &str) -> Outcome<Download> {
    let content = client.get_object(bucket, key).await?;
    tracing::info!("Streaming s3://{}/{}", bucket, key);
    Ok(Download::from(content))
}
