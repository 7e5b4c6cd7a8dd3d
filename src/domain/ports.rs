use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Destination for downloaded rasters.
///
/// A download is staged first and only becomes visible at its final path on
/// [`StagedWrite::commit`], so a failed attempt never clobbers an existing file.
pub trait Storage: Send + Sync {
    type Staged: StagedWrite;

    fn stage(&self, path: &Path) -> impl std::future::Future<Output = Result<Self::Staged>> + Send;
}

pub trait StagedWrite: Send {
    fn write_chunk(&mut self, chunk: &[u8]) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Flushes and publishes the staged bytes, returning how many were written.
    fn commit(self) -> impl std::future::Future<Output = Result<u64>> + Send;

    fn abort(self) -> impl std::future::Future<Output = ()> + Send;
}

/// Wait between retry attempts.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
