use crate::core::provider::ProviderSettings;
use crate::core::retry::{RetryPolicy, TokioDelay};
use crate::domain::model::{FetchReport, FetchRequest};
use crate::domain::ports::{Delay, StagedWrite, Storage};
use crate::utils::error::{FetchError, Result, PREVIEW_LEN};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use std::path::Path;
use std::time::Instant;

/// Downloads one DEM raster with bounded retry on transient failures.
pub struct DemFetcher<S: Storage, D: Delay = TokioDelay> {
    storage: S,
    delay: D,
    provider: ProviderSettings,
    retry: RetryPolicy,
    client: Client,
}

impl<S: Storage> DemFetcher<S, TokioDelay> {
    pub fn new(storage: S, provider: ProviderSettings, retry: RetryPolicy) -> Result<Self> {
        Self::with_delay(storage, TokioDelay, provider, retry)
    }
}

impl<S: Storage, D: Delay> DemFetcher<S, D> {
    pub fn with_delay(
        storage: S,
        delay: D,
        provider: ProviderSettings,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let client = provider.build_client()?;
        Ok(Self {
            storage,
            delay,
            provider,
            retry,
            client,
        })
    }

    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchReport> {
        let started = Instant::now();
        let max_attempts = self.retry.max_attempts;
        tracing::info!(
            "Downloading {} DEM for bounding box {}",
            self.provider.dem_type,
            request.bbox
        );

        let mut attempts = 0;
        let mut last_error: Option<FetchError> = None;

        while self.retry.has_attempts_left(attempts) {
            attempts += 1;
            tracing::debug!(
                "Attempt {}/{} against {}",
                attempts,
                max_attempts,
                self.provider.endpoint
            );

            match self.attempt(request).await {
                Ok((bytes_written, content_type)) => {
                    tracing::info!(
                        "DEM saved to {} ({} bytes, attempt {}/{})",
                        request.output_path.display(),
                        bytes_written,
                        attempts,
                        max_attempts
                    );
                    return Ok(FetchReport {
                        output_path: request.output_path.clone(),
                        bytes_written,
                        attempts,
                        content_type,
                        elapsed: started.elapsed(),
                    });
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!("{} on attempt {}/{}", e, attempts, max_attempts);
                    last_error = Some(e);

                    if self.retry.has_attempts_left(attempts) {
                        let wait = self.retry.delay_for(attempts - 1);
                        tracing::warn!("Retrying in {:?}", wait);
                        self.delay.sleep(wait).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(FetchError::RetriesExhausted {
            attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempts were made".to_string()),
        })
    }

    /// One HTTP round trip. Returns the byte count and declared content type on success.
    async fn attempt(&self, request: &FetchRequest) -> Result<(u64, String)> {
        let params = self.provider.query_params(request);
        let mut response = self
            .client
            .get(&self.provider.endpoint)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status == StatusCode::OK {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();

            if !self.provider.accepts_content_type(&content_type) {
                let preview = read_preview(&mut response).await;
                return Err(FetchError::InvalidContentType {
                    content_type,
                    preview,
                });
            }

            let bytes_written = self.stream_to_storage(response, &request.output_path).await?;
            Ok((bytes_written, content_type))
        } else if status.is_server_error() {
            Err(FetchError::ServerError {
                status: status.as_u16(),
            })
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e.without_url()));
            Err(FetchError::ClientError {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn stream_to_storage(&self, mut response: Response, path: &Path) -> Result<u64> {
        let mut staged = self.storage.stage(path).await?;

        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if let Err(e) = staged.write_chunk(&chunk).await {
                        staged.abort().await;
                        return Err(e);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    staged.abort().await;
                    return Err(e.into());
                }
            }
        }

        staged.commit().await
    }
}

/// First bytes of a rejected body, escaped for printing.
async fn read_preview(response: &mut Response) -> String {
    let mut buf = Vec::with_capacity(PREVIEW_LEN);
    while buf.len() < PREVIEW_LEN {
        match response.chunk().await {
            Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
            _ => break,
        }
    }
    buf.truncate(PREVIEW_LEN);
    buf.escape_ascii().to_string()
}
