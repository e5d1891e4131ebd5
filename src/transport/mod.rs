// HTTP transport shared by the external service gateways
// Requests are blocking ureq calls; async callers go through `run_blocking`,
// and commands run under `block_on_cancellable` so cancelling abandons requests in flight


use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::{RagError, Result};

/// A single file field of a `multipart/form-data` body
#[derive(Debug, Clone, Copy)]
pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    /// Build a client whose requests give up after `timeout`, or never when `None`
    #[inline]
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build()
            .into();

        Self { agent }
    }

    /// POST a JSON body and decode the JSON response
    #[inline]
    pub fn post_json<Req, Resp>(&self, url: &Url, body: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let request_json = serde_json::to_string(body)
            .map_err(|e| RagError::Decode(format!("Failed to serialize request: {}", e)))?;

        debug!("POST {} ({} bytes)", url, request_json.len());

        let response = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(request_json.as_str())
            .map_err(|e| RagError::Transport(format!("Request to {} failed: {}", url, e)))?;

        read_json_response(url, response)
    }

    /// POST a single file as `multipart/form-data` and decode the JSON response
    #[inline]
    pub fn post_multipart<Resp>(&self, url: &Url, part: FilePart<'_>) -> Result<Resp>
    where
        Resp: DeserializeOwned,
    {
        let boundary = format!("asr-rag-{}", Uuid::new_v4().simple());
        let body = multipart_body(&boundary, part);

        debug!(
            "POST {} (multipart, {} bytes in field {})",
            url,
            part.data.len(),
            part.field
        );

        let response = self
            .agent
            .post(url.as_str())
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .send(&body[..])
            .map_err(|e| RagError::Transport(format!("Request to {} failed: {}", url, e)))?;

        read_json_response(url, response)
    }
}

fn read_json_response<Resp>(url: &Url, mut response: ureq::http::Response<ureq::Body>) -> Result<Resp>
where
    Resp: DeserializeOwned,
{
    let status = response.status();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| RagError::Transport(format!("Failed to read response from {}: {}", url, e)))?;

    if !status.is_success() {
        warn!("{} responded with status {}", url, status.as_u16());
        return Err(RagError::RemoteStatus {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| RagError::Decode(format!("Unexpected response from {}: {}", url, e)))
}

/// Percent-encode the characters that would break a quoted `Content-Disposition` parameter
fn escape_disposition_param(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("%22"),
            '\r' => escaped.push_str("%0D"),
            '\n' => escaped.push_str("%0A"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Encode one file part as a complete `multipart/form-data` body
#[inline]
pub fn multipart_body(boundary: &str, part: FilePart<'_>) -> Vec<u8> {
    let header = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
        escape_disposition_param(part.field),
        escape_disposition_param(part.file_name),
        part.content_type
    );
    let footer = format!("\r\n--{boundary}--\r\n");

    let mut body = Vec::with_capacity(header.len() + part.data.len() + footer.len());
    body.extend_from_slice(header.as_bytes());
    body.extend_from_slice(part.data);
    body.extend_from_slice(footer.as_bytes());
    body
}

/// Run a blocking request on tokio's blocking pool
#[inline]
pub async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| RagError::Transport(format!("Request task failed: {}", e)))?
}

/// Drive `future` on a fresh runtime until it finishes or `cancel` resolves.
///
/// On cancellation the future is dropped, which kills child processes and releases
/// temporary files and connections it owns. Blocking requests still running on the
/// blocking pool are abandoned instead of awaited, so the caller returns immediately.
#[inline]
pub fn block_on_cancellable<T, E, F, C>(future: F, cancel: C) -> std::result::Result<T, E>
where
    F: Future<Output = std::result::Result<T, E>>,
    C: Future<Output = ()>,
    E: From<RagError>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(RagError::from)?;

    let outcome = runtime.block_on(async {
        tokio::select! {
            result = future => result,
            () = cancel => {
                warn!("Cancelled, abandoning in-flight work");
                Err(RagError::Cancelled.into())
            }
        }
    });

    runtime.shutdown_background();
    outcome
}
