//! Gradio adapter for the image+text inference service (e.g. a Hugging Face Space).
//!
//! Implements `InferencePort` over the Gradio HTTP `call` API:
//! 1. upload the image (`/gradio_api/upload`)
//! 2. submit the job (`/gradio_api/call/{api}`) and get an event id
//! 3. read the server-sent event stream until the `complete` frame
//!
//! No retries and no timeout here; the pipeline bounds the call.

use crate::adapters::inference::interpret::interpret;
use crate::domain::{DomainError, InferenceResult, TemporaryArtifact};
use crate::ports::InferencePort;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

/// Position of the rendered image in the result array.
const RENDERED_INDEX: usize = 1;

/// Gradio client for one endpoint of one app.
pub struct GradioClient {
    client: reqwest::Client,
    root: String,
    api_name: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct EventId {
    event_id: String,
}

impl GradioClient {
    /// Create a client.
    ///
    /// # Arguments
    /// * `space` - App URL (`https://...`) or Hugging Face Space id (`owner/name`)
    /// * `api_name` - Endpoint name, e.g. `/predict`
    /// * `token` - Optional Hugging Face token for private Spaces
    pub fn new(space: &str, api_name: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            root: resolve_space_url(space),
            api_name: api_name.trim_start_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Upload the artifact; returns the server-side path.
    async fn upload(&self, artifact: &TemporaryArtifact) -> Result<String, DomainError> {
        let bytes = tokio::fs::read(&artifact.path)
            .await
            .map_err(|e| DomainError::Io(format!("read {}: {}", artifact.path.display(), e)))?;
        let form = Form::new().part(
            "files",
            Part::bytes(bytes).file_name(artifact.original_filename.clone()),
        );

        let response = self
            .authorized(
                self.client
                    .post(format!("{}/gradio_api/upload", self.root)),
            )
            .multipart(form)
            .send()
            .await
            .map_err(|e| DomainError::RemoteCall(format!("upload request failed: {}", e)))?;
        let response = ensure_success(response, "upload").await?;

        let paths: Vec<String> = response
            .json()
            .await
            .map_err(|e| DomainError::RemoteCall(format!("invalid upload response: {}", e)))?;
        paths
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::RemoteCall("upload returned no file paths".to_string()))
    }

    /// Submit the prediction; returns the event id to poll.
    async fn submit(
        &self,
        server_path: &str,
        artifact: &TemporaryArtifact,
        text: &str,
    ) -> Result<String, DomainError> {
        let body = json!({
            "data": [
                {
                    "path": server_path,
                    "orig_name": artifact.original_filename,
                    "meta": {"_type": "gradio.FileData"}
                },
                text
            ]
        });
        debug!(payload = %body, "payload being sent to inference API");

        let response = self
            .authorized(
                self.client
                    .post(format!("{}/gradio_api/call/{}", self.root, self.api_name)),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::RemoteCall(format!("predict request failed: {}", e)))?;
        let response = ensure_success(response, "predict").await?;

        let event: EventId = response
            .json()
            .await
            .map_err(|e| DomainError::RemoteCall(format!("invalid predict response: {}", e)))?;
        Ok(event.event_id)
    }

    /// Read the event stream for `event_id` and return the `complete` payload.
    async fn await_result(&self, event_id: &str) -> Result<Value, DomainError> {
        let response = self
            .authorized(self.client.get(format!(
                "{}/gradio_api/call/{}/{}",
                self.root, self.api_name, event_id
            )))
            .send()
            .await
            .map_err(|e| DomainError::RemoteCall(format!("result request failed: {}", e)))?;
        let response = ensure_success(response, "result").await?;

        let body = response
            .text()
            .await
            .map_err(|e| DomainError::RemoteCall(format!("result stream failed: {}", e)))?;
        parse_event_stream(&body)
    }

    /// Give FileData entries without a `url` one pointing at this app's file route.
    fn resolve_file_urls(&self, mut payload: Value) -> Value {
        if let Some(items) = payload.as_array_mut() {
            for (index, item) in items.iter_mut().enumerate() {
                match item {
                    // Only the rendered slot holds a path; the status string stays as is.
                    Value::String(path) if index == RENDERED_INDEX => {
                        let trimmed = path.trim();
                        if !trimmed.is_empty()
                            && !trimmed.starts_with("http://")
                            && !trimmed.starts_with("https://")
                        {
                            *path = self.file_url(trimmed);
                        }
                    }
                    Value::Object(map) => {
                        let has_url = map.get("url").and_then(Value::as_str).is_some();
                        let path = map.get("path").and_then(Value::as_str).map(str::to_string);
                        if let (false, Some(path)) = (has_url, path) {
                            map.insert("url".to_string(), Value::String(self.file_url(&path)));
                        }
                    }
                    _ => {}
                }
            }
        }
        payload
    }

    /// Download URL for a file living on the inference host.
    fn file_url(&self, path: &str) -> String {
        format!("{}/gradio_api/file={}", self.root, path)
    }
}

/// `owner/name` -> `https://owner-name.hf.space`; URLs are used as given.
pub fn resolve_space_url(space: &str) -> String {
    let space = space.trim();
    if space.starts_with("http://") || space.starts_with("https://") {
        return space.trim_end_matches('/').to_string();
    }
    let subdomain: String = space
        .to_lowercase()
        .chars()
        .map(|c| if matches!(c, '/' | '_' | '.') { '-' } else { c })
        .collect();
    format!("https://{}.hf.space", subdomain)
}

async fn ensure_success(
    response: reqwest::Response,
    stage: &str,
) -> Result<reqwest::Response, DomainError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    warn!(stage, status = %status, body = %text, "inference API returned error");
    Err(DomainError::RemoteCall(format!(
        "API error {}: {}",
        status,
        text.chars().take(200).collect::<String>()
    )))
}

/// Parse a Gradio SSE body. `complete` yields its data; `error` fails the call.
fn parse_event_stream(body: &str) -> Result<Value, DomainError> {
    let mut event = "";
    for line in body.lines() {
        if let Some(name) = line.strip_prefix("event:") {
            event = name.trim();
        } else if let Some(data) = line.strip_prefix("data:") {
            let data = data.trim();
            match event {
                "complete" => {
                    // Unparseable data is kept verbatim so it surfaces as a malformed result.
                    return Ok(serde_json::from_str(data)
                        .unwrap_or_else(|_| Value::String(data.to_string())));
                }
                "error" => {
                    let detail = match data {
                        "" | "null" => "no details".to_string(),
                        other => other.to_string(),
                    };
                    return Err(DomainError::RemoteCall(format!(
                        "inference service reported an error: {}",
                        detail
                    )));
                }
                _ => {}
            }
        }
    }
    Err(DomainError::RemoteCall(
        "result stream ended without a result".to_string(),
    ))
}

#[async_trait::async_trait]
impl InferencePort for GradioClient {
    async fn invoke(
        &self,
        artifact: &TemporaryArtifact,
        text: &str,
    ) -> Result<InferenceResult, DomainError> {
        info!(
            root = %self.root,
            api = %self.api_name,
            file = %artifact.original_filename,
            text,
            "sending image to inference API"
        );

        let server_path = self.upload(artifact).await?;
        let event_id = self.submit(&server_path, artifact, text).await?;
        debug!(event_id = %event_id, "prediction queued");

        let payload = self.resolve_file_urls(self.await_result(&event_id).await?);
        info!(response = %payload, "inference API response");

        Ok(interpret(&payload))
    }
}
