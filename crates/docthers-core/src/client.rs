use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{Map, Value};

use crate::coordinator::Outbound;
use crate::error::SendError;

/// HTTP client for the `/generate-response` endpoint.
#[derive(Clone, Debug)]
pub struct ResponseClient {
    client: Client,
    url: String,
}

impl ResponseClient {
    /// `url` is the full endpoint URL, not just the origin.
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Post one multipart payload. `Ok(None)` means the endpoint answered but
    /// sent no `response` field.
    #[tracing::instrument(skip_all, fields(url = %self.url, text = payload.text().is_some(), image = payload.image().is_some()))]
    pub async fn generate(&self, payload: &Outbound) -> Result<Option<String>, SendError> {
        let form = build_form(payload)?;

        let response = self.client.post(&self.url).multipart(form).send().await?;

        if !response.status().is_success() {
            return Err(SendError::Status(response.status()));
        }

        let body = response.bytes().await?;
        let reply = parse_reply(&body)?;
        tracing::debug!(has_response = reply.is_some(), "endpoint replied");
        Ok(reply)
    }
}

/// The body must be a JSON object; `response`, when present, a string or null.
fn parse_reply(body: &[u8]) -> Result<Option<String>, SendError> {
    let mut object: Map<String, Value> = serde_json::from_slice(body)?;
    match object.remove("response") {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(None),
    }
}

fn build_form(payload: &Outbound) -> Result<Form, SendError> {
    let mut form = Form::new();

    if let Some(text) = payload.text() {
        form = form.text("text", text.to_string());
    }

    if let Some(image) = payload.image() {
        let part = Part::bytes(image.data().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.mime_type())?;
        form = form.part("image", part);
    }

    Ok(form)
}
