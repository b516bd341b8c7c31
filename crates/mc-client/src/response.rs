//! Response body normalization

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};

/// A response body, parsed as JSON only when the server declared it so
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    /// Read and classify the body of `response`
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self> {
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(is_json_content_type)
            .unwrap_or(false);

        let text = response.text().await.map_err(ClientError::from_transport)?;
        Ok(Self::classify(is_json, text))
    }

    /// JSON-declared bodies that do not parse are kept as text
    pub fn classify(is_json: bool, text: String) -> Self {
        if is_json && !text.trim().is_empty() {
            if let Ok(value) = serde_json::from_str(&text) {
                return ResponseBody::Json(value);
            }
        }
        ResponseBody::Text(text)
    }

    /// Non-empty `message` string of a JSON object body
    pub fn message(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(value) => value
                .get("message")
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty()),
            ResponseBody::Text(_) => None,
        }
    }

    /// Decode a JSON body into `T`
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            ResponseBody::Json(value) => serde_json::from_value(value)
                .map_err(|e| ClientError::InvalidResponse(e.to_string())),
            ResponseBody::Text(text) => Err(ClientError::InvalidResponse(format!(
                "expected JSON, got {} bytes of text",
                text.len()
            ))),
        }
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}
