//! Size-bounded descriptions of captured exchanges and their JSON encoding.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::EncodeError;
use crate::headers::HeaderSet;
use crate::request::RequestCapture;
use crate::response::ResponseCapture;
use crate::sink::Verbosity;

/// What gets logged before the handler runs. Empty fields are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestSummary {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sender: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: HeaderSet,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
}

/// What gets logged after the handler returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResponseSummary {
    pub status: u16,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: HeaderSet,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
}

/// Keeps at most `max_chars` characters of `content`.
pub fn truncate(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => &content[..end],
        None => content,
    }
}

/// Builds summaries from captures.
#[derive(Debug, Clone, Copy)]
pub struct SummaryBuilder {
    max_content_size: usize,
}

impl SummaryBuilder {
    pub fn new(max_content_size: usize) -> Self {
        Self { max_content_size }
    }

    /// Whole content at [`Verbosity::Full`], otherwise cut to the configured size.
    pub fn body(&self, content: &str, verbosity: Verbosity) -> String {
        match verbosity {
            Verbosity::Full => content.to_string(),
            _ => truncate(content, self.max_content_size).to_string(),
        }
    }

    /// Reads the request body through the capture, which caches it for the handler.
    pub async fn request(&self, capture: &mut RequestCapture, verbosity: Verbosity) -> RequestSummary {
        let content = capture.content().await;
        // A form body already is the parameter list.
        let params = if capture.is_form_post() {
            BTreeMap::new()
        } else {
            capture.parameters().first_values()
        };

        RequestSummary {
            sender: capture.sender().unwrap_or_default(),
            method: capture.method().to_string(),
            path: capture.path().to_string(),
            params,
            headers: capture.headers(),
            body: self.body(&content, verbosity),
        }
    }

    pub fn response(&self, capture: &ResponseCapture, verbosity: Verbosity) -> ResponseSummary {
        ResponseSummary {
            status: capture.status().as_u16(),
            headers: capture.headers(),
            body: self.body(&capture.content(), verbosity),
        }
    }
}

/// Turns summaries into the text placed after the line prefix.
pub trait SummaryEncoder: Send + Sync + 'static {
    fn encode_request(&self, summary: &RequestSummary) -> Result<String, EncodeError>;

    fn encode_response(&self, summary: &ResponseSummary) -> Result<String, EncodeError>;
}

/// `serde_json` encoder, compact unless built with [`JsonEncoder::pretty`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder {
    pretty: bool,
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<String, EncodeError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }
}

impl SummaryEncoder for JsonEncoder {
    fn encode_request(&self, summary: &RequestSummary) -> Result<String, EncodeError> {
        self.encode(summary)
    }

    fn encode_response(&self, summary: &ResponseSummary) -> Result<String, EncodeError> {
        self.encode(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::Request, http::header, response::Response};
    use proptest::prelude::*;

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("héllo wörld", 4), "héll");
        assert_eq!(truncate("short", 1024), "short");
        assert_eq!(truncate("", 3), "");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_full_verbosity_keeps_everything() {
        let builder = SummaryBuilder::new(4);
        assert_eq!(builder.body("0123456789", Verbosity::Full), "0123456789");
        assert_eq!(builder.body("0123456789", Verbosity::Normal), "0123");
    }

    proptest! {
        #[test]
        fn truncation_law(content in "\\PC{0,64}", max in 0usize..80) {
            let builder = SummaryBuilder::new(max);
            let length = content.chars().count();

            let normal = builder.body(&content, Verbosity::Normal);
            prop_assert_eq!(normal.chars().count(), length.min(max));
            prop_assert!(content.starts_with(&normal));

            let full = builder.body(&content, Verbosity::Full);
            prop_assert_eq!(full, content);
        }
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let summary = RequestSummary {
            method: "GET".into(),
            path: "/".into(),
            body: "[EMPTY]".into(),
            ..Default::default()
        };
        assert_eq!(
            JsonEncoder::new().encode_request(&summary).unwrap(),
            r#"{"method":"GET","path":"/","body":"[EMPTY]"}"#
        );

        let summary = ResponseSummary {
            status: 204,
            ..Default::default()
        };
        assert_eq!(
            JsonEncoder::new().encode_response(&summary).unwrap(),
            r#"{"status":204}"#
        );
    }

    #[test]
    fn test_pretty_encoder() {
        let summary = ResponseSummary {
            status: 200,
            ..Default::default()
        };
        assert_eq!(
            JsonEncoder::pretty().encode_response(&summary).unwrap(),
            "{\n  \"status\": 200\n}"
        );
    }

    #[tokio::test]
    async fn test_form_post_summary_has_no_params() {
        let request = Request::builder()
            .method("POST")
            .uri("/form?x=9")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("a=1&b=2"))
            .unwrap();
        let mut capture = RequestCapture::wrap(request).await;

        let summary = SummaryBuilder::new(1024)
            .request(&mut capture, Verbosity::Normal)
            .await;
        assert!(summary.params.is_empty());
        assert_eq!(summary.body, "a=1&b=2&x=9");
        assert_eq!(summary.sender, "");
    }

    #[tokio::test]
    async fn test_response_summary_is_truncated() {
        let response = Response::builder()
            .status(200)
            .body(Body::from("x".repeat(2048)))
            .unwrap();
        let capture = ResponseCapture::wrap(response).await;

        let summary = SummaryBuilder::new(1024).response(&capture, Verbosity::Normal);
        assert_eq!(summary.status, 200);
        assert_eq!(summary.body.len(), 1024);
        // The capture itself still holds everything.
        assert_eq!(capture.content_as_bytes().len(), 2048);
    }
}
