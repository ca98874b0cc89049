//! Transparent capture of an outbound response body.

use axum::{
    body::Body,
    http::{StatusCode, header, response::Parts},
    response::Response,
};
use bytes::Bytes;
use futures_util::{StreamExt, stream};
use tracing::warn;

use crate::buffer::BodyBuffer;
use crate::charset;
use crate::error::CaptureError;
use crate::headers::{self, HeaderSet};

/// A response whose body has been drained into memory, waiting to be flushed.
///
/// Every chunk the handler produced is written to a [`BodyBuffer`]. The client
/// receives those exact bytes once [`ResponseCapture::into_response`] is called,
/// which consumes the capture so the flush cannot happen twice.
#[derive(Debug)]
pub struct ResponseCapture {
    parts: Parts,
    buffer: BodyBuffer,
    failure: Option<String>,
}

impl ResponseCapture {
    /// Drains the body of `response` into memory.
    ///
    /// A stream error stops the drain. What arrived before it is kept and the
    /// error is raised again by [`into_response`](Self::into_response).
    pub async fn wrap(response: Response) -> Self {
        let (parts, body) = response.into_parts();
        let mut buffer = BodyBuffer::new();
        let mut failure = None;

        let mut chunks = body.into_data_stream();
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(chunk) => buffer.write(&chunk),
                Err(err) => {
                    let err = CaptureError::from(err);
                    warn!(error = %err, captured = buffer.len(), "Response body stream failed during capture");
                    failure = Some(err.to_string());
                    break;
                }
            }
        }

        Self {
            parts,
            buffer,
            failure,
        }
    }

    /// Status set by the handler.
    pub fn status(&self) -> StatusCode {
        self.parts.status
    }

    /// Response headers in log form, see [`headers::snapshot`].
    pub fn headers(&self) -> HeaderSet {
        headers::snapshot(&self.parts.headers)
    }

    /// Captured body decoded with the declared charset, UTF-8 by default.
    pub fn content(&self) -> String {
        let charset = self
            .parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset::charset_of);
        self.buffer.as_text(charset.as_deref())
    }

    /// Copy of the exact bytes the client will receive.
    pub fn content_as_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.buffer.snapshot())
    }

    /// Hands the buffered bytes to the real response.
    ///
    /// A stream error seen while capturing is re-raised after those bytes.
    pub fn into_response(self) -> Response {
        let bytes = self.buffer.into_bytes();
        let body = match self.failure {
            None => Body::from(bytes),
            Some(message) => Body::from_stream(stream::iter([
                Ok::<_, CaptureError>(bytes),
                Err(CaptureError::Replay(message)),
            ])),
        };
        Response::from_parts(self.parts, body)
    }
}
