//! Replayable view of an inbound request.
//!
//! A network body can be read exactly once. [`RequestCapture`] owns that single
//! read: the first call to [`RequestCapture::content`] drains the body into
//! memory, later calls and the downstream handler both see the cached bytes.
//!
//! Form posts are special cased. Their body is buffered when the capture is
//! created and parsed into a [`ParameterSet`], which then stands in for the body
//! text in the log. Parameters are never derived from a body that is not a form.
//!
//! The [`ParameterSet`] inserted into the forwarded request only exists for
//! captured exchanges. Handlers should read their input with the usual axum
//! extractors, which behave the same whether or not the exchange is logged.

use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::{Extensions, Method, Uri, header, request::Parts},
};
use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use futures_util::stream;
use http_body_util::BodyExt;
use percent_encoding::percent_decode;
use std::{borrow::Cow, collections::BTreeMap, net::SocketAddr};
use tracing::warn;
use url::form_urlencoded;

use crate::charset;
use crate::error::CaptureError;
use crate::headers::{self, HeaderSet};

/// Logged in place of a body that is blank after whitespace normalization.
pub const EMPTY_BODY: &str = "[EMPTY]";
/// Logged in place of a body whose stream failed while being captured.
pub const UNREADABLE_BODY: &str = "[UNREADABLE BODY]";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request parameters: each name maps to one or more values.
///
/// Values keep their arrival order. Names iterate sorted, so the log renders
/// them deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet(BTreeMap<String, Vec<String>>);

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw query string, `None` giving an empty set.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::new();
        if let Some(query) = query {
            params.extend_from_urlencoded(query.as_bytes());
        }
        params
    }

    /// Adds the pairs of a UTF-8 `application/x-www-form-urlencoded` string.
    pub fn extend_from_urlencoded(&mut self, input: &[u8]) {
        for (name, value) in form_urlencoded::parse(input) {
            self.insert(name, value);
        }
    }

    /// Adds the pairs of a form body whose percent-decoded bytes are text in `encoding`.
    ///
    /// `+` stands for a space, a pair without `=` gets an empty value and empty
    /// pairs are skipped, as with [`extend_from_urlencoded`](Self::extend_from_urlencoded).
    pub fn extend_from_form(&mut self, input: &[u8], encoding: &'static Encoding) {
        for pair in input.split(|&byte| byte == b'&').filter(|pair| !pair.is_empty()) {
            let (name, value) = match pair.iter().position(|&byte| byte == b'=') {
                Some(at) => (&pair[..at], &pair[at + 1..]),
                None => (pair, &[][..]),
            };
            self.insert(
                decode_component(name, encoding),
                decode_component(value, encoding),
            );
        }
    }

    /// Appends `value` to the values of `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(value.into());
    }

    /// First value of `name`, which is what a single-valued lookup sees.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|values| values.first()).map(String::as_str)
    }

    /// Every value of `name` in arrival order.
    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// One value per name for the summary, `[EMPTY]` for a name without values.
    pub fn first_values(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(name, values)| {
                let value = values.first().cloned().unwrap_or_else(|| EMPTY_BODY.to_string());
                (name.clone(), value)
            })
            .collect()
    }

    /// Rebuilds a body text: `a=1&b=2`, multiple values as `a=[1, 2]`.
    pub fn to_body_text(&self) -> String {
        self.0
            .iter()
            .map(|(name, values)| match values.as_slice() {
                [single] => format!("{name}={single}"),
                many => format!("{name}=[{}]", many.join(", ")),
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Where the request body stands in its single allowed read.
#[derive(Debug)]
enum BodyState {
    Unread(Body),
    Cached(Bytes),
    Failed(String),
}

/// An inbound request whose body may be read by the logger and by the handler.
#[derive(Debug)]
pub struct RequestCapture {
    parts: Parts,
    body: BodyState,
    form: Option<ParameterSet>,
}

impl RequestCapture {
    /// Takes ownership of `request`.
    ///
    /// - Form posts are read and parsed right away, their values decoded with
    ///   the declared charset (UTF-8 when absent or unknown).
    /// - Any other body stays unread until [`content`](Self::content) needs it.
    ///
    /// A form post whose body cannot be read gets no parameter view, so the
    /// log shows [`UNREADABLE_BODY`] rather than a partial form.
    pub async fn wrap(request: Request) -> Self {
        let (parts, body) = request.into_parts();
        let mut capture = Self {
            parts,
            body: BodyState::Unread(body),
            form: None,
        };

        if capture.is_form_post() {
            if let Some(bytes) = capture.read_body().await {
                let encoding = capture
                    .charset()
                    .as_deref()
                    .and_then(charset::encoding_for)
                    .unwrap_or(UTF_8);
                let mut params = ParameterSet::from_query(capture.parts.uri.query());
                params.extend_from_form(&bytes, encoding);
                capture.form = Some(params);
            }
        }

        capture
    }

    /// Reads the body on first use and returns the cached bytes afterwards.
    async fn read_body(&mut self) -> Option<Bytes> {
        let state = std::mem::replace(&mut self.body, BodyState::Cached(Bytes::new()));
        self.body = match state {
            BodyState::Unread(body) => match body.collect().await {
                Ok(collected) => BodyState::Cached(collected.to_bytes()),
                Err(err) => {
                    let err = CaptureError::from(err);
                    warn!(error = %err, "Request body could not be captured");
                    BodyState::Failed(err.to_string())
                }
            },
            settled => settled,
        };

        match &self.body {
            BodyState::Cached(bytes) => Some(bytes.clone()),
            _ => None,
        }
    }

    /// Body text for the log: decoded, whitespace collapsed, `[EMPTY]` when blank.
    ///
    /// For a form post this is the text rebuilt from the parsed parameters.
    pub async fn content(&mut self) -> String {
        let text = if let Some(params) = &self.form {
            params.to_body_text()
        } else {
            match self.read_body().await {
                Some(bytes) => charset::decode(&bytes, self.charset().as_deref()),
                None => return UNREADABLE_BODY.to_string(),
            }
        };
        normalize_space(&text)
    }

    /// Content type contains the urlencoded form marker and the method is POST.
    pub fn is_form_post(&self) -> bool {
        let is_form = self
            .content_type()
            .is_some_and(|value| value.to_ascii_lowercase().contains(FORM_CONTENT_TYPE));
        is_form && self.parts.method.as_str().eq_ignore_ascii_case(Method::POST.as_str())
    }

    /// The captured form parameters, or the query string for any other request.
    pub fn parameters(&self) -> Cow<'_, ParameterSet> {
        match &self.form {
            Some(params) => Cow::Borrowed(params),
            None => Cow::Owned(ParameterSet::from_query(self.parts.uri.query())),
        }
    }

    /// First value of `name`, see [`parameters`](Self::parameters).
    pub fn parameter(&self, name: &str) -> Option<String> {
        self.parameters().first(name).map(str::to_owned)
    }

    pub fn parameter_values(&self, name: &str) -> Option<Vec<String>> {
        self.parameters().values(name).map(<[String]>::to_vec)
    }

    pub fn parameter_names(&self) -> Vec<String> {
        self.parameters().names().map(str::to_owned).collect()
    }

    /// Request headers in log form: Title-Case names, first value only.
    pub fn headers(&self) -> HeaderSet {
        headers::snapshot(&self.parts.headers)
    }

    /// Peer address, when the server was started with connect info.
    pub fn sender(&self) -> Option<String> {
        self.parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    /// Extensions handed on to the forwarded request.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.parts.extensions
    }

    fn content_type(&self) -> Option<&str> {
        self.parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    fn charset(&self) -> Option<String> {
        self.content_type().and_then(charset::charset_of)
    }

    /// Rebuilds the request for the downstream handler.
    ///
    /// A cached body is replayed, an unread one is passed on untouched and a
    /// failed read surfaces as a body error. The parameter view is inserted as a
    /// [`ParameterSet`] extension.
    pub fn into_request(self) -> Request {
        let params = self.parameters().into_owned();
        let Self { mut parts, body, .. } = self;
        parts.extensions.insert(params);

        let body = match body {
            BodyState::Unread(body) => body,
            BodyState::Cached(bytes) => Body::from(bytes),
            BodyState::Failed(message) => Body::from_stream(stream::iter([Err::<Bytes, _>(
                CaptureError::Replay(message),
            )])),
        };
        Request::from_parts(parts, body)
    }
}

fn decode_component(input: &[u8], encoding: &'static Encoding) -> String {
    let spaced: Vec<u8> = input
        .iter()
        .map(|&byte| if byte == b'+' { b' ' } else { byte })
        .collect();
    let bytes: Cow<'_, [u8]> = percent_decode(&spaced).into();
    let (text, _) = encoding.decode_without_bom_handling(&bytes);
    text.into_owned()
}

fn normalize_space(text: &str) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        EMPTY_BODY.to_string()
    } else {
        normalized
    }
}
