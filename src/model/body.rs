//! Content-type-tagged body payload.
//!
//! # Design Decisions
//! - Bytes are kept decoded; the content encoding is applied on `raw()`
//! - The content type is inferred once at creation and only changes
//!   through `transform::content`

use std::borrow::Cow;
use std::fmt;

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GatewayError;
use crate::model::header::{Header, CONTENT_ENCODING, CONTENT_TYPE};
use crate::transform::content;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    Json,
    Xml,
    #[serde(alias = "PLAIN_TEXT")]
    Text,
    #[serde(other)]
    Unknown,
}

impl ContentType {
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();
        if mime.contains("json") {
            ContentType::Json
        } else if mime.contains("xml") {
            ContentType::Xml
        } else if mime.starts_with("text/") {
            ContentType::Text
        } else {
            ContentType::Unknown
        }
    }

    /// Best guess for a payload that arrived without a `Content-Type`.
    fn sniff(bytes: &[u8]) -> Self {
        let trimmed = String::from_utf8_lossy(bytes);
        let trimmed = trimmed.trim_start();
        if serde_json::from_slice::<Value>(bytes).is_ok() {
            ContentType::Json
        } else if trimmed.starts_with('<') {
            ContentType::Xml
        } else {
            ContentType::Text
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::Xml => "application/xml",
            ContentType::Text => "text/plain",
            ContentType::Unknown => "application/octet-stream",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentEncoding {
    #[default]
    None,
    Gzip,
    Deflate,
    #[serde(other)]
    Unknown,
}

impl ContentEncoding {
    pub fn from_header(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "identity" => ContentEncoding::None,
            "gzip" | "x-gzip" => ContentEncoding::Gzip,
            "deflate" => ContentEncoding::Deflate,
            _ => ContentEncoding::Unknown,
        }
    }

    pub fn header_value(&self) -> Option<&'static str> {
        match self {
            ContentEncoding::Gzip => Some("gzip"),
            ContentEncoding::Deflate => Some("deflate"),
            ContentEncoding::None | ContentEncoding::Unknown => None,
        }
    }
}

impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_value().unwrap_or("none"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    content_type: ContentType,
    mime: String,
    content_encoding: ContentEncoding,
    value: Bytes,
}

impl Body {
    pub fn new(content_type: ContentType, value: impl Into<Bytes>) -> Self {
        Self {
            content_type,
            mime: content_type.mime().to_string(),
            content_encoding: ContentEncoding::None,
            value: value.into(),
        }
    }

    pub fn json(value: &Value) -> Self {
        Self::new(ContentType::Json, value.to_string())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(ContentType::Text, value.into())
    }

    /// Build a body from bytes received on the wire, decoding them according
    /// to the `Content-Encoding` header. Empty payloads have no body.
    pub fn from_wire(header: &Header, raw: Bytes) -> Result<Option<Self>, GatewayError> {
        if raw.is_empty() {
            return Ok(None);
        }

        let encoding = header
            .get(CONTENT_ENCODING)
            .map(ContentEncoding::from_header)
            .unwrap_or_default();
        let value = content::decode(encoding, &raw)?;

        let (content_type, mime) = match header.get(CONTENT_TYPE) {
            Some(mime) => (ContentType::from_mime(mime), mime.to_string()),
            None => {
                let sniffed = ContentType::sniff(&value);
                (sniffed, sniffed.mime().to_string())
            }
        };

        Ok(Some(Self {
            content_type,
            mime,
            content_encoding: encoding,
            value: value.into(),
        }))
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn content_encoding(&self) -> ContentEncoding {
        self.content_encoding
    }

    /// The `Content-Type` header value to send with this body.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn is_json(&self) -> bool {
        self.content_type == ContentType::Json
    }

    /// Decoded bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.value
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }

    /// Bytes as they go on the wire, with the content encoding applied.
    pub fn raw(&self) -> Result<Bytes, GatewayError> {
        content::encode(self.content_encoding, &self.value).map(Bytes::from)
    }

    /// Parsed JSON for JSON bodies.
    pub fn json_value(&self) -> Option<Value> {
        if self.is_json() {
            crate::json::parse(&self.value)
        } else {
            None
        }
    }

    /// Generic view: JSON as parsed, XML converted to JSON, anything else
    /// as a JSON string.
    pub fn to_json(&self) -> Value {
        match self.content_type {
            ContentType::Json => self
                .json_value()
                .unwrap_or_else(|| Value::String(self.as_str().into_owned())),
            ContentType::Xml => content::xml_to_json(&self.value)
                .unwrap_or_else(|_| Value::String(self.as_str().into_owned())),
            ContentType::Text | ContentType::Unknown => Value::String(self.as_str().into_owned()),
        }
    }

    /// Same content type and encoding, new JSON content.
    pub fn with_json(&self, value: &Value) -> Self {
        Self {
            value: value.to_string().into(),
            ..self.clone()
        }
    }

    /// Same content type and encoding, new bytes.
    pub fn with_bytes(&self, value: impl Into<Bytes>) -> Self {
        Self {
            value: value.into(),
            ..self.clone()
        }
    }

    pub(crate) fn with_content_type(&self, content_type: ContentType, value: impl Into<Bytes>) -> Self {
        Self {
            content_type,
            mime: content_type.mime().to_string(),
            content_encoding: self.content_encoding,
            value: value.into(),
        }
    }

    pub(crate) fn with_content_encoding(&self, content_encoding: ContentEncoding) -> Self {
        Self {
            content_encoding,
            ..self.clone()
        }
    }
}
