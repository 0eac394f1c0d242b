//! Body representation conversions: JSON, XML and text content types, and
//! gzip / deflate content encodings.

use std::io::{Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::GatewayError;
use crate::model::body::{Body, ContentEncoding, ContentType};

/// Element that wraps JSON rendered as XML.
const XML_ROOT: &str = "root";
/// Element name for array items with no enclosing key.
const XML_ITEM: &str = "item";

fn encoding_error(encoding: ContentEncoding, err: std::io::Error) -> GatewayError {
    GatewayError::Encoding {
        encoding: encoding.to_string(),
        reason: err.to_string(),
    }
}

/// Undo a content encoding. `None` and unknown encodings pass bytes through.
pub fn decode(encoding: ContentEncoding, raw: &[u8]) -> Result<Vec<u8>, GatewayError> {
    let mut out = Vec::new();
    match encoding {
        ContentEncoding::Gzip => GzDecoder::new(raw)
            .read_to_end(&mut out)
            .map_err(|e| encoding_error(encoding, e))?,
        ContentEncoding::Deflate => ZlibDecoder::new(raw)
            .read_to_end(&mut out)
            .map_err(|e| encoding_error(encoding, e))?,
        ContentEncoding::None | ContentEncoding::Unknown => return Ok(raw.to_vec()),
    };
    Ok(out)
}

/// Apply a content encoding.
pub fn encode(encoding: ContentEncoding, raw: &[u8]) -> Result<Vec<u8>, GatewayError> {
    match encoding {
        ContentEncoding::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(raw).map_err(|e| encoding_error(encoding, e))?;
            encoder.finish().map_err(|e| encoding_error(encoding, e))
        }
        ContentEncoding::Deflate => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(raw).map_err(|e| encoding_error(encoding, e))?;
            encoder.finish().map_err(|e| encoding_error(encoding, e))
        }
        ContentEncoding::None | ContentEncoding::Unknown => Ok(raw.to_vec()),
    }
}

fn conversion_error(from: ContentType, to: ContentType, reason: impl ToString) -> GatewayError {
    GatewayError::Conversion {
        from: from.to_string(),
        to: to.to_string(),
        reason: reason.to_string(),
    }
}

/// Render JSON as XML under a `<root>` element.
pub fn json_to_xml(value: &Value) -> String {
    let mut out = String::new();
    write_xml_element(&mut out, XML_ROOT, value);
    out
}

fn write_xml_element(out: &mut String, name: &str, value: &Value) {
    match value {
        // Arrays repeat the enclosing element once per item.
        Value::Array(items) if name != XML_ROOT => {
            for item in items {
                write_xml_element(out, name, item);
            }
        }
        Value::Array(items) => {
            out.push_str(&format!("<{name}>"));
            for item in items {
                write_xml_element(out, XML_ITEM, item);
            }
            out.push_str(&format!("</{name}>"));
        }
        Value::Object(map) => {
            out.push_str(&format!("<{name}>"));
            for (key, child) in map {
                write_xml_element(out, key, child);
            }
            out.push_str(&format!("</{name}>"));
        }
        Value::Null => out.push_str(&format!("<{name}/>")),
        Value::String(s) => out.push_str(&format!("<{name}>{}</{name}>", escape(s.as_str()))),
        other => out.push_str(&format!("<{name}>{other}</{name}>")),
    }
}

struct XmlNode {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl XmlNode {
    fn open(start: &BytesStart<'_>) -> Result<Self, String> {
        let mut children = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            children.insert(key, Value::String(value.into_owned()));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            children,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim().to_string();
        let value = match (self.children.is_empty(), text.is_empty()) {
            (true, true) => Value::Null,
            (true, false) => Value::String(text),
            (false, true) => Value::Object(self.children),
            (false, false) => {
                let mut children = self.children;
                children.insert("#text".to_string(), Value::String(text));
                Value::Object(children)
            }
        };
        (self.name, value)
    }

    /// Repeated child elements collect into an array.
    fn insert(&mut self, name: String, value: Value) {
        match self.children.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }
}

/// Parse XML into JSON. The document element itself is unwrapped; its
/// attributes become `@name` members and mixed text goes under `#text`.
pub fn xml_to_json(raw: &[u8]) -> Result<Value, GatewayError> {
    let fail = |reason: String| conversion_error(ContentType::Xml, ContentType::Json, reason);
    let text = std::str::from_utf8(raw).map_err(|e| fail(e.to_string()))?;

    let mut reader = Reader::from_str(text);
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut document: Option<Value> = None;

    loop {
        match reader.read_event().map_err(|e| fail(e.to_string()))? {
            Event::Start(start) => stack.push(XmlNode::open(&start).map_err(fail)?),
            Event::Empty(start) => {
                let (name, value) = XmlNode::open(&start).map_err(fail)?.close();
                match stack.last_mut() {
                    Some(parent) => parent.insert(name, value),
                    None => document = Some(value),
                }
            }
            Event::Text(t) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&t.unescape().map_err(|e| fail(e.to_string()))?);
                }
            }
            Event::CData(data) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| fail("unbalanced end tag".into()))?;
                let (name, value) = node.close();
                match stack.last_mut() {
                    Some(parent) => parent.insert(name, value),
                    None => document = Some(value),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(fail("unclosed element".into()));
    }
    document.ok_or_else(|| fail("no document element".into()))
}

/// Convert a body to another content type. Unknown targets, unknown sources
/// and same-type conversions return the body unchanged.
pub fn convert(body: &Body, target: ContentType) -> Result<Body, GatewayError> {
    let from = body.content_type();
    if from == target || target == ContentType::Unknown || from == ContentType::Unknown {
        return Ok(body.clone());
    }

    let bytes: Vec<u8> = match (from, target) {
        (ContentType::Json, ContentType::Xml) => {
            let value = body
                .json_value()
                .ok_or_else(|| conversion_error(from, target, "body is not valid json"))?;
            json_to_xml(&value).into_bytes()
        }
        (ContentType::Xml, ContentType::Json) => xml_to_json(body.bytes())?.to_string().into_bytes(),
        (ContentType::Text, ContentType::Json) => match crate::json::parse(body.bytes()) {
            Some(value) => value.to_string().into_bytes(),
            None => Value::String(body.as_str().into_owned()).to_string().into_bytes(),
        },
        (ContentType::Text, ContentType::Xml) => {
            format!("<{XML_ROOT}>{}</{XML_ROOT}>", escape(&body.as_str())).into_bytes()
        }
        // Both JSON and XML already are text.
        (_, ContentType::Text) => body.bytes().to_vec(),
        _ => return Ok(body.clone()),
    };
    Ok(body.with_content_type(target, bytes))
}

/// Switch the encoding applied when the body is written out.
pub fn modify_content_encoding(body: &Body, encoding: ContentEncoding) -> Body {
    if encoding == ContentEncoding::Unknown {
        return body.clone();
    }
    body.with_content_encoding(encoding)
}
