//! XML property-list document (`<configuration><property>...`)
//!
//! Parsing ignores declarations, comments and unknown children such as
//! `<final>`; serialization is canonical and drops anything not modelled.
//! Text content is kept exactly as written, surrounding whitespace and
//! newlines included.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

/// XML declaration prepended to every serialized document
const XML_DECLARATION: &str = "<?xml version=\"1.0\"?>\n";

/// A single named property
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Property {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub value: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            description: String::new(),
        }
    }
}

/// Root `configuration` element
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename = "configuration")]
pub(crate) struct Document {
    #[serde(rename = "property")]
    pub properties: Vec<Property>,
}

/// Child of `<property>` currently being read
#[derive(Debug, Clone, Copy)]
enum Field {
    Name,
    Value,
    Description,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"name" => Some(Field::Name),
            b"value" => Some(Field::Value),
            b"description" => Some(Field::Description),
            _ => None,
        }
    }

    fn assign(self, prop: &mut Property, text: String) {
        match self {
            Field::Name => prop.name = text,
            Field::Value => prop.value = text,
            Field::Description => prop.description = text,
        }
    }
}

impl Document {
    /// Parse a `configuration` document.
    ///
    /// Only `property` elements directly under the root are read, and only
    /// their `name`, `value` and `description` children.
    pub fn from_xml(text: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);
        reader.config_mut().expand_empty_elements = true;

        let mut properties = Vec::new();
        let mut depth = 0usize;
        let mut saw_root = false;
        let mut current: Option<Property> = None;
        let mut field: Option<Field> = None;
        let mut buf = String::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| format!("{} at byte {}", e, reader.buffer_position()))?;
            match event {
                Event::Start(e) => {
                    depth += 1;
                    match depth {
                        1 => saw_root = true,
                        2 if e.name().as_ref() == b"property" => current = Some(Property::default()),
                        3 if current.is_some() => {
                            field = Field::from_tag(e.name().as_ref());
                            buf.clear();
                        }
                        _ => {}
                    }
                }
                Event::Text(t) if depth == 3 && field.is_some() => {
                    let unescaped = t.unescape().map_err(|e| e.to_string())?;
                    buf.push_str(&unescaped);
                }
                Event::CData(c) if depth == 3 && field.is_some() => {
                    buf.push_str(std::str::from_utf8(&c).map_err(|e| e.to_string())?);
                }
                Event::End(e) => {
                    match depth {
                        3 => {
                            if let (Some(f), Some(prop)) = (field.take(), current.as_mut()) {
                                f.assign(prop, std::mem::take(&mut buf));
                            }
                        }
                        2 if e.name().as_ref() == b"property" => {
                            properties.extend(current.take());
                        }
                        _ => {}
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err("no root element".to_string());
        }
        if depth != 0 {
            return Err(format!("unexpected end of document, {} element(s) left open", depth));
        }
        Ok(Self { properties })
    }

    pub fn to_xml(&self) -> Result<String, String> {
        let mut body = String::new();
        let mut ser = quick_xml::se::Serializer::new(&mut body);
        ser.indent(' ', 2);
        self.serialize(ser).map_err(|e| e.to_string())?;

        let mut out = String::with_capacity(XML_DECLARATION.len() + body.len() + 1);
        out.push_str(XML_DECLARATION);
        out.push_str(&body);
        out.push('\n');
        Ok(out)
    }
}
