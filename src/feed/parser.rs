//! RSS page parser
//!
//! Reads RSS-shaped responses with quick-xml. Every `<item>` becomes a JSON
//! object keyed by qualified child element name; repeated children collapse
//! into arrays and empty children keep their attributes, also when nested
//! inside another field. Direct children of `<channel>` become page metadata,
//! and the configured continuation element among them becomes
//! [`Page::next_request`].

use super::types::{FeedParser, Page};
use crate::config::{PaginationPolicy, DEFAULT_CONTINUATION_ELEMENT, DEFAULT_ITEM_ELEMENT};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, OptionStringExt};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Deepest element nesting accepted in a response
const MAX_DEPTH: usize = 64;

const CHANNEL_ELEMENT: &str = "channel";

/// Key for text that sits next to structured children
const TEXT_KEY: &str = "#text";

/// quick-xml backed parser for RSS pages
#[derive(Debug, Clone)]
pub struct RssParser {
    item_element: String,
    continuation_element: String,
}

impl Default for RssParser {
    fn default() -> Self {
        Self {
            item_element: DEFAULT_ITEM_ELEMENT.to_string(),
            continuation_element: DEFAULT_CONTINUATION_ELEMENT.to_string(),
        }
    }
}

impl RssParser {
    /// Create a parser with default element names
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser using the element names of a pagination policy
    pub fn from_policy(policy: &PaginationPolicy) -> Self {
        Self {
            item_element: policy.item_element.clone(),
            continuation_element: policy.continuation_element.clone(),
        }
    }

    /// Set the item element name
    #[must_use]
    pub fn with_item_element(mut self, element: impl Into<String>) -> Self {
        self.item_element = element.into();
        self
    }

    /// Set the continuation element name
    #[must_use]
    pub fn with_continuation_element(mut self, element: impl Into<String>) -> Self {
        self.continuation_element = element.into();
        self
    }

    fn kind_of(&self, name: &str) -> FrameKind {
        if name == self.item_element {
            FrameKind::Item(JsonObject::new())
        } else if name == CHANNEL_ELEMENT {
            FrameKind::Channel
        } else {
            FrameKind::Field
        }
    }

    /// Hand a finished element to whatever encloses it
    fn attach(&self, stack: &mut [Frame], page: &mut Page, name: String, value: JsonValue) {
        let Some(parent) = stack.last_mut() else {
            return;
        };

        match &mut parent.kind {
            FrameKind::Item(fields) => insert_field(fields, name, value),
            FrameKind::Channel => {
                if name == self.continuation_element {
                    page.next_request = value
                        .as_str()
                        .map(|s| s.trim().to_string())
                        .none_if_blank();
                }
                insert_field(&mut page.channel, name, value);
            }
            FrameKind::Field => match value {
                JsonValue::String(text) => {
                    if !text.is_empty() {
                        if !parent.text.is_empty() {
                            parent.text.push(' ');
                        }
                        parent.text.push_str(&text);
                    }
                }
                other => insert_field(&mut parent.children, name, other),
            },
        }
    }
}

impl FeedParser for RssParser {
    fn parse(&self, body: &[u8]) -> Result<Page> {
        let xml = std::str::from_utf8(body)
            .map_err(|e| Error::xml(format!("response is not UTF-8: {e}")))?;

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut page = Page::default();
        let mut stack: Vec<Frame> = Vec::new();
        let mut saw_channel = false;

        loop {
            let event = reader.read_event().map_err(|e| {
                Error::xml(format!("at byte {}: {e}", reader.buffer_position()))
            })?;

            match event {
                Event::Start(e) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(Error::xml(format!(
                            "nesting deeper than {MAX_DEPTH} elements"
                        )));
                    }
                    let name = element_name(&e);
                    let kind = self.kind_of(&name);
                    saw_channel |= matches!(kind, FrameKind::Channel);
                    stack.push(Frame {
                        name,
                        text: String::new(),
                        children: JsonObject::new(),
                        kind,
                    });
                }
                Event::Empty(e) => {
                    let name = element_name(&e);
                    match self.kind_of(&name) {
                        FrameKind::Item(fields) => page.items.push(JsonValue::Object(fields)),
                        FrameKind::Channel => saw_channel = true,
                        FrameKind::Field => {
                            let value = attributes_of(&e)?;
                            self.attach(&mut stack, &mut page, name, value);
                        }
                    }
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(|e| Error::xml(e.to_string()))?;
                    if let Some(frame) = stack.last_mut() {
                        frame.text.push_str(&text);
                    }
                }
                Event::CData(e) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::End(_) => {
                    let Some(frame) = stack.pop() else {
                        return Err(Error::xml("closing tag without opening tag"));
                    };
                    match frame.kind {
                        FrameKind::Item(fields) => page.items.push(JsonValue::Object(fields)),
                        FrameKind::Channel => {}
                        FrameKind::Field => {
                            let value = field_value(frame.text, frame.children);
                            self.attach(&mut stack, &mut page, frame.name, value);
                        }
                    }
                }
                Event::Eof => {
                    if let Some(frame) = stack.last() {
                        return Err(Error::xml(format!(
                            "document ended inside <{}>",
                            frame.name
                        )));
                    }
                    break;
                }
                _ => {}
            }
        }

        if !saw_channel {
            return Err(Error::xml("missing <channel> element"));
        }

        Ok(page)
    }
}

/// An element being read
struct Frame {
    name: String,
    text: String,
    /// Nested elements that carried attributes
    children: JsonObject,
    kind: FrameKind,
}

enum FrameKind {
    Channel,
    Item(JsonObject),
    Field,
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Attributes of an empty element as an object, or "" when it has none
fn attributes_of(e: &BytesStart<'_>) -> Result<JsonValue> {
    let mut attrs = JsonObject::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| Error::xml(e.to_string()))?;
        attrs.insert(key, JsonValue::String(value.into_owned()));
    }

    if attrs.is_empty() {
        Ok(JsonValue::String(String::new()))
    } else {
        Ok(JsonValue::Object(attrs))
    }
}

/// Plain text, or an object when nested elements carried attributes
///
/// Text alongside such children is kept under `#text`.
fn field_value(text: String, mut children: JsonObject) -> JsonValue {
    if children.is_empty() {
        return JsonValue::String(text);
    }
    if !text.is_empty() {
        children.insert(TEXT_KEY.to_string(), JsonValue::String(text));
    }
    JsonValue::Object(children)
}

/// Insert a field, turning repeats into an array
fn insert_field(fields: &mut JsonObject, name: String, value: JsonValue) {
    match fields.get_mut(&name) {
        Some(JsonValue::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = JsonValue::Array(vec![first, value]);
        }
        None => {
            fields.insert(name, value);
        }
    }
}
