//! Per-exchange message envelope.
//!
//! A [`Message`] carries the payload of one direction of an exchange through
//! the interceptor chain, together with transport headers, SOAP header
//! fragments, attachments and a type-keyed property bag.

use crate::error::{Result, SoapError};
use crate::fault::Fault;
use crate::parser::{parse_document, write_element};
use crate::qname::QName;
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::io::{Cursor, Read};
use xmltree::Element;

/// A read-once XML byte stream.
pub struct XmlStream {
    reader: Box<dyn Read + Send>,
}

impl XmlStream {
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::from_reader(Cursor::new(bytes.into()))
    }

    /// Drain the stream into a string.
    pub fn read_to_string(mut self) -> Result<String> {
        let mut out = String::new();
        self.reader.read_to_string(&mut out)?;
        Ok(out)
    }

    /// Drain and parse the stream.
    pub fn into_tree(mut self) -> Result<Element> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_document(&data)
    }

    pub fn into_reader(self) -> Box<dyn Read + Send> {
        self.reader
    }
}

impl fmt::Debug for XmlStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("XmlStream { .. }")
    }
}

/// Payload representations.
#[derive(Debug)]
pub enum Content {
    Tree(Element),
    Stream(XmlStream),
}

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,
    Tree(Element),
    Stream(XmlStream),
    Consumed,
}

/// Mutable per-exchange record flowing through a chain.
#[derive(Default)]
pub struct Message {
    content: Slot,
    fault: Option<Fault>,
    transport_headers: HashMap<String, String>,
    soap_headers: IndexMap<QName, Vec<Element>>,
    attachments: HashMap<String, Vec<u8>>,
    properties: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message whose payload is an element tree.
    pub fn with_tree(element: Element) -> Self {
        let mut message = Self::new();
        message.set_content(Content::Tree(element));
        message
    }

    /// Message whose payload is a byte stream.
    pub fn with_stream(stream: XmlStream) -> Self {
        let mut message = Self::new();
        message.set_content(Content::Stream(stream));
        message
    }

    // --- content ---

    /// Overwrite the payload.
    pub fn set_content(&mut self, content: Content) {
        self.content = match content {
            Content::Tree(element) => Slot::Tree(element),
            Content::Stream(stream) => Slot::Stream(stream),
        };
    }

    /// Drop the payload (a message with an empty body).
    pub fn clear_content(&mut self) {
        self.content = Slot::Empty;
    }

    pub fn has_content(&self) -> bool {
        matches!(self.content, Slot::Tree(_) | Slot::Stream(_))
    }

    /// The payload as a tree, parsing a pending stream on first access.
    pub fn content_tree(&mut self) -> Result<Option<&Element>> {
        self.materialize()?;
        match &self.content {
            Slot::Tree(element) => Ok(Some(element)),
            Slot::Empty => Ok(None),
            Slot::Stream(_) | Slot::Consumed => Err(SoapError::ContentConsumed),
        }
    }

    /// Mutable access to the payload tree.
    pub fn content_tree_mut(&mut self) -> Result<Option<&mut Element>> {
        self.materialize()?;
        match &mut self.content {
            Slot::Tree(element) => Ok(Some(element)),
            Slot::Empty => Ok(None),
            Slot::Stream(_) | Slot::Consumed => Err(SoapError::ContentConsumed),
        }
    }

    /// Remove the payload as a tree, leaving the message empty.
    pub fn take_tree(&mut self) -> Result<Option<Element>> {
        self.materialize()?;
        match std::mem::take(&mut self.content) {
            Slot::Tree(element) => Ok(Some(element)),
            Slot::Empty => Ok(None),
            other @ (Slot::Stream(_) | Slot::Consumed) => {
                self.content = other;
                Err(SoapError::ContentConsumed)
            }
        }
    }

    /// Remove the payload as a stream. A tree payload is serialized.
    ///
    /// The message is left consumed: any later read fails until new
    /// content is set.
    pub fn take_stream(&mut self) -> Result<XmlStream> {
        match std::mem::replace(&mut self.content, Slot::Consumed) {
            Slot::Stream(stream) => Ok(stream),
            Slot::Tree(element) => Ok(XmlStream::from_bytes(write_element(&element)?)),
            Slot::Empty => {
                self.content = Slot::Empty;
                Err(SoapError::MissingContent)
            }
            Slot::Consumed => Err(SoapError::ContentConsumed),
        }
    }

    fn materialize(&mut self) -> Result<()> {
        if matches!(self.content, Slot::Stream(_)) {
            if let Slot::Stream(stream) = std::mem::replace(&mut self.content, Slot::Consumed) {
                self.content = Slot::Tree(stream.into_tree()?);
            }
        }
        Ok(())
    }

    // --- fault ---

    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    pub fn set_fault(&mut self, fault: Fault) {
        self.fault = Some(fault);
    }

    pub fn take_fault(&mut self) -> Option<Fault> {
        self.fault.take()
    }

    // --- transport headers ---

    /// Case-insensitive transport header lookup.
    pub fn transport_header(&self, name: &str) -> Option<&str> {
        self.transport_headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set a transport header, replacing any value stored under another case.
    pub fn set_transport_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.transport_headers
            .retain(|key, _| !key.eq_ignore_ascii_case(&name));
        self.transport_headers.insert(name, value.into());
    }

    pub fn transport_headers(&self) -> &HashMap<String, String> {
        &self.transport_headers
    }

    // --- SOAP headers ---

    /// Append a header entry to the fragment stored under its element name.
    ///
    /// Entries sharing a name are all kept, in document order.
    pub fn insert_soap_header(&mut self, header: Element) {
        self.soap_headers
            .entry(QName::of(&header))
            .or_default()
            .push(header);
    }

    /// First entry stored under `name`.
    pub fn soap_header(&self, name: &QName) -> Option<&Element> {
        self.soap_header_entries(name).first()
    }

    /// Every entry stored under `name`.
    pub fn soap_header_entries(&self, name: &QName) -> &[Element] {
        self.soap_headers
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Remove a header fragment, keeping the order of the others.
    pub fn remove_soap_header(&mut self, name: &QName) -> Option<Vec<Element>> {
        self.soap_headers.shift_remove(name)
    }

    /// Header fragments, ordered by first occurrence of each name.
    pub fn soap_headers(&self) -> &IndexMap<QName, Vec<Element>> {
        &self.soap_headers
    }

    /// Remove every header entry, in order.
    pub fn drain_soap_headers(&mut self) -> Vec<Element> {
        std::mem::take(&mut self.soap_headers)
            .into_values()
            .flatten()
            .collect()
    }

    // --- attachments ---

    pub fn add_attachment(&mut self, id: impl Into<String>, data: Vec<u8>) {
        self.attachments.insert(id.into(), data);
    }

    pub fn attachment(&self, id: &str) -> Option<&[u8]> {
        self.attachments.get(id).map(Vec::as_slice)
    }

    pub fn attachments(&self) -> &HashMap<String, Vec<u8>> {
        &self.attachments
    }

    // --- properties ---

    /// Store a typed property, returning the previous value of that type.
    pub fn put<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.properties
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.properties
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.properties
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut::<T>())
    }

    pub fn remove<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.properties
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.properties.contains_key(&TypeId::of::<T>())
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("content", &self.content)
            .field("fault", &self.fault)
            .field("transport_headers", &self.transport_headers)
            .field("soap_headers", &self.soap_headers.keys().collect::<Vec<_>>())
            .field("attachments", &self.attachments.keys().collect::<Vec<_>>())
            .field("properties", &self.properties.len())
            .finish()
    }
}
