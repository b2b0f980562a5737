//! XML element tree
//!
//! A small owned tree built with quick-xml. ISS carries all of its data in
//! attributes, so text nodes are dropped.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Element name of an ISS data block
const DATA_ELEMENT: &str = "data";

/// A parsed XML element with its attributes and child elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Tag name
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an element without attributes or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get an attribute value by exact name
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get the first child element with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Iterate over child elements with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Get a required child, failing with a malformed payload error
    pub(crate) fn require_child(&self, name: &str) -> Result<&XmlElement> {
        self.child(name).ok_or_else(|| {
            Error::malformed(format!("<{}> has no <{name}> section", self.name))
        })
    }
}

/// A parsed ISS response document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    /// Parse response text into a document
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => stack.push(element_from(&start)?),
                Ok(Event::Empty(start)) => {
                    let element = element_from(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::malformed("Unexpected closing tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Eof) => break,
                // Declarations, comments, text and CDATA carry nothing we read
                Ok(_) => {}
                Err(e) => {
                    return Err(Error::malformed(format!(
                        "Invalid XML at position {}: {e}",
                        reader.buffer_position()
                    )))
                }
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::malformed(format!(
                "Unclosed element <{}>",
                open.name
            )));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| Error::malformed("Document has no root element"))
    }

    /// Get the root element
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Iterate over the `<data>` blocks of the document
    pub fn blocks(&self) -> impl Iterator<Item = &XmlElement> {
        self.root.children_named(DATA_ELEMENT)
    }

    /// List the ids of all data blocks, in document order
    pub fn block_ids(&self) -> Vec<&str> {
        self.blocks().filter_map(|b| b.attr("id")).collect()
    }

    /// Select a data block by id, or the first block when no id is given
    pub fn block(&self, id: Option<&str>) -> Result<&XmlElement> {
        match id {
            Some(id) => self
                .blocks()
                .find(|b| b.attr("id") == Some(id))
                .ok_or_else(|| {
                    Error::malformed(format!(
                        "No data block '{id}' (available: {})",
                        self.block_ids().join(", ")
                    ))
                }),
            None => self
                .blocks()
                .next()
                .ok_or_else(|| Error::malformed("Document contains no <data> block")),
        }
    }
}

/// Build an element (without children) from a start tag
fn element_from(start: &BytesStart<'_>) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attr in start.attributes() {
        let attr = attr
            .map_err(|e| Error::malformed(format!("Invalid attribute in <{name}>: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::malformed(format!("Invalid value for '{key}' in <{name}>: {e}")))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Attach a finished element to its parent, or make it the root
fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }

    if root.is_some() {
        return Err(Error::malformed(format!(
            "Second root element <{}>",
            element.name
        )));
    }

    *root = Some(element);
    Ok(())
}
