use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

use super::TreeError;

/// Maximum element nesting accepted by [`parse_xml`].
/// Deeper documents are rejected before they can exhaust the stack of a
/// recursive schema decode.
pub const MAX_XML_DEPTH: usize = 256;

/// Index of a node inside its [`XmlDocument`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An element: its raw (possibly prefixed) name plus links to the nodes it
/// owns in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<NodeId>,
    pub children: Vec<NodeId>,
    pub namespaces: Vec<NodeId>,
}

impl Element {
    /// `dc` for `dc:creator`, `None` for `title`.
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// `creator` for `dc:creator`.
    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNodeKind {
    Element(Element),
    Attribute { name: String, value: String },
    Text(String),
    /// An `xmlns` / `xmlns:prefix` declaration. The default namespace has an
    /// empty prefix.
    Namespace { prefix: String, uri: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    /// Non-owning link to the containing element; `None` only for the root.
    pub parent: Option<NodeId>,
    pub kind: XmlNodeKind,
}

/// An XML document stored as an arena of nodes linked by index.
///
/// The document is immutable once [`parse_xml`] returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
    root: NodeId,
}

impl XmlDocument {
    pub fn root(&self) -> XmlNodeRef<'_> {
        self.get(self.root)
    }

    pub fn get(&self, id: NodeId) -> XmlNodeRef<'_> {
        XmlNodeRef { doc: self, id }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ============================================================================
// Node handle
// ============================================================================

/// A borrowed view of one node plus the document it lives in.
#[derive(Debug, Clone, Copy)]
pub struct XmlNodeRef<'a> {
    doc: &'a XmlDocument,
    id: NodeId,
}

impl PartialEq for XmlNodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl<'a> XmlNodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a XmlDocument {
        self.doc
    }

    pub fn kind(&self) -> &'a XmlNodeKind {
        &self.doc.nodes[self.id.0].kind
    }

    pub fn parent(&self) -> Option<XmlNodeRef<'a>> {
        self.doc.nodes[self.id.0].parent.map(|id| self.doc.get(id))
    }

    pub fn as_element(&self) -> Option<&'a Element> {
        match self.kind() {
            XmlNodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        self.as_element().is_some()
    }

    /// Element or attribute name, namespace prefix, or `None` for text.
    pub fn name(&self) -> Option<&'a str> {
        match self.kind() {
            XmlNodeKind::Element(element) => Some(&element.name),
            XmlNodeKind::Attribute { name, .. } => Some(name),
            XmlNodeKind::Namespace { prefix, .. } => Some(prefix),
            XmlNodeKind::Text(_) => None,
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = XmlNodeRef<'a>> + 'a {
        let doc = self.doc;
        self.as_element()
            .into_iter()
            .flat_map(move |e| e.attributes.iter().map(move |&id| doc.get(id)))
    }

    pub fn children(&self) -> impl Iterator<Item = XmlNodeRef<'a>> + 'a {
        let doc = self.doc;
        self.as_element()
            .into_iter()
            .flat_map(move |e| e.children.iter().map(move |&id| doc.get(id)))
    }

    pub fn child_elements(&self) -> impl Iterator<Item = XmlNodeRef<'a>> + 'a {
        self.children().filter(|c| c.is_element())
    }

    pub fn namespaces(&self) -> impl Iterator<Item = XmlNodeRef<'a>> + 'a {
        let doc = self.doc;
        self.as_element()
            .into_iter()
            .flat_map(move |e| e.namespaces.iter().map(move |&id| doc.get(id)))
    }

    /// Scalar content of the node: attribute value, namespace URI, text, or
    /// the concatenated direct text children of an element.
    pub fn text(&self) -> Cow<'a, str> {
        match self.kind() {
            XmlNodeKind::Attribute { value, .. } => Cow::Borrowed(value),
            XmlNodeKind::Namespace { uri, .. } => Cow::Borrowed(uri),
            XmlNodeKind::Text(text) => Cow::Borrowed(text),
            XmlNodeKind::Element(_) => {
                let mut texts = self.children().filter_map(|c| match c.kind() {
                    XmlNodeKind::Text(t) => Some(t.as_str()),
                    _ => None,
                });
                match (texts.next(), texts.next()) {
                    (None, _) => Cow::Borrowed(""),
                    (Some(only), None) => Cow::Borrowed(only),
                    (Some(first), Some(second)) => {
                        let mut joined = String::from(first);
                        joined.push_str(second);
                        texts.for_each(|t| joined.push_str(t));
                        Cow::Owned(joined)
                    }
                }
            }
        }
    }

    /// Resolves a namespace prefix by walking from this node up to the root.
    pub fn lookup_namespace(&self, prefix: &str) -> Option<&'a str> {
        let mut current = Some(*self);
        while let Some(node) = current {
            let found = node.namespaces().find_map(|ns| match ns.kind() {
                XmlNodeKind::Namespace { prefix: p, uri } if p == prefix => Some(uri.as_str()),
                _ => None,
            });
            if found.is_some() {
                return found;
            }
            current = node.parent();
        }
        None
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self.kind() {
            XmlNodeKind::Element(_) => "an element",
            XmlNodeKind::Attribute { .. } => "an attribute",
            XmlNodeKind::Text(_) => "a text node",
            XmlNodeKind::Namespace { .. } => "a namespace declaration",
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

#[derive(Default)]
struct Arena {
    nodes: Vec<XmlNode>,
}

impl Arena {
    fn push(&mut self, parent: Option<NodeId>, kind: XmlNodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(XmlNode { parent, kind });
        id
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            XmlNodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Appends text to `parent`, merging with a directly preceding text node
    /// so that text split by CDATA sections reads back as one value.
    fn push_text(&mut self, parent: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        let last = self
            .element_mut(parent)
            .and_then(|e| e.children.last().copied());
        if let Some(last) = last {
            if let XmlNodeKind::Text(existing) = &mut self.nodes[last.0].kind {
                existing.push_str(text);
                return;
            }
        }
        let id = self.push(Some(parent), XmlNodeKind::Text(text.to_string()));
        if let Some(element) = self.element_mut(parent) {
            element.children.push(id);
        }
    }
}

fn xml_err(e: impl std::fmt::Display) -> TreeError {
    TreeError::Xml(e.to_string())
}

/// Builds an [`XmlDocument`] from XML text.
///
/// Text is trimmed, CDATA is merged into the surrounding text, `xmlns`
/// attributes become namespace nodes, and comments, processing instructions
/// and doctype declarations are skipped. `quick-xml` only resolves the five
/// predefined entities; anything declared in a DOCTYPE is an error.
pub fn parse_xml(text: &str) -> Result<XmlDocument, TreeError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut arena = Arena::default();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut root: Option<NodeId> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let id = open_element(&mut arena, &e, &reader, &stack, &mut root)?;
                stack.push(id);
                if stack.len() > MAX_XML_DEPTH {
                    return Err(TreeError::MaxDepthExceeded(MAX_XML_DEPTH));
                }
            }
            Ok(Event::Empty(e)) => {
                open_element(&mut arena, &e, &reader, &stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(e)) => {
                if let Some(&parent) = stack.last() {
                    let text = e.unescape().map_err(xml_err)?;
                    arena.push_text(parent, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(&parent) = stack.last() {
                    let bytes = e.into_inner();
                    let text = std::str::from_utf8(&bytes).map_err(xml_err)?;
                    arena.push_text(parent, text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    let root = root.ok_or(TreeError::NoRootElement)?;
    tracing::debug!(nodes = arena.nodes.len(), "Built XML document tree");
    Ok(XmlDocument {
        nodes: arena.nodes,
        root,
    })
}

fn open_element(
    arena: &mut Arena,
    e: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
    stack: &[NodeId],
    root: &mut Option<NodeId>,
) -> Result<NodeId, TreeError> {
    let parent = stack.last().copied();
    if parent.is_none() && root.is_some() {
        return Err(TreeError::Xml("multiple root elements".to_string()));
    }

    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(xml_err)?
        .to_string();
    let id = arena.push(
        parent,
        XmlNodeKind::Element(Element {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            namespaces: Vec::new(),
        }),
    );

    let decoder = reader.decoder();
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(xml_err)?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(xml_err)?;
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(xml_err)?
            .into_owned();

        let namespace_prefix = if key == "xmlns" {
            Some("")
        } else {
            key.strip_prefix("xmlns:")
        };
        match namespace_prefix {
            Some(prefix) => {
                let ns = arena.push(
                    Some(id),
                    XmlNodeKind::Namespace {
                        prefix: prefix.to_string(),
                        uri: value,
                    },
                );
                if let Some(element) = arena.element_mut(id) {
                    element.namespaces.push(ns);
                }
            }
            None => {
                let attr_id = arena.push(
                    Some(id),
                    XmlNodeKind::Attribute {
                        name: key.to_string(),
                        value,
                    },
                );
                if let Some(element) = arena.element_mut(id) {
                    element.attributes.push(attr_id);
                }
            }
        }
    }

    match parent {
        Some(parent) => {
            if let Some(element) = arena.element_mut(parent) {
                element.children.push(id);
            }
        }
        None => *root = Some(id),
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RSS: &str = r#"<?xml version="1.0"?>
<!-- comment -->
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Example &amp; Co</title>
    <item><title><![CDATA[<b>Bold</b>]]> tail</title><dc:creator>Ann</dc:creator></item>
    <item/>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_structure() {
        let doc = parse_xml(RSS).unwrap();
        let root = doc.root();
        assert_eq!(root.name(), Some("rss"));
        assert_eq!(root.attributes().count(), 1);
        assert_eq!(root.namespaces().count(), 1);

        let channel = root.child_elements().next().unwrap();
        assert_eq!(channel.name(), Some("channel"));
        assert_eq!(channel.parent(), Some(root));

        let names: Vec<_> = channel.child_elements().filter_map(|c| c.name()).collect();
        assert_eq!(names, vec!["title", "item", "item"]);
    }

    #[test]
    fn test_text_unescaped_and_cdata_merged() {
        let doc = parse_xml(RSS).unwrap();
        let channel = doc.root().child_elements().next().unwrap();
        let title = channel.child_elements().next().unwrap();
        assert_eq!(title.text(), "Example & Co");

        let item = channel.child_elements().nth(1).unwrap();
        let item_title = item.child_elements().next().unwrap();
        assert_eq!(item_title.text(), "<b>Bold</b>tail");
    }

    #[test]
    fn test_element_prefix_and_local_name() {
        let doc = parse_xml(RSS).unwrap();
        let item = doc
            .root()
            .child_elements()
            .next()
            .unwrap()
            .child_elements()
            .nth(1)
            .unwrap();
        let creator = item.child_elements().nth(1).unwrap().as_element().unwrap();
        assert_eq!(creator.prefix(), Some("dc"));
        assert_eq!(creator.local_name(), "creator");
    }

    #[test]
    fn test_namespace_lookup_walks_up() {
        let doc = parse_xml(RSS).unwrap();
        let channel = doc.root().child_elements().next().unwrap();
        assert_eq!(
            channel.lookup_namespace("dc"),
            Some("http://purl.org/dc/elements/1.1/")
        );
        assert_eq!(channel.lookup_namespace("media"), None);
    }

    #[test]
    fn test_default_namespace_has_empty_prefix() {
        let doc = parse_xml(r#"<feed xmlns="http://www.w3.org/2005/Atom"/>"#).unwrap();
        assert_eq!(
            doc.root().lookup_namespace(""),
            Some("http://www.w3.org/2005/Atom")
        );
        assert_eq!(doc.root().attributes().count(), 0);
    }

    #[test]
    fn test_empty_input_has_no_root() {
        assert!(matches!(parse_xml(""), Err(TreeError::NoRootElement)));
    }

    #[test]
    fn test_mismatched_tags_rejected() {
        assert!(matches!(parse_xml("<a><b></a>"), Err(TreeError::Xml(_))));
    }

    #[test]
    fn test_max_depth_exceeded() {
        let depth = MAX_XML_DEPTH + 1;
        let xml = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
        assert!(matches!(
            parse_xml(&xml),
            Err(TreeError::MaxDepthExceeded(MAX_XML_DEPTH))
        ));
    }

    #[test]
    fn test_custom_entity_rejected() {
        let xml = r#"<!DOCTYPE a [<!ENTITY xxe SYSTEM "file:///etc/passwd">]><a>&xxe;</a>"#;
        assert!(parse_xml(xml).is_err());
    }
}
