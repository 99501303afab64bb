use std::borrow::Cow;

use super::resolve;
use super::{Decode, Decoder, Node, UnkeyedContainer};
use crate::error::{CodingPath, DecodeError, PathSegment};
use crate::options::DecoderOptions;
use crate::value::JsonValue;

/// Named-field view over a JSON object or an XML element.
///
/// Keys are compared after the active [`crate::KeyStrategy`] has been applied
/// to the names found in the tree. On XML, a key answers to an attribute, a
/// child element, or a namespace declaration, in that order.
#[derive(Debug, Clone)]
pub struct KeyedContainer<'a> {
    node: Node<'a>,
    path: CodingPath,
    options: &'a DecoderOptions,
    namespace: Option<String>,
}

impl<'a> KeyedContainer<'a> {
    pub(crate) fn new(node: Node<'a>, path: CodingPath, options: &'a DecoderOptions) -> Self {
        Self {
            node,
            path,
            options,
            namespace: None,
        }
    }

    pub fn path(&self) -> &CodingPath {
        &self.path
    }

    /// The namespace prefix keys are currently qualified with.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// A view of the same node whose keys are qualified with `prefix`.
    ///
    /// On XML the prefix must be declared on this element or one of its
    /// ancestors, otherwise the call fails with `NamespaceUnresolved`. On JSON
    /// the prefix is applied to key names as-is.
    pub fn namespaced(&self, prefix: &str) -> Result<KeyedContainer<'a>, DecodeError> {
        self.namespaced_if_declared(prefix)
            .ok_or_else(|| DecodeError::namespace_unresolved(&self.path, prefix))
    }

    /// Like [`KeyedContainer::namespaced`], but `None` when the prefix is not
    /// declared.
    pub fn namespaced_if_declared(&self, prefix: &str) -> Option<KeyedContainer<'a>> {
        if let Node::Xml(element) = self.node {
            element.lookup_namespace(prefix)?;
        }
        Some(Self {
            node: self.node,
            path: self.path.clone(),
            options: self.options,
            namespace: Some(prefix.to_string()),
        })
    }

    fn qualified<'k>(&self, key: &'k str) -> Cow<'k, str> {
        resolve::qualify(self.namespace.as_deref(), key)
    }

    fn lookup(&self, key: &str) -> Option<Node<'a>> {
        match self.node {
            Node::Json(JsonValue::Object(map)) => {
                let qualified = self.qualified(key);
                map.iter()
                    .find(|(raw, _)| self.options.keys.convert(raw) == qualified)
                    .map(|(_, value)| Node::Json(value))
            }
            Node::Json(_) => None,
            Node::Xml(element) => resolve::find_first(
                element,
                key,
                self.namespace.as_deref(),
                &self.options.keys,
            )
            .map(Node::Xml),
        }
    }

    fn child(&self, key: &str, node: Node<'a>) -> Decoder<'a> {
        let segment = PathSegment::Key(self.qualified(key).into_owned());
        Decoder::new(node, self.path.child(segment), self.options)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Every key this container answers to.
    pub fn all_keys(&self) -> Vec<String> {
        match self.node {
            Node::Json(JsonValue::Object(map)) => {
                let prefix = self.namespace.as_deref().filter(|p| !p.is_empty());
                let mut keys: Vec<String> = Vec::with_capacity(map.len());
                for raw in map.keys() {
                    let converted = self.options.keys.convert(raw);
                    let key = match prefix {
                        Some(p) => match converted
                            .strip_prefix(p)
                            .and_then(|rest| rest.strip_prefix(':'))
                        {
                            Some(local) => local.to_string(),
                            None => continue,
                        },
                        None => converted.into_owned(),
                    };
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
                keys
            }
            Node::Json(_) => Vec::new(),
            Node::Xml(element) => {
                resolve::all_keys(element, self.namespace.as_deref(), &self.options.keys)
            }
        }
    }

    /// Decodes the value at `key`.
    ///
    /// A missing key is `KeyNotFound` unless `T` tolerates absence
    /// (`Option<_>`). On XML only the first match is used; see
    /// [`KeyedContainer::decode_many`] for repeated elements.
    pub fn decode<T: Decode>(&self, key: &str) -> Result<T, DecodeError> {
        match self.lookup(key) {
            Some(node) => T::decode(&self.child(key, node)),
            None => {
                T::decode_absent()
                    .ok_or_else(|| DecodeError::key_not_found(&self.path, &self.qualified(key)))
            }
        }
    }

    /// `None` when the key is missing or holds a null value.
    pub fn decode_if_present<T: Decode>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        match self.lookup(key) {
            Some(node) if !node.is_null() => T::decode(&self.child(key, node)).map(Some),
            _ => Ok(None),
        }
    }

    /// Decodes every value answering to `key` as a sequence.
    ///
    /// On XML this collects all same-named sibling elements of the first
    /// match, however many there are. On JSON the value at `key` must be an
    /// array. A missing key yields an empty sequence.
    pub fn decode_many<T: Decode>(&self, key: &str) -> Result<Vec<T>, DecodeError> {
        let mut list = match self.node {
            Node::Xml(element) => {
                let items = resolve::find_all(
                    element,
                    key,
                    self.namespace.as_deref(),
                    &self.options.keys,
                )
                .into_iter()
                .map(Node::Xml)
                .collect();
                let path = self.path.child(PathSegment::Key(self.qualified(key).into_owned()));
                UnkeyedContainer::new(items, path, self.options)
            }
            Node::Json(_) => match self.lookup(key) {
                Some(node) if !node.is_null() => self.child(key, node).unkeyed()?,
                _ => return Ok(Vec::new()),
            },
        };

        let mut out = Vec::with_capacity(list.count().unwrap_or(0));
        while !list.is_at_end() {
            out.push(list.decode_next()?);
        }
        Ok(out)
    }

    /// A decoder positioned on the value at `key`.
    pub fn nested(&self, key: &str) -> Result<Decoder<'a>, DecodeError> {
        self.lookup(key)
            .map(|node| self.child(key, node))
            .ok_or_else(|| DecodeError::key_not_found(&self.path, &self.qualified(key)))
    }

    pub fn nested_keyed(&self, key: &str) -> Result<KeyedContainer<'a>, DecodeError> {
        self.nested(key)?.keyed()
    }

    pub fn nested_unkeyed(&self, key: &str) -> Result<UnkeyedContainer<'a>, DecodeError> {
        self.nested(key)?.unkeyed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeErrorKind;
    use crate::options::KeyStrategy;
    use crate::value::{parse_json, parse_xml};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_decode_and_contains() {
        let value = parse_json(r#"{"title": "Hello", "count": 3}"#).unwrap();
        let options = DecoderOptions::default();
        let c = Decoder::json(&value, &options).keyed().unwrap();
        assert!(c.contains("title"));
        assert!(!c.contains("missing"));
        assert_eq!(c.decode::<String>("title").unwrap(), "Hello");
        assert_eq!(c.decode::<u32>("count").unwrap(), 3);
        assert_eq!(c.all_keys(), vec!["count", "title"]);
    }

    #[test]
    fn test_missing_key() {
        let value = parse_json("{}").unwrap();
        let options = DecoderOptions::default();
        let c = Decoder::json(&value, &options).keyed().unwrap();
        let err = c.decode::<String>("title").unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::KeyNotFound);
        assert_eq!(err.path().keys(), vec!["title"]);

        assert_eq!(c.decode::<Option<String>>("title").unwrap(), None);
        assert_eq!(c.decode_if_present::<String>("title").unwrap(), None);
        assert!(c.nested("title").is_err());
    }

    #[test]
    fn test_decode_if_present_treats_null_as_absent() {
        let value = parse_json(r#"{"title": null}"#).unwrap();
        let options = DecoderOptions::default();
        let c = Decoder::json(&value, &options).keyed().unwrap();
        assert_eq!(c.decode_if_present::<String>("title").unwrap(), None);
        let err = c.decode::<String>("title").unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TypeMismatch);
    }

    #[test]
    fn test_snake_case_keys() {
        let value = parse_json(r#"{"content_html": "<p>", "id": "1"}"#).unwrap();
        let options =
            DecoderOptions::default().with_key_strategy(KeyStrategy::ConvertFromSnakeCase);
        let c = Decoder::json(&value, &options).keyed().unwrap();
        assert_eq!(c.decode::<String>("contentHtml").unwrap(), "<p>");
        assert!(!c.contains("content_html"));
        assert_eq!(c.all_keys(), vec!["contentHtml", "id"]);
    }

    #[test]
    fn test_json_decode_many() {
        let value = parse_json(r#"{"tags": ["a", "b"], "none": null}"#).unwrap();
        let options = DecoderOptions::default();
        let c = Decoder::json(&value, &options).keyed().unwrap();
        assert_eq!(c.decode_many::<String>("tags").unwrap(), vec!["a", "b"]);
        assert!(c.decode_many::<String>("none").unwrap().is_empty());
        assert!(c.decode_many::<String>("missing").unwrap().is_empty());
    }

    #[test]
    fn test_xml_cardinality_from_entry_point() {
        let doc = parse_xml("<a><b>1</b><b>2</b></a>").unwrap();
        let options = DecoderOptions::default();
        let c = Decoder::xml(doc.root(), &options).keyed().unwrap();
        assert_eq!(c.decode::<u32>("b").unwrap(), 1);
        assert_eq!(c.decode_many::<u32>("b").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_xml_decode_many_error_path_has_index() {
        let doc = parse_xml("<a><b>1</b><b>x</b></a>").unwrap();
        let options = DecoderOptions::default();
        let c = Decoder::xml(doc.root(), &options).keyed().unwrap();
        let err = c.decode_many::<u32>("b").unwrap_err();
        assert_eq!(
            err.path().segments(),
            &[PathSegment::key("b"), PathSegment::Index(1)]
        );
    }

    #[test]
    fn test_xml_attribute_wins() {
        let doc = parse_xml(r#"<e id="x"><id>y</id></e>"#).unwrap();
        let options = DecoderOptions::default();
        let c = Decoder::xml(doc.root(), &options).keyed().unwrap();
        assert_eq!(c.decode::<String>("id").unwrap(), "x");
    }

    #[test]
    fn test_namespaced_lookup() {
        let doc = parse_xml(
            r#"<item xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:creator>Ann</dc:creator></item>"#,
        )
        .unwrap();
        let options = DecoderOptions::default();
        let c = Decoder::xml(doc.root(), &options).keyed().unwrap();
        assert!(!c.contains("creator"));

        let dc = c.namespaced("dc").unwrap();
        assert_eq!(dc.namespace(), Some("dc"));
        assert_eq!(dc.decode::<String>("creator").unwrap(), "Ann");
        assert_eq!(dc.all_keys(), vec!["creator"]);

        let err = dc.decode::<String>("date").unwrap_err();
        assert_eq!(err.path().keys(), vec!["dc:date"]);
    }

    #[test]
    fn test_undeclared_namespace() {
        let doc = parse_xml("<item><media:content/></item>").unwrap();
        let options = DecoderOptions::default();
        let c = Decoder::xml(doc.root(), &options).keyed().unwrap();
        let err = c.namespaced("media").unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::NamespaceUnresolved);
        assert!(c.namespaced_if_declared("media").is_none());
    }

    #[test]
    fn test_namespace_declared_on_ancestor() {
        let doc = parse_xml(
            r#"<rss xmlns:dc="urn:dc"><channel><dc:rights>CC</dc:rights></channel></rss>"#,
        )
        .unwrap();
        let options = DecoderOptions::default();
        let root = Decoder::xml(doc.root(), &options).keyed().unwrap();
        let channel = root.nested_keyed("channel").unwrap();
        let dc = channel.namespaced("dc").unwrap();
        assert_eq!(dc.decode::<String>("rights").unwrap(), "CC");
    }

    #[test]
    fn test_json_namespaced_is_key_prefix() {
        let value = parse_json(r#"{"dc:creator": "Ann", "title": "t"}"#).unwrap();
        let options = DecoderOptions::default();
        let c = Decoder::json(&value, &options).keyed().unwrap();
        let dc = c.namespaced("dc").unwrap();
        assert_eq!(dc.decode::<String>("creator").unwrap(), "Ann");
        assert_eq!(dc.all_keys(), vec!["creator"]);
    }
}
