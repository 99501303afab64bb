//! Key resolution against XML elements.
//!
//! A requested key is matched, in order, against:
//!
//! 1. the element's attributes (plain or namespace-qualified name)
//! 2. child elements with the qualified name
//! 3. namespace declarations on the element whose prefix is the key
//!
//! The first match wins. Whether the caller wants one match or all of them is
//! decided by which function it calls, never by how many children exist.

use std::borrow::Cow;

use crate::options::KeyStrategy;
use crate::value::{XmlNodeKind, XmlNodeRef};

/// `dc:title` for key `title` under namespace `dc`; the key itself when no
/// namespace (or the default namespace) is active.
pub(crate) fn qualify<'k>(namespace: Option<&str>, key: &'k str) -> Cow<'k, str> {
    match namespace {
        Some(prefix) if !prefix.is_empty() => Cow::Owned(format!("{}:{}", prefix, key)),
        _ => Cow::Borrowed(key),
    }
}

fn name_matches(node: &XmlNodeRef<'_>, wanted: &str, keys: &KeyStrategy) -> bool {
    node.name()
        .is_some_and(|name| keys.convert(name) == wanted)
}

/// First node answering to `key`, in lookup priority order.
pub(crate) fn find_first<'a>(
    element: XmlNodeRef<'a>,
    key: &str,
    namespace: Option<&str>,
    keys: &KeyStrategy,
) -> Option<XmlNodeRef<'a>> {
    let qualified = qualify(namespace, key);

    let found = element
        .attributes()
        .find(|a| name_matches(a, key, keys) || name_matches(a, &qualified, keys))
        .or_else(|| {
            element
                .child_elements()
                .find(|c| name_matches(c, &qualified, keys))
        })
        .or_else(|| element.namespaces().find(|ns| name_matches(ns, key, keys)));

    tracing::trace!(
        key = %qualified,
        matched = found.map(|n| n.describe()).unwrap_or("nothing"),
        "Resolved XML key"
    );
    found
}

/// Every node answering to `key`.
///
/// The first match is located as in [`find_first`]. For an element match, its
/// parent is queried again for all children with the same name, in document
/// order. Attribute and namespace matches are single-valued.
pub(crate) fn find_all<'a>(
    element: XmlNodeRef<'a>,
    key: &str,
    namespace: Option<&str>,
    keys: &KeyStrategy,
) -> Vec<XmlNodeRef<'a>> {
    let Some(first) = find_first(element, key, namespace, keys) else {
        return Vec::new();
    };
    if !matches!(first.kind(), XmlNodeKind::Element(_)) {
        return vec![first];
    }

    let qualified = qualify(namespace, key);
    let parent = first.parent().unwrap_or(element);
    parent
        .child_elements()
        .filter(|c| name_matches(c, &qualified, keys))
        .collect()
}

/// Keys the element answers to, in lookup priority order, without
/// duplicates. Under an active namespace only names carrying that prefix are
/// listed, with the prefix removed.
pub(crate) fn all_keys(
    element: XmlNodeRef<'_>,
    namespace: Option<&str>,
    keys: &KeyStrategy,
) -> Vec<String> {
    let names = element
        .attributes()
        .chain(element.child_elements())
        .filter_map(|n| n.name());

    let mut out: Vec<String> = Vec::new();
    for name in names {
        let local = match namespace {
            Some(prefix) if !prefix.is_empty() => {
                match name
                    .strip_prefix(prefix)
                    .and_then(|rest| rest.strip_prefix(':'))
                {
                    Some(local) => local,
                    None => continue,
                }
            }
            _ => name,
        };
        let converted = keys.convert(local).into_owned();
        if !out.contains(&converted) {
            out.push(converted);
        }
    }
    if namespace.map_or(true, str::is_empty) {
        for ns in element.namespaces() {
            if let Some(prefix) = ns.name().filter(|p| !p.is_empty()) {
                let converted = keys.convert(prefix).into_owned();
                if !out.contains(&converted) {
                    out.push(converted);
                }
            }
        }
    }
    out
}
