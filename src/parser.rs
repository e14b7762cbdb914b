use std::io::BufRead;

use quick_xml::events::attributes::Attribute as XmlAttribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use tracing::{debug, trace};

use crate::document::{Attribute, Document, NodeId, NodeKind};
use crate::error::XmlError;
use crate::tree::ElementTree;

fn bound_namespace(ns: &ResolveResult) -> Option<String> {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        _ => None,
    }
}

fn split_name(qname: &[u8]) -> Result<(Option<String>, String), XmlError> {
    let qname = std::str::from_utf8(qname)?;
    Ok(match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, qname.to_string()),
    })
}

fn read_attribute<R>(reader: &NsReader<R>, attr: &XmlAttribute) -> Result<Attribute, XmlError> {
    let (prefix, local) = split_name(attr.key.as_ref())?;
    // xmlns 宣言はそのまま保持し、名前空間は付けない
    let namespace = if prefix.as_deref() == Some("xmlns") || (prefix.is_none() && local == "xmlns")
    {
        None
    } else {
        let (ns, _) = reader.resolve_attribute(attr.key);
        bound_namespace(&ns)
    };
    let value = attr
        .unescape_value()
        .map_err(quick_xml::Error::from)?
        .into_owned();
    Ok(Attribute {
        prefix,
        local,
        namespace,
        value,
    })
}

fn open_element<R>(
    doc: &mut Document,
    reader: &NsReader<R>,
    start: &BytesStart,
    namespace: Option<String>,
) -> Result<NodeId, XmlError> {
    let qname = std::str::from_utf8(start.name().as_ref())?.to_string();
    let id = doc.create_element(namespace.as_deref(), &qname);
    for attr in start.attributes() {
        let attr = attr?;
        doc.push_attribute(id, read_attribute(reader, &attr)?);
    }
    Ok(id)
}

/// True when the last child of `parent` is text or a comment, i.e. whitespace
/// appended now sits inside character data rather than between elements.
fn in_character_data(doc: &Document, parent: NodeId) -> bool {
    doc.children(parent)
        .last()
        .is_some_and(|&last| !matches!(doc.kind(last), NodeKind::Element(_)))
}

fn attach(doc: &mut Document, stack: &[NodeId], node: NodeId) -> Result<(), XmlError> {
    match stack.last() {
        Some(&parent) => doc.append_child(parent, node),
        None if doc.root().is_none() => doc.set_root(node),
        None => return Err(XmlError::MultipleRoots),
    }
    Ok(())
}

/// Parses XML into a [`Document`].
///
/// Text is kept as written. Whitespace-only text is dropped unless it follows
/// text or a comment, so indentation between elements disappears while the
/// separators around a comment inside a text block survive. Comments are kept,
/// processing instructions and the XML declaration are not.
pub fn parse_document<R: BufRead>(input: R) -> Result<Document, XmlError> {
    let mut reader = NsReader::from_reader(input);
    reader.config_mut().trim_text(false);

    let mut doc = Document::new();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut buf = Vec::new();

    loop {
        let (ns, event) = reader.read_resolved_event_into(&mut buf)?;
        let namespace = bound_namespace(&ns);
        match event {
            Event::Start(e) => {
                let id = open_element(&mut doc, &reader, &e, namespace)?;
                attach(&mut doc, &stack, id)?;
                stack.push(id);
            }
            Event::Empty(e) => {
                let id = open_element(&mut doc, &reader, &e, namespace)?;
                attach(&mut doc, &stack, id)?;
            }
            Event::End(e) => {
                let qname = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if stack.pop().is_none() {
                    return Err(XmlError::UnbalancedEnd(qname));
                }
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(quick_xml::Error::from)?;
                match stack.last() {
                    Some(&parent)
                        if !text.trim().is_empty() || in_character_data(&doc, parent) =>
                    {
                        let id = doc.create_text(&text);
                        doc.append_child(parent, id);
                    }
                    Some(_) => (),
                    None => trace!("Ignoring text outside the root element"),
                }
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                if let Some(&parent) = stack.last() {
                    let id = doc.create_text(&text);
                    doc.append_child(parent, id);
                }
            }
            Event::Comment(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                match stack.last() {
                    Some(&parent) => {
                        let id = doc.create_comment(&text);
                        doc.append_child(parent, id);
                    }
                    None => trace!("Ignoring comment outside the root element"),
                }
            }
            Event::Eof => break,
            _ => (),
        }
        buf.clear();
    }

    if let Some(&open) = stack.last() {
        let name = doc
            .element(open)
            .map(|e| e.qualified_name())
            .unwrap_or_default();
        return Err(XmlError::Unclosed(name));
    }
    if doc.root().is_none() {
        return Err(XmlError::NoRoot);
    }

    debug!("Parsed XML document");
    Ok(doc)
}

pub fn parse_str(xml: &str) -> Result<Document, XmlError> {
    parse_document(xml.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::GML_NAMESPACE;

    #[test]
    fn test_parse_namespaces_and_attributes() {
        let doc = parse_str(
            r#"<?xml version="1.0"?>
            <gml:Point xmlns:gml="http://www.opengis.net/gml" srsName="EPSG:4326">
              <gml:coordinates cs=":" ts=";">1:2</gml:coordinates>
            </gml:Point>"#,
        )
        .unwrap();

        let root = doc.root().unwrap();
        assert_eq!(doc.local_name(root), Some("Point"));
        assert_eq!(doc.namespace_uri(root), Some(GML_NAMESPACE));
        assert_eq!(doc.attribute(root, None, "srsName"), Some("EPSG:4326"));

        let coords = doc.child_elements(root)[0];
        assert!(doc.is_gml_element(coords, "coordinates"));
        assert_eq!(doc.attribute(coords, None, "cs"), Some(":"));
        assert_eq!(doc.text_content(coords), "1:2");
    }

    #[test]
    fn test_parse_default_namespace_and_entities() {
        let doc = parse_str(
            r#"<Point xmlns="http://www.opengis.net/gml"><coordinates>1&amp;2</coordinates><!-- note --></Point>"#,
        )
        .unwrap();
        let root = doc.root().unwrap();
        assert!(doc.is_gml_element(root, "Point"));
        assert_eq!(doc.children(root).len(), 2);
        assert_eq!(doc.text_content(root), "1&2");
    }

    #[test]
    fn test_parse_keeps_separators_around_comments() {
        let doc = parse_str("<a>1,2 <!-- c --> 3,4</a>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.children(root).len(), 3);
        assert_eq!(doc.text_content(root), "1,2  3,4");

        let doc = parse_str("<a>1,2<!-- c --> <!-- d -->3,4</a>").unwrap();
        assert_eq!(doc.text_content(doc.root().unwrap()), "1,2 3,4");
    }

    #[test]
    fn test_parse_drops_indentation_between_elements() {
        let doc = parse_str("<a>\n  <b>1</b>\n  <c> 2 </c>\n</a>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.children(root).len(), 2);
        assert_eq!(doc.text_content(root), "1 2 ");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_str(""), Err(XmlError::NoRoot)));
        assert!(matches!(parse_str("<a/><b/>"), Err(XmlError::MultipleRoots)));
        assert!(parse_str("<a><b></a>").is_err());
    }

    #[test]
    fn test_parse_from_reader() {
        let xml = b"<root><child>text</child></root>";
        let doc = parse_document(std::io::BufReader::new(&xml[..])).unwrap();
        assert_eq!(doc.text_content(doc.root().unwrap()), "text");
    }
}
