use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::document::{Document, NodeId, NodeKind};
use crate::error::XmlError;
use crate::tree::ElementTree;

/// Serializes a [`Document`] back to XML text.
#[derive(Debug, Clone, Default)]
pub struct XmlWriter {
    indent: Option<usize>,
    declaration: bool,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indents nested elements by `spaces`.
    pub fn with_indent(mut self, spaces: usize) -> Self {
        self.indent = Some(spaces);
        self
    }

    /// Emits `<?xml version="1.0" encoding="UTF-8"?>` first.
    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }

    pub fn write(&self, doc: &Document, output_path: &Path) -> Result<()> {
        tracing::info!("Writing XML document: {:?}", output_path);

        let file = File::create(output_path)
            .with_context(|| format!("Failed to create {}", output_path.display()))?;
        let mut sink = BufWriter::new(file);
        self.write_to(doc, &mut sink)
            .context("Failed to serialize XML document")?;
        sink.flush().context("Failed to flush XML output")?;

        Ok(())
    }

    pub fn to_string(&self, doc: &Document) -> Result<String, XmlError> {
        let mut out = Vec::new();
        self.write_to(doc, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    pub fn write_to<W: Write>(&self, doc: &Document, sink: W) -> Result<(), XmlError> {
        let mut writer = match self.indent {
            Some(spaces) => Writer::new_with_indent(sink, b' ', spaces),
            None => Writer::new(sink),
        };

        if self.declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }
        if let Some(root) = doc.root() {
            write_node(&mut writer, doc, root)?;
        }

        Ok(())
    }
}

fn write_node<W: Write>(
    writer: &mut Writer<W>,
    doc: &Document,
    node: NodeId,
) -> Result<(), XmlError> {
    match doc.kind(node) {
        NodeKind::Text(text) => {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        NodeKind::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
        }
        NodeKind::Element(element) => {
            let name = element.qualified_name();
            let mut start = BytesStart::new(name.as_str());
            for attr in &element.attributes {
                let key = attr.qualified_name();
                start.push_attribute((key.as_str(), attr.value.as_str()));
            }

            let children = doc.children(node);
            if children.is_empty() {
                writer.write_event(Event::Empty(start))?;
            } else {
                writer.write_event(Event::Start(start))?;
                for &child in children {
                    write_node(writer, doc, child)?;
                }
                writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
            }
        }
    }
    Ok(())
}
