use core::fmt;

use super::{Document, DomNode, NodeKind};
use indextree::NodeId;

fn write_indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str("  ")?;
    }
    Ok(())
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

fn fmt_node(
    doc: &Document,
    id: NodeId,
    f: &mut fmt::Formatter<'_>,
    depth: usize,
) -> fmt::Result {
    let Some(DomNode { kind, attrs }) = doc.node(id) else {
        return Ok(());
    };

    write_indent(f, depth)?;
    match kind {
        NodeKind::Document => writeln!(f, "#document")?,
        NodeKind::Element { tag } => {
            write!(f, "<{tag}")?;
            // Document order, so duplicate names stay visible.
            for (name, value) in attrs.iter() {
                write!(f, " {name}=\"{}\"", escape_text(value))?;
            }
            writeln!(f, ">")?;
        }
        NodeKind::Text { text } => writeln!(f, "\"{}\"", escape_text(text))?,
        NodeKind::Comment { text } => writeln!(f, "<!--{}-->", escape_text(text))?,
    }

    for child in id.children(&doc.dom) {
        fmt_node(doc, child, f, depth + 1)?;
    }
    Ok(())
}

impl fmt::Display for Document {
    /// One node per line, indented by depth.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_node(self, self.root, f, 0)
    }
}
