//! Markup serialization for the element tree
//!
//! Output is `<name attrs>children</name>` with no escaping, so text or
//! attribute values containing `<`, `&` or `"` do not survive a round-trip.
//! The root sentinel renders as its children only.

use super::node::{Element, TextElement, XmlAttribute, XmlContent};
use std::fmt;

impl fmt::Display for XmlAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.name, self.text)
    }
}

impl fmt::Display for TextElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Display for XmlContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlContent::Element(e) => fmt::Display::fmt(e, f),
            XmlContent::Text(t) => fmt::Display::fmt(t, f),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write_children(self, f);
        }

        write!(f, "<{}", self.name())?;
        for attr in self.all_attributes() {
            write!(f, " {attr}")?;
        }
        f.write_str(">")?;
        write_children(self, f)?;
        write!(f, "</{}>", self.name())
    }
}

fn write_children(element: &Element, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for child in element.children() {
        fmt::Display::fmt(child, f)?;
    }
    Ok(())
}
