#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use xmlindexer::XmlIndexer;

/// Generated document node; rendered the way the serializer writes markup
#[derive(Debug, Clone)]
enum Node {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Text(String),
}

impl Node {
    fn render(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element { name, attributes, children } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attributes {
                    out.push_str(&format!(" {key}=\"{value}\""));
                }
                out.push('>');
                for child in children {
                    child.render(out);
                }
                out.push_str(&format!("</{name}>"));
            }
        }
    }
}

fn element_name() -> impl Strategy<Value = String> {
    prop_oneof![Just("a"), Just("b"), Just("c")].prop_map(str::to_string)
}

fn text() -> impl Strategy<Value = String> {
    // no markup characters: the serializer does not escape
    "[a-z0-9 .,]{1,8}"
}

fn node() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        text().prop_map(Node::Text),
        element_name().prop_map(|name| Node::Element {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        (
            element_name(),
            btree_map("[xyz]", "[a-z0-9]{0,4}", 0..3),
            vec(inner, 0..5),
        )
            .prop_map(|(name, attributes, children)| Node::Element {
                name,
                attributes: attributes.into_iter().collect(),
                children: merge_adjacent_text(children),
            })
    })
}

/// Adjacent text nodes render as one run and parse back as one fragment
fn merge_adjacent_text(children: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(children.len());
    for child in children {
        match (merged.last_mut(), child) {
            (Some(Node::Text(prev)), Node::Text(next)) => prev.push_str(&next),
            (_, child) => merged.push(child),
        }
    }
    merged
}

fn document() -> impl Strategy<Value = String> {
    vec(node(), 0..5).prop_map(|children| {
        let root = Node::Element {
            name: "r".to_string(),
            attributes: Vec::new(),
            children: merge_adjacent_text(children),
        };
        let mut out = String::new();
        root.render(&mut out);
        out
    })
}

/// Request path below the document element: keys with optional positions
fn request_path() -> impl Strategy<Value = Vec<(String, Option<usize>)>> {
    vec((element_name(), proptest::option::of(0usize..3)), 0..4)
}

fn apply(start: &XmlIndexer, path: &[(String, Option<usize>)]) -> XmlIndexer {
    path.iter().fold(start.by_key("r"), |current, (key, position)| {
        let next = current.by_key(key);
        match position {
            Some(position) => next.by_index(*position),
            None => next,
        }
    })
}

proptest! {
    #[test]
    fn test_round_trip(doc in document()) {
        let xml = xmlindexer::parse(&doc);
        prop_assert_eq!(xml.to_string(), doc.clone());

        let reparsed = xmlindexer::parse(xml.to_string());
        prop_assert_eq!(reparsed.element(), xml.element());
    }

    #[test]
    fn test_eager_lazy_equivalence(doc in document(), path in request_path()) {
        let eager = apply(&xmlindexer::parse(&doc), &path);
        let lazy = apply(&xmlindexer::lazy(&doc), &path).resolved();

        match (&eager, &lazy) {
            (XmlIndexer::Element(a), XmlIndexer::Element(b)) => prop_assert_eq!(a, b),
            (XmlIndexer::List(a), XmlIndexer::List(b)) => prop_assert_eq!(a, b),
            (XmlIndexer::Error(a), XmlIndexer::Error(b)) => prop_assert_eq!(a, b),
            (a, b) => prop_assert!(false, "eager {:?} vs lazy {:?}", a, b),
        }
    }

    #[test]
    fn test_lazy_resolution_is_idempotent(doc in document(), path in request_path()) {
        let query = apply(&xmlindexer::lazy(&doc), &path);
        prop_assert_eq!(query.to_string(), query.to_string());
        prop_assert_eq!(query.element(), query.element());
    }

    #[test]
    fn test_arbitrary_input_never_panics(input in vec(any::<u8>(), 0..256)) {
        let xml = xmlindexer::parse(&input);
        let _ = xml.by_key("a").by_index(1).to_string();
        let lazy = xmlindexer::lazy(&input);
        let _ = lazy.by_key("a").by_index(1).to_string();
    }
}
