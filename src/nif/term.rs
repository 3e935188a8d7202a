//! Elixir Term Conversion Utilities
//!
//! Elements become `{:element, name, attributes, children}` where
//! `attributes` is a list of `{name, value}` binaries and `children` mixes
//! element tuples with text binaries in document order.

use crate::dom::{Element, XmlContent};
use rustler::{Encoder, Env, NewBinary, Term};

rustler::atoms! {
    ok,
    error,
    element,
    lazy,
    namespaces,
    case_insensitive,
    strict,
}

pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}

pub fn element_to_term<'a>(env: Env<'a>, el: &Element) -> Term<'a> {
    let mut attrs = Term::list_new_empty(env);
    let collected: Vec<_> = el.all_attributes().collect();
    for attr in collected.into_iter().rev() {
        let pair = (str_to_binary(env, &attr.name), str_to_binary(env, &attr.text));
        attrs = attrs.list_prepend(pair.encode(env));
    }

    let mut children = Term::list_new_empty(env);
    for child in el.children().iter().rev() {
        let child_term = match child {
            XmlContent::Element(e) => element_to_term(env, e),
            XmlContent::Text(t) => str_to_binary(env, &t.text),
        };
        children = children.list_prepend(child_term);
    }

    (element(), str_to_binary(env, el.name()), attrs, children).encode(env)
}

pub fn ok_term<'a>(env: Env<'a>, value: Term<'a>) -> Term<'a> {
    (ok(), value).encode(env)
}

pub fn error_term<'a>(env: Env<'a>, reason: impl std::fmt::Display) -> Term<'a> {
    (error(), str_to_binary(env, &reason.to_string())).encode(env)
}
