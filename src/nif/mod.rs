//! BEAM surface (`Elixir.XmlIndexer.Native`)
//!
//! - `parse(xml, opts)`: `{:ok, handle}` or `{:error, reason}`; `opts` is a
//!   keyword list of `lazy`, `namespaces`, `case_insensitive`, `strict`
//! - `query(handle, path)`: matched elements as element tuples
//! - `query_text(handle, path)`: own text of the first match
//! - `query_attribute(handle, path, name)`: attribute of the first match
//! - `query_xml(handle, path)`: serialized markup of every match

pub mod resource;
pub mod term;

use crate::indexer::XmlIndexer;
use crate::options::ParserOptions;
use crate::XmlHash;
use resource::{DocumentRef, DocumentResource};
use rustler::{Atom, Binary, Env, NifResult, ResourceArc, Term};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn options_from(opts: Vec<(Atom, bool)>) -> ParserOptions {
    let mut options = ParserOptions::default();
    for (key, value) in opts {
        if key == term::lazy() {
            options.should_process_lazily = value;
        } else if key == term::namespaces() {
            options.should_process_namespaces = value;
        } else if key == term::case_insensitive() {
            options.case_insensitive = value;
        } else if key == term::strict() {
            options.detect_parsing_errors = value;
        }
    }
    options
}

/// Run `path` against the handle; a resolved indexer, or an error term
fn run_query<'a>(
    env: Env<'a>,
    doc: &DocumentRef,
    path: &str,
) -> Result<XmlIndexer, Term<'a>> {
    let result = doc
        .root
        .at_path(path)
        .map_err(|e| term::error_term(env, e))?
        .resolved();
    match result.error() {
        Some(error) => Err(term::error_term(env, error)),
        None => Ok(result),
    }
}

/// Parse XML into a document handle
#[rustler::nif(schedule = "DirtyCpu")]
fn parse<'a>(env: Env<'a>, input: Binary<'a>, opts: Vec<(Atom, bool)>) -> NifResult<Term<'a>> {
    let root = XmlHash::new(options_from(opts)).parse(input.as_slice());

    // Strict lazy handles are validated here as well
    if let XmlIndexer::ParsingError(error) = &root {
        return Ok(term::error_term(env, error));
    }

    let handle = ResourceArc::new(DocumentResource::new(root));
    Ok(term::ok_term(env, rustler::Encoder::encode(&handle, env)))
}

/// Matched elements as `{:element, name, attrs, children}` tuples
#[rustler::nif(schedule = "DirtyCpu")]
fn query<'a>(env: Env<'a>, doc: DocumentRef, path: &str) -> NifResult<Term<'a>> {
    let result = match run_query(env, &doc, path) {
        Ok(result) => result,
        Err(error) => return Ok(error),
    };

    let mut list = Term::list_new_empty(env);
    for element in result.elements().iter().rev() {
        list = list.list_prepend(term::element_to_term(env, element));
    }
    Ok(term::ok_term(env, list))
}

#[rustler::nif(schedule = "DirtyCpu")]
fn query_text<'a>(env: Env<'a>, doc: DocumentRef, path: &str) -> NifResult<Term<'a>> {
    let result = match run_query(env, &doc, path) {
        Ok(result) => result,
        Err(error) => return Ok(error),
    };

    match result.value() {
        Ok(element) => Ok(term::ok_term(env, term::str_to_binary(env, &element.text()))),
        Err(error) => Ok(term::error_term(env, error)),
    }
}

#[rustler::nif(schedule = "DirtyCpu")]
fn query_attribute<'a>(
    env: Env<'a>,
    doc: DocumentRef,
    path: &str,
    name: &str,
) -> NifResult<Term<'a>> {
    let result = match run_query(env, &doc, path) {
        Ok(result) => result,
        Err(error) => return Ok(error),
    };

    match result.attribute(name) {
        Ok(attr) => Ok(term::ok_term(env, term::str_to_binary(env, &attr.text))),
        Err(error) => Ok(term::error_term(env, error)),
    }
}

/// Serialized markup of every match, concatenated
#[rustler::nif(schedule = "DirtyCpu")]
fn query_xml<'a>(env: Env<'a>, doc: DocumentRef, path: &str) -> NifResult<Term<'a>> {
    match run_query(env, &doc, path) {
        Ok(result) => Ok(term::ok_term(env, term::str_to_binary(env, &result.to_string()))),
        Err(error) => Ok(error),
    }
}

rustler::init!("Elixir.XmlIndexer.Native");
