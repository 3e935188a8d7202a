//! Path expressions
//!
//! A compact location-path syntax for chained lookups:
//!
//! ```text
//! path    := step ('/' step)*
//! step    := name ('[' digits ']')?
//! ```
//!
//! `catalog/book[1]/title` is `by_key("catalog").by_key("book").by_index(1)
//! .by_key("title")`. Positions are 0-based, like [`XmlIndexer::by_index`].
//! Compiled paths are kept in a process-wide LRU cache.
//!
//! [`XmlIndexer::by_index`]: crate::XmlIndexer::by_index

use crate::parser::lazy::IndexOp;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, OnceLock};
use thiserror::Error;
use tracing::trace;

const CACHE_CAPACITY: usize = 256;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum PathError {
    #[error("empty path expression")]
    Empty,

    #[error("empty step at offset {offset}")]
    EmptyStep { offset: usize },

    #[error("invalid position in step \"{step}\"")]
    InvalidPosition { step: String },

    #[error("unclosed '[' in step \"{step}\"")]
    UnclosedBracket { step: String },
}

fn cache() -> &'static Mutex<LruCache<String, Arc<[IndexOp]>>> {
    static CACHE: OnceLock<Mutex<LruCache<String, Arc<[IndexOp]>>>> = OnceLock::new();
    CACHE.get_or_init(|| {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Mutex::new(LruCache::new(capacity))
    })
}

/// Compile `expression`, reusing a cached compilation when there is one
pub fn compile(expression: &str) -> Result<Arc<[IndexOp]>, PathError> {
    let mut cache = cache().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(ops) = cache.get(expression) {
        return Ok(Arc::clone(ops));
    }

    let ops: Arc<[IndexOp]> = parse(expression)?.into();
    trace!(expression, steps = ops.len(), "compiled path");
    cache.put(expression.to_string(), Arc::clone(&ops));
    Ok(ops)
}

/// Parse without touching the cache
pub fn parse(expression: &str) -> Result<Vec<IndexOp>, PathError> {
    if expression.trim().is_empty() {
        return Err(PathError::Empty);
    }

    let mut ops = Vec::new();
    let mut offset = 0;
    for step in expression.split('/') {
        ops.push(parse_step(step.trim(), offset)?);
        offset += step.len() + 1;
    }
    Ok(ops)
}

fn parse_step(step: &str, offset: usize) -> Result<IndexOp, PathError> {
    let Some(open) = step.find('[') else {
        if step.is_empty() {
            return Err(PathError::EmptyStep { offset });
        }
        return Ok(IndexOp::new(step));
    };

    let name = step[..open].trim_end();
    if name.is_empty() {
        return Err(PathError::EmptyStep { offset });
    }

    let Some(inner) = step[open + 1..].strip_suffix(']') else {
        return Err(PathError::UnclosedBracket {
            step: step.to_string(),
        });
    };
    let position = inner
        .trim()
        .parse::<usize>()
        .map_err(|_| PathError::InvalidPosition {
            step: step.to_string(),
        })?;

    Ok(IndexOp::at(name, position))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        let ops = parse("catalog/book[1]/title").unwrap();
        assert_eq!(
            ops,
            vec![
                IndexOp::new("catalog"),
                IndexOp::at("book", 1),
                IndexOp::new("title")
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse(""), Err(PathError::Empty));
        assert_eq!(parse("a//b"), Err(PathError::EmptyStep { offset: 2 }));
        assert_eq!(parse("/a"), Err(PathError::EmptyStep { offset: 0 }));
        assert!(matches!(parse("a[x]"), Err(PathError::InvalidPosition { .. })));
        assert!(matches!(parse("a[-1]"), Err(PathError::InvalidPosition { .. })));
        assert!(matches!(parse("a[1"), Err(PathError::UnclosedBracket { .. })));
        assert!(matches!(parse("[1]"), Err(PathError::EmptyStep { .. })));
    }

    #[test]
    fn test_compile_is_cached() {
        let first = compile("cached/path[0]").unwrap();
        let second = compile("cached/path[0]").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
