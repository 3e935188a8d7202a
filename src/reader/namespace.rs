//! Namespace resolution
//!
//! Stack-based prefix → URI resolver used when namespace processing is on.
//! Bindings are tagged with the depth of the element that declared them and
//! dropped when that element closes.

/// Well-known namespace URIs
pub mod ns {
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

/// Namespace binding (prefix -> URI); the default namespace has no prefix
#[derive(Debug, Clone)]
struct NsBinding {
    prefix: Option<String>,
    uri: String,
    depth: usize,
}

#[derive(Debug)]
pub struct NamespaceResolver {
    bindings: Vec<NsBinding>,
    depth: usize,
}

impl NamespaceResolver {
    /// Resolver with the `xml` and `xmlns` prefixes pre-bound
    pub fn new() -> Self {
        let predeclared = |prefix: &str, uri: &str| NsBinding {
            prefix: Some(prefix.to_string()),
            uri: uri.to_string(),
            depth: 0,
        };
        NamespaceResolver {
            bindings: vec![predeclared("xml", ns::XML), predeclared("xmlns", ns::XMLNS)],
            depth: 0,
        }
    }

    /// Enter a new element scope
    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Leave an element scope, removing any bindings declared in it
    pub fn pop_scope(&mut self) {
        while self.bindings.last().is_some_and(|b| b.depth >= self.depth && b.depth > 0) {
            self.bindings.pop();
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// Declare a binding for the current scope (`None` = default namespace)
    pub fn declare(&mut self, prefix: Option<&str>, uri: &str) {
        if matches!(prefix, Some("xml" | "xmlns")) {
            return;
        }
        self.bindings.push(NsBinding {
            prefix: prefix.map(str::to_string),
            uri: uri.to_string(),
            depth: self.depth,
        });
    }

    /// Resolve a prefix (`None` = default namespace), innermost binding first
    pub fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix.as_deref() == prefix)
            .map(|b| b.uri.as_str())
            .filter(|uri| !uri.is_empty())
    }
}

impl Default for NamespaceResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predeclared() {
        let resolver = NamespaceResolver::new();
        assert_eq!(resolver.resolve(Some("xml")), Some(ns::XML));
        assert_eq!(resolver.resolve(None), None);
    }

    #[test]
    fn test_scope_pop_and_shadowing() {
        let mut resolver = NamespaceResolver::new();

        resolver.push_scope();
        resolver.declare(Some("ns"), "urn:one");
        resolver.declare(None, "urn:default");

        resolver.push_scope();
        resolver.declare(Some("ns"), "urn:two");
        assert_eq!(resolver.resolve(Some("ns")), Some("urn:two"));
        assert_eq!(resolver.resolve(None), Some("urn:default"));

        resolver.pop_scope();
        assert_eq!(resolver.resolve(Some("ns")), Some("urn:one"));

        resolver.pop_scope();
        assert_eq!(resolver.resolve(Some("ns")), None);
        assert_eq!(resolver.resolve(Some("xml")), Some(ns::XML));
    }

    #[test]
    fn test_empty_default_undeclares() {
        let mut resolver = NamespaceResolver::new();
        resolver.push_scope();
        resolver.declare(None, "urn:x");
        resolver.push_scope();
        resolver.declare(None, "");
        assert_eq!(resolver.resolve(None), None);
    }
}
