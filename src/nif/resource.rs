//! ResourceArc wrapper for parsed documents

use crate::indexer::XmlIndexer;
use rustler::ResourceArc;

/// A parsed document as handed to the BEAM.
///
/// Eager handles hold the finished tree; lazy handles hold the retained
/// input and scan it again for every query.
pub struct DocumentResource {
    pub root: XmlIndexer,
}

impl DocumentResource {
    pub fn new(root: XmlIndexer) -> Self {
        DocumentResource { root }
    }
}

#[rustler::resource_impl]
impl rustler::Resource for DocumentResource {}

/// Type alias for document ResourceArc
pub type DocumentRef = ResourceArc<DocumentResource>;
