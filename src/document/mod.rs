//! The hierarchical repository document.
//!
//! A repository document describes every folder and file of the solution
//! repository together with its display name and visibility. Documents come
//! from a [`DocumentSource`] and are parsed into [`RepositoryNode`] trees; the
//! flattener only sees them through the [`RawNode`] capability trait.

mod document_source;
mod raw_node;

pub use document_source::{
    DocumentSource, DocumentSourceError, FsDocumentSource, MemoryDocumentSource,
    ScanDocumentSource,
};
pub use raw_node::{parse_document, RawNode, RepositoryNode};
