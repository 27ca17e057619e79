//! Resource identifier validation and storage addressing.
//!
//! A resource is addressed by a flat identifier such as `soln/sub/query.saiku`.
//! [`PathResolver`] rejects unsafe identifiers and decomposes the rest into a
//! [`ResolvedPath`]; a [`StorageAddressing`] convention turns that into the
//! address understood by the storage provider.

mod addressing;
mod path_resolver;

pub use addressing::{SolutionAddressing, StorageAddressing};
pub use path_resolver::{validate_listing_path, InvalidPathError, PathResolver, ResolvedPath};

pub(crate) use path_resolver::split_segments;
