//! Storage addressing conventions.

/// Builds the canonical storage address for a (container, sub-path, leaf) triplet.
///
/// Implementations must be pure: the same inputs always produce the same address.
pub trait StorageAddressing: Send + Sync {
    /// Build the address of `leaf` inside `container`/`sub_path`.
    ///
    /// An empty `leaf` addresses the enclosing directory itself.
    fn build(&self, container: &str, sub_path: &str, leaf: &str) -> String;
}

/// The default solution-relative addressing convention.
///
/// Non-empty parts are joined with a single `/`. Leading, trailing and repeated
/// separators in the inputs are collapsed, so `("soln", "/sub", "q.saiku")`
/// becomes `soln/sub/q.saiku`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolutionAddressing;

impl StorageAddressing for SolutionAddressing {
    fn build(&self, container: &str, sub_path: &str, leaf: &str) -> String {
        [container, sub_path, leaf]
            .iter()
            .flat_map(|part| part.split('/'))
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }
}
