//! Flattening of a repository document into repository objects.
//!
//! The context path has the shape `/<repository>/<container>/<sub/path>`.
//! Segment 2 names the container (solution) and everything after it is the
//! sub-path inside that container. Relative paths of listed objects are built
//! from these two parts and the raw node names.

use thiserror::Error;
use tracing::warn;

use super::RepositoryObject;
use crate::document::RawNode;
use crate::path::split_segments;

/// A node could not be turned into a repository object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlattenError {
    #[error("node is missing the '{0}' attribute")]
    MissingAttribute(&'static str),
}

/// Whether a file name passes the type filter.
///
/// The filter is a literal suffix test, so `"cdv"` also matches `"abcdv"`.
/// A blank filter matches everything.
pub fn matches_type_filter(name: &str, type_filter: &str) -> bool {
    type_filter.trim().is_empty() || name.ends_with(type_filter)
}

/// Flatten the document below `root` into an ordered list of objects.
///
/// For every visible directory child a folder is produced holding its
/// visible, filter-matching files followed by its flattened sub-folders.
/// Visible, filter-matching files directly under `root` follow the folders.
///
/// A context path without any segment (such as `"/"`) lists from the path
/// declared on the document root instead.
///
/// Never fails: a malformed node stops its own level, which then contributes
/// the objects collected before it.
pub fn flatten<N: RawNode>(root: &N, context_path: &str, type_filter: &str) -> Vec<RepositoryObject> {
    if split_segments(context_path).is_empty() {
        return match root.declared_path() {
            Some(declared) if !split_segments(declared).is_empty() => {
                flatten(root, declared, type_filter)
            }
            declared => {
                warn!(?declared, "repository document root declares no usable path");
                Vec::new()
            }
        };
    }
    flatten_level(root, context_path, type_filter, true)
}

fn flatten_level<N: RawNode>(
    node: &N,
    context_path: &str,
    type_filter: &str,
    include_files: bool,
) -> Vec<RepositoryObject> {
    let mut objects = Vec::new();
    if let Err(e) = collect_level(node, context_path, type_filter, include_files, &mut objects) {
        warn!(
            context_path,
            collected = objects.len(),
            error = %e,
            "repository listing truncated"
        );
    }
    objects
}

fn collect_level<N: RawNode>(
    node: &N,
    context_path: &str,
    type_filter: &str,
    include_files: bool,
    objects: &mut Vec<RepositoryObject>,
) -> Result<(), FlattenError> {
    let scope = Scope::parse(context_path);

    for dir in node.child_directories() {
        if !dir.visible() {
            continue;
        }
        let name = required(dir.name(), "name")?;
        let label = required(dir.localized_name(), "localized-name")?;
        let relative_path = scope.relative_path(name);

        let mut children = Vec::new();
        for file in dir.child_files() {
            if !file.visible() {
                continue;
            }
            let file_name = required(file.name(), "name")?;
            if !matches_type_filter(file_name, type_filter) {
                continue;
            }
            let file_label = required(file.localized_name(), "localized-name")?;
            children.push(RepositoryObject::file(
                file_label,
                format!("{}/{}", relative_path, file_name),
                type_filter,
            ));
        }

        let child_context = format!("{}/{}", context_path.trim_end_matches('/'), name);
        children.extend(flatten_level(dir, &child_context, type_filter, false));
        objects.push(RepositoryObject::folder(label, relative_path, children));
    }

    if include_files {
        for file in node.child_files() {
            if !file.visible() {
                continue;
            }
            let name = required(file.name(), "name")?;
            if !matches_type_filter(name, type_filter) {
                continue;
            }
            let label = required(file.localized_name(), "localized-name")?;
            objects.push(RepositoryObject::file(
                label,
                scope.relative_path(name),
                type_filter,
            ));
        }
    }

    Ok(())
}

fn required<'a>(value: Option<&'a str>, attribute: &'static str) -> Result<&'a str, FlattenError> {
    value.ok_or(FlattenError::MissingAttribute(attribute))
}

/// Container and sub-path derived from a context path.
struct Scope {
    container: String,
    /// Sub-path inside the container with a trailing `/`, or empty.
    solution_path: String,
}

impl Scope {
    fn parse(context_path: &str) -> Self {
        let segments = split_segments(context_path);
        let container = segments.get(2).copied().unwrap_or_default().to_string();
        let solution_path = if container.is_empty() {
            String::new()
        } else {
            segments
                .iter()
                .skip(3)
                .filter(|s| !s.is_empty())
                .map(|s| format!("{}/", s))
                .collect()
        };
        Self {
            container,
            solution_path,
        }
    }

    /// Relative path of a node named `name` at this scope.
    ///
    /// At repository level the node is itself a container, so its path is its
    /// name; inside a container it is `container/sub/path/name`.
    fn relative_path(&self, name: &str) -> String {
        if self.container.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}{}", self.container, self.solution_path, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RepositoryNode;

    fn dir(name: &str, visible: bool, children: Vec<RepositoryNode>) -> RepositoryNode {
        RepositoryNode::directory(name, visible, children)
    }

    fn file(name: &str, visible: bool) -> RepositoryNode {
        RepositoryNode::file(name, visible)
    }

    fn reports_tree() -> RepositoryNode {
        RepositoryNode::root(
            "/solutions",
            vec![dir(
                "reports",
                true,
                vec![
                    file("q1.saiku", true),
                    dir("archived", false, vec![file("q0.saiku", true)]),
                ],
            )],
        )
    }

    fn all_paths(objects: &[RepositoryObject]) -> Vec<String> {
        let mut paths = Vec::new();
        for object in objects {
            paths.push(object.path().to_string());
            paths.extend(all_paths(object.children()));
        }
        paths
    }

    fn all_files(objects: &[RepositoryObject]) -> Vec<&RepositoryObject> {
        let mut files = Vec::new();
        for object in objects {
            if object.is_folder() {
                files.extend(all_files(object.children()));
            } else {
                files.push(object);
            }
        }
        files
    }

    #[test]
    fn test_reports_scenario() {
        let objects = flatten(&reports_tree(), "/reports", "saiku");

        assert_eq!(objects.len(), 1);
        let RepositoryObject::Folder(folder) = &objects[0] else {
            panic!("expected a folder");
        };
        assert_eq!(folder.name, "reports");
        assert_eq!(folder.path, "reports");
        assert_eq!(folder.id, "#reports");
        assert_eq!(folder.repo_objects.len(), 1);

        let RepositoryObject::File(q1) = &folder.repo_objects[0] else {
            panic!("expected a file");
        };
        assert_eq!(q1.name, "q1.saiku");
        assert_eq!(q1.path, "reports/q1.saiku");
        assert_eq!(q1.id, "#reports/q1.saiku");
        assert_eq!(q1.file_type, "saiku");

        let paths = all_paths(&objects);
        assert!(!paths.iter().any(|p| p.contains("archived") || p.contains("q0")));
    }

    #[test]
    fn test_root_context_uses_declared_path() {
        let objects = flatten(&reports_tree(), "/", "");
        assert_eq!(all_paths(&objects), vec!["reports", "reports/q1.saiku"]);
    }

    #[test]
    fn test_root_without_declared_path_lists_nothing() {
        let mut root = reports_tree();
        root.path = None;
        assert!(flatten(&root, "/", "").is_empty());

        root.path = Some("/".to_string());
        assert!(flatten(&root, "/", "").is_empty());
    }

    #[test]
    fn test_nested_relative_paths() {
        let root = RepositoryNode::root(
            "/solutions",
            vec![dir(
                "sales",
                true,
                vec![
                    file("a.saiku", true),
                    dir(
                        "emea",
                        true,
                        vec![
                            file("b.saiku", true),
                            dir("uk", true, vec![file("c.saiku", true)]),
                        ],
                    ),
                ],
            )],
        );

        let objects = flatten(&root, "/solutions", "");
        assert_eq!(
            all_paths(&objects),
            vec![
                "sales",
                "sales/a.saiku",
                "sales/emea",
                "sales/emea/b.saiku",
                "sales/emea/uk",
                "sales/emea/uk/c.saiku",
            ]
        );
        assert!(all_paths(&objects).iter().all(|p| !p.contains("//")));
    }

    #[test]
    fn test_files_precede_sub_folders() {
        let root = RepositoryNode::root(
            "/solutions",
            vec![dir(
                "sales",
                true,
                vec![
                    dir("emea", true, vec![]),
                    file("z.saiku", true),
                    dir("apac", true, vec![]),
                    file("a.saiku", true),
                ],
            )],
        );

        let objects = flatten(&root, "/solutions", "");
        let names: Vec<&str> = objects[0].children().iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["z.saiku", "a.saiku", "emea", "apac"]);
    }

    #[test]
    fn test_top_level_files_follow_folders() {
        let root = RepositoryNode::root(
            "/solutions",
            vec![
                file("top.saiku", true),
                file("hidden.saiku", false),
                file("notes.txt", true),
                dir("reports", true, vec![]),
            ],
        );

        let objects = flatten(&root, "/solutions", "saiku");
        assert_eq!(objects.len(), 2);
        assert!(objects[0].is_folder());
        assert_eq!(objects[1].path(), "top.saiku");
        assert_eq!(objects[1].id(), "#top.saiku");
    }

    #[test]
    fn test_filter_is_literal_suffix() {
        let root = RepositoryNode::root(
            "/solutions",
            vec![dir(
                "dash",
                true,
                vec![file("abcdv", true), file("main.cdv", true), file("x.wcdf", true)],
            )],
        );

        let objects = flatten(&root, "/solutions", "cdv");
        let names: Vec<&str> = objects[0].children().iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["abcdv", "main.cdv"]);
        for f in all_files(&objects) {
            assert!(f.path().ends_with("cdv"));
        }
    }

    #[test]
    fn test_blank_filter_disables_filtering() {
        let root = reports_tree();
        let unfiltered = flatten(&root, "/solutions", "");
        let blank = flatten(&root, "/solutions", "  ");
        assert_eq!(all_paths(&unfiltered), all_paths(&blank));
        assert_eq!(all_files(&unfiltered).len(), 1);
    }

    #[test]
    fn test_invisible_folder_hides_subtree_for_any_filter() {
        let root = RepositoryNode::root(
            "/solutions",
            vec![dir(
                "hidden",
                false,
                vec![dir("inner", true, vec![file("x.saiku", true)])],
            )],
        );
        for filter in ["", "saiku", "x"] {
            assert!(flatten(&root, "/solutions", filter).is_empty());
        }
    }

    #[test]
    fn test_container_context_builds_container_paths() {
        let root = dir(
            "reports",
            true,
            vec![dir("monthly", true, vec![file("jan.saiku", true)])],
        );

        let objects = flatten(&root, "/solutions/reports", "");
        assert_eq!(
            all_paths(&objects),
            vec!["reports/monthly", "reports/monthly/jan.saiku"]
        );
    }

    #[test]
    fn test_localized_names_become_labels() {
        let root = RepositoryNode::root(
            "/solutions",
            vec![dir("reports", true, vec![file("q1.saiku", true).with_localized_name("First quarter")])
                .with_localized_name("Reports")],
        );

        let objects = flatten(&root, "/solutions", "");
        assert_eq!(objects[0].name(), "Reports");
        assert_eq!(objects[0].path(), "reports");
        assert_eq!(objects[0].children()[0].name(), "First quarter");
        assert_eq!(objects[0].children()[0].path(), "reports/q1.saiku");
    }

    #[test]
    fn test_malformed_node_keeps_earlier_siblings() {
        let broken = RepositoryNode {
            is_directory: Some(true),
            visible: Some(true),
            ..Default::default()
        };
        let root = RepositoryNode::root(
            "/solutions",
            vec![
                dir("first", true, vec![]),
                broken,
                dir("last", true, vec![]),
            ],
        );

        let objects = flatten(&root, "/solutions", "");
        assert_eq!(all_paths(&objects), vec!["first"]);
    }

    #[test]
    fn test_malformed_nested_node_truncates_only_its_level() {
        let broken = RepositoryNode {
            is_directory: Some(true),
            visible: Some(true),
            ..Default::default()
        };
        let root = RepositoryNode::root(
            "/solutions",
            vec![
                dir("outer", true, vec![dir("ok", true, vec![]), broken]),
                dir("sibling", true, vec![]),
            ],
        );

        let objects = flatten(&root, "/solutions", "");
        assert_eq!(all_paths(&objects), vec!["outer", "outer/ok", "sibling"]);
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let root = reports_tree();
        let first = flatten(&root, "/solutions", "saiku");
        let second = flatten(&root, "/solutions", "saiku");
        assert_eq!(first, second);
    }

    #[test]
    fn test_matches_type_filter() {
        assert!(matches_type_filter("q1.saiku", "saiku"));
        assert!(matches_type_filter("q1.saiku", ""));
        assert!(matches_type_filter("abcdv", "cdv"));
        assert!(!matches_type_filter("q1.saiku", "cdv"));
    }
}
