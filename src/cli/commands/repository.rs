//! Repository subcommands.

use bytes::Bytes;
use clap::Args;
use serde::Serialize;

use crate::app::{App, ResourceResponse};
use crate::cli::{CliError, GlobalArgs, InputSource, OutputSink, Result};
use crate::tree::RepositoryObject;

// =============================================================================
// List
// =============================================================================

/// Arguments for the list command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Folder to list, relative to the repository root.
    #[arg(long)]
    pub path: Option<String>,

    /// Only list files whose name ends with this suffix.
    #[arg(long = "type")]
    pub type_filter: Option<String>,

    #[command(flatten)]
    pub output: OutputSink,
}

impl ListArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let objects = app
            .list_repository(self.path.as_deref(), self.type_filter.as_deref())
            .await;

        if global.json {
            self.output.write_json(&objects).await?;
        } else {
            self.output.write_str(render_tree(&objects).trim_end()).await?;
        }
        Ok(())
    }
}

/// One line per object, folders suffixed with `/`, children indented.
fn render_tree(objects: &[RepositoryObject]) -> String {
    let mut out = String::new();
    render_level(objects, 0, &mut out);
    out
}

fn render_level(objects: &[RepositoryObject], depth: usize, out: &mut String) {
    for object in objects {
        out.push_str(&"  ".repeat(depth));
        out.push_str(object.name());
        if object.is_folder() {
            out.push('/');
        }
        out.push('\n');
        render_level(object.children(), depth + 1, out);
    }
}

// =============================================================================
// Load
// =============================================================================

/// Arguments for the load command.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Resource identifier, e.g. `solution/folder/query.saiku`.
    pub file: String,

    #[command(flatten)]
    pub output: OutputSink,
}

#[derive(Serialize)]
struct LoadOutput<'a> {
    file: &'a str,
    content_length: usize,
    content: String,
}

impl LoadArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        match app.load_resource(Some(&self.file)).await {
            ResourceResponse::Content {
                body,
                content_length,
            } => {
                if global.json {
                    let output = LoadOutput {
                        file: &self.file,
                        content_length,
                        content: String::from_utf8_lossy(&body).into_owned(),
                    };
                    self.output.write_json(&output).await?;
                } else {
                    self.output.write_bytes(&body).await?;
                }
                Ok(())
            }
            ResourceResponse::NotFound => Err(CliError::NotFound(self.file)),
            _ => Err(server_error("load", self.file)),
        }
    }
}

// =============================================================================
// Save
// =============================================================================

/// Arguments for the save command.
#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Resource identifier, e.g. `solution/folder/query.saiku`.
    pub file: String,

    /// New content (reads from --input-file or stdin if omitted).
    pub content: Option<String>,

    #[command(flatten)]
    pub input: InputSource,
}

#[derive(Serialize)]
struct StatusOutput<'a> {
    file: &'a str,
    status: u16,
}

impl SaveArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let content = self.input.read_bytes(self.content.as_deref()).await?;
        let response = app
            .save_resource(Some(&self.file), Bytes::from(content))
            .await;
        if !response.is_success() {
            return Err(server_error("save", self.file));
        }
        if global.json {
            let output = StatusOutput {
                file: &self.file,
                status: response.status_code(),
            };
            OutputSink::default().write_json(&output).await?;
        }
        Ok(())
    }
}

// =============================================================================
// Delete
// =============================================================================

/// Arguments for the delete command.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Resource identifier, e.g. `solution/folder/query.saiku`.
    pub file: String,
}

impl DeleteArgs {
    pub async fn run(self, app: &App, _global: &GlobalArgs) -> Result<()> {
        match app.delete_resource(Some(&self.file)).await {
            response if response.is_success() => Ok(()),
            _ => Err(server_error("delete", self.file)),
        }
    }
}

fn server_error(operation: &'static str, identifier: String) -> CliError {
    CliError::ServerError {
        operation,
        identifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::app::AppParts;
    use crate::document::{MemoryDocumentSource, RepositoryNode};
    use crate::session::StaticSessionIdentity;
    use crate::storage::MemoryStorageProvider;
    use tempfile::TempDir;

    fn app(storage: MemoryStorageProvider) -> App {
        let root = RepositoryNode::root(
            "/solutions",
            vec![RepositoryNode::directory(
                "reports",
                true,
                vec![
                    RepositoryNode::file("q1.saiku", true),
                    RepositoryNode::directory("sub", true, vec![RepositoryNode::file("q2.saiku", true)]),
                ],
            )],
        );
        let parts = AppParts::new(
            Arc::new(MemoryDocumentSource::from_node(&root).unwrap()),
            Arc::new(StaticSessionIdentity::new("alice")),
        )
        .with_storage(Arc::new(storage));
        App::new(parts)
    }

    #[tokio::test]
    async fn test_render_tree() {
        let objects = app(MemoryStorageProvider::new())
            .list_repository(None, None)
            .await;
        assert_eq!(render_tree(&objects), "reports/\n  q1.saiku\n  sub/\n    q2.saiku\n");
    }

    #[tokio::test]
    async fn test_load_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("query.saiku");
        let app = app(MemoryStorageProvider::new().with_file("reports/q1.saiku", "SELECT 1"));

        let args = LoadArgs {
            file: "reports/q1.saiku".to_string(),
            output: OutputSink {
                file: Some(out.clone()),
            },
        };
        args.run(&app, &GlobalArgs::default()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "SELECT 1");
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let app = app(MemoryStorageProvider::new());
        let args = LoadArgs {
            file: "reports/missing.saiku".to_string(),
            output: OutputSink::default(),
        };
        let result = args.run(&app, &GlobalArgs::default()).await;
        assert!(matches!(result, Err(CliError::NotFound(f)) if f == "reports/missing.saiku"));
    }

    #[tokio::test]
    async fn test_save_and_delete_outcomes() {
        let app = app(MemoryStorageProvider::new().with_directory("reports"));

        let save = SaveArgs {
            file: "reports/q3.saiku".to_string(),
            content: Some("SELECT 3".to_string()),
            input: InputSource::default(),
        };
        save.run(&app, &GlobalArgs::default()).await.unwrap();

        let delete = DeleteArgs {
            file: "reports/q3.saiku".to_string(),
        };
        let result = delete.run(&app, &GlobalArgs::default()).await;
        assert!(matches!(
            result,
            Err(CliError::ServerError {
                operation: "delete",
                ..
            })
        ));
    }
}
