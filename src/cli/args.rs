//! Global flags and the input/output plumbing shared by subcommands.

use std::path::PathBuf;

use clap::Args;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::app::AppContext;
use crate::config::ConfigSource;

/// Failures while reading command input or writing command output.
#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("cannot read or write: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    InvalidArgs(String),

    #[error("cannot encode output: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArgsError>;

// =============================================================================
// Global Flags
// =============================================================================

/// Flags accepted before or after any subcommand.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Base INI config file (default: $SOLREPO_CONFIG_FILE, then ~/.solrepoconfig).
    #[arg(long = "config-file", global = true)]
    pub config_file: Option<PathBuf>,

    /// INI file layered over the base config file.
    #[arg(long = "config-file-overrides", global = true)]
    pub config_file_overrides: Option<PathBuf>,

    /// Single setting as section.key=value; may be repeated.
    #[arg(long = "config", value_parser = parse_config_override, global = true)]
    pub config_overrides: Vec<(String, String)>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable the session document cache.
    #[arg(long = "no-cache", global = true)]
    pub no_cache: bool,

    /// Session key used to scope cached repository documents.
    #[arg(long = "session", global = true)]
    pub session: Option<String>,
}

impl GlobalArgs {
    /// The configuration layers these flags describe. `--no-cache` and
    /// `--session` win over any `--config` setting of the same key.
    pub fn to_config_source(&self) -> ConfigSource {
        let mut overrides = self.config_overrides.clone();
        if self.no_cache {
            overrides.push(("cache.enabled".to_string(), "false".to_string()));
        }
        if let Some(ref session) = self.session {
            overrides.push(("session.key".to_string(), session.clone()));
        }
        ConfigSource {
            config_file: self.config_file.clone(),
            override_file: self.config_file_overrides.clone(),
            overrides,
        }
    }

    pub fn to_app_context(&self) -> AppContext {
        AppContext {
            config_source: self.to_config_source(),
        }
    }
}

fn parse_config_override(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected section.key=value, got '{}'", s)),
    }
}

// =============================================================================
// Command Input and Output
// =============================================================================

/// Content given as an argument, a file, or on stdin.
#[derive(Args, Debug, Default)]
pub struct InputSource {
    /// Take the content from this file.
    #[arg(id = "input_file", short = 'f', long = "input-file")]
    pub file: Option<PathBuf>,
}

impl InputSource {
    /// The content bytes, untouched. `arg_value` and `--input-file` are
    /// mutually exclusive; with neither, stdin is read to the end.
    pub async fn read_bytes(&self, arg_value: Option<&str>) -> Result<Vec<u8>> {
        if arg_value.is_some() && self.file.is_some() {
            return Err(ArgsError::InvalidArgs(
                "give the content either as an argument or with --input-file, not both"
                    .to_string(),
            ));
        }
        if let Some(value) = arg_value {
            return Ok(value.as_bytes().to_vec());
        }
        match &self.file {
            Some(path) => Ok(tokio::fs::read(path).await?),
            None => read_all(tokio::io::stdin()).await,
        }
    }
}

/// Destination of command output: a file, or stdout.
#[derive(Args, Debug, Default)]
pub struct OutputSink {
    /// Write to this file instead of stdout.
    #[arg(id = "output_file", short = 'o', long = "output-file")]
    pub file: Option<PathBuf>,
}

impl OutputSink {
    /// Text output; stdout gets a trailing newline, files do not.
    pub async fn write_str(&self, value: &str) -> Result<()> {
        match &self.file {
            Some(path) => Ok(tokio::fs::write(path, value).await?),
            None => write_all(tokio::io::stdout(), &[value.as_bytes(), b"\n"]).await,
        }
    }

    pub async fn write_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        self.write_str(&serde_json::to_string_pretty(value)?).await
    }

    /// Resource bytes exactly as loaded.
    pub async fn write_bytes(&self, data: &[u8]) -> Result<()> {
        match &self.file {
            Some(path) => Ok(tokio::fs::write(path, data).await?),
            None => write_all(tokio::io::stdout(), &[data]).await,
        }
    }
}

async fn read_all(mut reader: impl AsyncRead + Unpin) -> Result<Vec<u8>> {
    let mut contents = Vec::new();
    reader.read_to_end(&mut contents).await?;
    Ok(contents)
}

async fn write_all(mut writer: impl AsyncWrite + Unpin, parts: &[&[u8]]) -> Result<()> {
    for part in parts {
        writer.write_all(part).await?;
    }
    writer.flush().await?;
    Ok(())
}
