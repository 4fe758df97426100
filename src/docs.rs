// src/docs.rs
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rust_embed::RustEmbed;
use std::path::PathBuf;

use crate::errors::{DispatchError, Result};
use crate::models::Command;

#[derive(RustEmbed)]
#[folder = "docs/"]
struct EmbeddedDocs;

/// The two documentation artifacts a deployment serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    User,
    Dev,
}

impl DocKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            DocKind::User => "user.md",
            DocKind::Dev => "dev.md",
        }
    }

    pub fn for_command(command: Command) -> Option<Self> {
        match command {
            Command::DocsUser => Some(DocKind::User),
            Command::DocsDev => Some(DocKind::Dev),
            _ => None,
        }
    }
}

/// Where documentation is read from.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DocsSource {
    /// Compiled into the binary from `docs/`.
    #[default]
    Embedded,
    /// Read at request time from a directory.
    Directory(PathBuf),
}

impl DocsSource {
    pub fn fetch(&self, kind: DocKind) -> Result<Vec<u8>> {
        match self {
            DocsSource::Embedded => EmbeddedDocs::get(kind.file_name())
                .map(|file| file.data.into_owned())
                .ok_or_else(|| DispatchError::DocsNotFound(kind.file_name().to_string())),
            DocsSource::Directory(dir) => {
                let path = dir.join(kind.file_name());
                if !path.is_file() {
                    return Err(DispatchError::DocsNotFound(path.display().to_string()));
                }
                Ok(std::fs::read(path)?)
            }
        }
    }

    /// The artifact, base64-encoded for transport in a `result`.
    pub fn fetch_base64(&self, kind: DocKind) -> Result<String> {
        let bytes = self.fetch(kind)?;
        Ok(STANDARD.encode(bytes))
    }
}
