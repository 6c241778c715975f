//! Evidence sources: HTML documents and arbitrary source files whose content
//! proves a selector, id or class is in use.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DeadcssResult, IoResultExt};

/// Read a whole file as text, replacing invalid UTF-8 sequences.
pub fn read_text(path: &Path) -> DeadcssResult<String> {
    let bytes = fs::read(path).with_path(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Something whose text can be used as evidence.
pub trait EvidenceSource {
    /// Identity used in logs and reports.
    fn name(&self) -> String;

    /// Load the full text of the source.
    fn load(&self) -> DeadcssResult<String>;
}

impl EvidenceSource for Path {
    fn name(&self) -> String {
        self.display().to_string()
    }

    fn load(&self) -> DeadcssResult<String> {
        read_text(self)
    }
}

impl EvidenceSource for PathBuf {
    fn name(&self) -> String {
        self.as_path().name()
    }

    fn load(&self) -> DeadcssResult<String> {
        read_text(self)
    }
}

/// In-memory evidence, e.g. a rendered page fetched elsewhere.
#[derive(Debug, Clone)]
pub struct InlineEvidence {
    pub name: String,
    pub content: String,
}

impl InlineEvidence {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

impl EvidenceSource for InlineEvidence {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn load(&self) -> DeadcssResult<String> {
        Ok(self.content.clone())
    }
}
