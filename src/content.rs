//! Content generation: onboarding documents to voice agent files

mod pipeline;
mod prompts;
mod store;

pub use pipeline::{
    check_script, normalize_agent_name, parse_states, ContentError, ContentOutcome,
    ContentPipeline, ContentRequest,
};
pub use store::AgentContentStore;

use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};

/// Extensions offered as source documents
pub const DOCUMENT_EXTENSIONS: &[&str] = &["txt", "md"];

/// Source documents in `dir`, sorted by file name. A missing directory has none.
pub fn list_documents(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut docs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_document = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| DOCUMENT_EXTENSIONS.contains(&e));
        if path.is_file() && is_document {
            docs.push(path);
        }
    }
    docs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(docs)
}

/// Entries of a batch file: a JSON array of requests.
///
/// Only a file that is not a JSON array fails as a whole; a malformed entry
/// is reported in its own slot so the rest of the batch can still run.
pub fn parse_batch(
    raw: &str,
) -> Result<Vec<Result<ContentRequest, serde_json::Error>>, serde_json::Error> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    Ok(entries
        .into_iter()
        .map(ContentRequest::deserialize)
        .collect())
}
