use ferrous_dnsperf_domain::{Corpus, DomainError};
use std::fs;
use std::path::Path;
use tracing::info;

/// Reads a corpus file into memory before the run starts.
pub struct CorpusLoader;

impl CorpusLoader {
    pub fn load(path: impl AsRef<Path>) -> Result<Corpus, DomainError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| DomainError::CorpusIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let corpus = Corpus::parse(&text)?;
        info!(path = %path.display(), entries = corpus.len(), "Corpus loaded");
        Ok(corpus)
    }
}
