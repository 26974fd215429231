use super::RecordType;
use crate::validators::{validate_domain_name, MAX_DOMAIN_LEN};
use crate::DomainError;
use std::sync::Arc;

/// One `<domain, qtype>` pair a query can exercise.
/// Uses `Arc<str>` so slots can point at entries without copying the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub domain: Arc<str>,
    pub record_type: RecordType,
}

impl CorpusEntry {
    pub fn new(domain: impl Into<Arc<str>>, record_type: RecordType) -> Result<Self, DomainError> {
        let domain = domain.into();
        if domain.len() > MAX_DOMAIN_LEN {
            return Err(DomainError::DomainTooLong {
                domain: domain.to_string(),
                len: domain.len(),
                max: MAX_DOMAIN_LEN,
            });
        }
        validate_domain_name(&domain).map_err(DomainError::InvalidDomainName)?;

        Ok(Self {
            domain,
            record_type,
        })
    }
}

/// The immutable set of queries a run draws from.
///
/// Loaded once before the run and shared read-only by the dispatch engine;
/// query slots refer to entries by index.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

impl Corpus {
    pub fn new(entries: Vec<CorpusEntry>) -> Result<Self, DomainError> {
        if entries.is_empty() {
            return Err(DomainError::EmptyCorpus);
        }
        Ok(Self { entries })
    }

    /// Parses corpus text: one `DOMAIN QTYPE` record per line.
    ///
    /// Lines starting with `#` and blank lines are skipped. Fields beyond the
    /// second are ignored.
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let mut entries = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            if raw.starts_with('#') || raw.trim().is_empty() {
                continue;
            }

            let mut fields = raw.split_whitespace();
            let (Some(domain), Some(qtype)) = (fields.next(), fields.next()) else {
                return Err(DomainError::MalformedCorpusLine {
                    line,
                    content: raw.to_string(),
                });
            };

            let record_type =
                qtype
                    .parse::<RecordType>()
                    .map_err(|_| DomainError::UnknownQueryType {
                        qtype: qtype.to_string(),
                        line,
                    })?;

            entries.push(CorpusEntry::new(domain, record_type)?);
        }

        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CorpusEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }
}
