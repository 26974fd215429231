use serde::{Deserialize, Serialize};

/// Location of the `<domain, qtype>` data file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CorpusConfig {
    #[serde(default)]
    pub path: Option<String>,
}
