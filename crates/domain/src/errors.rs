use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Domain name too long ({len} bytes, max {max}): {domain}")]
    DomainTooLong {
        domain: String,
        len: usize,
        max: usize,
    },

    #[error("Unknown query type '{qtype}' on line {line}")]
    UnknownQueryType { qtype: String, line: usize },

    #[error("Malformed corpus line {line}: {content}")]
    MalformedCorpusLine { line: usize, content: String },

    #[error("Corpus contains no queries")]
    EmptyCorpus,

    #[error("Failed to read corpus '{path}': {reason}")]
    CorpusIo { path: String, reason: String },

    #[error("Failed to encode query: {0}")]
    EncodeFailed(String),

    #[error("Socket error: {0}")]
    SocketError(String),

    #[error("Event system error: {0}")]
    EventSystem(String),

    #[error("Descriptor {fd} exceeds event table bound {limit}")]
    DescriptorOutOfRange { fd: i32, limit: usize },

    #[error("No readiness backend available on this platform")]
    UnsupportedPlatform,

    #[error("I/O error: {0}")]
    IoError(String),
}
