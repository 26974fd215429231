use ferrous_dnsperf_domain::{CorpusEntry, DomainError};

/// Length of the response prefix needed for correlation: ID plus flags
pub const RESPONSE_HEADER_LEN: usize = 4;

/// Fields the engine reads back from a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub id: u16,
    /// Low four bits of the flags word
    pub rcode: u8,
}

/// Builds query packets and reads response headers.
pub trait QueryCodec {
    /// Encodes a query for `entry` into `buf` (replacing its contents) and
    /// returns the transaction ID written into it.
    fn encode(&mut self, entry: &CorpusEntry, buf: &mut Vec<u8>) -> Result<u16, DomainError>;

    /// Returns `None` when `bytes` is shorter than [`RESPONSE_HEADER_LEN`].
    fn decode(&self, bytes: &[u8]) -> Option<ResponseHeader>;
}
