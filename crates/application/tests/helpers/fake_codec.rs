use ferrous_dnsperf_application::ports::{QueryCodec, ResponseHeader, RESPONSE_HEADER_LEN};
use ferrous_dnsperf_domain::{CorpusEntry, DomainError};

/// Writes `ID | 0x0100 | domain bytes`; IDs count up from 1.
#[derive(Default)]
pub struct FakeCodec {
    last_id: u16,
    reject_domain: Option<String>,
}

impl FakeCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `encode` fail for one domain
    pub fn rejecting(domain: &str) -> Self {
        Self {
            last_id: 0,
            reject_domain: Some(domain.to_string()),
        }
    }

    /// Response header with the given ID and RCODE
    pub fn response(id: u16, rcode: u8) -> Vec<u8> {
        let [hi, lo] = id.to_be_bytes();
        vec![hi, lo, 0x81, 0x80 | (rcode & 0x0F)]
    }
}

impl QueryCodec for FakeCodec {
    fn encode(&mut self, entry: &CorpusEntry, buf: &mut Vec<u8>) -> Result<u16, DomainError> {
        if self.reject_domain.as_deref() == Some(&*entry.domain) {
            return Err(DomainError::EncodeFailed(format!(
                "label too long in {}",
                entry.domain
            )));
        }

        self.last_id = self.last_id.wrapping_add(1);
        buf.clear();
        buf.extend_from_slice(&self.last_id.to_be_bytes());
        buf.extend_from_slice(&[0x01, 0x00]);
        buf.extend_from_slice(entry.domain.as_bytes());
        Ok(self.last_id)
    }

    fn decode(&self, bytes: &[u8]) -> Option<ResponseHeader> {
        if bytes.len() < RESPONSE_HEADER_LEN {
            return None;
        }
        Some(ResponseHeader {
            id: u16::from_be_bytes([bytes[0], bytes[1]]),
            rcode: bytes[3] & 0x0F,
        })
    }
}
