//! Query codec
//!
//! Builds query packets with `hickory-proto` and reads the ID/RCODE prefix of
//! responses straight from the wire.

use super::edns;
use ferrous_dnsperf_application::ports::{QueryCodec, ResponseHeader, RESPONSE_HEADER_LEN};
use ferrous_dnsperf_domain::{CorpusEntry, DomainError, RecordType};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType as HickoryRecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::Ipv4Addr;
use std::str::FromStr;

const RCODE_MASK: u16 = 0x000F;

/// Encodes recursive queries with sequential transaction IDs.
///
/// IDs start at 1 and wrap at 65536. The codec is owned by a single dispatch
/// engine, so the counter needs no synchronisation.
pub struct HickoryQueryCodec {
    last_id: u16,
    client_subnet: Option<Ipv4Addr>,
}

impl HickoryQueryCodec {
    pub fn new(client_subnet: Option<Ipv4Addr>) -> Self {
        Self {
            last_id: 0,
            client_subnet,
        }
    }

    pub fn client_subnet(&self) -> Option<Ipv4Addr> {
        self.client_subnet
    }

    fn next_transaction_id(&mut self) -> u16 {
        self.last_id = self.last_id.wrapping_add(1);
        self.last_id
    }

    fn to_hickory(record_type: RecordType) -> HickoryRecordType {
        HickoryRecordType::from(record_type.to_u16())
    }
}

impl Default for HickoryQueryCodec {
    fn default() -> Self {
        Self::new(None)
    }
}

impl QueryCodec for HickoryQueryCodec {
    fn encode(&mut self, entry: &CorpusEntry, buf: &mut Vec<u8>) -> Result<u16, DomainError> {
        let name = Name::from_str(&entry.domain).map_err(|e| {
            DomainError::EncodeFailed(format!("Invalid domain '{}': {}", entry.domain, e))
        })?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(Self::to_hickory(entry.record_type));
        query.set_query_class(DNSClass::IN);

        let id = self.next_transaction_id();
        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);

        buf.clear();
        {
            let mut encoder = BinEncoder::new(&mut *buf);
            message.emit(&mut encoder).map_err(|e| {
                DomainError::EncodeFailed(format!("Failed to serialize DNS message: {}", e))
            })?;
        }

        if buf.len() < RESPONSE_HEADER_LEN {
            return Err(DomainError::EncodeFailed(format!(
                "encoded message is only {} bytes",
                buf.len()
            )));
        }
        buf[..2].copy_from_slice(&id.to_be_bytes());

        if let Some(addr) = self.client_subnet {
            edns::append_client_subnet(buf, addr)?;
        }

        Ok(id)
    }

    fn decode(&self, bytes: &[u8]) -> Option<ResponseHeader> {
        if bytes.len() < RESPONSE_HEADER_LEN {
            return None;
        }

        let id = u16::from_be_bytes([bytes[0], bytes[1]]);
        let flags = u16::from_be_bytes([bytes[2], bytes[3]]);

        Some(ResponseHeader {
            id,
            rcode: (flags & RCODE_MASK) as u8,
        })
    }
}
