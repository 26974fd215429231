//! EDNS0 client-subnet (RFC 7871) OPT record, appended to an encoded query.

use ferrous_dnsperf_domain::DomainError;
use std::net::Ipv4Addr;

/// Advertised UDP payload size, carried in the OPT record's CLASS field
pub const EDNS_UDP_PAYLOAD_SIZE: u16 = 4096;

/// EDNS option code for edns-client-subnet
pub const CLIENT_SUBNET_OPTION_CODE: u16 = 8;

const OPT_RECORD_TYPE: u16 = 41;
const FAMILY_IPV4: u16 = 1;
const SOURCE_PREFIX_LEN: u8 = 32;
const SCOPE_PREFIX_LEN: u8 = 0;

const DNS_HEADER_LEN: usize = 12;
const ARCOUNT_OFFSET: usize = 10;

/// FAMILY(2) + SOURCE PREFIX(1) + SCOPE PREFIX(1) + ADDRESS(4)
const OPTION_DATA_LEN: u16 = 8;
/// OPTION-CODE(2) + OPTION-LENGTH(2) + option data
const RDATA_LEN: u16 = 4 + OPTION_DATA_LEN;

/// Length of the record [`append_client_subnet`] adds
pub const CLIENT_SUBNET_RECORD_LEN: usize = 11 + RDATA_LEN as usize;

/// Appends an OPT record carrying `addr`/32 and bumps ARCOUNT.
///
/// `message` must be a complete wire-format message without an OPT record.
pub fn append_client_subnet(message: &mut Vec<u8>, addr: Ipv4Addr) -> Result<(), DomainError> {
    if message.len() < DNS_HEADER_LEN {
        return Err(DomainError::EncodeFailed(format!(
            "message of {} bytes has no complete header",
            message.len()
        )));
    }

    let arcount = u16::from_be_bytes([message[ARCOUNT_OFFSET], message[ARCOUNT_OFFSET + 1]])
        .checked_add(1)
        .ok_or_else(|| DomainError::EncodeFailed("additional record count overflow".into()))?;
    message[ARCOUNT_OFFSET..ARCOUNT_OFFSET + 2].copy_from_slice(&arcount.to_be_bytes());

    message.reserve(CLIENT_SUBNET_RECORD_LEN);

    // Owner name: root
    message.push(0x00);
    message.extend_from_slice(&OPT_RECORD_TYPE.to_be_bytes());
    message.extend_from_slice(&EDNS_UDP_PAYLOAD_SIZE.to_be_bytes());
    // Extended RCODE, version, flags
    message.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    message.extend_from_slice(&RDATA_LEN.to_be_bytes());

    message.extend_from_slice(&CLIENT_SUBNET_OPTION_CODE.to_be_bytes());
    message.extend_from_slice(&OPTION_DATA_LEN.to_be_bytes());
    message.extend_from_slice(&FAMILY_IPV4.to_be_bytes());
    message.push(SOURCE_PREFIX_LEN);
    message.push(SCOPE_PREFIX_LEN);
    message.extend_from_slice(&addr.octets());

    Ok(())
}
