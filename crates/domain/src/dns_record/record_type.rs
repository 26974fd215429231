use std::fmt;
use std::str::FromStr;

/// Query types accepted in a corpus file.
///
/// The mnemonic table is fixed; anything outside it is a corpus load error.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    // Basic records
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    MX,
    TXT,
    AAAA,

    // Advanced records
    SRV,
    NAPTR,
    A6,

    // Legacy/Informational records (RFC 1035, mostly obsolete)
    MD,
    MF,
    MB,
    MG,
    MR,
    NULL,
    WKS,
    HINFO,
    MINFO,

    // Meta queries
    AXFR,
    MAILB,
    MAILA,
    ANY,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::NS => "NS",
            RecordType::CNAME => "CNAME",
            RecordType::SOA => "SOA",
            RecordType::PTR => "PTR",
            RecordType::MX => "MX",
            RecordType::TXT => "TXT",
            RecordType::AAAA => "AAAA",
            RecordType::SRV => "SRV",
            RecordType::NAPTR => "NAPTR",
            RecordType::A6 => "A6",
            RecordType::MD => "MD",
            RecordType::MF => "MF",
            RecordType::MB => "MB",
            RecordType::MG => "MG",
            RecordType::MR => "MR",
            RecordType::NULL => "NULL",
            RecordType::WKS => "WKS",
            RecordType::HINFO => "HINFO",
            RecordType::MINFO => "MINFO",
            RecordType::AXFR => "AXFR",
            RecordType::MAILB => "MAILB",
            RecordType::MAILA => "MAILA",
            RecordType::ANY => "ANY",
        }
    }

    /// Convert to wire format number
    pub fn to_u16(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::MD => 3,
            RecordType::MF => 4,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::MB => 7,
            RecordType::MG => 8,
            RecordType::MR => 9,
            RecordType::NULL => 10,
            RecordType::WKS => 11,
            RecordType::PTR => 12,
            RecordType::HINFO => 13,
            RecordType::MINFO => 14,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
            RecordType::SRV => 33,
            RecordType::NAPTR => 35,
            RecordType::A6 => 38,
            RecordType::AXFR => 252,
            RecordType::MAILB => 253,
            RecordType::MAILA => 254,
            RecordType::ANY => 255,
        }
    }

    /// Returns every type in the mnemonic table
    pub fn all() -> [RecordType; 24] {
        [
            RecordType::A,
            RecordType::NS,
            RecordType::MD,
            RecordType::MF,
            RecordType::CNAME,
            RecordType::SOA,
            RecordType::MB,
            RecordType::MG,
            RecordType::MR,
            RecordType::NULL,
            RecordType::WKS,
            RecordType::PTR,
            RecordType::HINFO,
            RecordType::MINFO,
            RecordType::MX,
            RecordType::TXT,
            RecordType::AAAA,
            RecordType::SRV,
            RecordType::NAPTR,
            RecordType::A6,
            RecordType::AXFR,
            RecordType::MAILB,
            RecordType::MAILA,
            RecordType::ANY,
        ]
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            return Ok(RecordType::ANY);
        }

        Self::all()
            .into_iter()
            .find(|rt| rt.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid record type: {}", s))
    }
}
