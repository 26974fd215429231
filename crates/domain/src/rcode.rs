use std::fmt;

/// Outcome buckets a matched response is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RcodeClass {
    Success,
    FormatError,
    ServerFailure,
    NxDomain,
    NotImplemented,
    Refused,
    /// Any RCODE outside 0..=5
    Other,
}

impl RcodeClass {
    pub const COUNT: usize = 7;

    pub fn from_rcode(rcode: u8) -> Self {
        match rcode {
            0 => RcodeClass::Success,
            1 => RcodeClass::FormatError,
            2 => RcodeClass::ServerFailure,
            3 => RcodeClass::NxDomain,
            4 => RcodeClass::NotImplemented,
            5 => RcodeClass::Refused,
            _ => RcodeClass::Other,
        }
    }

    /// Position of this class in a per-class counter array
    pub fn index(&self) -> usize {
        match self {
            RcodeClass::Success => 0,
            RcodeClass::FormatError => 1,
            RcodeClass::ServerFailure => 2,
            RcodeClass::NxDomain => 3,
            RcodeClass::NotImplemented => 4,
            RcodeClass::Refused => 5,
            RcodeClass::Other => 6,
        }
    }

    pub fn all() -> [RcodeClass; Self::COUNT] {
        [
            RcodeClass::Success,
            RcodeClass::FormatError,
            RcodeClass::ServerFailure,
            RcodeClass::NxDomain,
            RcodeClass::NotImplemented,
            RcodeClass::Refused,
            RcodeClass::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RcodeClass::Success => "NOERROR",
            RcodeClass::FormatError => "FORMERR",
            RcodeClass::ServerFailure => "SERVFAIL",
            RcodeClass::NxDomain => "NXDOMAIN",
            RcodeClass::NotImplemented => "NOTIMP",
            RcodeClass::Refused => "REFUSED",
            RcodeClass::Other => "OTHER",
        }
    }
}

impl fmt::Display for RcodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
