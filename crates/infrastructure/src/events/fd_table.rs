use ferrous_dnsperf_application::ports::{Direction, Token};
use ferrous_dnsperf_domain::DomainError;
use std::os::fd::RawFd;

/// Interest registered for one descriptor: a callback token per direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FdInterest {
    tokens: [Option<Token>; 2],
}

impl FdInterest {
    pub fn token(&self, direction: Direction) -> Option<Token> {
        self.tokens[direction.index()]
    }

    pub fn is_set(&self, direction: Direction) -> bool {
        self.token(direction).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.iter().all(Option::is_none)
    }

    pub fn set(&mut self, direction: Direction, token: Token) {
        self.tokens[direction.index()] = Some(token);
    }

    pub fn clear(&mut self, direction: Direction) -> Option<Token> {
        self.tokens[direction.index()].take()
    }
}

/// Fixed descriptor → interest table, indexed by descriptor value.
///
/// Sized once at backend init; descriptors at or past the bound are rejected
/// rather than growing the table.
pub struct FdTable {
    entries: Box<[FdInterest]>,
}

impl FdTable {
    pub fn new(max_fds: usize) -> Self {
        Self {
            entries: vec![FdInterest::default(); max_fds].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    fn index(&self, fd: RawFd) -> Option<usize> {
        usize::try_from(fd)
            .ok()
            .filter(|&index| index < self.entries.len())
    }

    pub fn get(&self, fd: RawFd) -> Option<&FdInterest> {
        self.index(fd).map(|index| &self.entries[index])
    }

    pub fn get_mut(&mut self, fd: RawFd) -> Result<&mut FdInterest, DomainError> {
        match self.index(fd) {
            Some(index) => Ok(&mut self.entries[index]),
            None => Err(DomainError::DescriptorOutOfRange {
                fd,
                limit: self.entries.len(),
            }),
        }
    }

    pub fn is_interested(&self, fd: RawFd, direction: Direction) -> bool {
        self.get(fd).is_some_and(|interest| interest.is_set(direction))
    }

    /// Number of descriptors with any interest registered
    pub fn registered(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.is_empty()).count()
    }
}
