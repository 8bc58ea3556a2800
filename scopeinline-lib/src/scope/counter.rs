use std::fmt;

/// One allocated scope. Its class name is the configured prefix followed by
/// the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(u64);

impl ScopeId {
    pub fn value(self) -> u64 {
        self.0
    }

    pub fn class_name(self, prefix: &str) -> String {
        format!("{prefix}{}", self.0)
    }
}

impl From<u64> for ScopeId {
    fn from(value: u64) -> Self {
        ScopeId(value)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out strictly increasing scope ids. Never reset.
#[derive(Debug)]
pub struct ScopeCounter {
    next: u64,
}

impl ScopeCounter {
    pub fn starting_at(first: u64) -> Self {
        ScopeCounter { next: first }
    }

    /// The id the next call to [`allocate`](Self::allocate) returns.
    pub fn peek(&self) -> ScopeId {
        ScopeId(self.next)
    }

    pub fn allocate(&mut self) -> ScopeId {
        let id = ScopeId(self.next);
        self.next += 1;
        id
    }
}

impl Default for ScopeCounter {
    fn default() -> Self {
        Self::starting_at(1)
    }
}
