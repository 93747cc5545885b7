use std::fmt::{Display, Formatter, Result as FmtResult};

/// The kind of lookup a cached value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Listing,
    Search,
    Detail,
    Chapter,
}
impl Operation {
    pub const ALL: [Operation; 4] = [Operation::Listing, Operation::Search, Operation::Detail, Operation::Chapter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Listing => "listing",
            Operation::Search => "search",
            Operation::Detail => "detail",
            Operation::Chapter => "chapter",
        }
    }
}
impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// `(operation, normalized arguments)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub operation: Operation,
    pub args: String,
}
impl CacheKey {
    pub fn new(operation: Operation, args: impl Into<String>) -> Self {
        Self { operation, args: args.into() }
    }
}
impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.operation, self.args)
    }
}
