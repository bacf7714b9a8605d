//! Unified error types.

use std::fmt;
use std::net::AddrParseError;

use crate::tree::node::Edge;

/// The error type returned by tine's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// startup and infrastructure failures: a bad route, a bad address, binding
/// to a port or accepting a connection.
#[derive(Debug)]
pub enum Error {
    Addr(AddrParseError),
    Io(std::io::Error),
    Route { path: String, source: InsertError },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addr(e) => write!(f, "invalid socket address: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Route { path, source } => write!(f, "invalid route `{path}`: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Addr(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Route { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<AddrParseError> for Error {
    fn from(e: AddrParseError) -> Self {
        Self::Addr(e)
    }
}

/// Why a pattern could not be added to a [`Tree`](crate::tree::Tree).
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InsertError {
    /// The pattern was the empty string.
    EmptyPattern,
    /// The pattern names a placeholder differently from an already registered
    /// route at the same position, e.g. `/users/:id` and `/users/:name`.
    Conflict {
        /// The registered route sharing the placeholder.
        with: String,
    },
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPattern => f.write_str("route pattern must not be empty"),
            Self::Conflict { with } => {
                write!(f, "placeholder conflicts with previously registered route: {with}")
            }
        }
    }
}

impl std::error::Error for InsertError {}

impl InsertError {
    /// Builds a conflict naming the first registered route reachable through
    /// `edge`, where `prefix` is the pattern text consumed above it.
    pub(crate) fn conflict<T>(prefix: &[u8], edge: &Edge<T>) -> Self {
        let mut with = [prefix, edge.label()].concat();
        let mut node = edge.node();
        while node.handler().is_none() {
            let Some(next) = node.edges().first() else { break };
            with.extend_from_slice(next.label());
            node = next.node();
        }
        Self::Conflict { with: String::from_utf8_lossy(&with).into_owned() }
    }
}
