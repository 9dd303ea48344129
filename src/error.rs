//! Error types for the menu engine.
//!
//! Configuration misuse never surfaces here: missing callbacks, bad delays,
//! disabled menus and duplicate attachment all have defined fallbacks. What
//! remains are lookups of ids that are no longer live and failures reported by
//! the host, which are passed through untouched.

use thiserror::Error;

use crate::host::NodeId;
use crate::menu::MenuId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("node {0:?} has no parent")]
    NoParent(NodeId),
    #[error("node {0:?} is not attached to the document")]
    Detached(NodeId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("host error: {0}")]
    Host(#[from] HostError),
    #[error("unknown menu {0:?}")]
    UnknownMenu(MenuId),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_errors_convert_and_keep_their_message() {
        let err: Error = HostError::UnknownNode(NodeId(7)).into();
        assert_eq!(err, Error::Host(HostError::UnknownNode(NodeId(7))));
        assert!(err.to_string().contains("unknown node"));
    }
}
