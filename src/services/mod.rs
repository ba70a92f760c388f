pub mod worker;

use thiserror::Error;

use crate::payload::SignedUpdate;

#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum DdnsUpdateError {
    // the worker answered, but not with a success status
    #[error("worker returned HTTP {0}: {1}")]
    Status(u16, Box<str>),

    #[error("HTTP transport error: {0}")]
    TransportError(Box<str>),
}

pub trait DdnsService {
    /// Deliver one signed update. A successful status is taken as
    /// confirmation; whatever the endpoint says in the body is ignored.
    fn update_record(&mut self, update: &SignedUpdate) -> Result<(), DdnsUpdateError>;
}
