mod ureq_backend;

use std::io::{self, Read};

pub use ureq_backend::Client;

/// Upper bound on how much of a response body is ever buffered.
const MAX_BODY_LEN: u64 = 2 * 1024 * 1024;

pub struct Response {
    pub(self) reader: Box<dyn Read>,
}

pub enum Error {
    Status(u16, Response),
    Transport(Box<str>),
}

impl Response {
    pub fn into_string(self) -> Result<String, io::Error> {
        let mut vec = Vec::with_capacity(1024);
        self.reader.take(MAX_BODY_LEN).read_to_end(&mut vec)?;
        String::from_utf8(vec).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Reads up to `limit` bytes of the body for diagnostics. Read errors and
    /// invalid UTF-8 are tolerated, since this only ever ends up in a log line.
    pub fn into_snippet(self, limit: u64) -> String {
        let mut vec = Vec::new();
        let _ = self.reader.take(limit).read_to_end(&mut vec);
        String::from_utf8_lossy(&vec).trim().to_owned()
    }
}
