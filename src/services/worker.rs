use crate::config::Config;
use crate::http::{Client, Error};
use crate::payload::SignedUpdate;

use super::{DdnsService, DdnsUpdateError};

/// How much of a rejected response is kept for the log.
const ERROR_SNIPPET_LEN: u64 = 512;

/// Posts signed updates to the worker, which checks the signature and then
/// edits the DNS record on its own.
pub struct Service {
    client: Client,
    endpoint: Box<str>,
}

impl Service {
    pub fn from_config(config: &Config, client: Client) -> Self {
        Self::new(client, config.worker_url.clone())
    }

    pub fn new(client: Client, endpoint: Box<str>) -> Self {
        Self { client, endpoint }
    }
}

impl DdnsService for Service {
    fn update_record(&mut self, update: &SignedUpdate) -> Result<(), DdnsUpdateError> {
        let body = update.body();

        let response = self
            .client
            .post(&self.endpoint)
            .set("Content-Type", "application/json; charset=utf-8")
            .set("Authorization", update.signature())
            .set("Content-Length", &body.len().to_string())
            .send_bytes(body);

        match response {
            Ok(_) => Ok(()),
            Err(Error::Status(code, resp)) => Err(DdnsUpdateError::Status(
                code,
                resp.into_snippet(ERROR_SNIPPET_LEN).into(),
            )),
            Err(Error::Transport(tp)) => Err(DdnsUpdateError::TransportError(tp)),
        }
    }
}
