use crate::http::{Client, Error};

use super::DynamicIpError;

/// How much of an error page is kept around for the log line.
const ERROR_SNIPPET_LEN: u64 = 256;

pub(super) fn get_address(client: &Client, url: &str) -> Result<Box<str>, DynamicIpError> {
    let response = match client.get(url).call() {
        Ok(r) => r,
        Err(Error::Status(code, response)) => Err(DynamicIpError::HttpStatus {
            url: url.into(),
            code,
            body: response.into_snippet(ERROR_SNIPPET_LEN).into(),
        })?,
        Err(Error::Transport(t)) => Err(DynamicIpError::HttpFailure {
            url: url.into(),
            reason: t,
        })?,
    };

    let text = response
        .into_string()
        .map_err(|e| DynamicIpError::InvalidBody {
            url: url.into(),
            reason: e.to_string().into(),
        })?;

    // The echo services append a newline; nothing else is done to the body.
    let addr = text.trim();
    if addr.is_empty() {
        return Err(DynamicIpError::EmptyBody { url: url.into() });
    }

    Ok(addr.into())
}
