use std::time::Duration;

use ureq;

use super::{Error, Response};

/// Owns the connection agent and the identity every request goes out with.
/// Built once from the validated config and passed to whoever needs it.
#[derive(Clone)]
pub struct Client {
    agent: ureq::Agent,
    user_agent: Box<str>,
}

pub struct Request {
    inner: ureq::Request,
}

impl Client {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            agent: builder.build(),
            user_agent: user_agent.into(),
        }
    }

    pub fn get(&self, url: &str) -> Request {
        let inner = self.agent.get(url).set("User-Agent", &self.user_agent);
        Request { inner }
    }

    pub fn post(&self, url: &str) -> Request {
        let inner = self.agent.post(url).set("User-Agent", &self.user_agent);
        Request { inner }
    }
}

impl Request {
    pub fn set(mut self, header: &str, value: &str) -> Self {
        self.inner = self.inner.set(header, value);
        self
    }

    pub fn send_bytes(self, data: &[u8]) -> Result<Response, Error> {
        convert(self.inner.send_bytes(data))
    }

    pub fn call(self) -> Result<Response, Error> {
        convert(self.inner.call())
    }
}

fn convert(result: Result<ureq::Response, ureq::Error>) -> Result<Response, Error> {
    result
        .map_err(|e| match e {
            ureq::Error::Status(code, resp) => Error::Status(
                code,
                Response {
                    reader: resp.into_reader(),
                },
            ),
            ureq::Error::Transport(tp) => Error::Transport(tp.to_string().into()),
        })
        .map(|resp| Response {
            reader: resp.into_reader(),
        })
}
