use std::process::ExitCode;

use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::ip::{DynamicIpError, ResolveIp};
use crate::payload::UpdatePayload;
use crate::services::{DdnsService, DdnsUpdateError};

/// How a run ended, as seen by whoever scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The worker accepted the update.
    Updated = 0,
    /// Required settings were missing or invalid; nothing was sent.
    ConfigError = 1,
    /// The IP lookup or the submission failed.
    RuntimeError = 2,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        ExitCode::from(outcome as u8)
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("unable to determine the public IP address: {0}")]
    Ip(#[from] DynamicIpError),

    #[error("unable to serialize the update: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("failed to update DNS record: {0}")]
    Update(#[from] DdnsUpdateError),
}

/// Resolve, sign, submit. Returns the address the worker was told about.
pub fn update_dns_record<R, S>(
    config: &Config,
    resolver: &mut R,
    service: &mut S,
) -> Result<Box<str>, AgentError>
where
    R: ResolveIp + ?Sized,
    S: DdnsService + ?Sized,
{
    let addr = resolver.resolve()?;
    log::debug!("Public IP address is {}", addr);

    let payload = UpdatePayload::new(addr);
    let update = payload.sign(config.shared_key.as_bytes())?;
    log::debug!("Submitting {}", String::from_utf8_lossy(update.body()));

    service.update_record(&update)?;

    Ok(payload.addr)
}

/// One complete run. `build` is only invoked once the configuration is
/// known to be valid, so a config error never reaches the network.
pub fn execute<R, S, F>(config: Result<Config, ConfigError>, build: F) -> Outcome
where
    R: ResolveIp,
    S: DdnsService,
    F: FnOnce(&Config) -> (R, S),
{
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!("Cannot find configs. Aborting DNS update: {}", e);
            return Outcome::ConfigError;
        }
    };

    log::debug!("Loaded {:?}", config);

    let (mut resolver, mut service) = build(&config);

    match update_dns_record(&config, &mut resolver, &mut service) {
        Ok(addr) => {
            log::info!("DNS record updated successfully with {}", addr);
            Outcome::Updated
        }

        Err(e) => {
            log::error!("{}", e);
            Outcome::RuntimeError
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::Duration;

    use crate::http::testing::{refused_url, serve_once};
    use crate::http::Client;
    use crate::ip::{HttpResolver, RandomSelector};
    use crate::logging::testing::capture;
    use crate::payload::SignedUpdate;
    use crate::services::worker;
    use crate::sign::verify_signature;

    use super::*;

    struct StaticIp {
        answer: Result<Box<str>, DynamicIpError>,
        calls: Rc<Cell<usize>>,
    }

    impl ResolveIp for StaticIp {
        fn resolve(&mut self) -> Result<Box<str>, DynamicIpError> {
            self.calls.set(self.calls.get() + 1);
            self.answer.clone()
        }
    }

    struct Recorder {
        answer: Result<(), DdnsUpdateError>,
        seen: Rc<RefCell<Vec<SignedUpdate>>>,
    }

    impl DdnsService for Recorder {
        fn update_record(&mut self, update: &SignedUpdate) -> Result<(), DdnsUpdateError> {
            self.seen.borrow_mut().push(update.clone());
            self.answer.clone()
        }
    }

    fn config() -> Config {
        Config {
            shared_key: "secret".into(),
            worker_url: "https://ddns.example.dev".into(),
            user_agent: "dynagent-test".into(),
            timeout: Some(Duration::from_secs(5)),
            ip_sources: vec!["https://api.ipify.org/".into()],
        }
    }

    fn doubles(
        ip: Result<Box<str>, DynamicIpError>,
        update: Result<(), DdnsUpdateError>,
    ) -> (StaticIp, Recorder, Rc<Cell<usize>>, Rc<RefCell<Vec<SignedUpdate>>>) {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let resolver = StaticIp {
            answer: ip,
            calls: calls.clone(),
        };
        let service = Recorder {
            answer: update,
            seen: seen.clone(),
        };
        (resolver, service, calls, seen)
    }

    #[test]
    fn config_error_skips_network() {
        let built = Cell::new(false);

        let (outcome, lines) = capture(|| {
            execute(Err(ConfigError::MissingSharedKey), |_| {
                built.set(true);
                let (resolver, service, _, _) = doubles(Ok("1.2.3.4".into()), Ok(()));
                (resolver, service)
            })
        });

        assert_eq!(outcome, Outcome::ConfigError);
        assert!(!built.get());

        let errors = lines
            .iter()
            .filter(|(level, _)| *level == log::Level::Error)
            .collect::<Vec<_>>();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].1.contains("Aborting DNS update"), "{}", errors[0].1);
        assert!(errors[0].1.contains("SHARED_KEY"), "{}", errors[0].1);
    }

    #[test]
    fn successful_run() {
        let (resolver, service, calls, seen) = doubles(Ok("203.0.113.9".into()), Ok(()));

        let outcome = execute(Ok(config()), |_| (resolver, service));

        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(calls.get(), 1);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(verify_signature(seen[0].body(), b"secret", seen[0].signature()));

        let payload: UpdatePayload = serde_json::from_slice(seen[0].body()).unwrap();
        assert_eq!(&*payload.addr, "203.0.113.9");
    }

    #[test]
    fn ip_failure_sends_nothing() {
        let failure = DynamicIpError::HttpFailure {
            url: "https://api.ipify.org/".into(),
            reason: "Connection refused".into(),
        };
        let (mut resolver, mut service, _, seen) = doubles(Err(failure), Ok(()));

        let result = update_dns_record(&config(), &mut resolver, &mut service);

        assert!(matches!(result, Err(AgentError::Ip(_))));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn rejected_update_is_a_runtime_error() {
        let rejected = Err(DdnsUpdateError::Status(500, "boom".into()));
        let (resolver, service, _, seen) = doubles(Ok("203.0.113.9".into()), rejected);

        let (outcome, lines) = capture(|| execute(Ok(config()), |_| (resolver, service)));

        assert_eq!(outcome, Outcome::RuntimeError);
        assert_eq!(seen.borrow().len(), 1);
        assert!(lines
            .iter()
            .any(|(level, line)| *level == log::Level::Error && line.contains("HTTP 500")));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Outcome::Updated as u8, 0);
        assert_eq!(Outcome::ConfigError as u8, 1);
        assert_eq!(Outcome::RuntimeError as u8, 2);
    }

    #[test]
    fn end_to_end_over_http() {
        let (echo, echo_server) = serve_once("200 OK", "192.0.2.44\n");
        let (worker_url, worker_server) = serve_once("200 OK", "N\u{e3}o h\u{e1} gente como a gente");

        let mut config = config();
        config.ip_sources = vec![echo.into()];
        config.worker_url = worker_url.into();

        let outcome = execute(Ok(config), |config| {
            let client = Client::new(&config.user_agent, config.timeout);
            (
                HttpResolver::from_config(config, client.clone()),
                worker::Service::from_config(config, client),
            )
        });

        assert_eq!(outcome, Outcome::Updated);
        echo_server.join().unwrap();

        let request = worker_server.join().unwrap();
        let payload: UpdatePayload = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(&*payload.addr, "192.0.2.44");
        assert!(verify_signature(
            &request.body,
            b"secret",
            request.header("Authorization").unwrap()
        ));
    }

    #[test]
    fn unreachable_echo_service_fails_the_run() {
        let mut config = config();
        config.ip_sources = vec![refused_url().into()];

        let client = Client::new(&config.user_agent, config.timeout);
        let mut resolver = HttpResolver::with_selector(
            client,
            config.ip_sources.clone(),
            RandomSelector,
        );
        let (_, mut service, _, seen) = doubles(Ok("unused".into()), Ok(()));

        let result = update_dns_record(&config, &mut resolver, &mut service);

        assert!(matches!(
            result,
            Err(AgentError::Ip(DynamicIpError::HttpFailure { .. }))
        ));
        assert!(seen.borrow().is_empty());
    }
}
