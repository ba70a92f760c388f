mod agent;
mod config;
mod http;
mod ip;
mod logging;
mod payload;
mod services;
mod sign;
mod util;

use std::process::ExitCode;

use config::Config;
use http::Client;
use ip::HttpResolver;
use services::worker;

fn main() -> ExitCode {
    logging::init();

    log::info!("dynagent v{} started", env!("CARGO_PKG_VERSION"));

    // One shot: look up the address, tell the worker, and exit. Scheduling
    // is left to cron or a systemd timer.
    let outcome = agent::execute(Config::load(), |config| {
        let client = Client::new(&config.user_agent, config.timeout);
        (
            HttpResolver::from_config(config, client.clone()),
            worker::Service::from_config(config, client),
        )
    });

    outcome.into()
}
