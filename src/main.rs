//! # Itinerary Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada: parsea la configuración, inicializa el logging y
//! arranca el servidor.

use itinerary_server::config::Config;
use itinerary_server::error::Error;
use itinerary_server::server::Server;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    let config = Config::new();
    init_tracing(config.verbose);

    if let Err(e) = run(&config) {
        error!(error = %e, "fatal error");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), Error> {
    config.validate()?;
    config.log_summary();

    let server = Server::from_config(config)?;
    server.run()
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
