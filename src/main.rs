//! # Webserver - Entry Point
//! src/main.rs
//!
//! Parsea la configuración, inicializa el logging y arranca el loop de
//! `accept`. Solo un fallo de arranque termina el proceso.

use webserver::config::Config;
use webserver::error::ServerError;
use webserver::server::Server;

fn main() {
    println!("=================================");
    println!("  Webserver (static, 1 worker/conn)");
    println!("=================================\n");

    let config = Config::new();

    let level = match config.log_level() {
        Ok(level) => level,
        Err(e) => fail(ServerError::Config(e)),
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level)
        .init();

    config.print_summary();

    let server = match Server::bind(&config) {
        Ok(server) => server,
        Err(e) => fail(e),
    };

    server.serve();
}

fn fail(err: ServerError) -> ! {
    eprintln!("💥 Error fatal: {}", err);
    std::process::exit(err.exit_code());
}
