//! ProductPulse: generate roadmap updates through an AI agent, review and edit
//! their action items, keep a local history, and send them to stakeholders.

pub mod agent;
pub mod cli;
pub mod config;
pub mod draft;
pub mod error;
pub mod history;
pub mod normalizer;
pub mod notification;
pub mod sample;
pub mod services;
pub mod settings;
pub mod state;
pub mod status;
pub mod store;
pub mod tone;
pub mod types;
pub mod util;

use clap::Parser;

use cli::Cli;

pub fn run() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    match runtime.block_on(cli::execute(cli)) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }
}
