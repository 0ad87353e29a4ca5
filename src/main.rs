#![cfg(not(tarpaulin_include))]

use formsheet::app;
use formsheet::config::FormConfig;
use formsheet::handler::SubmissionHandler;
use log::{error, info};
use std::env;

/// Main entry point for the form intake server
///
/// Reads configuration from `FORMSHEET_*` environment variables and serves
/// the submission endpoint. With `--self-test` it appends one test row to
/// the configured table and exits instead.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = FormConfig::from_env();
    let args: Vec<String> = env::args().collect();

    if args.iter().skip(1).any(|a| a == "--self-test") {
        let store = app::build_store(&config)?;
        let handler = SubmissionHandler::new(config, store);
        return match handler.self_test() {
            Ok(result) => {
                info!("setup test passed, row {}", result.row_number);
                Ok(())
            }
            Err(e) => {
                error!("setup test failed: {}", e);
                Err(e.into())
            }
        };
    }

    info!(
        "starting form intake for table {} on {}",
        config.table_name, config.addr
    );
    app::run(config).await
}
