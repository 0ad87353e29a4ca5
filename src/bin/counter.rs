#![cfg(not(tarpaulin_include))]

use formsheet::elapsed::{LAUNCH, TextSink, run_counter};
use std::io::{self, Write};

/// Rewrites a single terminal line in place
struct TerminalLine;

impl TextSink for TerminalLine {
    fn set_text(&mut self, text: &str) {
        let mut stdout = io::stdout();
        let _ = write!(stdout, "\r{}", text);
        let _ = stdout.flush();
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    log::debug!("counting from {}", *LAUNCH);

    run_counter(*LAUNCH, TerminalLine).await;
}
