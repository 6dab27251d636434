// SkadiX API - main.rs
// Thin entry point; everything lives in the library crate.

use clap::Parser;
use skadix_api::cli::{dispatch, Cli};
use std::process::exit;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        eprintln!("❌ {e:#}");
        exit(1);
    }
}
