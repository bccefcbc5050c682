//! # Tyls Engine Demo Entry Point
//!
//! Runs a short scripted session without a window and logs what happened. Pass a config
//! file path as the first argument to override the defaults.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- config.json
//! ```

fn main() {
    if let Err(err) = tyls_engine::run() {
        log::error!("{}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
