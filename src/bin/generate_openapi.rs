//! Writes the AirSense OpenAPI document as pretty JSON.
//!
//!   cargo run --bin generate_openapi                      # to stdout
//!   cargo run --bin generate_openapi -- --output api.json # to a file

use std::{env, fs, path::PathBuf, process};

use airsense_service::api::handlers::ApiDoc;
use utoipa::OpenApi;

fn output_path() -> Option<PathBuf> {
    let args: Vec<String> = env::args().skip(1).collect();
    args.windows(2)
        .find(|w| w[0] == "--output")
        .map(|w| PathBuf::from(&w[1]))
}

fn main() {
    let json = match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Failed to serialise OpenAPI document: {e}");
            process::exit(1);
        }
    };

    match output_path() {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                eprintln!("Error writing to {}: {e}", path.display());
                process::exit(1);
            }
            eprintln!("OpenAPI document written to {}", path.display());
        }
        None => println!("{json}"),
    }
}
