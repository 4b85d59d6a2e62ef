//! services/web/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the summarizer's form endpoints.
//! Usage: `openapi [OUTPUT]` (defaults to `openapi.json`).

use std::path::PathBuf;
use utoipa::OpenApi;
use web_lib::web::ApiDoc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));

    let document = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(&output, document)?;
    println!("Wrote OpenAPI document to {}", output.display());
    Ok(())
}
