//! services/api/src/bin/openapi.rs
//!
//! Prints the OpenAPI specification for the API as JSON, for generating
//! clients or publishing docs without running the server.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() {
    match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("failed to serialize OpenAPI spec: {e}");
            std::process::exit(1);
        }
    }
}
