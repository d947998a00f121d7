//! services/api/src/bin/openapi.rs
//!
//! Dumps the LucidCare OpenAPI document. Usage: `openapi [PATH]`, where PATH
//! defaults to `openapi.json` and `-` prints to stdout.

use api_lib::web::ApiDoc;
use utoipa::OpenApi;

fn lucidcare_doc() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = "LucidCare API".to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let target = std::env::args().nth(1).unwrap_or_else(|| "openapi.json".to_string());
    let doc_json = lucidcare_doc().to_pretty_json()?;

    if target == "-" {
        println!("{}", doc_json);
    } else {
        std::fs::write(&target, doc_json)?;
        eprintln!("OpenAPI document written to {}", target);
    }
    Ok(())
}
