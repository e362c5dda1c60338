use miette::{IntoDiagnostic, Result};
use serde::Serialize;

#[derive(Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
    max_depth: usize,
}

pub fn run(json: bool) -> Result<()> {
    let info = VersionInfo {
        name: "sparse",
        version: env!("CARGO_PKG_VERSION"),
        max_depth: sparse_parser::DEFAULT_MAX_DEPTH,
    };
    if json {
        println!("{}", serde_json::to_string(&info).into_diagnostic()?);
    } else {
        println!("{} {}", info.name, info.version);
    }
    Ok(())
}
