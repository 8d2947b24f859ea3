use std::{fs, path::PathBuf};

use clap::Parser;
use ecommerce_admin_api::openapi::ApiDocV1;
use utoipa::OpenApi;

#[derive(Debug, Parser)]
#[command(name = "openapi-export", about = "Write the OpenAPI document to disk")]
struct Args {
    /// Output file
    #[arg(default_value = "openapi/ecommerce-admin-api.v1.json")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let json = ApiDocV1::openapi().to_pretty_json()?;

    if let Some(dir) = args.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(&args.output, json)?;

    println!("OpenAPI document written to {}", args.output.display());
    Ok(())
}
