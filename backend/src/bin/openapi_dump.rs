//! Print the OpenAPI document.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write};

use clap::{Parser, ValueEnum};
use user_api::ApiDoc;
use utoipa::OpenApi;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Json,
    Yaml,
}

/// `openapi-dump` command arguments.
#[derive(Debug, Parser)]
#[command(name = "openapi-dump", about = "Print the user API OpenAPI document", version)]
struct CliArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,
}

fn render(args: &CliArgs) -> io::Result<String> {
    let doc = ApiDoc::openapi();
    match (args.format, args.pretty) {
        (Format::Json, true) => doc.to_pretty_json().map_err(io::Error::other),
        (Format::Json, false) => doc.to_json().map_err(io::Error::other),
        (Format::Yaml, _) => doc.to_yaml().map_err(io::Error::other),
    }
}

fn main() -> io::Result<()> {
    let args = CliArgs::parse();
    let rendered = render(&args)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")
}
