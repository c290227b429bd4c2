use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::path::Path;
use tracing_subscriber::EnvFilter;

mod bake;
mod catalog;
mod cli;
mod config;
mod decode;
mod mcp;
mod recipe;
mod transport;

use crate::catalog::OperationCatalog;
use crate::cli::{Command, RootArgs};
use crate::config::EngineConfig;
use crate::recipe::RecipeOperation;
use crate::transport::{into_payload, HttpTransport};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Serve => {
            let catalog = load_catalog(args.catalog.as_deref())?;
            let transport = engine_transport(args.base_url.as_deref());
            tracing::info!(
                base_url = %transport.config().base_url,
                "Starting the CyberChef MCP server"
            );
            let server = mcp::McpServer::new(transport, catalog);
            let stdin = std::io::stdin();
            server.serve(stdin.lock(), std::io::stdout())
        }
        Command::Bake(bake_args) => {
            let recipe = parse_recipe(&bake_args.recipe)?;
            let transport = engine_transport(args.base_url.as_deref());
            let exchange = bake::bake(&transport, &bake_args.input, &recipe);
            print_json(&into_payload(exchange));
            Ok(())
        }
        Command::BatchBake(batch_args) => {
            let recipe = parse_recipe(&batch_args.recipe)?;
            let transport = engine_transport(args.base_url.as_deref());
            let exchange = bake::batch_bake(&transport, &batch_args.inputs, &recipe);
            print_json(&into_payload(exchange));
            Ok(())
        }
        Command::Magic(magic_args) => {
            let transport = engine_transport(args.base_url.as_deref());
            let magic = bake::MagicArgs {
                depth: magic_args.depth,
                intensive_mode: magic_args.intensive_mode,
                extensive_language_support: magic_args.extensive_language_support,
                crib: magic_args.crib,
            };
            let exchange = bake::magic(&transport, &magic_args.input, &magic);
            print_json(&into_payload(exchange));
            Ok(())
        }
        Command::Categories => {
            let catalog = load_catalog(args.catalog.as_deref())?;
            let categories =
                serde_json::to_value(catalog.categories()).context("serialize categories")?;
            print_json(&categories);
            Ok(())
        }
        Command::Operations(ops_args) => {
            let catalog = load_catalog(args.catalog.as_deref())?;
            let operations = catalog.operations_by_category(&ops_args.category)?;
            print_json(&serde_json::to_value(operations).context("serialize operations")?);
            Ok(())
        }
    }
}

/// Logs go to stderr; stdout carries protocol messages and results.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info,cyberchef_mcp=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn engine_transport(base_url: Option<&str>) -> HttpTransport {
    HttpTransport::new(EngineConfig::resolve(base_url))
}

fn load_catalog(path: Option<&Path>) -> Result<OperationCatalog> {
    match path {
        Some(path) => OperationCatalog::load(path),
        None => OperationCatalog::embedded(),
    }
}

fn parse_recipe(raw: &str) -> Result<Vec<RecipeOperation>> {
    serde_json::from_str(raw).context("parse --recipe JSON (expected [{\"op\": ..., \"args\": [...]}])")
}

fn print_json(value: &Value) {
    println!("{value:#}");
}
