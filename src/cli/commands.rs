use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::RouteManifest;
use crate::errors::ErrorCode;
use crate::mappers::Mappers;
use crate::paths::{clean_base_path, strip_base_path};
use crate::request::{build_request, RequestParts};
use crate::schema::RestMethod;

/// Command-line interface for restgate route manifests.
#[derive(Debug, Parser)]
#[command(name = "restgate")]
#[command(about = "Check and dry-run restgate route manifests", long_about = None, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile a route manifest and print its routes in match order
    Check {
        /// Route manifest (YAML)
        #[arg(short, long)]
        routes: PathBuf,
    },
    /// Resolve one request against a manifest and print the built request
    Resolve {
        /// Route manifest (YAML)
        #[arg(short, long)]
        routes: PathBuf,

        /// HTTP verb
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request path, optionally with a query string
        #[arg(short, long)]
        path: String,

        /// JSON request body
        #[arg(long)]
        body: Option<String>,

        /// Request header as `name=value` (repeatable)
        #[arg(long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Prefix removed from the path before matching
        #[arg(long, env = "RESTGATE_BASE_PATH")]
        base_path: Option<String>,
    },
}

fn parse_header(text: &str) -> Result<(String, String), String> {
    let (name, value) = text
        .split_once('=')
        .or_else(|| text.split_once(':'))
        .ok_or_else(|| format!("expected name=value, got `{text}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in `{text}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Run a parsed command, writing its report to `out`.
pub fn run_cli<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    match cli.command {
        Commands::Check { routes } => check(&routes, out),
        Commands::Resolve {
            routes,
            method,
            path,
            body,
            headers,
            base_path,
        } => {
            let method: RestMethod = method.parse().map_err(|err| anyhow!("{err}"))?;
            let body = body
                .map(|text| serde_json::from_str(&text).context("--body is not valid JSON"))
                .transpose()?;
            let base_path = base_path.as_deref().map(clean_base_path).unwrap_or_default();
            let path = strip_base_path(&path, &base_path)
                .ok_or_else(|| anyhow!("{path} is outside the base path {base_path}"))?
                .into_owned();

            let mut parts = RequestParts::new(method, path);
            parts.body = body;
            for (name, value) in headers {
                parts = parts.header(&name, value);
            }
            resolve(&routes, parts, out)
        }
    }
}

fn load(routes: &Path) -> Result<crate::endpoints::Endpoints> {
    let manifest = RouteManifest::load(routes)?;
    Ok(manifest.to_endpoints()?)
}

fn check<W: Write>(routes: &Path, out: &mut W) -> Result<()> {
    let endpoints = load(routes)?;
    writeln!(out, "{} route(s) in match order:", endpoints.len())?;
    for (index, endpoint) in endpoints.iter().enumerate() {
        let methods: Vec<&str> = endpoint.methods().methods().map(RestMethod::as_str).collect();
        writeln!(
            out,
            "{:>3}. {:<24} {:<28} {}",
            index + 1,
            endpoint.route_name(),
            endpoint.path(),
            methods.join(",")
        )?;
    }
    let tokens = endpoints.auth_token_names();
    if !tokens.is_empty() {
        writeln!(out, "auth tokens: {}", tokens.join(", "))?;
    }
    Ok(())
}

fn resolve<W: Write>(routes: &Path, parts: RequestParts, out: &mut W) -> Result<()> {
    let endpoints = load(routes)?;
    let full_path = parts.full_path.clone();
    let request = build_request(parts, &endpoints, &Mappers::new()).map_err(|err| {
        if err.is(ErrorCode::PathNotFound) {
            anyhow!("no route matches {full_path}")
        } else {
            anyhow::Error::new(err)
        }
    })?;
    serde_json::to_writer_pretty(&mut *out, &request)?;
    writeln!(out)?;
    Ok(())
}
