//! # CLI Module
//!
//! Offline tooling over route manifests (see [`crate::config::RouteManifest`]).
//! No controllers run; the commands exercise the endpoint registry and the
//! request builder only.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Compile every route and print the table in match-precedence order:
//!
//! ```bash
//! restgate check --routes routes.yaml
//! ```
//!
//! ### `resolve`
//!
//! Build the request a path would produce and print it as JSON, including
//! each parameter's mapped value and validity:
//!
//! ```bash
//! restgate resolve --routes routes.yaml --method PUT --path '/users/12?dryRun=1' \
//!     --body '{"name":"bob"}' --header authToken=abc
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use clap::Parser;
//! use restgate::cli::{run_cli, Cli};
//!
//! run_cli(Cli::parse(), &mut std::io::stdout())?;
//! ```

mod commands;


pub use commands::{run_cli, Cli, Commands};
