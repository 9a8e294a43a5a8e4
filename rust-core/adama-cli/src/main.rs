// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>
//!
//! `adama`: command-line front end for the Adama service platform.
//!
//! The platform URL and token come from `ADAMA_URL` / `ADAMA_TOKEN` unless
//! given with `--url` / `--token`. Log verbosity follows `RUST_LOG`.

mod render;

use std::path::PathBuf;
use std::time::Duration;

use adama_client::{
    Adama, ClientConfig, EndpointOutput, NewNamespace, ProvFormat, Provenance, RegisterOptions,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use render::{render, render_list, OutputFormat};

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

/// Browse, register and call services on an Adama platform.
#[derive(Parser, Debug)]
#[command(name = "adama", version = VERSION, about = "Adama platform client")]
struct Cli {
    /// Platform base URL (overrides ADAMA_URL).
    #[arg(long, global = true)]
    url: Option<String>,

    /// Bearer token (overrides ADAMA_TOKEN).
    #[arg(long, global = true)]
    token: Option<String>,

    /// Skip TLS certificate verification.
    #[arg(long, global = true)]
    insecure: bool,

    /// Output format: table or json.
    #[arg(long, global = true, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show platform status.
    Status,

    /// List namespaces.
    Namespaces,

    /// Create a namespace.
    AddNamespace {
        name: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// List the services of a namespace.
    Services { namespace: String },

    /// Package a local module and register it as a service.
    Register {
        namespace: String,
        /// Module file or directory inside a git checkout.
        module: PathBuf,
        /// Return once the upload is accepted instead of waiting.
        #[arg(long = "async")]
        asynchronous: bool,
        /// Seconds to wait for the service to come up.
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Call a service endpoint.
    Call {
        namespace: String,
        service: String,
        endpoint: String,
        /// Service version.
        #[arg(long)]
        version: Option<String>,
        /// Query parameters as key=value.
        params: Vec<String>,
        /// Also fetch provenance in this format (json, sources, prov-n, prov, png).
        #[arg(long)]
        prov: Option<ProvFormat>,
        /// Write the provenance to a file instead of printing it.
        #[arg(long, requires = "prov")]
        prov_out: Option<PathBuf>,
    },

    /// Delete a service version.
    DeleteService {
        namespace: String,
        service: String,
        #[arg(long)]
        version: Option<String>,
    },

    /// Create a starter service directory.
    Create {
        name: String,
        /// Service type (query, map_filter, passthrough, ...).
        service_type: String,
        /// Directory to create (defaults to ./NAME).
        #[arg(long)]
        target: Option<PathBuf>,
        /// Fail unless the target lies inside a git checkout.
        #[arg(long)]
        require_vcs: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "adama cli starting");
    run(&cli)
}

fn client_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.url {
        Some(url) => ClientConfig::new(url)?.with_env_credentials(),
        None => ClientConfig::from_env().context("no platform URL: pass --url or set ADAMA_URL")?,
    };
    if let Some(token) = &cli.token {
        config = config.with_token(token.clone());
    }
    if cli.insecure {
        config = config.with_verify_tls(false);
    }
    Ok(config)
}

fn connect(cli: &Cli) -> Result<Adama> {
    Ok(Adama::from_config(client_config(cli)?)?)
}

fn run(cli: &Cli) -> Result<()> {
    let output = cli.output;
    match &cli.command {
        Command::Status => {
            let status = connect(cli)?.status()?;
            println!("{}", render(status.get("result").unwrap_or(&status), output));
        }
        Command::Namespaces => {
            let names: Vec<String> = connect(cli)?
                .namespaces()?
                .iter()
                .map(|ns| ns.name().to_string())
                .collect();
            println!("{}", render_list("namespace", &names, output));
        }
        Command::AddNamespace {
            name,
            url,
            description,
        } => {
            let ns = connect(cli)?.add_namespace(&NewNamespace {
                name: name.clone(),
                url: url.clone(),
                description: description.clone(),
            })?;
            println!("Created namespace {}", ns.name());
        }
        Command::Services { namespace } => {
            let services: Vec<String> = connect(cli)?
                .namespace(namespace)
                .services()?
                .iter()
                .map(|s| s.full_name())
                .collect();
            println!("{}", render_list("service", &services, output));
        }
        Command::Register {
            namespace,
            module,
            asynchronous,
            timeout,
        } => {
            let options = RegisterOptions {
                asynchronous: *asynchronous,
                timeout: timeout.map(Duration::from_secs),
            };
            let service = connect(cli)?
                .namespace(namespace)
                .add_service(module, &options)
                .with_context(|| format!("registering {}", module.display()))?;
            if *asynchronous {
                println!("Submitted {}", service.full_name());
            } else {
                println!("Registered {}", service.full_name());
            }
        }
        Command::Call {
            namespace,
            service,
            endpoint,
            version,
            params,
            prov,
            prov_out,
        } => {
            let mut handle = connect(cli)?.namespace(namespace).service(service);
            if let Some(version) = version {
                handle = handle.with_version(version);
            }
            let query = parse_params(params)?;

            match handle.endpoint(endpoint).call(&query)? {
                EndpointOutput::Results(rows) => {
                    println!("{}", render(&Value::from(rows.items().to_vec()), output));
                    if let Some(format) = prov {
                        match prov_out {
                            Some(path) => {
                                rows.save_prov(*format, path)?;
                                println!("Provenance written to {}", path.display());
                            }
                            None => print_provenance(rows.prov(*format)?, output)?,
                        }
                    }
                }
                EndpointOutput::Raw(response) => {
                    if prov.is_some() {
                        bail!("endpoint returned a raw response; no provenance is attached");
                    }
                    println!("{}", response.text());
                }
            }
        }
        Command::DeleteService {
            namespace,
            service,
            version,
        } => {
            let mut handle = connect(cli)?.namespace(namespace).service(service);
            if let Some(version) = version {
                handle = handle.with_version(version);
            }
            let full_name = handle.full_name();
            handle.delete()?;
            println!("Deleted {full_name}");
        }
        Command::Create {
            name,
            service_type,
            target,
            require_vcs,
        } => {
            let dir = adama_archive::create_stub(name, service_type, target.as_deref(), *require_vcs)
                .with_context(|| format!("creating service '{name}'"))?;
            println!("Created {}", dir.display());
        }
    }
    Ok(())
}

/// Split `key=value` arguments.
fn parse_params(params: &[String]) -> Result<Vec<(&str, &str)>> {
    params
        .iter()
        .map(|p| {
            p.split_once('=')
                .with_context(|| format!("parameter '{p}' is not key=value"))
        })
        .collect()
}

fn print_provenance(provenance: Provenance, output: OutputFormat) -> Result<()> {
    match provenance {
        Provenance::Json(value) => println!("{}", render(&value, OutputFormat::Json)),
        Provenance::Text(text) => println!("{text}"),
        Provenance::Document(doc) => {
            let rows: Vec<Value> = doc
                .records()
                .iter()
                .map(|r| serde_json::json!({"kind": r.kind.to_string(), "id": r.id}))
                .collect();
            println!("{}", render(&Value::from(rows), output));
        }
        Provenance::Image(_) => bail!("image provenance needs --prov-out PATH"),
    }
    Ok(())
}
