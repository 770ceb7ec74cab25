//! apicontract CLI - Check a live HTTP API against its Swagger/OpenAPI contract

mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use apicontract_core::{AdapterRegistry, Config, Override, SpecAdapter, loader};
use apicontract_runner::{ReqwestTransport, ResourceSummary, RunReport, Runner, report};

use render::ConsoleReporter;

const CONFIG_FILE: &str = ".apicontract.toml";

#[derive(Parser)]
#[command(name = "apicontract")]
#[command(about = "Check a live HTTP API against its Swagger/OpenAPI contract")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Test one resource against a live host
    Test {
        #[command(flatten)]
        source: SourceArgs,

        /// Host name (server description / scheme) or index (default: first)
        #[arg(long)]
        host: Option<String>,

        /// Operation to test (summary or operationId)
        #[arg(long)]
        resource: Option<String>,

        /// Request content type to send ("*" = first declared)
        #[arg(long)]
        request_content_type: Option<String>,

        /// Expected response status (0 = first declared)
        #[arg(long)]
        response_status: Option<u16>,

        /// Expected response content type ("*" = any)
        #[arg(long)]
        response_content_type: Option<String>,

        /// Override payload as JSON, e.g. '{"security": {"example": "real-key"}}'
        #[arg(long = "override", value_name = "JSON")]
        overrides: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List every operation in the contract
    Resources {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Initialize config file
    Init,

    /// Check config and contract document
    Doctor,

    /// Export JSON Schema for the JSON report format
    Schema,
}

/// Where the contract comes from.
#[derive(Args)]
struct SourceArgs {
    /// Config file (default: .apicontract.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Swagger 2.0 / OpenAPI 3.0 document (YAML or JSON)
    #[arg(long)]
    spec: Option<PathBuf>,
}

impl SourceArgs {
    fn load_config(&self) -> Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load_default()?,
        };
        if let Some(spec) = &self.spec {
            cfg.spec.clone_from(spec);
        }
        Ok(cfg)
    }
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,apicontract={level},apicontract_core={level},apicontract_runner={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// 0 pass, 1 contract violation, 2 aborted run.
const fn exit_code(passed: bool, aborted: bool) -> i32 {
    if passed {
        0
    } else if aborted {
        2
    } else {
        1
    }
}

fn load_spec(cfg: &Config) -> Result<SpecAdapter> {
    loader::load(&cfg.spec, &AdapterRegistry::with_defaults())
        .with_context(|| format!("Cannot load contract {}", cfg.spec.display()))
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Test {
            source,
            host,
            resource,
            request_content_type,
            response_status,
            response_content_type,
            overrides,
            timeout,
        } => {
            let mut cfg = source.load_config()?;
            if host.is_some() {
                cfg.host = host;
            }
            if resource.is_some() {
                cfg.resource = resource;
            }
            if let Some(ct) = request_content_type {
                cfg.request_content_type = ct;
            }
            if let Some(status) = response_status {
                cfg.response_status = status;
            }
            if let Some(ct) = response_content_type {
                cfg.response_content_type = ct;
            }
            if let Some(json) = overrides {
                cfg.overrides = serde_json::from_str::<Override>(&json)
                    .context("Invalid --override payload")?;
            }
            if timeout.is_some() {
                cfg.timeout_secs = timeout;
            }

            let spec = load_spec(&cfg)?;
            let transport = ReqwestTransport::new(cfg.timeout_secs.map(Duration::from_secs))?;
            let runner = Runner::from_config(spec, transport, &cfg);

            tracing::debug!(
                spec = %cfg.spec.display(),
                host = cfg.host.as_deref().unwrap_or("(first)"),
                "starting contract test"
            );

            match cli.output {
                OutputFormat::Terminal => {
                    let mut console = ConsoleReporter::new(std::io::stdout().lock());
                    let passed = runner.run(&mut console);
                    Ok(exit_code(passed, console.aborted()))
                }
                OutputFormat::Json => {
                    let report = runner.execute();
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    Ok(report_exit_code(&report))
                }
                OutputFormat::Silent => Ok(report_exit_code(&runner.execute())),
            }
        }

        Commands::Resources { source } => {
            let cfg = source.load_config()?;
            let spec = load_spec(&cfg)?;
            let resources: Vec<ResourceSummary> =
                spec.resources()?.iter().map(ResourceSummary::from).collect();

            match cli.output {
                OutputFormat::Terminal => {
                    for line in render::render_resources(&resources) {
                        println!("{line}");
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&resources)?);
                }
                OutputFormat::Silent => {}
            }
            Ok(0)
        }

        Commands::Init => {
            if Path::new(CONFIG_FILE).exists() {
                eprintln!("{CONFIG_FILE} already exists");
                return Ok(1);
            }

            std::fs::write(CONFIG_FILE, Config::example())?;
            println!("Created {CONFIG_FILE}");
            println!("\nEdit the file to configure:");
            println!("  - spec: path to your Swagger / OpenAPI document");
            println!("  - host: server to test (name or index)");
            println!("  - resource: operation to test");
            println!("  - [override.security]: real credentials");
            Ok(0)
        }

        Commands::Doctor => {
            println!("apicontract doctor");
            println!("==================\n");

            let found = Config::default_path();
            let cfg = match Config::load_default() {
                Ok(cfg) => {
                    match &found {
                        Some(path) => println!("[OK] Config file ({})", path.display()),
                        None => println!("[--] Config file (none, using defaults)"),
                    }
                    cfg
                }
                Err(e) => {
                    println!("[NG] Config file: {e}");
                    return Ok(1);
                }
            };

            let ok = match load_spec(&cfg) {
                Ok(spec) => {
                    println!("[OK] Contract ({}, {})", cfg.spec.display(), spec.version());
                    let hosts = spec.hosts();
                    println!(
                        "[{}] Hosts: {}",
                        if hosts.is_empty() { "NG" } else { "OK" },
                        hosts.iter().map(|h| h.url.as_str()).collect::<Vec<_>>().join(", ")
                    );
                    match spec.resources() {
                        Ok(resources) => {
                            println!("[OK] {} operations", resources.len());
                            !hosts.is_empty()
                        }
                        Err(e) => {
                            println!("[NG] Operations: {e}");
                            false
                        }
                    }
                }
                Err(e) => {
                    println!("[NG] Contract: {e:#}");
                    false
                }
            };

            if found.is_none() {
                println!("\nCreate config file:");
                println!("  apicontract init");
            }

            Ok(if ok { 0 } else { 1 })
        }

        Commands::Schema => {
            let schema = report::generate_schema()?;
            println!("{schema}");
            Ok(0)
        }
    }
}

fn report_exit_code(report: &RunReport) -> i32 {
    exit_code(report.passed, report.error().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(exit_code(true, false), 0);
        assert_eq!(exit_code(false, false), 1);
        assert_eq!(exit_code(false, true), 2);
    }

    #[test]
    fn cli_parses_test_flags() {
        let cli = Cli::try_parse_from([
            "apicontract",
            "test",
            "--spec",
            "api.yaml",
            "--resource",
            "ListWidgets",
            "--response-status",
            "200",
            "--override",
            r#"{"security": {"example": "k"}}"#,
            "--output",
            "json",
        ])
        .unwrap();
        assert!(cli.output == OutputFormat::Json);
        let Commands::Test {
            source,
            resource,
            response_status,
            overrides,
            ..
        } = cli.command
        else {
            panic!("expected the test command");
        };
        assert_eq!(source.spec, Some(PathBuf::from("api.yaml")));
        assert_eq!(resource.as_deref(), Some("ListWidgets"));
        assert_eq!(response_status, Some(200));
        assert!(overrides.is_some());
    }

    #[test]
    fn cli_debug_asserts() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
