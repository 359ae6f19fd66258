//! Console navigator CLI.
//!
//! Small wrapper around the resolution core for inspecting snapshots and
//! exercising the resolvers from a shell:
//!
//!   $ consolenav parse snapshot.txt
//!   $ consolenav find snapshot.txt --text-match "Add Load Balancer" --ref 12
//!   $ consolenav resolve http-lb --namespace prod --sitemap url-sitemap.json

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use console_navigator::config::{NavigatorConfig, NavigatorConfigOverrides};
use console_navigator::routes::UrlRouter;
use console_navigator::selector::{ChainConfig, ChainExecutor};
use console_navigator::snapshot;
use console_navigator::types::SelectorDefinition;
use log::info;

#[derive(Parser)]
#[command(
    name = "consolenav",
    author,
    version,
    about = "Deterministic console resolution utilities"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a snapshot file and print its element outline.
    Parse(ParseArgs),
    /// Resolve element metadata against a snapshot via the selector chain.
    Find(FindArgs),
    /// Resolve a navigation target to a concrete URL.
    Resolve(ResolveArgs),
    /// List the workspaces and resource shortcuts a sitemap declares.
    Sitemap(SitemapArgs),
}

#[derive(Args)]
struct SitemapArgs {
    /// Sitemap document path; falls back to CONSOLE_NAV_SITEMAP.
    #[arg(long)]
    sitemap: Option<PathBuf>,
}

#[derive(Args)]
struct ParseArgs {
    /// Snapshot text file produced by the automation host.
    snapshot: PathBuf,

    /// Emit the parsed elements as JSON instead of an outline.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct FindArgs {
    /// Snapshot text file to resolve against.
    snapshot: PathBuf,

    /// data-testid candidate value.
    #[arg(long)]
    testid: Option<String>,

    /// aria-label candidate value.
    #[arg(long)]
    aria_label: Option<String>,

    /// href path fragment candidate value.
    #[arg(long)]
    href: Option<String>,

    /// Visible text candidate value.
    #[arg(long)]
    text_match: Option<String>,

    /// Placeholder candidate value.
    #[arg(long)]
    placeholder: Option<String>,

    /// CSS selector candidate value (best-effort text match).
    #[arg(long)]
    css: Option<String>,

    /// Session-scoped element reference from a prior snapshot.
    #[arg(long = "ref")]
    session_ref: Option<String>,

    /// Skip selectors below this confidence.
    #[arg(long)]
    min_confidence: Option<f64>,
}

#[derive(Args)]
struct ResolveArgs {
    /// Navigation target: static path, workspace alias, shortcut, or
    /// template.
    target: String,

    /// Template variables as key=value pairs.
    #[arg(long = "var")]
    vars: Vec<String>,

    /// Convenience namespace variable.
    #[arg(long)]
    namespace: Option<String>,

    /// Convenience resource-name variable.
    #[arg(long)]
    resource_name: Option<String>,

    /// Sitemap document path; falls back to CONSOLE_NAV_SITEMAP.
    #[arg(long)]
    sitemap: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_env_logger();

    let cli = Cli::parse();
    match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Find(args) => run_find(args),
        Command::Resolve(args) => run_resolve(args),
        Command::Sitemap(args) => run_sitemap(args),
    }
}

fn run_sitemap(args: SitemapArgs) -> Result<()> {
    let config = load_config()?;
    let sitemap_path = args
        .sitemap
        .or_else(|| config.sitemap_path.clone())
        .ok_or_else(|| anyhow!("no sitemap given; pass --sitemap or set CONSOLE_NAV_SITEMAP"))?;

    let router = UrlRouter::from_path(&sitemap_path, config.default_namespace.clone())
        .with_context(|| format!("failed to load sitemap {}", sitemap_path.display()))?;

    println!("workspaces:");
    for alias in router.list_workspaces() {
        println!("  {alias}");
    }
    println!("shortcuts:");
    for alias in router.list_shortcuts() {
        println!("  {alias}");
    }
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.snapshot)
        .with_context(|| format!("failed to read {}", args.snapshot.display()))?;
    let parsed = snapshot::parse(&raw);

    info!(
        "parsed {} elements from {}",
        parsed.len(),
        args.snapshot.display()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(parsed.elements())?);
    } else {
        if let Some(url) = parsed.page_url() {
            println!("URL: {url}");
        }
        if let Some(title) = parsed.page_title() {
            println!("Title: {title}");
        }
        print!("{}", parsed.format_outline());
    }
    Ok(())
}

fn run_find(args: FindArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.snapshot)
        .with_context(|| format!("failed to read {}", args.snapshot.display()))?;
    let parsed = snapshot::parse(&raw);

    let metadata = SelectorDefinition {
        data_testid: args.testid,
        aria_label: args.aria_label,
        href_path: args.href,
        text_match: args.text_match,
        placeholder: args.placeholder,
        css: args.css,
        session_ref: args.session_ref,
    };

    let mut overrides = NavigatorConfigOverrides::default();
    if let Some(min_confidence) = args.min_confidence {
        overrides = overrides.min_confidence(min_confidence);
    }
    let config = load_config()?.with_overrides(overrides);

    let executor = ChainExecutor::new(ChainConfig::from(&config));
    let result = executor.resolve(&parsed, &metadata);

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.found {
        return Err(anyhow!("no element resolved"));
    }
    Ok(())
}

fn run_resolve(args: ResolveArgs) -> Result<()> {
    let config = load_config()?;
    let sitemap_path = args
        .sitemap
        .or_else(|| config.sitemap_path.clone())
        .ok_or_else(|| anyhow!("no sitemap given; pass --sitemap or set CONSOLE_NAV_SITEMAP"))?;

    let router = UrlRouter::from_path(&sitemap_path, config.default_namespace.clone())
        .with_context(|| format!("failed to load sitemap {}", sitemap_path.display()))?;

    let mut variables = HashMap::new();
    for pair in &args.vars {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid --var '{pair}'; expected key=value"))?;
        variables.insert(key.to_string(), value.to_string());
    }

    let result = router.resolve_with(
        &args.target,
        &variables,
        args.namespace.as_deref(),
        args.resource_name.as_deref(),
    );

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.found {
        return Err(anyhow!("no resolution method matched '{}'", args.target));
    }
    Ok(())
}

fn load_config() -> Result<NavigatorConfig> {
    NavigatorConfig::from_env().context("failed to load navigator configuration")
}

fn init_env_logger() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    let _ = env_logger::Builder::from_env(env_logger::Env::default())
        .format_timestamp_secs()
        .try_init();
}
