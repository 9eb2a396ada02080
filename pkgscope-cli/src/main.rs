//! pkgscope CLI - select packages from a classified inventory

use clap::{Parser, Subcommand};
use pkgscope_core::{
    keywords, parse_filter_with, read_inventory, select, select_parallel, workspace, Config,
    Filter, Keyword, StatusGroup,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pkgscope")]
#[command(about = "Select packages from a classified dependency inventory", long_about = None)]
struct Cli {
    /// Inventory root (default: current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Config file (default: <root>/.pkgscope.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List inventory items selected by a filter
    List {
        /// Inventory JSON file (default: <root>/inventory.json)
        #[arg(short, long)]
        inventory: Option<PathBuf>,

        /// Status expressions (+vendor,^unused) and package references (path, path/...)
        args: Vec<String>,
    },

    /// Show how a filter is parsed
    Explain {
        /// Status expressions and package references
        args: Vec<String>,
    },

    /// Show the status keywords
    Keywords,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PKGSCOPE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List { inventory, args } => {
            cmd_list(cli.root, cli.config, inventory, &args, cli.json)
        }
        Commands::Explain { args } => cmd_explain(cli.root, cli.config, &args, cli.json),
        Commands::Keywords => cmd_keywords(cli.json),
    };

    if let Err(e) = result {
        if cli.json {
            let error_json = match &e {
                pkgscope_core::FilterError::UnknownStatus(term) => {
                    serde_json::json!({ "code": "unknown_status", "message": e.to_string(), "term": term })
                }
                pkgscope_core::FilterError::InvalidPackageReference { reference, .. } => {
                    serde_json::json!({ "code": "invalid_reference", "message": e.to_string(), "reference": reference })
                }
                _ => serde_json::json!({ "code": "error", "message": e.to_string() }),
            };
            eprintln!("{}", error_json);
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn resolve_root(root: Option<PathBuf>) -> pkgscope_core::Result<PathBuf> {
    match root {
        Some(root) => Ok(std::fs::canonicalize(root)?),
        None => Ok(std::env::current_dir()?),
    }
}

fn load_config(root: &Path, config: Option<PathBuf>) -> pkgscope_core::Result<Config> {
    match config {
        Some(path) => Config::load(&path),
        None => Config::discover(root),
    }
}

fn build_filter(root: &Path, config: &Config, args: &[String]) -> pkgscope_core::Result<Filter> {
    let base = workspace::current_base_path(root, args)?;
    tracing::debug!(root = %root.display(), base = %base, "resolved base path");
    parse_filter_with(&base, args, &config.filter_options())
}

fn cmd_list(
    root: Option<PathBuf>,
    config: Option<PathBuf>,
    inventory: Option<PathBuf>,
    args: &[String],
    json: bool,
) -> pkgscope_core::Result<()> {
    use colored::Colorize;

    let root = resolve_root(root)?;
    let config = load_config(&root, config)?;
    let mut filter = build_filter(&root, &config, args)?;

    let inventory = inventory.unwrap_or_else(|| root.join("inventory.json"));
    let items = read_inventory(&inventory)?;
    let selection = if config.matching.parallel {
        select_parallel(&mut filter, &items)
    } else {
        select(&mut filter, &items)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&selection)?);
        return Ok(());
    }

    for selected in &selection.items {
        let item = &selected.item;
        let status = format!("{:<16}", item.status.to_string());
        if item.canonical.is_empty() || item.canonical == item.local {
            println!("{} {}", status.cyan(), item.local);
        } else {
            println!(
                "{} {} {}",
                status.cyan(),
                item.local,
                format!("[{}]", item.canonical).dimmed()
            );
        }
    }
    for pkg in &selection.unmatched {
        println!("{}: {}", "not found".yellow(), pkg);
    }
    Ok(())
}

fn cmd_explain(
    root: Option<PathBuf>,
    config: Option<PathBuf>,
    args: &[String],
    json: bool,
) -> pkgscope_core::Result<()> {
    use colored::Colorize;

    let root = resolve_root(root)?;
    let config = load_config(&root, config)?;
    let filter = build_filter(&root, &config, args)?;

    if json {
        let out = serde_json::json!({
            "status": filter.status,
            "imports": filter.imports,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}: {}", "Status".blue(), filter.status);
        for imp in &filter.imports {
            println!("{}: {}", "Import".blue(), imp);
        }
    }
    Ok(())
}

fn cmd_keywords(json: bool) -> pkgscope_core::Result<()> {
    let rows: Vec<(&str, String)> = keywords()
        .iter()
        .map(|(name, keyword)| {
            let meaning = match keyword {
                Keyword::Single(status) => status.to_string(),
                Keyword::List(list) => StatusGroup::from_list(list, false).to_string(),
            };
            (*name, meaning)
        })
        .collect();

    if json {
        let out: Vec<serde_json::Value> = rows
            .into_iter()
            .map(|(name, meaning)| serde_json::json!({ "name": name, "meaning": meaning }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (name, meaning) in rows {
            println!("{:<10} {}", name, meaning);
        }
    }
    Ok(())
}
