use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use metascout::{
    load_module, metadata::Namespace, search, CancellationToken, Hit, SearchConfig, SearchMode,
    SessionSummary,
};
use serde_json::json;
use std::{num::NonZeroUsize, path::PathBuf, sync::Arc};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct CliSearchConfig {
    /// Search terms; inns:<ns> and inasm:<asm> restrict the scope
    terms: Vec<String>,

    /// What to search for (types-and-members, type, member, method, field,
    /// property, event, namespace, assembly, resource)
    #[arg(short = 'M', long)]
    mode: Option<SearchMode>,

    /// Only report results inside namespaces matching this term (repeatable)
    #[arg(long = "in-namespace")]
    in_namespace: Vec<String>,

    /// Only report results from modules matching this term (repeatable)
    #[arg(long = "in-assembly")]
    in_assembly: Vec<String>,

    /// Module description file to search (.json, .yaml, .yml; repeatable)
    #[arg(short = 'm', long = "module")]
    modules: Vec<PathBuf>,

    /// Number of threads to use
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Stop after this many results (0 for unlimited)
    #[arg(long)]
    max_results: Option<usize>,

    /// Configuration file layered over the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show only statistics, not results
    #[arg(short, long)]
    stats: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search module metadata
    Search(Box<CliSearchConfig>),

    /// Print the namespace tree of a module
    Inspect {
        /// Module description file
        #[arg(required = true)]
        module: PathBuf,
    },
}

fn main() -> Result<()> {
    run()
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => {
            let args = *args;
            let file_config = SearchConfig::load_from(args.config.as_deref())
                .context("Failed to load configuration")?;

            let cli_config = SearchConfig {
                terms: args.terms,
                mode: args.mode.unwrap_or_default(),
                namespace_scope: args.in_namespace,
                assembly_scope: args.in_assembly,
                module_paths: args.modules,
                thread_count: args.threads.unwrap_or(file_config.thread_count),
                ..SearchConfig::default()
            };
            let mut config = file_config.merge_with_cli(cli_config);
            // An explicit flag wins even when it names the default value.
            if let Some(mode) = args.mode {
                config.mode = mode;
            }
            if let Some(max) = args.max_results {
                config.max_results = max;
            }

            init_logging(&config.log_level);
            debug!("Effective configuration: {:?}", config);

            if config.module_paths.is_empty() {
                anyhow::bail!("No modules to search; pass --module or set module_paths");
            }
            let modules = config.load_modules()?;
            let summary = search(&config, &modules, &CancellationToken::new())?;

            if args.json {
                print_json(&summary)?;
            } else {
                print_search_results(&summary, args.stats);
            }
            Ok(())
        }
        Commands::Inspect { module } => {
            init_logging("warn");
            let module = Arc::new(load_module(&module)?);
            println!("{} ({})", module.name().bold(), module.full_name());
            match module.type_system() {
                Some(ts) => print_namespace(ts.root_namespace(), 0),
                None => println!("  {}", "type system unavailable".yellow()),
            }
            for resource in module.resources() {
                println!("  {} {}", "resource".dimmed(), resource);
            }
            Ok(())
        }
    }
}

fn print_namespace(ns: &Arc<Namespace>, depth: usize) {
    let indent = "  ".repeat(depth + 1);
    if !ns.is_root() {
        println!("{}{}", indent, ns.full_name().blue());
    }
    for ty in ns.types() {
        println!("{}  {} ({} members)", indent, ty.name().green(), ty.members().len());
    }
    for child in ns.child_namespaces() {
        print_namespace(child, if ns.is_root() { depth } else { depth + 1 });
    }
}

fn qualified_name(result: &Hit) -> String {
    match result {
        Hit::Member(m) => m.member.full_name(),
        _ => result.name().to_string(),
    }
}

fn print_search_results(summary: &SessionSummary, stats_only: bool) {
    if !stats_only {
        for result in &summary.results {
            println!(
                "{} {} {}",
                qualified_name(result).green(),
                format!("({})", result.kind()).dimmed(),
                result.location().blue()
            );
        }
    }

    println!(
        "\nFound {} results in {} modules ({} skipped)",
        summary.results.len(),
        summary.modules_searched,
        summary.modules_skipped
    );
    if summary.truncated {
        println!("{}", "Result limit reached; some results were not collected".yellow());
    }
    if summary.cancelled {
        println!("{}", "Search cancelled".yellow());
    }
}

fn print_json(summary: &SessionSummary) -> Result<()> {
    let results: Vec<_> = summary
        .results
        .iter()
        .map(|r| {
            json!({
                "kind": r.kind(),
                "name": r.name(),
                "qualified_name": qualified_name(r),
                "fitness": r.fitness(),
                "location": r.location(),
                "assembly": r.assembly(),
            })
        })
        .collect();
    let output = json!({
        "modules_searched": summary.modules_searched,
        "modules_skipped": summary.modules_skipped,
        "cancelled": summary.cancelled,
        "truncated": summary.truncated,
        "results": results,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
