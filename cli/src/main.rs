use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use flagtree_core::{ConfigError, FlagError, Registry, RegistryConfig, render};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod output;

use output::{OutputFormat, format_tree};

#[derive(Debug, Parser)]
#[command(name = "flagtree")]
#[command(about = "Parse command lines against declarative flag registries")]
struct Cli {
    /// Enable debug logging on stderr.
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse tokens against a registry and print the result tree.
    Parse(ParseArgs),
    /// Print the usage table of a registry.
    Usage(RegistryArgs),
    /// Load and build a registry, reporting its size.
    Check(RegistryArgs),
    /// Print a registry definition in normalized form.
    Export(ExportArgs),
}

#[derive(Debug, Args)]
struct RegistryArgs {
    /// Registry definition file (.json, otherwise YAML).
    #[arg(long)]
    registry: PathBuf,
}

#[derive(Debug, Args)]
struct ParseArgs {
    #[command(flatten)]
    source: RegistryArgs,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// Tokens to parse, given after `--`.
    #[arg(last = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum DefinitionFormat {
    Json,
    Yaml,
}

#[derive(Debug, Args)]
struct ExportArgs {
    #[command(flatten)]
    source: RegistryArgs,
    /// Output format.
    #[arg(long, default_value = "yaml")]
    format: DefinitionFormat,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to load '{path}': {source}")]
    Load { path: PathBuf, source: ConfigError },
    #[error(transparent)]
    Parse(#[from] FlagError),
    #[error("{0}")]
    Output(String),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Parse(_) => 2,
            _ => 1,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Usage(args) => run_usage(args),
        Command::Check(args) => run_check(args),
        Command::Export(args) => run_export(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        process::exit(err.exit_code());
    }
}

fn init_tracing(debug: bool) {
    let fallback = if debug {
        "flagtree=debug,flagtree_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<RegistryConfig, CliError> {
    RegistryConfig::from_file(path).map_err(|source| CliError::Load {
        path: path.to_path_buf(),
        source,
    })
}

fn load_registry(path: &Path) -> Result<Registry, CliError> {
    load_config(path)?.build().map_err(|source| CliError::Load {
        path: path.to_path_buf(),
        source,
    })
}

fn run_parse(args: ParseArgs) -> Result<(), CliError> {
    let registry = load_registry(&args.source.registry)?;
    debug!(tokens = ?args.tokens, "Parsing command line");

    let parsed = registry.parse(&args.tokens)?;
    let raw = format_tree(&parsed.tree(), args.format).map_err(CliError::Output)?;
    print!("{raw}");
    Ok(())
}

fn run_usage(args: RegistryArgs) -> Result<(), CliError> {
    let registry = load_registry(&args.registry)?;
    print!("{}", render::usage(&registry));
    Ok(())
}

fn run_check(args: RegistryArgs) -> Result<(), CliError> {
    let registry = load_registry(&args.registry)?;
    println!(
        "Registry '{}' defines {} flag(s), {} including sub groups.",
        args.registry.display(),
        registry.len(),
        count_flags(&registry)
    );
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<(), CliError> {
    let registry = load_registry(&args.source.registry)?;
    let config = RegistryConfig::from_registry(&registry);
    let raw = match args.format {
        DefinitionFormat::Json => config.to_json_string().map(|raw| raw + "\n"),
        DefinitionFormat::Yaml => config.to_yaml_string(),
    }
    .map_err(|err| CliError::Output(err.to_string()))?;
    print!("{raw}");
    Ok(())
}

fn count_flags(registry: &Registry) -> usize {
    registry
        .flags()
        .iter()
        .map(|flag| 1 + flag.group().map_or(0, count_flags))
        .sum()
}
