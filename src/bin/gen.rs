//! mrsgen: CLI for generating and compiling mihomo rule-sets.

use clap::{Parser, Subcommand};
use mrsgen::{BatchCompiler, BlocklistFetcher, Config, Error, ToolManager};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mrsgen")]
#[command(version = "0.1.0")]
#[command(about = "Generate mihomo binary rule-sets from hosts-format block lists", long_about = None)]
struct Cli {
    /// Optional YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download hosts sources and write the rule-list document
    Fetch {
        /// Output path for the rule-list document
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile all rule-list documents to the binary rule-set format
    Compile {
        /// Directory scanned for rule-list documents
        #[arg(long)]
        rules_dir: Option<PathBuf>,

        /// Output directory for compiled artifacts
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Path of the converter binary
        #[arg(long)]
        tool: Option<PathBuf>,
    },

    /// Run both pipelines: fetch, then compile
    All,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Fetch { output } => run_fetch(&config, output),
        Commands::Compile {
            rules_dir,
            output_dir,
            tool,
        } => run_compile(&config, rules_dir, output_dir, tool),
        Commands::All => {
            run_fetch(&config, None).and_then(|_| run_compile(&config, None, None, None))
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> mrsgen::Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}

fn run_fetch(config: &Config, output: Option<PathBuf>) -> mrsgen::Result<()> {
    let output = output.unwrap_or_else(|| config.blocklist_output.clone());

    let fetcher = BlocklistFetcher::new()?;
    let count = fetcher.generate(&config.sources, &output)?;

    println!("Converted {} unique rules -> {}", count, output.display());
    Ok(())
}

fn run_compile(
    config: &Config,
    rules_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    tool: Option<PathBuf>,
) -> mrsgen::Result<()> {
    let rules_dir = rules_dir.unwrap_or_else(|| config.rules_dir.clone());
    let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
    let tool_path = tool.unwrap_or_else(|| config.tool_path.clone());

    let manager = ToolManager::new(&tool_path, &config.release_url);
    let version = manager.ensure()?;
    println!("Converter: {}", version);

    let compiler = BatchCompiler::new(&tool_path, &rules_dir, &output_dir);
    let report = compiler.run()?;

    println!(
        "Converted {}/{} files, artifacts in {}",
        report.succeeded,
        report.total(),
        output_dir.display()
    );

    if !report.is_complete() {
        return Err(Error::Incomplete {
            failed: report.failed,
            total: report.total(),
        });
    }

    Ok(())
}
