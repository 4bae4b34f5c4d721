//! Pagebind CLI - Batch Page-Image to PDF Binder
//!
//! Command-line tool converting folders of page images into per-folder PDF
//! documents, parallelized across folders.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use console::style;
use tracing::{error, info};

use pagebind::{init, BatchRunner, Config};

/// Pagebind - Batch Page-Image to PDF Binder
#[derive(Parser)]
#[command(
    name = "pagebind",
    version,
    about = "Batch converter binding folders of page images into per-folder PDFs",
    long_about = "Pagebind scans a root directory for chapter subfolders, converts each \
                  subfolder's page images (JPEG, PNG, WebP) into a single multi-page PDF, \
                  and reports a per-folder status summary. Folders are processed in \
                  parallel across a fixed-size worker pool.",
    arg_required_else_help = false
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Root directory containing one subfolder per chapter
    #[arg(
        short,
        long = "input_folder",
        value_name = "PATH",
        default_value = "readoshino.com"
    )]
    input_folder: PathBuf,

    /// Output directory (default: <input_folder>_pdf)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Number of concurrent folder tasks (default: half the CPU cores)
    #[arg(short, long, value_name = "COUNT")]
    workers: Option<usize>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List the folders that would be converted without converting them
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only, no progress bar)
    #[arg(short = 'Q', long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Validate configuration file
    Config {
        /// Configuration file to validate
        file: PathBuf,
    },
    /// Generate example configuration file
    ExampleConfig {
        /// Output file path
        #[arg(short, long, default_value = "pagebind.toml")]
        output: PathBuf,
        /// Use YAML format instead of TOML
        #[arg(long)]
        yaml: bool,
    },
    /// Show system information and capabilities
    Info,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    std::env::set_var("RUST_LOG", log_level);

    // Handle subcommands
    if let Some(command) = cli.command {
        if let Err(e) = handle_subcommand(command) {
            eprintln!("{}: {}", style("Error").red().bold(), e);
            process::exit(1);
        }
        return;
    }

    // Initialize Pagebind
    if let Err(e) = init() {
        eprintln!(
            "{}: Failed to initialize Pagebind: {}",
            style("Error").red().bold(),
            e
        );
        process::exit(1);
    }

    // Load configuration if provided
    let mut config = if let Some(ref config_path) = cli.config {
        match Config::from_file(config_path) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", config_path);
                config
            }
            Err(e) => {
                error!("Failed to load configuration: {}", e);
                process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // CLI flags take precedence over file values
    if cli.workers.is_some() {
        config.batch.workers = cli.workers;
    }
    if cli.quiet {
        config.batch.progress = false;
    }

    if let Err(e) = config.validate() {
        eprintln!("{}: {}", style("Error").red().bold(), e.user_message());
        process::exit(1);
    }

    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| config.output_dir_for(&cli.input_folder));

    if cli.dry_run {
        if let Err(e) = run_dry_run(&cli.input_folder, &output_dir) {
            eprintln!("{}: {}", style("Error").red().bold(), e.user_message());
            process::exit(1);
        }
        return;
    }

    let runner = BatchRunner::from_config(&config);
    info!(
        "Converting {:?} -> {:?} with {} workers",
        cli.input_folder,
        output_dir,
        runner.workers()
    );

    match runner.run(&cli.input_folder, &output_dir).await {
        Ok(report) => {
            report.print_summary();
        }
        Err(e) => {
            eprintln!("{}: {}", style("Error").red().bold(), e.user_message());
            process::exit(1);
        }
    }
}

/// Handle subcommands
fn handle_subcommand(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Config { file } => {
            validate_config_file(&file)?;
        }
        Commands::ExampleConfig { output, yaml } => {
            generate_example_config(&output, yaml)?;
        }
        Commands::Info => {
            show_system_info();
        }
    }
    Ok(())
}

/// List the folders a run would convert, without converting them
fn run_dry_run(input_root: &Path, output_dir: &Path) -> pagebind::Result<()> {
    if !input_root.is_dir() {
        return Err(pagebind::PagebindError::input_root_missing(
            input_root.to_path_buf(),
        ));
    }

    let mut folders = Vec::new();
    for entry in std::fs::read_dir(input_root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            folders.push(entry.path());
        }
    }

    println!(
        "{} folders would be converted into {}:",
        style(folders.len()).bold(),
        output_dir.display()
    );
    for folder in &folders {
        println!("  {}", folder.display());
    }

    Ok(())
}

/// Validate configuration file
fn validate_config_file(file_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_file(file_path)?;
    config.validate()?;

    println!(
        "{}: Configuration file is valid",
        style("Success").green().bold()
    );
    match config.batch.workers {
        Some(workers) => println!("Workers: {}", workers),
        None => println!("Workers: auto (half the CPU cores)"),
    }
    println!("Output suffix: {}", config.batch.output_suffix);
    println!("Page DPI: {}", config.conversion.dpi);

    Ok(())
}

/// Generate example configuration file
fn generate_example_config(output_path: &Path, use_yaml: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = if use_yaml {
        output_path.with_extension("yaml")
    } else {
        output_path.to_path_buf()
    };

    let config = Config::default();
    config.to_file(&path)?;

    let format = if use_yaml { "YAML" } else { "TOML" };
    println!(
        "{}: Generated example {} configuration: {}",
        style("Success").green().bold(),
        format,
        path.display()
    );

    Ok(())
}

/// Show system information
fn show_system_info() {
    use sysinfo::{CpuExt, System, SystemExt};

    println!("{}", style("Pagebind System Information").bold());
    println!();

    println!("{}: {}", style("Version").bold(), env!("CARGO_PKG_VERSION"));
    println!();

    let mut system = System::new_all();
    system.refresh_all();

    println!("{}", style("System:").bold());
    if let Some(name) = system.name() {
        println!("  OS: {}", name);
    }
    if let Some(version) = system.os_version() {
        println!("  Version: {}", version);
    }
    println!("  CPUs: {}", system.cpus().len());
    if let Some(cpu) = system.cpus().first() {
        println!(
            "  CPU: {} ({:.2} GHz)",
            cpu.brand(),
            cpu.frequency() as f64 / 1000.0
        );
    }
    println!(
        "  Memory: {:.2} GB total, {:.2} GB available",
        system.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0,
        system.available_memory() as f64 / 1024.0 / 1024.0 / 1024.0
    );
    println!();

    println!("{}", style("Supported Formats:").bold());
    println!("  Input: JPEG, PNG, WebP");
    println!("  Output: PDF (one document per folder)");
    println!();

    println!("{}", style("Defaults:").bold());
    println!("  Workers: {} (half of {} cores)", (num_cpus::get() / 2).max(1), num_cpus::get());
    println!("  Output directory: <input_folder>_pdf");
}
