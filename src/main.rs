use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use javauml::config::{Config, DEFAULT_CONFIG_FILE};
use javauml::extractor;
use javauml::java_gen::JavaGenerator;
use javauml::logging::init_logging;
use javauml::uml::{read_uml_file, write_uml_to_file};

#[derive(Parser)]
#[command(name = "javauml")]
#[command(about = "Round-trip between Java sources and PlantUML class diagrams")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract a Java source tree into diagram.puml
    Uml {
        /// Java source folder
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Directory receiving diagram.puml
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Watch mode: regenerate when .java files change
        #[arg(short, long)]
        watch: bool,
    },
    /// Generate or merge Java skeletons from a diagram
    Java {
        /// Diagram file, or a directory holding diagram.puml
        #[arg(short, long)]
        diagram: Option<PathBuf>,

        /// Root directory for generated sources
        #[arg(short, long)]
        target: Option<PathBuf>,
    },
    /// Print the extracted model as JSON
    Model {
        /// Java source folder
        #[arg(short, long)]
        source: Option<PathBuf>,
    },
}

fn require(flag: Option<PathBuf>, configured: &Option<PathBuf>, what: &str) -> Result<PathBuf> {
    flag.or_else(|| configured.clone()).with_context(|| {
        format!(
            "No {} given: pass it on the command line or set it in the config file",
            what
        )
    })
}

/// Extract the source tree and write the diagram once
fn run_uml(config: &Config, source: &Path, output: &Path) -> Result<()> {
    let start = Instant::now();

    println!("Java to UML v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", "=".repeat(50));

    println!("\n[1/2] Reading Java sources...");
    let extraction = extractor::extract(source, &config.scan.exclude)
        .with_context(|| format!("Failed to read source folder {:?}", source))?;
    println!(
        "  Parsed {} files, extracted {} classes",
        extraction.files_parsed,
        extraction.project.class_count()
    );
    for skipped in &extraction.files_skipped {
        println!("  [skipped] {}", skipped.display());
    }

    println!("\n[2/2] Writing diagram...");
    let path = write_uml_to_file(&extraction.project, output)
        .with_context(|| format!("Failed to write diagram to {:?}", output))?;
    println!("  Written {}", path.display());

    println!("\n{}", "=".repeat(50));
    println!("Done in {:?}", start.elapsed());
    Ok(())
}

fn run_java(diagram: &Path, target: &Path) -> Result<()> {
    let start = Instant::now();

    println!("UML to Java v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", "=".repeat(50));

    println!("\n[1/2] Reading diagram...");
    let project = read_uml_file(diagram).with_context(|| format!("Failed to read diagram {:?}", diagram))?;
    println!("  Found {} classes", project.class_count());

    println!("\n[2/2] Writing Java sources...");
    let mut generator = JavaGenerator::new()?;
    let report = generator
        .write_project(&project, target)
        .with_context(|| format!("Failed to write Java sources to {:?}", target))?;

    for path in &report.created {
        println!("  [created] {}", path.display());
    }
    for path in &report.merged {
        println!("  [merged] {}", path.display());
    }
    for path in &report.skipped {
        println!("  [skipped] {}", path.display());
    }

    println!("\n{}", "=".repeat(50));
    println!(
        "Done! {} created, {} merged, {} unchanged, {} skipped in {:?}",
        report.created.len(),
        report.merged.len(),
        report.unchanged.len(),
        report.skipped.len(),
        start.elapsed()
    );
    Ok(())
}

fn run_model(config: &Config, source: &Path) -> Result<()> {
    let project = extractor::read_source_folder(source, &config.scan.exclude)
        .with_context(|| format!("Failed to read source folder {:?}", source))?;
    println!("{}", serde_json::to_string_pretty(&project)?);
    Ok(())
}

/// Re-run [`run_uml`] whenever a `.java` file under `source` changes.
fn watch_uml(config: &Config, source: &Path, output: &Path) -> Result<()> {
    println!("Watch mode enabled. Monitoring {} for changes...", source.display());
    println!("Press Ctrl+C to stop.\n");

    let (tx, rx) = channel();

    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                if let Err(e) = tx.send(event) {
                    tracing::error!("Failed to send file event: {}", e);
                }
            }
        },
        notify::Config::default(),
    )?;
    watcher.watch(source, RecursiveMode::Recursive)?;

    const DEBOUNCE_MS: u64 = 300;

    let mut last_change_time = Instant::now();
    let mut pending_generation = false;

    loop {
        if let Ok(event) = rx.recv_timeout(Duration::from_millis(100)) {
            if matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
            ) && event
                .paths
                .iter()
                .any(|p| p.extension().and_then(|ext| ext.to_str()) == Some("java"))
            {
                pending_generation = true;
                last_change_time = Instant::now();
            }
        }

        if pending_generation && last_change_time.elapsed().as_millis() as u64 >= DEBOUNCE_MS {
            println!("\nChanges detected, regenerating...");
            if let Err(e) = run_uml(config, source, output) {
                tracing::error!("Error during generation: {:#}", e);
            }
            println!("\nWatching for changes (press Ctrl+C to stop)...\n");
            pending_generation = false;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    match cli.command {
        Command::Uml { source, output, watch } => {
            let source = require(source, &config.project.source_folder, "source folder")?;
            let output = require(output, &config.project.output_folder, "output folder")?;

            run_uml(&config, &source, &output)?;
            if watch {
                watch_uml(&config, &source, &output)?;
            }
        }
        Command::Java { diagram, target } => {
            let diagram = require(diagram, &config.project.output_folder, "diagram")?;
            let target = require(target, &config.project.source_folder, "target folder")?;
            run_java(&diagram, &target)?;
        }
        Command::Model { source } => {
            let source = require(source, &config.project.source_folder, "source folder")?;
            run_model(&config, &source)?;
        }
    }

    Ok(())
}
