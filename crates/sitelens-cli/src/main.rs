mod display;
mod logging;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use sitelens_core::config::{self, SiteLensConfig};
use sitelens_core::project::{load_file, parse_date};
use sitelens_core::sampling::{FixedClock, RandomSampler};
use sitelens_core::{server, Assistant, Engine};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "sitelens",
    version,
    about = "SiteLens - Construction Project Analytics",
    long_about = "Analyze construction project data: costs, resource utilization, schedule, \
                  risk and carbon footprint, with prioritized recommendations.\n\n\
                  Run it on project files or serve the analysis over HTTP."
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a project file or a directory of project files
    Analyze {
        /// Path to a .json/.yaml/.yml project file or a directory containing them
        path: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Seed for the simulated fields (inventory, utilization, footprint)
        #[arg(long)]
        seed: Option<u64>,

        /// Treat this date as "now" when computing completion (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        now: Option<String>,
    },

    /// Serve the analysis API over HTTP
    Serve {
        /// Config file (defaults to ./sitelens.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind, overriding the config file
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overriding the config file
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a free-text question, optionally about a project file
    Ask {
        /// The question
        query: String,

        /// Project file to analyze and use as context
        #[arg(long)]
        project: Option<PathBuf>,

        /// Config file (defaults to ./sitelens.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a starter sitelens.toml
    Init {
        /// Output path
        #[arg(default_value = config::DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Analyze {
            path,
            format,
            seed,
            now,
        } => cmd_analyze(&path, &format, seed, now.as_deref()),
        Commands::Serve { config, host, port } => cmd_serve(config.as_deref(), host, port),
        Commands::Ask {
            query,
            project,
            config,
        } => cmd_ask(&query, project.as_deref(), config.as_deref()),
        Commands::Init { path, force } => cmd_init(&path, force),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "sitelens", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn discover_project_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if path.is_dir() {
        let mut files = Vec::new();
        for ext in ["json", "yaml", "yml"] {
            let pattern = format!("{}/**/*.{}", path.display(), ext);
            files.extend(
                glob::glob(&pattern)
                    .context("Failed to read glob pattern")?
                    .filter_map(|r| r.ok()),
            );
        }
        files.sort();
        return Ok(files);
    }

    anyhow::bail!("Path '{}' does not exist", path.display());
}

fn engine_for(seed: Option<u64>, now: Option<&str>) -> Result<Engine<RandomSampler, FixedClock>> {
    let now = match now {
        Some(raw) => parse_date(raw)
            .with_context(|| format!("Invalid --now date '{}': expected YYYY-MM-DD", raw))?,
        None => Utc::now(),
    };
    let sampler = match seed {
        Some(seed) => RandomSampler::seeded(seed),
        None => RandomSampler::from_entropy(),
    };
    Ok(Engine::with_sources(sampler, FixedClock(now)))
}

fn cmd_analyze(path: &Path, format: &str, seed: Option<u64>, now: Option<&str>) -> Result<()> {
    let files = discover_project_files(path)?;

    if files.is_empty() {
        anyhow::bail!(
            "No project files found at '{}'. \
            Make sure the path points to a JSON or YAML project file or directory.",
            path.display()
        );
    }

    tracing::debug!(count = files.len(), path = %path.display(), "discovered project files");

    for file in &files {
        let data = load_file(file)?;
        tracing::info!(file = %file.display(), "analyzing project");
        // Fresh engine per file so a seeded run is repeatable file by file.
        let report = engine_for(seed, now)?
            .analyze(&data)
            .with_context(|| format!("Failed to analyze {}", file.display()))?;

        match format {
            "json" => {
                let json = serde_json::to_string_pretty(&report)?;
                println!("{}", json);
            }
            _ => {
                display::print_analysis_report(file, &report);
            }
        }
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<SiteLensConfig> {
    config::load_or_default(path)
}

fn cmd_serve(config_path: Option<&Path>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut settings = load_settings(config_path)?;
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }
    tracing::debug!(addr = %settings.server.bind_addr(), "starting server");

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(server::serve(&settings))
}

fn cmd_ask(query: &str, project: Option<&Path>, config_path: Option<&Path>) -> Result<()> {
    let settings = load_settings(config_path)?;

    let report = match project {
        Some(file) => {
            let data = load_file(file)?;
            let mut engine = match settings.analysis.seed {
                Some(seed) => Engine::seeded(seed),
                None => Engine::new(),
            };
            Some(
                engine
                    .analyze(&data)
                    .with_context(|| format!("Failed to analyze {}", file.display()))?,
            )
        }
        None => None,
    };

    let assistant = Assistant::from_settings(&settings.assistant);
    tracing::debug!(provider = ?assistant.provider(), "answering question");
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let reply = runtime.block_on(assistant.answer(query, report.as_ref()));

    display::print_assistant_reply(query, &reply);
    Ok(())
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "'{}' already exists. Use --force to overwrite it.",
            path.display()
        );
    }
    std::fs::write(path, config::generate_default_config())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Config written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_discover_project_files_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("b.yaml"), "budget: 1").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let files = discover_project_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        assert!(discover_project_files(Path::new("/nonexistent/project")).is_err());
    }

    fn fixtures_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .unwrap() // crates/
            .parent()
            .unwrap() // workspace root
            .join("tests/fixtures")
    }

    #[test]
    fn test_analyze_fixture_directory() {
        logging::init(false);
        let projects = fixtures_dir().join("projects");
        assert_eq!(discover_project_files(&projects).unwrap().len(), 2);
        cmd_analyze(&projects, "json", Some(1), Some("2024-06-01")).unwrap();
    }

    #[test]
    fn test_analyze_rejects_empty_project() {
        let empty = fixtures_dir().join("invalid/empty.json");
        let err = cmd_analyze(&empty, "json", Some(1), None).unwrap_err();
        assert!(err.to_string().contains("Failed to analyze"));
    }

    #[test]
    fn test_invalid_now_is_an_error() {
        assert!(engine_for(Some(1), Some("yesterday")).is_err());
        assert!(engine_for(Some(1), Some("2024-03-01")).is_ok());
    }
}
