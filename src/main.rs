use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use refscan::analysis::{complexity, dependencies, duplicates, unused};
use refscan::analysis::{
    ComplexityOptions, ComplexityThresholds, DuplicateOptions, GraphOptions, UnusedExportOptions,
};
use refscan::index::ProjectIndex;
use refscan::report::{self, ProjectReport, ReportFormat};

#[derive(Parser)]
#[command(name = "refscan")]
#[command(version)]
#[command(about = "Static analysis engine for JavaScript/TypeScript refactoring", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the module dependency graph and detect circular dependencies
    Graph {
        /// Project root to analyze
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Restrict the graph to files reachable from these entry files
        #[arg(long = "entry")]
        entry_files: Vec<String>,

        /// Maximum resolution hops from the entry files
        #[arg(long)]
        depth: Option<usize>,

        /// Include external package imports as graph nodes
        #[arg(long)]
        include_external: bool,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Detect duplicated code blocks
    Duplicates {
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Minimum duplicate block length in lines
        #[arg(long, default_value_t = duplicates::DEFAULT_MIN_LINES)]
        min_lines: usize,

        /// Skip test files
        #[arg(long)]
        ignore_tests: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Score per-function complexity against thresholds
    Complexity {
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Restrict analysis to these files
        #[arg(long = "file")]
        files: Vec<String>,

        /// Maximum lines per file
        #[arg(long, default_value_t = 300)]
        max_loc: usize,

        /// Maximum nesting depth per function
        #[arg(long, default_value_t = 4)]
        max_nesting: usize,

        /// Maximum functions per file
        #[arg(long, default_value_t = 20)]
        max_functions: usize,

        /// Maximum parameters per function
        #[arg(long, default_value_t = 5)]
        max_parameters: usize,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Find exported symbols with no reference outside their declaration
    UnusedExports {
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Files whose exports are the public surface (exempt)
        #[arg(long = "entry-point")]
        entry_points: Vec<String>,

        /// Glob patterns for files to skip
        #[arg(long = "ignore")]
        ignore_patterns: Vec<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Find relative imports that resolve to no project file
    Orphans {
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run every analysis and emit a merged report
    Report {
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Output format: json or markdown
        #[arg(short, long, default_value = "json")]
        format: ReportFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Graph {
            root,
            entry_files,
            depth,
            include_external,
            output,
        } => {
            let index = build_index(&root)?;
            let options = GraphOptions {
                entry_files,
                depth,
                include_external,
            };
            emit(&dependencies::analyze(&index, &options), output.as_deref())
        }
        Commands::Duplicates {
            root,
            min_lines,
            ignore_tests,
            output,
        } => {
            let index = build_index(&root)?;
            let options = DuplicateOptions {
                min_lines,
                ignore_tests,
            };
            emit(&duplicates::analyze(&index, &options)?, output.as_deref())
        }
        Commands::Complexity {
            root,
            files,
            max_loc,
            max_nesting,
            max_functions,
            max_parameters,
            output,
        } => {
            let index = build_index(&root)?;
            let options = ComplexityOptions {
                files,
                thresholds: ComplexityThresholds {
                    max_loc,
                    max_nesting,
                    max_functions,
                    max_parameters,
                },
            };
            emit(&complexity::analyze(&index, &options)?, output.as_deref())
        }
        Commands::UnusedExports {
            root,
            entry_points,
            ignore_patterns,
            output,
        } => {
            let index = build_index(&root)?;
            let options = UnusedExportOptions {
                entry_points,
                ignore_patterns,
            };
            emit(&unused::analyze(&index, &options)?, output.as_deref())
        }
        Commands::Orphans { root, output } => {
            let index = build_index(&root)?;
            emit(&dependencies::find_orphans(&index), output.as_deref())
        }
        Commands::Report {
            root,
            format,
            output,
        } => {
            let index = build_index(&root)?;
            let report = ProjectReport {
                root: root.display().to_string(),
                dependency_graph: dependencies::analyze(&index, &GraphOptions::default()),
                duplicates: duplicates::analyze(&index, &DuplicateOptions::default())?,
                complexity: complexity::analyze(&index, &ComplexityOptions::default())?,
                unused_exports: unused::analyze(&index, &UnusedExportOptions::default())?,
                orphans: dependencies::find_orphans(&index),
            };
            let rendered = report::report_to_string(format, &report)?;
            write_output(rendered.as_bytes(), output.as_deref())
        }
    }
}

fn build_index(root: &Path) -> anyhow::Result<ProjectIndex> {
    ProjectIndex::build(root)
        .with_context(|| format!("failed to index project at {}", root.display()))
}

fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_output(format!("{json}\n").as_bytes(), output)
}

fn write_output(bytes: &[u8], output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            std::io::stdout().write_all(bytes)?;
            Ok(())
        }
    }
}
