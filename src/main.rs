//! @ai:module:intent CLI for resolving benchmark definitions and generating result tables
//! @ai:module:layer presentation

use anyhow::{Context, Result};
use benchtab::{
    BenchmarkDefinition, Config, ReportGenerator, RunSet, RunSetBuilder, TableJob, TableSource,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "benchtab")]
#[command(about = "Resolve benchmark definitions into runs and tabulate benchmark results")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a benchmark definition into run sets
    Resolve {
        /// Benchmark definition XML file
        definition: PathBuf,

        /// Only resolve run definitions matching this glob (repeatable)
        #[arg(short = 'r', long = "rundefinition")]
        run_definitions: Vec<String>,

        /// Only use tasks blocks matching this glob (repeatable)
        #[arg(short = 't', long = "tasks")]
        tasks: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate table (and diff) artifacts from result files
    Table {
        /// Result XML files, in column order
        results: Vec<PathBuf>,

        /// Table definition XML listing result files and columns
        #[arg(short = 'x', long = "xml", conflicts_with = "results")]
        table_definition: Option<PathBuf>,

        /// Prefix for the output files
        #[arg(short, long)]
        name: Option<String>,

        /// Output directory
        #[arg(short, long = "outputpath")]
        output_path: Option<PathBuf>,

        /// Show all columns, hidden ones included
        #[arg(long)]
        all_columns: bool,

        /// Only show rows where at least one result is correct
        #[arg(long)]
        correct_only: bool,

        /// Only show rows present in every result file
        #[arg(long)]
        common: bool,

        /// Do not generate a diff table
        #[arg(long)]
        no_diff: bool,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "benchtab.toml")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("benchtab=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            definition,
            run_definitions,
            tasks,
            format,
            config,
        } => resolve(ResolveArgs {
            definition,
            run_definitions,
            tasks,
            format,
            config,
        }),
        Commands::Table {
            results,
            table_definition,
            name,
            output_path,
            all_columns,
            correct_only,
            common,
            no_diff,
            config,
        } => table(TableArgs {
            results,
            table_definition,
            name,
            output_path,
            all_columns,
            correct_only,
            common,
            no_diff,
            config,
        }),
        Commands::Init { output } => init_config(output),
    }
}

struct ResolveArgs {
    definition: PathBuf,
    run_definitions: Vec<String>,
    tasks: Vec<String>,
    format: OutputFormat,
    config: Option<PathBuf>,
}

struct TableArgs {
    results: Vec<PathBuf>,
    table_definition: Option<PathBuf>,
    name: Option<String>,
    output_path: Option<PathBuf>,
    all_columns: bool,
    correct_only: bool,
    common: bool,
    no_diff: bool,
    config: Option<PathBuf>,
}

/// @ai:intent Resolve a benchmark definition and print its run sets
/// @ai:effects fs:read, io:stdout
fn resolve(args: ResolveArgs) -> Result<()> {
    let mut config = load_or_default_config(args.config)?;

    if !args.run_definitions.is_empty() {
        config.resolve.run_definitions = args.run_definitions;
    }
    if !args.tasks.is_empty() {
        config.resolve.tasks = args.tasks;
    }

    let definition = BenchmarkDefinition::load(&args.definition)
        .with_context(|| format!("Failed to load {}", args.definition.display()))?;

    tracing::info!(
        "Resolving benchmark for tool '{}' from {}",
        definition.tool,
        args.definition.display()
    );

    let run_sets = RunSetBuilder::from_filesystem()
        .build_benchmark(&definition, &config.resolve)
        .context("Failed to resolve run sets")?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&run_sets)?),
        OutputFormat::Text => print_run_sets(&run_sets),
    }

    Ok(())
}

/// @ai:intent Print run sets as a plain listing
/// @ai:effects io:stdout
fn print_run_sets(run_sets: &[RunSet]) {
    for run_set in run_sets {
        let name = if run_set.name.is_empty() {
            "(default)"
        } else {
            run_set.name.as_str()
        };
        println!("Run set {} ({} runs):", name, run_set.runs.len());
        println!();
        println!("{:<50} {:<20} {:<12}", "Run", "Property", "Expected");
        println!("{}", "-".repeat(84));

        for run in &run_set.runs {
            println!(
                "{:<50} {:<20} {:<12}",
                run.identifier,
                run.property.as_ref().map(|p| p.name.as_str()).unwrap_or("-"),
                run.expected_verdict
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "-".to_string())
            );
        }
        println!();
    }
}

/// @ai:intent Generate table artifacts from result files
/// @ai:effects fs:read, fs:write, io:stdout
fn table(args: TableArgs) -> Result<()> {
    let config = load_or_default_config(args.config)?;

    let mut settings = config.table;
    settings.all_columns |= args.all_columns;
    settings.correct_only |= args.correct_only;
    settings.common |= args.common;
    settings.no_diff |= args.no_diff;

    let source = match args.table_definition {
        Some(path) => TableSource::Definition(path),
        None if args.results.is_empty() => {
            anyhow::bail!("Give result files or a table definition with -x")
        }
        None => TableSource::Files(args.results),
    };

    let mut job = TableJob::new(source, settings);
    job.name = args.name;
    job.output_dir = args.output_path;

    let summary = ReportGenerator::new()
        .run(&job)
        .context("Failed to generate tables")?;

    println!(
        "Table with {} rows from {} result files",
        summary.rows, summary.result_sets
    );
    if let Some(diff_rows) = summary.diff_rows {
        println!("Diff table with {} rows", diff_rows);
    }
    for artifact in &summary.artifacts {
        println!("  {}", artifact.display());
    }

    Ok(())
}

/// @ai:intent Write the default configuration
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

/// @ai:intent Load configuration from an explicit path, ./benchtab.toml, or defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.or_else(|| {
        let default_path = PathBuf::from("benchtab.toml");
        default_path.exists().then_some(default_path)
    });

    match path {
        Some(p) => Config::load(&p).with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(Config::default()),
    }
}
