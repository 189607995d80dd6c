//! colcalc CLI - apply column formulas to CSV files

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colcalc::prelude::*;
use colcalc::{extract_references_batch, CsvReadOptions, CsvWriteOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "colcalc")]
#[command(author, version, about = "Apply named column formulas to tabular data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the formulas of a configuration to a CSV file
    Apply {
        /// Input CSV file
        input: PathBuf,

        /// Engine configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Field delimiter (default: comma)
        #[arg(short, long, default_value = ",")]
        delimiter: char,
    },

    /// Check a configuration against a CSV file without evaluating it
    #[command(alias = "check")]
    Validate {
        /// Input CSV file
        input: PathBuf,

        /// Engine configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Field delimiter (default: comma)
        #[arg(short, long, default_value = ",")]
        delimiter: char,
    },

    /// List the columns referenced by formulas
    Refs {
        /// Formulas to scan
        formulas: Vec<String>,

        /// Scan the formulas of a configuration instead
        #[arg(short, long, conflicts_with = "formulas")]
        config: Option<PathBuf>,
    },

    /// List the available functions
    Functions {
        /// Include the functions' documentation
        #[arg(short, long)]
        long: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            input,
            config,
            output,
            delimiter,
        } => apply(&input, &config, output.as_deref(), delimiter),
        Commands::Validate {
            input,
            config,
            delimiter,
        } => validate(&input, &config, delimiter),
        Commands::Refs { formulas, config } => list_refs(&formulas, config.as_deref()),
        Commands::Functions { long } => list_functions(long),
    }
}

fn load_engine(path: &Path) -> Result<FormulaEngine> {
    let config = EngineConfig::from_file(path)
        .with_context(|| format!("Failed to load config '{}'", path.display()))?;
    Ok(config.build_engine())
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }
    Ok(delimiter as u8)
}

fn read_table(input: &Path, delimiter: char) -> Result<Table> {
    let options = CsvReadOptions::default().with_delimiter(delimiter_byte(delimiter)?);
    CsvReader::read_file(input, &options)
        .with_context(|| format!("Failed to open '{}'", input.display()))
}

fn apply(input: &Path, config: &Path, output: Option<&Path>, delimiter: char) -> Result<()> {
    let engine = load_engine(config)?;
    let mut table = read_table(input, delimiter)?;

    let stats = engine
        .apply(&mut table)
        .context("Failed to apply formulas")?;

    eprintln!(
        "Applied {} formulas ({} created, {} overwritten)",
        stats.formulas_applied, stats.columns_created, stats.columns_overwritten
    );

    let options = CsvWriteOptions::default().with_delimiter(delimiter_byte(delimiter)?);

    if let Some(output_path) = output {
        CsvWriter::write_file(&table, output_path, &options)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        eprintln!(
            "Wrote {} rows to '{}'",
            table.row_count(),
            output_path.display()
        );
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        CsvWriter::write(&table, &mut handle, &options).context("Failed to write to stdout")?;
        handle.flush().context("Failed to write to stdout")?;
    }

    Ok(())
}

fn validate(input: &Path, config: &Path, delimiter: char) -> Result<()> {
    let engine = load_engine(config)?;
    let table = read_table(input, delimiter)?;

    let issues = engine.validate(&table);
    if issues.is_empty() {
        println!("OK: {} formulas", engine.formulas().len());
        return Ok(());
    }

    for issue in &issues {
        println!("{}", issue);
    }
    bail!("{} issue(s) found", issues.len())
}

fn list_refs(formulas: &[String], config: Option<&Path>) -> Result<()> {
    let refs = match config {
        Some(path) => {
            let engine = load_engine(path)?;
            extract_references_batch(engine.formulas().expressions())
        }
        None => {
            if formulas.is_empty() {
                bail!("Pass one or more formulas or --config");
            }
            extract_references_batch(formulas)
        }
    };

    for name in refs {
        println!("{}", name);
    }
    Ok(())
}

fn list_functions(long: bool) -> Result<()> {
    let registry = FunctionRegistry::new();
    for (name, doc) in registry.to_dict() {
        match doc {
            Some(doc) if long => println!("{}\t{}", name, doc),
            _ => println!("{}", name),
        }
    }
    Ok(())
}
