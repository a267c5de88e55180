//! tablemorph - Reshape semi-structured records into flat tables

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use tablemorph::config::{Config, OutputFormat};
use tablemorph::logging::{init_logging, LogConfig};
use tablemorph::output::{render_table, render_type_stats};
use tablemorph::parser::{parse_cell_value, ParserFactory};
use tablemorph::{
    run_pipeline, ExpandOriginal, Expr, LongTableOptions, MatchColumnsOptions, Step,
    UnpackDictOptions, UnpackListOptions,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Table,
    Csv,
    Json,
    Jsonl,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Table => OutputFormat::Table,
            CliOutputFormat::Csv => OutputFormat::Csv,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Jsonl => OutputFormat::Jsonl,
        }
    }
}

/// Flatten semi-structured records (JSON, JSON lines, CSV) into tables
///
/// Steps run in a fixed order: sort, unpack dicts, unpack lists, coalesce,
/// fill nulls, drop null rows, select, unpack nested values, long table,
/// match columns, cut, convert to strings.
#[derive(Parser, Debug)]
#[command(name = "tablemorph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file (.json, .jsonl, .ndjson, .csv, .tsv)
    input: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: CliOutputFormat,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,

    /// Field delimiter for CSV input
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Sort rows by these columns (comma-separated)
    #[arg(long, value_delimiter = ',')]
    sort_by: Vec<String>,

    /// Unpack a column of maps into one column per key
    #[arg(long)]
    unpack_dict: Vec<String>,

    /// Unpack a column of lists into numbered columns
    #[arg(long)]
    unpack_list: Vec<String>,

    /// Coalesce columns: DEST=SRC1,SRC2 (sources are removed)
    #[arg(long)]
    coalesce: Vec<String>,

    /// Keep the source columns of --coalesce
    #[arg(long, requires = "coalesce")]
    keep_sources: bool,

    /// Fill nulls in a column: COL=VALUE
    #[arg(long)]
    fillna: Vec<String>,

    /// Drop rows where this column is null
    #[arg(long)]
    drop_null: Vec<String>,

    /// Keep rows matching an expression, e.g. "{age} >= 18"
    #[arg(long)]
    select: Vec<String>,

    /// Turn each nested value of this column into a row
    #[arg(long, requires = "nested_key")]
    unpack_nested: Option<String>,

    /// Key column carried into nested rows
    #[arg(long)]
    nested_key: Option<String>,

    /// Carry all original columns: yes, no, or a maximum nested size
    #[arg(long, default_value = "no")]
    expand_original: ExpandOriginal,

    /// Unpivot a list column: KEY1,KEY2:COLUMN
    #[arg(long)]
    long_table: Option<String>,

    /// Conform to these columns (comma-separated)
    #[arg(long, value_delimiter = ',')]
    match_columns: Vec<String>,

    /// Policy for extra columns: remove, ignore, fail
    #[arg(long, default_value = "remove")]
    if_extra: String,

    /// Policy for missing columns: add, ignore, fail
    #[arg(long, default_value = "add")]
    if_missing: String,

    /// Match column names exactly instead of normalized
    #[arg(long)]
    exact: bool,

    /// Keep only these columns, in this order (comma-separated)
    #[arg(long, value_delimiter = ',')]
    cut: Vec<String>,

    /// Convert every non-string column to strings (nulls become empty)
    #[arg(long)]
    to_str: bool,

    /// Print column types instead of rows
    #[arg(long)]
    types: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose))?;

    let config = build_config(&cli)?;

    let factory = ParserFactory::new();
    let table = factory
        .parse(&config.input, &config)
        .with_context(|| format!("Failed to parse input file: {}", config.input.display()))?;

    let table = run_pipeline(table, &config.steps)?;

    if config.show_types {
        let stats = table.get_columns_type_stats()?;
        let mut stdout = std::io::stdout().lock();
        return render_type_stats(&stats, &mut stdout);
    }

    render_table(
        &table,
        config.output_format,
        config.pretty,
        config.output.as_deref(),
    )?;
    if let Some(path) = &config.output {
        info!(path = %path.display(), rows = table.row_count(), "wrote output");
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<Config> {
    let delimiter = u8::try_from(cli.delimiter)
        .with_context(|| format!("Delimiter must be a single byte: {:?}", cli.delimiter))?;

    let mut config = Config::new(cli.input.clone())
        .with_output_format(cli.format.into())
        .with_delimiter(delimiter)
        .with_show_types(cli.types)
        .with_pretty(!cli.compact);
    if let Some(output) = &cli.output {
        config = config.with_output(output.clone());
    }

    let mut steps = Vec::new();
    if !cli.sort_by.is_empty() {
        steps.push(Step::SortBy(cli.sort_by.clone()));
    }
    for column in &cli.unpack_dict {
        steps.push(Step::UnpackDict {
            column: column.clone(),
            options: UnpackDictOptions::default(),
        });
    }
    for column in &cli.unpack_list {
        steps.push(Step::UnpackList {
            column: column.clone(),
            options: UnpackListOptions::new().with_replace(true),
        });
    }
    for arg in &cli.coalesce {
        let (dest, sources) = split_assignment(arg, "--coalesce")?;
        steps.push(Step::Coalesce {
            dest: dest.to_string(),
            sources: split_list(sources),
            remove_sources: !cli.keep_sources,
        });
    }
    for arg in &cli.fillna {
        let (column, value) = split_assignment(arg, "--fillna")?;
        steps.push(Step::FillNa {
            column: column.to_string(),
            value: parse_cell_value(value),
        });
    }
    if !cli.drop_null.is_empty() {
        steps.push(Step::RemoveNullRows(cli.drop_null.clone()));
    }
    for source in &cli.select {
        let expr = Expr::parse(source)
            .with_context(|| format!("Invalid --select expression: {source}"))?;
        steps.push(Step::Select(expr));
    }
    if let Some(column) = &cli.unpack_nested {
        let key = cli
            .nested_key
            .clone()
            .context("--unpack-nested needs --nested-key")?;
        steps.push(Step::UnpackNested {
            column: column.clone(),
            key,
            expand_original: cli.expand_original,
        });
    }
    if let Some(arg) = &cli.long_table {
        let Some((keys, column)) = arg.rsplit_once(':') else {
            bail!("--long-table expects KEYS:COLUMN, got {arg:?}");
        };
        steps.push(Step::LongTable {
            key: split_list(keys),
            column: column.trim().to_string(),
            options: LongTableOptions::default(),
        });
    }
    if !cli.match_columns.is_empty() {
        let options =
            MatchColumnsOptions::from_policies(!cli.exact, &cli.if_extra, &cli.if_missing)?;
        steps.push(Step::MatchColumns {
            desired: cli.match_columns.clone(),
            options,
        });
    }
    if !cli.cut.is_empty() {
        steps.push(Step::Cut(cli.cut.clone()));
    }
    if cli.to_str {
        steps.push(Step::ConvertToStr);
    }

    config.steps = steps;
    Ok(config)
}

fn split_assignment<'a>(arg: &'a str, flag: &str) -> Result<(&'a str, &'a str)> {
    match arg.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => bail!("{flag} expects NAME=VALUE, got {arg:?}"),
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
