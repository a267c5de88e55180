//! Configuration handling for tablemorph

use std::path::PathBuf;

use crate::pipeline::Step;

/// Output format for the transformed table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned grid for terminals
    #[default]
    Table,
    Csv,
    Json,
    /// One JSON object per line
    Jsonl,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "terminal" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Configuration for one tablemorph run
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the input file
    pub input: PathBuf,
    /// Where to write the result; stdout when `None`
    pub output: Option<PathBuf>,
    /// Output format
    pub output_format: OutputFormat,
    /// Field delimiter for CSV input
    pub delimiter: u8,
    /// Transformations, applied in order
    pub steps: Vec<Step>,
    /// Print column type statistics instead of rows
    pub show_types: bool,
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: None,
            output_format: OutputFormat::default(),
            delimiter: b',',
            steps: Vec::new(),
            show_types: false,
            pretty: true,
        }
    }
}

impl Config {
    /// Create a new Config reading from `input`
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            ..Default::default()
        }
    }

    /// Set the output path
    pub fn with_output(mut self, output: PathBuf) -> Self {
        self.output = Some(output);
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the CSV delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Append a transformation step
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Print type statistics instead of the table
    pub fn with_show_types(mut self, show_types: bool) -> Self {
        self.show_types = show_types;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}
