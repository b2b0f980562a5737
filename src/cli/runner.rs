//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::IssClient;
use crate::config::{read_text, ClientConfig};
use crate::error::{Error, Result};
use crate::output::{to_record_batch, write_table_to_parquet, Rendered};
use crate::pipeline::{process, PipelineConfig};
use crate::types::{OutputMode, TransformMode};
use arrow::util::pretty::pretty_format_batches;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Decode { file, block, pivot } => {
                self.decode(file, block.as_deref(), *pivot)
            }
            command => {
                let endpoint = command
                    .endpoint()?
                    .ok_or_else(|| Error::config("Command does not call an endpoint"))?;
                let config = self.load_config()?;
                let client = IssClient::from_config(&config)?;

                let started = Instant::now();
                let rendered = client.request(&endpoint).await?;
                info!(
                    endpoint = endpoint.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "request complete"
                );
                self.emit(rendered)
            }
        }
    }

    /// Output mode implied by the output format
    fn output_mode(&self) -> OutputMode {
        match self.cli.format {
            OutputFormat::Json => OutputMode::RecordJson,
            OutputFormat::Table | OutputFormat::Parquet => OutputMode::Tabular,
        }
    }

    /// Load client configuration, applying command line overrides
    fn load_config(&self) -> Result<ClientConfig> {
        let config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        let mut config = config.with_output_mode(self.output_mode());
        if let Some(lang) = &self.cli.lang {
            config.lang = Some(lang.clone());
        }
        Ok(config)
    }

    /// Decode a saved payload
    fn decode(&self, file: &Path, block: Option<&str>, pivot: bool) -> Result<()> {
        let payload = read_text(file)?;

        let transform = if pivot {
            TransformMode::EntityPivot
        } else {
            TransformMode::Default
        };
        let mut config = PipelineConfig::new(transform, self.output_mode());
        config.block = block.map(String::from);

        let rendered = process(&payload, &config)?;
        info!(file = %file.display(), "decoded payload");
        self.emit(rendered)
    }

    /// Write a result in the selected format
    fn emit(&self, rendered: Rendered) -> Result<()> {
        let text = match self.cli.format {
            OutputFormat::Json => rendered.to_json()?,
            OutputFormat::Table => {
                let table = expect_table(rendered)?;
                let batch = to_record_batch(&table)?;
                pretty_format_batches(&[batch])?.to_string()
            }
            OutputFormat::Parquet => {
                let path = self
                    .cli
                    .output
                    .as_ref()
                    .ok_or_else(|| Error::config("Parquet format requires --output path"))?;
                let table = expect_table(rendered)?;
                let rows = write_table_to_parquet(path, &table, self.cli.compression)?;
                info!(path = %path.display(), rows, "wrote parquet file");
                return Ok(());
            }
        };

        match &self.cli.output {
            Some(path) => {
                fs::write(path, text)?;
                info!(path = %path.display(), "wrote output");
            }
            None => println!("{text}"),
        }
        Ok(())
    }
}

fn expect_table(rendered: Rendered) -> Result<crate::table::TypedTable> {
    rendered
        .into_table()
        .ok_or_else(|| Error::output("Expected a tabular result"))
}
