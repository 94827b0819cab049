mod extract;
mod profile;
mod sources;

use firmscope_core::{Envelope, EnvelopeError, SourceId};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Metadata;

const SCHEMA_VERSION: &str = "v1.0.0";

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub source_chain: Vec<SourceId>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<SourceId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source_chain,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let command_result = match &cli.command {
        Command::Profile(args) => profile::run(args, cli).await?,
        Command::Extract(args) => extract::run(args)?,
        Command::Sources(args) => sources::run(args)?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
        latency_ms,
        source_chain,
    } = command_result;

    let mut metadata = Metadata::new(source_chain, latency_ms)?;
    for warning in warnings {
        metadata.push_warning(warning);
    }

    let meta = metadata.into_envelope_meta(SCHEMA_VERSION)?;
    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}
