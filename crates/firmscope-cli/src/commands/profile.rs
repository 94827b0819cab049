use std::time::{Duration, Instant};

use firmscope_core::{AggregatorBuilder, Coverage, EnvelopeError};

use crate::cli::{Cli, ProfileArgs};
use crate::commands::CommandResult;
use crate::error::CliError;

pub async fn run(args: &ProfileArgs, cli: &Cli) -> Result<CommandResult, CliError> {
    let mut builder = if cli.mock {
        AggregatorBuilder::new().with_mock_mode()
    } else {
        AggregatorBuilder::new().with_real_clients()
    };

    builder = builder.with_collector_timeout(Duration::from_millis(cli.timeout_ms));
    if let Some(source) = cli.source.only() {
        builder = builder.with_only_source(source);
    }

    let aggregator = builder.build();
    let started = Instant::now();

    let quiet = cli.quiet;
    let progress = move |message: &str, fraction: f64| {
        if !quiet {
            eprintln!("[{:3.0}%] {message}", fraction * 100.0);
        }
    };

    let (record, outcomes) = aggregator
        .profile_with_outcomes(&args.company, Some(&progress))
        .await?;

    let latency_ms = started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64;

    let errors: Vec<EnvelopeError> = outcomes
        .failures()
        .map(|(source, error)| EnvelopeError::from_source_error(source, error))
        .collect();

    let coverage = record.metadata.coverage();
    let source_chain = if record.metadata.scraped_sources.is_empty() {
        aggregator.registered_sources()
    } else {
        record.metadata.scraped_sources.clone()
    };

    let data = serde_json::to_value(&record)?;
    let mut result = CommandResult::ok(data, source_chain)
        .with_errors(errors)
        .with_latency(latency_ms);

    match coverage {
        Coverage::Empty => {
            result = result.with_warning(format!(
                "no source produced data for '{}'",
                args.company.trim()
            ));
        }
        Coverage::Partial => {
            result = result.with_warning(format!(
                "partial data: {}/{} sources succeeded",
                record.metadata.successful_sources, record.metadata.total_sources
            ));
        }
        Coverage::Complete => {}
    }

    Ok(result)
}
