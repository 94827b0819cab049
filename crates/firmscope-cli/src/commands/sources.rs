use firmscope_core::{SourceId, SOURCE_PRIORITY};
use serde_json::json;

use crate::cli::SourcesArgs;
use crate::commands::CommandResult;
use crate::error::CliError;

pub fn run(args: &SourcesArgs) -> Result<CommandResult, CliError> {
    let listing: Vec<serde_json::Value> = SOURCE_PRIORITY
        .iter()
        .enumerate()
        .map(|(rank, source)| {
            if args.verbose {
                json!({
                    "id": source.as_str(),
                    "label": source.label(),
                    "priority": rank + 1,
                    "role": source.role(),
                })
            } else {
                json!({
                    "id": source.as_str(),
                    "priority": rank + 1,
                })
            }
        })
        .collect();

    Ok(CommandResult::ok(
        json!({ "sources": listing }),
        SourceId::ALL.to_vec(),
    ))
}
