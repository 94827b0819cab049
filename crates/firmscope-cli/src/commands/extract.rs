use std::io::Read;

use firmscope_core::{FieldExtractor, FieldKind, SourceId};

use crate::cli::ExtractArgs;
use crate::commands::CommandResult;
use crate::error::CliError;

pub fn run(args: &ExtractArgs) -> Result<CommandResult, CliError> {
    let text = if args.input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(&args.input)?
    };

    let hints: Vec<FieldKind> = args.hint.iter().map(|hint| (*hint).into()).collect();
    let record = FieldExtractor::new().extract(&text, &hints);

    let data = serde_json::to_value(&record)?;
    let mut result = CommandResult::ok(data, SourceId::ALL.to_vec());

    if record.is_empty() {
        result = result.with_warning("no recognizable facts in the input text");
    }

    Ok(result)
}
