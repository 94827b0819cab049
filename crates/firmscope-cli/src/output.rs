use firmscope_core::Envelope;
use serde_json::Value;

use crate::error::CliError;

/// Print the envelope to stdout as JSON.
pub fn render(envelope: &Envelope<Value>, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(envelope)?
    } else {
        serde_json::to_string(envelope)?
    };

    println!("{rendered}");
    Ok(())
}
