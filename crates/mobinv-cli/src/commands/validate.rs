//! Validate command - check IMEI numbers.

use clap::Args;
use console::style;

use mobinv_core::{format_imei, validate_imei};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// IMEIs to validate (separators allowed)
    #[arg(required = true, num_args = 1..)]
    imeis: Vec<String>,

    /// Output JSON instead of text
    #[arg(long)]
    json: bool,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let results: Vec<_> = args.imeis.iter().map(|imei| (imei, validate_imei(imei))).collect();

    if args.json {
        let values: Vec<serde_json::Value> = results
            .iter()
            .map(|(input, result)| -> anyhow::Result<serde_json::Value> {
                let mut value = serde_json::to_value(result)?;
                value["input"] = serde_json::Value::String((*input).clone());
                Ok(value)
            })
            .collect::<anyhow::Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else {
        for (input, result) in &results {
            match (&result.clean_imei, &result.error_message) {
                (Some(clean), _) => println!("{} {}", style("✓").green(), format_imei(clean)),
                (None, message) => println!(
                    "{} {}: {}",
                    style("✗").red(),
                    input,
                    message.as_deref().unwrap_or("invalid")
                ),
            }
        }
    }

    let invalid = results.iter().filter(|(_, r)| !r.is_valid).count();
    if invalid > 0 {
        anyhow::bail!("{} of {} IMEIs are invalid", invalid, results.len());
    }

    Ok(())
}
