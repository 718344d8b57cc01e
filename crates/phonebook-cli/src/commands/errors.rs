use crate::commands::{print_json, Context, DEFAULT_ERROR_LIMIT};
use crate::error::invalid_input;
use anyhow::{Context as _, Result};
use clap::Args;
use phonebook_core::ErrorRecord;

#[derive(Debug, Args)]
pub struct ErrorsArgs {
    #[arg(long, default_value_t = DEFAULT_ERROR_LIMIT)]
    pub limit: i64,
}

pub fn list_errors(ctx: &Context<'_>, args: ErrorsArgs) -> Result<()> {
    if args.limit <= 0 {
        return Err(invalid_input("limit must be positive"));
    }
    let entries = ctx
        .store
        .with(|store| store.error_logs().list_recent(args.limit))
        .with_context(|| "list error records")?;

    if ctx.json {
        let records: Vec<&ErrorRecord> = entries.iter().map(|entry| &entry.record).collect();
        return print_json(&records);
    }

    if entries.is_empty() {
        println!("no errors recorded");
        return Ok(());
    }
    for entry in entries {
        println!("{} {}", entry.record.occurred_at, entry.record.message);
        println!("  input: {}", entry.record.input);
    }
    Ok(())
}
