use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::registry::{AddManyReply, AddOneReply};
use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use phonebook_core::{BatchPayload, BatchReport, PersonInput, RawPhone};
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ListArgs {}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// JSON file with the entries, or `-` to read stdin
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
struct ReplyDto<'a> {
    outcome: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a BatchReport>,
}

pub async fn list(ctx: &Context<'_>, _args: ListArgs) -> Result<()> {
    let phones = ctx
        .registry
        .list_phones()
        .await
        .with_context(|| "list phones")?;
    if ctx.json {
        print_json(&phones)?;
    } else {
        for phone in phones {
            println!("{phone}");
        }
    }
    Ok(())
}

pub async fn add(ctx: &Context<'_>, args: AddArgs) -> Result<()> {
    let input = PersonInput {
        name: args.name,
        phone: Some(RawPhone::Text(args.phone)),
        email: args.email,
    };
    let reply = ctx.registry.add_one(&input).await;
    print_reply(ctx, reply.outcome(), reply.message(), None)?;

    match reply {
        AddOneReply::Saved | AddOneReply::AlreadyExists => Ok(()),
        AddOneReply::InvalidFormat => Err(invalid_input("phone number rejected")),
        AddOneReply::ErrorRecorded => Err(anyhow!("storage failure recorded")),
    }
}

pub async fn import(ctx: &Context<'_>, args: ImportArgs) -> Result<()> {
    let raw = read_source(&args.path)?;
    let payload = BatchPayload::from_json(&raw)
        .with_context(|| format!("parse {}", args.path.display()))?;
    let reply = ctx.registry.add_many(&payload).await;
    let message = reply.message();
    print_reply(ctx, reply.outcome(), &message, Some(reply.report()))?;

    match reply {
        AddManyReply::Saved(_) => Ok(()),
        AddManyReply::ErrorRecorded(_) => Err(anyhow!("storage failure recorded")),
    }
}

fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .with_context(|| "read stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn print_reply(
    ctx: &Context<'_>,
    outcome: &'static str,
    message: &str,
    report: Option<&BatchReport>,
) -> Result<()> {
    if ctx.json {
        print_json(&ReplyDto {
            outcome,
            message,
            report,
        })
    } else {
        println!("{message}");
        Ok(())
    }
}
