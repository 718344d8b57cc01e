use crate::registry::Registry;
use crate::shared::SharedStore;
use anyhow::Result;
use phonebook_config::AppConfig;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Arc;

pub mod errors;
pub mod phones;
pub mod serve;

pub const DEFAULT_ERROR_LIMIT: i64 = 20;

pub struct Context<'a> {
    pub registry: &'a Arc<Registry>,
    pub store: &'a SharedStore,
    pub json: bool,
    pub config: &'a AppConfig,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
