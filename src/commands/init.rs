//! Configuration initialization command.
//!
//! Runs an interactive wizard pre-filled with the current settings, or with
//! `--defaults` writes the current (or default) settings without asking.

use crate::{
    libs::{config::Config, messages::Message},
    msg_success,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write the configuration without prompting
    #[arg(short, long)]
    defaults: bool,
}

pub fn cmd(init_args: InitArgs) -> Result<()> {
    if init_args.defaults {
        let path = Config::read()?.save()?;
        msg_success!(Message::ConfigInitialized(path.display().to_string()));
        return Ok(());
    }

    let path = Config::init()?.save()?;
    msg_success!(Message::ConfigSaved(path.display().to_string()));
    Ok(())
}
