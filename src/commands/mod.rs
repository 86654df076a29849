//! Command-line interface.
//!
//! `orbita [--user ID] <command>`. The acting user comes from `--user`, then
//! `ORBITA_USER`, then `default_user` in the configuration file.
//!
//! ## Commands
//!
//! - `init`: write the configuration file
//! - `user`: register and show the profile
//! - `task`: add, list, show, edit, delete, complete, defer, duplicate
//! - `streak`: daily check-in
//! - `stats`: statistics tables
//! - `category`, `tag`: manage categories and tags
//! - `serve`: run the HTTP API

pub mod category;
pub mod init;
pub mod serve;
pub mod stats;
pub mod streak;
pub mod tag;
pub mod task;
pub mod user;

use crate::db::db::Db;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::msg_bail_anyhow;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Write the configuration file")]
    Init(init::InitArgs),
    #[command(about = "Register or show the current user")]
    User(user::UserArgs),
    #[command(about = "Manage tasks")]
    Task(task::TaskArgs),
    #[command(about = "Check in for today and show the streak")]
    Streak,
    #[command(about = "Show statistics")]
    Stats,
    #[command(about = "Manage categories")]
    Category(category::CategoryArgs),
    #[command(about = "Manage tags")]
    Tag(tag::TagArgs),
    #[command(about = "Run the HTTP API")]
    Serve(serve::ServeArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    /// User to act as
    #[arg(short, long, global = true, env = "ORBITA_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// What every command needs: the configuration and the selected user.
pub struct Context {
    pub config: Config,
    user: Option<String>,
}

impl Context {
    pub fn new(config: Config, user: Option<String>) -> Self {
        let user = user.or_else(|| config.default_user.clone()).filter(|user| !user.trim().is_empty());
        Self { config, user }
    }

    pub fn user(&self) -> Result<String> {
        match &self.user {
            Some(user) => Ok(user.clone()),
            None => msg_bail_anyhow!(Message::NoUserSelected),
        }
    }

    /// Opens the database with a clock in the configured streak timezone.
    pub fn db(&self) -> Result<Db> {
        Ok(Db::new()?.with_clock(Arc::new(self.config.clock())))
    }
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        let context = Context::new(Config::read()?, cli.user);

        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::User(args) => user::cmd(&context, args),
            Commands::Task(args) => task::cmd(&context, args),
            Commands::Streak => streak::cmd(&context),
            Commands::Stats => stats::cmd(&context),
            Commands::Category(args) => category::cmd(&context, args),
            Commands::Tag(args) => tag::cmd(&context, args),
            Commands::Serve(args) => serve::cmd(&context, args).await,
        }
    }
}
