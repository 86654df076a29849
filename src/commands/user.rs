use super::Context;
use crate::{
    db::users::{Registration, Users},
    libs::{messages::Message, view::View},
    msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct UserArgs {
    #[command(subcommand)]
    command: Option<UserCommand>,
}

#[derive(Debug, Subcommand)]
enum UserCommand {
    /// Create the profile (or update its name and email)
    Register {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Show level, XP and streak
    Show,
}

pub fn cmd(context: &Context, args: UserArgs) -> Result<()> {
    let user = context.user()?;
    let mut users = Users::with_db(context.db()?);

    match args.command {
        Some(UserCommand::Register { name, email }) => {
            let profile = users.register(&user, &Registration { name, email })?;
            msg_success!(Message::UserRegistered(profile.id.clone()));
            View::profile(&profile);
        }
        Some(UserCommand::Show) | None => {
            let profile = users.profile(&user)?;
            msg_print!(Message::ProfileHeader(profile.id.clone()), true);
            View::profile(&profile);
        }
    }
    Ok(())
}
