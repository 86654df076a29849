use super::task::confirm;
use super::Context;
use crate::{
    db::tags::{TagInput, Tags},
    libs::{messages::Message, view::View},
    msg_info, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct TagArgs {
    #[command(subcommand)]
    command: Option<TagCommand>,
}

#[derive(Debug, Subcommand)]
enum TagCommand {
    Add {
        name: String,
        #[arg(short, long)]
        color: Option<String>,
    },
    List,
    Edit {
        id: i64,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
    },
    Delete {
        id: i64,
        #[arg(short, long)]
        yes: bool,
    },
}

pub fn cmd(context: &Context, args: TagArgs) -> Result<()> {
    let user = context.user()?;
    let mut tags = Tags::with_db(context.db()?);

    match args.command {
        Some(TagCommand::Add { name, color }) => {
            let tag = tags.create(&user, &TagInput::new(&name, color.as_deref()))?;
            msg_success!(Message::TagCreated(tag.name));
        }
        Some(TagCommand::List) | None => {
            let list = tags.list(&user)?;
            if list.is_empty() {
                msg_info!(Message::TagsNotFound);
                return Ok(());
            }
            View::tags(&list);
        }
        Some(TagCommand::Edit { id, name, color }) => {
            if name.is_none() && color.is_none() {
                msg_info!(Message::NoChangesDetected);
                return Ok(());
            }
            let current = tags.get(&user, id)?;
            let input = TagInput {
                name: name.unwrap_or(current.name),
                color: color.or(current.color),
            };
            let tag = tags.update(&user, id, &input)?;
            msg_success!(Message::TagUpdated(tag.name));
        }
        Some(TagCommand::Delete { id, yes }) => {
            let tag = tags.get(&user, id)?;
            if !yes && !confirm(Message::ConfirmDeleteTag(tag.name))? {
                msg_info!(Message::OperationCancelled);
                return Ok(());
            }
            tags.delete(&user, id)?;
            msg_success!(Message::TagDeleted(id));
        }
    }
    Ok(())
}
