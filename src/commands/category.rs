use super::task::confirm;
use super::Context;
use crate::{
    db::categories::{Categories, CategoryInput},
    libs::{messages::Message, view::View},
    msg_info, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct CategoryArgs {
    #[command(subcommand)]
    command: Option<CategoryCommand>,
}

#[derive(Debug, Subcommand)]
enum CategoryCommand {
    Add {
        name: String,
        #[arg(short, long)]
        color: String,
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

pub fn cmd(context: &Context, args: CategoryArgs) -> Result<()> {
    let user = context.user()?;
    let mut categories = Categories::with_db(context.db()?);

    match args.command {
        Some(CategoryCommand::Add { name, color }) => {
            let category = categories.create(&user, &CategoryInput::new(&name, &color))?;
            msg_success!(Message::CategoryCreated(category.name));
        }
        Some(CategoryCommand::List) | None => {
            let list = categories.list(&user)?;
            if list.is_empty() {
                msg_info!(Message::CategoriesNotFound);
                return Ok(());
            }
            View::categories(&list);
        }
        Some(CategoryCommand::Edit { id, name, color }) => {
            if name.is_none() && color.is_none() {
                msg_info!(Message::NoChangesDetected);
                return Ok(());
            }
            let current = categories.get(&user, id)?;
            let input = CategoryInput {
                name: name.unwrap_or(current.name),
                color: color.unwrap_or(current.color),
            };
            let category = categories.update(&user, id, &input)?;
            msg_success!(Message::CategoryUpdated(category.name));
        }
        Some(CategoryCommand::Delete { id, yes }) => {
            let category = categories.get(&user, id)?;
            if !yes && !confirm(Message::ConfirmDeleteCategory(category.name))? {
                msg_info!(Message::OperationCancelled);
                return Ok(());
            }
            categories.delete(&user, id)?;
            msg_success!(Message::CategoryDeleted(id));
        }
    }
    Ok(())
}
