use super::Context;
use crate::{
    db::tasks::Tasks,
    libs::{
        messages::Message,
        task::{parse_date, parse_time, NewTask, Priority, Recurrence, TaskFilter, TaskPatch, TaskStatus},
        view::View,
    },
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};

#[derive(Debug, Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    command: TaskCommand,
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    /// Create a task
    Add {
        title: String,
        /// Due date (YYYY-MM-DD), today when omitted
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Due time (HH:MM)
        #[arg(short, long)]
        time: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        category: Option<i64>,
        #[arg(long = "tag")]
        tags: Vec<i64>,
        #[arg(short, long)]
        xp: Option<i64>,
        /// daily, weekly, biweekly or monthly
        #[arg(short, long)]
        recurrence: Option<Recurrence>,
        /// low, medium or high
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// List tasks due today, or on --date
    List {
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// pending, completed, recurring or all
        #[arg(short, long, default_value = "all")]
        status: TaskStatus,
        #[arg(short, long)]
        category: Option<i64>,
        #[arg(long)]
        tag: Option<i64>,
        /// Ignore the date and list every task
        #[arg(short, long)]
        all: bool,
    },
    /// Show one task
    Show { id: i64 },
    /// Change fields of a task
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(short, long)]
        time: Option<String>,
        #[arg(short, long)]
        category: Option<i64>,
        #[arg(long = "tag")]
        tags: Option<Vec<i64>>,
        #[arg(short, long)]
        xp: Option<i64>,
        #[arg(short, long)]
        recurrence: Option<Recurrence>,
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Mark as completed
        #[arg(long)]
        done: bool,
    },
    /// Delete a task
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Complete a task and collect its XP
    Complete { id: i64 },
    /// Move a task to another day
    Defer {
        id: i64,
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Copy a task, tags included
    Duplicate {
        id: i64,
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
}

pub fn cmd(context: &Context, args: TaskArgs) -> Result<()> {
    let user = context.user()?;
    let db = context.db()?;
    let today = db.clock.today();
    let mut tasks = Tasks::with_db(db);

    match args.command {
        TaskCommand::Add {
            title,
            date,
            time,
            description,
            category,
            tags,
            xp,
            recurrence,
            priority,
        } => {
            let fields = NewTask {
                title,
                description,
                category_id: category,
                tag_ids: tags,
                due_date: Some(date.unwrap_or(today)),
                due_time: time.as_deref().map(parse_time).transpose()?,
                xp,
                recurring: recurrence.is_some(),
                recurrence,
                priority,
                ..Default::default()
            };
            let task = tasks.create(&user, fields)?;
            msg_success!(Message::TaskAdded(task.id, task.title.clone()));
        }
        TaskCommand::List {
            date,
            status,
            category,
            tag,
            all,
        } => {
            let date = if all { None } else { Some(date.unwrap_or(today)) };
            let filter = TaskFilter {
                date,
                status,
                category_id: category,
                tag_id: tag,
            };
            let list = tasks.list(&user, &filter)?;
            if list.is_empty() {
                msg_info!(Message::TasksNotFound);
                return Ok(());
            }

            let scope = date.map(|d| d.to_string()).unwrap_or_else(|| "all dates".to_string());
            msg_print!(Message::TasksHeader(scope), true);
            View::tasks(&list);
        }
        TaskCommand::Show { id } => {
            View::task(&tasks.get(&user, id)?);
        }
        TaskCommand::Edit {
            id,
            title,
            description,
            date,
            time,
            category,
            tags,
            xp,
            recurrence,
            priority,
            done,
        } => {
            let patch = TaskPatch {
                title,
                description: description.map(Some),
                category_id: category.map(Some),
                tag_ids: tags,
                due_date: date,
                due_time: time.as_deref().map(parse_time).transpose()?.map(Some),
                completed: done.then_some(true),
                xp,
                recurring: recurrence.map(|_| true),
                recurrence: recurrence.map(Some),
                priority,
                ..Default::default()
            };
            if patch.is_empty() {
                msg_info!(Message::NoChangesDetected);
                return Ok(());
            }
            let task = tasks.edit(&user, id, &patch)?;
            msg_success!(Message::TaskUpdated(task.id));
        }
        TaskCommand::Delete { id, yes } => {
            let task = tasks.get(&user, id)?;
            if !yes && !confirm(Message::ConfirmDeleteTask(task.title))? {
                msg_info!(Message::OperationCancelled);
                return Ok(());
            }
            tasks.delete(&user, id)?;
            msg_success!(Message::TaskDeleted(id));
        }
        TaskCommand::Complete { id } => {
            let completion = tasks.complete(&user, id)?;
            if !completion.newly_completed {
                msg_info!(Message::TaskAlreadyCompleted(id));
                return Ok(());
            }

            msg_success!(Message::TaskCompleted(completion.task.title.clone(), completion.task.xp));
            if let (true, Some(gamification)) = (completion.leveled_up, &completion.gamification) {
                msg_success!(Message::LevelUp(gamification.level));
            }
            if let Some(check_in) = completion.check_in {
                if check_in.extended {
                    msg_info!(Message::StreakExtended(check_in.streak));
                } else {
                    msg_info!(Message::StreakStarted(check_in.streak));
                }
            }
            if let Some(next) = &completion.next_occurrence {
                msg_info!(Message::NextOccurrence(next.due_date.to_string()));
            }
        }
        TaskCommand::Defer { id, date } => {
            let task = tasks.defer(&user, id, date)?;
            msg_success!(Message::TaskDeferred(task.id, task.due_date.to_string()));
        }
        TaskCommand::Duplicate { id, date } => {
            let copy = tasks.duplicate(&user, id, date)?;
            msg_success!(Message::TaskDuplicated(copy.id, copy.due_date.to_string()));
        }
    }
    Ok(())
}

pub(crate) fn confirm(prompt: Message) -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt.to_string())
        .default(false)
        .interact()?)
}
