use super::stats::Statistics;
use super::task::Task;
use crate::db::categories::Category;
use crate::db::tags::Tag;
use crate::db::users::Profile;
use prettytable::{format, row, Table};

pub struct View {}

impl View {
    pub fn tasks(tasks: &[Task]) {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);

        table.set_titles(row!["ID", "DUE", "TIME", "TITLE", "PRIORITY", "XP", "DONE", "REPEATS"]);
        for task in tasks {
            table.add_row(row![
                task.id,
                task.due_date,
                task.due_time.map(|t| t.format("%H:%M").to_string()).unwrap_or_default(),
                task.title,
                task.priority,
                r->task.xp,
                if task.completed { "✔" } else { "" },
                Self::repeats(task),
            ]);
        }
        table.printstd();
    }

    pub fn task(task: &Task) {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);

        table.add_row(row![b->"ID", task.id]);
        table.add_row(row![b->"Title", task.title]);
        table.add_row(row![b->"Description", task.description.as_deref().unwrap_or("-")]);
        table.add_row(row![b->"Due", Self::due(task)]);
        if let Some(original) = task.deferred_from {
            table.add_row(row![b->"Deferred from", original]);
        }
        table.add_row(row![b->"Priority", task.priority]);
        table.add_row(row![b->"XP", task.xp]);
        table.add_row(row![b->"Completed", if task.completed { "yes" } else { "no" }]);
        table.add_row(row![b->"Repeats", Self::repeats(task)]);
        table.add_row(row![b->"Category", task.category_id.map(|id| id.to_string()).unwrap_or_else(|| "-".into())]);
        table.add_row(row![b->"Tags", Self::ids(&task.tag_ids)]);
        table.printstd();
    }

    pub fn categories(categories: &[Category]) {
        let mut table = Table::new();
        table.set_titles(row!["ID", "NAME", "COLOR"]);
        for category in categories {
            table.add_row(row![category.id, category.name, category.color]);
        }
        table.printstd();
    }

    pub fn tags(tags: &[Tag]) {
        let mut table = Table::new();
        table.set_titles(row!["ID", "NAME", "COLOR"]);
        for tag in tags {
            table.add_row(row![tag.id, tag.name, tag.color.as_deref().unwrap_or("-")]);
        }
        table.printstd();
    }

    pub fn profile(profile: &Profile) {
        let gamification = profile.gamification();
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);

        table.add_row(row![b->"User", profile.id]);
        table.add_row(row![b->"Name", profile.name.as_deref().unwrap_or("-")]);
        table.add_row(row![b->"Email", profile.email.as_deref().unwrap_or("-")]);
        table.add_row(row![b->"Level", profile.level]);
        table.add_row(row![
            b->"XP",
            format!("{} / {} ({:.0}%)", profile.xp, profile.next_level_xp, gamification.progress_percent())
        ]);
        table.add_row(row![b->"Streak", format!("{} days", profile.streak_days)]);
        table.printstd();
    }

    /// Summary table. Category and weekly breakdowns are separate tables.
    pub fn stats(stats: &Statistics) {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);

        table.add_row(row![b->"Tasks", stats.total_tasks]);
        table.add_row(row![b->"Completed", stats.completed_tasks]);
        table.add_row(row![b->"Pending", stats.pending_tasks]);
        table.add_row(row![b->"Completion rate", format!("{:.1}%", stats.completion_rate)]);
        table.add_row(row![b->"Completed today", stats.completed_today]);
        table.add_row(row![b->"Level", stats.gamification.level]);
        table.add_row(row![b->"XP", format!("{} / {}", stats.gamification.xp, stats.gamification.next_level_xp)]);
        table.add_row(row![b->"Streak", format!("{} days", stats.gamification.streak_days)]);
        table.printstd();
    }

    pub fn category_stats(stats: &Statistics) {
        let mut table = Table::new();
        table.set_titles(row!["CATEGORY", "COLOR", "TOTAL", "DONE"]);
        for category in &stats.categories {
            table.add_row(row![category.name, category.color, r->category.total, r->category.completed]);
        }
        table.printstd();
    }

    pub fn week_stats(stats: &Statistics) {
        let mut table = Table::new();
        table.set_titles(row!["DAY", "DATE", "TOTAL", "DONE"]);
        for day in &stats.last_seven_days {
            table.add_row(row![day.weekday, day.date, r->day.total, r->day.completed]);
        }
        table.printstd();
    }

    fn due(task: &Task) -> String {
        match task.due_time {
            Some(time) => format!("{} {}", task.due_date, time.format("%H:%M")),
            None => task.due_date.to_string(),
        }
    }

    fn repeats(task: &Task) -> String {
        match (task.recurring, task.recurrence) {
            (true, Some(pattern)) => pattern.to_string(),
            (true, None) => "daily".to_string(),
            (false, _) => String::new(),
        }
    }

    fn ids(ids: &[i64]) -> String {
        if ids.is_empty() {
            return "-".to_string();
        }
        ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
    }
}
