//! Display implementation for orbita messages.
//!
//! All user-facing text is defined here, in one match over [`Message`].
//! Messages read as short sentences; values are interpolated verbatim.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let s = match self {
            // === TASK MESSAGES ===
            Message::TaskCreated(id, owner) => format!("Task {} created for {}", id, owner),
            Message::TaskAdded(id, title) => format!("Task '{}' added with ID {}", title, id),
            Message::TaskUpdated(id) => format!("Task {} updated", id),
            Message::TaskDeleted(id) => format!("Task {} deleted", id),
            Message::TaskDeferred(id, date) => format!("Task {} moved to {}", id, date),
            Message::TaskDuplicated(id, date) => format!("Task duplicated as {} due {}", id, date),
            Message::TaskCompleted(title, xp) => format!("'{}' completed, +{} XP", title, xp),
            Message::TaskAlreadyCompleted(id) => format!("Task {} was already completed", id),
            Message::TasksNotFound => "No tasks found".to_string(),
            Message::TasksHeader(filter) => format!("Tasks ({})", filter),
            Message::ConfirmDeleteTask(title) => format!("Delete task '{}'?", title),
            Message::NoChangesDetected => "No changes given, nothing to update".to_string(),

            // === GAMIFICATION MESSAGES ===
            Message::LevelReached(user, level) => format!("User {} reached level {}", user, level),
            Message::LevelUp(level) => format!("Level up! You are now level {}", level),
            Message::StreakExtended(days) => format!("Streak extended: {} days in a row", days),
            Message::StreakStarted(days) => format!("Streak started: {} day", days),
            Message::CheckInSkipped(user) => format!("No task completed today by {}, check-in skipped", user),
            Message::CheckInNeedsCompletion(days) => {
                format!("Complete a task due today to check in (current streak: {} days)", days)
            }
            Message::StreakUpdateFailed(user, error) => format!("Streak update for {} failed: {}", user, error),
            Message::RolloverCreated(source, next, date) => {
                format!("Recurring task {} rolled over to task {} due {}", source, next, date)
            }
            Message::RolloverFailed(source, error) => format!("Rollover of task {} failed: {}", source, error),
            Message::NextOccurrence(date) => format!("Next occurrence scheduled for {}", date),

            // === CATEGORY & TAG MESSAGES ===
            Message::CategoryCreated(name) => format!("Category '{}' created", name),
            Message::CategoryUpdated(name) => format!("Category '{}' updated", name),
            Message::CategoryDeleted(id) => format!("Category {} deleted", id),
            Message::CategoriesNotFound => "No categories found".to_string(),
            Message::ConfirmDeleteCategory(name) => format!("Delete category '{}'? Its tasks are kept", name),
            Message::TagCreated(name) => format!("Tag '{}' created", name),
            Message::TagUpdated(name) => format!("Tag '{}' updated", name),
            Message::TagDeleted(id) => format!("Tag {} deleted", id),
            Message::TagsNotFound => "No tags found".to_string(),
            Message::ConfirmDeleteTag(name) => format!("Delete tag '{}'?", name),

            // === USER MESSAGES ===
            Message::UserRegistered(user) => format!("User '{}' registered", user),
            Message::ProfileHeader(user) => format!("Profile of {}", user),
            Message::NoUserSelected => "No user selected. Pass --user, set ORBITA_USER or configure default_user".to_string(),

            // === STATISTICS MESSAGES ===
            Message::StatsHeader => "Statistics".to_string(),
            Message::StatsCategoriesHeader => "By category".to_string(),
            Message::StatsWeekHeader => "Last 7 days".to_string(),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved(path) => format!("Configuration saved to {}", path),
            Message::ConfigInitialized(path) => format!("Default configuration written to {}", path),
            Message::ConfigFileNotFound(path) => format!("No configuration at {}, using defaults", path),
            Message::ConfigParseError(error) => format!("Failed to parse configuration: {}", error),

            // === DATABASE MESSAGES ===
            Message::DatabaseUpToDate => "Database schema is up to date".to_string(),
            Message::MigrationsFound(count) => format!("Found {} pending migrations", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationFailed(version, error) => format!("Migration v{} failed: {}", version, error),
            Message::AllMigrationsCompleted => "All migrations completed".to_string(),

            // === SERVER MESSAGES ===
            Message::ServerStarting(addr) => format!("Orbita API listening on http://{}", addr),
            Message::ServerStopped => "Server stopped".to_string(),
            Message::HeaderIdentityExposed(addr) => format!(
                "Listening on {} with trust_user_header enabled: any client can pick its user id with x-user-id",
                addr
            ),
            Message::RequestFailed(status, error) => format!("Request failed ({}): {}", status, error),
            Message::IdentityResolved(provider, user) => format!("{} resolved caller {}", provider, user),
            Message::IdentityProviderFailed(provider, error) => format!("Identity provider {} failed: {}", provider, error),
            Message::IdentityRejected(provider, status) => format!("Identity provider {} rejected token ({})", provider, status),

            // === GENERAL MESSAGES ===
            Message::OperationCancelled => "Operation cancelled".to_string(),
        };
        write!(f, "{}", s)
    }
}
