/// Every user-facing and logged message in orbita.
///
/// Variants carry the values they interpolate; the text lives in the
/// `Display` implementation in `display.rs`.
#[derive(Debug, Clone)]
pub enum Message {
    // === TASK MESSAGES ===
    TaskCreated(i64, String), // id, owner
    TaskAdded(i64, String),   // id, title
    TaskUpdated(i64),
    TaskDeleted(i64),
    TaskDeferred(i64, String),   // id, new due date
    TaskDuplicated(i64, String), // new id, due date
    TaskCompleted(String, i64),  // title, xp
    TaskAlreadyCompleted(i64),
    TasksNotFound,
    TasksHeader(String), // filter description
    ConfirmDeleteTask(String),
    NoChangesDetected,

    // === GAMIFICATION MESSAGES ===
    LevelReached(String, i64), // user, level
    LevelUp(i64),
    StreakExtended(i64),
    StreakStarted(i64),
    CheckInSkipped(String),
    CheckInNeedsCompletion(i64),
    StreakUpdateFailed(String, String), // user, error
    RolloverCreated(i64, i64, String),  // source id, new id, due date
    RolloverFailed(i64, String),        // source id, error
    NextOccurrence(String),             // due date

    // === CATEGORY & TAG MESSAGES ===
    CategoryCreated(String),
    CategoryUpdated(String),
    CategoryDeleted(i64),
    CategoriesNotFound,
    ConfirmDeleteCategory(String),
    TagCreated(String),
    TagUpdated(String),
    TagDeleted(i64),
    TagsNotFound,
    ConfirmDeleteTag(String),

    // === USER MESSAGES ===
    UserRegistered(String),
    ProfileHeader(String),
    NoUserSelected,

    // === STATISTICS MESSAGES ===
    StatsHeader,
    StatsCategoriesHeader,
    StatsWeekHeader,

    // === CONFIGURATION MESSAGES ===
    ConfigSaved(String), // path
    ConfigInitialized(String),
    ConfigFileNotFound(String),
    ConfigParseError(String),

    // === DATABASE MESSAGES ===
    DatabaseUpToDate,
    MigrationsFound(usize),
    RunningMigration(u32, String),
    MigrationFailed(u32, String),
    AllMigrationsCompleted,

    // === SERVER MESSAGES ===
    ServerStarting(String),
    ServerStopped,
    HeaderIdentityExposed(String), // bind address
    RequestFailed(String, String), // status, error
    IdentityResolved(String, String), // provider, user
    IdentityProviderFailed(String, String), // provider, error
    IdentityRejected(String, u16),          // provider, status

    // === GENERAL MESSAGES ===
    OperationCancelled,
}
