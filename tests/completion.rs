#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use orbita::db::db::Db;
    use orbita::db::tasks::Tasks;
    use orbita::db::users::{Registration, Users};
    use orbita::error::Error;
    use orbita::libs::clock::FixedClock;
    use orbita::libs::level::level_for_xp;
    use orbita::libs::task::{NewTask, Recurrence, TaskFilter, TaskPatch, TaskStatus, MAX_TASK_XP};
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct CompletionTestContext {
        _temp_dir: TempDir,
        path: PathBuf,
        clock: Arc<FixedClock>,
    }

    impl CompletionTestContext {
        fn db(&self) -> Db {
            Db::open(&self.path).unwrap().with_clock(self.clock.clone())
        }

        fn tasks(&self) -> Tasks {
            Tasks::with_db(self.db())
        }

        fn users(&self) -> Users {
            Users::with_db(self.db())
        }

        fn add(&self, title: &str, xp: i64) -> i64 {
            let mut fields = NewTask::new("ana", title, today());
            fields.xp = Some(xp);
            self.tasks().create("ana", fields).unwrap().id
        }
    }

    impl TestContext for CompletionTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let path = temp_dir.path().join("orbita.db");
            let clock = Arc::new(FixedClock::at("2024-01-31T10:00:00-03:00").unwrap());
            let ctx = CompletionTestContext {
                _temp_dir: temp_dir,
                path,
                clock,
            };
            ctx.users().register("ana", &Registration::default()).unwrap();
            ctx
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    #[test_context(CompletionTestContext)]
    #[test]
    fn test_first_completion_awards_xp(ctx: &mut CompletionTestContext) {
        let id = ctx.add("Read a chapter", 20);

        let completion = ctx.tasks().complete("ana", id).unwrap();
        assert!(completion.newly_completed);
        assert!(completion.task.completed);
        assert!(!completion.leveled_up);

        let record = completion.gamification.unwrap();
        assert_eq!(record.xp, 20);
        assert_eq!(record.level, 1);
        assert_eq!(record.streak_days, 1);
    }

    #[test_context(CompletionTestContext)]
    #[test]
    fn test_completing_twice_awards_once(ctx: &mut CompletionTestContext) {
        let id = ctx.add("Read a chapter", 20);
        let mut tasks = ctx.tasks();

        tasks.complete("ana", id).unwrap();
        let second = tasks.complete("ana", id).unwrap();

        assert!(!second.newly_completed);
        assert!(second.task.completed);
        assert!(second.gamification.is_none());
        assert!(second.check_in.is_none());

        let profile = ctx.users().profile("ana").unwrap();
        assert_eq!(profile.xp, 20);
        assert_eq!(profile.streak_days, 1);
    }

    #[test_context(CompletionTestContext)]
    #[test]
    fn test_completion_levels_up(ctx: &mut CompletionTestContext) {
        let warmup = ctx.add("Warm up", 90);
        let id = ctx.add("Run 5k", 20);
        let mut tasks = ctx.tasks();

        tasks.complete("ana", warmup).unwrap();
        let completion = tasks.complete("ana", id).unwrap();

        assert!(completion.leveled_up);
        let profile = ctx.users().profile("ana").unwrap();
        assert_eq!(profile.xp, 110);
        assert_eq!(profile.level, 2);
        assert_eq!(profile.next_level_xp, 250);
    }

    #[test_context(CompletionTestContext)]
    #[test]
    fn test_completion_of_foreign_task_is_not_found(ctx: &mut CompletionTestContext) {
        let id = ctx.add("Private", 20);

        let result = ctx.tasks().complete("bob", id);
        assert!(matches!(result, Err(Error::NotFound(_))));

        let task = ctx.tasks().get("ana", id).unwrap();
        assert!(!task.completed);
        assert_eq!(ctx.users().profile("ana").unwrap().xp, 0);
    }

    #[test_context(CompletionTestContext)]
    #[test]
    fn test_completion_of_missing_task_is_not_found(ctx: &mut CompletionTestContext) {
        let result = ctx.tasks().complete("ana", 4242);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test_context(CompletionTestContext)]
    #[test]
    fn test_completion_creates_user_record_on_demand(ctx: &mut CompletionTestContext) {
        let mut fields = NewTask::new("carla", "Stretch", today());
        fields.xp = Some(30);
        let task = ctx.tasks().create("carla", fields).unwrap();

        let completion = ctx.tasks().complete("carla", task.id).unwrap();
        assert_eq!(completion.gamification.unwrap().xp, 30);
        assert_eq!(ctx.users().gamification("carla").unwrap().xp, 30);
    }

    #[test_context(CompletionTestContext)]
    #[test]
    fn test_recurring_completion_rolls_over_once(ctx: &mut CompletionTestContext) {
        let mut fields = NewTask::new("ana", "Pay rent", today());
        fields.recurring = true;
        fields.recurrence = Some(Recurrence::Monthly);
        let source = ctx.tasks().create("ana", fields).unwrap();
        let mut tasks = ctx.tasks();

        let completion = tasks.complete("ana", source.id).unwrap();
        let next = completion.next_occurrence.unwrap();
        assert_eq!(next.due_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(next.recurring);
        assert!(!next.completed);
        assert!(next.tag_ids.is_empty());

        // Completing the source again must not schedule another occurrence
        let again = tasks.complete("ana", source.id).unwrap();
        assert!(again.next_occurrence.is_none());

        let filter = TaskFilter {
            status: TaskStatus::Recurring,
            ..Default::default()
        };
        assert_eq!(tasks.list("ana", &filter).unwrap().len(), 2);
    }

    #[test_context(CompletionTestContext)]
    #[test]
    fn test_failed_rollover_keeps_completion(ctx: &mut CompletionTestContext) {
        let mut fields = NewTask::new("ana", "Water plants", today());
        fields.recurring = true;
        fields.recurrence = Some(Recurrence::Weekly);
        fields.xp = Some(15);
        let source = ctx.tasks().create("ana", fields).unwrap();

        let db = ctx.db();
        db.conn
            .execute_batch(
                "CREATE TRIGGER fail_rollover BEFORE INSERT ON tasks
                 WHEN NEW.rollover_of IS NOT NULL
                 BEGIN SELECT RAISE(ABORT, 'rollover disabled'); END;",
            )
            .unwrap();

        let completion = Tasks::with_db(db).complete("ana", source.id).unwrap();
        assert!(completion.newly_completed);
        assert!(completion.next_occurrence.is_none());
        assert!(completion.check_in.is_some());

        let profile = ctx.users().profile("ana").unwrap();
        assert_eq!(profile.xp, 15);
        assert_eq!(profile.streak_days, 1);
        assert!(ctx.tasks().get("ana", source.id).unwrap().completed);
        assert_eq!(ctx.tasks().list("ana", &TaskFilter::default()).unwrap().len(), 1);
    }

    #[test_context(CompletionTestContext)]
    #[test]
    fn test_edit_to_completed_awards_xp(ctx: &mut CompletionTestContext) {
        let id = ctx.add("Call mom", 25);

        let patch = TaskPatch {
            title: Some("Call mom and dad".to_string()),
            completed: Some(true),
            ..Default::default()
        };
        let task = ctx.tasks().edit("ana", id, &patch).unwrap();

        assert!(task.completed);
        assert_eq!(task.title, "Call mom and dad");
        assert_eq!(ctx.users().profile("ana").unwrap().xp, 25);
    }

    #[test_context(CompletionTestContext)]
    #[test]
    fn test_completed_task_cannot_be_reopened(ctx: &mut CompletionTestContext) {
        let id = ctx.add("Read a chapter", 20);
        let mut tasks = ctx.tasks();
        tasks.complete("ana", id).unwrap();

        let reopen = TaskPatch {
            completed: Some(false),
            ..Default::default()
        };
        for _ in 0..3 {
            assert!(matches!(tasks.edit("ana", id, &reopen), Err(Error::Validation(_))));
            let again = tasks.complete("ana", id).unwrap();
            assert!(!again.newly_completed);
        }

        assert!(tasks.get("ana", id).unwrap().completed);
        let profile = ctx.users().profile("ana").unwrap();
        assert_eq!(profile.xp, 20);
        assert_eq!(profile.streak_days, 1);
    }

    #[test_context(CompletionTestContext)]
    #[test]
    fn test_completion_with_maximum_xp(ctx: &mut CompletionTestContext) {
        let id = ctx.add("Marathon", MAX_TASK_XP);

        let completion = ctx.tasks().complete("ana", id).unwrap();
        let record = completion.gamification.unwrap();
        assert_eq!(record.xp, MAX_TASK_XP);
        assert_eq!((record.level, record.next_level_xp), level_for_xp(MAX_TASK_XP));
        assert!(completion.leveled_up);
    }

    #[test_context(CompletionTestContext)]
    #[test]
    fn test_streak_extends_on_next_day(ctx: &mut CompletionTestContext) {
        let first = ctx.add("Day one", 10);
        ctx.tasks().complete("ana", first).unwrap();

        ctx.clock
            .set(chrono::DateTime::parse_from_rfc3339("2024-02-01T09:00:00-03:00").unwrap());
        let mut fields = NewTask::new("ana", "Day two", NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        fields.xp = Some(10);
        let second = ctx.tasks().create("ana", fields).unwrap();

        let completion = ctx.tasks().complete("ana", second.id).unwrap();
        let check_in = completion.check_in.unwrap();
        assert_eq!(check_in.streak, 2);
        assert!(check_in.extended);
    }
}
