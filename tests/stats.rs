#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use orbita::db::categories::{Categories, CategoryInput};
    use orbita::db::db::Db;
    use orbita::db::tasks::Tasks;
    use orbita::libs::clock::FixedClock;
    use orbita::libs::stats::{completion_rate, Statistics, CHART_DAYS};
    use orbita::libs::task::NewTask;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct StatsTestContext {
        _temp_dir: TempDir,
        path: PathBuf,
        clock: Arc<FixedClock>,
    }

    impl StatsTestContext {
        fn db(&self) -> Db {
            Db::open(&self.path).unwrap().with_clock(self.clock.clone())
        }
    }

    impl TestContext for StatsTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let path = temp_dir.path().join("orbita.db");
            StatsTestContext {
                _temp_dir: temp_dir,
                path,
                clock: Arc::new(FixedClock::at("2024-01-31T10:00:00-03:00").unwrap()),
            }
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_completion_rate() {
        assert_eq!(completion_rate(0, 0), 0.0);
        assert_eq!(completion_rate(1, 4), 25.0);
        assert_eq!(completion_rate(3, 3), 100.0);
    }

    #[test_context(StatsTestContext)]
    #[test]
    fn test_stats_without_tasks(ctx: &mut StatsTestContext) {
        let db = ctx.db();
        let stats = Statistics::collect(&db.conn, "ana", date(31)).unwrap();

        assert_eq!(stats.total_tasks, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.gamification.level, 1);
        assert!(stats.categories.is_empty());
        assert_eq!(stats.last_seven_days.len(), CHART_DAYS as usize);
        assert!(stats.last_seven_days.iter().all(|day| day.total == 0));
    }

    #[test_context(StatsTestContext)]
    #[test]
    fn test_stats_counts(ctx: &mut StatsTestContext) {
        let category = Categories::with_db(ctx.db())
            .create("ana", &CategoryInput::new("Study", "#0055ff"))
            .unwrap();
        let mut tasks = Tasks::with_db(ctx.db());

        let mut lesson = NewTask::new("ana", "Lesson", date(31));
        lesson.category_id = Some(category.id);
        lesson.xp = Some(30);
        let lesson = tasks.create("ana", lesson).unwrap();
        tasks.create("ana", NewTask::new("ana", "Flashcards", date(31))).unwrap();
        let old = tasks.create("ana", NewTask::new("ana", "Essay", date(29))).unwrap();
        // Outside the chart window
        tasks.create("ana", NewTask::new("ana", "Ancient", date(10))).unwrap();
        // Another owner never shows up
        tasks.create("bob", NewTask::new("bob", "Bob's", date(31))).unwrap();

        tasks.complete("ana", lesson.id).unwrap();
        tasks.complete("ana", old.id).unwrap();

        let db = ctx.db();
        let stats = Statistics::collect(&db.conn, "ana", date(31)).unwrap();

        assert_eq!(stats.total_tasks, 4);
        assert_eq!(stats.completed_tasks, 2);
        assert_eq!(stats.pending_tasks, 2);
        assert_eq!(stats.completion_rate, 50.0);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.gamification.xp, 50);

        assert_eq!(stats.categories.len(), 1);
        assert_eq!(stats.categories[0].name, "Study");
        assert_eq!(stats.categories[0].total, 1);
        assert_eq!(stats.categories[0].completed, 1);

        let days = &stats.last_seven_days;
        assert_eq!(days.first().unwrap().date, date(25));
        assert_eq!(days.last().unwrap().date, date(31));
        assert_eq!(days.last().unwrap().weekday, "Wed");
        assert_eq!((days[6].total, days[6].completed), (2, 1));
        assert_eq!((days[4].total, days[4].completed), (1, 1));
        assert_eq!(days.iter().map(|day| day.total).sum::<i64>(), 3);
    }
}
