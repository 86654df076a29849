#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, Utc};
    use orbita::db::db::Db;
    use orbita::db::store::RecordStore;
    use orbita::libs::recurrence::{next_due_date, rollover};
    use orbita::libs::task::{NewTask, Recurrence};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-31T13:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_fixed_intervals() {
        let due = date(2024, 1, 10);
        assert_eq!(next_due_date(due, Some(Recurrence::Daily)), date(2024, 1, 11));
        assert_eq!(next_due_date(due, Some(Recurrence::Weekly)), date(2024, 1, 17));
        assert_eq!(next_due_date(due, Some(Recurrence::Biweekly)), date(2024, 1, 24));
        assert_eq!(next_due_date(due, Some(Recurrence::Monthly)), date(2024, 2, 10));
    }

    #[test]
    fn test_missing_pattern_advances_one_day() {
        assert_eq!(next_due_date(date(2024, 12, 31), None), date(2025, 1, 1));
    }

    #[test]
    fn test_monthly_clamps_to_month_end() {
        assert_eq!(next_due_date(date(2024, 1, 31), Some(Recurrence::Monthly)), date(2024, 2, 29));
        assert_eq!(next_due_date(date(2023, 1, 31), Some(Recurrence::Monthly)), date(2023, 2, 28));
        assert_eq!(next_due_date(date(2024, 3, 31), Some(Recurrence::Monthly)), date(2024, 4, 30));
    }

    #[test]
    fn test_rollover_copies_fields_and_is_keyed() {
        let db = Db::in_memory().unwrap();

        let mut fields = NewTask::new("ana", "Pay rent", date(2024, 1, 31));
        fields.recurring = true;
        fields.recurrence = Some(Recurrence::Monthly);
        fields.xp = Some(40);
        let source = db.conn.create_task(&fields, now()).unwrap();

        let next = rollover(&db.conn, &source, now()).unwrap();
        assert_ne!(next.id, source.id);
        assert_eq!(next.title, "Pay rent");
        assert_eq!(next.due_date, date(2024, 2, 29));
        assert_eq!(next.xp, 40);
        assert!(next.recurring);
        assert!(!next.completed);
        assert_eq!(next.recurrence, Some(Recurrence::Monthly));

        // A repeated rollover returns the occurrence that already exists
        let again = rollover(&db.conn, &source, now()).unwrap();
        assert_eq!(again.id, next.id);
    }
}
