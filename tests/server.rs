#[cfg(test)]
mod tests {
    use orbita::api::IdentityChain;
    use orbita::db::db::Db;
    use orbita::libs::clock::FixedClock;
    use orbita::libs::config::IdentityConfig;
    use orbita::server::{router, AppState};
    use reqwest::{Client, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};
    use tokio::net::TcpListener;

    /// A live API on a random port, backed by a temporary database.
    struct ServerTestContext {
        _temp_dir: TempDir,
        base_url: String,
        client: Client,
    }

    impl AsyncTestContext for ServerTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("orbita.db");
            Db::open(&db_path).unwrap();

            let clock = Arc::new(FixedClock::at("2024-01-31T10:00:00-03:00").unwrap());
            let state = AppState::new(db_path, IdentityChain::from_config(&IdentityConfig::default()), clock);

            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let address = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, router(state)).await.unwrap();
            });

            ServerTestContext {
                _temp_dir: temp_dir,
                base_url: format!("http://{}", address),
                client: Client::new(),
            }
        }
    }

    impl ServerTestContext {
        fn url(&self, path: &str) -> String {
            format!("{}{}", self.base_url, path)
        }

        async fn create_task(&self, user: &str, body: Value) -> Value {
            let response = self
                .client
                .post(self.url("/tasks"))
                .header("x-user-id", user)
                .json(&body)
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            response.json().await.unwrap()
        }

        async fn get_json(&self, user: &str, path: &str) -> (StatusCode, Value) {
            let response = self.client.get(self.url(path)).header("x-user-id", user).send().await.unwrap();
            let status = response.status();
            (status, response.json().await.unwrap())
        }
    }

    #[test_context(ServerTestContext)]
    #[tokio::test]
    async fn test_requests_without_identity_are_rejected(ctx: &mut ServerTestContext) {
        let response = ctx.client.get(ctx.url("/tasks")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Not authenticated");
    }

    #[test_context(ServerTestContext)]
    #[tokio::test]
    async fn test_cookie_identity_is_accepted(ctx: &mut ServerTestContext) {
        let response = ctx
            .client
            .get(ctx.url("/tasks"))
            .header("cookie", "orbita_user_id=ana")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test_context(ServerTestContext)]
    #[tokio::test]
    async fn test_create_and_complete_task(ctx: &mut ServerTestContext) {
        let registered = ctx
            .client
            .post(ctx.url("/profile"))
            .header("x-user-id", "ana")
            .json(&json!({"name": "Ana"}))
            .send()
            .await
            .unwrap();
        assert_eq!(registered.status(), StatusCode::CREATED);

        let task = ctx
            .create_task("ana", json!({"title": "Yoga", "due_date": "2024-01-31", "xp": 120}))
            .await;
        assert_eq!(task["title"], "Yoga");
        assert_eq!(task["completed"], false);
        let id = task["id"].as_i64().unwrap();

        let response = ctx
            .client
            .patch(ctx.url(&format!("/tasks/{}/complete", id)))
            .header("x-user-id", "ana")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let completed: Value = response.json().await.unwrap();
        assert_eq!(completed["completed"], true);

        let (status, profile) = ctx.get_json("ana", "/profile").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["xp"], 120);
        assert_eq!(profile["level"], 2);
        assert_eq!(profile["next_level_xp"], 250);
        assert_eq!(profile["streak_days"], 1);

        let reopened = ctx
            .client
            .put(ctx.url(&format!("/tasks/{}", id)))
            .header("x-user-id", "ana")
            .json(&json!({"completed": false}))
            .send()
            .await
            .unwrap();
        assert_eq!(reopened.status(), StatusCode::BAD_REQUEST);

        let (_, stats) = ctx.get_json("ana", "/stats").await;
        assert_eq!(stats["total_tasks"], 1);
        assert_eq!(stats["completed_today"], 1);
        assert_eq!(stats["last_seven_days"].as_array().unwrap().len(), 7);
    }

    #[test_context(ServerTestContext)]
    #[tokio::test]
    async fn test_invalid_task_is_bad_request(ctx: &mut ServerTestContext) {
        let response = ctx
            .client
            .post(ctx.url("/tasks"))
            .header("x-user-id", "ana")
            .json(&json!({"title": "  ", "due_date": "2024-01-31"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("title"));
    }

    #[test_context(ServerTestContext)]
    #[tokio::test]
    async fn test_other_users_tasks_are_not_found(ctx: &mut ServerTestContext) {
        let task = ctx.create_task("ana", json!({"title": "Secret", "due_date": "2024-01-31"})).await;
        let id = task["id"].as_i64().unwrap();

        let (status, _) = ctx.get_json("bob", &format!("/tasks/{}", id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let response = ctx
            .client
            .patch(ctx.url(&format!("/tasks/{}/complete", id)))
            .header("x-user-id", "bob")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ctx
            .client
            .delete(ctx.url(&format!("/tasks/{}", id)))
            .header("x-user-id", "bob")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let (_, tasks) = ctx.get_json("bob", "/tasks").await;
        assert!(tasks.as_array().unwrap().is_empty());
        let (_, task) = ctx.get_json("ana", &format!("/tasks/{}", id)).await;
        assert_eq!(task["completed"], false);
    }

    #[test_context(ServerTestContext)]
    #[tokio::test]
    async fn test_list_filters_by_query(ctx: &mut ServerTestContext) {
        ctx.create_task("ana", json!({"title": "Today", "due_date": "2024-01-31"})).await;
        ctx.create_task("ana", json!({"title": "Tomorrow", "due_date": "2024-02-01", "recurring": true, "recurrence": "weekly"}))
            .await;

        let (_, today) = ctx.get_json("ana", "/tasks?date=2024-01-31").await;
        assert_eq!(today.as_array().unwrap().len(), 1);
        assert_eq!(today[0]["title"], "Today");

        let (_, recurring) = ctx.get_json("ana", "/tasks?status=recurring").await;
        assert_eq!(recurring.as_array().unwrap().len(), 1);
        assert_eq!(recurring[0]["recurrence"], "weekly");
    }

    #[test_context(ServerTestContext)]
    #[tokio::test]
    async fn test_defer_and_duplicate(ctx: &mut ServerTestContext) {
        let task = ctx.create_task("ana", json!({"title": "Dentist", "due_date": "2024-01-31"})).await;
        let id = task["id"].as_i64().unwrap();

        let response = ctx
            .client
            .patch(ctx.url(&format!("/tasks/{}/defer", id)))
            .header("x-user-id", "ana")
            .json(&json!({"due_date": "2024-02-03"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let deferred: Value = response.json().await.unwrap();
        assert_eq!(deferred["due_date"], "2024-02-03");
        assert_eq!(deferred["deferred_from"], "2024-01-31");

        // The body is optional
        let response = ctx
            .client
            .post(ctx.url(&format!("/tasks/{}/duplicate", id)))
            .header("x-user-id", "ana")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let copy: Value = response.json().await.unwrap();
        assert_ne!(copy["id"], deferred["id"]);
        assert_eq!(copy["due_date"], "2024-02-03");
    }

    #[test_context(ServerTestContext)]
    #[tokio::test]
    async fn test_streak_check_in(ctx: &mut ServerTestContext) {
        let check_in = |ctx: &ServerTestContext| {
            ctx.client
                .post(ctx.url("/streak/checkin"))
                .header("x-user-id", "ana")
                .send()
        };

        let skipped: Value = check_in(&*ctx).await.unwrap().json().await.unwrap();
        assert_eq!(skipped["checked_in"], false);
        assert_eq!(skipped["streak"], 0);

        let task = ctx.create_task("ana", json!({"title": "Walk", "due_date": "2024-01-31"})).await;
        ctx.client
            .patch(ctx.url(&format!("/tasks/{}/complete", task["id"])))
            .header("x-user-id", "ana")
            .send()
            .await
            .unwrap();

        let counted: Value = check_in(&*ctx).await.unwrap().json().await.unwrap();
        assert_eq!(counted["checked_in"], true);
        assert_eq!(counted["streak"], 1);
    }

    #[test_context(ServerTestContext)]
    #[tokio::test]
    async fn test_categories_and_tags(ctx: &mut ServerTestContext) {
        let response = ctx
            .client
            .post(ctx.url("/categories"))
            .header("x-user-id", "ana")
            .json(&json!({"name": "Work", "color": "#336699"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let category: Value = response.json().await.unwrap();

        let response = ctx
            .client
            .post(ctx.url("/tags"))
            .header("x-user-id", "ana")
            .json(&json!({"name": "deep"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let tag: Value = response.json().await.unwrap();

        let task = ctx
            .create_task(
                "ana",
                json!({"title": "Write", "due_date": "2024-01-31", "category_id": category["id"], "tag_ids": [tag["id"]]}),
            )
            .await;
        assert_eq!(task["category_id"], category["id"]);
        assert_eq!(task["tag_ids"], json!([tag["id"]]));

        let (_, categories) = ctx.get_json("bob", "/categories").await;
        assert!(categories.as_array().unwrap().is_empty());

        let response = ctx
            .client
            .delete(ctx.url(&format!("/categories/{}", category["id"])))
            .header("x-user-id", "ana")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (_, task) = ctx.get_json("ana", &format!("/tasks/{}", task["id"])).await;
        assert_eq!(task["category_id"], Value::Null);
    }
}
