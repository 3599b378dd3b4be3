//! API route table.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::extractors::AppState;
use crate::handlers::{
    announcements, assigned_tasks, auth, cylinders, files, tasks, tickets, users, zones,
};

/// Assemble the complete API router
pub fn router(state: AppState) -> Router {
    Router::new().nest("/api", api_router()).with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/zones", zones_router())
        .nest("/users", users_router())
        .nest("/auth", auth_router())
        .nest("/files", files_router())
        .nest("/tickets", tickets_router())
        .nest("/tasks", tasks_router())
        .nest("/announcements", announcements_router())
        .route("/assignedTasks", post(assigned_tasks::create_assigned_task))
        .route(
            "/assignedTasks/:task_id/complete",
            patch(assigned_tasks::complete_assigned_task),
        )
        .route(
            "/user/assignedTasks",
            get(assigned_tasks::list_user_assigned_tasks),
        )
        .nest("/locations", locations_router())
        .nest("/categories", categories_router())
        .route("/cylinder-expiry", post(cylinders::create_cylinder_record))
        .route(
            "/cylinder-expiry/:zone/:branch",
            get(cylinders::list_cylinder_records),
        )
        .route(
            "/cylinder-expiry/:id",
            delete(cylinders::delete_cylinder_record),
        )
}

fn zones_router() -> Router<AppState> {
    Router::new()
        .route("/", get(zones::list_zones))
        .route("/:zone_name/branches", get(zones::list_zone_branches))
        .route("/:zone_name/addBranch", post(zones::add_branch))
        .route("/:zone_id/editBranch", put(zones::edit_branch))
        .route("/:zone_id/deleteBranch", delete(zones::delete_branch))
}

fn users_router() -> Router<AppState> {
    Router::new()
        .route("/", post(users::create_user).get(users::list_users))
        .route("/multiple", post(users::create_multiple_users))
        .route("/:id", put(users::update_user).delete(users::delete_user))
        .route("/:id/modules", put(users::update_user_modules))
        .route("/:id/resetPassword", put(users::reset_password))
}

fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/signin", post(auth::signin))
        .route("/check-session", get(auth::check_session))
}

fn files_router() -> Router<AppState> {
    Router::new()
        .route("/download/:filename", get(files::download_file))
        .route(
            "/:category/:zone/:branch",
            get(files::list_files).post(files::upload_file),
        )
        .route(
            "/:category/:zone/:branch/:filename",
            delete(files::delete_file),
        )
}

fn tickets_router() -> Router<AppState> {
    Router::new()
        .route("/", post(tickets::create_ticket).get(tickets::list_tickets))
        .route("/:ticket_number", get(tickets::get_ticket).delete(tickets::delete_ticket))
        .route("/:ticket_number/status", put(tickets::update_ticket_status))
}

fn tasks_router() -> Router<AppState> {
    Router::new()
        .route("/", post(tasks::create_task).get(tasks::list_tasks))
        .route(
            "/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
}

fn announcements_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(announcements::create_announcement).get(announcements::list_announcements),
        )
        .route("/latest", get(announcements::latest_announcement))
}

fn locations_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cylinders::list_locations).post(cylinders::create_location),
        )
        .route(
            "/:id",
            put(cylinders::update_location).delete(cylinders::delete_location),
        )
}

fn categories_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cylinders::list_categories).post(cylinders::create_category),
        )
        .route(
            "/:id",
            put(cylinders::update_category).delete(cylinders::delete_category),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use hq_auth::SessionTokens;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let tokens = Arc::new(SessionTokens::new(b"test-secret"));
        router(AppState::detached(tokens, "example.com"))
    }

    #[tokio::test]
    async fn test_check_session_without_token() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/auth/check-session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_check_session_with_valid_token() {
        let tokens = Arc::new(SessionTokens::new(b"test-secret"));
        let app = router(AppState::detached(Arc::clone(&tokens), "example.com"));
        let token = tokens.create_token(1, None, 3600).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/check-session")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_user_missing_fields() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/users")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"firstName": "Only"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_assigned_tasks_require_zone_and_branch() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/user/assignedTasks")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cylinder_expiry_requires_zone_and_branch() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/cylinder-expiry")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"location": "Kitchen"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
