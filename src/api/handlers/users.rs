//! HTTP handlers for registration and the admin user listing.

use axum::{
    extract::{Form, Query, State},
    response::Redirect,
    Json,
};
use tracing::warn;

use crate::{
    api::handlers::redirect_with_msg,
    api::models::{pagination::Pagination, users::RegisterForm, users::UserResponse},
    db::{
        errors::DbError,
        handlers::{users::UserFilter, Repository, Users},
        models::users::UserCreateDBRequest,
    },
    errors::Result,
    AppState,
};

/// Handle the registration form.
///
/// Registration is idempotent on the mobile number: a known number short
/// circuits to a welcome-back banner. Upstream registration is attempted
/// before the local insert but its failure never blocks the user.
#[tracing::instrument(skip_all, fields(mobile_number = %form.mobile_number))]
pub async fn register_user(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Result<Redirect> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut users = Users::new(&mut conn);

    if let Some(existing) = users.get_by_mobile(&form.mobile_number).await? {
        return Ok(redirect_with_msg("/", &format!("Welcome back, {}", existing.full_name)));
    }

    let swachhata_user_id = match state.swachhata.register_user(&form.full_name, &form.mobile_number).await {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(error = %e, "upstream registration failed, user saved without sync");
            None
        }
    };

    users
        .create(&UserCreateDBRequest {
            mobile_number: form.mobile_number,
            full_name: form.full_name,
            swachhata_user_id,
        })
        .await?;

    Ok(redirect_with_msg("/", "Registration Successful!"))
}

/// List registered users.
#[utoipa::path(
    get,
    path = "/users",
    tag = "admin",
    params(Pagination),
    responses(
        (status = 200, description = "Registered users", body = [UserResponse])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>, Query(pagination): Query<Pagination>) -> Result<Json<Vec<UserResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut users = Users::new(&mut conn);

    let listed = users.list(&UserFilter::new(pagination.skip, pagination.limit)).await?;
    Ok(Json(listed.into_iter().map(UserResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use crate::{api::models::users::RegisterForm, test_utils::create_test_app};
    use axum::http::StatusCode;

    fn form(name: &str, mobile: &str) -> RegisterForm {
        RegisterForm {
            full_name: name.to_string(),
            mobile_number: mobile.to_string(),
        }
    }

    #[tokio::test]
    async fn new_registration_redirects_home_with_banner() {
        let server = create_test_app().await;

        let response = server.post("/register").form(&form("Asha Rao", "9876543210")).await;

        response.assert_status(StatusCode::SEE_OTHER);
        let location = response.headers().get("location").unwrap().to_str().unwrap();
        assert!(location.starts_with("/?msg="));
        assert!(location.contains("Registration"));
    }

    #[tokio::test]
    async fn repeat_registration_welcomes_back() {
        let server = create_test_app().await;

        server.post("/register").form(&form("Asha Rao", "9876543210")).await;
        let response = server.post("/register").form(&form("Asha Rao", "9876543210")).await;

        response.assert_status(StatusCode::SEE_OTHER);
        let location = response.headers().get("location").unwrap().to_str().unwrap();
        assert!(location.contains("Welcome+back"));
        assert!(location.contains("Asha"));
    }

    #[tokio::test]
    async fn registered_user_appears_in_admin_listing_with_upstream_id() {
        let server = create_test_app().await;

        server.post("/register").form(&form("Asha Rao", "9876543210")).await;

        let response = server.get("/admin/api/v1/users").await;
        response.assert_status(StatusCode::OK);

        let users: serde_json::Value = response.json();
        assert_eq!(users.as_array().unwrap().len(), 1);
        assert_eq!(users[0]["full_name"], "Asha Rao");
        assert_eq!(users[0]["mobile_number"], "9876543210");
        // The simulated upstream client always assigns a six-digit id
        let upstream = users[0]["swachhata_user_id"].as_i64().unwrap();
        assert!((100_000..=999_999).contains(&upstream));
    }
}
