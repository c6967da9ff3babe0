//! Database repository for users.

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
    types::UserId,
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
}

impl UserFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    pub id: UserId,
    pub mobile_number: String,
    pub full_name: String,
    pub swachhata_user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDBResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            mobile_number: user.mobile_number,
            full_name: user.full_name,
            swachhata_user_id: user.swachhata_user_id,
            created_at: user.created_at,
        }
    }
}

pub struct Users<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Look up a user by their registered mobile number.
    #[instrument(skip(self), err)]
    pub async fn get_by_mobile(&mut self, mobile_number: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE mobile_number = ?")
            .bind(mobile_number)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(UserDBResponse::from))
    }

    /// Record the upstream identity assigned after registration sync.
    #[instrument(skip(self), err)]
    pub async fn set_swachhata_user_id(&mut self, id: UserId, swachhata_user_id: i64) -> Result<()> {
        let result = sqlx::query("UPDATE users SET swachhata_user_id = ? WHERE id = ?")
            .bind(swachhata_user_id)
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(mobile_number = %request.mobile_number), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (mobile_number, full_name, swachhata_user_id, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&request.mobile_number)
        .bind(&request.full_name)
        .bind(request.swachhata_user_id)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user.into())
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(UserDBResponse::from))
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id LIMIT ? OFFSET ?")
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users.into_iter().map(UserDBResponse::from).collect())
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name = COALESCE(?, full_name),
                swachhata_user_id = COALESCE(?, swachhata_user_id)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&request.full_name)
        .bind(request.swachhata_user_id)
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(user.into())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_pool;

    fn request(mobile: &str, name: &str) -> UserCreateDBRequest {
        UserCreateDBRequest {
            mobile_number: mobile.to_string(),
            full_name: name.to_string(),
            swachhata_user_id: None,
        }
    }

    #[tokio::test]
    async fn create_and_fetch_by_mobile() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);

        let created = users.create(&request("9876543210", "Asha Rao")).await.unwrap();
        assert_eq!(created.full_name, "Asha Rao");
        assert!(created.swachhata_user_id.is_none());

        let fetched = users.get_by_mobile("9876543210").await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);

        assert!(users.get_by_mobile("0000000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_mobile_is_unique_violation() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);

        users.create(&request("9876543210", "Asha Rao")).await.unwrap();
        let err = users.create(&request("9876543210", "Someone Else")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn set_swachhata_user_id_round_trips() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);

        let created = users.create(&request("9876543210", "Asha Rao")).await.unwrap();
        users.set_swachhata_user_id(created.id, 123456).await.unwrap();

        let fetched = users.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.swachhata_user_id, Some(123456));

        let err = users.set_swachhata_user_id(9999, 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[tokio::test]
    async fn list_respects_pagination() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);

        for i in 0..5 {
            users.create(&request(&format!("900000000{i}"), &format!("User {i}"))).await.unwrap();
        }

        let page = users.list(&UserFilter::new(2, 2)).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].full_name, "User 2");
    }
}
