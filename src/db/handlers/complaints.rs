//! Database repository for complaints.

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::complaints::{ComplaintCreateDBRequest, ComplaintDBResponse, ComplaintUpdateDBRequest},
    },
    types::{ComplaintId, ComplaintStatus, UserId},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

/// Filter for listing complaints. Results are newest-first.
#[derive(Debug, Clone)]
pub struct ComplaintFilter {
    pub skip: i64,
    pub limit: i64,
    pub user_id: Option<UserId>,
}

impl ComplaintFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, user_id: None }
    }

    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Complaint {
    pub id: ComplaintId,
    pub user_id: UserId,
    pub category_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub landmark: Option<String>,
    pub image_url: String,
    pub description: Option<String>,
    pub swachhata_complaint_id: Option<String>,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Complaint> for ComplaintDBResponse {
    fn from(c: Complaint) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            category_id: c.category_id,
            latitude: c.latitude,
            longitude: c.longitude,
            address: c.address,
            landmark: c.landmark,
            image_url: c.image_url,
            description: c.description,
            swachhata_complaint_id: c.swachhata_complaint_id,
            status: c.status,
            created_at: c.created_at,
        }
    }
}

pub struct Complaints<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Complaints<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Store the upstream ticket id and flip the complaint to `Synced`.
    #[instrument(skip(self), err)]
    pub async fn mark_synced(&mut self, id: ComplaintId, ticket_id: &str) -> Result<ComplaintDBResponse> {
        let update = ComplaintUpdateDBRequest {
            status: Some(ComplaintStatus::Synced),
            swachhata_complaint_id: Some(ticket_id.to_string()),
        };
        self.update(id, &update).await
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Complaints<'c> {
    type CreateRequest = ComplaintCreateDBRequest;
    type UpdateRequest = ComplaintUpdateDBRequest;
    type Response = ComplaintDBResponse;
    type Id = ComplaintId;
    type Filter = ComplaintFilter;

    #[instrument(skip(self, request), fields(user_id = request.user_id, category_id = request.category_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let complaint = sqlx::query_as::<_, Complaint>(
            r#"
            INSERT INTO complaints
                (user_id, category_id, latitude, longitude, address, landmark,
                 image_url, description, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(request.category_id)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(&request.address)
        .bind(&request.landmark)
        .bind(&request.image_url)
        .bind(&request.description)
        .bind(ComplaintStatus::PendingSync)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(complaint.into())
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let complaint = sqlx::query_as::<_, Complaint>("SELECT * FROM complaints WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(complaint.map(ComplaintDBResponse::from))
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        // Two static queries instead of dynamic SQL; the filter surface is tiny
        let complaints = match filter.user_id {
            Some(user_id) => {
                sqlx::query_as::<_, Complaint>(
                    "SELECT * FROM complaints WHERE user_id = ? ORDER BY id DESC LIMIT ? OFFSET ?",
                )
                .bind(user_id)
                .bind(filter.limit)
                .bind(filter.skip)
                .fetch_all(&mut *self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Complaint>("SELECT * FROM complaints ORDER BY id DESC LIMIT ? OFFSET ?")
                    .bind(filter.limit)
                    .bind(filter.skip)
                    .fetch_all(&mut *self.db)
                    .await?
            }
        };

        Ok(complaints.into_iter().map(ComplaintDBResponse::from).collect())
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let complaint = sqlx::query_as::<_, Complaint>(
            r#"
            UPDATE complaints
            SET status = COALESCE(?, status),
                swachhata_complaint_id = COALESCE(?, swachhata_complaint_id)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(request.status)
        .bind(&request.swachhata_complaint_id)
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(complaint.into())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM complaints WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
