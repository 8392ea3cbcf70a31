//! PostgreSQL review store (for deployments).

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{
    PullRequest, PullRequestRecord, PullRequestShort, PullRequestStatus, Team, TeamMember, User,
    UserActivity,
};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};

use crate::{ReviewStore, ReviewStoreError, ReviewStoreResult, ReviewTransaction, SCHEMA_SQL};

type PullRequestRow = (
    String,
    String,
    String,
    String,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

fn parse_status(status: &str) -> ReviewStoreResult<PullRequestStatus> {
    PullRequestStatus::parse(status)
        .ok_or_else(|| ReviewStoreError::Corrupt(format!("unknown pull request status {status:?}")))
}

fn record_from_row(row: PullRequestRow) -> ReviewStoreResult<PullRequestRecord> {
    let (pull_request_id, pull_request_name, author_id, status, created_at, merged_at) = row;
    Ok(PullRequestRecord {
        pull_request_id,
        pull_request_name,
        author_id,
        status: parse_status(&status)?,
        created_at,
        merged_at,
    })
}

/// PostgreSQL review store.
#[derive(Debug, Clone)]
pub struct PostgresReviewStore {
    pool: PgPool,
}

impl PostgresReviewStore {
    /// Creates a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> ReviewStoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Creates the tables if they do not exist yet.
    pub async fn init(&self) -> ReviewStoreResult<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        tracing::debug!("Review store schema ready");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Transaction over a [`PostgresReviewStore`].
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ReviewTransaction for PostgresTransaction {
    async fn user_team(&mut self, user_id: &str) -> ReviewStoreResult<Option<String>> {
        let team: Option<String> =
            sqlx::query_scalar("SELECT team_name FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&mut *self.tx)
                .await?;
        Ok(team)
    }

    async fn pull_request_exists(&mut self, pull_request_id: &str) -> ReviewStoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM pull_requests WHERE pull_request_id = $1)",
        )
        .bind(pull_request_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }

    async fn select_active_teammates(
        &mut self,
        team_name: &str,
        exclude_user_id: &str,
        exclude: &[String],
    ) -> ReviewStoreResult<Vec<String>> {
        let candidates: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM users
            WHERE team_name = $1
              AND is_active = TRUE
              AND user_id <> $2
              AND user_id <> ALL($3)
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .bind(exclude_user_id)
        .bind(exclude)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(candidates)
    }

    async fn insert_pull_request(
        &mut self,
        pull_request_id: &str,
        pull_request_name: &str,
        author_id: &str,
        status: PullRequestStatus,
    ) -> ReviewStoreResult<DateTime<Utc>> {
        let created_at: DateTime<Utc> = sqlx::query_scalar(
            r#"
            INSERT INTO pull_requests (pull_request_id, pull_request_name, author_id, status)
            VALUES ($1, $2, $3, $4)
            RETURNING created_at
            "#,
        )
        .bind(pull_request_id)
        .bind(pull_request_name)
        .bind(author_id)
        .bind(status.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| ReviewStoreError::from_insert(e, "PullRequest", pull_request_id))?;
        Ok(created_at)
    }

    async fn set_reviewers(
        &mut self,
        pull_request_id: &str,
        reviewers: &[String],
    ) -> ReviewStoreResult<()> {
        sqlx::query("DELETE FROM pr_reviewers WHERE pull_request_id = $1")
            .bind(pull_request_id)
            .execute(&mut *self.tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO pr_reviewers (pull_request_id, user_id)
            SELECT $1, UNNEST($2::text[])
            "#,
        )
        .bind(pull_request_id)
        .bind(reviewers)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn fetch_pull_request(
        &mut self,
        pull_request_id: &str,
    ) -> ReviewStoreResult<Option<PullRequestRecord>> {
        // Row lock serializes merge and reassign on the same pull request.
        let row: Option<PullRequestRow> = sqlx::query_as(
            r#"
            SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
            FROM pull_requests
            WHERE pull_request_id = $1
            FOR UPDATE
            "#,
        )
        .bind(pull_request_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(record_from_row).transpose()
    }

    async fn update_status_merged(
        &mut self,
        pull_request_id: &str,
    ) -> ReviewStoreResult<(PullRequestStatus, DateTime<Utc>)> {
        let row: Option<(String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            UPDATE pull_requests
            SET status = 'MERGED', merged_at = COALESCE(merged_at, NOW())
            WHERE pull_request_id = $1
            RETURNING status, merged_at
            "#,
        )
        .bind(pull_request_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        let (status, merged_at) =
            row.ok_or_else(|| ReviewStoreError::not_found("PullRequest", pull_request_id))?;
        Ok((parse_status(&status)?, merged_at))
    }

    async fn is_reviewer_of(
        &mut self,
        pull_request_id: &str,
        user_id: &str,
    ) -> ReviewStoreResult<bool> {
        let assigned: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM pr_reviewers WHERE pull_request_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(pull_request_id)
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(assigned)
    }

    async fn replace_reviewer(
        &mut self,
        pull_request_id: &str,
        old_user_id: &str,
        new_user_id: &str,
    ) -> ReviewStoreResult<()> {
        let result = sqlx::query(
            "UPDATE pr_reviewers SET user_id = $1 WHERE pull_request_id = $2 AND user_id = $3",
        )
        .bind(new_user_id)
        .bind(pull_request_id)
        .bind(old_user_id)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ReviewStoreError::not_found("Reviewer", old_user_id));
        }
        Ok(())
    }

    async fn list_reviewers(&mut self, pull_request_id: &str) -> ReviewStoreResult<Vec<String>> {
        let reviewers: Vec<String> = sqlx::query_scalar(
            "SELECT user_id FROM pr_reviewers WHERE pull_request_id = $1 ORDER BY user_id",
        )
        .bind(pull_request_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(reviewers)
    }

    async fn commit(self: Box<Self>) -> ReviewStoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for PostgresReviewStore {
    async fn begin(&self) -> ReviewStoreResult<Box<dyn ReviewTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTransaction { tx }))
    }

    async fn add_team(&self, team: &Team) -> ReviewStoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO teams (team_name) VALUES ($1)")
            .bind(&team.team_name)
            .execute(&mut *tx)
            .await
            .map_err(|e| ReviewStoreError::from_insert(e, "Team", &team.team_name))?;

        // A repeated user ID in one request would hit the same row twice.
        let mut seen = HashSet::new();
        let members: Vec<&TeamMember> = team
            .members
            .iter()
            .filter(|m| seen.insert(m.user_id.as_str()))
            .collect();

        let ids: Vec<String> = members.iter().map(|m| m.user_id.clone()).collect();
        let names: Vec<String> = members.iter().map(|m| m.username.clone()).collect();
        let active: Vec<bool> = members.iter().map(|m| m.is_active).collect();

        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, team_name, is_active)
            SELECT u_id, u_name, $4, u_active
            FROM UNNEST($1::text[], $2::text[], $3::bool[]) AS t (u_id, u_name, u_active)
            ON CONFLICT (user_id) DO UPDATE SET team_name = EXCLUDED.team_name
            "#,
        )
        .bind(&ids)
        .bind(&names)
        .bind(&active)
        .bind(&team.team_name)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_team(&self, team_name: &str) -> ReviewStoreResult<Option<Team>> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM teams WHERE team_name = $1)")
                .bind(team_name)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Ok(None);
        }

        let rows: Vec<(String, String, bool)> = sqlx::query_as(
            r#"
            SELECT user_id, username, is_active
            FROM users
            WHERE team_name = $1
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Team {
            team_name: team_name.to_string(),
            members: rows
                .into_iter()
                .map(|(user_id, username, is_active)| TeamMember {
                    user_id,
                    username,
                    is_active,
                })
                .collect(),
        }))
    }

    async fn get_user(&self, user_id: &str) -> ReviewStoreResult<Option<User>> {
        let row: Option<(String, String, String, bool)> = sqlx::query_as(
            "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(user_id, username, team_name, is_active)| User {
            user_id,
            username,
            team_name,
            is_active,
        }))
    }

    async fn set_user_active(
        &self,
        user_id: &str,
        is_active: bool,
    ) -> ReviewStoreResult<Option<User>> {
        let row: Option<(String, String, String, bool)> = sqlx::query_as(
            r#"
            UPDATE users SET is_active = $1
            WHERE user_id = $2
            RETURNING user_id, username, team_name, is_active
            "#,
        )
        .bind(is_active)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(user_id, username, team_name, is_active)| User {
            user_id,
            username,
            team_name,
            is_active,
        }))
    }

    async fn list_reviews(&self, user_id: &str) -> ReviewStoreResult<Vec<PullRequestShort>> {
        let rows: Vec<(String, String, String, String)> = sqlx::query_as(
            r#"
            SELECT pr.pull_request_id, pr.pull_request_name, pr.author_id, pr.status
            FROM pr_reviewers r
            JOIN pull_requests pr ON pr.pull_request_id = r.pull_request_id
            WHERE r.user_id = $1
            ORDER BY pr.pull_request_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(pull_request_id, pull_request_name, author_id, status)| {
                Ok(PullRequestShort {
                    pull_request_id,
                    pull_request_name,
                    author_id,
                    status: parse_status(&status)?,
                })
            })
            .collect()
    }

    async fn user_activity(&self) -> ReviewStoreResult<Vec<UserActivity>> {
        let rows: Vec<(String, String, i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                u.user_id,
                u.username,
                COUNT(r.pull_request_id) AS pull_requests,
                COUNT(*) FILTER (WHERE pr.status = 'MERGED') AS merged_pr,
                COUNT(*) FILTER (WHERE pr.status = 'OPEN') AS open_pr
            FROM users u
            JOIN pr_reviewers r USING (user_id)
            JOIN pull_requests pr USING (pull_request_id)
            GROUP BY u.user_id, u.username
            ORDER BY pull_requests DESC, u.user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(user_id, username, pull_requests, merged_pr, open_pr)| UserActivity {
                    user_id,
                    username,
                    pull_requests,
                    merged_pr,
                    open_pr,
                },
            )
            .collect())
    }

    async fn get_pull_request(
        &self,
        pull_request_id: &str,
    ) -> ReviewStoreResult<Option<PullRequest>> {
        let row: Option<PullRequestRow> = sqlx::query_as(
            r#"
            SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
            FROM pull_requests
            WHERE pull_request_id = $1
            "#,
        )
        .bind(pull_request_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let record = record_from_row(row)?;

        let reviewers: Vec<String> = sqlx::query_scalar(
            "SELECT user_id FROM pr_reviewers WHERE pull_request_id = $1 ORDER BY user_id",
        )
        .bind(pull_request_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(PullRequest::from_record(record, reviewers)))
    }
}
