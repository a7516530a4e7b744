use async_trait::async_trait;
use cb_core::error::{AppError, Result};
use cb_core::models::Member;
use cb_core::traits::MemberRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::{storage, SqliteStore};

fn member_from_row(row: &SqliteRow) -> sqlx::Result<Member> {
    Ok(Member {
        user_id: row.try_get("user_id")?,
        credential: row.try_get("credential")?,
        nickname: row.try_get("nickname")?,
    })
}

#[async_trait]
impl MemberRepo for SqliteStore {
    async fn find_member(&self, user_id: &str) -> Result<Option<Member>> {
        let row = sqlx::query("SELECT user_id, credential, nickname FROM members WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        row.as_ref().map(member_from_row).transpose().map_err(storage)
    }

    async fn find_nickname(&self, user_id: &str) -> Result<Option<String>> {
        sqlx::query_scalar("SELECT nickname FROM members WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)
    }

    async fn nickname_exists(&self, nickname: &str) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM members WHERE nickname = ?)")
            .bind(nickname)
            .fetch_one(&self.pool)
            .await
            .map_err(storage)
    }

    /// The UNIQUE columns settle races between two signups that both passed
    /// the service-level checks.
    async fn insert_member(&self, member: Member) -> Result<()> {
        let result = sqlx::query("INSERT INTO members (user_id, credential, nickname) VALUES (?, ?, ?)")
            .bind(&member.user_id)
            .bind(&member.credential)
            .bind(&member.nickname)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                if db.message().contains("members.nickname") {
                    Err(AppError::Conflict("Nickname already exists".into()))
                } else {
                    Err(AppError::Conflict("ID already exists".into()))
                }
            }
            Err(e) => Err(storage(e)),
        }
    }
}
