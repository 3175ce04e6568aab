use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::draft::{Draft, DraftFields, DraftId, NewDraft};

use super::{DraftStore, StoreError};

const DRAFT_COLUMNS: &str = "id, owner, token, title, section, start_time, edit_time, \
     save_time, scroll_top, text, summary, minor_edit";

#[derive(Debug, Clone)]
pub struct SqliteDraftStore {
    pool: SqlitePool,
}

impl SqliteDraftStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DraftStore for SqliteDraftStore {
    async fn create(&self, draft: NewDraft) -> Result<DraftId, StoreError> {
        let fields = draft.fields;
        let result = sqlx::query(
            r#"
            INSERT INTO drafts (owner, token, title, section, start_time, edit_time,
                                save_time, scroll_top, text, summary, minor_edit)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.owner)
        .bind(draft.token)
        .bind(fields.title)
        .bind(fields.section)
        .bind(fields.start_time)
        .bind(fields.edit_time)
        .bind(fields.save_time)
        .bind(fields.scroll_top)
        .bind(fields.text)
        .bind(fields.summary)
        .bind(fields.minor_edit)
        .execute(&self.pool)
        .await?;

        Ok(DraftId(result.last_insert_rowid()))
    }

    async fn update(&self, id: DraftId, fields: DraftFields) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE drafts
            SET title = ?, section = ?, start_time = ?, edit_time = ?, save_time = ?,
                scroll_top = ?, text = ?, summary = ?, minor_edit = ?
            WHERE id = ?
            "#,
        )
        .bind(fields.title)
        .bind(fields.section)
        .bind(fields.start_time)
        .bind(fields.edit_time)
        .bind(fields.save_time)
        .bind(fields.scroll_top)
        .bind(fields.text)
        .bind(fields.summary)
        .bind(fields.minor_edit)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn get(&self, id: DraftId) -> Result<Option<Draft>, StoreError> {
        let draft = sqlx::query_as::<_, Draft>(&format!(
            "SELECT {DRAFT_COLUMNS} FROM drafts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(draft)
    }

    async fn list_for_title(&self, title: &str) -> Result<Vec<Draft>, StoreError> {
        let drafts = sqlx::query_as::<_, Draft>(&format!(
            "SELECT {DRAFT_COLUMNS} FROM drafts WHERE title = ? ORDER BY save_time DESC, id DESC"
        ))
        .bind(title)
        .fetch_all(&self.pool)
        .await?;
        Ok(drafts)
    }

    async fn list_for_owner(
        &self,
        owner: Uuid,
        title: Option<&str>,
    ) -> Result<Vec<Draft>, StoreError> {
        let drafts = sqlx::query_as::<_, Draft>(&format!(
            "SELECT {DRAFT_COLUMNS} FROM drafts \
             WHERE owner = ? AND (? IS NULL OR title = ?) \
             ORDER BY save_time DESC, id DESC"
        ))
        .bind(owner)
        .bind(title)
        .bind(title)
        .fetch_all(&self.pool)
        .await?;
        Ok(drafts)
    }

    async fn count_for_title(&self, title: &str) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM drafts WHERE title = ?")
            .bind(title)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_for_owner(&self, owner: Uuid, title: &str) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM drafts WHERE owner = ? AND title = ?",
        )
        .bind(owner)
        .bind(title)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn discard(&self, id: DraftId, requester: Uuid) -> Result<(), StoreError> {
        let mut txn = self.pool.begin().await?;

        let owner = sqlx::query_scalar::<_, Uuid>("SELECT owner FROM drafts WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *txn)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        if owner != requester {
            tracing::warn!(draft_id = %id, %requester, "refusing to discard draft of another user");
            return Err(StoreError::Unauthorized { id, requester });
        }

        sqlx::query("DELETE FROM drafts WHERE id = ? AND owner = ?")
            .bind(id)
            .bind(requester)
            .execute(&mut *txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    async fn retitle_all(&self, old_title: &str, new_title: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE drafts SET title = ? WHERE title = ?")
            .bind(new_title)
            .bind(old_title)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn purge_saved_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM drafts WHERE save_time < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
