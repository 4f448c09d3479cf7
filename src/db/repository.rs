use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{FaqEntry, FavoriteEntry, HistoryEntry, NewFaqEntry};

use super::schema::SCHEMA;

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // FAQ operations

    pub async fn all_faq(&self) -> Result<Vec<FaqEntry>> {
        let entries = self
            .conn
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT id, question, answer FROM faq ORDER BY id")?;
                let entries = stmt
                    .query_map([], |row| Ok(faq_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(entries)
            })
            .await?;
        Ok(entries)
    }

    pub async fn insert_faq(&self, entry: NewFaqEntry) -> Result<i64> {
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO faq (question, answer) VALUES (?1, ?2)",
                    params![entry.question, entry.answer],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    pub async fn update_faq(&self, id: i64, question: String, answer: String) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE faq SET question = ?1, answer = ?2 WHERE id = ?3",
                    params![question, answer, id],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn delete_faq(&self, id: i64) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM faq WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    // Favorite operations

    pub async fn list_favorites(&self) -> Result<Vec<FavoriteEntry>> {
        let favorites = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, question, answer, created_at FROM favorites ORDER BY created_at DESC, id DESC",
                )?;
                let favorites = stmt
                    .query_map([], |row| Ok(favorite_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(favorites)
            })
            .await?;
        Ok(favorites)
    }

    pub async fn insert_favorite(&self, question: String, answer: String) -> Result<i64> {
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO favorites (question, answer) VALUES (?1, ?2)",
                    params![question, answer],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    /// Delete by row id so a pre-existing duplicate of the same
    /// question/answer pair is left untouched.
    pub async fn delete_favorite(&self, id: i64) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM favorites WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    // History operations

    pub async fn append_history(&self, question: String, answer: String) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO history (question, answer) VALUES (?1, ?2)",
                    params![question, answer],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn recent_history(&self, limit: u32) -> Result<Vec<HistoryEntry>> {
        let history = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, question, answer, date FROM history ORDER BY date DESC, id DESC LIMIT ?1",
                )?;
                let history = stmt
                    .query_map(params![limit], |row| Ok(history_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(history)
            })
            .await?;
        Ok(history)
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn faq_from_row(row: &Row) -> FaqEntry {
    FaqEntry {
        id: row.get(0).unwrap(),
        question: row.get(1).unwrap(),
        answer: row.get(2).unwrap(),
    }
}

fn favorite_from_row(row: &Row) -> FavoriteEntry {
    FavoriteEntry {
        id: row.get(0).unwrap(),
        question: row.get(1).unwrap(),
        answer: row.get(2).unwrap(),
        created_at: row
            .get::<_, String>(3)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    }
}

fn history_from_row(row: &Row) -> HistoryEntry {
    HistoryEntry {
        id: row.get(0).unwrap(),
        question: row.get(1).unwrap(),
        answer: row.get(2).unwrap(),
        date: row
            .get::<_, String>(3)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_repo() -> Repository {
        Repository::new(":memory:").await.unwrap()
    }

    fn entry(question: &str, answer: &str) -> NewFaqEntry {
        NewFaqEntry {
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }

    #[tokio::test]
    async fn faq_roundtrip() {
        let repo = memory_repo().await;

        let id = repo
            .insert_faq(entry("How to configure VPN?", "Open settings..."))
            .await
            .unwrap();

        let entries = repo.all_faq().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].question, "How to configure VPN?");

        repo.update_faq(id, "How to set up VPN?".into(), "Open settings...".into())
            .await
            .unwrap();
        let entries = repo.all_faq().await.unwrap();
        assert_eq!(entries[0].question, "How to set up VPN?");

        repo.delete_faq(id).await.unwrap();
        assert!(repo.all_faq().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn favorite_add_then_delete_restores_prior_set() {
        let repo = memory_repo().await;

        // A pre-existing duplicate of the same pair must survive.
        repo.insert_favorite("q".into(), "a".into()).await.unwrap();
        let before = repo.list_favorites().await.unwrap();

        let id = repo.insert_favorite("q".into(), "a".into()).await.unwrap();
        assert_eq!(repo.list_favorites().await.unwrap().len(), before.len() + 1);

        repo.delete_favorite(id).await.unwrap();
        let after = repo.list_favorites().await.unwrap();
        assert_eq!(after.len(), before.len());
        assert_eq!(after[0].id, before[0].id);
    }

    #[tokio::test]
    async fn history_is_append_only_and_capped_at_read() {
        let repo = memory_repo().await;

        for i in 0..15 {
            repo.append_history(format!("q{i}"), format!("a{i}"))
                .await
                .unwrap();
        }

        let recent = repo.recent_history(10).await.unwrap();
        assert_eq!(recent.len(), 10);
        // Newest first.
        assert_eq!(recent[0].question, "q14");
        assert_eq!(recent[9].question, "q5");
    }
}
