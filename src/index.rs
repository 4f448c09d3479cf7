use std::path::Path;

use tantivy::collector::TopDocs;
use tantivy::directory::MmapDirectory;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Schema, Value, INDEXED, STORED, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::FaqEntry;

const WRITER_MEMORY_BUDGET: usize = 50_000_000;

/// Top-scoring hit for a free-text query. The score is the index
/// library's relevance value and is meaningful only relative to the
/// configured threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredHit {
    pub id: i64,
    pub score: f32,
}

/// Full-text index over the FAQ entries.
///
/// Create-or-open: a fresh directory gets a new index populated from the
/// current entry set; an existing index is opened as-is. Mutations go
/// through [`FaqIndex::upsert`] and [`FaqIndex::remove`] so the index
/// tracks FAQ edits within a session.
pub struct FaqIndex {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    id_field: Field,
    question_field: Field,
    answer_field: Field,
}

impl FaqIndex {
    pub fn open_or_create(path: &Path, entries: &[FaqEntry]) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut schema_builder = Schema::builder();
        let id_field = schema_builder.add_i64_field("id", INDEXED | STORED);
        let question_field = schema_builder.add_text_field("question", TEXT | STORED);
        let answer_field = schema_builder.add_text_field("answer", TEXT | STORED);
        let schema = schema_builder.build();

        let dir = MmapDirectory::open(path).map_err(tantivy::TantivyError::from)?;
        let fresh = !Index::exists(&dir).map_err(tantivy::TantivyError::from)?;
        let index = Index::open_or_create(dir, schema)?;

        let mut writer: IndexWriter = index.writer(WRITER_MEMORY_BUDGET)?;

        if fresh {
            for entry in entries {
                writer.add_document(doc!(
                    id_field => entry.id,
                    question_field => entry.question.clone(),
                    answer_field => entry.answer.clone(),
                ))?;
            }
            writer.commit()?;
        }

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        Ok(Self {
            index,
            reader,
            writer: Mutex::new(writer),
            id_field,
            question_field,
            answer_field,
        })
    }

    /// Add or replace the document for one FAQ entry.
    pub async fn upsert(&self, entry: &FaqEntry) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.delete_term(Term::from_field_i64(self.id_field, entry.id));
        writer.add_document(doc!(
            self.id_field => entry.id,
            self.question_field => entry.question.clone(),
            self.answer_field => entry.answer.clone(),
        ))?;
        writer.commit()?;
        self.reader.reload()?;
        Ok(())
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.delete_term(Term::from_field_i64(self.id_field, id));
        writer.commit()?;
        self.reader.reload()?;
        Ok(())
    }

    /// Single best hit for a free-text query, if any document matches.
    pub fn top_hit(&self, query_text: &str) -> Result<Option<ScoredHit>> {
        let searcher = self.reader.searcher();
        let parser =
            QueryParser::for_index(&self.index, vec![self.question_field, self.answer_field]);
        // User questions are arbitrary text, not query syntax.
        let (query, _errors) = parser.parse_query_lenient(query_text);

        let top = searcher.search(&query, &TopDocs::with_limit(1))?;
        let Some((score, address)) = top.first() else {
            return Ok(None);
        };

        let document: TantivyDocument = searcher.doc(*address)?;
        let id = document
            .get_first(self.id_field)
            .and_then(|value| value.as_i64());

        Ok(id.map(|id| ScoredHit { id, score: *score }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(id: i64, question: &str, answer: &str) -> FaqEntry {
        FaqEntry {
            id,
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }

    fn sample_entries() -> Vec<FaqEntry> {
        vec![
            entry(1, "How to configure VPN?", "Open settings and add a profile."),
            entry(2, "How to reset a password?", "Use the self-service portal."),
        ]
    }

    #[tokio::test]
    async fn fresh_index_finds_seeded_entries() {
        let dir = tempdir().unwrap();
        let index = FaqIndex::open_or_create(dir.path(), &sample_entries()).unwrap();

        let hit = index.top_hit("vpn configuration").unwrap().unwrap();
        assert_eq!(hit.id, 1);
        assert!(hit.score > 0.0);

        assert!(index.top_hit("completely unrelated gibberish").unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_and_remove_are_visible_immediately() {
        let dir = tempdir().unwrap();
        let index = FaqIndex::open_or_create(dir.path(), &sample_entries()).unwrap();

        index
            .upsert(&entry(3, "How to mount a network printer?", "Use the print server."))
            .await
            .unwrap();
        let hit = index.top_hit("network printer").unwrap().unwrap();
        assert_eq!(hit.id, 3);

        // Replacing an entry must not leave the old document behind.
        index
            .upsert(&entry(1, "How to request a certificate?", "File an IT ticket."))
            .await
            .unwrap();
        let hit = index.top_hit("certificate request").unwrap().unwrap();
        assert_eq!(hit.id, 1);
        assert!(index.top_hit("vpn").unwrap().is_none());

        index.remove(3).await.unwrap();
        assert!(index.top_hit("network printer").unwrap().is_none());
    }

    #[tokio::test]
    async fn existing_index_is_opened_not_rebuilt() {
        let dir = tempdir().unwrap();
        {
            FaqIndex::open_or_create(dir.path(), &sample_entries()).unwrap();
        }

        // Second open with a different entry set: on-disk content wins.
        let other = vec![entry(9, "How to book a meeting room?", "Use the calendar.")];
        let index = FaqIndex::open_or_create(dir.path(), &other).unwrap();

        assert!(index.top_hit("vpn").unwrap().is_some());
        assert!(index.top_hit("meeting room").unwrap().is_none());
    }
}
