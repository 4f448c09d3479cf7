use std::sync::Arc;

use crate::ai::AnswerGenerator;
use crate::db::Repository;
use crate::error::Result;
use crate::index::FaqIndex;
use crate::models::{FaqEntry, Provenance, ResolvedAnswer};

/// Turns a question into an answer plus a record of how it was produced.
///
/// Strict priority order, first match wins: exact question equality,
/// then the top full-text hit above the confidence threshold, then one
/// generation call. Exactly one history row is appended per successful
/// resolution; a failed resolution writes nothing.
pub struct AnswerResolver {
    repository: Arc<Repository>,
    index: Arc<FaqIndex>,
    generator: Arc<dyn AnswerGenerator>,
    threshold: f32,
}

impl AnswerResolver {
    pub fn new(
        repository: Arc<Repository>,
        index: Arc<FaqIndex>,
        generator: Arc<dyn AnswerGenerator>,
        threshold: f32,
    ) -> Self {
        Self {
            repository,
            index,
            generator,
            threshold,
        }
    }

    /// The caller must reject empty or whitespace-only input first.
    pub async fn resolve(&self, question: &str) -> Result<ResolvedAnswer> {
        let trimmed = question.trim();
        let entries = self.repository.all_faq().await?;

        let needle = trimmed.to_lowercase();
        let exact = entries
            .iter()
            .find(|entry| entry.question.trim().to_lowercase() == needle);

        let (answer, provenance) = if let Some(entry) = exact {
            (entry.answer.clone(), Provenance::Exact)
        } else if let Some(answer) = self.confident_hit(trimmed, &entries)? {
            (answer, Provenance::Indexed)
        } else {
            let generated = self.generator.generate(trimmed, None).await?;
            (generated, Provenance::Generated)
        };

        if let Err(e) = self
            .repository
            .append_history(trimmed.to_string(), answer.clone())
            .await
        {
            tracing::warn!("Failed to record history: {}", e);
        }

        Ok(ResolvedAnswer {
            question: trimmed.to_string(),
            answer,
            provenance,
        })
    }

    /// Stored answer for the top hit, when its score clears the threshold.
    /// A hit whose id no longer maps to a stored entry falls through to
    /// generation.
    fn confident_hit(&self, question: &str, entries: &[FaqEntry]) -> Result<Option<String>> {
        let Some(hit) = self.index.top_hit(question)? else {
            return Ok(None);
        };
        if hit.score <= self.threshold {
            return Ok(None);
        }
        Ok(entries
            .iter()
            .find(|entry| entry.id == hit.id)
            .map(|entry| entry.answer.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::error::AppError;
    use crate::models::NewFaqEntry;

    struct MockGenerator {
        calls: AtomicUsize,
        reply: Option<String>,
    }

    impl MockGenerator {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: Some(text.to_string()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: None,
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnswerGenerator for MockGenerator {
        async fn generate(&self, _question: &str, _context: Option<&str>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(AppError::Generation("connection refused".to_string())),
            }
        }
    }

    async fn fixture() -> (Arc<Repository>, Arc<FaqIndex>, TempDir) {
        let repository = Arc::new(Repository::new(":memory:").await.unwrap());
        repository
            .insert_faq(NewFaqEntry {
                question: "How to configure VPN?".to_string(),
                answer: "Open settings...".to_string(),
            })
            .await
            .unwrap();

        let entries = repository.all_faq().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(FaqIndex::open_or_create(dir.path(), &entries).unwrap());
        (repository, index, dir)
    }

    #[tokio::test]
    async fn exact_match_ignores_case_and_whitespace_and_skips_generation() {
        let (repository, index, _dir) = fixture().await;
        let generator = MockGenerator::replying("unused");
        let resolver =
            AnswerResolver::new(repository.clone(), index, generator.clone(), 0.3);

        let resolved = resolver.resolve("  how to configure vpn?  ").await.unwrap();

        assert_eq!(resolved.answer, "Open settings...");
        assert_eq!(resolved.provenance, Provenance::Exact);
        assert_eq!(generator.call_count(), 0);

        let history = repository.recent_history(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].question, "how to configure vpn?");
        assert_eq!(history[0].answer, "Open settings...");
    }

    #[tokio::test]
    async fn confident_fuzzy_hit_returns_stored_answer() {
        let (repository, index, _dir) = fixture().await;
        let generator = MockGenerator::replying("unused");
        // Zero threshold: any hit counts as confident.
        let resolver =
            AnswerResolver::new(repository.clone(), index, generator.clone(), 0.0);

        let resolved = resolver.resolve("VPN setup issues").await.unwrap();

        assert_eq!(resolved.answer, "Open settings...");
        assert_eq!(resolved.provenance, Provenance::Indexed);
        assert_eq!(generator.call_count(), 0);
        assert_eq!(repository.recent_history(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn low_score_falls_back_to_generation_exactly_once() {
        let (repository, index, _dir) = fixture().await;
        let generator = MockGenerator::replying("The answer is 42.");
        // Unreachable threshold: every hit is below it.
        let resolver =
            AnswerResolver::new(repository.clone(), index, generator.clone(), 1000.0);

        let resolved = resolver.resolve("What is the meaning of life?").await.unwrap();

        assert_eq!(resolved.answer, "The answer is 42.");
        assert_eq!(resolved.provenance, Provenance::Generated);
        assert_eq!(generator.call_count(), 1);

        // The generated text appears in the newest history record.
        let history = repository.recent_history(10).await.unwrap();
        assert_eq!(history[0].answer, "The answer is 42.");
    }

    #[tokio::test]
    async fn no_hits_at_all_also_fall_back_to_generation() {
        let (repository, index, _dir) = fixture().await;
        let generator = MockGenerator::replying("generated");
        let resolver = AnswerResolver::new(repository, index, generator.clone(), 0.3);

        let resolved = resolver.resolve("zanzibar quokka lighthouse").await.unwrap();

        assert_eq!(resolved.provenance, Provenance::Generated);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn failed_generation_writes_no_history() {
        let (repository, index, _dir) = fixture().await;
        let generator = MockGenerator::failing();
        let resolver =
            AnswerResolver::new(repository.clone(), index, generator, 1000.0);

        let result = resolver.resolve("What is the meaning of life?").await;

        assert!(result.is_err());
        assert!(repository.recent_history(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolution_sees_entries_added_after_startup() {
        let (repository, index, _dir) = fixture().await;
        let generator = MockGenerator::replying("unused");
        let resolver =
            AnswerResolver::new(repository.clone(), index.clone(), generator.clone(), 0.3);

        let id = repository
            .insert_faq(NewFaqEntry {
                question: "How to book a meeting room?".to_string(),
                answer: "Use the calendar.".to_string(),
            })
            .await
            .unwrap();
        let entries = repository.all_faq().await.unwrap();
        let added = entries.iter().find(|e| e.id == id).unwrap();
        index.upsert(added).await.unwrap();

        let resolved = resolver.resolve("how to book a meeting room?").await.unwrap();
        assert_eq!(resolved.answer, "Use the calendar.");
        assert_eq!(resolved.provenance, Provenance::Exact);
        assert_eq!(generator.call_count(), 0);
    }
}
