use chrono::{DateTime, Utc};

/// A stored question/answer pair forming the searchable knowledge base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqEntry {
    pub id: i64,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone)]
pub struct NewFaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone)]
pub struct FavoriteEntry {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub date: DateTime<Utc>,
}

/// How an answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Case-insensitive equality with a stored FAQ question.
    Exact,
    /// Top-scoring full-text hit above the confidence threshold.
    Indexed,
    /// Text-generation fallback.
    Generated,
}

impl Provenance {
    pub fn label(&self) -> &'static str {
        match self {
            Provenance::Exact => "FAQ",
            Provenance::Indexed => "FAQ (similar)",
            Provenance::Generated => "AI",
        }
    }
}

/// Transient result of one resolution; not persisted as its own entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAnswer {
    pub question: String,
    pub answer: String,
    pub provenance: Provenance,
}

/// Reachability of the generation service, shown in the status line only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationStatus {
    #[default]
    Checking,
    Connected,
    Unreachable,
}

impl GenerationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GenerationStatus::Checking => "checking...",
            GenerationStatus::Connected => "connected",
            GenerationStatus::Unreachable => "unreachable",
        }
    }
}
