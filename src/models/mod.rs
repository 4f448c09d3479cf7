mod faq;

pub use faq::{
    FaqEntry, FavoriteEntry, GenerationStatus, HistoryEntry, NewFaqEntry, Provenance,
    ResolvedAnswer,
};
