pub const SCHEMA: &str = r#"
-- faq table: the knowledge base
CREATE TABLE IF NOT EXISTS faq (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question TEXT NOT NULL,
    answer TEXT NOT NULL
);

-- favorites table: answers the user chose to keep
CREATE TABLE IF NOT EXISTS favorites (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question TEXT,
    answer TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- history table: one row per resolved query, append-only
CREATE TABLE IF NOT EXISTS history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question TEXT,
    answer TEXT,
    date TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_history_date ON history(date DESC);
CREATE INDEX IF NOT EXISTS idx_favorites_created_at ON favorites(created_at DESC);
"#;
