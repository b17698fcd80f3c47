pub const SCHEMA: &str = "
-- Prompts: one row per named history
CREATE TABLE IF NOT EXISTS prompts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL          -- RFC 3339 UTC
);
CREATE INDEX IF NOT EXISTS idx_prompts_name ON prompts(name);

-- Versions: contiguous 1..N per prompt, never reused
CREATE TABLE IF NOT EXISTS prompt_versions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    prompt_id INTEGER NOT NULL REFERENCES prompts(id) ON DELETE CASCADE,
    version_number INTEGER NOT NULL,
    content TEXT NOT NULL,
    content_hash TEXT NOT NULL,       -- lowercase hex SHA-256 of content
    note TEXT,
    created_at TEXT NOT NULL,         -- RFC 3339 UTC
    UNIQUE(prompt_id, version_number)
);
CREATE INDEX IF NOT EXISTS idx_versions_prompt ON prompt_versions(prompt_id, version_number);

-- Tag names, shared across versions
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

-- Version <-> tag membership
CREATE TABLE IF NOT EXISTS prompt_version_tags (
    version_id INTEGER NOT NULL REFERENCES prompt_versions(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (version_id, tag_id)
);
";
