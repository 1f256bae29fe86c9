//! SQL schema for the propusk SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    login       TEXT NOT NULL UNIQUE,
    pass_hash   TEXT NOT NULL,        -- argon2 PHC string
    is_admin    INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

-- Buildings are soft-deleted: active = 0 hides them from the catalog.
CREATE TABLE IF NOT EXISTS buildings (
    building_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    image_url   TEXT NOT NULL DEFAULT '',
    active      INTEGER NOT NULL DEFAULT 1
);

-- Passes are never deleted; status 4 is the logical deletion.
CREATE TABLE IF NOT EXISTS passes (
    pass_id      TEXT PRIMARY KEY,
    creator_id   TEXT NOT NULL,
    moderator_id TEXT,
    status       INTEGER NOT NULL DEFAULT 0 CHECK (status BETWEEN 0 AND 4),
    visitor      TEXT NOT NULL DEFAULT '',
    visit_date   TEXT,               -- RFC 3339 UTC, fixed nanosecond width
    created_at   TEXT NOT NULL,
    formed_at    TEXT,
    completed_at TEXT
);

-- At most one draft per creator.
CREATE UNIQUE INDEX IF NOT EXISTS passes_one_draft_idx
    ON passes(creator_id) WHERE status = 0;

CREATE TABLE IF NOT EXISTS pass_items (
    pass_id     TEXT NOT NULL REFERENCES passes(pass_id),
    building_id TEXT NOT NULL REFERENCES buildings(building_id),
    comment     TEXT NOT NULL DEFAULT '',
    was_visited INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (pass_id, building_id)
);

CREATE INDEX IF NOT EXISTS passes_creator_idx    ON passes(creator_id);
CREATE INDEX IF NOT EXISTS passes_visit_date_idx ON passes(visit_date);

PRAGMA user_version = 1;
";
