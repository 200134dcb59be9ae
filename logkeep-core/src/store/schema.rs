/// Applied on every open; idempotent.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS access_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp INTEGER NOT NULL,
    host TEXT NOT NULL,
    port INTEGER NOT NULL,
    src_addr TEXT NOT NULL,
    authuser TEXT NOT NULL,
    bytes_in INTEGER NOT NULL,
    bytes_out INTEGER NOT NULL,
    micros INTEGER NOT NULL,
    status INTEGER NOT NULL,
    reqline TEXT NOT NULL,
    method TEXT NOT NULL,
    path TEXT NOT NULL,
    protocol TEXT NOT NULL,
    referer TEXT NOT NULL,
    user_agent TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_access_ts ON access_events(timestamp);

CREATE TABLE IF NOT EXISTS authfail_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp INTEGER NOT NULL,
    username TEXT NOT NULL,
    src_addr TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_authfail_ts ON authfail_events(timestamp);

CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    realname TEXT NOT NULL,
    email_address TEXT NOT NULL,
    UNIQUE(realname, email_address)
);

CREATE TABLE IF NOT EXISTS mail_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp INTEGER NOT NULL,
    subject TEXT NOT NULL,
    sender_id INTEGER NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
    size INTEGER NOT NULL,
    date INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_mail_ts ON mail_events(timestamp);

CREATE TABLE IF NOT EXISTS mail_recipients (
    msg_id INTEGER NOT NULL REFERENCES mail_events(id) ON DELETE CASCADE,
    contact_id INTEGER NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
    UNIQUE(msg_id, contact_id)
);
"#;
