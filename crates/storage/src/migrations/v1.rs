//! Migration v1: Initial schema

pub(super) const SQL: &str = "
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    use_web_search INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS session_turns (
    session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (session_id, position)
);

CREATE TABLE IF NOT EXISTS session_sources (
    session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    source_json TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (session_id, position)
);

CREATE TABLE IF NOT EXISTS source_chunks (
    session_id TEXT NOT NULL,
    source_position INTEGER NOT NULL,
    chunk_index INTEGER NOT NULL,
    content TEXT NOT NULL,
    PRIMARY KEY (session_id, source_position, chunk_index),
    FOREIGN KEY (session_id, source_position)
        REFERENCES session_sources(session_id, position) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS baseline_responses (
    session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    turn_key TEXT NOT NULL,
    content TEXT NOT NULL,
    PRIMARY KEY (session_id, turn_key)
);

CREATE TABLE IF NOT EXISTS curricula (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    subject TEXT NOT NULL,
    overview TEXT NOT NULL,
    total_time TEXT NOT NULL,
    steps_json TEXT NOT NULL,
    revision INTEGER NOT NULL DEFAULT 0,
    syllabus_url TEXT,
    time_constraint TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS curriculum_step_details (
    curriculum_id TEXT NOT NULL REFERENCES curricula(id) ON DELETE CASCADE,
    step_index INTEGER NOT NULL,
    revision INTEGER NOT NULL,
    detail_json TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (curriculum_id, step_index)
);

CREATE TABLE IF NOT EXISTS submissions (
    id TEXT PRIMARY KEY,
    assignment_id TEXT NOT NULL,
    student_id TEXT NOT NULL,
    file_name TEXT NOT NULL,
    submitted_at TEXT NOT NULL,
    UNIQUE (assignment_id, student_id)
);

CREATE TABLE IF NOT EXISTS grading_records (
    submission_id TEXT PRIMARY KEY REFERENCES submissions(id) ON DELETE CASCADE,
    score INTEGER NOT NULL CHECK (score BETWEEN 0 AND 100),
    remarks_json TEXT NOT NULL,
    suggestions_json TEXT NOT NULL,
    errors_json TEXT NOT NULL,
    student_name TEXT,
    graded_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_updated ON sessions(updated_at DESC);
CREATE INDEX IF NOT EXISTS idx_submissions_assignment ON submissions(assignment_id);
CREATE INDEX IF NOT EXISTS idx_curricula_updated ON curricula(updated_at DESC);
";
