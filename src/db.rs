// ==========================================
// 设备异常检修排程系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开内存库 (测试用)
pub fn open_in_memory_connection() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表 (幂等)
///
/// 说明: 排程核心自带最小 schema, 便于独立运行与测试;
/// 生产部署时由外部迁移工具维护同构表结构。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS anomaly (
            anomaly_id                   TEXT PRIMARY KEY,
            equipment_number             TEXT NOT NULL,
            system_name                  TEXT,
            description                  TEXT,
            detection_date               TEXT,
            reliability_integrity_score  INTEGER NOT NULL,
            availability_score           INTEGER NOT NULL,
            process_safety_score         INTEGER NOT NULL,
            status                       TEXT NOT NULL,
            priority                     INTEGER,
            estimated_hours              REAL,
            window_id                    TEXT,
            created_at                   TEXT NOT NULL,
            updated_at                   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_anomaly_status ON anomaly(status);
        CREATE INDEX IF NOT EXISTS idx_anomaly_window ON anomaly(window_id);

        CREATE TABLE IF NOT EXISTS action_plan (
            plan_id              TEXT PRIMARY KEY,
            anomaly_id           TEXT NOT NULL UNIQUE,
            needs_outage         INTEGER NOT NULL DEFAULT 0,
            outage_type          TEXT,
            total_duration_days  REAL NOT NULL,
            total_duration_hours REAL,
            priority             INTEGER NOT NULL,
            completed            INTEGER NOT NULL DEFAULT 0,
            created_at           TEXT NOT NULL,
            updated_at           TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS maintenance_window (
            window_id         TEXT PRIMARY KEY,
            window_type       TEXT NOT NULL,
            duration_days     INTEGER NOT NULL,
            start_date        TEXT NOT NULL,
            end_date          TEXT NOT NULL,
            status            TEXT NOT NULL,
            description       TEXT,
            auto_created      INTEGER NOT NULL DEFAULT 0,
            source_anomaly_id TEXT,
            created_at        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_window_status ON maintenance_window(status);

        CREATE TABLE IF NOT EXISTS planning_session (
            session_id         TEXT PRIMARY KEY,
            session_type       TEXT NOT NULL,
            status             TEXT NOT NULL,
            total_anomalies    INTEGER NOT NULL DEFAULT 0,
            processed_count    INTEGER NOT NULL DEFAULT 0,
            scheduled_count    INTEGER NOT NULL DEFAULT 0,
            windows_created    INTEGER NOT NULL DEFAULT 0,
            optimization_score REAL NOT NULL DEFAULT 0,
            error_message      TEXT,
            started_at         TEXT NOT NULL,
            completed_at       TEXT
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key      TEXT NOT NULL,
            value    TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )
}
