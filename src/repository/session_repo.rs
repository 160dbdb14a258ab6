// ==========================================
// 设备异常检修排程系统 - 排程会话仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 会话只追加与终态化, 终态后不再变更
// ==========================================

use crate::domain::session::{PlanningSession, SessionOutcome};
use crate::domain::types::{SessionStatus, SessionType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    session_id, session_type, status, total_anomalies, processed_count,
    scheduled_count, windows_created, optimization_score, error_message,
    started_at, completed_at
"#;

// ==========================================
// PlanningSessionRepository - 排程会话仓储
// ==========================================
pub struct PlanningSessionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanningSessionRepository {
    /// 创建新的排程会话仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<(PlanningSession, String, String)> {
        let type_raw: String = row.get(1)?;
        let status_raw: String = row.get(2)?;
        let session = PlanningSession {
            session_id: row.get(0)?,
            session_type: SessionType::Auto,   // 延迟解析
            status: SessionStatus::Running,    // 延迟解析
            total_anomalies: row.get(3)?,
            processed_count: row.get(4)?,
            scheduled_count: row.get(5)?,
            windows_created: row.get(6)?,
            optimization_score: row.get(7)?,
            error_message: row.get(8)?,
            started_at: row.get::<_, DateTime<Utc>>(9)?,
            completed_at: row.get::<_, Option<DateTime<Utc>>>(10)?,
        };
        Ok((session, type_raw, status_raw))
    }

    fn finish_row(
        (mut session, type_raw, status_raw): (PlanningSession, String, String),
    ) -> RepositoryResult<PlanningSession> {
        session.session_type =
            SessionType::from_str(&type_raw).ok_or_else(|| RepositoryError::FieldValueError {
                field: "planning_session.session_type".to_string(),
                message: format!("未知会话类型: {}", type_raw),
            })?;
        session.status =
            SessionStatus::from_str(&status_raw).ok_or_else(|| RepositoryError::FieldValueError {
                field: "planning_session.status".to_string(),
                message: format!("未知会话状态: {}", status_raw),
            })?;
        Ok(session)
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入会话记录 (运行开始)
    pub fn insert(&self, session: &PlanningSession) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO planning_session (
                session_id, session_type, status, total_anomalies, processed_count,
                scheduled_count, windows_created, optimization_score, error_message,
                started_at, completed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                session.session_id,
                session.session_type.to_db_str(),
                session.status.to_db_str(),
                session.total_anomalies,
                session.processed_count,
                session.scheduled_count,
                session.windows_created,
                session.optimization_score,
                session.error_message,
                session.started_at,
                session.completed_at,
            ],
        )?;

        Ok(session.session_id.clone())
    }

    /// 会话终态化: COMPLETED + 运行计数
    pub fn complete(&self, session_id: &str, outcome: &SessionOutcome) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"
            UPDATE planning_session
            SET status = 'COMPLETED',
                processed_count = ?1,
                scheduled_count = ?2,
                windows_created = ?3,
                optimization_score = ?4,
                completed_at = ?5
            WHERE session_id = ?6 AND status = 'RUNNING'
            "#,
            params![
                outcome.processed_count,
                outcome.scheduled_count,
                outcome.windows_created,
                outcome.optimization_score,
                Utc::now(),
                session_id,
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "PlanningSession(RUNNING)".to_string(),
                id: session_id.to_string(),
            });
        }
        Ok(())
    }

    /// 会话终态化: FAILED + 错误信息
    pub fn fail(&self, session_id: &str, error_message: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"
            UPDATE planning_session
            SET status = 'FAILED', error_message = ?1, completed_at = ?2
            WHERE session_id = ?3 AND status = 'RUNNING'
            "#,
            params![error_message, Utc::now(), session_id],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "PlanningSession(RUNNING)".to_string(),
                id: session_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 ID 查询
    pub fn find_by_id(&self, session_id: &str) -> RepositoryResult<Option<PlanningSession>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM planning_session WHERE session_id = ?1",
            SELECT_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![session_id], Self::map_row)?;

        match rows.next() {
            Some(row) => Ok(Some(Self::finish_row(row?)?)),
            None => Ok(None),
        }
    }
}
