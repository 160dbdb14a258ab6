// ==========================================
// 设备异常检修排程系统 - 引擎端口的 SQLite 适配
// ==========================================
// 职责: 把引擎的写入/审计端口接到仓储层
// 红线: 适配器只做转发, 不含排程逻辑
// ==========================================

use crate::domain::session::SessionOutcome;
use crate::domain::types::SessionType;
use crate::domain::session::PlanningSession;
use crate::domain::window::MaintenanceWindow;
use crate::engine::session_recorder::SessionRecorder;
use crate::engine::stores::ScheduleStore;
use crate::repository::anomaly_repo::AnomalyRepository;
use crate::repository::error::RepositoryResult;
use crate::repository::session_repo::PlanningSessionRepository;
use crate::repository::window_repo::MaintenanceWindowRepository;
use async_trait::async_trait;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteScheduleStore - 排程写入适配
// ==========================================
pub struct SqliteScheduleStore {
    anomalies: AnomalyRepository,
    windows: MaintenanceWindowRepository,
}

impl SqliteScheduleStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            anomalies: AnomalyRepository::new(conn.clone()),
            windows: MaintenanceWindowRepository::new(conn),
        }
    }
}

#[async_trait]
impl ScheduleStore for SqliteScheduleStore {
    async fn update_anomaly_window(
        &self,
        anomaly_id: &str,
        window_id: Option<&str>,
    ) -> RepositoryResult<()> {
        self.anomalies.update_window_ref(anomaly_id, window_id)
    }

    async fn create_window(&self, window: &MaintenanceWindow) -> RepositoryResult<()> {
        self.windows.insert(window)?;
        Ok(())
    }
}

// ==========================================
// SqliteSessionRecorder - 会话审计适配
// ==========================================
pub struct SqliteSessionRecorder {
    sessions: PlanningSessionRepository,
}

impl SqliteSessionRecorder {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            sessions: PlanningSessionRepository::new(conn),
        }
    }
}

#[async_trait]
impl SessionRecorder for SqliteSessionRecorder {
    async fn start_session(
        &self,
        session_type: SessionType,
        total_anomalies: i64,
    ) -> RepositoryResult<String> {
        let session = PlanningSession::start(session_type, total_anomalies);
        self.sessions.insert(&session)
    }

    async fn complete_session(
        &self,
        session_id: &str,
        outcome: &SessionOutcome,
    ) -> RepositoryResult<()> {
        self.sessions.complete(session_id, outcome)
    }

    async fn fail_session(&self, session_id: &str, error_message: &str) -> RepositoryResult<()> {
        self.sessions.fail(session_id, error_message)
    }
}
