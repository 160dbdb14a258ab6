// ==========================================
// 设备异常检修排程系统 - 会话记录接口
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 4.6 会话审计
// ==========================================
// 红线: 排程算法不直接接触存储; 会话落库通过本接口注入
// ==========================================

use crate::domain::session::{PlanningSession, SessionOutcome};
use crate::domain::types::{SessionStatus, SessionType};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

// ==========================================
// SessionRecorder - 会话记录器
// ==========================================
/// 排程/优化运行的审计接口: 开始 -> 完成/失败
#[async_trait]
pub trait SessionRecorder: Send + Sync {
    /// 开启会话, 返回会话 ID
    async fn start_session(
        &self,
        session_type: SessionType,
        total_anomalies: i64,
    ) -> RepositoryResult<String>;

    /// 会话终态化: COMPLETED + 运行计数
    async fn complete_session(
        &self,
        session_id: &str,
        outcome: &SessionOutcome,
    ) -> RepositoryResult<()>;

    /// 会话终态化: FAILED + 错误信息
    async fn fail_session(&self, session_id: &str, error_message: &str) -> RepositoryResult<()>;
}

// ==========================================
// InMemorySessionRecorder - 测试用内存实现
// ==========================================
#[derive(Debug, Default)]
pub struct InMemorySessionRecorder {
    sessions: Mutex<Vec<PlanningSession>>,
}

impl InMemorySessionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前会话快照
    pub fn sessions(&self) -> Vec<PlanningSession> {
        self.sessions.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SessionRecorder for InMemorySessionRecorder {
    async fn start_session(
        &self,
        session_type: SessionType,
        total_anomalies: i64,
    ) -> RepositoryResult<String> {
        let session = PlanningSession::start(session_type, total_anomalies);
        let session_id = session.session_id.clone();
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.push(session);
        }
        Ok(session_id)
    }

    async fn complete_session(
        &self,
        session_id: &str,
        outcome: &SessionOutcome,
    ) -> RepositoryResult<()> {
        if let Ok(mut sessions) = self.sessions.lock() {
            if let Some(session) = sessions.iter_mut().find(|s| s.session_id == session_id) {
                session.status = SessionStatus::Completed;
                session.processed_count = outcome.processed_count;
                session.scheduled_count = outcome.scheduled_count;
                session.windows_created = outcome.windows_created;
                session.optimization_score = outcome.optimization_score;
                session.completed_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn fail_session(&self, session_id: &str, error_message: &str) -> RepositoryResult<()> {
        if let Ok(mut sessions) = self.sessions.lock() {
            if let Some(session) = sessions.iter_mut().find(|s| s.session_id == session_id) {
                session.status = SessionStatus::Failed;
                session.error_message = Some(error_message.to_string());
                session.completed_at = Some(Utc::now());
            }
        }
        Ok(())
    }
}
