// ==========================================
// 设备异常检修排程系统 - 排程会话领域模型
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 1.4 排程会话
// ==========================================
// 审计记录: 运行开始时创建, 结束时终态化, 之后不再变更
// ==========================================

use crate::domain::types::{SessionStatus, SessionType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// PlanningSession - 排程会话
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningSession {
    // ===== 主键 =====
    pub session_id: String, // UUID

    // ===== 会话属性 =====
    pub session_type: SessionType,
    pub status: SessionStatus,

    // ===== 运行计数 =====
    pub total_anomalies: i64,    // 输入异常数
    pub processed_count: i64,    // 实际处理数
    pub scheduled_count: i64,    // 成功分派数
    pub windows_created: i64,    // 自动建窗数
    pub optimization_score: f64, // 本次运行的平均分

    // ===== 失败信息 =====
    pub error_message: Option<String>,

    // ===== 时间戳 =====
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl PlanningSession {
    /// 开启一个新会话 (RUNNING)
    pub fn start(session_type: SessionType, total_anomalies: i64) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            session_type,
            status: SessionStatus::Running,
            total_anomalies,
            processed_count: 0,
            scheduled_count: 0,
            windows_created: 0,
            optimization_score: 0.0,
            error_message: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }
}

// ==========================================
// SessionOutcome - 会话终态计数
// ==========================================
// 由引擎在收尾时汇总, 交给 SessionRecorder 落库
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub processed_count: i64,
    pub scheduled_count: i64,
    pub windows_created: i64,
    pub optimization_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_start_state() {
        let session = PlanningSession::start(SessionType::Auto, 12);

        assert_eq!(session.status, SessionStatus::Running);
        assert_eq!(session.total_anomalies, 12);
        assert_eq!(session.scheduled_count, 0);
        assert!(session.completed_at.is_none());
        assert!(!session.session_id.is_empty());
    }
}
