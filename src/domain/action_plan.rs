// ==========================================
// 设备异常检修排程系统 - 行动计划领域模型
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 1.2 行动计划实体
// ==========================================
// 与异常一对一; 排程核心只读, 用于评分与建窗尺寸推导
// ==========================================

use crate::domain::types::WindowType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ActionPlan - 行动计划
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionPlan {
    // ===== 主键 =====
    pub plan_id: String, // UUID

    // ===== 关联 =====
    pub anomaly_id: String, // 一对一关联的异常

    // ===== 停机需求 =====
    pub needs_outage: bool,               // 是否需要停机
    pub outage_type: Option<WindowType>,  // 停机类型 (需要停机时有效)

    // ===== 工期与优先级 =====
    pub total_duration_days: f64,        // 总工期 (天)
    pub total_duration_hours: Option<f64>, // 总工时 (小时)
    pub priority: i32,                   // 1=最紧急 .. 5=最宽松
    pub completed: bool,                 // 是否已完成

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ActionPlan {
    /// 工期是否能放进指定天数的窗口
    pub fn fits_within_days(&self, window_days: i64) -> bool {
        self.total_duration_days <= window_days as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_within_days() {
        let plan = ActionPlan {
            plan_id: "P001".to_string(),
            anomaly_id: "A001".to_string(),
            needs_outage: false,
            outage_type: None,
            total_duration_days: 2.5,
            total_duration_hours: Some(20.0),
            priority: 3,
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(plan.fits_within_days(3));
        assert!(!plan.fits_within_days(2));
    }
}
