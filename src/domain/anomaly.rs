// ==========================================
// 设备异常检修排程系统 - 异常领域模型
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 1.1 异常实体
// ==========================================
// 生命周期由外部系统维护; 排程核心只改写 window_id 字段
// ==========================================

use crate::domain::types::{AnomalyStatus, CriticalityLevel};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Anomaly - 设备异常
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    // ===== 主键 =====
    pub anomaly_id: String, // UUID

    // ===== 设备信息 =====
    pub equipment_number: String,        // 设备编号
    pub system_name: Option<String>,     // 所属系统 (如液压/电气)
    pub description: Option<String>,     // 异常描述
    pub detection_date: Option<NaiveDate>, // 检出日期

    // ===== 危害评分 (各 1-5) =====
    pub reliability_integrity_score: i32, // 可靠性完整性
    pub availability_score: i32,          // 可用性
    pub process_safety_score: i32,        // 过程安全

    // ===== 排程相关 =====
    pub status: AnomalyStatus,
    pub priority: Option<i32>,          // 1=最紧急 .. 5=最宽松
    pub estimated_hours: Option<f64>,   // 预估治理工时
    pub window_id: Option<String>,      // 已分派的检修窗口 (None=未排程)

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Anomaly {
    /// 三项子评分求和 (0-15 量表)
    pub fn total_score(&self) -> i32 {
        self.reliability_integrity_score + self.availability_score + self.process_safety_score
    }

    /// 由子评分总和派生危害等级
    pub fn criticality_level(&self) -> CriticalityLevel {
        CriticalityLevel::from_total_score(self.total_score())
    }

    /// 是否已分派到检修窗口
    pub fn is_scheduled(&self) -> bool {
        self.window_id.is_some()
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn sample_anomaly(ri: i32, av: i32, ps: i32) -> Anomaly {
        Anomaly {
            anomaly_id: "A001".to_string(),
            equipment_number: "EQ001".to_string(),
            system_name: Some("Hydraulic".to_string()),
            description: None,
            detection_date: None,
            reliability_integrity_score: ri,
            availability_score: av,
            process_safety_score: ps,
            status: AnomalyStatus::Treated,
            priority: None,
            estimated_hours: None,
            window_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_criticality_derivation() {
        // 4+3+5=12 => CRITICAL
        assert_eq!(
            sample_anomaly(4, 3, 5).criticality_level(),
            CriticalityLevel::Critical
        );
        // 2+2+3=7 => HIGH
        assert_eq!(
            sample_anomaly(2, 2, 3).criticality_level(),
            CriticalityLevel::High
        );
        // 1+1+2=4 => MEDIUM
        assert_eq!(
            sample_anomaly(1, 1, 2).criticality_level(),
            CriticalityLevel::Medium
        );
        // 1+0+1=2 => LOW
        assert_eq!(
            sample_anomaly(1, 0, 1).criticality_level(),
            CriticalityLevel::Low
        );
    }

    #[test]
    fn test_is_scheduled() {
        let mut anomaly = sample_anomaly(3, 3, 3);
        assert!(!anomaly.is_scheduled());
        anomaly.window_id = Some("W001".to_string());
        assert!(anomaly.is_scheduled());
    }
}
