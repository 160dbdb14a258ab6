// ==========================================
// 设备异常检修排程系统 - 检修窗口领域模型
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 1.3 检修窗口实体
// ==========================================
// 红线: end_date - start_date == duration_days (窗口不变量)
// 窗口创建后, 排程核心只做分派变更, 不做结构变更
// ==========================================

use crate::domain::types::{WindowStatus, WindowType};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// MaintenanceWindow - 检修窗口
// ==========================================
// 已分派异常列表不落在窗口上, 由 anomaly.window_id 关联派生
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceWindow {
    // ===== 主键 =====
    pub window_id: String, // UUID

    // ===== 窗口参数 =====
    pub window_type: WindowType,
    pub duration_days: i64,     // 工期 (天)
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,    // = start_date + duration_days
    pub status: WindowStatus,
    pub description: Option<String>,

    // ===== 自动建窗标记 =====
    pub auto_created: bool,              // 是否由 WindowSizer 自动创建
    pub source_anomaly_id: Option<String>, // 触发自动建窗的异常

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
}

impl MaintenanceWindow {
    /// 构造窗口并按不变量补齐 end_date
    pub fn new(
        window_id: String,
        window_type: WindowType,
        duration_days: i64,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            window_id,
            window_type,
            duration_days,
            start_date,
            end_date: start_date + Duration::days(duration_days),
            status: WindowStatus::Planned,
            description: None,
            auto_created: false,
            source_anomaly_id: None,
            created_at: Utc::now(),
        }
    }

    /// 校验窗口不变量
    pub fn invariant_holds(&self) -> bool {
        self.end_date - self.start_date == Duration::days(self.duration_days)
    }

    /// 距离开窗的天数 (负数=已开始)
    pub fn days_until_start(&self, today: NaiveDate) -> i64 {
        (self.start_date - today).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_window_invariant() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let window = MaintenanceWindow::new("W001".to_string(), WindowType::Minor, 7, start);

        assert!(window.invariant_holds());
        assert_eq!(window.end_date, NaiveDate::from_ymd_opt(2026, 3, 17).unwrap());
        assert_eq!(window.status, WindowStatus::Planned);
    }

    #[test]
    fn test_days_until_start() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let window = MaintenanceWindow::new("W001".to_string(), WindowType::Force, 2, start);

        let today = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(window.days_until_start(today), 5);

        let later = NaiveDate::from_ymd_opt(2026, 3, 12).unwrap();
        assert_eq!(window.days_until_start(later), -2);
    }
}
