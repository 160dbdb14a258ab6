// ==========================================
// 设备异常检修排程系统 - 自动建窗尺寸推导
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 4.4 自动建窗
// ==========================================
// 红线: 推导是纯函数, 不落库; 持久化由调用方负责
// 规则按顺序求值, 首个命中生效
// ==========================================

use crate::config::planning_config::PlanningConfiguration;
use crate::domain::action_plan::ActionPlan;
use crate::domain::anomaly::Anomaly;
use crate::domain::types::{CriticalityLevel, SchedulingUrgency, WindowType};
use crate::domain::window::MaintenanceWindow;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use uuid::Uuid;

/// 抢修窗口工期上限 (天)
const FORCE_MAX_DAYS: i64 = 3;
/// 大修窗口工期上限 (天)
const MAJOR_MAX_DAYS: i64 = 14;
/// 小修窗口工期上限 (天)
const MINOR_MAX_DAYS: i64 = 7;
/// 大修判定: 最长计划工期界限 (天)
const MAJOR_PLAN_DAYS: f64 = 7.0;
/// 大修判定: 计划数量界限
const MAJOR_PLAN_COUNT: usize = 3;
/// flexible 起始日偏移 (天)
const FLEXIBLE_OFFSET_DAYS: i64 = 5;

// ==========================================
// WindowSizer - 窗口尺寸推导器
// ==========================================
#[derive(Debug, Default)]
pub struct WindowSizer;

impl WindowSizer {
    pub fn new() -> Self {
        Self
    }

    /// 为一批待建窗异常推导新窗口
    ///
    /// # 参数
    /// - anomalies: 目标异常 (至少一个; 首个异常记为建窗来源)
    /// - plans: 目标异常的行动计划 (可为空, 此时按最小工期 1 天建窗)
    /// - config: 排程配置 (取窗口类型对应的开窗时机)
    /// - today: 推导基准日
    ///
    /// # 返回
    /// 新窗口 (PLANNED, auto_created=true), 未持久化
    pub fn derive_window(
        &self,
        anomalies: &[Anomaly],
        plans: &[ActionPlan],
        config: &PlanningConfiguration,
        today: NaiveDate,
    ) -> MaintenanceWindow {
        let max_plan_days = plans
            .iter()
            .map(|p| p.total_duration_days)
            .fold(0.0_f64, f64::max);
        // 无计划时按 1 天起步
        let base_days = (max_plan_days.ceil() as i64).max(1);

        let any_critical = anomalies
            .iter()
            .any(|a| a.criticality_level() == CriticalityLevel::Critical);
        let any_high = anomalies
            .iter()
            .any(|a| a.criticality_level() == CriticalityLevel::High);
        let urgent_outage = plans.iter().any(|p| p.needs_outage && p.priority <= 2);

        let (window_type, duration_days) = if urgent_outage || any_critical {
            (WindowType::Force, base_days.min(FORCE_MAX_DAYS))
        } else if max_plan_days > MAJOR_PLAN_DAYS || plans.len() > MAJOR_PLAN_COUNT || any_high {
            (WindowType::Major, (base_days + 2).min(MAJOR_MAX_DAYS))
        } else {
            (WindowType::Minor, (base_days + 1).min(MINOR_MAX_DAYS))
        };

        let urgency = config
            .window_preferences
            .for_type(window_type)
            .scheduling_urgency;
        let start_date = Self::start_date_for(urgency, today);

        let mut window = MaintenanceWindow::new(
            Uuid::new_v4().to_string(),
            window_type,
            duration_days,
            start_date,
        );
        window.auto_created = true;
        window.source_anomaly_id = anomalies.first().map(|a| a.anomaly_id.clone());
        window.description = Some(format!("自动建窗 ({} 项异常)", anomalies.len()));
        window
    }

    /// 按开窗时机推导起始日期
    fn start_date_for(urgency: SchedulingUrgency, today: NaiveDate) -> NaiveDate {
        match urgency {
            SchedulingUrgency::Immediate => today + Duration::days(1),
            SchedulingUrgency::Weekend => Self::next_saturday(today),
            SchedulingUrgency::Flexible => today + Duration::days(FLEXIBLE_OFFSET_DAYS),
        }
    }

    /// 下一个周六; 当天已是周六时顺延一周
    fn next_saturday(today: NaiveDate) -> NaiveDate {
        let today_offset = today.weekday().num_days_from_monday() as i64;
        let saturday_offset = Weekday::Sat.num_days_from_monday() as i64;
        let mut days_ahead = (saturday_offset - today_offset).rem_euclid(7);
        if days_ahead == 0 {
            days_ahead = 7;
        }
        today + Duration::days(days_ahead)
    }
}
