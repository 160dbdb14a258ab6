// ==========================================
// 设备异常检修排程系统 - 兼容性评分器
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 4.1 兼容性评分
// ==========================================
// 红线: 评分必须是纯函数, 同输入同输出, 不访问存储
// 分数范围: [0, 100], 越高越适合分派
// ==========================================

use crate::config::planning_config::PlanningConfiguration;
use crate::domain::action_plan::ActionPlan;
use crate::domain::anomaly::Anomaly;
use crate::domain::types::CriticalityLevel;
use crate::domain::window::MaintenanceWindow;
use chrono::NaiveDate;

/// 危害严重时希望尽快进场的时间界限 (天)
const CRITICAL_SOON_DAYS: i64 = 7;
/// 低危异常可以接受的延后界限 (天)
const LOW_DEFER_DAYS: i64 = 30;
/// 工期富余判定比例: 计划工期不超过窗口工期的 80% 视为宽裕
const COMFORTABLE_FIT_RATIO: f64 = 0.8;

// ==========================================
// CompatibilityScorer - 兼容性评分器
// ==========================================
#[derive(Debug, Default)]
pub struct CompatibilityScorer;

impl CompatibilityScorer {
    pub fn new() -> Self {
        Self
    }

    /// 计算单个 (异常, 窗口) 组合的兼容分
    ///
    /// # 参数
    /// - anomaly: 待分派异常
    /// - window: 候选检修窗口
    /// - plan: 异常对应的行动计划 (可缺)
    /// - config: 排程配置 (基础分表/偏好表)
    /// - today: 评分基准日 (显式传入保证可测)
    ///
    /// # 返回
    /// [0, 100] 区间的兼容分
    pub fn score(
        &self,
        anomaly: &Anomaly,
        window: &MaintenanceWindow,
        plan: Option<&ActionPlan>,
        config: &PlanningConfiguration,
        today: NaiveDate,
    ) -> f64 {
        let criticality = anomaly.criticality_level();

        // 第一步: 危害等级基础分
        let mut score = config.criticality_weights.weight_for(criticality);

        // 第二步: 窗口类型偏好, 未命中偏好列表乘惩罚系数
        let preference = config.window_preferences.for_type(window.window_type);
        if !preference.preferred_criticalities.contains(&criticality) {
            score *= 0.6;
        }

        // 第三步: 工期匹配
        if let Some(plan) = plan {
            if plan.fits_within_days(window.duration_days) {
                score += 20.0;
                // 工期富余再加分
                if plan.total_duration_days <= window.duration_days as f64 * COMFORTABLE_FIT_RATIO {
                    score += 10.0;
                }
            } else {
                // 窗口装不下计划工期
                score -= 30.0;
            }
        }

        // 第四步: 优先级加分
        score += match anomaly.priority {
            Some(1) => 20.0,
            Some(2) => 15.0,
            Some(3) => 10.0,
            Some(4) => 5.0,
            _ => 0.0,
        };

        // 第五步: 时机加分
        let days_until = window.days_until_start(today);
        if criticality == CriticalityLevel::Critical && days_until <= CRITICAL_SOON_DAYS {
            score += 15.0;
        }
        if criticality == CriticalityLevel::Low && days_until > LOW_DEFER_DAYS {
            score += 10.0;
        }

        // 第六步: 截断到 [0, 100]
        score.clamp(0.0, 100.0)
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{AnomalyStatus, WindowType};
    use chrono::Utc;

    fn create_test_anomaly(ri: i32, av: i32, ps: i32, priority: Option<i32>) -> Anomaly {
        Anomaly {
            anomaly_id: "A001".to_string(),
            equipment_number: "EQ-F3-001".to_string(),
            system_name: Some("液压系统".to_string()),
            description: None,
            detection_date: None,
            reliability_integrity_score: ri,
            availability_score: av,
            process_safety_score: ps,
            status: AnomalyStatus::Treated,
            priority,
            estimated_hours: None,
            window_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn create_test_plan(duration_days: f64) -> ActionPlan {
        ActionPlan {
            plan_id: "P001".to_string(),
            anomaly_id: "A001".to_string(),
            needs_outage: false,
            outage_type: None,
            total_duration_days: duration_days,
            total_duration_hours: None,
            priority: 3,
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn create_test_window(
        window_type: WindowType,
        duration_days: i64,
        start: NaiveDate,
    ) -> MaintenanceWindow {
        MaintenanceWindow::new("W001".to_string(), window_type, duration_days, start)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn test_scenario_1_low_anomaly_distant_minor_window() {
        // 场景1: 低危异常 + 40天后的小修窗口
        // 基础分25 + 工期匹配30 + 时机加分10 = 65
        let scorer = CompatibilityScorer::new();
        let config = PlanningConfiguration::default();

        let anomaly = create_test_anomaly(1, 0, 1, None); // 总分2 => LOW
        let plan = create_test_plan(1.0);
        let window = create_test_window(
            WindowType::Minor,
            7,
            today() + chrono::Duration::days(40),
        );

        let score = scorer.score(&anomaly, &window, Some(&plan), &config, today());
        assert_eq!(score, 65.0);
    }

    #[test]
    fn test_scenario_2_critical_anomaly_near_force_window() {
        // 场景2: 严重异常 + 3天后的抢修窗口
        // 基础分100 + 工期匹配30 + 时机加分15 => 截断到 100
        let scorer = CompatibilityScorer::new();
        let config = PlanningConfiguration::default();

        let anomaly = create_test_anomaly(5, 5, 4, None); // 总分14 => CRITICAL
        let plan = create_test_plan(1.0);
        let window =
            create_test_window(WindowType::Force, 3, today() + chrono::Duration::days(3));

        let score = scorer.score(&anomaly, &window, Some(&plan), &config, today());
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_scenario_3_preference_mismatch_penalty() {
        // 场景3: 低危异常进抢修窗口, 偏好未命中乘 0.6
        let scorer = CompatibilityScorer::new();
        let config = PlanningConfiguration::default();

        let anomaly = create_test_anomaly(1, 0, 1, None); // LOW
        let window =
            create_test_window(WindowType::Force, 3, today() + chrono::Duration::days(3));

        // 无计划无优先级: 25 * 0.6 = 15
        let score = scorer.score(&anomaly, &window, None, &config, today());
        assert_eq!(score, 15.0);
    }

    #[test]
    fn test_scenario_4_oversized_plan_penalty() {
        // 场景4: 计划工期超过窗口工期, 扣 30 分
        let scorer = CompatibilityScorer::new();
        let config = PlanningConfiguration::default();

        let anomaly = create_test_anomaly(2, 2, 3, None); // 总分7 => HIGH
        let plan = create_test_plan(10.0);
        let window =
            create_test_window(WindowType::Major, 5, today() + chrono::Duration::days(10));

        // 75 (偏好命中) - 30 = 45
        let score = scorer.score(&anomaly, &window, Some(&plan), &config, today());
        assert_eq!(score, 45.0);
    }

    #[test]
    fn test_scenario_5_priority_bonus_ladder() {
        // 场景5: 优先级加分阶梯 1→20 .. 5→0
        let scorer = CompatibilityScorer::new();
        let config = PlanningConfiguration::default();
        let window =
            create_test_window(WindowType::Minor, 7, today() + chrono::Duration::days(10));

        let base = scorer.score(
            &create_test_anomaly(1, 1, 2, None),
            &window,
            None,
            &config,
            today(),
        );
        for (priority, bonus) in [(1, 20.0), (2, 15.0), (3, 10.0), (4, 5.0), (5, 0.0)] {
            let score = scorer.score(
                &create_test_anomaly(1, 1, 2, Some(priority)),
                &window,
                None,
                &config,
                today(),
            );
            assert_eq!(score, base + bonus, "priority={}", priority);
        }
    }

    #[test]
    fn test_score_is_deterministic_and_bounded() {
        // 纯函数: 同输入两次评分一致, 且始终落在 [0,100]
        let scorer = CompatibilityScorer::new();
        let config = PlanningConfiguration::default();

        let anomaly = create_test_anomaly(5, 5, 5, Some(1));
        let plan = create_test_plan(0.5);
        let window =
            create_test_window(WindowType::Force, 3, today() + chrono::Duration::days(1));

        let first = scorer.score(&anomaly, &window, Some(&plan), &config, today());
        let second = scorer.score(&anomaly, &window, Some(&plan), &config, today());
        assert_eq!(first, second);
        assert!((0.0..=100.0).contains(&first));
    }
}
