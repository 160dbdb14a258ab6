// ==========================================
// 设备异常检修排程系统 - 排程再优化器
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 4.5 再优化
// ==========================================
// 红线: 首个达标改进即迁移 (first-improvement), 不追求全局最优;
// 窗口利用率只出建议文本, 不自动改窗口结构
// ==========================================

use crate::config::planning_config::PlanningConfiguration;
use crate::domain::action_plan::ActionPlan;
use crate::domain::anomaly::Anomaly;
use crate::domain::session::SessionOutcome;
use crate::domain::types::{SessionType, WindowStatus};
use crate::domain::window::MaintenanceWindow;
use crate::engine::compatibility::CompatibilityScorer;
use crate::engine::error::EngineResult;
use crate::engine::session_recorder::SessionRecorder;
use crate::engine::stores::ScheduleStore;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 利用率过低界限 (%), 低于此值建议合并窗口
const LOW_UTILIZATION_PCT: f64 = 50.0;
/// 利用率过高界限 (%), 高于此值建议拆分或延长
const HIGH_UTILIZATION_PCT: f64 = 95.0;

// ==========================================
// 结果结构
// ==========================================

/// 单条迁移记录
#[derive(Debug, Clone, Serialize)]
pub struct Reassignment {
    pub anomaly_id: String,
    pub old_window_id: String,
    pub new_window_id: String,
    /// 新旧窗口分差
    pub improvement: f64,
}

/// 单窗口利用率评估
#[derive(Debug, Clone, Serialize)]
pub struct WindowUtilization {
    pub window_id: String,
    /// 已分派计划工期合计 / 窗口工期 * 100
    pub utilization_pct: f64,
    /// 利用率异常时的处置建议 (正常区间为 None)
    pub suggestion: Option<String>,
}

/// 一次再优化运行的结果
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub session_id: String,
    pub reassignments: Vec<Reassignment>,
    pub window_optimizations: Vec<WindowUtilization>,
    /// 迁移分差均值 (无迁移时为 0)
    pub overall_improvement: f64,
}

// ==========================================
// Optimizer - 再优化器
// ==========================================
pub struct Optimizer {
    scorer: CompatibilityScorer,
    store: Arc<dyn ScheduleStore>,
    sessions: Arc<dyn SessionRecorder>,
}

impl Optimizer {
    pub fn new(store: Arc<dyn ScheduleStore>, sessions: Arc<dyn SessionRecorder>) -> Self {
        Self {
            scorer: CompatibilityScorer::new(),
            store,
            sessions,
        }
    }

    /// 再优化: 逐个检查已排程异常是否存在明显更优的窗口
    ///
    /// # 参数
    /// - anomalies: 已治理异常 (只处理已分派的)
    /// - windows: 全量窗口 (备选只取 PLANNED)
    /// - plans: anomaly_id -> 行动计划
    /// - config: 排程配置
    /// - today: 评分基准日
    pub async fn optimize(
        &self,
        anomalies: Vec<Anomaly>,
        windows: Vec<MaintenanceWindow>,
        plans: &HashMap<String, ActionPlan>,
        config: &PlanningConfiguration,
        today: NaiveDate,
    ) -> EngineResult<OptimizationResult> {
        let scheduled: Vec<Anomaly> = anomalies
            .into_iter()
            .filter(|a| a.is_scheduled() && !a.anomaly_id.trim().is_empty())
            .collect();

        let session_id = self
            .sessions
            .start_session(SessionType::Optimization, scheduled.len() as i64)
            .await?;
        info!(
            session_id = %session_id,
            scheduled_count = scheduled.len(),
            "再优化开始"
        );

        match self
            .run_optimize(&session_id, scheduled, windows, plans, config, today)
            .await
        {
            Ok(result) => Ok(result),
            Err(e) => {
                let message = e.to_string();
                warn!(session_id = %session_id, error = %message, "再优化失败");
                if let Err(fail_err) = self.sessions.fail_session(&session_id, &message).await {
                    warn!(session_id = %session_id, error = %fail_err, "会话失败状态落库未成功");
                }
                Err(e)
            }
        }
    }

    async fn run_optimize(
        &self,
        session_id: &str,
        scheduled: Vec<Anomaly>,
        windows: Vec<MaintenanceWindow>,
        plans: &HashMap<String, ActionPlan>,
        config: &PlanningConfiguration,
        today: NaiveDate,
    ) -> EngineResult<OptimizationResult> {
        let windows_by_id: HashMap<&str, &MaintenanceWindow> = windows
            .iter()
            .map(|w| (w.window_id.as_str(), w))
            .collect();
        let planned: Vec<&MaintenanceWindow> = windows
            .iter()
            .filter(|w| w.status == WindowStatus::Planned)
            .collect();

        let mut reassignments: Vec<Reassignment> = Vec::new();
        // 迁移后的窗口引用, 用于利用率统计
        let mut current_refs: HashMap<String, String> = HashMap::new();

        for anomaly in &scheduled {
            let current_window_id = match anomaly.window_id.as_deref() {
                Some(id) => id,
                None => continue,
            };
            let current_window = match windows_by_id.get(current_window_id) {
                Some(window) => *window,
                None => {
                    // 引用了不存在的窗口: 记录并跳过, 不中断运行
                    warn!(
                        anomaly_id = %anomaly.anomaly_id,
                        window_id = %current_window_id,
                        "异常引用的窗口不存在, 跳过"
                    );
                    continue;
                }
            };

            let plan = plans.get(&anomaly.anomaly_id);
            let current_score = self
                .scorer
                .score(anomaly, current_window, plan, config, today);
            current_refs.insert(anomaly.anomaly_id.clone(), current_window_id.to_string());

            // 首个分差超过 reassignment_min_gain 的备选窗口即迁移
            for candidate in &planned {
                if candidate.window_id == current_window_id {
                    continue;
                }
                let candidate_score = self.scorer.score(anomaly, candidate, plan, config, today);
                let improvement = candidate_score - current_score;
                if improvement > config.reassignment_min_gain {
                    self.store
                        .update_anomaly_window(&anomaly.anomaly_id, Some(&candidate.window_id))
                        .await?;
                    debug!(
                        anomaly_id = %anomaly.anomaly_id,
                        old_window_id = %current_window_id,
                        new_window_id = %candidate.window_id,
                        improvement,
                        "迁移到更优窗口"
                    );
                    current_refs
                        .insert(anomaly.anomaly_id.clone(), candidate.window_id.clone());
                    reassignments.push(Reassignment {
                        anomaly_id: anomaly.anomaly_id.clone(),
                        old_window_id: current_window_id.to_string(),
                        new_window_id: candidate.window_id.clone(),
                        improvement,
                    });
                    break;
                }
            }
        }

        let window_optimizations =
            Self::assess_utilization(&planned, &scheduled, &current_refs, plans);

        let overall_improvement = if reassignments.is_empty() {
            0.0
        } else {
            reassignments.iter().map(|r| r.improvement).sum::<f64>() / reassignments.len() as f64
        };

        let outcome = SessionOutcome {
            processed_count: scheduled.len() as i64,
            scheduled_count: reassignments.len() as i64,
            windows_created: 0,
            optimization_score: overall_improvement,
        };
        self.sessions.complete_session(session_id, &outcome).await?;

        info!(
            session_id = %session_id,
            reassignments = reassignments.len(),
            overall_improvement,
            "再优化完成"
        );

        Ok(OptimizationResult {
            session_id: session_id.to_string(),
            reassignments,
            window_optimizations,
            overall_improvement,
        })
    }

    /// 按迁移后的分派状态评估各 PLANNED 窗口利用率
    fn assess_utilization(
        planned: &[&MaintenanceWindow],
        scheduled: &[Anomaly],
        current_refs: &HashMap<String, String>,
        plans: &HashMap<String, ActionPlan>,
    ) -> Vec<WindowUtilization> {
        planned
            .iter()
            .map(|window| {
                let assigned_days: f64 = scheduled
                    .iter()
                    .filter(|a| {
                        current_refs.get(&a.anomaly_id).map(String::as_str)
                            == Some(window.window_id.as_str())
                    })
                    .filter_map(|a| plans.get(&a.anomaly_id))
                    .map(|p| p.total_duration_days)
                    .sum();
                let utilization_pct = if window.duration_days > 0 {
                    assigned_days / window.duration_days as f64 * 100.0
                } else {
                    0.0
                };

                let suggestion = if utilization_pct < LOW_UTILIZATION_PCT {
                    Some("利用率过低, 建议与相邻窗口合并".to_string())
                } else if utilization_pct > HIGH_UTILIZATION_PCT {
                    Some("利用率过高, 建议拆分或延长窗口".to_string())
                } else {
                    None
                };

                WindowUtilization {
                    window_id: window.window_id.clone(),
                    utilization_pct,
                    suggestion,
                }
            })
            .collect()
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{AnomalyStatus, SessionStatus, WindowType};
    use crate::engine::session_recorder::InMemorySessionRecorder;
    use crate::engine::stores::InMemoryScheduleStore;
    use chrono::{Duration, Utc};

    fn create_test_anomaly(id: &str, ri: i32, av: i32, ps: i32, window_id: &str) -> Anomaly {
        Anomaly {
            anomaly_id: id.to_string(),
            equipment_number: format!("EQ-{}", id),
            system_name: None,
            description: None,
            detection_date: None,
            reliability_integrity_score: ri,
            availability_score: av,
            process_safety_score: ps,
            status: AnomalyStatus::Treated,
            priority: None,
            estimated_hours: None,
            window_id: Some(window_id.to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn create_test_plan(anomaly_id: &str, days: f64) -> ActionPlan {
        ActionPlan {
            plan_id: format!("P-{}", anomaly_id),
            anomaly_id: anomaly_id.to_string(),
            needs_outage: false,
            outage_type: None,
            total_duration_days: days,
            total_duration_hours: None,
            priority: 3,
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn make_optimizer() -> (Optimizer, Arc<InMemoryScheduleStore>, Arc<InMemorySessionRecorder>) {
        let store = Arc::new(InMemoryScheduleStore::new());
        let sessions = Arc::new(InMemorySessionRecorder::new());
        let optimizer = Optimizer::new(store.clone(), sessions.clone());
        (optimizer, store, sessions)
    }

    #[tokio::test]
    async fn test_reassignment_on_material_improvement() {
        // 场景1: 高危异常被放在偏好不匹配的小修窗口 (45分),
        // 存在偏好匹配的大修窗口 (75分), 分差30 > 15 => 迁移
        let (optimizer, store, _) = make_optimizer();
        let config = PlanningConfiguration::default();

        let anomaly = create_test_anomaly("A001", 2, 2, 3, "W-MINOR"); // HIGH
        let minor = MaintenanceWindow::new(
            "W-MINOR".to_string(),
            WindowType::Minor,
            3,
            today() + Duration::days(10),
        );
        let major = MaintenanceWindow::new(
            "W-MAJOR".to_string(),
            WindowType::Major,
            7,
            today() + Duration::days(14),
        );

        let result = optimizer
            .optimize(
                vec![anomaly],
                vec![minor, major],
                &HashMap::new(),
                &config,
                today(),
            )
            .await
            .unwrap();

        assert_eq!(result.reassignments.len(), 1);
        let re = &result.reassignments[0];
        assert_eq!(re.anomaly_id, "A001");
        assert_eq!(re.old_window_id, "W-MINOR");
        assert_eq!(re.new_window_id, "W-MAJOR");
        assert_eq!(re.improvement, 30.0);
        assert_eq!(result.overall_improvement, 30.0);
        assert_eq!(
            store.window_ref("A001"),
            Some(Some("W-MAJOR".to_string()))
        );
    }

    #[tokio::test]
    async fn test_no_reassignment_below_min_gain() {
        // 场景2: 分差不超过 15 => 不迁移
        let (optimizer, store, _) = make_optimizer();
        let config = PlanningConfiguration::default();

        // MEDIUM 在 Minor (50分, 偏好命中) vs Major (50分, 偏好命中) => 分差0
        let anomaly = create_test_anomaly("A001", 1, 2, 2, "W1");
        let w1 = MaintenanceWindow::new(
            "W1".to_string(),
            WindowType::Minor,
            3,
            today() + Duration::days(10),
        );
        let w2 = MaintenanceWindow::new(
            "W2".to_string(),
            WindowType::Major,
            7,
            today() + Duration::days(14),
        );

        let result = optimizer
            .optimize(vec![anomaly], vec![w1, w2], &HashMap::new(), &config, today())
            .await
            .unwrap();

        assert!(result.reassignments.is_empty());
        assert_eq!(result.overall_improvement, 0.0);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_unscheduled_anomalies_are_ignored() {
        // 场景3: 未分派异常不参与再优化
        let (optimizer, _, sessions) = make_optimizer();
        let config = PlanningConfiguration::default();

        let mut anomaly = create_test_anomaly("A001", 2, 2, 3, "W1");
        anomaly.window_id = None;

        let result = optimizer
            .optimize(vec![anomaly], vec![], &HashMap::new(), &config, today())
            .await
            .unwrap();

        assert!(result.reassignments.is_empty());
        assert_eq!(sessions.sessions()[0].processed_count, 0);
        assert_eq!(sessions.sessions()[0].status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn test_dangling_window_reference_is_skipped() {
        // 场景4: 异常引用不存在的窗口 => 跳过不报错
        let (optimizer, _, _) = make_optimizer();
        let config = PlanningConfiguration::default();

        let anomaly = create_test_anomaly("A001", 2, 2, 3, "W-GONE");
        let result = optimizer
            .optimize(vec![anomaly], vec![], &HashMap::new(), &config, today())
            .await
            .unwrap();

        assert!(result.reassignments.is_empty());
    }

    #[tokio::test]
    async fn test_utilization_advisories() {
        // 场景5: 利用率 <50% 建议合并, >95% 建议拆分, 区间内无建议
        let (optimizer, _, _) = make_optimizer();
        let config = PlanningConfiguration::default();

        // W-LOW: 10天窗口只占 1 天 => 10%
        // W-HIGH: 2天窗口占 2 天 => 100%
        // W-OK: 4天窗口占 3 天 => 75%
        let w_low = MaintenanceWindow::new(
            "W-LOW".to_string(),
            WindowType::Major,
            10,
            today() + Duration::days(14),
        );
        let w_high = MaintenanceWindow::new(
            "W-HIGH".to_string(),
            WindowType::Minor,
            2,
            today() + Duration::days(40),
        );
        let w_ok = MaintenanceWindow::new(
            "W-OK".to_string(),
            WindowType::Minor,
            4,
            today() + Duration::days(40),
        );

        let anomalies = vec![
            create_test_anomaly("A1", 2, 2, 3, "W-LOW"),   // HIGH, 偏好命中不迁移
            create_test_anomaly("A2", 1, 0, 1, "W-HIGH"), // LOW
            create_test_anomaly("A3", 1, 0, 1, "W-OK"),   // LOW
        ];
        let mut plans = HashMap::new();
        plans.insert("A1".to_string(), create_test_plan("A1", 1.0));
        plans.insert("A2".to_string(), create_test_plan("A2", 2.0));
        plans.insert("A3".to_string(), create_test_plan("A3", 3.0));

        let result = optimizer
            .optimize(anomalies, vec![w_low, w_high, w_ok], &plans, &config, today())
            .await
            .unwrap();

        let by_id: HashMap<&str, &WindowUtilization> = result
            .window_optimizations
            .iter()
            .map(|u| (u.window_id.as_str(), u))
            .collect();

        assert_eq!(by_id["W-LOW"].utilization_pct, 10.0);
        assert!(by_id["W-LOW"].suggestion.as_deref().unwrap().contains("合并"));
        assert_eq!(by_id["W-HIGH"].utilization_pct, 100.0);
        assert!(by_id["W-HIGH"].suggestion.as_deref().unwrap().contains("拆分"));
        assert_eq!(by_id["W-OK"].utilization_pct, 75.0);
        assert!(by_id["W-OK"].suggestion.is_none());
    }

    #[tokio::test]
    async fn test_persistence_failure_marks_session_failed() {
        // 场景6: 迁移写库失败 => 会话 FAILED, 错误向上传播
        let store = Arc::new(InMemoryScheduleStore::with_failure_after(0));
        let sessions = Arc::new(InMemorySessionRecorder::new());
        let optimizer = Optimizer::new(store, sessions.clone());
        let config = PlanningConfiguration::default();

        let anomaly = create_test_anomaly("A001", 2, 2, 3, "W-MINOR"); // HIGH
        let minor = MaintenanceWindow::new(
            "W-MINOR".to_string(),
            WindowType::Minor,
            3,
            today() + Duration::days(10),
        );
        let major = MaintenanceWindow::new(
            "W-MAJOR".to_string(),
            WindowType::Major,
            7,
            today() + Duration::days(14),
        );

        let result = optimizer
            .optimize(vec![anomaly], vec![minor, major], &HashMap::new(), &config, today())
            .await;

        assert!(result.is_err());
        assert_eq!(sessions.sessions()[0].status, SessionStatus::Failed);
    }
}
