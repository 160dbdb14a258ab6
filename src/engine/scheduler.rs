// ==========================================
// 设备异常检修排程系统 - 自动排程编排器
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 4.3 自动排程
// ==========================================
// 红线: 单线程逐项贪心, 不做全局最优;
// 写失败即终止运行并将会话置 FAILED, 已提交的分派不回滚
// ==========================================

use crate::config::planning_config::PlanningConfiguration;
use crate::domain::action_plan::ActionPlan;
use crate::domain::anomaly::Anomaly;
use crate::domain::types::{CriticalityLevel, SessionType, WindowStatus};
use crate::domain::window::MaintenanceWindow;
use crate::engine::capacity::CapacityTracker;
use crate::engine::compatibility::CompatibilityScorer;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::session_recorder::SessionRecorder;
use crate::engine::stores::ScheduleStore;
use crate::engine::window_sizer::WindowSizer;
use crate::domain::session::SessionOutcome;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ==========================================
// 结果结构
// ==========================================

/// 单条分派记录
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub anomaly_id: String,
    pub window_id: String,
    pub score: f64,
    /// 决策依据 (JSON 字符串, 便于前端直接展示)
    pub reason: String,
}

/// 一次自动排程运行的结果
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResult {
    pub session_id: String,
    pub assignments: Vec<Assignment>,
    pub new_windows: Vec<MaintenanceWindow>,
    pub unassigned: Vec<String>,
    /// 本次运行所有分派分数的算术平均 (无分派时为 0)
    pub optimization_score: f64,
}

// ==========================================
// Scheduler - 自动排程编排器
// ==========================================
pub struct Scheduler {
    scorer: CompatibilityScorer,
    sizer: WindowSizer,
    store: Arc<dyn ScheduleStore>,
    sessions: Arc<dyn SessionRecorder>,
}

impl Scheduler {
    pub fn new(store: Arc<dyn ScheduleStore>, sessions: Arc<dyn SessionRecorder>) -> Self {
        Self {
            scorer: CompatibilityScorer::new(),
            sizer: WindowSizer::new(),
            store,
            sessions,
        }
    }

    /// 自动排程: 已治理未排程异常 -> 检修窗口
    ///
    /// # 参数
    /// - anomalies: 待分派异常 (TREATED 且未分派)
    /// - windows: 候选窗口 (只考虑 PLANNED)
    /// - plans: anomaly_id -> 行动计划
    /// - assigned_counts: window_id -> 运行前已分派计数
    /// - config: 排程配置
    /// - today: 评分/建窗基准日
    pub async fn auto_schedule(
        &self,
        anomalies: Vec<Anomaly>,
        windows: Vec<MaintenanceWindow>,
        plans: &HashMap<String, ActionPlan>,
        assigned_counts: &HashMap<String, usize>,
        config: &PlanningConfiguration,
        today: NaiveDate,
    ) -> EngineResult<ScheduleResult> {
        let session_id = self
            .sessions
            .start_session(SessionType::Auto, anomalies.len() as i64)
            .await?;
        info!(
            session_id = %session_id,
            anomaly_count = anomalies.len(),
            window_count = windows.len(),
            "自动排程开始"
        );

        match self
            .run_auto(&session_id, anomalies, windows, plans, assigned_counts, config, today)
            .await
        {
            Ok(result) => Ok(result),
            Err(e) => {
                let message = e.to_string();
                warn!(session_id = %session_id, error = %message, "自动排程失败");
                if let Err(fail_err) = self.sessions.fail_session(&session_id, &message).await {
                    warn!(session_id = %session_id, error = %fail_err, "会话失败状态落库未成功");
                }
                Err(e)
            }
        }
    }

    async fn run_auto(
        &self,
        session_id: &str,
        anomalies: Vec<Anomaly>,
        windows: Vec<MaintenanceWindow>,
        plans: &HashMap<String, ActionPlan>,
        assigned_counts: &HashMap<String, usize>,
        config: &PlanningConfiguration,
        today: NaiveDate,
    ) -> EngineResult<ScheduleResult> {
        // 非法 ID 防御性过滤, 不中断整次运行
        let mut anomalies: Vec<Anomaly> = anomalies
            .into_iter()
            .filter(|a| {
                let valid = !a.anomaly_id.trim().is_empty();
                if !valid {
                    warn!(equipment = %a.equipment_number, "跳过空异常 ID");
                }
                valid
            })
            .collect();

        // 排序: 危害等级降序, 创建时间升序 (旧的先排)
        anomalies.sort_by(|a, b| {
            b.criticality_level()
                .cmp(&a.criticality_level())
                .then(a.created_at.cmp(&b.created_at))
        });

        // 候选窗口: 只有 PLANNED 可分派
        let windows: Vec<MaintenanceWindow> = windows
            .into_iter()
            .filter(|w| w.status == WindowStatus::Planned)
            .collect();
        let mut capacity =
            CapacityTracker::rebuild(&windows, assigned_counts, config.capacity_slots_per_day);

        let mut assignments: Vec<Assignment> = Vec::new();
        let mut new_windows: Vec<MaintenanceWindow> = Vec::new();
        let mut unassigned: Vec<String> = Vec::new();
        let mut processed: i64 = 0;

        for anomaly in &anomalies {
            processed += 1;
            let plan = plans.get(&anomaly.anomaly_id);

            // 逐窗口评分, 取最高分 (并列取先遇到的, 与窗口输入顺序稳定)
            let mut best: Option<(&MaintenanceWindow, f64)> = None;
            for window in &windows {
                if !capacity.has_capacity(&window.window_id) {
                    continue;
                }
                let score = self.scorer.score(anomaly, window, plan, config, today);
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((window, score));
                }
            }

            match best {
                Some((window, score)) if score >= config.compatibility_threshold => {
                    self.store
                        .update_anomaly_window(&anomaly.anomaly_id, Some(&window.window_id))
                        .await?;
                    capacity.consume(&window.window_id);
                    debug!(
                        anomaly_id = %anomaly.anomaly_id,
                        window_id = %window.window_id,
                        score,
                        "分派到既有窗口"
                    );
                    assignments.push(Assignment {
                        anomaly_id: anomaly.anomaly_id.clone(),
                        window_id: window.window_id.clone(),
                        score,
                        reason: json!({
                            "primary_factor": "BEST_COMPATIBILITY",
                            "score": score,
                            "criticality": anomaly.criticality_level(),
                            "window_type": window.window_type,
                        })
                        .to_string(),
                    });
                }
                _ if anomaly.criticality_level() >= CriticalityLevel::High => {
                    // 分不进既有窗口的严重/高危异常: 自动建窗兜底
                    let batch = std::slice::from_ref(anomaly);
                    let batch_plans: Vec<ActionPlan> = plan.cloned().into_iter().collect();
                    let window = self.sizer.derive_window(batch, &batch_plans, config, today);

                    self.store.create_window(&window).await?;
                    self.store
                        .update_anomaly_window(&anomaly.anomaly_id, Some(&window.window_id))
                        .await?;
                    info!(
                        anomaly_id = %anomaly.anomaly_id,
                        window_id = %window.window_id,
                        window_type = %window.window_type,
                        duration_days = window.duration_days,
                        "自动建窗并分派"
                    );
                    assignments.push(Assignment {
                        anomaly_id: anomaly.anomaly_id.clone(),
                        window_id: window.window_id.clone(),
                        score: 100.0,
                        reason: json!({
                            "primary_factor": "NEW_OPTIMIZED_WINDOW",
                            "detail": "new optimized window created",
                            "window_type": window.window_type,
                        })
                        .to_string(),
                    });
                    new_windows.push(window);
                }
                _ => {
                    // 中/低危且无合适窗口: 留待下次运行
                    debug!(anomaly_id = %anomaly.anomaly_id, "本次运行未分派");
                    unassigned.push(anomaly.anomaly_id.clone());
                }
            }
        }

        let optimization_score = if assignments.is_empty() {
            0.0
        } else {
            assignments.iter().map(|a| a.score).sum::<f64>() / assignments.len() as f64
        };

        let outcome = SessionOutcome {
            processed_count: processed,
            scheduled_count: assignments.len() as i64,
            windows_created: new_windows.len() as i64,
            optimization_score,
        };
        self.sessions.complete_session(session_id, &outcome).await?;

        info!(
            session_id = %session_id,
            scheduled = assignments.len(),
            windows_created = new_windows.len(),
            unassigned = unassigned.len(),
            optimization_score,
            "自动排程完成"
        );

        Ok(ScheduleResult {
            session_id: session_id.to_string(),
            assignments,
            new_windows,
            unassigned,
            optimization_score,
        })
    }

    /// 为指定异常批次自动建窗并持久化 (手工触发入口)
    ///
    /// 返回已落库的新窗口; 分派变更由调用方决定
    pub async fn create_optimal_window(
        &self,
        anomalies: &[Anomaly],
        plans: &[ActionPlan],
        config: &PlanningConfiguration,
        today: NaiveDate,
    ) -> EngineResult<MaintenanceWindow> {
        if anomalies.is_empty() {
            return Err(EngineError::Internal("建窗目标异常为空".to_string()));
        }

        let window = self.sizer.derive_window(anomalies, plans, config, today);
        self.store.create_window(&window).await?;
        info!(
            window_id = %window.window_id,
            window_type = %window.window_type,
            duration_days = window.duration_days,
            start_date = %window.start_date,
            "手工触发自动建窗"
        );
        Ok(window)
    }
}
