// ==========================================
// 设备异常检修排程系统 - 排程接口
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 6. 对外操作
// ==========================================
// 职责: 组装输入 (异常/窗口/计划/配置) 并调用引擎
// 红线: 并发调用不互斥, 串行化由调用方负责 (单活动会话)
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::store::{SqliteScheduleStore, SqliteSessionRecorder};
use crate::domain::action_plan::ActionPlan;
use crate::domain::anomaly::Anomaly;
use crate::domain::window::MaintenanceWindow;
use crate::engine::optimizer::{OptimizationResult, Optimizer};
use crate::engine::scheduler::{ScheduleResult, Scheduler};
use crate::repository::action_plan_repo::ActionPlanRepository;
use crate::repository::anomaly_repo::AnomalyRepository;
use crate::repository::config_repo::PlanningConfigRepository;
use crate::repository::window_repo::MaintenanceWindowRepository;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

// ==========================================
// SchedulingApi - 排程对外接口
// ==========================================
pub struct SchedulingApi {
    anomalies: AnomalyRepository,
    plans: ActionPlanRepository,
    windows: MaintenanceWindowRepository,
    config: PlanningConfigRepository,
    scheduler: Scheduler,
    optimizer: Optimizer,
}

impl SchedulingApi {
    /// 基于共享连接组装接口 (仓储 + 引擎 + 适配器)
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        let store = Arc::new(SqliteScheduleStore::new(conn.clone()));
        let sessions = Arc::new(SqliteSessionRecorder::new(conn.clone()));
        Self {
            anomalies: AnomalyRepository::new(conn.clone()),
            plans: ActionPlanRepository::new(conn.clone()),
            windows: MaintenanceWindowRepository::new(conn.clone()),
            config: PlanningConfigRepository::new(conn),
            scheduler: Scheduler::new(store.clone(), sessions.clone()),
            optimizer: Optimizer::new(store, sessions),
        }
    }

    /// 自动排程: 所有已治理未排程异常 -> 既有/新建窗口
    pub async fn auto_schedule(&self) -> ApiResult<ScheduleResult> {
        self.auto_schedule_on(Utc::now().date_naive()).await
    }

    /// 按指定基准日自动排程 (测试入口)
    pub async fn auto_schedule_on(&self, today: NaiveDate) -> ApiResult<ScheduleResult> {
        let anomalies = self.anomalies.list_treated_unscheduled()?;
        let windows = self.windows.list_planned()?;
        let plans = self.plans.list_all_by_anomaly()?;
        let assigned_counts = self.anomalies.assigned_counts()?;
        let config = self.config.load_active_or_default()?;

        info!(anomaly_count = anomalies.len(), "触发自动排程");
        let result = self
            .scheduler
            .auto_schedule(anomalies, windows, &plans, &assigned_counts, &config, today)
            .await?;
        Ok(result)
    }

    /// 为指定异常批次建窗并持久化
    ///
    /// 非法/不存在的异常 ID 防御性剔除; 全部无效时拒绝请求
    pub async fn create_optimal_window(
        &self,
        anomaly_ids: &[String],
    ) -> ApiResult<MaintenanceWindow> {
        self.create_optimal_window_on(anomaly_ids, Utc::now().date_naive())
            .await
    }

    /// 按指定基准日建窗 (测试入口)
    pub async fn create_optimal_window_on(
        &self,
        anomaly_ids: &[String],
        today: NaiveDate,
    ) -> ApiResult<MaintenanceWindow> {
        let mut anomalies: Vec<Anomaly> = Vec::new();
        let mut plans: Vec<ActionPlan> = Vec::new();

        for anomaly_id in anomaly_ids {
            if anomaly_id.trim().is_empty() {
                warn!("跳过空异常 ID");
                continue;
            }
            match self.anomalies.find_by_id(anomaly_id)? {
                Some(anomaly) => {
                    if let Some(plan) = self.plans.find_by_anomaly(anomaly_id)? {
                        plans.push(plan);
                    }
                    anomalies.push(anomaly);
                }
                None => {
                    warn!(anomaly_id = %anomaly_id, "建窗目标异常不存在, 跳过");
                }
            }
        }

        if anomalies.is_empty() {
            return Err(ApiError::InvalidInput(
                "建窗请求不含任何有效异常 ID".to_string(),
            ));
        }

        let config = self.config.load_active_or_default()?;
        let window = self
            .scheduler
            .create_optimal_window(&anomalies, &plans, &config, today)
            .await?;
        Ok(window)
    }

    /// 再优化: 重评所有已排程异常, 明显更优则迁移
    pub async fn optimize_scheduling(&self) -> ApiResult<OptimizationResult> {
        self.optimize_scheduling_on(Utc::now().date_naive()).await
    }

    /// 按指定基准日再优化 (测试入口)
    pub async fn optimize_scheduling_on(
        &self,
        today: NaiveDate,
    ) -> ApiResult<OptimizationResult> {
        let anomalies = self.anomalies.list_treated_scheduled()?;
        let windows = self.windows.list_all()?;
        let plans = self.plans.list_all_by_anomaly()?;
        let config = self.config.load_active_or_default()?;

        info!(scheduled_count = anomalies.len(), "触发再优化");
        let result = self
            .optimizer
            .optimize(anomalies, windows, &plans, &config, today)
            .await?;
        Ok(result)
    }
}
