// ==========================================
// 设备异常检修排程系统 - 排程写入接口
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 4.7 存储协作方
// ==========================================
// 红线: 引擎只通过本接口写库; 写失败向上传播, 不重试不回滚
// ==========================================

use crate::domain::window::MaintenanceWindow;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

// ==========================================
// ScheduleStore - 排程写入端口
// ==========================================
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// 改写异常的窗口引用 (None = 解除分派)
    async fn update_anomaly_window(
        &self,
        anomaly_id: &str,
        window_id: Option<&str>,
    ) -> RepositoryResult<()>;

    /// 持久化自动创建的窗口
    async fn create_window(&self, window: &MaintenanceWindow) -> RepositoryResult<()>;
}

// ==========================================
// InMemoryScheduleStore - 测试用内存实现
// ==========================================
// fail_after_writes: 注入写入失败, 用于验证会话 FAILED 路径
#[derive(Debug, Default)]
struct StoreState {
    window_refs: HashMap<String, Option<String>>,
    created_windows: Vec<MaintenanceWindow>,
    writes: usize,
    fail_after_writes: Option<usize>,
}

#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    state: Mutex<StoreState>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第 n+1 次写入开始全部失败
    pub fn with_failure_after(writes: usize) -> Self {
        Self {
            state: Mutex::new(StoreState {
                fail_after_writes: Some(writes),
                ..StoreState::default()
            }),
        }
    }

    /// 某异常当前记录的窗口引用
    pub fn window_ref(&self, anomaly_id: &str) -> Option<Option<String>> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.window_refs.get(anomaly_id).cloned())
    }

    /// 已持久化的自动建窗
    pub fn created_windows(&self) -> Vec<MaintenanceWindow> {
        self.state
            .lock()
            .map(|s| s.created_windows.clone())
            .unwrap_or_default()
    }

    /// 累计写入次数
    pub fn write_count(&self) -> usize {
        self.state.lock().map(|s| s.writes).unwrap_or(0)
    }

    fn record_write(state: &mut StoreState) -> RepositoryResult<()> {
        if let Some(limit) = state.fail_after_writes {
            if state.writes >= limit {
                return Err(RepositoryError::DatabaseQueryError(
                    "注入的写入失败".to_string(),
                ));
            }
        }
        state.writes += 1;
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn update_anomaly_window(
        &self,
        anomaly_id: &str,
        window_id: Option<&str>,
    ) -> RepositoryResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Self::record_write(&mut state)?;
        state
            .window_refs
            .insert(anomaly_id.to_string(), window_id.map(str::to_string));
        Ok(())
    }

    async fn create_window(&self, window: &MaintenanceWindow) -> RepositoryResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Self::record_write(&mut state)?;
        state.created_windows.push(window.clone());
        Ok(())
    }
}
