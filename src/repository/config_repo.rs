// ==========================================
// 设备异常检修排程系统 - 排程配置仓储
// ==========================================
// 存储: config_kv 表 (scope_id='global', key='planning/active', JSON)
// 回落: 无激活配置或配置非法时使用硬编码默认值 (ConfigurationMissing 非致命)
// ==========================================

use crate::config::planning_config::PlanningConfiguration;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// config_kv 中的激活排程配置键
pub const ACTIVE_PLANNING_CONFIG_KEY: &str = "planning/active";

// ==========================================
// PlanningConfigRepository - 排程配置仓储
// ==========================================
pub struct PlanningConfigRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanningConfigRepository {
    /// 创建新的排程配置仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取激活配置 (不存在时返回 None)
    pub fn load_active(&self) -> RepositoryResult<Option<PlanningConfiguration>> {
        let conn = self.get_conn()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![ACTIVE_PLANNING_CONFIG_KEY],
            |row| row.get::<_, String>(0),
        );

        let raw = match result {
            Ok(value) => value,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let config: PlanningConfiguration = serde_json::from_str(&raw)
            .map_err(|e| RepositoryError::ValidationError(format!("排程配置解析失败: {}", e)))?;
        config
            .validate()
            .map_err(|msg| RepositoryError::ValidationError(format!("排程配置非法: {}", msg)))?;

        Ok(Some(config))
    }

    /// 读取激活配置, 缺失时回落到硬编码默认值
    ///
    /// 注: 配置缺失是可恢复情形, 记 warn 后继续; 配置存在但非法仍然报错,
    /// 避免静默丢弃人工配置。
    pub fn load_active_or_default(&self) -> RepositoryResult<PlanningConfiguration> {
        match self.load_active()? {
            Some(config) => Ok(config),
            None => {
                warn!("未找到激活的排程配置, 回落到默认配置");
                Ok(PlanningConfiguration::default())
            }
        }
    }

    /// 写入激活配置 (覆盖)
    pub fn save_active(&self, config: &PlanningConfiguration) -> RepositoryResult<()> {
        config
            .validate()
            .map_err(|msg| RepositoryError::ValidationError(format!("排程配置非法: {}", msg)))?;

        let raw = serde_json::to_string(config)
            .map_err(|e| RepositoryError::InternalError(format!("排程配置序列化失败: {}", e)))?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
            ON CONFLICT (scope_id, key) DO UPDATE SET value = excluded.value
            "#,
            params![ACTIVE_PLANNING_CONFIG_KEY, raw],
        )?;
        Ok(())
    }
}
