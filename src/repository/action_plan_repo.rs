// ==========================================
// 设备异常检修排程系统 - 行动计划仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 排程核心对行动计划只读; 写入口仅服务测试数据与外部导入
// ==========================================

use crate::domain::action_plan::ActionPlan;
use crate::domain::types::WindowType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    plan_id, anomaly_id, needs_outage, outage_type,
    total_duration_days, total_duration_hours, priority, completed,
    created_at, updated_at
"#;

// ==========================================
// ActionPlanRepository - 行动计划仓储
// ==========================================
pub struct ActionPlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActionPlanRepository {
    /// 创建新的行动计划仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<(ActionPlan, Option<String>)> {
        let outage_raw: Option<String> = row.get(3)?;
        let plan = ActionPlan {
            plan_id: row.get(0)?,
            anomaly_id: row.get(1)?,
            needs_outage: row.get(2)?,
            outage_type: None, // 延迟解析
            total_duration_days: row.get(4)?,
            total_duration_hours: row.get(5)?,
            priority: row.get(6)?,
            completed: row.get(7)?,
            created_at: row.get::<_, DateTime<Utc>>(8)?,
            updated_at: row.get::<_, DateTime<Utc>>(9)?,
        };
        Ok((plan, outage_raw))
    }

    fn finish_row(
        (mut plan, outage_raw): (ActionPlan, Option<String>),
    ) -> RepositoryResult<ActionPlan> {
        if let Some(raw) = outage_raw {
            plan.outage_type =
                Some(WindowType::from_str(&raw).ok_or_else(|| RepositoryError::FieldValueError {
                    field: "action_plan.outage_type".to_string(),
                    message: format!("未知停机类型: {}", raw),
                })?);
        }
        Ok(plan)
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入行动计划
    pub fn insert(&self, plan: &ActionPlan) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO action_plan (
                plan_id, anomaly_id, needs_outage, outage_type,
                total_duration_days, total_duration_hours, priority, completed,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                plan.plan_id,
                plan.anomaly_id,
                plan.needs_outage,
                plan.outage_type.map(|t| t.to_db_str()),
                plan.total_duration_days,
                plan.total_duration_hours,
                plan.priority,
                plan.completed,
                plan.created_at,
                plan.updated_at,
            ],
        )?;

        Ok(plan.plan_id.clone())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按异常 ID 查询 (一对一)
    pub fn find_by_anomaly(&self, anomaly_id: &str) -> RepositoryResult<Option<ActionPlan>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM action_plan WHERE anomaly_id = ?1",
            SELECT_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![anomaly_id], Self::map_row)?;

        match rows.next() {
            Some(row) => Ok(Some(Self::finish_row(row?)?)),
            None => Ok(None),
        }
    }

    /// 全量读取, 按异常 ID 建立索引 (排程运行的输入快照)
    pub fn list_all_by_anomaly(&self) -> RepositoryResult<HashMap<String, ActionPlan>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!("SELECT {} FROM action_plan", SELECT_COLUMNS))?;
        let rows = stmt.query_map([], Self::map_row)?;

        let mut result = HashMap::new();
        for row in rows {
            let plan = Self::finish_row(row?)?;
            result.insert(plan.anomaly_id.clone(), plan);
        }
        Ok(result)
    }
}
