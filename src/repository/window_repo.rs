// ==========================================
// 设备异常检修排程系统 - 检修窗口仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// ==========================================

use crate::domain::types::{WindowStatus, WindowType};
use crate::domain::window::MaintenanceWindow;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    window_id, window_type, duration_days, start_date, end_date,
    status, description, auto_created, source_anomaly_id, created_at
"#;

// ==========================================
// MaintenanceWindowRepository - 检修窗口仓储
// ==========================================
pub struct MaintenanceWindowRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaintenanceWindowRepository {
    /// 创建新的检修窗口仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<(MaintenanceWindow, String, String)> {
        let type_raw: String = row.get(1)?;
        let status_raw: String = row.get(5)?;
        let window = MaintenanceWindow {
            window_id: row.get(0)?,
            window_type: WindowType::Minor, // 延迟解析
            duration_days: row.get(2)?,
            start_date: row.get::<_, NaiveDate>(3)?,
            end_date: row.get::<_, NaiveDate>(4)?,
            status: WindowStatus::Planned, // 延迟解析
            description: row.get(6)?,
            auto_created: row.get(7)?,
            source_anomaly_id: row.get(8)?,
            created_at: row.get::<_, DateTime<Utc>>(9)?,
        };
        Ok((window, type_raw, status_raw))
    }

    fn finish_row(
        (mut window, type_raw, status_raw): (MaintenanceWindow, String, String),
    ) -> RepositoryResult<MaintenanceWindow> {
        window.window_type =
            WindowType::from_str(&type_raw).ok_or_else(|| RepositoryError::FieldValueError {
                field: "maintenance_window.window_type".to_string(),
                message: format!("未知窗口类型: {}", type_raw),
            })?;
        window.status =
            WindowStatus::from_str(&status_raw).ok_or_else(|| RepositoryError::FieldValueError {
                field: "maintenance_window.status".to_string(),
                message: format!("未知窗口状态: {}", status_raw),
            })?;
        Ok(window)
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入检修窗口
    pub fn insert(&self, window: &MaintenanceWindow) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO maintenance_window (
                window_id, window_type, duration_days, start_date, end_date,
                status, description, auto_created, source_anomaly_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                window.window_id,
                window.window_type.to_db_str(),
                window.duration_days,
                window.start_date,
                window.end_date,
                window.status.to_db_str(),
                window.description,
                window.auto_created,
                window.source_anomaly_id,
                window.created_at,
            ],
        )?;

        Ok(window.window_id.clone())
    }

    /// 更新窗口状态
    pub fn update_status(&self, window_id: &str, status: WindowStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "UPDATE maintenance_window SET status = ?1 WHERE window_id = ?2",
            params![status.to_db_str(), window_id],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "MaintenanceWindow".to_string(),
                id: window_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 ID 查询
    pub fn find_by_id(&self, window_id: &str) -> RepositoryResult<Option<MaintenanceWindow>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM maintenance_window WHERE window_id = ?1",
            SELECT_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![window_id], Self::map_row)?;

        match rows.next() {
            Some(row) => Ok(Some(Self::finish_row(row?)?)),
            None => Ok(None),
        }
    }

    /// 可分派窗口: PLANNED 状态, 按开窗日期升序
    pub fn list_planned(&self) -> RepositoryResult<Vec<MaintenanceWindow>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM maintenance_window WHERE status = 'PLANNED' ORDER BY start_date ASC",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_row)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(Self::finish_row(row?)?);
        }
        Ok(result)
    }

    /// 全量读取
    pub fn list_all(&self) -> RepositoryResult<Vec<MaintenanceWindow>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM maintenance_window ORDER BY start_date ASC",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_row)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(Self::finish_row(row?)?);
        }
        Ok(result)
    }
}
