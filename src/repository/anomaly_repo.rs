// ==========================================
// 设备异常检修排程系统 - 异常仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// ==========================================

use crate::domain::anomaly::Anomaly;
use crate::domain::types::AnomalyStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    anomaly_id, equipment_number, system_name, description, detection_date,
    reliability_integrity_score, availability_score, process_safety_score,
    status, priority, estimated_hours, window_id, created_at, updated_at
"#;

// ==========================================
// AnomalyRepository - 异常仓储
// ==========================================
pub struct AnomalyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AnomalyRepository {
    /// 创建新的异常仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<(Anomaly, String)> {
        let status_raw: String = row.get(8)?;
        let anomaly = Anomaly {
            anomaly_id: row.get(0)?,
            equipment_number: row.get(1)?,
            system_name: row.get(2)?,
            description: row.get(3)?,
            detection_date: row.get::<_, Option<NaiveDate>>(4)?,
            reliability_integrity_score: row.get(5)?,
            availability_score: row.get(6)?,
            process_safety_score: row.get(7)?,
            // status 占位, 解析失败在外层转成 FieldValueError
            status: AnomalyStatus::New,
            priority: row.get(9)?,
            estimated_hours: row.get(10)?,
            window_id: row.get(11)?,
            created_at: row.get::<_, DateTime<Utc>>(12)?,
            updated_at: row.get::<_, DateTime<Utc>>(13)?,
        };
        Ok((anomaly, status_raw))
    }

    /// status 延迟解析, 便于输出可解释的字段错误
    fn finish_row((mut anomaly, status_raw): (Anomaly, String)) -> RepositoryResult<Anomaly> {
        anomaly.status =
            AnomalyStatus::from_str(&status_raw).ok_or_else(|| RepositoryError::FieldValueError {
                field: "anomaly.status".to_string(),
                message: format!("未知状态: {}", status_raw),
            })?;
        Ok(anomaly)
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入异常
    pub fn insert(&self, anomaly: &Anomaly) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO anomaly (
                anomaly_id, equipment_number, system_name, description, detection_date,
                reliability_integrity_score, availability_score, process_safety_score,
                status, priority, estimated_hours, window_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                anomaly.anomaly_id,
                anomaly.equipment_number,
                anomaly.system_name,
                anomaly.description,
                anomaly.detection_date,
                anomaly.reliability_integrity_score,
                anomaly.availability_score,
                anomaly.process_safety_score,
                anomaly.status.to_db_str(),
                anomaly.priority,
                anomaly.estimated_hours,
                anomaly.window_id,
                anomaly.created_at,
                anomaly.updated_at,
            ],
        )?;

        Ok(anomaly.anomaly_id.clone())
    }

    /// 改写窗口引用 (排程核心唯一允许的异常变更)
    ///
    /// # 返回
    /// - Ok(()): 改写成功
    /// - Err(NotFound): 异常不存在
    pub fn update_window_ref(
        &self,
        anomaly_id: &str,
        window_id: Option<&str>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "UPDATE anomaly SET window_id = ?1, updated_at = ?2 WHERE anomaly_id = ?3",
            params![window_id, Utc::now(), anomaly_id],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Anomaly".to_string(),
                id: anomaly_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 ID 查询
    pub fn find_by_id(&self, anomaly_id: &str) -> RepositoryResult<Option<Anomaly>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM anomaly WHERE anomaly_id = ?1",
            SELECT_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![anomaly_id], Self::map_row)?;

        match rows.next() {
            Some(row) => Ok(Some(Self::finish_row(row?)?)),
            None => Ok(None),
        }
    }

    /// 待排程异常: TREATED 且未分派窗口, 按创建时间升序
    pub fn list_treated_unscheduled(&self) -> RepositoryResult<Vec<Anomaly>> {
        self.query_list(
            "WHERE status = 'TREATED' AND window_id IS NULL ORDER BY created_at ASC",
        )
    }

    /// 已排程异常: TREATED 且已分派窗口 (再优化输入)
    pub fn list_treated_scheduled(&self) -> RepositoryResult<Vec<Anomaly>> {
        self.query_list(
            "WHERE status = 'TREATED' AND window_id IS NOT NULL ORDER BY created_at ASC",
        )
    }

    /// 查询窗口下已分派的异常
    pub fn list_by_window(&self, window_id: &str) -> RepositoryResult<Vec<Anomaly>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM anomaly WHERE window_id = ?1 ORDER BY created_at ASC",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![window_id], Self::map_row)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(Self::finish_row(row?)?);
        }
        Ok(result)
    }

    /// 各窗口当前已分派数量 (容量追踪器初始化输入)
    pub fn assigned_counts(&self) -> RepositoryResult<HashMap<String, usize>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT window_id, COUNT(*) FROM anomaly WHERE window_id IS NOT NULL GROUP BY window_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (window_id, count) = row?;
            counts.insert(window_id, count.max(0) as usize);
        }
        Ok(counts)
    }

    fn query_list(&self, where_clause: &str) -> RepositoryResult<Vec<Anomaly>> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare(&format!("SELECT {} FROM anomaly {}", SELECT_COLUMNS, where_clause))?;
        let rows = stmt.query_map([], Self::map_row)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(Self::finish_row(row?)?);
        }
        Ok(result)
    }
}
