// ==========================================
// 设备异常检修排程系统 - 数据库基础设施测试
// ==========================================
// 文件库重开验证: schema 幂等 + 数据跨连接可见
// ==========================================

use anomaly_aps::db;
use anomaly_aps::domain::types::AnomalyStatus;
use anomaly_aps::domain::Anomaly;
use anomaly_aps::repository::AnomalyRepository;
use chrono::Utc;
use std::sync::{Arc, Mutex};

#[test]
fn test_schema_init_is_idempotent() {
    let conn = db::open_in_memory_connection().unwrap();
    db::init_schema(&conn).unwrap();
    // 二次建表不报错
    db::init_schema(&conn).unwrap();
}

#[test]
fn test_file_backed_db_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("anomaly_aps_test.db");
    let db_path = db_path.to_str().unwrap();

    {
        let conn = db::open_sqlite_connection(db_path).unwrap();
        db::init_schema(&conn).unwrap();

        let repo = AnomalyRepository::new(Arc::new(Mutex::new(conn)));
        repo.insert(&Anomaly {
            anomaly_id: "A001".to_string(),
            equipment_number: "EQ-F1-003".to_string(),
            system_name: None,
            description: Some("主泵异响".to_string()),
            detection_date: None,
            reliability_integrity_score: 3,
            availability_score: 3,
            process_safety_score: 2,
            status: AnomalyStatus::Treated,
            priority: Some(2),
            estimated_hours: None,
            window_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .unwrap();
    }

    // 重开连接后数据仍在
    let conn = db::open_sqlite_connection(db_path).unwrap();
    db::init_schema(&conn).unwrap();
    let repo = AnomalyRepository::new(Arc::new(Mutex::new(conn)));

    let found = repo.find_by_id("A001").unwrap().unwrap();
    assert_eq!(found.equipment_number, "EQ-F1-003");
    assert_eq!(found.priority, Some(2));
    assert_eq!(found.status, AnomalyStatus::Treated);
}
