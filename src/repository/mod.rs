// ==========================================
// 设备异常检修排程系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod action_plan_repo;
pub mod anomaly_repo;
pub mod config_repo;
pub mod error;
pub mod session_repo;
pub mod window_repo;

// 重导出核心仓储
pub use action_plan_repo::ActionPlanRepository;
pub use anomaly_repo::AnomalyRepository;
pub use config_repo::{PlanningConfigRepository, ACTIVE_PLANNING_CONFIG_KEY};
pub use error::{RepositoryError, RepositoryResult};
pub use session_repo::PlanningSessionRepository;
pub use window_repo::MaintenanceWindowRepository;
