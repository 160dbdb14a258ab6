// ==========================================
// 设备异常检修排程系统 - 核心库
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 系统宪法
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统 (人工最终控制权)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排程规则
pub mod engine;

// 配置层 - 排程配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AnomalyStatus, CriticalityLevel, SchedulingUrgency, SessionStatus, SessionType, WindowStatus,
    WindowType,
};

// 领域实体
pub use domain::{ActionPlan, Anomaly, MaintenanceWindow, PlanningSession, SessionOutcome};

// 配置
pub use config::PlanningConfiguration;

// 引擎
pub use engine::{
    CapacityTracker, CompatibilityScorer, OptimizationResult, Optimizer, ScheduleResult,
    Scheduler, WindowSizer,
};

// API
pub use api::SchedulingApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "设备异常检修排程系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// 预编译检查
// ==========================================
