// ==========================================
// 设备异常检修排程系统 - 领域模型层
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 1. 数据模型
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_plan;
pub mod anomaly;
pub mod session;
pub mod types;
pub mod window;

// 重导出核心类型
pub use action_plan::ActionPlan;
pub use anomaly::Anomaly;
pub use session::{PlanningSession, SessionOutcome};
pub use types::{
    AnomalyStatus, CriticalityLevel, SchedulingUrgency, SessionStatus, SessionType, WindowStatus,
    WindowType,
};
pub use window::MaintenanceWindow;
