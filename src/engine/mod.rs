// ==========================================
// 设备异常检修排程系统 - 排程引擎层
// ==========================================
// 红线: 引擎不直接接触 SQL; 存储协作通过注入的端口完成
// ==========================================
// 职责: 兼容性评分 / 容量跟踪 / 自动建窗 / 贪心分派 / 再优化
// 单线程请求-响应式, 单次调用跑完, 无内部并行
// ==========================================

pub mod capacity;
pub mod compatibility;
pub mod error;
pub mod optimizer;
pub mod scheduler;
pub mod session_recorder;
pub mod stores;
pub mod window_sizer;

// 重导出核心引擎
pub use capacity::CapacityTracker;
pub use compatibility::CompatibilityScorer;
pub use error::{EngineError, EngineResult};
pub use optimizer::{OptimizationResult, Optimizer, Reassignment, WindowUtilization};
pub use scheduler::{Assignment, ScheduleResult, Scheduler};
pub use session_recorder::{InMemorySessionRecorder, SessionRecorder};
pub use stores::{InMemoryScheduleStore, ScheduleStore};
pub use window_sizer::WindowSizer;
