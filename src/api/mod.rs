// ==========================================
// 设备异常检修排程系统 - 接口层
// ==========================================
// 职责: 对外操作入口 + 引擎端口的 SQLite 适配
// ==========================================

pub mod error;
pub mod scheduling_api;
pub mod store;

// 重导出对外接口
pub use error::{ApiError, ApiResult};
pub use scheduling_api::SchedulingApi;
pub use store::{SqliteScheduleStore, SqliteSessionRecorder};
