// ==========================================
// 设备异常检修排程系统 - 接口层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================
// 对外统一错误面: 仓储/引擎错误在此收口
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 接口层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("数据访问失败: {0}")]
    Repository(#[from] RepositoryError),

    #[error("排程引擎失败: {0}")]
    Engine(#[from] EngineError),

    #[error("非法请求: {0}")]
    InvalidInput(String),
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
