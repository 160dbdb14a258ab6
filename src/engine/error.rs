// ==========================================
// 设备异常检修排程系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================
// 约定: 运行中任何落库失败都向上传播, 不做隐式重试;
// 已提交的分派不回滚 (部分生效是可接受且可见的)
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("持久化失败: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
