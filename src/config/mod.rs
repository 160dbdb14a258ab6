// ==========================================
// 设备异常检修排程系统 - 配置层
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 2. 排程配置项全集
// ==========================================
// 职责: 显式类型化配置 + 默认值回落
// 存储: config_kv 表
// ==========================================

pub mod planning_config;

// 重导出核心配置类型
pub use planning_config::{
    CriticalityWeights, PlanningConfiguration, WindowTypePreference, WindowTypePreferences,
};
