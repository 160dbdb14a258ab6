// ==========================================
// 设备异常检修排程系统 - 领域类型定义
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 0.2 等级与状态体系
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 危害等级 (Criticality Level)
// ==========================================
// 由三项子评分 (可靠性完整性/可用性/过程安全, 各 1-5) 求和后按固定阈值判定
// 顺序: Low < Medium < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriticalityLevel {
    Low,      // 低危
    Medium,   // 中危
    High,     // 高危
    Critical, // 严重
}

impl fmt::Display for CriticalityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriticalityLevel::Low => write!(f, "LOW"),
            CriticalityLevel::Medium => write!(f, "MEDIUM"),
            CriticalityLevel::High => write!(f, "HIGH"),
            CriticalityLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl CriticalityLevel {
    /// 按总分判定危害等级
    ///
    /// 阈值 (总分 0-15):
    /// - >9: CRITICAL
    /// - 7-9: HIGH
    /// - 3-6: MEDIUM
    /// - 0-2: LOW
    pub fn from_total_score(total: i32) -> Self {
        if total > 9 {
            CriticalityLevel::Critical
        } else if total >= 7 {
            CriticalityLevel::High
        } else if total >= 3 {
            CriticalityLevel::Medium
        } else {
            CriticalityLevel::Low
        }
    }

    /// 从字符串解析危害等级
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "LOW" => Some(CriticalityLevel::Low),
            "MEDIUM" => Some(CriticalityLevel::Medium),
            "HIGH" => Some(CriticalityLevel::High),
            "CRITICAL" => Some(CriticalityLevel::Critical),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CriticalityLevel::Low => "LOW",
            CriticalityLevel::Medium => "MEDIUM",
            CriticalityLevel::High => "HIGH",
            CriticalityLevel::Critical => "CRITICAL",
        }
    }
}

// ==========================================
// 异常状态 (Anomaly Status)
// ==========================================
// 生命周期由外部系统维护; 排程核心只读取 TREATED 状态的异常
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyStatus {
    New,        // 新建
    InProgress, // 处理中
    Treated,    // 已治理(待排程)
    Closed,     // 已关闭
}

impl fmt::Display for AnomalyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyStatus::New => write!(f, "NEW"),
            AnomalyStatus::InProgress => write!(f, "IN_PROGRESS"),
            AnomalyStatus::Treated => write!(f, "TREATED"),
            AnomalyStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

impl AnomalyStatus {
    /// 从字符串解析异常状态
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NEW" => Some(AnomalyStatus::New),
            "IN_PROGRESS" => Some(AnomalyStatus::InProgress),
            "TREATED" => Some(AnomalyStatus::Treated),
            "CLOSED" => Some(AnomalyStatus::Closed),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AnomalyStatus::New => "NEW",
            AnomalyStatus::InProgress => "IN_PROGRESS",
            AnomalyStatus::Treated => "TREATED",
            AnomalyStatus::Closed => "CLOSED",
        }
    }
}

// ==========================================
// 检修窗口类型 (Window Type)
// ==========================================
// FORCE: 强制停机窗口; MINOR: 小修; MAJOR: 大修
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowType {
    Force, // 强制停机
    Minor, // 小修
    Major, // 大修
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowType::Force => write!(f, "FORCE"),
            WindowType::Minor => write!(f, "MINOR"),
            WindowType::Major => write!(f, "MAJOR"),
        }
    }
}

impl WindowType {
    /// 从字符串解析窗口类型
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "FORCE" => Some(WindowType::Force),
            "MINOR" => Some(WindowType::Minor),
            "MAJOR" => Some(WindowType::Major),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            WindowType::Force => "FORCE",
            WindowType::Minor => "MINOR",
            WindowType::Major => "MAJOR",
        }
    }
}

// ==========================================
// 检修窗口状态 (Window Status)
// ==========================================
// 排程核心只向 PLANNED 状态的窗口分派异常
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowStatus {
    Planned,    // 已计划
    InProgress, // 执行中
    Completed,  // 已完成
    Cancelled,  // 已取消
}

impl fmt::Display for WindowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowStatus::Planned => write!(f, "PLANNED"),
            WindowStatus::InProgress => write!(f, "IN_PROGRESS"),
            WindowStatus::Completed => write!(f, "COMPLETED"),
            WindowStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl WindowStatus {
    /// 从字符串解析窗口状态
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PLANNED" => Some(WindowStatus::Planned),
            "IN_PROGRESS" => Some(WindowStatus::InProgress),
            "COMPLETED" => Some(WindowStatus::Completed),
            "CANCELLED" => Some(WindowStatus::Cancelled),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            WindowStatus::Planned => "PLANNED",
            WindowStatus::InProgress => "IN_PROGRESS",
            WindowStatus::Completed => "COMPLETED",
            WindowStatus::Cancelled => "CANCELLED",
        }
    }
}

// ==========================================
// 排程紧迫度 (Scheduling Urgency)
// ==========================================
// 窗口类型级配置, 决定自动建窗时的起始日期启发式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchedulingUrgency {
    Immediate, // 明日开始
    Weekend,   // 下个周六开始
    Flexible,  // 5 天后开始
}

impl fmt::Display for SchedulingUrgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulingUrgency::Immediate => write!(f, "IMMEDIATE"),
            SchedulingUrgency::Weekend => write!(f, "WEEKEND"),
            SchedulingUrgency::Flexible => write!(f, "FLEXIBLE"),
        }
    }
}

impl SchedulingUrgency {
    /// 从字符串解析排程紧迫度
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "IMMEDIATE" => Some(SchedulingUrgency::Immediate),
            "WEEKEND" => Some(SchedulingUrgency::Weekend),
            "FLEXIBLE" => Some(SchedulingUrgency::Flexible),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SchedulingUrgency::Immediate => "IMMEDIATE",
            SchedulingUrgency::Weekend => "WEEKEND",
            SchedulingUrgency::Flexible => "FLEXIBLE",
        }
    }
}

// ==========================================
// 排程会话类型 (Session Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    Auto,         // 自动排程
    Manual,       // 人工排程
    Optimization, // 再优化
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Auto => write!(f, "AUTO"),
            SessionType::Manual => write!(f, "MANUAL"),
            SessionType::Optimization => write!(f, "OPTIMIZATION"),
        }
    }
}

impl SessionType {
    /// 从字符串解析会话类型
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "AUTO" => Some(SessionType::Auto),
            "MANUAL" => Some(SessionType::Manual),
            "OPTIMIZATION" => Some(SessionType::Optimization),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SessionType::Auto => "AUTO",
            SessionType::Manual => "MANUAL",
            SessionType::Optimization => "OPTIMIZATION",
        }
    }
}

// ==========================================
// 排程会话状态 (Session Status)
// ==========================================
// RUNNING -> COMPLETED / FAILED, 终态后不再变更
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Running,   // 运行中
    Completed, // 已完成
    Failed,    // 失败
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Running => write!(f, "RUNNING"),
            SessionStatus::Completed => write!(f, "COMPLETED"),
            SessionStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl SessionStatus {
    /// 从字符串解析会话状态
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "RUNNING" => Some(SessionStatus::Running),
            "COMPLETED" => Some(SessionStatus::Completed),
            "FAILED" => Some(SessionStatus::Failed),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SessionStatus::Running => "RUNNING",
            SessionStatus::Completed => "COMPLETED",
            SessionStatus::Failed => "FAILED",
        }
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criticality_from_total_score_thresholds() {
        // 阈值边界: 0-2 LOW, 3-6 MEDIUM, 7-9 HIGH, >9 CRITICAL
        assert_eq!(CriticalityLevel::from_total_score(0), CriticalityLevel::Low);
        assert_eq!(CriticalityLevel::from_total_score(2), CriticalityLevel::Low);
        assert_eq!(CriticalityLevel::from_total_score(3), CriticalityLevel::Medium);
        assert_eq!(CriticalityLevel::from_total_score(6), CriticalityLevel::Medium);
        assert_eq!(CriticalityLevel::from_total_score(7), CriticalityLevel::High);
        assert_eq!(CriticalityLevel::from_total_score(9), CriticalityLevel::High);
        assert_eq!(CriticalityLevel::from_total_score(10), CriticalityLevel::Critical);
        assert_eq!(CriticalityLevel::from_total_score(15), CriticalityLevel::Critical);
    }

    #[test]
    fn test_criticality_ordering() {
        // 排序: CRITICAL > HIGH > MEDIUM > LOW
        assert!(CriticalityLevel::Critical > CriticalityLevel::High);
        assert!(CriticalityLevel::High > CriticalityLevel::Medium);
        assert!(CriticalityLevel::Medium > CriticalityLevel::Low);
    }

    #[test]
    fn test_enum_db_roundtrip() {
        assert_eq!(
            WindowType::from_str(WindowType::Force.to_db_str()),
            Some(WindowType::Force)
        );
        assert_eq!(
            WindowStatus::from_str("planned"),
            Some(WindowStatus::Planned)
        );
        assert_eq!(SessionStatus::from_str("UNKNOWN"), None);
        assert_eq!(
            SchedulingUrgency::from_str("WEEKEND"),
            Some(SchedulingUrgency::Weekend)
        );
    }
}
