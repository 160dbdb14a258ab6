// ==========================================
// 设备异常检修排程系统 - 排程配置
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 2. 排程配置项全集
// ==========================================
// 职责: 显式类型化的排程配置 + 硬编码默认值 + 加载时校验
// 存储: config_kv 表 (key='planning/active', JSON)
// ==========================================

use crate::domain::types::{CriticalityLevel, SchedulingUrgency, WindowType};
use serde::{Deserialize, Serialize};

// ==========================================
// CriticalityWeights - 危害等级基础分
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalityWeights {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for CriticalityWeights {
    fn default() -> Self {
        Self {
            critical: 100.0,
            high: 75.0,
            medium: 50.0,
            low: 25.0,
        }
    }
}

impl CriticalityWeights {
    /// 按危害等级取基础分
    pub fn weight_for(&self, level: CriticalityLevel) -> f64 {
        match level {
            CriticalityLevel::Critical => self.critical,
            CriticalityLevel::High => self.high,
            CriticalityLevel::Medium => self.medium,
            CriticalityLevel::Low => self.low,
        }
    }
}

// ==========================================
// WindowTypePreference - 窗口类型偏好
// ==========================================
// 偏好等级列表: 命中保留基础分, 未命中乘 0.6 (类型不匹配惩罚)
// scheduling_urgency: 自动建窗起始日期启发式 (启发式常量, 保留为可配置默认值)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowTypePreference {
    pub preferred_criticalities: Vec<CriticalityLevel>,
    pub scheduling_urgency: SchedulingUrgency,
}

// ==========================================
// WindowTypePreferences - 三类窗口的偏好表
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowTypePreferences {
    pub force: WindowTypePreference,
    pub major: WindowTypePreference,
    pub minor: WindowTypePreference,
}

impl Default for WindowTypePreferences {
    fn default() -> Self {
        Self {
            force: WindowTypePreference {
                preferred_criticalities: vec![CriticalityLevel::Critical, CriticalityLevel::High],
                scheduling_urgency: SchedulingUrgency::Immediate,
            },
            major: WindowTypePreference {
                preferred_criticalities: vec![CriticalityLevel::High, CriticalityLevel::Medium],
                scheduling_urgency: SchedulingUrgency::Weekend,
            },
            minor: WindowTypePreference {
                preferred_criticalities: vec![CriticalityLevel::Medium, CriticalityLevel::Low],
                scheduling_urgency: SchedulingUrgency::Flexible,
            },
        }
    }
}

impl WindowTypePreferences {
    /// 按窗口类型取偏好
    pub fn for_type(&self, window_type: WindowType) -> &WindowTypePreference {
        match window_type {
            WindowType::Force => &self.force,
            WindowType::Major => &self.major,
            WindowType::Minor => &self.minor,
        }
    }
}

// ==========================================
// PlanningConfiguration - 排程配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningConfiguration {
    /// 分派阈值: 最高兼容分低于该值时不直接分派
    #[serde(default = "default_compatibility_threshold")]
    pub compatibility_threshold: f64,

    /// 再优化最小收益: 备选窗口分数超出当前分数该值以上才迁移
    #[serde(default = "default_reassignment_min_gain")]
    pub reassignment_min_gain: f64,

    /// 窗口容量系数: slots = floor(duration_days * capacity_slots_per_day)
    /// 启发式常量 floor(d*2), 保留为可配置默认值
    #[serde(default = "default_capacity_slots_per_day")]
    pub capacity_slots_per_day: f64,

    /// 危害等级基础分
    #[serde(default)]
    pub criticality_weights: CriticalityWeights,

    /// 窗口类型偏好表
    #[serde(default)]
    pub window_preferences: WindowTypePreferences,
}

fn default_compatibility_threshold() -> f64 {
    60.0
}

fn default_reassignment_min_gain() -> f64 {
    15.0
}

fn default_capacity_slots_per_day() -> f64 {
    2.0
}

impl Default for PlanningConfiguration {
    fn default() -> Self {
        Self {
            compatibility_threshold: default_compatibility_threshold(),
            reassignment_min_gain: default_reassignment_min_gain(),
            capacity_slots_per_day: default_capacity_slots_per_day(),
            criticality_weights: CriticalityWeights::default(),
            window_preferences: WindowTypePreferences::default(),
        }
    }
}

impl PlanningConfiguration {
    /// 加载时校验
    ///
    /// # 返回
    /// - Ok(()): 配置合法
    /// - Err(String): 第一条校验失败原因
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.compatibility_threshold) {
            return Err(format!(
                "compatibility_threshold 超出 [0,100]: {}",
                self.compatibility_threshold
            ));
        }
        if self.reassignment_min_gain < 0.0 {
            return Err(format!(
                "reassignment_min_gain 不能为负: {}",
                self.reassignment_min_gain
            ));
        }
        if self.capacity_slots_per_day <= 0.0 {
            return Err(format!(
                "capacity_slots_per_day 必须为正: {}",
                self.capacity_slots_per_day
            ));
        }

        let weights = [
            ("critical", self.criticality_weights.critical),
            ("high", self.criticality_weights.high),
            ("medium", self.criticality_weights.medium),
            ("low", self.criticality_weights.low),
        ];
        for (name, w) in weights {
            if !(0.0..=100.0).contains(&w) {
                return Err(format!("criticality_weights.{} 超出 [0,100]: {}", name, w));
            }
        }

        Ok(())
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration_is_valid() {
        let config = PlanningConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.compatibility_threshold, 60.0);
        assert_eq!(config.reassignment_min_gain, 15.0);
        assert_eq!(config.capacity_slots_per_day, 2.0);
    }

    #[test]
    fn test_default_weights_table() {
        let weights = CriticalityWeights::default();
        assert_eq!(weights.weight_for(CriticalityLevel::Critical), 100.0);
        assert_eq!(weights.weight_for(CriticalityLevel::High), 75.0);
        assert_eq!(weights.weight_for(CriticalityLevel::Medium), 50.0);
        assert_eq!(weights.weight_for(CriticalityLevel::Low), 25.0);
    }

    #[test]
    fn test_default_window_preferences() {
        let prefs = WindowTypePreferences::default();

        // FORCE 偏好严重/高危, 立即开窗
        assert!(prefs
            .for_type(WindowType::Force)
            .preferred_criticalities
            .contains(&CriticalityLevel::Critical));
        assert_eq!(
            prefs.for_type(WindowType::Force).scheduling_urgency,
            SchedulingUrgency::Immediate
        );

        // MINOR 偏好中危/低危
        assert!(prefs
            .for_type(WindowType::Minor)
            .preferred_criticalities
            .contains(&CriticalityLevel::Low));
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let mut config = PlanningConfiguration::default();
        config.compatibility_threshold = 120.0;
        assert!(config.validate().is_err());

        let mut config = PlanningConfiguration::default();
        config.capacity_slots_per_day = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_json_uses_defaults() {
        // 只给阈值, 其余字段回落默认值
        let config: PlanningConfiguration =
            serde_json::from_str(r#"{"compatibility_threshold": 70.0}"#).unwrap();
        assert_eq!(config.compatibility_threshold, 70.0);
        assert_eq!(config.criticality_weights.high, 75.0);
        assert_eq!(
            config.window_preferences.minor.scheduling_urgency,
            SchedulingUrgency::Flexible
        );
    }
}
