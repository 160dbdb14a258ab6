// ==========================================
// 设备异常检修排程系统 - 窗口容量跟踪器
// ==========================================
// 依据: Planning_Engine_Spec_v1.1.md - 4.2 容量跟踪
// ==========================================
// 红线: 容量只在单次运行内有效, 不落库;
// 每次运行开始时由当前已分派计数重建
// ==========================================

use crate::domain::window::MaintenanceWindow;
use std::collections::HashMap;

// ==========================================
// CapacityTracker - 单次运行的容量账本
// ==========================================
// slots = floor(duration_days * capacity_slots_per_day) - 已分派数, 下限 0
#[derive(Debug, Default)]
pub struct CapacityTracker {
    remaining: HashMap<String, i64>,
}

impl CapacityTracker {
    /// 由候选窗口和当前分派计数重建容量账本
    ///
    /// # 参数
    /// - windows: 本次运行的候选窗口
    /// - assigned_counts: window_id -> 已分派异常数
    /// - slots_per_day: 每天可容纳的治理项数 (配置项)
    pub fn rebuild(
        windows: &[MaintenanceWindow],
        assigned_counts: &HashMap<String, usize>,
        slots_per_day: f64,
    ) -> Self {
        let mut remaining = HashMap::with_capacity(windows.len());
        for window in windows {
            let total = (window.duration_days as f64 * slots_per_day).floor() as i64;
            let assigned = assigned_counts
                .get(&window.window_id)
                .copied()
                .unwrap_or(0) as i64;
            remaining.insert(window.window_id.clone(), (total - assigned).max(0));
        }
        Self { remaining }
    }

    /// 剩余可分派槽位 (未登记的窗口视为 0)
    pub fn remaining(&self, window_id: &str) -> i64 {
        self.remaining.get(window_id).copied().unwrap_or(0)
    }

    /// 是否还有剩余槽位
    pub fn has_capacity(&self, window_id: &str) -> bool {
        self.remaining(window_id) > 0
    }

    /// 消耗一个槽位, 无剩余时返回 false
    pub fn consume(&mut self, window_id: &str) -> bool {
        match self.remaining.get_mut(window_id) {
            Some(slots) if *slots > 0 => {
                *slots -= 1;
                true
            }
            _ => false,
        }
    }
}
