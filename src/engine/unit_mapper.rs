// ==========================================
// KC/KCP 绩效报表 ETL - 单元映射器
// ==========================================
// 职责: 子单元名 → 父单元名
// 规则: 大小写不敏感；输入为某别名的子串即命中；
//       按表声明顺序先命中先得；无命中返回 "Unknown"
// ==========================================

use crate::domain::unit_map::{builtin_unit_map, UnitMapEntry};

/// 无匹配时的父单元名
pub const UNKNOWN_UNIT: &str = "Unknown";

pub struct UnitMapper {
    // 预先转大写的别名，匹配时避免重复分配
    entries: Vec<(String, Vec<String>)>,
}

impl UnitMapper {
    pub fn new(table: Vec<UnitMapEntry>) -> Self {
        let entries = table
            .into_iter()
            .map(|e| {
                let aliases = e.aliases.iter().map(|a| a.to_uppercase()).collect();
                (e.parent, aliases)
            })
            .collect();
        Self { entries }
    }

    /// 使用内置映射表
    pub fn builtin() -> Self {
        Self::new(builtin_unit_map())
    }

    /// 解析父单元名
    ///
    /// # 参数
    /// - unit_name: 子单元名（如 "KCP GLODOK"）
    ///
    /// # 返回
    /// - 命中的父单元名；无命中返回 "Unknown"（合法结果，非错误）
    pub fn resolve_parent(&self, unit_name: &str) -> String {
        let needle = unit_name.to_uppercase();
        self.entries
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|alias| alias.contains(&needle)))
            .map(|(parent, _)| parent.clone())
            .unwrap_or_else(|| UNKNOWN_UNIT.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for UnitMapper {
    fn default() -> Self {
        Self::builtin()
    }
}
