//! 表达式内数值单位后缀的收集与判定。

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

/// 表达式完全没有单位时回退使用的默认单位。
pub const DEFAULT_UNIT: &str = "px";

// 后缀必须紧跟在数字或小数点之后，避免把属性关键字当成单位。
static UNIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.0-9]([%a-z]+)").expect("单位后缀正则编译失败"));

/// 按首次出现顺序收集表达式中去重后的单位后缀。
///
/// 调用方只关心集合大小（0 / 1 / 多）与第一个元素，
/// 这里保序主要是为了让回退判定对同一输入保持确定性。
pub fn units_in_expression(expression: &str) -> IndexSet<String> {
    let mut units = IndexSet::new();
    for caps in UNIT_RE.captures_iter(expression) {
        if let Some(unit) = caps.get(1) {
            units.insert(unit.as_str().to_string());
        }
    }
    units
}
