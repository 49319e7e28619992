//! calc() 调用的探测、表达式抽取与合法性检查。

use crate::error::{CalcError, CalcResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// 目标函数名，厂商前缀在其之前单独匹配。
pub const CALC_FUNC_IDENTIFIER: &str = "calc";

static CALC_CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(-[a-z]+-)?calc\(").expect("calc 调用正则编译失败"));

/// 判断值中是否出现 calc() 调用（可带 -webkit- 等厂商前缀）。
pub fn has_calc_expression(value: &str) -> bool {
    CALC_CALL_RE.is_match(value)
}

/// 按源码顺序抽取值中每个顶层 calc() 的括号内文本。
///
/// 单次从左到右扫描并维护括号深度；只有在没有表达式处于打开状态、
/// 且 `(` 紧跟在字面量 `calc` 之后时才开启新表达式。嵌套的 calc()
/// 因此会整体留在外层表达式文本里，由求值阶段展平处理。
pub fn expressions_from_value(value: &str) -> Vec<String> {
    let mut expressions = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    // '(' 与 ')' 均为 ASCII，按字节扫描不会切断多字节字符；
    // 函数名比较同样走字节，i - 4 落在多字节字符中间时也不会恐慌。
    let bytes = value.as_bytes();
    for (i, &byte) in bytes.iter().enumerate() {
        match byte {
            b'(' => {
                if start.is_some() {
                    depth += 1;
                } else if i >= CALC_FUNC_IDENTIFIER.len()
                    && &bytes[i - CALC_FUNC_IDENTIFIER.len()..i] == CALC_FUNC_IDENTIFIER.as_bytes()
                {
                    start = Some(i);
                    depth = 1;
                }
            }
            b')' => {
                if let Some(open) = start {
                    depth -= 1;
                    if depth == 0 {
                        expressions.push(value[open + 1..i].to_string());
                        start = None;
                    }
                }
            }
            _ => {}
        }
    }

    expressions
}

/// 在任何替换发生前对整条值做一次合法性检查。
///
/// 括号不配对与空的 calc() 体都视为样式表作者错误，直接报错中止，
/// 而不是留给运行时 calc() 兜底。
pub fn check_value(value: &str) -> CalcResult<()> {
    let mut depth = 0i32;
    for byte in value.bytes() {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(CalcError::unbalanced(value));
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(CalcError::unbalanced(value));
    }

    if let Some(idx) = value.find("calc(") {
        let rest = &value[idx + CALC_FUNC_IDENTIFIER.len()..];
        let mut depth = 0i32;
        for (i, byte) in rest.bytes().enumerate() {
            match byte {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        if rest[1..i].trim().is_empty() {
                            return Err(CalcError::EmptyCalcBody);
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}
