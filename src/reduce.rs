//! 表达式求值与回写：把可解析的 calc() 替换成字面量结果。

use crate::arith;
use crate::error::CalcResult;
use crate::extract::{check_value, expressions_from_value, CALC_FUNC_IDENTIFIER};
use crate::units::{units_in_expression, DEFAULT_UNIT};
use crate::ReduceOptions;
use once_cell::sync::Lazy;
use regex::Regex;

static CALC_METHOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(-[a-z]+-)?calc\(").expect("calc 方法名正则编译失败"));

static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[0-9.]+%").expect("百分比字面量正则编译失败"));

/// 解析一条声明值中的全部 calc() 表达式并逐个回写。
///
/// 替换逐表达式作用在"当前值"上，后面的表达式能看到前面替换的结果；
/// 求值失败或多单位的表达式原样保留，交给运行时 calc() 兜底。
pub fn resolve_value(value: &str, options: &ReduceOptions) -> CalcResult<String> {
    check_value(value)?;

    let mut resolved = value.to_string();
    // 替换按源码顺序推进，每次从上一处替换的结尾继续搜索：
    // 后面的表达式能看到前面替换的结果，preserve 保留下来的原文
    // 也不会被文本相同的后续表达式再次命中。
    let mut offset = 0usize;
    for expression in expressions_from_value(value) {
        let Some(result) = evaluate_expression(&expression, options) else {
            continue;
        };

        // 精确匹配该表达式的转义文本，避免误伤文本相同的其他片段；
        // 厂商前缀属于匹配的一部分，会随调用一起被替换掉。
        let pattern = format!(
            r"(-[a-z]+-)?{}\({}\)",
            CALC_FUNC_IDENTIFIER,
            regex::escape(&expression)
        );
        let Ok(call_re) = Regex::new(&pattern) else {
            continue;
        };
        let Some(found) = call_re.find(&resolved[offset..]) else {
            continue;
        };

        let start = offset + found.start();
        let end = offset + found.end();
        let replacement = if options.preserve {
            format!("{result} {}", &resolved[start..end])
        } else {
            result
        };
        resolved.replace_range(start..end, &replacement);
        offset = start + replacement.len();
    }

    Ok(resolved)
}

/// 求值单个表达式，返回字面量文本；多单位或求值失败时返回 None。
fn evaluate_expression(expression: &str, options: &ReduceOptions) -> Option<String> {
    let original = format!("{CALC_FUNC_IDENTIFIER}({expression})");

    // 展平嵌套调用：把内层的 calc( 退化成裸括号，只留算术结构。
    let mut prepared = CALC_METHOD_RE.replace_all(expression, "(").into_owned();

    let units = units_in_expression(&prepared);
    if units.len() > 1 {
        return None;
    }

    let unit = match units.first() {
        Some(unit) => unit.clone(),
        None => {
            options.warn(&format!(
                "No unit found in expression: \"{original}\", defaults to: \"{DEFAULT_UNIT}\""
            ));
            DEFAULT_UNIT.to_string()
        }
    };

    if unit == "%" {
        // 百分比先折算成小数，让 50% * 50% 这类乘法能正确组合。
        prepared = PERCENT_RE
            .replace_all(&prepared, |caps: &regex::Captures| {
                let token = &caps[0];
                match lenient_number(&token[..token.len() - 1]) {
                    Some(number) => format!("{}", number * 0.01),
                    None => token.to_string(),
                }
            })
            .into_owned();
    }
    let to_evaluate = prepared.replace(unit.as_str(), "");

    let mut result = arith::evaluate(&to_evaluate)?;
    if unit == "%" {
        result *= 100.0;
    }

    // 零值不需要单位，裸 0 在 CSS 里合法且更紧凑。
    if result == 0.0 {
        Some("0".to_string())
    } else {
        Some(format!("{result}{unit}"))
    }
}

/// parseFloat 式的宽松数字解析：取最长的合法前缀，
/// 像 10.5.5 这样多一个小数点的 token 读出 10.5。
fn lenient_number(token: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_dot = false;
    for (idx, ch) in token.char_indices() {
        match ch {
            '0'..='9' => end = idx + 1,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
    }
    if end == 0 {
        return None;
    }
    token[..end].parse().ok()
}
