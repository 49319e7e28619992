//! calc_oxide 库入口，在构建期把单一单位的 CSS calc() 表达式折算成字面量。
//! 内部分为四个阶段：探测与抽取（extract）→ 单位分析（units）→
//! 受限算术求值（arith）→ 结果回写（reduce）。
//! 多单位表达式原样保留，交给浏览器端的原生 calc() 兜底。

mod arith;
mod error;
mod extract;
mod reduce;
mod units;

pub use crate::error::{CalcError, CalcResult};
pub use crate::extract::has_calc_expression;

use std::fmt;
use std::sync::Arc;

/// 警告回调，入参为完整的警告文本。
pub type WarningSink = Arc<dyn Fn(&str) + Send + Sync>;

/// calc() 预计算配置，目前只提供基础开关，后续可扩展舍入精度等能力。
#[derive(Clone)]
pub struct ReduceOptions {
    /// 为 true 时在计算结果之后保留原始 calc() 文本，
    /// 让仍想要运行时兜底的下游同时拿到两种表示。
    pub preserve: bool,
    /// 无单位回退等警告的输出回调；不设置时写入 stderr。
    pub warning_sink: Option<WarningSink>,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            preserve: false,
            warning_sink: None,
        }
    }
}

impl fmt::Debug for ReduceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReduceOptions")
            .field("preserve", &self.preserve)
            .field("warning_sink", &self.warning_sink.is_some())
            .finish()
    }
}

impl ReduceOptions {
    pub(crate) fn warn(&self, message: &str) {
        match &self.warning_sink {
            Some(sink) => sink(message),
            None => eprintln!("{message}"),
        }
    }
}

/// 预计算一条声明值中的 calc() 表达式。
///
/// 纯函数：返回改写后的新字符串，由调用方决定如何写回声明节点。
/// 括号不配对或 calc() 体为空属于作者错误，直接返回 Err 并按约定
/// 中止整轮处理。
///
/// # 参数
/// * `value` - 声明值文本
/// * `options` - 预计算配置
pub fn reduce_value(value: &str, options: &ReduceOptions) -> CalcResult<String> {
    // 不含 calc( 的值直接原样返回，跳过整条流水线。
    if !has_calc_expression(value) {
        return Ok(value.to_string());
    }
    reduce::resolve_value(value, options)
}

/// 外部 CSS 遍历器传入的节点类型标记。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Declaration,
    Comment,
}

/// 外部遍历器传入的声明记录，value 为待改写的声明值。
#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: NodeKind,
    pub property: String,
    pub value: String,
}

/// 就地处理一组声明节点，只改写 kind 为 Declaration 的条目。
///
/// 每条声明独立处理，声明之间没有顺序依赖；任何一条触发致命错误
/// 都会立即向上传播并终止整轮处理。
pub fn reduce_declarations(
    declarations: &mut [Declaration],
    options: &ReduceOptions,
) -> CalcResult<()> {
    for declaration in declarations.iter_mut() {
        if declaration.kind != NodeKind::Declaration {
            continue;
        }
        if !has_calc_expression(&declaration.value) {
            continue;
        }
        declaration.value = reduce::resolve_value(&declaration.value, options)?;
    }
    Ok(())
}

#[cfg(feature = "node")]
use napi::{Error, Result};
#[cfg(feature = "node")]
use napi_derive::napi;

/// Node.js 侧的预计算选项对象。
#[cfg(feature = "node")]
#[napi(object)]
pub struct JsReduceOptions {
    /// 是否在结果后保留原始 calc() 文本。
    pub preserve: Option<bool>,
}

/// 暴露给 Node.js 的声明值预计算函数。
#[cfg(feature = "node")]
#[napi]
pub fn reduce_css_calc(value: String, options: Option<JsReduceOptions>) -> Result<String> {
    let opt = options.unwrap_or(JsReduceOptions { preserve: None });
    let reduce_options = ReduceOptions {
        preserve: opt.preserve.unwrap_or(false),
        ..ReduceOptions::default()
    };
    let result =
        reduce_value(&value, &reduce_options).map_err(|err| Error::from_reason(err.to_string()))?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reduce_single_unit_value() {
        let result = reduce_value("calc(10px + 5px)", &ReduceOptions::default()).unwrap();
        assert_eq!(result, "15px");
    }

    #[test]
    fn value_without_calc_is_returned_unchanged() {
        let result = reduce_value("1px solid black", &ReduceOptions::default()).unwrap();
        assert_eq!(result, "1px solid black");
    }

    #[test]
    fn reduction_is_idempotent() {
        let options = ReduceOptions::default();
        let once = reduce_value("margin 0 auto calc(10px + 5px)", &options).unwrap();
        let twice = reduce_value(&once, &options).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_unit_emits_one_warning_through_the_sink() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);
        let options = ReduceOptions {
            preserve: false,
            warning_sink: Some(Arc::new(move |message: &str| {
                sink.lock().unwrap().push(message.to_string());
            })),
        };

        let result = reduce_value("calc(10 + 10)", &options).unwrap();
        assert_eq!(result, "20px");

        let messages = captured.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0],
            "No unit found in expression: \"calc(10 + 10)\", defaults to: \"px\""
        );
    }

    #[test]
    fn declarations_are_rewritten_in_place() {
        let mut declarations = vec![
            Declaration {
                kind: NodeKind::Declaration,
                property: "width".to_string(),
                value: "calc(100% / 4)".to_string(),
            },
            Declaration {
                kind: NodeKind::Comment,
                property: String::new(),
                value: "calc(10px + 5px)".to_string(),
            },
            Declaration {
                kind: NodeKind::Declaration,
                property: "border".to_string(),
                value: "1px solid black".to_string(),
            },
        ];

        reduce_declarations(&mut declarations, &ReduceOptions::default()).unwrap();

        assert_eq!(declarations[0].value, "25%");
        assert_eq!(declarations[1].value, "calc(10px + 5px)");
        assert_eq!(declarations[2].value, "1px solid black");
    }

    #[test]
    fn fatal_error_aborts_the_whole_pass() {
        let mut declarations = vec![
            Declaration {
                kind: NodeKind::Declaration,
                property: "width".to_string(),
                value: "calc(10px - 5px".to_string(),
            },
            Declaration {
                kind: NodeKind::Declaration,
                property: "height".to_string(),
                value: "calc(10px + 5px)".to_string(),
            },
        ];

        let err = reduce_declarations(&mut declarations, &ReduceOptions::default()).unwrap_err();
        assert!(err.to_string().contains("missing closing \")\""));
        // 后续声明保持未处理状态。
        assert_eq!(declarations[1].value, "calc(10px + 5px)");
    }
}
