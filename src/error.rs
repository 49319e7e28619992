use thiserror::Error;

/// 处理单条声明值时统一的错误类型。
///
/// 两个变体都属于样式表作者错误，按调用方约定会中止整轮处理；
/// 多单位回退、算术求值失败等可恢复情形不走错误通道。
#[derive(Debug, Error)]
pub enum CalcError {
    #[error("missing closing \")\" in the value \"{value}\"")]
    UnbalancedParens { value: String },
    #[error("calc() must contain a non-whitespace string")]
    EmptyCalcBody,
}

pub type CalcResult<T> = Result<T, CalcError>;

impl CalcError {
    pub fn unbalanced<S: Into<String>>(value: S) -> Self {
        CalcError::UnbalancedParens {
            value: value.into(),
        }
    }
}
