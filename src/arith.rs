//! 受限的四则运算求值器。
//!
//! 只接受数字字面量、`+ - * /`、括号与一元正负号，不识别任何标识符
//! 或函数调用，样式表文本因此没有代码注入面。求值失败或结果非有限
//! 数时返回 None，由调用方回退到运行时 calc()。

/// 对纯算术字符串求值，输入消费不完整或结果非有限数时返回 None。
pub fn evaluate(input: &str) -> Option<f64> {
    let mut parser = Parser::new(input);
    let value = parser.expression()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return None;
    }
    value.is_finite().then_some(value)
}

/// 经典递归下降：expression 处理加减，term 处理乘除，factor 处理
/// 括号、一元符号与数字。
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn expression(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Some(value),
            }
        }
    }

    fn term(&mut self) -> Option<f64> {
        let mut value = self.factor()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    value /= self.factor()?;
                }
                _ => return Some(value),
            }
        }
    }

    fn factor(&mut self) -> Option<f64> {
        self.skip_whitespace();
        match self.peek()? {
            b'-' => {
                self.pos += 1;
                Some(-self.factor()?)
            }
            b'+' => {
                self.pos += 1;
                self.factor()
            }
            b'(' => {
                self.pos += 1;
                let value = self.expression()?;
                self.skip_whitespace();
                if self.peek() != Some(b')') {
                    return None;
                }
                self.pos += 1;
                Some(value)
            }
            _ => self.number(),
        }
    }

    fn number(&mut self) -> Option<f64> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9') | Some(b'.')) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        self.input[start..self.pos].parse().ok()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_operations() {
        assert_eq!(evaluate("10 + 5"), Some(15.0));
        assert_eq!(evaluate("10 - 5"), Some(5.0));
        assert_eq!(evaluate("10 * 5"), Some(50.0));
        assert_eq!(evaluate("10 / 5"), Some(2.0));
    }

    #[test]
    fn precedence_and_parentheses() {
        assert_eq!(evaluate("2 + 3 * 4"), Some(14.0));
        assert_eq!(evaluate("(2 + 3) * 4"), Some(20.0));
        assert_eq!(evaluate("(10 + 10) / 2"), Some(10.0));
    }

    #[test]
    fn unary_signs() {
        assert_eq!(evaluate("-5 + 10"), Some(5.0));
        assert_eq!(evaluate("10 * -2"), Some(-20.0));
        assert_eq!(evaluate("+3"), Some(3.0));
        assert_eq!(evaluate("--4"), Some(4.0));
    }

    #[test]
    fn decimal_literals() {
        assert_eq!(evaluate("0.5 * 0.5"), Some(0.25));
        assert_eq!(evaluate(".5 + .5"), Some(1.0));
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert_eq!(evaluate(""), None);
        assert_eq!(evaluate("10 +"), None);
        assert_eq!(evaluate("(10 + 5"), None);
        assert_eq!(evaluate("10 5"), None);
        assert_eq!(evaluate("1.2.3"), None);
        assert_eq!(evaluate("10 px"), None);
        assert_eq!(evaluate("alert(1)"), None);
    }

    #[test]
    fn non_finite_results_are_rejected() {
        assert_eq!(evaluate("1 / 0"), None);
        assert_eq!(evaluate("0 / 0"), None);
    }
}
