//! # 截面表达式求值器
//!
//! 空间群表里的坐标求解式是不可信的配置字符串（如 `u/2`、`(0.5 - v)/2`），
//! 绝不能交给任何动态执行机制。这里用受限文法手写求值：
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('-' | '+') unary | primary
//! primary := number | 'u' | 'v' | 'w' | '(' expr ')'
//! ```
//!
//! 求值前先剥除所有不在白名单内的字符；剥除后残留的语法错误、
//! 未消费的尾部记号、或非有限结果都按求解失败处理。
//! `%` 是 f64 截断取余。
//!
//! ## 依赖关系
//! - 被 `patterson/harker.rs` 调用
//! - 使用 `regex` 做字符白名单剥除

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{HatlasError, Result};

/// 未知坐标标记：原样传递，不进入求值
pub const UNKNOWN_MARKER: &str = "?";

/// 白名单之外的字符全部剥除
static STRIP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^uvw0-9+\-*/%.()\s]").unwrap());

/// 在峰坐标 (u, v, w) 处求值表达式
///
/// 成功时返回有限实数（未折回 [0,1)，由调用方决定如何归一）。
pub fn evaluate(expression: &str, u: f64, v: f64, w: f64) -> Result<f64> {
    let sanitized = STRIP_PATTERN.replace_all(expression, "");
    let tokens = tokenize(&sanitized).map_err(|reason| HatlasError::Solver {
        expression: expression.to_string(),
        reason,
    })?;

    let mut parser = Parser {
        tokens,
        pos: 0,
        u,
        v,
        w,
    };
    let value = parser.expression().map_err(|reason| HatlasError::Solver {
        expression: expression.to_string(),
        reason,
    })?;

    if parser.pos != parser.tokens.len() {
        return Err(HatlasError::Solver {
            expression: expression.to_string(),
            reason: "trailing tokens after expression".to_string(),
        });
    }
    if !value.is_finite() {
        return Err(HatlasError::Solver {
            expression: expression.to_string(),
            reason: format!("non-finite result: {}", value),
        });
    }

    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Var(char),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            'u' | 'v' | 'w' => {
                tokens.push(Token::Var(c));
                i += 1;
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value: f64 = literal
                    .parse()
                    .map_err(|_| format!("bad numeric literal '{}'", literal))?;
                tokens.push(Token::Num(value));
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }

    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }
    Ok(tokens)
}

/// 递归下降求值器，边解析边计算
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    u: f64,
    v: f64,
    w: f64,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expression(&mut self) -> std::result::Result<f64, String> {
        let mut acc = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    acc += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    acc -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    fn term(&mut self) -> std::result::Result<f64, String> {
        let mut acc = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    acc *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    acc /= self.unary()?;
                }
                Some(Token::Percent) => {
                    self.pos += 1;
                    acc %= self.unary()?;
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    fn unary(&mut self) -> std::result::Result<f64, String> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> std::result::Result<f64, String> {
        match self.advance() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::Var('u')) => Ok(self.u),
            Some(Token::Var('v')) => Ok(self.v),
            Some(Token::Var('w')) => Ok(self.w),
            Some(Token::LParen) => {
                let inner = self.expression()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("missing closing parenthesis".to_string()),
                }
            }
            Some(token) => Err(format!("unexpected token {:?}", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}
