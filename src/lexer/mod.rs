// 导入logos分词库
use logos::Logos;
use crate::diagnostics::codes::{E0000_UNRECOGNIZED_CHAR, E0001_INTEGER_OUT_OF_RANGE};
use crate::diagnostics::{Diagnostic, DiagnosticBag, Label};
use crate::utils::Span;
use std::fmt;


/// logos 解析时使用的错误类型
#[derive(Debug, Default, Clone, PartialEq)]
pub enum LexingError {
    #[default]
    InvalidToken,
    /// 整数常量超出 32 位有符号整数范围
    IntegerOutOfRange,
}

/// 词素定义
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(error = LexingError)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum Token {
    // 关键字
    #[token("void")]
    Void,
    #[token("int")]
    Int,
    #[token("double")]
    Double,
    #[token("bool")]
    Bool,
    #[token("string")]
    String,
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("null")]
    Null,
    #[token("this")]
    This,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("New")]
    New,
    #[token("NewArray")]
    NewArray,
    #[token("Print")]
    Print,
    #[token("ReadInteger")]
    ReadInteger,
    #[token("ReadLine")]
    ReadLine,

    // 常量
    #[token("true", |_| true)]
    #[token("false", |_| false)]
    BoolConstant(bool),

    // 比整数规则更长，所以 `1.5` 不会被切成 `1` `.` `5`
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    DoubleConstant(f64),

    #[regex("[0-9]+", lex_decimal)]
    #[regex("0[xX][0-9a-fA-F]+", lex_hex)]
    IntConstant(i32),

    // Decaf 的字符串不支持转义，也不能跨行
    #[regex(r#""[^"\n]*""#, |lex| {
        let slice = lex.slice();
        slice[1..slice.len() - 1].to_string()
    })]
    StringConstant(String),

    #[regex("[a-zA-Z][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // 运算符号
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Assign,
    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    Lte,
    #[token(">=")]
    Gte,
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("!")]
    Not,
    #[token(".")]
    Dot,

    // 分割符号
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Void => "void",
            Token::Int => "int",
            Token::Double => "double",
            Token::Bool => "bool",
            Token::String => "string",
            Token::Class => "class",
            Token::Interface => "interface",
            Token::Null => "null",
            Token::This => "this",
            Token::Extends => "extends",
            Token::Implements => "implements",
            Token::For => "for",
            Token::While => "while",
            Token::If => "if",
            Token::Else => "else",
            Token::Return => "return",
            Token::Break => "break",
            Token::New => "New",
            Token::NewArray => "NewArray",
            Token::Print => "Print",
            Token::ReadInteger => "ReadInteger",
            Token::ReadLine => "ReadLine",
            Token::BoolConstant(b) => return write!(f, "{}", b),
            Token::DoubleConstant(d) => return write!(f, "{}", d),
            Token::IntConstant(i) => return write!(f, "{}", i),
            Token::StringConstant(s) => return write!(f, "\"{}\"", s),
            Token::Ident(name) => return write!(f, "{}", name),
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Assign => "=",
            Token::Eq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Lte => "<=",
            Token::Gte => ">=",
            Token::And => "&&",
            Token::Or => "||",
            Token::Not => "!",
            Token::Dot => ".",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Semicolon => ";",
            Token::Comma => ",",
        };
        f.write_str(text)
    }
}

fn lex_decimal(lex: &mut logos::Lexer<'_, Token>) -> Result<i32, LexingError> {
    lex.slice()
        .parse::<i32>()
        .map_err(|_| LexingError::IntegerOutOfRange)
}

fn lex_hex(lex: &mut logos::Lexer<'_, Token>) -> Result<i32, LexingError> {
    i32::from_str_radix(&lex.slice()[2..], 16).map_err(|_| LexingError::IntegerOutOfRange)
}

/// 对源代码进行词法分析，返回一个 Token 向量，并将所有词法错误报告给 DiagnosticBag。
pub fn lex(source: &str, diagnostics: &mut DiagnosticBag) -> Vec<(Token, Span)> {
    let mut tokens = Vec::new();

    for (result, range) in Token::lexer(source).spanned() {
        let span = Span::from(range.clone());
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(LexingError::IntegerOutOfRange) => {
                diagnostics.push(Diagnostic::error(
                    &E0001_INTEGER_OUT_OF_RANGE,
                    Label::new(span, format!("'{}' does not fit in a 32-bit int", &source[range])),
                ));
            }
            Err(LexingError::InvalidToken) => {
                // LexingError 本身不带字符信息，需要从源码中取出
                let unrecognized_char = source[range].chars().next().unwrap_or_default();
                diagnostics.push(Diagnostic::error(
                    &E0000_UNRECOGNIZED_CHAR,
                    Label::new(span, format!("'{}' is not valid in Decaf", unrecognized_char)),
                ));
            }
        }
    }

    log::debug!("lexed {} tokens", tokens.len());
    tokens
}
