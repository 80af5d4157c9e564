//! src/parser/mod.rs
//!
//! 语法分析阶段的公共接口：把 Token 流转换为 AST。

pub mod ast;
mod parsers;


use crate::diagnostics::codes::E0100_SYNTAX_ERROR;
use crate::diagnostics::{Diagnostic, DiagnosticBag, Label};
use crate::lexer::{self, Token};
use crate::parser::ast::Program;
use crate::utils::Span;
use chumsky::Parser;
use chumsky::error::{Rich, RichReason};
use chumsky::input::{Input, Stream};
use parsers::program_parser;

/// 对源代码做词法和语法分析。
/// 所有错误都写入 `diagnostics`；只要出现语法错误就不返回 AST。
pub fn parse(source: &str, diagnostics: &mut DiagnosticBag) -> Option<Program> {
    let tokens = lexer::lex(source, diagnostics);
    parse_tokens(source.len(), tokens, diagnostics)
}

/// 对已经切好的 Token 流做语法分析。
pub fn parse_tokens(
    source_len: usize,
    tokens: Vec<(Token, Span)>,
    diagnostics: &mut DiagnosticBag,
) -> Option<Program> {
    // chumsky 需要一个文件末尾的 span，以便在代码意外结束时报告错误。
    let eoi_span = Span::new(source_len, source_len);
    let token_stream = Stream::from_iter(tokens).map(eoi_span, |(token, span): (Token, Span)| (token, span));

    let (ast, parse_errors) = program_parser().parse(token_stream).into_output_errors();

    if parse_errors.is_empty() {
        log::debug!("parsed {} top-level declarations", ast.as_ref().map_or(0, |p| p.decls.len()));
        return ast;
    }

    for error in parse_errors {
        diagnostics.push(syntax_error(&error));
    }
    None
}

fn syntax_error(error: &Rich<'_, Token, Span>) -> Diagnostic {
    let span = *error.span();

    let message = match error.reason() {
        RichReason::Custom(message) => message.clone(),
        _ => {
            let found = error
                .found()
                .map_or("end of input".to_string(), |token| format!("`{}`", token));

            let expected = error
                .expected()
                .map(|pattern| pattern.to_string())
                .collect::<Vec<_>>();

            if expected.is_empty() {
                format!("unexpected {}", found)
            } else {
                format!("unexpected {}, expected {}", found, expected.join(" or "))
            }
        }
    };

    Diagnostic::error(&E0100_SYNTAX_ERROR, Label::new(span, message.clone()))
        .with_dynamic_message(format!("syntax error: {}", message))
}
