pub mod analyzer;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod utils;

use diagnostics::DiagnosticBag;

/// 对一段 Decaf 源代码运行完整的前端流程：词法、语法、语义分析。
///
/// 所有诊断都写入 `diagnostics`。词法或语法出错时不再做语义分析。
///
/// # Returns
/// * `true` 表示没有产生任何诊断。
pub fn check_source(source: &str, diagnostics: &mut DiagnosticBag) -> bool {
    let Some(program) = parser::parse(source, diagnostics) else {
        return false;
    };

    // 词法错误不会阻止语法分析产出 AST，但分析一棵残缺的树没有意义
    if diagnostics.has_errors() {
        return false;
    }

    let model = analyzer::analyze(&program, diagnostics);
    log::info!(
        "{} declarations analyzed, {} semantic errors",
        program.decls.len(),
        model.error_count()
    );

    diagnostics.is_empty()
}
