// src/main.rs

use clap::Parser;
use decafc::analyzer;
use decafc::diagnostics::{DiagnosticBag, codes};
use decafc::parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

/// Decaf 编译器前端：检查程序是否合法、类型是否正确
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 需要检查的 .decaf 源文件
    #[arg(required_unless_present = "explain")]
    input_file: Option<PathBuf>,

    /// 分析结束后打印 AST（包括推导出的表达式类型）
    #[arg(long)]
    dump_ast: bool,

    /// 输出诊断时不使用颜色
    #[arg(long)]
    no_color: bool,

    /// 打印某个错误码的详细说明，例如 E0205
    #[arg(long, value_name = "CODE")]
    explain: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(code) = &cli.explain {
        return explain(code);
    }

    let Some(input_path) = cli.input_file else {
        return ExitCode::from(2);
    };
    let source_name = input_path.display().to_string();

    let source_code = match fs::read_to_string(&input_path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: failed to read '{}': {}", source_name, err);
            return ExitCode::from(2);
        }
    };

    // 诊断背包收集所有阶段的错误
    let mut diagnostics = DiagnosticBag::new(&source_code);

    let clean = if cli.dump_ast {
        if let Some(program) = parser::parse(&source_code, &mut diagnostics) {
            if !diagnostics.has_errors() {
                analyzer::analyze(&program, &mut diagnostics);
            }
            println!("{:#?}", program);
        }
        diagnostics.is_empty()
    } else {
        decafc::check_source(&source_code, &mut diagnostics)
    };

    if clean {
        log::info!("'{}' is well-formed", source_name);
        return ExitCode::SUCCESS;
    }

    let count = diagnostics.len();
    if let Err(err) = diagnostics.print(&source_name, !cli.no_color) {
        eprintln!("error: failed to write diagnostics: {}", err);
        return ExitCode::from(2);
    }
    eprintln!("{}: {} error(s) found", source_name, count);
    ExitCode::from(1)
}

fn explain(code: &str) -> ExitCode {
    match codes::lookup(code) {
        Some(error_code) => {
            println!("{}: {}\n\n{}", error_code.code, error_code.message, error_code.explanation);
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("error: unknown error code '{}'", code);
            ExitCode::from(1)
        }
    }
}
