use crate::diagnostics::{Diagnostic, DiagnosticBag, Label, codes::*};
use crate::utils::Span;
use std::fmt;
use thiserror::Error;

/// 未声明标识符时，期望它是哪一类声明
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookingFor {
    Type,
    Class,
    Interface,
    Variable,
    Function,
}

impl fmt::Display for LookingFor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LookingFor::Type => "type",
            LookingFor::Class => "class",
            LookingFor::Interface => "interface",
            LookingFor::Variable => "variable",
            LookingFor::Function => "function",
        })
    }
}

/// 语义错误。类型都以显示名（例如 `int[]`）携带。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("declaration of '{name}' conflicts with an earlier declaration")]
    DeclarationConflict {
        name: String,
        span: Span,
        previous: Span,
    },

    #[error("method '{name}' must match inherited type signature")]
    OverrideMismatch { name: String, span: Span },

    #[error("class '{class}' does not implement '{method}' from interface '{interface}'")]
    InterfaceNotImplemented {
        class: String,
        interface: String,
        method: String,
        span: Span,
    },

    #[error("no declaration found for {expected} '{name}'")]
    IdentifierNotDeclared {
        name: String,
        expected: LookingFor,
        span: Span,
    },

    #[error("incompatible operand: {op} {operand}")]
    IncompatibleOperand {
        op: &'static str,
        operand: String,
        span: Span,
    },

    #[error("incompatible operands: {left} {op} {right}")]
    IncompatibleOperands {
        op: &'static str,
        left: String,
        right: String,
        span: Span,
    },

    #[error("'this' is only valid within class scope")]
    ThisOutsideClassScope { span: Span },

    #[error("[] can only be applied to arrays")]
    BracketsOnNonArray { span: Span },

    #[error("array subscript must be an integer")]
    SubscriptNotInteger { span: Span },

    #[error("{base} has no such field '{field}'")]
    FieldNotFoundInBase {
        field: String,
        base: String,
        span: Span,
    },

    #[error("{base} field '{field}' only accessible within class scope")]
    InaccessibleField {
        field: String,
        base: String,
        span: Span,
    },

    #[error("function '{function}' expects {expected} arguments but {given} given")]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        given: usize,
        span: Span,
    },

    #[error("incompatible argument {index}: {given} given, {expected} expected")]
    ArgumentTypeMismatch {
        index: usize,
        given: String,
        expected: String,
        span: Span,
    },

    #[error("size for NewArray must be an integer")]
    ArraySizeNotInteger { span: Span },

    #[error("test expression must have boolean type")]
    TestNotBoolean { span: Span },

    #[error("break is only allowed inside a loop")]
    BreakOutsideLoop { span: Span },

    #[error("incompatible return: {given} given, {expected} expected")]
    ReturnTypeMismatch {
        given: String,
        expected: String,
        span: Span,
    },

    #[error("incompatible argument {index}: {given} given, int/bool/string expected")]
    PrintArgumentMismatch {
        index: usize,
        given: String,
        span: Span,
    },
}

impl SemanticError {
    /// 主标签所在的位置
    pub fn span(&self) -> Span {
        match self {
            SemanticError::DeclarationConflict { span, .. }
            | SemanticError::OverrideMismatch { span, .. }
            | SemanticError::InterfaceNotImplemented { span, .. }
            | SemanticError::IdentifierNotDeclared { span, .. }
            | SemanticError::IncompatibleOperand { span, .. }
            | SemanticError::IncompatibleOperands { span, .. }
            | SemanticError::ThisOutsideClassScope { span }
            | SemanticError::BracketsOnNonArray { span }
            | SemanticError::SubscriptNotInteger { span }
            | SemanticError::FieldNotFoundInBase { span, .. }
            | SemanticError::InaccessibleField { span, .. }
            | SemanticError::ArgumentCountMismatch { span, .. }
            | SemanticError::ArgumentTypeMismatch { span, .. }
            | SemanticError::ArraySizeNotInteger { span }
            | SemanticError::TestNotBoolean { span }
            | SemanticError::BreakOutsideLoop { span }
            | SemanticError::ReturnTypeMismatch { span, .. }
            | SemanticError::PrintArgumentMismatch { span, .. } => *span,
        }
    }

    fn code(&self) -> &'static ErrorCode {
        match self {
            SemanticError::DeclarationConflict { .. } => &E0200_DECLARATION_CONFLICT,
            SemanticError::OverrideMismatch { .. } => &E0201_OVERRIDE_MISMATCH,
            SemanticError::InterfaceNotImplemented { .. } => &E0202_INTERFACE_NOT_IMPLEMENTED,
            SemanticError::IdentifierNotDeclared { .. } => &E0203_IDENTIFIER_NOT_DECLARED,
            SemanticError::IncompatibleOperand { .. } => &E0204_INCOMPATIBLE_OPERAND,
            SemanticError::IncompatibleOperands { .. } => &E0205_INCOMPATIBLE_OPERANDS,
            SemanticError::ThisOutsideClassScope { .. } => &E0206_THIS_OUTSIDE_CLASS,
            SemanticError::BracketsOnNonArray { .. } => &E0207_BRACKETS_ON_NON_ARRAY,
            SemanticError::SubscriptNotInteger { .. } => &E0208_SUBSCRIPT_NOT_INTEGER,
            SemanticError::FieldNotFoundInBase { .. } => &E0209_FIELD_NOT_FOUND,
            SemanticError::InaccessibleField { .. } => &E0210_INACCESSIBLE_FIELD,
            SemanticError::ArgumentCountMismatch { .. } => &E0211_ARGUMENT_COUNT_MISMATCH,
            SemanticError::ArgumentTypeMismatch { .. } => &E0212_ARGUMENT_TYPE_MISMATCH,
            SemanticError::ArraySizeNotInteger { .. } => &E0213_ARRAY_SIZE_NOT_INTEGER,
            SemanticError::TestNotBoolean { .. } => &E0214_TEST_NOT_BOOLEAN,
            SemanticError::BreakOutsideLoop { .. } => &E0215_BREAK_OUTSIDE_LOOP,
            SemanticError::ReturnTypeMismatch { .. } => &E0216_RETURN_MISMATCH,
            SemanticError::PrintArgumentMismatch { .. } => &E0217_PRINT_ARGUMENT_MISMATCH,
        }
    }

    /// 主标签上的简短说明
    fn label(&self) -> String {
        match self {
            SemanticError::DeclarationConflict { name, .. } => format!("'{}' redeclared here", name),
            SemanticError::OverrideMismatch { .. } => "signature differs from the inherited one".to_string(),
            SemanticError::InterfaceNotImplemented { method, .. } => format!("'{}' is missing", method),
            SemanticError::IdentifierNotDeclared { expected, .. } => format!("not a known {}", expected),
            SemanticError::IncompatibleOperand { operand, .. } => format!("this has type `{}`", operand),
            SemanticError::IncompatibleOperands { left, right, .. } => {
                format!("`{}` and `{}` cannot be combined here", left, right)
            }
            SemanticError::ThisOutsideClassScope { .. } => "not inside a class".to_string(),
            SemanticError::BracketsOnNonArray { .. } => "this is not an array".to_string(),
            SemanticError::SubscriptNotInteger { .. } => "expected `int`".to_string(),
            SemanticError::FieldNotFoundInBase { base, .. } => format!("not a field of `{}`", base),
            SemanticError::InaccessibleField { .. } => "accessed from outside its class".to_string(),
            SemanticError::ArgumentCountMismatch { expected, given, .. } => {
                format!("expected {}, found {}", expected, given)
            }
            SemanticError::ArgumentTypeMismatch { given, expected, .. }
            | SemanticError::ReturnTypeMismatch { given, expected, .. } => {
                format!("expected `{}`, found `{}`", expected, given)
            }
            SemanticError::ArraySizeNotInteger { .. } => "expected `int`".to_string(),
            SemanticError::TestNotBoolean { .. } => "expected `bool`".to_string(),
            SemanticError::BreakOutsideLoop { .. } => "not inside a loop".to_string(),
            SemanticError::PrintArgumentMismatch { given, .. } => format!("`{}` cannot be printed", given),
        }
    }
}

impl From<SemanticError> for Diagnostic {
    fn from(error: SemanticError) -> Self {
        let diagnostic = Diagnostic::error(error.code(), Label::new(error.span(), error.label()))
            .with_dynamic_message(error.to_string());

        match error {
            SemanticError::DeclarationConflict { previous, .. } => {
                diagnostic.with_secondary_label(Label::new(previous, "first declared here"))
            }
            _ => diagnostic,
        }
    }
}

/// 语义分析把每个违规交给它，然后继续分析。
pub trait DiagnosticSink {
    fn report(&mut self, error: SemanticError);
}

impl DiagnosticSink for Vec<SemanticError> {
    fn report(&mut self, error: SemanticError) {
        self.push(error);
    }
}

impl DiagnosticSink for DiagnosticBag {
    fn report(&mut self, error: SemanticError) {
        self.push(error.into());
    }
}
