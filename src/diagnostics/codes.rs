// src/diagnostics/codes.rs

use crate::diagnostics::DiagnosticLevel;

/// 一个错误码及其相关信息。
/// 所有诊断信息的唯一来源。
#[derive(Debug, Clone)]
pub struct ErrorCode {
    pub code: &'static str,
    pub level: DiagnosticLevel,
    pub message: &'static str,
    pub explanation: &'static str,
}

/*
E00xx: 词法分析 (Lexical Analysis) 错误。

E01xx: 语法分析 (Parsing / Syntax) 错误。

E02xx: 语义分析 (Semantic Analysis) 错误。
*/
// --- E00xx: Lexical Analysis Errors ---

pub const E0000_UNRECOGNIZED_CHAR: ErrorCode = ErrorCode {
    code: "E0000",
    level: DiagnosticLevel::Error,
    message: "Unrecognized character",
    explanation: "The compiler encountered a character that is not part of the Decaf language definition. \
                  This can happen due to typos or trying to use unsupported symbols.",
};

pub const E0001_INTEGER_OUT_OF_RANGE: ErrorCode = ErrorCode {
    code: "E0001",
    level: DiagnosticLevel::Error,
    message: "Integer constant out of range",
    explanation: "Decaf integers are 32-bit signed values. A decimal or hexadecimal constant must fit between \
                  -2147483648 and 2147483647.",
};

// --- E01xx: Syntax Analysis (Parsing) Errors ---

pub const E0100_SYNTAX_ERROR: ErrorCode = ErrorCode {
    code: "E0100",
    level: DiagnosticLevel::Error,
    message: "Syntax error",
    explanation: "The arrangement of tokens does not match any grammar rule of Decaf. \
                  Check for missing semicolons, mismatched brackets, or declarations placed after statements in a block.",
};

// --- E02xx: Semantic Analysis Errors ---

pub const E0200_DECLARATION_CONFLICT: ErrorCode = ErrorCode {
    code: "E0200",
    level: DiagnosticLevel::Error,
    message: "Declaration conflict",
    explanation: "Two declarations with the same name appear in one scope. The first declaration is kept \
                  and every later use of the name refers to it. Inner scopes may shadow outer names.",
};

pub const E0201_OVERRIDE_MISMATCH: ErrorCode = ErrorCode {
    code: "E0201",
    level: DiagnosticLevel::Error,
    message: "Method does not match inherited signature",
    explanation: "A method that overrides an inherited method, or implements an interface method, must have \
                  exactly the same return type and parameter types in the same order.",
};

pub const E0202_INTERFACE_NOT_IMPLEMENTED: ErrorCode = ErrorCode {
    code: "E0202",
    level: DiagnosticLevel::Error,
    message: "Interface method not implemented",
    explanation: "A class that declares `implements I` must provide every method of `I`, \
                  either directly or by inheriting it from a superclass.",
};

pub const E0203_IDENTIFIER_NOT_DECLARED: ErrorCode = ErrorCode {
    code: "E0203",
    level: DiagnosticLevel::Error,
    message: "Identifier not declared",
    explanation: "No declaration of the expected kind (type, class, interface, variable or function) with this \
                  name is visible from here. Names are searched from the innermost scope outwards to the global scope.",
};

pub const E0204_INCOMPATIBLE_OPERAND: ErrorCode = ErrorCode {
    code: "E0204",
    level: DiagnosticLevel::Error,
    message: "Incompatible operand",
    explanation: "A unary operator was applied to an operand of the wrong type. \
                  `-` requires int or double, `!` requires bool.",
};

pub const E0205_INCOMPATIBLE_OPERANDS: ErrorCode = ErrorCode {
    code: "E0205",
    level: DiagnosticLevel::Error,
    message: "Incompatible operands",
    explanation: "The operands of a binary operator or assignment do not fit together. Arithmetic and relational \
                  operators need two numeric operands of the same type, logical operators need bools, and equality \
                  and assignment need compatible types.",
};

pub const E0206_THIS_OUTSIDE_CLASS: ErrorCode = ErrorCode {
    code: "E0206",
    level: DiagnosticLevel::Error,
    message: "`this` is only valid within class scope",
    explanation: "`this` refers to the receiver of a method and may only appear inside a class body.",
};

pub const E0207_BRACKETS_ON_NON_ARRAY: ErrorCode = ErrorCode {
    code: "E0207",
    level: DiagnosticLevel::Error,
    message: "[] can only be applied to arrays",
    explanation: "Indexing with `[ ]` requires the base expression to have an array type.",
};

pub const E0208_SUBSCRIPT_NOT_INTEGER: ErrorCode = ErrorCode {
    code: "E0208",
    level: DiagnosticLevel::Error,
    message: "Array subscript must be an integer",
    explanation: "The expression inside `[ ]` must have type int.",
};

pub const E0209_FIELD_NOT_FOUND: ErrorCode = ErrorCode {
    code: "E0209",
    level: DiagnosticLevel::Error,
    message: "Field not found in base type",
    explanation: "The type of the expression before `.` has no member with this name. Only class and interface \
                  types have members, and arrays only provide `length()`.",
};

pub const E0210_INACCESSIBLE_FIELD: ErrorCode = ErrorCode {
    code: "E0210",
    level: DiagnosticLevel::Error,
    message: "Field is only accessible within class scope",
    explanation: "Fields of a class may only be accessed through an explicit base from inside the body of that class.",
};

pub const E0211_ARGUMENT_COUNT_MISMATCH: ErrorCode = ErrorCode {
    code: "E0211",
    level: DiagnosticLevel::Error,
    message: "Incorrect number of arguments in function call",
    explanation: "The number of arguments provided in the call does not match the number of parameters in the function's declaration.",
};

pub const E0212_ARGUMENT_TYPE_MISMATCH: ErrorCode = ErrorCode {
    code: "E0212",
    level: DiagnosticLevel::Error,
    message: "Incompatible argument",
    explanation: "Each argument must be compatible with the declared parameter type: the same type, a subclass, \
                  a class implementing the parameter's interface, or `null` for class and interface parameters.",
};

pub const E0213_ARRAY_SIZE_NOT_INTEGER: ErrorCode = ErrorCode {
    code: "E0213",
    level: DiagnosticLevel::Error,
    message: "Size for NewArray must be an integer",
    explanation: "The first argument of `NewArray` is the element count and must have type int.",
};

pub const E0214_TEST_NOT_BOOLEAN: ErrorCode = ErrorCode {
    code: "E0214",
    level: DiagnosticLevel::Error,
    message: "Test expression must have boolean type",
    explanation: "The condition of `if`, `while` and `for` must have type bool. Decaf performs no implicit conversion from int.",
};

pub const E0215_BREAK_OUTSIDE_LOOP: ErrorCode = ErrorCode {
    code: "E0215",
    level: DiagnosticLevel::Error,
    message: "`break` is only allowed inside a loop",
    explanation: "The `break` keyword can only be used inside the body of a `while` or `for` loop.",
};

pub const E0216_RETURN_MISMATCH: ErrorCode = ErrorCode {
    code: "E0216",
    level: DiagnosticLevel::Error,
    message: "Incompatible return type",
    explanation: "The returned value must be compatible with the enclosing function's return type. \
                  A bare `return;` is only allowed in a void function.",
};

pub const E0217_PRINT_ARGUMENT_MISMATCH: ErrorCode = ErrorCode {
    code: "E0217",
    level: DiagnosticLevel::Error,
    message: "Incompatible argument to Print",
    explanation: "`Print` accepts only string, int and bool arguments.",
};

/// 所有已登记的错误码，供 `--explain` 查询。
pub const ALL: &[&ErrorCode] = &[
    &E0000_UNRECOGNIZED_CHAR,
    &E0001_INTEGER_OUT_OF_RANGE,
    &E0100_SYNTAX_ERROR,
    &E0200_DECLARATION_CONFLICT,
    &E0201_OVERRIDE_MISMATCH,
    &E0202_INTERFACE_NOT_IMPLEMENTED,
    &E0203_IDENTIFIER_NOT_DECLARED,
    &E0204_INCOMPATIBLE_OPERAND,
    &E0205_INCOMPATIBLE_OPERANDS,
    &E0206_THIS_OUTSIDE_CLASS,
    &E0207_BRACKETS_ON_NON_ARRAY,
    &E0208_SUBSCRIPT_NOT_INTEGER,
    &E0209_FIELD_NOT_FOUND,
    &E0210_INACCESSIBLE_FIELD,
    &E0211_ARGUMENT_COUNT_MISMATCH,
    &E0212_ARGUMENT_TYPE_MISMATCH,
    &E0213_ARRAY_SIZE_NOT_INTEGER,
    &E0214_TEST_NOT_BOOLEAN,
    &E0215_BREAK_OUTSIDE_LOOP,
    &E0216_RETURN_MISMATCH,
    &E0217_PRINT_ARGUMENT_MISMATCH,
];

/// 按错误码字符串（如 `"E0203"`，大小写不敏感）查找。
pub fn lookup(code: &str) -> Option<&'static ErrorCode> {
    ALL.iter()
        .copied()
        .find(|error_code| error_code.code.eq_ignore_ascii_case(code))
}
