// In src/analyzer/test.rs

use super::*;
use crate::diagnostics::DiagnosticBag;
use crate::parser::ast::{Decl, ExprKind, Program, Stmt};
use crate::parser::parse;
use assert_matches::assert_matches;

/// 测试的前置条件：词法和语法分析必须完全正确
fn setup(src: &str) -> Program {
    let mut diagnostics = DiagnosticBag::new(src);
    let program = parse(src, &mut diagnostics);
    assert!(
        diagnostics.is_empty(),
        "test setup failed (parsing errors) for source:\n{}\n{:?}",
        src,
        diagnostics.iter().map(|d| d.message()).collect::<Vec<_>>()
    );
    program.expect("parser returned no AST despite reporting no errors")
}

/// 返回分析过程中收集到的全部语义错误
fn semantic_errors(src: &str) -> Vec<SemanticError> {
    let program = setup(src);
    let mut errors = Vec::new();
    analyze(&program, &mut errors);
    errors
}

/// 应该通过分析的代码
fn analyze_ok(src: &str) {
    let errors = semantic_errors(src);
    assert!(errors.is_empty(), "analysis failed unexpectedly for source:\n{}\n{:#?}", src, errors);
}

/// 应该恰好产生一个语义错误的代码
fn analyze_single_err(src: &str) -> SemanticError {
    let mut errors = semantic_errors(src);
    assert_eq!(errors.len(), 1, "expected exactly one error for source:\n{}\n{:#?}", src, errors);
    errors.remove(0)
}

mod declarations {
    use super::*;

    #[test]
    fn test_duplicate_global_keeps_first_declaration() {
        let src = "int x; double x; void main() { x = 1; }";
        let program = setup(src);
        let mut errors = Vec::new();
        let model = analyze(&program, &mut errors);

        assert_eq!(errors.len(), 1);
        assert_matches!(&errors[0], SemanticError::DeclarationConflict { name, .. } if name == "x");
        assert_matches!(model.lookup_global("x"), Some(Symbol::Variable(var)) => {
            assert_eq!(var.ty.to_string(), "int");
        });
    }

    #[test]
    fn test_conflict_points_at_both_declarations() {
        let src = "void f() {} int f;";
        let error = analyze_single_err(src);
        assert_matches!(error, SemanticError::DeclarationConflict { span, previous, .. } => {
            assert_eq!(&src[span.start..span.end], "f");
            assert!(previous.start < span.start);
        });
    }

    #[test]
    fn test_duplicate_local_and_formal() {
        let errors = semantic_errors("void f(int a, bool a) { int b; string b; }");
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, SemanticError::DeclarationConflict { .. })));
    }

    #[test]
    fn test_shadowing_outer_names_is_allowed() {
        analyze_ok(
            r#"
            int x;
            void f(double x) {
                bool x;
                x = true;
                { string x; x = "inner"; }
            }
        "#,
        );
    }

    #[test]
    fn test_undeclared_type_reported_once() {
        let error = analyze_single_err("Foo[][] grid;");
        assert_matches!(error, SemanticError::IdentifierNotDeclared { name, expected: LookingFor::Type, .. } if name == "Foo");
    }

    #[test]
    fn test_variable_name_is_not_a_type() {
        let error = analyze_single_err("int Shape; void f(Shape s) {}");
        assert_matches!(error, SemanticError::IdentifierNotDeclared { expected: LookingFor::Type, .. });
    }

    #[test]
    fn test_return_type_annotation_checked() {
        let error = analyze_single_err("Missing f() { return null; }");
        assert_matches!(error, SemanticError::IdentifierNotDeclared { name, expected: LookingFor::Type, .. } if name == "Missing");
    }

    #[test]
    fn test_scopes_are_linked_to_their_nodes() {
        let program = setup("class A { void m() { while (true) { int i; } } }");
        let mut errors = Vec::new();
        let model = analyze(&program, &mut errors);
        assert!(errors.is_empty());

        let global = model.global_scope();
        assert_matches!(model.scopes().get(global).kind, ScopeKind::Program);

        let Decl::Class(class) = &program.decls[0] else { panic!("expected a class") };
        let class_scope = class.scope.get().unwrap();
        assert_eq!(model.scopes().get(class_scope).parent, Some(global));

        let Decl::Function(method) = &class.members[0] else { panic!("expected a method") };
        let method_scope = method.scope.get().unwrap();
        assert_eq!(model.scopes().get(method_scope).parent, Some(class_scope));

        let body = method.body.as_ref().unwrap();
        let Stmt::While(while_stmt) = &body.stmts[0] else { panic!("expected a while loop") };
        let loop_scope = while_stmt.scope.get().unwrap();
        assert_matches!(model.scopes().get(loop_scope).kind, ScopeKind::Loop);
        assert_eq!(model.scopes().get(loop_scope).parent, body.scope.get());
        assert_matches!(model.lookup(loop_scope, "m"), Some(Symbol::Function(_)));
    }
}

mod inheritance {
    use super::*;

    #[test]
    fn test_matching_override_is_accepted() {
        let src = r#"
            class A { int m(int x) { return x; } }
            class B extends A { int m(int y) { return y + 1; } }
        "#;
        let program = setup(src);
        let mut errors = Vec::new();
        let model = analyze(&program, &mut errors);

        assert!(errors.is_empty(), "{:#?}", errors);
        assert_matches!(model.lookup_member("B", "m"), Some(Symbol::Function(f)) => {
            assert_eq!(f.formals[0].name.name, "y");
        });
    }

    #[test]
    fn test_override_with_different_return_type() {
        let error = analyze_single_err(
            "class A { int m() { return 1; } } class B extends A { double m() { return 1.0; } }",
        );
        assert_matches!(error, SemanticError::OverrideMismatch { name, .. } if name == "m");
    }

    #[test]
    fn test_override_with_different_parameters() {
        let error = analyze_single_err("class A { void m(int a) {} } class B extends A { void m(int a, int b) {} }");
        assert_matches!(error, SemanticError::OverrideMismatch { .. });
    }

    #[test]
    fn test_override_with_different_undeclared_return_type() {
        let errors = semantic_errors(
            "class A { Foo m() { return null; } } class B extends A { Bar m() { return null; } }",
        );
        assert_eq!(errors.len(), 3, "{:#?}", errors);
        assert_matches!(
            errors.iter().find(|e| matches!(e, SemanticError::OverrideMismatch { .. })),
            Some(SemanticError::OverrideMismatch { name, .. }) if name == "m"
        );
    }

    #[test]
    fn test_override_with_same_undeclared_type() {
        let errors = semantic_errors("class A { void m(Foo f) {} } class B extends A { void m(Foo g) {} }");
        assert_eq!(errors.len(), 2, "{:#?}", errors);
        assert!(errors.iter().all(|e| matches!(e, SemanticError::IdentifierNotDeclared { .. })));
    }

    #[test]
    fn test_redeclared_field_conflicts() {
        let error = analyze_single_err("class A { int x; } class B extends A { int x; }");
        assert_matches!(error, SemanticError::DeclarationConflict { name, .. } if name == "x");
    }

    #[test]
    fn test_method_shadowing_field_conflicts() {
        let error = analyze_single_err("class A { int x; } class B extends A { void x() {} }");
        assert_matches!(error, SemanticError::DeclarationConflict { .. });
    }

    #[test]
    fn test_members_are_copied_down() {
        let src = "class A { int f; void g() {} } class B extends A {} class C extends B {}";
        let program = setup(src);
        let mut errors = Vec::new();
        let model = analyze(&program, &mut errors);

        assert!(errors.is_empty());
        assert_matches!(model.lookup_member("C", "f"), Some(Symbol::Variable(_)));
        assert_matches!(model.lookup_member("C", "g"), Some(Symbol::Function(_)));
        assert_matches!(model.lookup_member("A", "h"), None);
    }

    #[test]
    fn test_mismatch_reported_once_across_levels() {
        let errors = semantic_errors(
            r#"
            class A { void m(int x) {} }
            class B extends A { void m(double x) {} }
            class C extends B { void m(double x) {} }
        "#,
        );
        assert_eq!(errors.len(), 1, "{:#?}", errors);
        assert_matches!(&errors[0], SemanticError::OverrideMismatch { .. });
    }

    #[test]
    fn test_extends_undeclared_class() {
        let errors = semantic_errors("class B extends Missing {} class C extends B {}");
        assert_eq!(errors.len(), 1, "{:#?}", errors);
        assert_matches!(&errors[0], SemanticError::IdentifierNotDeclared { name, expected: LookingFor::Class, .. } if name == "Missing");
    }

    #[test]
    fn test_extends_interface_is_rejected() {
        let error = analyze_single_err("interface I {} class B extends I {}");
        assert_matches!(error, SemanticError::IdentifierNotDeclared { expected: LookingFor::Class, .. });
    }

    #[test]
    fn test_inheritance_cycle_terminates() {
        analyze_ok("class A extends B { int a; } class B extends A { int b; }");
    }
}

mod interfaces {
    use super::*;

    const SHAPE: &str = "interface Shape { double area(); void scale(int factor); }";

    #[test]
    fn test_complete_implementation() {
        analyze_ok(&format!(
            "{} class Square implements Shape {{ double side; double area() {{ return side * side; }} void scale(int f) {{}} }}",
            SHAPE
        ));
    }

    #[test]
    fn test_one_error_per_missing_method() {
        let errors = semantic_errors(&format!("{} class Blob implements Shape {{}}", SHAPE));
        assert_eq!(errors.len(), 2, "{:#?}", errors);
        let missing: Vec<_> = errors
            .iter()
            .map(|e| match e {
                SemanticError::InterfaceNotImplemented { method, interface, .. } => {
                    assert_eq!(interface, "Shape");
                    method.as_str()
                }
                other => panic!("unexpected error {:?}", other),
            })
            .collect();
        assert_eq!(missing, vec!["area", "scale"]);
    }

    #[test]
    fn test_mismatched_implementation() {
        let error = analyze_single_err(&format!(
            "{} class Square implements Shape {{ int area() {{ return 1; }} void scale(int f) {{}} }}",
            SHAPE
        ));
        assert_matches!(error, SemanticError::OverrideMismatch { name, .. } if name == "area");
    }

    #[test]
    fn test_field_named_like_interface_method() {
        let error = analyze_single_err(&format!(
            "{} class Square implements Shape {{ double area; void scale(int f) {{}} }}",
            SHAPE
        ));
        assert_matches!(error, SemanticError::DeclarationConflict { name, .. } if name == "area");
    }

    #[test]
    fn test_inherited_method_satisfies_interface() {
        analyze_ok(&format!(
            "{} class Base {{ double area() {{ return 0.0; }} }} class Square extends Base implements Shape {{ void scale(int f) {{}} }}",
            SHAPE
        ));
    }

    #[test]
    fn test_implements_a_class() {
        let error = analyze_single_err("class A {} class B implements A {}");
        assert_matches!(error, SemanticError::IdentifierNotDeclared { name, expected: LookingFor::Interface, .. } if name == "A");
    }

    #[test]
    fn test_duplicate_prototype() {
        let error = analyze_single_err("interface I { void m(); int m(); }");
        assert_matches!(error, SemanticError::DeclarationConflict { .. });
    }
}

mod compatibility {
    use super::*;

    #[test]
    fn test_arrays_are_invariant() {
        let errors = semantic_errors(
            r#"
            void main() {
                int[] a; double[] b; int c;
                a = a;
                a = b;
                a = c;
            }
        "#,
        );
        assert_eq!(errors.len(), 2, "{:#?}", errors);
        assert_matches!(&errors[0], SemanticError::IncompatibleOperands { op: "=", left, right, .. } => {
            assert_eq!(left, "int[]");
            assert_eq!(right, "double[]");
        });
        assert_matches!(&errors[1], SemanticError::IncompatibleOperands { right, .. } if right == "int");
    }

    #[test]
    fn test_null_only_fits_object_types() {
        let error = analyze_single_err(
            "interface I {} class A {} void main() { A a; I i; int n; a = null; i = null; n = null; }",
        );
        assert_matches!(error, SemanticError::IncompatibleOperands { left, right, .. } => {
            assert_eq!(left, "int");
            assert_eq!(right, "null");
        });
    }

    #[test]
    fn test_unrelated_classes_are_not_comparable() {
        let error = analyze_single_err("class A {} class B {} void main() { A a; B b; if (a == b) {} }");
        assert_matches!(error, SemanticError::IncompatibleOperands { op: "==", .. });
    }

    #[test]
    fn test_related_classes_are_comparable_both_ways() {
        analyze_ok("class A {} class B extends A {} void main() { A a; B b; if (a == b || b != a || a == null) {} }");
    }

    #[test]
    fn test_subclass_argument() {
        analyze_ok("class A {} class B extends A {} void f(A a) {} void main() { f(New(B)); }");
    }

    #[test]
    fn test_superclass_does_not_fit_subclass() {
        let error = analyze_single_err("class A {} class B extends A {} void main() { B b; b = New(A); }");
        assert_matches!(error, SemanticError::IncompatibleOperands { left, right, .. } => {
            assert_eq!(left, "B");
            assert_eq!(right, "A");
        });
    }

    #[test]
    fn test_interface_through_ancestor() {
        analyze_ok(
            r#"
            interface I { void m(); }
            class A implements I { void m() {} }
            class B extends A {}
            void main() { I i; i = New(B); i.m(); }
        "#,
        );
    }

    #[test]
    fn test_assign_bool_to_int() {
        let error = analyze_single_err("int x; bool y; void main() { x = y; }");
        assert_matches!(error, SemanticError::IncompatibleOperands { op: "=", .. });
    }
}

mod expressions {
    use super::*;

    #[test]
    fn test_mixed_arithmetic() {
        let error = analyze_single_err("void main() { double d; d = 1 + 2.0; }");
        assert_matches!(error, SemanticError::IncompatibleOperands { op: "+", left, right, .. } => {
            assert_eq!(left, "int");
            assert_eq!(right, "double");
        });
    }

    #[test]
    fn test_unary_operands() {
        let errors = semantic_errors("void main() { int i; bool b; i = -true; b = !5; i = -i; b = !b; }");
        assert_eq!(errors.len(), 2, "{:#?}", errors);
        assert_matches!(&errors[0], SemanticError::IncompatibleOperand { op: "-", operand, .. } if operand == "bool");
        assert_matches!(&errors[1], SemanticError::IncompatibleOperand { op: "!", operand, .. } if operand == "int");
    }

    #[test]
    fn test_logical_and_relational() {
        let errors = semantic_errors("void main() { bool b; b = 1 < 2; b = 1.5 >= 2.5; b = 1 && true; b = \"a\" < \"b\"; }");
        assert_eq!(errors.len(), 2, "{:#?}", errors);
        assert_matches!(&errors[0], SemanticError::IncompatibleOperands { op: "&&", .. });
        assert_matches!(&errors[1], SemanticError::IncompatibleOperands { op: "<", .. });
    }

    #[test]
    fn test_error_type_suppresses_cascades() {
        let error = analyze_single_err("void main() { int x; x = -(y + 1) * 2; }");
        assert_matches!(error, SemanticError::IdentifierNotDeclared { name, expected: LookingFor::Variable, .. } if name == "y");
    }

    #[test]
    fn test_this_outside_class() {
        let error = analyze_single_err("void main() { this; }");
        assert_matches!(error, SemanticError::ThisOutsideClassScope { .. });
    }

    #[test]
    fn test_this_has_class_type() {
        analyze_ok("class A { A self() { return this; } }");
    }

    #[test]
    fn test_this_in_duplicate_class_does_not_cascade() {
        let error = analyze_single_err("class A { int x; } class A { A self() { return this; } }");
        assert_matches!(error, SemanticError::DeclarationConflict { name, .. } if name == "A");
    }

    #[test]
    fn test_array_access_errors() {
        let errors = semantic_errors("void main() { int i; int[] a; i = i[0]; i = a[1.5]; i = a[0]; }");
        assert_eq!(errors.len(), 2, "{:#?}", errors);
        assert_matches!(&errors[0], SemanticError::BracketsOnNonArray { .. });
        assert_matches!(&errors[1], SemanticError::SubscriptNotInteger { .. });
    }

    #[test]
    fn test_array_length() {
        analyze_ok("void main() { int[] a; int n; n = a.length(); }");
    }

    #[test]
    fn test_member_of_array_element() {
        let error = analyze_single_err("void main() { int[] a; int n; n = a[0].length; }");
        assert_matches!(error, SemanticError::FieldNotFoundInBase { field, base, .. } => {
            assert_eq!(field, "length");
            assert_eq!(base, "int");
        });
    }

    #[test]
    fn test_inherited_field_through_this() {
        analyze_ok("class A { int x; } class B extends A { void f() { this.x = 1; x = 2; } }");
    }

    #[test]
    fn test_field_of_same_class_object() {
        analyze_ok("class A { int x; void f(A other) { other.x = this.x; } }");
    }

    #[test]
    fn test_inaccessible_field_from_outside() {
        let error = analyze_single_err("class A { int x; } void main() { A a; int n; n = a.x; }");
        assert_matches!(error, SemanticError::InaccessibleField { field, base, .. } => {
            assert_eq!(field, "x");
            assert_eq!(base, "A");
        });
    }

    #[test]
    fn test_missing_field() {
        let error = analyze_single_err("class A { void m() {} } void main() { A a; a.m = 1; }");
        assert_matches!(error, SemanticError::FieldNotFoundInBase { field, .. } if field == "m");
    }

    #[test]
    fn test_argument_count_reported_once() {
        let error = analyze_single_err("void f(int a, int b) {} void main() { f(true); }");
        assert_matches!(error, SemanticError::ArgumentCountMismatch { function, expected: 2, given: 1, .. } if function == "f");
    }

    #[test]
    fn test_argument_type_mismatch_index() {
        let error = analyze_single_err("void f(int a, int b) {} void main() { f(1, true); }");
        assert_matches!(error, SemanticError::ArgumentTypeMismatch { index: 2, given, expected, .. } => {
            assert_eq!(given, "bool");
            assert_eq!(expected, "int");
        });
    }

    #[test]
    fn test_calling_a_variable() {
        let error = analyze_single_err("int g; void main() { g(); }");
        assert_matches!(error, SemanticError::IdentifierNotDeclared { expected: LookingFor::Function, .. });
    }

    #[test]
    fn test_method_calls() {
        let errors = semantic_errors(
            r#"
            class A { int m(int x) { return x; } }
            void main() { A a; int i; i = a.m(1); a.n(); i.m(1); }
        "#,
        );
        assert_eq!(errors.len(), 2, "{:#?}", errors);
        assert_matches!(&errors[0], SemanticError::FieldNotFoundInBase { field, base, .. } if field == "n" && base == "A");
        assert_matches!(&errors[1], SemanticError::FieldNotFoundInBase { base, .. } if base == "int");
    }

    #[test]
    fn test_new_requires_class() {
        let errors = semantic_errors("interface I {} void main() { New(I); New(Nope); }");
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, SemanticError::IdentifierNotDeclared { expected: LookingFor::Class, .. })));
    }

    #[test]
    fn test_new_array() {
        let errors = semantic_errors("void main() { int[] a; a = NewArray(2.5, int); a = NewArray(3, Nope); }");
        assert_eq!(errors.len(), 2, "{:#?}", errors);
        assert_matches!(&errors[0], SemanticError::ArraySizeNotInteger { .. });
        assert_matches!(&errors[1], SemanticError::IdentifierNotDeclared { expected: LookingFor::Type, .. });
    }

    #[test]
    fn test_builtin_reads() {
        analyze_ok("void main() { int i; string s; i = ReadInteger(); s = ReadLine(); }");
    }

    #[test]
    fn test_expression_types_are_recorded() {
        let program = setup("class A {} void main() { NewArray(3, A[]); }");
        let mut errors = Vec::new();
        let model = analyze(&program, &mut errors);
        assert!(errors.is_empty());

        let Decl::Function(main) = &program.decls[1] else { panic!("expected main") };
        let Stmt::Expr(expr) = &main.body.as_ref().unwrap().stmts[0] else { panic!("expected an expression") };
        assert_eq!(model.type_name(expr), Some("A[][]"));
        assert_matches!(&expr.kind, ExprKind::NewArray { size, .. } => {
            assert_eq!(model.type_name(size), Some("int"));
        });
    }
}

mod statements {
    use super::*;

    #[test]
    fn test_tests_must_be_boolean() {
        let errors = semantic_errors("void main() { int x; if (x) {} while (x) {} for (; 1; ) {} }");
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| matches!(e, SemanticError::TestNotBoolean { .. })));
    }

    #[test]
    fn test_break_placement() {
        let errors = semantic_errors(
            r#"
            void main() {
                bool c;
                break;
                if (c) break;
                while (c) { if (c) break; }
                for (; c; ) break;
            }
        "#,
        );
        assert_eq!(errors.len(), 2, "{:#?}", errors);
        assert!(errors.iter().all(|e| matches!(e, SemanticError::BreakOutsideLoop { .. })));
    }

    #[test]
    fn test_bare_return_in_int_function() {
        let error = analyze_single_err("int f() { return; }");
        assert_matches!(error, SemanticError::ReturnTypeMismatch { given, expected, .. } => {
            assert_eq!(given, "void");
            assert_eq!(expected, "int");
        });
    }

    #[test]
    fn test_return_values() {
        let errors = semantic_errors(
            r#"
            class A {} class B extends A {}
            A f() { return New(B); }
            A g() { return null; }
            void h() { return 1; }
            void k() { return; }
        "#,
        );
        assert_eq!(errors.len(), 1, "{:#?}", errors);
        assert_matches!(&errors[0], SemanticError::ReturnTypeMismatch { given, expected, .. } if given == "int" && expected == "void");
    }

    #[test]
    fn test_print_arguments() {
        let errors = semantic_errors("class A {} void main() { A a; Print(\"x\", 1, true, 2.5, a); }");
        assert_eq!(errors.len(), 2, "{:#?}", errors);
        assert_matches!(&errors[0], SemanticError::PrintArgumentMismatch { index: 4, given, .. } if given == "double");
        assert_matches!(&errors[1], SemanticError::PrintArgumentMismatch { index: 5, given, .. } if given == "A");
    }

    #[test]
    fn test_for_init_and_step_are_checked() {
        let errors = semantic_errors("void main() { int i; for (i = true; i < 3; i = i + 1.0) {} }");
        assert_eq!(errors.len(), 2, "{:#?}", errors);
    }
}

mod sinks {
    use super::*;

    #[test]
    fn test_diagnostic_bag_receives_codes() {
        let src = "void main() { break; this; }";
        let program = setup(src);
        let mut bag = DiagnosticBag::new(src);
        let model = analyze(&program, &mut bag);

        assert_eq!(model.error_count(), 2);
        let codes: Vec<_> = bag.iter().map(|d| d.code().to_string()).collect();
        assert_eq!(codes, vec!["E0215", "E0206"]);
    }

    #[test]
    fn test_conflict_diagnostic_has_secondary_label() {
        let src = "int a; int a;";
        let program = setup(src);
        let mut bag = DiagnosticBag::new(src);
        analyze(&program, &mut bag);

        let diagnostic = bag.iter().next().unwrap();
        assert_eq!(diagnostic.code(), "E0200");
        assert_eq!(diagnostic.labels().len(), 2);
        assert!(diagnostic.message().contains("'a'"));
    }
}
