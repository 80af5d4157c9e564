use decafc::check_source;
use decafc::diagnostics::{DiagnosticBag, codes};

fn codes_for(source: &str) -> Vec<String> {
    let mut diagnostics = DiagnosticBag::new(source);
    let clean = check_source(source, &mut diagnostics);
    assert_eq!(clean, diagnostics.is_empty());
    diagnostics.iter().map(|d| d.code().to_string()).collect()
}

#[test]
fn well_typed_program_has_no_diagnostics() {
    let source = r#"
        interface Shape {
            double area();
            string name();
        }

        class Rect implements Shape {
            double width;
            double height;

            void init(double w, double h) {
                width = w;
                height = h;
            }
            double area() { return width * height; }
            string name() { return "rect"; }
        }

        class Square extends Rect {
            void init(double w, double h) {
                this.width = w;
                this.height = w;
            }
            string name() { return "square"; }
        }

        void report(Shape s) {
            Print(s.name(), " ", s.area() > 10.0);
        }

        void main() {
            Shape[] shapes;
            int i;
            Square sq;

            shapes = NewArray(2, Shape);
            sq = New(Square);
            sq.init(4.0, 4.0);
            shapes[0] = sq;
            shapes[1] = New(Rect);

            for (i = 0; i < shapes.length(); i = i + 1) {
                if (shapes[i] == null) break;
                report(shapes[i]);
            }

            while (true) {
                i = ReadInteger();
                if (i == 0) break;
                Print("got ", i);
            }
        }
    "#;
    assert!(codes_for(source).is_empty(), "{:?}", codes_for(source));
}

#[test]
fn subtype_argument_is_accepted() {
    let source = "class A {} class B extends A {} void f(A a) {} void main() { f(New(B)); }";
    assert!(codes_for(source).is_empty());
}

#[test]
fn assignment_mismatch_is_one_diagnostic() {
    assert_eq!(codes_for("int x; bool y; void main() { x = y; }"), vec!["E0205"]);
}

#[test]
fn bare_return_in_int_function() {
    assert_eq!(codes_for("int f() { return; }"), vec!["E0216"]);
}

#[test]
fn member_of_array_element_does_not_crash() {
    assert_eq!(
        codes_for("void main() { int[] a; int n; n = a[0].length; }"),
        vec!["E0209"]
    );
}

#[test]
fn many_errors_are_all_collected() {
    let source = r#"
        class A { int x; }
        class B extends A { int x; }
        void main() {
            A a;
            int n;
            n = a.x;
            this;
            n = NewArray(1.5, int);
            Print(1.5);
            break;
        }
    "#;
    assert_eq!(
        codes_for(source),
        vec!["E0200", "E0210", "E0206", "E0213", "E0205", "E0217", "E0215"]
    );
}

#[test]
fn syntax_errors_skip_semantic_analysis() {
    let codes = codes_for("void main() { int x x = true; }");
    assert!(!codes.is_empty());
    assert!(codes.iter().all(|code| code == "E0100"));
}

#[test]
fn lexical_errors_skip_semantic_analysis() {
    // `x = true` would be a type error, but the stray `@` stops the pipeline first
    let codes = codes_for("int x; void main() { x = true; @ }");
    assert_eq!(codes, vec!["E0000"]);
}

#[test]
fn every_registered_code_can_be_explained() {
    for code in codes::ALL {
        let found = codes::lookup(&code.code.to_lowercase()).expect("code should be registered");
        assert_eq!(found.code, code.code);
        assert!(!found.explanation.is_empty());
    }
    assert!(codes::lookup("E9999").is_none());
}
