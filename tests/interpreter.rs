mod interpreter_tests {
    use glox::interpreter::Interpreter;
    use glox::parser::Parser;
    use glox::resolver::Resolver;
    use glox::scanner::Scanner;
    use glox::stmt::Stmt;
    use glox::token::Token;
    use glox::value::Value;

    /// Run the full pipeline and return the value of the trailing
    /// expression statement, the way the REPL would.
    fn eval(source: &str) -> Option<Value> {
        let scanner = Scanner::new(source.as_bytes().to_vec());

        let tokens: Vec<Token> = scanner
            .map(|item| item.expect("unexpected scan error"))
            .collect();

        let mut parser: Parser = Parser::new(tokens);
        let statements: Vec<Stmt> = parser.parse();

        assert!(
            parser.errors().is_empty(),
            "unexpected parse errors for {:?}: {:?}",
            source,
            parser.errors()
        );

        let mut interpreter: Interpreter = Interpreter::new();
        let mut resolver: Resolver = Resolver::new(&mut interpreter);

        resolver
            .resolve(&statements)
            .unwrap_or_else(|e| panic!("resolution error for {:?}: {}", source, e));

        interpreter
            .interpret(&statements)
            .unwrap_or_else(|e| panic!("runtime error for {:?}: {}", source, e))
    }

    fn eval_repr(source: &str) -> String {
        eval(source)
            .unwrap_or_else(|| panic!("expected a trailing expression value for {:?}", source))
            .repr()
    }

    /// Run the full pipeline expecting a runtime error.
    fn eval_err(source: &str) -> String {
        let scanner = Scanner::new(source.as_bytes().to_vec());

        let tokens: Vec<Token> = scanner
            .map(|item| item.expect("unexpected scan error"))
            .collect();

        let mut parser: Parser = Parser::new(tokens);
        let statements: Vec<Stmt> = parser.parse();

        assert!(
            parser.errors().is_empty(),
            "unexpected parse errors for {:?}: {:?}",
            source,
            parser.errors()
        );

        let mut interpreter: Interpreter = Interpreter::new();
        let mut resolver: Resolver = Resolver::new(&mut interpreter);

        resolver
            .resolve(&statements)
            .unwrap_or_else(|e| panic!("resolution error for {:?}: {}", source, e));

        interpreter
            .interpret(&statements)
            .expect_err("expected a runtime error")
            .to_string()
    }

    #[test]
    fn test_expressions_and_statements() {
        let cases: &[(&str, &str, &str)] = &[
            // whitespace and comments
            ("whitespace", "   \t\r 5", "5"),
            ("comment", "5 // comment", "5"),
            ("comment then newline", "// comment\n5", "5"),
            // literals
            ("nil literal", "nil", "nil"),
            ("true literal", "true", "true"),
            ("false literal", "false", "false"),
            ("number literal", "5", "5"),
            ("decimal literal", "55.4", "55.4"),
            ("string literal", "\"hello world\"", "\"hello world\""),
            ("multiline string literal", "\"hello\nworld\"", "\"hello\nworld\""),
            // array and map literals
            ("array literal", "[5, true]", "[5, true]"),
            ("nested array repr", "[[1], \"x\"]", "[[1], \"x\"]"),
            ("map literal", "{\"foo\": \"bar\"}", "<map>"),
            ("empty map literal", "{}", "<map>"),
            // lambda literals
            ("lambda literal", "() => {}", "<lambda>"),
            ("lambda literal - one param", "a => {}", "<lambda>"),
            ("lambda literal - multiple params", "(a,b) => {}", "<lambda>"),
            // unary
            ("negation", "-5", "-5"),
            ("not", "!true", "false"),
            // binary arithmetic
            ("addition", "4+5", "9"),
            ("subtraction", "4-5", "-1"),
            ("multiplication", "4*5", "20"),
            ("division", "5/2", "2.5"),
            ("long decimal division", "5/3", "1.6666666666666667"),
            // precedence
            ("unary binds tighter than sum", "2+-3", "-1"),
            ("factor binds tighter than sum", "2+3*4", "14"),
            ("grouping", "(2+3)*4", "20"),
            // comparison
            ("greater", "5>5", "false"),
            ("greater equal", "5>=5", "true"),
            ("less", "5<5", "false"),
            ("less equal", "5<=5", "true"),
            ("equal", "true==true", "true"),
            ("not equal", "true!=true", "false"),
            // strings
            ("string equal", "\"hello\" == \"hello\"", "true"),
            ("string not equal to other", "\"hello\" == \"world\"", "false"),
            ("string concatenation", "\"hello \" + \"world\"", "\"hello world\""),
            ("string concatenation with number", "5 + \"=x\"", "\"5=x\""),
            ("string concatenation with boolean", "\"x: \" + true", "\"x: true\""),
            // arrays
            ("array concatenation", "[5] + [true]", "[5, true]"),
            // logical
            ("and returns right if left truthy", "true and 5.0", "5"),
            ("and returns left if left falsy", "nil and true", "nil"),
            ("or returns right if left falsy", "false or 5.0", "5"),
            ("or returns left if left truthy", "5.0 or false", "5"),
            // short-circuit: the undefined call is never evaluated
            ("and short-circuits", "false and missing()", "false"),
            ("or short-circuits", "true or missing()", "true"),
            // ternary
            ("ternary true", "5 > 4 ? true : false", "true"),
            ("ternary false", "5 < 4 ? true : false", "false"),
            ("ternary right associative", "true ? 1 : false ? 2 : 3", "1"),
            // variables
            ("variable read", "var x = 5; x", "5"),
            ("variable assignment", "var x = 5; x = x + 1", "6"),
            // sequence
            ("sequence", "var x = 5; (x = x + 1, x = x + 1)", "7"),
            ("empty sequence equals nothing", "5 == ()", "false"),
            // indexing
            ("array index get", "var x = [1, 2, 3]; x[1]", "2"),
            ("array slice", "var x = [1, 2, 3]; x[1:3]", "[2, 3]"),
            ("array slice at exact length", "var x = [1, 2, 3]; x[3:3]", "[]"),
            ("array index assign", "var x = [1, 2, 3]; x[1] = 5; x[1]", "5"),
            ("map index get", "var x = {\"foo\": \"bar\"}; x[\"foo\"]", "\"bar\""),
            ("map missing key reads nil", "var x = {\"foo\": \"bar\"}; x[\"nope\"]", "nil"),
            ("map index assign", "var x = {\"foo\": \"bar\"}; x[\"foo\"] = \"baz\"; x[\"foo\"]", "\"baz\""),
            ("string index get", "var x = \"hello\"; x[1]", "\"e\""),
            ("string slice", "var x = \"hello\"; x[1:5]", "\"ello\""),
            // conditionals
            ("if true", "var x = 5; if (x < 6) x = x+1; x", "6"),
            ("if false", "var x = 6; if (x < 6) x = x+1; x", "6"),
            ("if else true", "var x = 5; if (x < 6) x = x+1\nelse x = x-1; x", "6"),
            ("if else false", "var x = 6; if (x < 6) x = x+1\nelse x = x-1; x", "5"),
            // block scoping
            ("block writes to outer scope", "var x = 5; {x = 6}\n x", "6"),
            ("block shadows", "var x = 5; {var x = 6}\n x", "5"),
            // loops
            ("while", "var x = 0; while (x < 5) x = x + 1; x", "5"),
            ("for", "var x = 0; for (var y = 0; y < 5; y = y+1) x = y; x", "4"),
            (
                "for with expression initializer",
                "var x = 0; var y = 0; for (y = 0; y < 5; y = y+1) x = y; x",
                "4",
            ),
            ("for without clauses", "var x = 0; for (;;) break; x", "0"),
            (
                "foreach",
                "var x = 0; var arr = [0,1,2,3,4]; for (var el of arr) x = el; x",
                "4",
            ),
            (
                "foreach over empty array",
                "var x = -1; var arr = []; for (var el of arr) x = el; x",
                "-1",
            ),
            (
                "break",
                "var x = 0; while (x < 5) {\n x = x + 1\n if (x == 3) break\n}\nx",
                "3",
            ),
            (
                "continue",
                "var x = 0; for (var y = 0; y < 5; y = y+1) {\n if (y == 3) continue\n x = x + 1\n}\nx",
                "4",
            ),
            // functions
            ("function declaration", "fun x() {}\n x", "<fn x>"),
            ("lambda declaration", "var x = () => {}; x", "<lambda>"),
            ("function call", "fun x() {}\n x()", "nil"),
            ("lambda call", "var x = () => {}; x()", "nil"),
            ("return", "fun x(a,b) { return a+b }\n x(3,5)", "8"),
            ("lambda implicit return", "var x = (a,b) => a+b; x(3,5)", "8"),
            ("lambda block return", "var x = (a) => { return a * 2 }; x(3)", "6"),
            (
                "recursion",
                "fun fib(n) { if (n < 2) { return n } return fib(n-1) + fib(n-2) }\nfib(10)",
                "55",
            ),
            // natives
            ("clock", "clock() > 0", "true"),
            ("print returns nil", "print(5)", "nil"),
            ("len of array", "len([1,2,3])", "3"),
            ("len of string", "len(\"hello\")", "5"),
            ("size of map", "size({\"foo\": \"bar\"})", "1"),
            ("hasKey present", "hasKey({\"foo\": \"bar\"}, \"foo\")", "true"),
            ("hasKey absent", "hasKey({\"foo\": \"bar\"}, \"bar\")", "false"),
            ("keys", "keys({\"foo\": \"bar\"})", "[\"foo\"]"),
            ("values", "values({\"foo\": \"bar\"})", "[\"bar\"]"),
            ("map native", "map([1,2,3], el => el*2)", "[2, 4, 6]"),
            ("filter native", "filter([1,2,3], el => el<3)", "[1, 2]"),
            ("reduce native", "reduce(1, [1,2,3], (acc,el) => acc*el)", "6"),
            ("string of nil", "string(nil)", "\"nil\""),
            ("string of number", "string(5.5)", "\"5.5\""),
            ("string of array", "string([\"hello\", \"world\"])", "\"[\\\"hello\\\", \\\"world\\\"]\""),
            ("string of map", "string({})", "\"<map>\""),
            ("string of lambda", "string(() => {})", "\"<lambda>\""),
            ("string of named function", "fun a() {}\n string(a)", "\"<fn a>\""),
            ("string of builtin", "string(clock)", "\"<native fn clock>\""),
            ("string is identity on strings", "string(\"hi\")", "\"hi\""),
            // truthiness boundaries
            ("zero is truthy", "!0", "false"),
            ("empty string is truthy", "!\"\"", "false"),
            ("empty array is truthy", "![]", "false"),
            ("nil is falsy", "!nil", "true"),
            // IEEE-754 division
            ("division by zero is infinite", "1/0 > 0", "true"),
            ("nan is not equal to itself", "0/0 == 0/0", "false"),
        ];

        for (name, source, expected) in cases {
            assert_eq!(&eval_repr(source), expected, "case: {}", name);
        }
    }

    #[test]
    fn test_closures() {
        // Curried adder.
        assert_eq!(eval_repr("var adder = a => b => a + b; adder(5)(6)"), "11");

        // A returned closure keeps its captured variable alive and observes
        // reassignment.
        assert_eq!(
            eval_repr(
                "fun counter() { var n = 0; return () => (n = n + 1, n) }\nvar c = counter(); c(); c()"
            ),
            "2"
        );

        // Two closures from separate calls do not share state.
        assert_eq!(
            eval_repr(
                "fun counter() { var n = 0; return () => (n = n + 1, n) }\nvar a = counter(); var b = counter(); a(); a(); b()"
            ),
            "1"
        );

        // Reassigning after capture is observed by the closure.
        assert_eq!(
            eval_repr("var x = 1; var f = () => x; x = 2; f()"),
            "2"
        );
    }

    #[test]
    fn test_reference_semantics() {
        // Arrays compare by identity, not contents.
        assert_eq!(eval_repr("var a = [1]; var b = [1]; a == b"), "false");
        assert_eq!(eval_repr("var a = [1]; var b = a; a == b"), "true");

        // Mutation through one alias is visible through the other.
        assert_eq!(eval_repr("var a = [1, 2]; var b = a; b[0] = 9; a[0]"), "9");
        assert_eq!(
            eval_repr("var m = {\"k\": 1}; var n = m; n[\"k\"] = 2; m[\"k\"]"),
            "2"
        );

        // Concatenation produces a fresh array.
        assert_eq!(eval_repr("var a = [1]; var b = a + []; a == b"), "false");
    }

    #[test]
    fn test_loop_control_flow() {
        // Break leaves the loop with the induction variable intact.
        assert_eq!(
            eval_repr("var i = 0; for (;; i = i + 1) { if (i == 7) break }\ni"),
            "7"
        );

        // Continue still runs the increment.
        assert_eq!(
            eval_repr(
                "var hits = 0; for (var i = 0; i < 5; i = i + 1) {\n if (i == 2) continue\n hits = hits + 1\n}\nhits"
            ),
            "4"
        );

        // Break only exits the innermost loop.
        assert_eq!(
            eval_repr(
                "var total = 0; for (var i = 0; i < 3; i = i + 1) {\n for (var j = 0; j < 10; j = j + 1) { if (j == 1) break }\n total = total + 1\n}\ntotal"
            ),
            "3"
        );

        // Return unwinds through a loop to the call frame.
        assert_eq!(eval_repr("fun f() { for (;;) { return 7 } }\nf()"), "7");

        // Break and continue work inside foreach.
        assert_eq!(
            eval_repr(
                "var sum = 0; for (var el of [1, 2, 3, 4]) {\n if (el == 2) continue\n if (el == 4) break\n sum = sum + el\n}\nsum"
            ),
            "4"
        );
    }

    #[test]
    fn test_classes() {
        // Construction without an initializer.
        assert_eq!(eval_repr("class E { }\nE()"), "<object E>");
        assert_eq!(eval_repr("class E { }\nE"), "<class E>");

        // Fields are set dynamically.
        assert_eq!(
            eval_repr("class P { }\nvar p = P(); p.x = 5; p.x"),
            "5"
        );

        // Initializer runs on construction.
        assert_eq!(
            eval_repr("class P { init(x) { this.x = x } }\nP(9).x"),
            "9"
        );

        // Bare return inside init yields the instance.
        assert_eq!(
            eval_repr("class P { init() { this.x = 1\n return } }\nP().x"),
            "1"
        );

        // Methods bind `this`.
        assert_eq!(
            eval_repr("class C { init(n) { this.n = n } get_n() { return this.n } }\nC(3).get_n()"),
            "3"
        );

        // A detached method stays bound to its instance.
        assert_eq!(
            eval_repr("class C { me() { return this } }\nvar x = C(); var f = x.me; f() == x"),
            "true"
        );

        // Fields take precedence over methods on reads.
        assert_eq!(
            eval_repr("class C { m() { return 1 } }\nvar c = C(); c.m = 99; c.m"),
            "99"
        );
    }

    #[test]
    fn test_inheritance_and_super() {
        assert_eq!(
            eval_repr(
                "class A { foo() { return \"bar\" } } class B < A { foo() { return \"foo\" + super.foo() } } B().foo()"
            ),
            "\"foobar\""
        );

        // Methods are inherited through the chain.
        assert_eq!(
            eval_repr("class A { m() { return 1 } } class B < A { } B().m()"),
            "1"
        );

        // Super lookup starts above the method's own class, not at the
        // instance's class.
        assert_eq!(
            eval_repr(
                "class A { m() { return \"A\" } } class B < A { m() { return super.m() + \"B\" } } class C < B { } C().m()"
            ),
            "\"AB\""
        );
    }

    #[test]
    fn test_method_kinds() {
        // Getters are invoked on property access.
        assert_eq!(
            eval_repr(
                "class Circle { init(r) { this.r = r } get diameter() { return this.r * 2 } }\nCircle(4).diameter"
            ),
            "8"
        );

        // Setters are invoked on property assignment.
        assert_eq!(
            eval_repr(
                "class Circle { init(r) { this.r = r } set diameter(d) { this.r = d / 2 } }\nvar c = Circle(1); c.diameter = 10; c.r"
            ),
            "5"
        );

        // Static methods are called on the class itself.
        assert_eq!(
            eval_repr("class M { static twice(x) { return x * 2 } }\nM.twice(4)"),
            "8"
        );

        // Getter on a superclass, reached through super binding.
        assert_eq!(
            eval_repr(
                "class A { get v() { return 2 } } class B < A { m() { return super.v } } B().m()"
            ),
            "2"
        );

        // Assigning through super invokes the superclass setter on the
        // current instance.
        assert_eq!(
            eval_repr(
                "class A { set v(x) { this.under = x } } class B < A { m() { super.v = 9\n return this.under } } B().m()"
            ),
            "9"
        );
    }

    #[test]
    fn test_map_contract() {
        // hasKey agrees with keys() and indexing.
        assert_eq!(
            eval_repr("var x = {\"a\": 1, \"b\": 2}; hasKey(x, \"a\") and !hasKey(x, \"c\")"),
            "true"
        );

        assert_eq!(
            eval_repr("var x = {\"a\": 1, \"b\": 2}; size(x)"),
            "2"
        );

        // Duplicate keys overwrite.
        assert_eq!(
            eval_repr("var x = {\"a\": 1, \"a\": 2}; x[\"a\"]"),
            "2"
        );
        assert_eq!(
            eval_repr("var x = {\"a\": 1, \"a\": 2}; size(x)"),
            "1"
        );

        // len(keys(m)) matches size(m).
        assert_eq!(
            eval_repr("var x = {\"a\": 1, \"b\": 2}; len(keys(x)) == size(x)"),
            "true"
        );
    }

    #[test]
    fn test_runtime_errors() {
        let cases: &[(&str, &str, &str)] = &[
            ("undefined variable", "y", "Undefined variable 'y'"),
            (
                "undefined assignment target",
                "y = 1",
                "Undefined variable 'y'",
            ),
            ("unary minus on string", "-\"x\"", "Operand must be a number."),
            ("comparison on strings", "\"a\" < \"b\"", "Operands must be numbers."),
            (
                "string plus nil",
                "\"a\" + nil",
                "Invalid operands \"a\" and nil for '+'",
            ),
            (
                "arity mismatch",
                "fun f(a) { }\nf(1, 2)",
                "Expected 1 arguments but got 2",
            ),
            ("calling a number", "5()", "Can only call functions and classes."),
            (
                "string index assignment",
                "\"hello\"[0] = \"H\"",
                "Can only assign to array or map elements",
            ),
            ("array index out of range", "[1, 2][2]", "Index out of range"),
            ("array negative index", "[1, 2][0 - 1]", "Index out of range"),
            ("array fractional index", "[1, 2][0.5]", "Index out of range"),
            ("slice out of range", "[1, 2][0:3]", "Invalid slice range"),
            ("slice reversed bounds", "[1, 2][1:0]", "Invalid slice range"),
            ("map slice", "{\"a\": 1}[0:1]", "Cannot slice a map"),
            ("map non-string key", "{\"a\": 1}[5]", "Map keys must be strings"),
            (
                "non-string map index",
                "var k = 5; var m = {\"a\": 1}; m[k]",
                "Map keys must be strings",
            ),
            (
                "non-string map literal key",
                "var m = {5: 1}; m",
                "Map keys must be strings",
            ),
            ("indexing a number", "5[0]", "Can only index arrays, maps and strings"),
            (
                "foreach over non-array",
                "for (var x of 5) print(x)",
                "Can only iterate over arrays",
            ),
            (
                "undefined property",
                "class C { }\nC().nope",
                "Undefined property 'nope'.",
            ),
            (
                "non-static method on class",
                "class C { m() { return 1 } }\nC.m",
                "Cannot call non-static method 'm' directly on class.",
            ),
            (
                "property on a number",
                "5.0.x",
                "Only instances have properties.",
            ),
            (
                "len of number",
                "len(5)",
                "can only call len on arrays or strings",
            ),
            ("size of array", "size([1])", "can only call size on maps"),
            (
                "map over non-array",
                "map(5, x => x)",
                "first argument of map must be an array",
            ),
            (
                "map with wrong arity callable",
                "map([1], (a, b) => a)",
                "second argument of map must be an function taking a single parameter",
            ),
            // filter reuses the map error strings verbatim.
            (
                "filter over non-array",
                "filter(5, x => x)",
                "first argument of map must be an array",
            ),
            (
                "filter with wrong arity callable",
                "filter([1], (a, b) => a)",
                "second argument of map must be an function taking a single parameter",
            ),
            (
                "reduce over non-array",
                "reduce(0, 5, (a, b) => a)",
                "second argument of reduce must be an array",
            ),
            (
                "reduce with wrong arity callable",
                "reduce(0, [1], a => a)",
                "third argument of reduce must be an function taking two parameters - the accumulator and the current element",
            ),
            (
                "superclass must be a class",
                "var A = 5; class B < A { }",
                "Superclass must be a class.",
            ),
        ];

        for (name, source, expected) in cases {
            let err = eval_err(source);

            assert!(
                err.contains(expected),
                "case {}: expected {:?} in {:?}",
                name,
                expected,
                err
            );
        }
    }

    #[test]
    fn test_runtime_errors_carry_line_numbers() {
        let err = eval_err("var x = 1\nvar y = 2\nz");

        assert!(err.contains("[line 3]"), "{}", err);
    }
}
