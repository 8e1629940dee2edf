mod resolver_tests {
    use glox::interpreter::Interpreter;
    use glox::parser::Parser;
    use glox::resolver::Resolver;
    use glox::scanner::Scanner;
    use glox::stmt::Stmt;
    use glox::token::Token;

    fn parse(source: &str) -> Vec<Stmt> {
        let scanner = Scanner::new(source.as_bytes().to_vec());

        let tokens: Vec<Token> = scanner
            .map(|item| item.expect("unexpected scan error"))
            .collect();

        let mut parser: Parser = Parser::new(tokens);
        let statements: Vec<Stmt> = parser.parse();

        assert!(
            parser.errors().is_empty(),
            "unexpected parse errors: {:?}",
            parser.errors()
        );

        statements
    }

    fn resolve_ok(source: &str) {
        let statements = parse(source);

        let mut interpreter: Interpreter = Interpreter::new();
        let mut resolver: Resolver = Resolver::new(&mut interpreter);

        resolver
            .resolve(&statements)
            .unwrap_or_else(|e| panic!("unexpected resolution error: {}", e));
    }

    fn resolve_err(source: &str) -> String {
        let statements = parse(source);

        let mut interpreter: Interpreter = Interpreter::new();
        let mut resolver: Resolver = Resolver::new(&mut interpreter);

        resolver
            .resolve(&statements)
            .expect_err("expected a resolution error")
            .to_string()
    }

    #[test]
    fn test_return_outside_function() {
        let err = resolve_err("return 5");

        assert!(err.contains("Can't return from top level code"), "{}", err);
    }

    #[test]
    fn test_return_inside_function_is_fine() {
        resolve_ok("fun f() { return 5 }");
    }

    #[test]
    fn test_break_and_continue_outside_loop() {
        let err = resolve_err("break");
        assert!(err.contains("Can't break when not in loop"), "{}", err);

        let err = resolve_err("continue");
        assert!(err.contains("Can't continue when not in loop"), "{}", err);
    }

    #[test]
    fn test_break_and_continue_inside_loops_are_fine() {
        resolve_ok("while (true) break");
        resolve_ok("for (;;) continue");
        resolve_ok("for (var x of arr) { if (x) break }");
    }

    #[test]
    fn test_break_after_inner_loop_still_resolves() {
        resolve_ok("while (true) { while (true) break\n break }");
    }

    #[test]
    fn test_break_does_not_cross_function_boundary() {
        let err = resolve_err("while (true) { var f = () => { break } }");

        assert!(err.contains("Can't break when not in loop"), "{}", err);
    }

    #[test]
    fn test_self_read_in_initializer() {
        let err = resolve_err("{ var a = 1\n { var a = a } }");

        assert!(
            err.contains("Can't read local variable in its own initializer"),
            "{}",
            err
        );
    }

    #[test]
    fn test_duplicate_declaration_in_scope() {
        let err = resolve_err("{ var a = 1\n var a = 2 }");

        assert!(
            err.contains("Already a variable with this name in scope"),
            "{}",
            err
        );
    }

    #[test]
    fn test_shadowing_in_nested_scope_is_fine() {
        resolve_ok("{ var a = 1\n { var a = 2 } }");
    }

    #[test]
    fn test_this_outside_class() {
        let err = resolve_err("this");
        assert!(err.contains("Can't use 'this' outside of a class."), "{}", err);

        let err = resolve_err("fun f() { return this }");
        assert!(err.contains("Can't use 'this' outside of a class."), "{}", err);
    }

    #[test]
    fn test_super_outside_class() {
        let err = resolve_err("super.foo");

        assert!(
            err.contains("Can't use 'super' outside of a class."),
            "{}",
            err
        );
    }

    #[test]
    fn test_super_in_class_without_superclass() {
        let err = resolve_err("class A { m() { return super.m() } }");

        assert!(
            err.contains("Can't use 'super' in a class with no superclass."),
            "{}",
            err
        );
    }

    #[test]
    fn test_super_in_subclass_is_fine() {
        resolve_ok("class A { m() { return 1 } } class B < A { m() { return super.m() } }");
    }

    #[test]
    fn test_class_cannot_inherit_from_itself() {
        let err = resolve_err("class A < A { }");

        assert!(err.contains("A class can't inherit from itself."), "{}", err);
    }

    #[test]
    fn test_return_value_from_initializer() {
        let err = resolve_err("class A { init() { return 5 } }");

        assert!(
            err.contains("Can't return a value from an initializer"),
            "{}",
            err
        );
    }

    #[test]
    fn test_bare_return_from_initializer_is_fine() {
        resolve_ok("class A { init() { return } }");
    }

    #[test]
    fn test_return_value_from_setter() {
        let err = resolve_err("class A { set x(v) { return v } }");

        assert!(err.contains("Can't return a value from a setter"), "{}", err);
    }

    #[test]
    fn test_init_must_be_a_normal_method() {
        let err = resolve_err("class A { static init() { } }");
        assert!(
            err.contains("init method cannot be static, getter or setter"),
            "{}",
            err
        );

        let err = resolve_err("class A { get init() { } }");
        assert!(
            err.contains("init method cannot be static, getter or setter"),
            "{}",
            err
        );
    }

    #[test]
    fn test_getter_may_return_a_value() {
        resolve_ok("class A { get x() { return 5 } }");
    }
}
