mod common;

#[cfg(test)]
mod resolver_tests {
    use super::common;
    use lox::ast::ExprId;
    use lox::error::LoxError;
    use lox::interpreter::Interpreter;
    use lox::resolver::Resolver;
    use lox::Status;
    use pretty_assertions::assert_eq;
    use std::io;

    fn quiet_interpreter() -> Interpreter {
        Interpreter::with_output(Box::new(io::sink()))
    }

    fn static_errors(source: &str) -> Vec<String> {
        let statements = common::parse(source);
        let mut interpreter = quiet_interpreter();

        match Resolver::new(&mut interpreter).resolve(&statements) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(LoxError::to_string).collect(),
        }
    }

    #[test]
    fn local_read_in_own_initializer() {
        assert_eq!(
            static_errors("{ var a = 1; { var a = a; } }"),
            vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn global_self_initializer_is_a_runtime_error() {
        assert!(static_errors("var a = a;").is_empty());

        let outcome = common::run("var a = a;");
        assert_eq!(outcome.status, Status::RuntimeError);
        assert_eq!(outcome.errors, vec!["[line 1] Undefined variable 'a'."]);
    }

    #[test]
    fn duplicate_locals() {
        assert_eq!(
            static_errors("{ var a; var a; }\nfun f(x, x) {}"),
            vec![
                "[line 1] Error at 'a': Already a variable with this name in this scope.",
                "[line 2] Error at 'x': Already a variable with this name in this scope.",
            ]
        );
        assert!(static_errors("var a = 1; var a = 2;").is_empty());
    }

    #[test]
    fn return_placement() {
        assert_eq!(
            static_errors("return 1;"),
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );
        assert_eq!(
            static_errors("class A { init() { return 1; } }"),
            vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
        );
        assert!(static_errors("class A { init() { return; } }").is_empty());
        assert!(static_errors("fun f() { return 1; }").is_empty());
    }

    #[test]
    fn this_and_super_placement() {
        assert_eq!(
            static_errors("print this;\nfun f() { return this; }"),
            vec![
                "[line 1] Error at 'this': Can't use 'this' outside of a class.",
                "[line 2] Error at 'this': Can't use 'this' outside of a class.",
            ]
        );
        assert_eq!(
            static_errors("super.m();"),
            vec!["[line 1] Error at 'super': Can't use 'super' outside of a class."]
        );
        assert_eq!(
            static_errors("class A { m() { super.m(); } }"),
            vec!["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
        );
    }

    #[test]
    fn class_inheriting_from_itself() {
        assert_eq!(
            static_errors("class A < A {}"),
            vec!["[line 1] Error at 'A': A class can't inherit from itself."]
        );
    }

    #[test]
    fn property_assignment_resolves_object_before_value() {
        assert_eq!(
            static_errors("this.field = super.method;"),
            vec![
                "[line 1] Error at 'this': Can't use 'this' outside of a class.",
                "[line 1] Error at 'super': Can't use 'super' outside of a class.",
            ]
        );
    }

    #[test]
    fn all_errors_reported_in_one_pass() {
        let errors = static_errors("return;\n{ var b = b; }\nprint this;");
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn static_errors_prevent_execution() {
        let outcome = common::run("print \"before\";\nreturn;");

        assert_eq!(outcome.status, Status::StaticError);
        assert_eq!(outcome.output, "");
        assert_eq!(
            outcome.errors,
            vec!["[line 2] Error at 'return': Can't return from top-level code."]
        );
    }

    #[test]
    fn hop_counts_through_nested_blocks() {
        // `a` is read from three blocks in; ids: the read below is ExprId(0).
        let statements = common::parse("{ var a = 1; { { print a; } } }");
        let mut interpreter = quiet_interpreter();
        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .expect("resolves");

        assert_eq!(interpreter.resolved_depth(ExprId(0)), Some(2));
    }

    #[test]
    fn shadowed_names_resolve_to_the_nearest_declaration() {
        // ids: innermost read 0, assignment target parsed as 1 then rebuilt
        // as the assign node 2, middle read 3, outer read 4.
        let statements = common::parse(
            "{ var a = 1;\n\
               { var a = 2;\n\
                 { var a = 3; print a; a = 4; }\n\
                 print a;\n\
               }\n\
               print a;\n\
             }",
        );
        let mut interpreter = quiet_interpreter();
        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .expect("resolves");

        assert_eq!(interpreter.resolved_depth(ExprId(0)), Some(0));
        assert_eq!(interpreter.resolved_depth(ExprId(1)), None);
        assert_eq!(interpreter.resolved_depth(ExprId(2)), Some(0));
        assert_eq!(interpreter.resolved_depth(ExprId(3)), Some(0));
        assert_eq!(interpreter.resolved_depth(ExprId(4)), Some(0));
        assert_eq!(interpreter.locals().len(), 4);
    }

    #[test]
    fn reads_skip_unrelated_shadowing_scopes() {
        // `b` is read from under a block that re-declares `a`: ids b → 0, a → 1.
        let statements = common::parse(
            "{ var a = 1; { var b = 2; { var a = 3; print b; print a; } } }",
        );
        let mut interpreter = quiet_interpreter();
        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .expect("resolves");

        assert_eq!(interpreter.resolved_depth(ExprId(0)), Some(1));
        assert_eq!(interpreter.resolved_depth(ExprId(1)), Some(0));
    }

    #[test]
    fn closures_resolve_to_the_defining_function() {
        // ids: x → 0, inner → 1
        let statements = common::parse(
            "fun outer() { var x = 1; fun inner() { return x; } return inner; }",
        );
        let mut interpreter = quiet_interpreter();
        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .expect("resolves");

        assert_eq!(interpreter.resolved_depth(ExprId(0)), Some(1));
        assert_eq!(interpreter.resolved_depth(ExprId(1)), Some(0));
    }

    #[test]
    fn globals_are_left_unresolved() {
        let statements = common::parse("var g = 1; { print g; }");
        let mut interpreter = quiet_interpreter();
        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .expect("resolves");

        assert_eq!(interpreter.resolved_depth(ExprId(0)), None);
        assert!(interpreter.locals().is_empty());
    }

    #[test]
    fn resolution_is_deterministic() {
        let statements = common::parse(
            "class A { m() { return this; } }\n\
             class B < A { m() { var f = fun () { return super.m(); }; return f(); } }\n\
             { var x = 1; { var y = x; x = y; } }",
        );

        let mut first = quiet_interpreter();
        let mut second = quiet_interpreter();
        Resolver::new(&mut first).resolve(&statements).expect("resolves");
        Resolver::new(&mut second).resolve(&statements).expect("resolves");

        assert!(!first.locals().is_empty());
        assert_eq!(first.locals(), second.locals());
    }

    #[test]
    fn ids_continue_across_session_chunks() {
        let mut session = common::Session::new();

        assert_eq!(session.run("{ var a = 1; print a; }").status, Status::Ok);
        assert_eq!(session.run("{ var b = 2; { print b; } }").status, Status::Ok);

        let locals = session.lox.interpreter().locals();
        assert_eq!(locals.get(&ExprId(0)), Some(&0));
        assert_eq!(locals.get(&ExprId(1)), Some(&1));
        assert_eq!(locals.len(), 2);
    }
}
