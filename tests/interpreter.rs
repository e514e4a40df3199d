mod common;

#[cfg(test)]
mod interpreter_tests {
    use super::common::{self, Session};
    use lox::Status;
    use pretty_assertions::assert_eq;

    fn output_of(source: &str) -> Vec<String> {
        let outcome = common::run(source);
        assert_eq!(outcome.errors, Vec::<String>::new());
        assert_eq!(outcome.status, Status::Ok);
        outcome.lines().into_iter().map(str::to_owned).collect()
    }

    fn runtime_error(source: &str) -> String {
        let outcome = common::run(source);
        assert_eq!(outcome.status, Status::RuntimeError);
        assert_eq!(outcome.errors.len(), 1);
        outcome.errors[0].clone()
    }

    #[test]
    fn arithmetic_and_number_formatting() {
        assert_eq!(
            output_of("print 1 + 2; print 7 / 2; print -3 * 2; print 0.1 + 0.2; print 1 / 0;"),
            vec!["3", "3.5", "-6", "0.30000000000000004", "inf"]
        );
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(
            output_of("var a = \"foo\"; print a + \"bar\";"),
            vec!["foobar"]
        );
    }

    #[test]
    fn truthiness() {
        assert_eq!(
            output_of(
                "print !nil; print !false; print !0; print !\"\";\n\
                 if (0) print \"zero\"; else print \"never\";"
            ),
            vec!["true", "true", "false", "false", "zero"]
        );
    }

    #[test]
    fn logical_operators_return_operands() {
        assert_eq!(
            output_of(
                "print nil or \"yes\"; print 1 and 2; print false and boom; print \"hi\" or boom;"
            ),
            vec!["yes", "2", "false", "hi"]
        );
    }

    #[test]
    fn equality() {
        assert_eq!(
            output_of(
                "print 1 == 1; print \"a\" == \"a\"; print nil == nil; print 1 == \"1\";\n\
                 print nil == false; print 1 != 2;\n\
                 fun f() {} var g = f; print f == g;"
            ),
            vec!["true", "true", "true", "false", "false", "true", "true"]
        );
    }

    #[test]
    fn stringification() {
        assert_eq!(
            output_of(
                "fun named() {} print named; print fun () {}; print clock;\n\
                 class Point {} print Point; print Point();\n\
                 print true; print nil;"
            ),
            vec![
                "<fn named>",
                "<fn anonymous>",
                "<native fn>",
                "Point",
                "Point instance",
                "true",
                "nil",
            ]
        );
    }

    #[test]
    fn block_scoping_and_shadowing() {
        assert_eq!(
            output_of(
                "var a = \"global\";\n\
                 { var a = \"outer\"; { var a = \"inner\"; print a; } print a; }\n\
                 print a;"
            ),
            vec!["inner", "outer", "global"]
        );
    }

    #[test]
    fn closures_capture_the_resolved_binding() {
        // The function keeps seeing the global `a`, not the later shadow.
        assert_eq!(
            output_of(
                "var a = \"global\";\n\
                 {\n\
                   fun show() { print a; }\n\
                   show();\n\
                   var a = \"block\";\n\
                   show();\n\
                 }"
            ),
            vec!["global", "global"]
        );
    }

    #[test]
    fn counter_closure_keeps_state() {
        assert_eq!(
            output_of(
                "fun makeCounter() {\n\
                   var i = 0;\n\
                   fun count() { i = i + 1; return i; }\n\
                   return count;\n\
                 }\n\
                 var c = makeCounter();\n\
                 print c(); print c();\n\
                 var d = makeCounter();\n\
                 print d();"
            ),
            vec!["1", "2", "1"]
        );
    }

    #[test]
    fn each_loop_iteration_gets_a_fresh_body_scope() {
        assert_eq!(
            output_of(
                "var fs = nil; var gs = nil;\n\
                 for (var i = 0; i < 2; i = i + 1) {\n\
                   var j = i;\n\
                   fun f() { return j; }\n\
                   if (i == 0) fs = f; else gs = f;\n\
                 }\n\
                 print fs(); print gs();"
            ),
            vec!["0", "1"]
        );
    }

    #[test]
    fn recursion_and_early_return() {
        assert_eq!(
            output_of(
                "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }\n\
                 print fib(15);\n\
                 fun first() { while (true) { return \"out\"; } }\n\
                 print first();\n\
                 fun none() { return; }\n\
                 print none();"
            ),
            vec!["610", "out", "nil"]
        );
    }

    #[test]
    fn anonymous_functions_as_arguments() {
        assert_eq!(
            output_of(
                "fun apply(f, x) { return f(x); }\n\
                 print apply(fun (n) { return n * n; }, 9);"
            ),
            vec!["81"]
        );
    }

    #[test]
    fn clock_returns_a_number() {
        assert_eq!(output_of("print clock() > 0;"), vec!["true"]);
    }

    #[test]
    fn arity_mismatch_skips_the_body() {
        let outcome = common::run("fun f(a, b) { print \"body\"; }\nf(1);");

        assert_eq!(outcome.status, Status::RuntimeError);
        assert_eq!(outcome.output, "");
        assert_eq!(outcome.errors, vec!["[line 2] Expected 2 arguments but got 1."]);
    }

    #[test]
    fn runtime_error_messages() {
        assert_eq!(runtime_error("-\"a\";"), "[line 1] Operand must be a number.");
        assert_eq!(runtime_error("1 < \"2\";"), "[line 1] Operands must be numbers.");
        assert_eq!(
            runtime_error("1 + \"2\";"),
            "[line 1] Operands must be two numbers or two strings."
        );
        assert_eq!(
            runtime_error("\"f\"();"),
            "[line 1] Can only call functions and classes."
        );
        assert_eq!(runtime_error("print x;"), "[line 1] Undefined variable 'x'.");
        assert_eq!(runtime_error("y = 1;"), "[line 1] Undefined variable 'y'.");
        assert_eq!(
            runtime_error("var n = 1; n.x;"),
            "[line 1] Only instances have properties."
        );
        assert_eq!(
            runtime_error("var n = 1; n.x = 2;"),
            "[line 1] Only instances have fields."
        );
    }

    #[test]
    fn runtime_error_aborts_the_rest_of_the_run() {
        let outcome = common::run("print \"one\";\nprint nil + 1;\nprint \"three\";");

        assert_eq!(outcome.status, Status::RuntimeError);
        assert_eq!(outcome.lines(), vec!["one"]);
        assert_eq!(
            outcome.errors,
            vec!["[line 2] Operands must be two numbers or two strings."]
        );
    }

    #[test]
    fn runtime_error_inside_call_restores_scope() {
        let mut session = Session::new();

        let first = session.run("var a = \"global\";\nfun bad() { var a = \"local\"; nil(); }\nbad();");
        assert_eq!(first.status, Status::RuntimeError);

        let second = session.run("print a;");
        assert_eq!(second.status, Status::Ok);
        assert_eq!(second.lines(), vec!["global"]);
    }

    #[test]
    fn globals_persist_across_runs() {
        let mut session = Session::new();

        assert_eq!(session.run("var count = 1;").status, Status::Ok);
        assert_eq!(session.run("fun bump() { count = count + 1; }").status, Status::Ok);
        assert_eq!(session.run("bump(); { var local = count; print local; }").status, Status::Ok);

        let outcome = session.run("print count;");
        assert_eq!(outcome.lines(), vec!["2", "2"]);
    }

    #[test]
    fn evaluate_single_expression() {
        let mut session = Session::new();
        session.run("var x = 20;");

        let value = session.lox.evaluate_source("x * 2 + 2").expect("evaluates");
        assert_eq!(value.to_string(), "42");

        assert_eq!(
            session.lox.evaluate_source("-nil").unwrap_err(),
            Status::RuntimeError
        );
    }

    #[test]
    fn evaluate_resolves_function_bodies() {
        let mut session = Session::new();

        let value = session
            .lox
            .evaluate_source("fun (a) { var b = a; return b + 1; }(41)")
            .expect("evaluates");

        assert_eq!(value.to_string(), "42");
        assert_eq!(session.errors(), Vec::<String>::new());
    }

    #[test]
    fn evaluate_reports_static_errors_without_running() {
        let mut session = Session::new();

        assert_eq!(
            session.lox.evaluate_source("this").unwrap_err(),
            Status::StaticError
        );
        assert_eq!(
            session.errors(),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );
    }
}
