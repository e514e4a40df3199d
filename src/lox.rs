//! A Lox session: one interpreter, one error sink, many runs.
//!
//! [`Lox::run`] is the core entry point: it resolves a parsed program and, if
//! no static error was found, interprets it.  [`Lox::run_source`] adds the
//! scanner and parser in front for hosts that hold raw text (file runner,
//! REPL).  All diagnostics go through the [`ErrorReporter`] the session was
//! built with.

use log::{debug, info};

use crate::ast::Stmt;
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::value::Value;

/// Host callback receiving every diagnostic.  `message` already carries the
/// error kind and location (`Error at 'x': ...`) but not the line.
pub trait ErrorReporter {
    fn report(&mut self, line: usize, message: &str);
}

impl<F: FnMut(usize, &str)> ErrorReporter for F {
    fn report(&mut self, line: usize, message: &str) {
        self(line, message)
    }
}

/// Writes `[line N] message` to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrReporter;

impl ErrorReporter for StderrReporter {
    fn report(&mut self, line: usize, message: &str) {
        eprintln!("[line {}] {}", line, message);
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    /// Lexical, syntax or resolution errors; nothing was executed.
    StaticError,
    /// Execution started and was aborted by a runtime error.
    RuntimeError,
}

impl Status {
    /// Conventional `sysexits`‑style process exit code.
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::StaticError => 65,
            Status::RuntimeError => 70,
        }
    }
}

pub struct Lox {
    interpreter: Interpreter,
    reporter: Box<dyn ErrorReporter>,
    next_expr_id: usize,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new(Interpreter::new(), Box::new(StderrReporter))
    }
}

impl Lox {
    pub fn new(interpreter: Interpreter, reporter: Box<dyn ErrorReporter>) -> Self {
        info!("Lox session created");

        Self {
            interpreter,
            reporter,
            next_expr_id: 0,
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Resolve then interpret an already parsed program.
    pub fn run(&mut self, statements: &[Stmt]) -> Status {
        let resolved = Resolver::new(&mut self.interpreter).resolve(statements);

        if let Err(errors) = resolved {
            self.report_all(&errors);
            return Status::StaticError;
        }

        match self.interpreter.interpret(statements) {
            Ok(()) => Status::Ok,
            Err(e) => {
                debug!("Runtime error: {}", e);
                self.report(&e);
                Status::RuntimeError
            }
        }
    }

    /// Scan, parse and run `source`.  Globals persist across calls.
    pub fn run_source(&mut self, source: &str) -> Status {
        match self.parse_program(source) {
            Some(statements) => self.run(&statements),
            None => Status::StaticError,
        }
    }

    /// Scan and parse `source`, reporting every lexical and syntax error.
    pub fn parse_program(&mut self, source: &str) -> Option<Vec<Stmt>> {
        let (tokens, lex_errors) = Scanner::new(source).scan_tokens();

        let mut parser = Parser::with_first_id(&tokens, self.next_expr_id);
        let parsed = parser.parse();
        self.next_expr_id = parser.next_id();

        self.report_all(&lex_errors);

        match parsed {
            Ok(statements) if lex_errors.is_empty() => Some(statements),
            Ok(_) => None,
            Err(errors) => {
                self.report_all(&errors);
                None
            }
        }
    }

    /// Evaluate a single expression, e.g. `1 + 2`, against the session's
    /// globals.
    pub fn evaluate_source(&mut self, source: &str) -> Result<Value, Status> {
        let (tokens, lex_errors) = Scanner::new(source).scan_tokens();

        let mut parser = Parser::with_first_id(&tokens, self.next_expr_id);
        let parsed = parser.parse_expression();
        self.next_expr_id = parser.next_id();

        self.report_all(&lex_errors);

        let expr = match parsed {
            Ok(expr) if lex_errors.is_empty() => expr,
            Ok(_) => return Err(Status::StaticError),
            Err(errors) => {
                self.report_all(&errors);
                return Err(Status::StaticError);
            }
        };

        let resolved = Resolver::new(&mut self.interpreter).resolve_expression(&expr);

        if let Err(errors) = resolved {
            self.report_all(&errors);
            return Err(Status::StaticError);
        }

        self.interpreter.evaluate(&expr).map_err(|e| {
            self.report(&e);
            Status::RuntimeError
        })
    }

    fn report(&mut self, error: &LoxError) {
        self.reporter.report(error.line(), &error.message());
    }

    fn report_all(&mut self, errors: &[LoxError]) {
        for error in errors {
            self.report(error);
        }
    }
}
