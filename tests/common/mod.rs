//! Shared harness: run Lox source, capture what it prints and reports.
#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::scanner::Scanner;
use lox::ast::Stmt;
use lox::{Lox, Status};

/// `Write` sink whose bytes stay readable after the interpreter owns it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct Outcome {
    pub status: Status,
    pub output: String,
    pub errors: Vec<String>,
}

impl Outcome {
    /// Printed lines, without the trailing newline.
    pub fn lines(&self) -> Vec<&str> {
        self.output.lines().collect()
    }
}

/// A session wired to in-memory output and error capture.
pub struct Session {
    pub lox: Lox,
    output: SharedBuffer,
    errors: Rc<RefCell<Vec<String>>>,
}

impl Session {
    pub fn new() -> Self {
        let output = SharedBuffer::default();
        let errors = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&errors);
        let reporter = move |line: usize, message: &str| {
            sink.borrow_mut().push(format!("[line {}] {}", line, message));
        };

        let interpreter = Interpreter::with_output(Box::new(output.clone()));
        let lox = Lox::new(interpreter, Box::new(reporter));

        Self {
            lox,
            output,
            errors,
        }
    }

    /// Everything reported so far.
    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }

    /// Run one chunk; output and errors accumulate across chunks.
    pub fn run(&mut self, source: &str) -> Outcome {
        let status = self.lox.run_source(source);
        Outcome {
            status,
            output: self.output.contents(),
            errors: self.errors.borrow().clone(),
        }
    }
}

pub fn run(source: &str) -> Outcome {
    Session::new().run(source)
}

/// Scan and parse, panicking on any front-end error.
pub fn parse(source: &str) -> Vec<Stmt> {
    let (tokens, errors) = Scanner::new(source).scan_tokens();
    assert!(errors.is_empty(), "lex errors: {:?}", errors);
    Parser::new(&tokens)
        .parse()
        .unwrap_or_else(|errors| panic!("parse errors: {:?}", errors))
}
