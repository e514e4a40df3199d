//! Lexical environments.
//!
//! An [`Environment`] is one scope of name → value bindings plus an owning
//! link to its lexical parent.  Environments form a tree rooted at the
//! globals; a function called twice gets two sibling children of its closure.
//!
//! Two lookup paths exist on purpose:
//! * [`Environment::get`] / [`Environment::assign`] walk the chain by name and
//!   are only used for globals the resolver left unresolved;
//! * [`Environment::get_at`] / [`Environment::assign_at`] jump exactly `hops`
//!   links, trusting the resolver's hop count.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;

/// Shared handle to an environment.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Bind `name` in this scope, overwriting any previous binding.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Read `name` from the scope exactly `hops` links up from `env`.
    pub fn get_at(env: &EnvRef, hops: usize, name: &str, line: usize) -> Result<Value> {
        let target = ancestor(env, hops, line)?;
        let value = target.borrow().values.get(name).cloned();

        value.ok_or_else(|| unresolved(name, hops, line))
    }

    /// Overwrite `name` in the scope exactly `hops` links up from `env`.
    pub fn assign_at(env: &EnvRef, hops: usize, name: &Token, value: Value) -> Result<()> {
        let target = ancestor(env, hops, name.line)?;
        let mut target = target.borrow_mut();

        match target.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(unresolved(&name.lexeme, hops, name.line)),
        }
    }
}

/// Follow `hops` enclosing links from `env`.
fn ancestor(env: &EnvRef, hops: usize, line: usize) -> Result<EnvRef> {
    let mut current = Rc::clone(env);

    for _ in 0..hops {
        let parent = current.borrow().enclosing.clone();
        current = parent.ok_or_else(|| {
            LoxError::runtime(line, format!("Scope chain shorter than {} hop(s).", hops))
        })?;
    }

    Ok(current)
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name.line, format!("Undefined variable '{}'.", name.lexeme))
}

// Only reachable if the resolver and the runtime disagree on scope shape.
fn unresolved(name: &str, hops: usize, line: usize) -> LoxError {
    debug!("Binding '{}' missing at depth {}", name, hops);
    LoxError::runtime(
        line,
        format!("Resolved variable '{}' missing at depth {}.", name, hops),
    )
}
