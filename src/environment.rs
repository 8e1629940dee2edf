use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{GloxError, Result};
use crate::token::Token;
use crate::value::Value;

/// One scope in the lexical environment chain. Scopes are shared (`Rc`)
/// because closures keep their defining environment alive past lexical
/// exit.
#[derive(Debug)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Chain-walking read, used for globals (no resolver distance).
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow().get(name);
        }

        Err(GloxError::runtime(
            name,
            format!("Undefined variable '{}'", name.lexeme),
        ))
    }

    /// Chain-walking write, used for globals (no resolver distance).
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if self.values.contains_key(&name.lexeme) {
            self.values.insert(name.lexeme.clone(), value);

            return Ok(());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }

        Err(GloxError::runtime(
            name,
            format!("Undefined variable '{}'", name.lexeme),
        ))
    }

    /// Direct read at a resolver-provided distance. The resolver guarantees
    /// the binding exists, so absence is a resolver bug, not a user error.
    pub fn get_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &str) -> Value {
        let ancestor: Rc<RefCell<Environment>> = Self::ancestor(env, distance);

        let value: Value = ancestor
            .borrow()
            .values
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("unresolved local '{}' at distance {}", name, distance));

        value
    }

    /// Direct write at a resolver-provided distance.
    pub fn assign_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &str, value: Value) {
        let ancestor: Rc<RefCell<Environment>> = Self::ancestor(env, distance);

        ancestor.borrow_mut().values.insert(name.to_string(), value);
    }

    fn ancestor(env: &Rc<RefCell<Environment>>, distance: usize) -> Rc<RefCell<Environment>> {
        let mut environment: Rc<RefCell<Environment>> = env.clone();

        for _ in 0..distance {
            let enclosing: Rc<RefCell<Environment>> = environment
                .borrow()
                .enclosing
                .clone()
                .expect("environment chain shorter than resolver distance");

            environment = enclosing;
        }

        environment
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
