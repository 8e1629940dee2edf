//! Runtime values and the object model: arrays, maps, functions, classes,
//! instances and natives.
//!
//! Compound values are shared by reference (`Rc`); mutation through one
//! alias is visible through all. Equality follows the language contract:
//! structural for primitives, reference identity for everything else.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::environment::Environment;
use crate::interpreter::Interpreter;
use crate::stmt::FunctionDecl;

pub type NativeFn = fn(&mut Interpreter, &[Value]) -> crate::error::Result<Value>;

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Map(Rc<RefCell<LoxMap>>),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
    Instance(Rc<RefCell<LoxInstance>>),
    Native(Rc<NativeFunction>),

    /// The value of an empty sequence expression `()`. Compares unequal to
    /// everything, itself included.
    Empty,
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    /// Only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,

            Value::Boolean(b) => *b,

            _ => true,
        }
    }

    /// Canonical representation: strings are quoted.
    pub fn repr(&self) -> String {
        match self {
            Value::String(s) => format!("\"{}\"", s),

            _ => self.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,

            (Value::Boolean(a), Value::Boolean(b)) => a == b,

            // IEEE-754 semantics: NaN is not equal to itself.
            (Value::Number(a), Value::Number(b)) => a == b,

            (Value::String(a), Value::String(b)) => a == b,

            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),

            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),

            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),

            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),

            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),

            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),

            _ => false,
        }
    }
}

/// Printable representation: strings raw, everything else as repr.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Boolean(b) => write!(f, "{}", b),

            // f64 Display is the shortest round-trippable decimal.
            Value::Number(n) => write!(f, "{}", n),

            Value::String(s) => write!(f, "{}", s),

            Value::Array(items) => {
                let reprs: Vec<String> = items.borrow().iter().map(Value::repr).collect();

                write!(f, "[{}]", reprs.join(", "))
            }

            Value::Map(_) => write!(f, "<map>"),

            Value::Function(function) => match function.name() {
                Some(name) => write!(f, "<fn {}>", name),
                None => write!(f, "<lambda>"),
            },

            Value::Class(class) => write!(f, "<class {}>", class.name),

            Value::Instance(instance) => {
                write!(f, "<object {}>", instance.borrow().class.name)
            }

            Value::Native(native) => write!(f, "<native fn {}>", native.name),

            Value::Empty => write!(f, "nil"),
        }
    }
}

/// String-keyed map. Entries are indexed by a stable in-process hash of the
/// key and retain the `(key, value)` pair, so `keys`/`values` can recover
/// the original keys. Iteration order is unspecified.
#[derive(Debug, Default)]
pub struct LoxMap {
    entries: HashMap<u64, (String, Value)>,
}

impl LoxMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn hash_key(key: &str) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();

        key.hash(&mut hasher);

        hasher.finish()
    }

    /// Duplicate keys overwrite.
    pub fn insert(&mut self, key: String, value: Value) {
        self.entries.insert(Self::hash_key(&key), (key, value));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(&Self::hash_key(key)).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&Self::hash_key(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> Vec<Value> {
        self.entries
            .values()
            .map(|(k, _)| Value::String(k.clone()))
            .collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.values().map(|(_, v)| v.clone()).collect()
    }
}

/// A user function: its declaration plus the environment it closed over.
pub struct LoxFunction {
    pub declaration: Rc<FunctionDecl>,
    pub closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        declaration: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        LoxFunction {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.declaration.name.as_ref().map(|t| t.lexeme.as_str())
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Produce a copy whose closure is extended with a scope binding
    /// `this`. Method bodies resolve `this` one environment above their
    /// parameters, which is exactly this scope.
    pub fn bind(&self, this: Value) -> LoxFunction {
        let mut environment: Environment = Environment::with_enclosing(self.closure.clone());

        environment.define("this", this);

        LoxFunction {
            declaration: self.declaration.clone(),
            closure: Rc::new(RefCell::new(environment)),
            is_initializer: self.is_initializer,
        }
    }
}

// The closure chain can be cyclic; never traverse it when debug-printing.
impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoxFunction({})", self.name().unwrap_or("<lambda>"))
    }
}

#[derive(Debug)]
pub struct LoxClass {
    pub name: String,
    pub methods: HashMap<String, Rc<LoxFunction>>,
    pub superclass: Option<Rc<LoxClass>>,
}

impl LoxClass {
    /// Method lookup walks the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }

    /// A class called as a constructor has the arity of its initializer.
    pub fn arity(&self) -> usize {
        self.find_method("init")
            .map(|init| init.arity())
            .unwrap_or(0)
    }
}

#[derive(Debug)]
pub struct LoxInstance {
    pub class: Rc<LoxClass>,
    pub fields: HashMap<String, Value>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        LoxInstance {
            class,
            fields: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

/// Arity of any value implementing the call protocol; `None` when the
/// value is not callable.
pub fn callable_arity(value: &Value) -> Option<usize> {
    match value {
        Value::Function(function) => Some(function.arity()),

        Value::Class(class) => Some(class.arity()),

        Value::Native(native) => Some(native.arity),

        _ => None,
    }
}
