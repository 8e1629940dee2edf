//! Tree-walking evaluator for glox.
//!
//! Statements execute over a chain of lexical environments; expression
//! evaluation is a single `match` per node. `return`/`break`/`continue`
//! unwind as a tagged [`Control`] result threaded through every statement
//! frame rather than as unwinding panics: loops consume `Break`/`Continue`
//! (the increment still runs after a `continue`), call frames consume
//! `Return`, and the environment is restored on every exit path.

use std::cell::RefCell;
use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use log::{debug, info};

use crate::environment::Environment;
use crate::error::{GloxError, Result};
use crate::expr::{Expr, ExprId, Literal};
use crate::natives;
use crate::stmt::{FunctionKind, Stmt};
use crate::token::{Token, TokenType};
use crate::value::{LoxClass, LoxFunction, LoxInstance, LoxMap, Value};

/// Outcome of executing one statement.
#[derive(Debug)]
pub enum Control {
    Normal,
    Return(Value),
    Break,
    Continue,
}

pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
}

impl Interpreter {
    pub fn new() -> Self {
        let mut globals: Environment = Environment::new();

        for native in natives::NATIVES {
            globals.define(native.name, Value::Native(Rc::new(*native)));
        }

        info!(
            "Interpreter initialized with {} native(s)",
            natives::NATIVES.len()
        );

        let globals: Rc<RefCell<Environment>> = Rc::new(RefCell::new(globals));

        Interpreter {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
        }
    }

    /// Called by the resolver: the identifier occurrence `id` binds `depth`
    /// environments above the one current when it is evaluated.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Execute a program. If the final statement is an expression
    /// statement, its value is returned so the REPL can echo it.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<Option<Value>> {
        let mut trailing: Option<Value> = None;

        for (index, stmt) in statements.iter().enumerate() {
            if index + 1 == statements.len() {
                if let Stmt::Expression(expr) = stmt {
                    trailing = Some(self.evaluate(expr)?);
                    break;
                }
            }

            // The resolver rejects top-level return/break/continue, so
            // control here is always Normal.
            self.execute(stmt)?;
        }

        Ok(trailing)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────

    fn execute(&mut self, stmt: &Stmt) -> Result<Control> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(Control::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(Control::Normal)
            }

            Stmt::Block(statements) => {
                let environment: Environment =
                    Environment::with_enclosing(self.environment.clone());

                self.execute_block(statements, environment)
            }

            Stmt::If {
                condition,
                consequence,
                alternative,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(consequence)
                } else if let Some(alternative) = alternative {
                    self.execute(alternative)
                } else {
                    Ok(Control::Normal)
                }
            }

            Stmt::Loop {
                condition,
                body,
                increment,
            } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Control::Normal | Control::Continue => {}

                        Control::Break => {
                            debug!("Loop terminated by break");

                            break;
                        }

                        ret @ Control::Return(_) => return Ok(ret),
                    }

                    // Also reached after a continue.
                    if let Some(increment) = increment {
                        self.evaluate(increment)?;
                    }
                }

                Ok(Control::Normal)
            }

            Stmt::ForEach {
                variable,
                array,
                body,
            } => self.execute_for_each(variable, array, body),

            Stmt::Function(declaration) => {
                let name: &Token = declaration
                    .name
                    .as_ref()
                    .expect("function statement without a name");

                let function: LoxFunction =
                    LoxFunction::new(declaration.clone(), self.environment.clone(), false);

                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Function(Rc::new(function)));

                Ok(Control::Normal)
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Ok(Control::Return(value))
            }

            Stmt::Break(_) => Ok(Control::Break),

            Stmt::Continue(_) => Ok(Control::Continue),

            Stmt::Class {
                name,
                methods,
                superclass,
            } => self.execute_class(name, methods, superclass.as_ref()),
        }
    }

    fn execute_block(&mut self, statements: &[Stmt], environment: Environment) -> Result<Control> {
        let previous: Rc<RefCell<Environment>> =
            mem::replace(&mut self.environment, Rc::new(RefCell::new(environment)));

        let mut outcome: Result<Control> = Ok(Control::Normal);

        for stmt in statements {
            match self.execute(stmt) {
                Ok(Control::Normal) => {}

                other => {
                    outcome = other;
                    break;
                }
            }
        }

        self.environment = previous;

        outcome
    }

    fn execute_for_each(&mut self, variable: &Token, array: &Expr, body: &Stmt) -> Result<Control> {
        let elements: Vec<Value> = match self.evaluate(array)? {
            Value::Array(items) => items.borrow().clone(),

            _ => {
                return Err(GloxError::runtime(
                    variable,
                    "Can only iterate over arrays",
                ));
            }
        };

        let previous: Rc<RefCell<Environment>> = self.environment.clone();

        self.environment = Rc::new(RefCell::new(Environment::with_enclosing(previous.clone())));

        let mut outcome: Result<Control> = Ok(Control::Normal);

        for element in elements {
            self.environment
                .borrow_mut()
                .define(&variable.lexeme, element);

            match self.execute(body) {
                Ok(Control::Normal) | Ok(Control::Continue) => {}

                Ok(Control::Break) => break,

                other => {
                    outcome = other;
                    break;
                }
            }
        }

        self.environment = previous;

        outcome
    }

    fn execute_class(
        &mut self,
        name: &Token,
        methods: &[Rc<crate::stmt::FunctionDecl>],
        superclass_expr: Option<&Expr>,
    ) -> Result<Control> {
        let superclass: Option<Rc<LoxClass>> = match superclass_expr {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),

                _ => {
                    return Err(GloxError::runtime(name, "Superclass must be a class."));
                }
            },

            None => None,
        };

        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Nil);

        // Methods close over a synthetic scope binding `super` when there
        // is a superclass; `bind` later stacks `this` on top of it.
        let method_closure: Rc<RefCell<Environment>> = match &superclass {
            Some(superclass) => {
                let mut environment: Environment =
                    Environment::with_enclosing(self.environment.clone());

                environment.define("super", Value::Class(superclass.clone()));

                Rc::new(RefCell::new(environment))
            }

            None => self.environment.clone(),
        };

        let mut class_methods: HashMap<String, Rc<LoxFunction>> = HashMap::new();

        for method in methods {
            let method_name: &Token = method.name.as_ref().expect("method without a name");

            let is_initializer: bool = method_name.lexeme == "init";

            let function: LoxFunction =
                LoxFunction::new(method.clone(), method_closure.clone(), is_initializer);

            class_methods.insert(method_name.lexeme.clone(), Rc::new(function));
        }

        let class: Rc<LoxClass> = Rc::new(LoxClass {
            name: name.lexeme.clone(),
            methods: class_methods,
            superclass,
        });

        debug!("Declared class {}", name.lexeme);

        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Class(class));

        Ok(Control::Normal)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                Literal::Number(n) => Value::Number(*n),
                Literal::String(s) => Value::String(s.clone()),
                Literal::Boolean(b) => Value::Boolean(*b),
                Literal::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Sequence(items) => {
                if items.is_empty() {
                    return Ok(Value::Empty);
                }

                let mut last: Value = Value::Nil;

                for item in items {
                    last = self.evaluate(item)?;
                }

                Ok(last)
            }

            Expr::Array(items) => {
                let mut values: Vec<Value> = Vec::with_capacity(items.len());

                for item in items {
                    values.push(self.evaluate(item)?);
                }

                Ok(Value::array(values))
            }

            Expr::Map {
                brace,
                keys,
                values,
            } => {
                let mut map: LoxMap = LoxMap::new();

                for (key_expr, value_expr) in keys.iter().zip(values) {
                    let key: Value = self.evaluate(key_expr)?;
                    let value: Value = self.evaluate(value_expr)?;

                    match key {
                        Value::String(key) => map.insert(key, value),

                        _ => {
                            return Err(GloxError::runtime(brace, "Map keys must be strings"));
                        }
                    }
                }

                Ok(Value::Map(Rc::new(RefCell::new(map))))
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assignment { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(distance) => {
                        Environment::assign_at(
                            &self.environment,
                            *distance,
                            &name.lexeme,
                            value.clone(),
                        );
                    }

                    None => {
                        self.globals.borrow_mut().assign(name, value.clone())?;
                    }
                }

                Ok(value)
            }

            Expr::Unary { operator, expr } => self.evaluate_unary(operator, expr),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left_value: Value = self.evaluate(left)?;

                // Short-circuit: return the operand that decided the
                // result, not a coerced boolean.
                match operator.token_type {
                    TokenType::OR if left_value.is_truthy() => Ok(left_value),
                    TokenType::AND if !left_value.is_truthy() => Ok(left_value),
                    _ => self.evaluate(right),
                }
            }

            Expr::Ternary {
                condition,
                consequence,
                alternative,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(consequence)
                } else {
                    self.evaluate(alternative)
                }
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_value: Value = self.evaluate(callee)?;

                let mut argument_values: Vec<Value> = Vec::with_capacity(arguments.len());

                for argument in arguments {
                    argument_values.push(self.evaluate(argument)?);
                }

                self.call_callable(&callee_value, argument_values)
                    .map_err(|e| anchor_at(e, paren))
            }

            Expr::Lambda(declaration) => {
                let function: LoxFunction =
                    LoxFunction::new(declaration.clone(), self.environment.clone(), false);

                Ok(Value::Function(Rc::new(function)))
            }

            Expr::Index {
                object,
                bracket,
                left,
                right,
            } => self.evaluate_index(object, bracket, left, right.as_deref()),

            Expr::IndexedAssignment { target, value } => {
                self.evaluate_indexed_assignment(target, value)
            }

            Expr::Get { object, name } => self.evaluate_get(object, name),

            Expr::Set {
                object,
                name,
                value,
            } => self.evaluate_set(object, name, value),

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::SuperGet { id, keyword, name } => {
                let (superclass, this) = self.super_and_this(*id, keyword)?;

                let method: Rc<LoxFunction> = superclass.find_method(&name.lexeme).ok_or_else(
                    || GloxError::runtime(name, format!("Undefined property '{}'.", name.lexeme)),
                )?;

                let bound: LoxFunction = method.bind(this);

                if method.declaration.kind == FunctionKind::GetterMethod {
                    return self.call_function(&bound, Vec::new());
                }

                Ok(Value::Function(Rc::new(bound)))
            }

            Expr::SuperSet {
                id,
                keyword,
                name,
                value,
            } => {
                let (superclass, this) = self.super_and_this(*id, keyword)?;

                let value: Value = self.evaluate(value)?;

                match superclass.find_method(&name.lexeme) {
                    Some(method) if method.declaration.kind == FunctionKind::SetterMethod => {
                        let bound: LoxFunction = method.bind(this);

                        self.call_function(&bound, vec![value.clone()])?;

                        Ok(value)
                    }

                    _ => Err(GloxError::runtime(
                        name,
                        format!("Undefined setter '{}'.", name.lexeme),
                    )),
                }
            }
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, expr: &Expr) -> Result<Value> {
        let value: Value = self.evaluate(expr)?;

        match operator.token_type {
            TokenType::MINUS => match value {
                Value::Number(n) => Ok(Value::Number(-n)),

                _ => Err(GloxError::runtime(operator, "Operand must be a number.")),
            },

            TokenType::BANG => Ok(Value::Boolean(!value.is_truthy())),

            _ => Err(GloxError::runtime(operator, "Invalid unary operator")),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left_value: Value = self.evaluate(left)?;
        let right_value: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::PLUS => self.evaluate_plus(left_value, operator, right_value),

            TokenType::MINUS => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),

                _ => Err(GloxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::STAR => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),

                _ => Err(GloxError::runtime(operator, "Operands must be numbers.")),
            },

            // Division follows IEEE-754: dividing by zero yields an
            // infinity or NaN, never an error.
            TokenType::SLASH => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),

                _ => Err(GloxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Boolean(left_value == right_value)),

            TokenType::BANG_EQUAL => Ok(Value::Boolean(left_value != right_value)),

            TokenType::LESS => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a < b)),

                _ => Err(GloxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::LESS_EQUAL => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a <= b)),

                _ => Err(GloxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::GREATER => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a > b)),

                _ => Err(GloxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::GREATER_EQUAL => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a >= b)),

                _ => Err(GloxError::runtime(operator, "Operands must be numbers.")),
            },

            _ => Err(GloxError::runtime(operator, "Invalid binary operator")),
        }
    }

    /// `+` is numeric addition, array concatenation, string concatenation,
    /// or string concatenation with a number/boolean on either side.
    fn evaluate_plus(&mut self, left: Value, operator: &Token, right: Value) -> Result<Value> {
        match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

            (Value::Array(a), Value::Array(b)) => {
                let mut items: Vec<Value> = a.borrow().clone();

                items.extend(b.borrow().iter().cloned());

                Ok(Value::array(items))
            }

            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),

            (Value::String(a), Value::Number(_) | Value::Boolean(_)) => {
                Ok(Value::String(format!("{}{}", a, right)))
            }

            (Value::Number(_) | Value::Boolean(_), Value::String(b)) => {
                Ok(Value::String(format!("{}{}", left, b)))
            }

            _ => Err(GloxError::runtime(
                operator,
                format!(
                    "Invalid operands {} and {} for '+'",
                    left.repr(),
                    right.repr()
                ),
            )),
        }
    }

    fn evaluate_index(
        &mut self,
        object: &Expr,
        bracket: &Token,
        left: &Expr,
        right: Option<&Expr>,
    ) -> Result<Value> {
        let object_value: Value = self.evaluate(object)?;
        let left_value: Value = self.evaluate(left)?;

        let right_value: Option<Value> = match right {
            Some(expr) => Some(self.evaluate(expr)?),
            None => None,
        };

        match object_value {
            Value::Array(items) => {
                let items = items.borrow();

                match right_value {
                    None => {
                        let index: usize = index_of(&left_value, items.len(), bracket)?;

                        Ok(items[index].clone())
                    }

                    Some(right_value) => {
                        let (lo, hi) =
                            slice_bounds(&left_value, &right_value, items.len(), bracket)?;

                        Ok(Value::array(items[lo..hi].to_vec()))
                    }
                }
            }

            Value::String(s) => match right_value {
                None => {
                    let index: usize = index_of(&left_value, s.len(), bracket)?;
                    let byte: u8 = s.as_bytes()[index];

                    Ok(Value::String(
                        String::from_utf8_lossy(&[byte]).into_owned(),
                    ))
                }

                Some(right_value) => {
                    let (lo, hi) = slice_bounds(&left_value, &right_value, s.len(), bracket)?;

                    Ok(Value::String(
                        String::from_utf8_lossy(&s.as_bytes()[lo..hi]).into_owned(),
                    ))
                }
            },

            Value::Map(map) => {
                if right_value.is_some() {
                    return Err(GloxError::runtime(bracket, "Cannot slice a map"));
                }

                match left_value {
                    // A missing key reads as nil.
                    Value::String(key) => Ok(map.borrow().get(&key).cloned().unwrap_or(Value::Nil)),

                    _ => Err(GloxError::runtime(bracket, "Map keys must be strings")),
                }
            }

            _ => Err(GloxError::runtime(
                bracket,
                "Can only index arrays, maps and strings",
            )),
        }
    }

    fn evaluate_indexed_assignment(&mut self, target: &Expr, value: &Expr) -> Result<Value> {
        let (object, bracket, left) = match target {
            Expr::Index {
                object,
                bracket,
                left,
                right: None,
            } => (object, bracket, left),

            // The parser rejects slice assignment.
            _ => unreachable!("indexed assignment without an index target"),
        };

        let object_value: Value = self.evaluate(object)?;
        let index_value: Value = self.evaluate(left)?;
        let value: Value = self.evaluate(value)?;

        match object_value {
            Value::Array(items) => {
                let mut items = items.borrow_mut();
                let index: usize = index_of(&index_value, items.len(), bracket)?;

                items[index] = value.clone();

                Ok(value)
            }

            Value::Map(map) => match index_value {
                Value::String(key) => {
                    map.borrow_mut().insert(key, value.clone());

                    Ok(value)
                }

                _ => Err(GloxError::runtime(bracket, "Map keys must be strings")),
            },

            _ => Err(GloxError::runtime(
                bracket,
                "Can only assign to array or map elements",
            )),
        }
    }

    fn evaluate_get(&mut self, object: &Expr, name: &Token) -> Result<Value> {
        let object_value: Value = self.evaluate(object)?;

        match &object_value {
            Value::Instance(instance) => {
                // Fields take precedence over methods.
                if let Some(field) = instance.borrow().fields.get(&name.lexeme) {
                    return Ok(field.clone());
                }

                let method: Option<Rc<LoxFunction>> =
                    instance.borrow().class.find_method(&name.lexeme);

                match method {
                    Some(method) => {
                        let bound: LoxFunction = method.bind(object_value.clone());

                        if method.declaration.kind == FunctionKind::GetterMethod {
                            return self.call_function(&bound, Vec::new());
                        }

                        Ok(Value::Function(Rc::new(bound)))
                    }

                    None => Err(GloxError::runtime(
                        name,
                        format!("Undefined property '{}'.", name.lexeme),
                    )),
                }
            }

            Value::Class(class) => match class.find_method(&name.lexeme) {
                Some(method) if method.declaration.kind == FunctionKind::StaticMethod => {
                    let bound: LoxFunction = method.bind(object_value.clone());

                    Ok(Value::Function(Rc::new(bound)))
                }

                Some(_) => Err(GloxError::runtime(
                    name,
                    format!(
                        "Cannot call non-static method '{}' directly on class.",
                        name.lexeme
                    ),
                )),

                None => Err(GloxError::runtime(
                    name,
                    format!("Undefined property '{}'.", name.lexeme),
                )),
            },

            _ => Err(GloxError::runtime(name, "Only instances have properties.")),
        }
    }

    fn evaluate_set(&mut self, object: &Expr, name: &Token, value: &Expr) -> Result<Value> {
        let object_value: Value = self.evaluate(object)?;

        match &object_value {
            Value::Instance(instance) => {
                let value: Value = self.evaluate(value)?;

                let setter: Option<Rc<LoxFunction>> = instance
                    .borrow()
                    .class
                    .find_method(&name.lexeme)
                    .filter(|m| m.declaration.kind == FunctionKind::SetterMethod);

                match setter {
                    Some(setter) => {
                        let bound: LoxFunction = setter.bind(object_value.clone());

                        self.call_function(&bound, vec![value.clone()])?;
                    }

                    None => {
                        instance
                            .borrow_mut()
                            .fields
                            .insert(name.lexeme.clone(), value.clone());
                    }
                }

                Ok(value)
            }

            _ => Err(GloxError::runtime(name, "Only instances have fields.")),
        }
    }

    /// Resolve `super` and the `this` it is bound to. The resolver recorded
    /// the distance of the synthetic `super` scope; `this` always sits one
    /// environment below it.
    fn super_and_this(&mut self, id: ExprId, keyword: &Token) -> Result<(Rc<LoxClass>, Value)> {
        let distance: usize = *self
            .locals
            .get(&id)
            .expect("unresolved 'super' expression");

        let superclass: Value = Environment::get_at(&self.environment, distance, "super");
        let this: Value = Environment::get_at(&self.environment, distance - 1, "this");

        match superclass {
            Value::Class(class) => Ok((class, this)),

            _ => Err(GloxError::runtime(keyword, "Superclass must be a class.")),
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(distance) => Ok(Environment::get_at(
                &self.environment,
                *distance,
                &name.lexeme,
            )),

            None => self.globals.borrow().get(name),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Calls
    // ─────────────────────────────────────────────────────────────────────

    /// Invoke any callable value. Errors without a source anchor are
    /// re-anchored by the caller.
    pub fn call_callable(&mut self, callee: &Value, arguments: Vec<Value>) -> Result<Value> {
        match callee {
            Value::Function(function) => {
                check_arity(function.arity(), arguments.len())?;

                self.call_function(function, arguments)
            }

            Value::Class(class) => {
                check_arity(class.arity(), arguments.len())?;

                let instance: Value =
                    Value::Instance(Rc::new(RefCell::new(LoxInstance::new(class.clone()))));

                if let Some(initializer) = class.find_method("init") {
                    let bound: LoxFunction = initializer.bind(instance.clone());

                    self.call_function(&bound, arguments)?;
                }

                Ok(instance)
            }

            Value::Native(native) => {
                check_arity(native.arity, arguments.len())?;

                (native.func)(self, &arguments)
            }

            _ => Err(GloxError::native("Can only call functions and classes.")),
        }
    }

    /// Run a function body in a fresh environment enclosing its closure.
    /// An initializer always evaluates to its bound `this`.
    pub fn call_function(&mut self, function: &LoxFunction, arguments: Vec<Value>) -> Result<Value> {
        let mut environment: Environment = Environment::with_enclosing(function.closure.clone());

        for (param, argument) in function.declaration.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument);
        }

        let control: Control = self.execute_block(&function.declaration.body, environment)?;

        if function.is_initializer {
            return Ok(Environment::get_at(&function.closure, 0, "this"));
        }

        match control {
            Control::Return(value) => Ok(value),

            _ => Ok(Value::Nil),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────

fn check_arity(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(GloxError::native(format!(
            "Expected {} arguments but got {}",
            expected, got
        )));
    }

    Ok(())
}

/// Give native and arity errors, which carry no source position, the line
/// of the call's closing paren.
fn anchor_at(error: GloxError, paren: &Token) -> GloxError {
    match error {
        GloxError::Runtime {
            line: 0, message, ..
        } => GloxError::runtime(paren, message),

        other => other,
    }
}

/// An index must be an integer-valued number within `0..len`.
fn index_of(value: &Value, len: usize, bracket: &Token) -> Result<usize> {
    match value {
        Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 && (*n as usize) < len => {
            Ok(*n as usize)
        }

        Value::Number(_) => Err(GloxError::runtime(bracket, "Index out of range")),

        _ => Err(GloxError::runtime(bracket, "Index must be a number")),
    }
}

/// Slice bounds must satisfy `0 <= lo <= hi <= len`.
fn slice_bounds(lo: &Value, hi: &Value, len: usize, bracket: &Token) -> Result<(usize, usize)> {
    match (lo, hi) {
        (Value::Number(lo), Value::Number(hi))
            if lo.fract() == 0.0
                && hi.fract() == 0.0
                && *lo >= 0.0
                && lo <= hi
                && (*hi as usize) <= len =>
        {
            Ok((*lo as usize, *hi as usize))
        }

        (Value::Number(_), Value::Number(_)) => {
            Err(GloxError::runtime(bracket, "Invalid slice range"))
        }

        _ => Err(GloxError::runtime(bracket, "Slice bounds must be numbers")),
    }
}
