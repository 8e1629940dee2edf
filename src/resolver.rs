//! Static resolution pass for the glox interpreter.
//!
//! A single AST walk that:
//! 1. **Builds lexical scopes**: maintains a stack of `HashMap<String, bool>`
//!    tracking declared (`false`) and fully defined (`true`) names in each
//!    nested block, function or class body.
//! 2. **Enforces contextual rules**: redeclaration in the same scope,
//!    reading a variable in its own initializer, `return` placement (and
//!    value returns from initializers/setters), `break`/`continue` outside
//!    loops, `this`/`super` placement, self-inheritance, `static` members
//!    outside classes, and `init` marked static/get/set.
//! 3. **Records binding distances**: for every variable-like occurrence
//!    (variables, assignments, `this`, `super`), tells the interpreter how
//!    many environments to climb at runtime. Names that resolve to no scope
//!    are globals.
//!
//! Resolution halts on the first static error; the driver reports it and
//! skips interpretation.

use std::collections::HashMap;

use log::{debug, info};

use crate::error::{GloxError, Result};
use crate::expr::{Expr, ExprId};
use crate::interpreter::Interpreter;
use crate::stmt::{FunctionDecl, FunctionKind, Stmt};
use crate::token::Token;

/// What kind of function body we are inside. Validates `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    /// Not inside any class declaration.
    None,

    /// Inside a class declaration _without_ a superclass.
    Class,

    /// Inside a class declaration _with_ a superclass.
    Subclass,
}

pub struct Resolver<'interp> {
    interpreter: &'interp mut Interpreter,
    scopes: Vec<HashMap<String, bool>>, // false=declared, true=defined
    current_function: FunctionType,
    current_class: ClassType,
    current_method: FunctionKind,
    in_loop: bool,
}

impl<'interp> Resolver<'interp> {
    pub fn new(interpreter: &'interp mut Interpreter) -> Self {
        info!("Resolver instantiated");

        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            current_method: FunctionKind::Function,
            in_loop: false,
        }
    }

    /// Walk all top-level statements.
    pub fn resolve(&mut self, statements: &[Stmt]) -> Result<()> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        for stmt in statements {
            self.resolve_stmt(stmt)?;
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.resolve_expr(expr)?;
            }

            Stmt::Var { name, initializer } => {
                self.declare(name)?;

                if let Some(expr) = initializer {
                    self.resolve_expr(expr)?;
                }

                self.define(name);
            }

            Stmt::Block(statements) => {
                self.begin_scope();

                for s in statements {
                    self.resolve_stmt(s)?;
                }

                self.end_scope();
            }

            Stmt::If {
                condition,
                consequence,
                alternative,
            } => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(consequence)?;

                if let Some(alt) = alternative.as_deref() {
                    self.resolve_stmt(alt)?;
                }
            }

            Stmt::Loop {
                condition,
                body,
                increment,
            } => {
                self.resolve_expr(condition)?;

                let enclosing_loop: bool = self.in_loop;
                self.in_loop = true;

                self.resolve_stmt(body)?;

                if let Some(inc) = increment {
                    self.resolve_expr(inc)?;
                }

                self.in_loop = enclosing_loop;
            }

            Stmt::ForEach {
                variable,
                array,
                body,
            } => {
                self.resolve_expr(array)?;

                // The loop variable lives in its own scope around the body.
                self.begin_scope();
                self.declare(variable)?;
                self.define(variable);

                let enclosing_loop: bool = self.in_loop;
                self.in_loop = true;

                self.resolve_stmt(body)?;

                self.in_loop = enclosing_loop;
                self.end_scope();
            }

            Stmt::Function(declaration) => {
                // Name is defined before the body resolves, so functions can
                // recurse.
                if let Some(name) = &declaration.name {
                    self.declare(name)?;
                    self.define(name);
                }

                self.resolve_function(declaration, FunctionType::Function)?;
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    return Err(GloxError::resolve(
                        keyword,
                        "Can't return from top level code",
                    ));
                }

                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        return Err(GloxError::resolve(
                            keyword,
                            "Can't return a value from an initializer",
                        ));
                    }

                    if self.current_method == FunctionKind::SetterMethod {
                        return Err(GloxError::resolve(
                            keyword,
                            "Can't return a value from a setter",
                        ));
                    }

                    self.resolve_expr(expr)?;
                }
            }

            Stmt::Break(keyword) => {
                if !self.in_loop {
                    return Err(GloxError::resolve(keyword, "Can't break when not in loop"));
                }
            }

            Stmt::Continue(keyword) => {
                if !self.in_loop {
                    return Err(GloxError::resolve(
                        keyword,
                        "Can't continue when not in loop",
                    ));
                }
            }

            Stmt::Class {
                name,
                methods,
                superclass,
            } => {
                self.resolve_class(name, methods, superclass.as_ref())?;
            }
        }

        Ok(())
    }

    fn resolve_class(
        &mut self,
        name: &Token,
        methods: &[std::rc::Rc<FunctionDecl>],
        superclass: Option<&Expr>,
    ) -> Result<()> {
        let enclosing_class: ClassType = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(name)?;
        self.define(name);

        if let Some(superclass) = superclass {
            if let Expr::Variable {
                name: super_name, ..
            } = superclass
            {
                if super_name.lexeme == name.lexeme {
                    return Err(GloxError::resolve(
                        super_name,
                        "A class can't inherit from itself.",
                    ));
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass)?;

            // Synthetic scope binding `super` around all method bodies.
            self.begin_scope();
            self.scope_insert("super");
        }

        // Synthetic scope binding `this`.
        self.begin_scope();
        self.scope_insert("this");

        for method in methods {
            let method_name: &Token = method.name.as_ref().expect("method without a name");

            if method_name.lexeme == "init" {
                if method.kind != FunctionKind::NormalMethod {
                    return Err(GloxError::resolve(
                        name,
                        "init method cannot be static, getter or setter",
                    ));
                }

                self.resolve_function(method, FunctionType::Initializer)?;
            } else {
                self.current_method = method.kind;
                self.resolve_function(method, FunctionType::Method)?;
                self.current_method = FunctionKind::Function;
            }
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => {
                self.resolve_expr(inner)?;
            }

            Expr::Sequence(items) | Expr::Array(items) => {
                for item in items {
                    self.resolve_expr(item)?;
                }
            }

            Expr::Map { keys, values, .. } => {
                for i in 0..keys.len() {
                    self.resolve_expr(&keys[i])?;
                    self.resolve_expr(&values[i])?;
                }
            }

            Expr::Index {
                object,
                left,
                right,
                ..
            } => {
                self.resolve_expr(object)?;
                self.resolve_expr(left)?;

                if let Some(right) = right {
                    self.resolve_expr(right)?;
                }
            }

            Expr::IndexedAssignment { target, value } => {
                self.resolve_expr(target)?;
                self.resolve_expr(value)?;
            }

            Expr::Unary { expr, .. } => {
                self.resolve_expr(expr)?;
            }

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)?;
            }

            Expr::Ternary {
                condition,
                consequence,
                alternative,
            } => {
                self.resolve_expr(condition)?;
                self.resolve_expr(consequence)?;
                self.resolve_expr(alternative)?;
            }

            Expr::Variable { id, name } => {
                // Reading a declared-but-undefined variable means the
                // initializer refers to the variable itself.
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        return Err(GloxError::resolve(
                            name,
                            "Can't read local variable in its own initializer",
                        ));
                    }
                }

                self.resolve_local(*id, name);
            }

            Expr::Assignment { id, name, value } => {
                self.resolve_expr(value)?;
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee)?;

                for arg in arguments {
                    self.resolve_expr(arg)?;
                }
            }

            Expr::Lambda(declaration) => {
                self.resolve_function(declaration, FunctionType::Function)?;
            }

            Expr::Get { object, .. } => {
                self.resolve_expr(object)?;
            }

            Expr::Set { object, value, .. } => {
                self.resolve_expr(value)?;
                self.resolve_expr(object)?;
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    return Err(GloxError::resolve(
                        keyword,
                        "Can't use 'this' outside of a class.",
                    ));
                }

                self.resolve_local(*id, keyword);
            }

            Expr::SuperGet { id, keyword, .. } => {
                self.check_super_context(keyword)?;
                self.resolve_local(*id, keyword);
            }

            Expr::SuperSet {
                id, keyword, value, ..
            } => {
                self.check_super_context(keyword)?;
                self.resolve_local(*id, keyword);
                self.resolve_expr(value)?;
            }
        }

        Ok(())
    }

    fn check_super_context(&self, keyword: &Token) -> Result<()> {
        if self.current_class == ClassType::None {
            return Err(GloxError::resolve(
                keyword,
                "Can't use 'super' outside of a class.",
            ));
        }

        if self.current_class != ClassType::Subclass {
            return Err(GloxError::resolve(
                keyword,
                "Can't use 'super' in a class with no superclass.",
            ));
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────

    /// Resolve a function's parameters and body in a fresh scope under the
    /// given context.
    fn resolve_function(
        &mut self,
        declaration: &FunctionDecl,
        function_type: FunctionType,
    ) -> Result<()> {
        if declaration.kind == FunctionKind::StaticMethod && self.current_class == ClassType::None {
            let name: &Token = declaration.name.as_ref().expect("static method without name");

            return Err(GloxError::resolve(
                name,
                "Cannot declare function as static outside of class declaration.",
            ));
        }

        let enclosing: FunctionType = self.current_function;
        self.current_function = function_type;

        // The loop context does not cross a function boundary.
        let enclosing_loop: bool = self.in_loop;
        self.in_loop = false;

        self.begin_scope();

        for param in &declaration.params {
            self.declare(param)?;
            self.define(param);
        }

        for stmt in &declaration.body {
            self.resolve_stmt(stmt)?;
        }

        self.end_scope();

        self.in_loop = enclosing_loop;
        self.current_function = enclosing;

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn scope_insert(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    fn declare(&mut self, name: &Token) -> Result<()> {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                return Err(GloxError::resolve(
                    name,
                    "Already a variable with this name in scope",
                ));
            }

            scope.insert(name.lexeme.clone(), false);
        }

        Ok(())
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Binding-distance helper
    // ─────────────────────────────────────────────────────────────────────

    /// Record this occurrence as a local at its lexical depth; absence from
    /// every scope means it is a global.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);

                self.interpreter.resolve(id, depth);

                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }
}
