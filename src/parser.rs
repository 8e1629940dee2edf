//! Recursive-descent parser for glox.
//!
//! Consumes the scanner's token vector and produces a statement list.
//! Error handling is panic-mode in structure but `Result`-driven in form:
//! a syntax error unwinds to the top-level `parse` loop, which records the
//! error and synchronizes to the next statement boundary before continuing.
//!
//! Two ambiguities need explicit lookahead:
//! 1. A leading `(` or identifier can open a lambda (`x => …`, `() => …`,
//!    `(a, b) => …`) or a grouping/sequence expression.
//! 2. A `{` in statement position can open a block or a map literal; map
//!    literals are committed on `}` or a STRING-then-`:` lookahead.

use std::rc::Rc;

use log::{debug, info};

use crate::error::GloxError;
use crate::expr::{Expr, ExprId, Literal};
use crate::stmt::{FunctionDecl, FunctionKind, Stmt};
use crate::token::{Token, TokenType};

/// Parameter and argument lists are capped.
const MAX_ARITY: usize = 255;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    next_id: ExprId,
    errors: Vec<GloxError>,
}

type ParseResult<T> = Result<T, GloxError>;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::starting_at(tokens, 0)
    }

    /// Start node ids at `first_id`. The REPL threads the counter across
    /// inputs so ids stay unique for the lifetime of one interpreter.
    pub fn starting_at(tokens: Vec<Token>, first_id: ExprId) -> Self {
        info!("Initializing parser with {} token(s)", tokens.len());

        Parser {
            tokens,
            current: 0,
            next_id: first_id,
            errors: Vec::new(),
        }
    }

    /// First id not handed out yet.
    pub fn next_id(&self) -> ExprId {
        self.next_id
    }

    /// Parse the whole token stream, recovering at statement boundaries.
    /// Recorded errors are available through [`Parser::errors`].
    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.is_at_end() {
            if self.match_token(&TokenType::NEW_LINE) {
                continue;
            }

            match self.declaration() {
                Ok(stmt) => statements.push(stmt),

                Err(e) => {
                    debug!("Parse error, synchronizing: {}", e);

                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }

        statements
    }

    pub fn errors(&self) -> &[GloxError] {
        &self.errors
    }

    // ─────────────────────────────────────────────────────────────────────
    // Declarations
    // ─────────────────────────────────────────────────────────────────────

    fn declaration(&mut self) -> ParseResult<Stmt> {
        if self.match_token(&TokenType::VAR) {
            return self.var_declaration();
        }

        if self.match_token(&TokenType::CLASS) {
            return self.class_declaration();
        }

        if self.match_token(&TokenType::FUN) {
            return self.function_declaration();
        }

        self.statement()
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name: Token = self.consume(&TokenType::IDENTIFIER, "Expect variable name.")?;

        let initializer: Option<Expr> = if self.match_token(&TokenType::EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };

        self.end_statement()?;

        Ok(Stmt::Var { name, initializer })
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name: Token = self.consume(&TokenType::IDENTIFIER, "Expect class name.")?;

        let superclass: Option<Expr> = if self.match_token(&TokenType::LESS) {
            let super_name: Token =
                self.consume(&TokenType::IDENTIFIER, "Expect superclass name.")?;

            Some(Expr::Variable {
                id: self.fresh_id(),
                name: super_name,
            })
        } else {
            None
        };

        self.consume(&TokenType::LEFT_BRACE, "Expect '{' before class body.")?;

        let mut methods: Vec<Rc<FunctionDecl>> = Vec::new();

        self.skip_newlines();

        while !self.check(&TokenType::RIGHT_BRACE) && !self.is_at_end() {
            methods.push(Rc::new(self.method()?));
            self.skip_newlines();
        }

        self.consume(&TokenType::RIGHT_BRACE, "Expect '}' after class body.")?;

        Ok(Stmt::Class {
            name,
            methods,
            superclass,
        })
    }

    fn method(&mut self) -> ParseResult<FunctionDecl> {
        let kind: FunctionKind = if self.match_token(&TokenType::STATIC) {
            FunctionKind::StaticMethod
        } else if self.match_token(&TokenType::GET) {
            FunctionKind::GetterMethod
        } else if self.match_token(&TokenType::SET) {
            FunctionKind::SetterMethod
        } else {
            FunctionKind::NormalMethod
        };

        let name: Token = self.consume(&TokenType::IDENTIFIER, "Expect method name.")?;

        self.function_body(Some(name), kind)
    }

    fn function_declaration(&mut self) -> ParseResult<Stmt> {
        let name: Token = self.consume(&TokenType::IDENTIFIER, "Expect function name.")?;

        let declaration: FunctionDecl = self.function_body(Some(name), FunctionKind::Function)?;

        Ok(Stmt::Function(Rc::new(declaration)))
    }

    /// Parameter list and block body shared by named functions, methods and
    /// block-bodied lambdas.
    fn function_body(
        &mut self,
        name: Option<Token>,
        kind: FunctionKind,
    ) -> ParseResult<FunctionDecl> {
        self.consume(&TokenType::LEFT_PAREN, "Expect '(' after function name.")?;

        let params: Vec<Token> = self.parameters()?;

        self.consume(&TokenType::LEFT_BRACE, "Expect '{' before function body.")?;

        let body: Vec<Stmt> = self.block()?;

        Ok(FunctionDecl {
            name,
            params,
            body,
            kind,
        })
    }

    /// Parses `IDENT {"," IDENT}` up to the closing paren, which is
    /// consumed.
    fn parameters(&mut self) -> ParseResult<Vec<Token>> {
        let mut params: Vec<Token> = Vec::new();

        if !self.check(&TokenType::RIGHT_PAREN) {
            loop {
                if params.len() >= MAX_ARITY {
                    return Err(GloxError::parse(
                        self.peek(),
                        "Can't have more than 255 parameters.",
                    ));
                }

                params.push(self.consume(&TokenType::IDENTIFIER, "Expect parameter name.")?);

                if !self.match_token(&TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(&TokenType::RIGHT_PAREN, "Expect ')' after parameters.")?;

        Ok(params)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.match_token(&TokenType::RETURN) {
            return self.return_statement();
        }

        if self.match_token(&TokenType::BREAK) {
            let keyword: Token = self.previous().clone();
            self.end_statement()?;

            return Ok(Stmt::Break(keyword));
        }

        if self.match_token(&TokenType::CONTINUE) {
            let keyword: Token = self.previous().clone();
            self.end_statement()?;

            return Ok(Stmt::Continue(keyword));
        }

        if self.match_token(&TokenType::IF) {
            return self.if_statement();
        }

        if self.match_token(&TokenType::WHILE) {
            return self.while_statement();
        }

        if self.match_token(&TokenType::FOR) {
            return self.for_statement();
        }

        // `{` opens a block unless the lookahead commits it to a map
        // literal, which falls through to the expression parser.
        if self.check(&TokenType::LEFT_BRACE) && !self.map_literal_ahead() {
            self.advance();

            return Ok(Stmt::Block(self.block()?));
        }

        self.expression_statement()
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword: Token = self.previous().clone();

        let value: Option<Expr> = if self.statement_terminated() {
            None
        } else {
            Some(self.expression()?)
        };

        self.end_statement()?;

        Ok(Stmt::Return { keyword, value })
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(&TokenType::LEFT_PAREN, "Expect '(' after 'if'.")?;

        let condition: Expr = self.expression()?;

        self.consume(&TokenType::RIGHT_PAREN, "Expect ')' after if condition.")?;

        let consequence: Box<Stmt> = Box::new(self.statement()?);

        let alternative: Option<Box<Stmt>> = if self.match_token(&TokenType::ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            consequence,
            alternative,
        })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(&TokenType::LEFT_PAREN, "Expect '(' after 'while'.")?;

        let condition: Expr = self.expression()?;

        self.consume(&TokenType::RIGHT_PAREN, "Expect ')' after condition.")?;

        let body: Box<Stmt> = Box::new(self.statement()?);

        Ok(Stmt::Loop {
            condition,
            body,
            increment: None,
        })
    }

    /// `for (init; cond; incr) body` lowers to a `Loop`, wrapped in a block
    /// when an initializer is present; `for (var x of e) body` becomes
    /// `ForEach`.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(&TokenType::LEFT_PAREN, "Expect '(' after 'for'.")?;

        if self.check(&TokenType::VAR)
            && self.check_at(1, &TokenType::IDENTIFIER)
            && self.check_at(2, &TokenType::OF)
        {
            return self.for_each_statement();
        }

        let initializer: Option<Stmt> = if self.match_token(&TokenType::SEMICOLON) {
            None
        } else if self.match_token(&TokenType::VAR) {
            let name: Token = self.consume(&TokenType::IDENTIFIER, "Expect variable name.")?;

            let init_expr: Option<Expr> = if self.match_token(&TokenType::EQUAL) {
                Some(self.expression()?)
            } else {
                None
            };

            self.consume(&TokenType::SEMICOLON, "Expect ';' after loop initializer.")?;

            Some(Stmt::Var {
                name,
                initializer: init_expr,
            })
        } else {
            let expr: Expr = self.expression()?;

            self.consume(&TokenType::SEMICOLON, "Expect ';' after loop initializer.")?;

            Some(Stmt::Expression(expr))
        };

        let condition: Expr = if self.check(&TokenType::SEMICOLON) {
            Expr::Literal(Literal::Boolean(true))
        } else {
            self.expression()?
        };

        self.consume(&TokenType::SEMICOLON, "Expect ';' after loop condition.")?;

        let increment: Option<Expr> = if self.check(&TokenType::RIGHT_PAREN) {
            None
        } else {
            Some(self.expression()?)
        };

        self.consume(&TokenType::RIGHT_PAREN, "Expect ')' after for clauses.")?;

        let body: Box<Stmt> = Box::new(self.statement()?);

        let loop_stmt: Stmt = Stmt::Loop {
            condition,
            body,
            increment,
        };

        match initializer {
            Some(init) => Ok(Stmt::Block(vec![init, loop_stmt])),
            None => Ok(loop_stmt),
        }
    }

    fn for_each_statement(&mut self) -> ParseResult<Stmt> {
        self.advance(); // var

        let variable: Token = self.advance().clone();

        self.advance(); // of

        let array: Expr = self.expression()?;

        self.consume(&TokenType::RIGHT_PAREN, "Expect ')' after for clauses.")?;

        let body: Box<Stmt> = Box::new(self.statement()?);

        Ok(Stmt::ForEach {
            variable,
            array,
            body,
        })
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr: Expr = self.expression()?;

        self.end_statement()?;

        Ok(Stmt::Expression(expr))
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements: Vec<Stmt> = Vec::new();

        loop {
            self.skip_newlines();

            if self.check(&TokenType::RIGHT_BRACE) || self.is_at_end() {
                break;
            }

            statements.push(self.declaration()?);
        }

        self.consume(&TokenType::RIGHT_BRACE, "Expect '}' after block.")?;

        Ok(statements)
    }

    /// A statement must end with `;`, a newline, or a `}`/EOF lookahead.
    /// Runs of newlines collapse.
    fn end_statement(&mut self) -> ParseResult<()> {
        if self.match_token(&TokenType::SEMICOLON) || self.match_token(&TokenType::NEW_LINE) {
            self.skip_newlines();

            return Ok(());
        }

        if self.check(&TokenType::RIGHT_BRACE) || self.is_at_end() {
            return Ok(());
        }

        Err(GloxError::parse(
            self.peek(),
            "Improperly terminated statement",
        ))
    }

    /// True when the current token already terminates a statement, without
    /// consuming anything. Used for bare `return`.
    fn statement_terminated(&self) -> bool {
        self.check(&TokenType::SEMICOLON)
            || self.check(&TokenType::NEW_LINE)
            || self.check(&TokenType::RIGHT_BRACE)
            || self.is_at_end()
    }

    fn skip_newlines(&mut self) {
        while self.match_token(&TokenType::NEW_LINE) {}
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────

    fn expression(&mut self) -> ParseResult<Expr> {
        if self.lambda_ahead() {
            return self.lambda();
        }

        self.ternary()
    }

    /// Commit to a lambda parse on `IDENT =>`, `( )`, `( IDENT ,` or
    /// `( IDENT ) =>`; anything else starting with `(` is grouping or a
    /// sequence.
    fn lambda_ahead(&self) -> bool {
        if self.check(&TokenType::IDENTIFIER) && self.check_at(1, &TokenType::LAMBDA_ARROW) {
            return true;
        }

        if !self.check(&TokenType::LEFT_PAREN) {
            return false;
        }

        if self.check_at(1, &TokenType::RIGHT_PAREN) {
            return true;
        }

        self.check_at(1, &TokenType::IDENTIFIER)
            && (self.check_at(2, &TokenType::COMMA)
                || (self.check_at(2, &TokenType::RIGHT_PAREN)
                    && self.check_at(3, &TokenType::LAMBDA_ARROW)))
    }

    fn lambda(&mut self) -> ParseResult<Expr> {
        let params: Vec<Token> = if self.match_token(&TokenType::IDENTIFIER) {
            vec![self.previous().clone()]
        } else {
            self.consume(&TokenType::LEFT_PAREN, "Expect '(' before lambda parameters.")?;

            self.parameters()?
        };

        let arrow: Token =
            self.consume(&TokenType::LAMBDA_ARROW, "Expect '=>' after lambda parameters.")?;

        // `=> {}` is an empty block body; only a STRING-then-':' lookahead
        // makes the brace a map literal.
        let body: Vec<Stmt> = if self.check(&TokenType::LEFT_BRACE) && !self.map_entries_ahead() {
            self.advance();

            self.block()?
        } else if self.check(&TokenType::RETURN) {
            return Err(GloxError::parse(
                self.peek(),
                "Lambda body must be an expression or block",
            ));
        } else {
            // A single-expression body becomes an implicit return.
            let expr: Expr = self.expression()?;

            vec![Stmt::Return {
                keyword: arrow,
                value: Some(expr),
            }]
        };

        Ok(Expr::Lambda(Rc::new(FunctionDecl {
            name: None,
            params,
            body,
            kind: FunctionKind::Function,
        })))
    }

    /// In statement position, `{` opens a map literal on `{}` or on a
    /// STRING-then-':' lookahead.
    fn map_literal_ahead(&self) -> bool {
        self.check_at(1, &TokenType::RIGHT_BRACE) || self.map_entries_ahead()
    }

    fn map_entries_ahead(&self) -> bool {
        self.check_at(1, &TokenType::STRING(String::new())) && self.check_at(2, &TokenType::COLON)
    }

    fn ternary(&mut self) -> ParseResult<Expr> {
        let expr: Expr = self.assignment()?;

        if self.match_token(&TokenType::QUESTION) {
            let consequence: Expr = self.expression()?;

            self.consume(&TokenType::COLON, "Expect ':' in ternary expression.")?;

            // Recursing through `expression` makes `?:` right-associative.
            let alternative: Expr = self.expression()?;

            return Ok(Expr::Ternary {
                condition: Box::new(expr),
                consequence: Box::new(consequence),
                alternative: Box::new(alternative),
            });
        }

        Ok(expr)
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr: Expr = self.or()?;

        if self.match_token(&TokenType::EQUAL) {
            let equals: Token = self.previous().clone();
            let value: Box<Expr> = Box::new(self.assignment()?);

            return match expr {
                Expr::Variable { id, name } => Ok(Expr::Assignment { id, name, value }),

                Expr::Get { object, name } => Ok(Expr::Set {
                    object,
                    name,
                    value,
                }),

                Expr::SuperGet { id, keyword, name } => Ok(Expr::SuperSet {
                    id,
                    keyword,
                    name,
                    value,
                }),

                Expr::Index { right: Some(_), .. } => {
                    Err(GloxError::parse(&equals, "Cannot assign to slice"))
                }

                target @ Expr::Index { .. } => Ok(Expr::IndexedAssignment {
                    target: Box::new(target),
                    value,
                }),

                _ => Err(GloxError::parse(&equals, "Invalid assignment target")),
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr: Expr = self.and()?;

        while self.match_token(&TokenType::OR) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.and()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr: Expr = self.equality()?;

        while self.match_token(&TokenType::AND) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.equality()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr: Expr = self.comparison()?;

        while self.match_tokens(&[TokenType::BANG_EQUAL, TokenType::EQUAL_EQUAL]) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.comparison()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr: Expr = self.term()?;

        while self.match_tokens(&[
            TokenType::GREATER,
            TokenType::GREATER_EQUAL,
            TokenType::LESS,
            TokenType::LESS_EQUAL,
        ]) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.term()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr: Expr = self.factor()?;

        while self.match_tokens(&[TokenType::MINUS, TokenType::PLUS]) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.factor()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr: Expr = self.unary()?;

        while self.match_tokens(&[TokenType::SLASH, TokenType::STAR]) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.match_tokens(&[TokenType::BANG, TokenType::MINUS]) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary()?;

            return Ok(Expr::Unary {
                operator,
                expr: Box::new(right),
            });
        }

        self.call_index()
    }

    /// Calls, index/slice accesses and property gets chain onto a primary
    /// with equal precedence.
    fn call_index(&mut self) -> ParseResult<Expr> {
        let mut expr: Expr = self.primary()?;

        loop {
            if self.match_token(&TokenType::LEFT_PAREN) {
                expr = self.finish_call(expr)?;
            } else if self.match_token(&TokenType::LEFT_BRACKET) {
                let bracket: Token = self.previous().clone();
                let left: Expr = self.expression()?;

                let right: Option<Box<Expr>> = if self.match_token(&TokenType::COLON) {
                    Some(Box::new(self.expression()?))
                } else {
                    None
                };

                self.consume(&TokenType::RIGHT_BRACKET, "Expect ']' after index.")?;

                expr = Expr::Index {
                    object: Box::new(expr),
                    bracket,
                    left: Box::new(left),
                    right,
                };
            } else if self.match_token(&TokenType::DOT) {
                let name: Token =
                    self.consume(&TokenType::IDENTIFIER, "Expect property name after '.'.")?;

                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments: Vec<Expr> = Vec::new();

        if !self.check(&TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    return Err(GloxError::parse(
                        self.peek(),
                        "Can't have more than 255 arguments.",
                    ));
                }

                arguments.push(self.expression()?);

                if !self.match_token(&TokenType::COMMA) {
                    break;
                }
            }
        }

        let paren: Token = self.consume(&TokenType::RIGHT_PAREN, "Expect ')' after arguments.")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.match_token(&TokenType::FALSE) {
            return Ok(Expr::Literal(Literal::Boolean(false)));
        }

        if self.match_token(&TokenType::TRUE) {
            return Ok(Expr::Literal(Literal::Boolean(true)));
        }

        if self.match_token(&TokenType::NIL) {
            return Ok(Expr::Literal(Literal::Nil));
        }

        if self.match_token(&TokenType::NUMBER(0.0)) {
            if let TokenType::NUMBER(n) = self.previous().token_type {
                return Ok(Expr::Literal(Literal::Number(n)));
            }

            unreachable!("NUMBER token without numeric payload");
        }

        if self.match_token(&TokenType::STRING(String::new())) {
            if let TokenType::STRING(s) = &self.previous().token_type {
                return Ok(Expr::Literal(Literal::String(s.clone())));
            }

            unreachable!("STRING token without string payload");
        }

        if self.match_token(&TokenType::THIS) {
            return Ok(Expr::This {
                id: self.fresh_id(),
                keyword: self.previous().clone(),
            });
        }

        if self.match_token(&TokenType::SUPER) {
            let keyword: Token = self.previous().clone();

            self.consume(&TokenType::DOT, "Expect '.' after 'super'.")?;

            let name: Token =
                self.consume(&TokenType::IDENTIFIER, "Expect superclass method name.")?;

            return Ok(Expr::SuperGet {
                id: self.fresh_id(),
                keyword,
                name,
            });
        }

        if self.match_token(&TokenType::IDENTIFIER) {
            return Ok(Expr::Variable {
                id: self.fresh_id(),
                name: self.previous().clone(),
            });
        }

        if self.match_token(&TokenType::LEFT_PAREN) {
            return self.sequence();
        }

        if self.match_token(&TokenType::LEFT_BRACKET) {
            return self.array_literal();
        }

        if self.match_token(&TokenType::LEFT_BRACE) {
            return self.map_literal();
        }

        Err(GloxError::parse(self.peek(), "Expect expression."))
    }

    /// `()` is the empty sequence; one item is a grouping; several
    /// comma-separated items evaluate left to right, yielding the last.
    fn sequence(&mut self) -> ParseResult<Expr> {
        if self.match_token(&TokenType::RIGHT_PAREN) {
            return Ok(Expr::Sequence(Vec::new()));
        }

        let mut items: Vec<Expr> = vec![self.expression()?];

        while self.match_token(&TokenType::COMMA) {
            items.push(self.expression()?);
        }

        self.consume(&TokenType::RIGHT_PAREN, "Expect ')' after expression.")?;

        if items.len() == 1 {
            let inner: Expr = items.pop().unwrap();

            return Ok(Expr::Grouping(Box::new(inner)));
        }

        Ok(Expr::Sequence(items))
    }

    fn array_literal(&mut self) -> ParseResult<Expr> {
        let mut items: Vec<Expr> = Vec::new();

        if !self.check(&TokenType::RIGHT_BRACKET) {
            loop {
                items.push(self.expression()?);

                if !self.match_token(&TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(&TokenType::RIGHT_BRACKET, "Expect ']' after array literal.")?;

        Ok(Expr::Array(items))
    }

    fn map_literal(&mut self) -> ParseResult<Expr> {
        let mut keys: Vec<Expr> = Vec::new();
        let mut values: Vec<Expr> = Vec::new();

        if !self.check(&TokenType::RIGHT_BRACE) {
            loop {
                keys.push(self.expression()?);

                self.consume(&TokenType::COLON, "Expect ':' after map key.")?;

                values.push(self.expression()?);

                if !self.match_token(&TokenType::COMMA) {
                    break;
                }
            }
        }

        let brace: Token =
            self.consume(&TokenType::RIGHT_BRACE, "Expect '}' after map literal.")?;

        Ok(Expr::Map {
            brace,
            keys,
            values,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Token plumbing
    // ─────────────────────────────────────────────────────────────────────

    fn fresh_id(&mut self) -> ExprId {
        let id: ExprId = self.next_id;

        self.next_id += 1;

        id
    }

    fn match_token(&mut self, token_type: &TokenType) -> bool {
        if self.check(token_type) {
            self.advance();

            return true;
        }

        false
    }

    fn match_tokens(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.match_token(token_type) {
                return true;
            }
        }

        false
    }

    fn check(&self, token_type: &TokenType) -> bool {
        if self.is_at_end() {
            return token_type == &TokenType::EOF;
        }

        &self.peek().token_type == token_type
    }

    /// Lookahead `offset` tokens past the current one; positions beyond the
    /// end read as EOF.
    fn check_at(&self, offset: usize, token_type: &TokenType) -> bool {
        let index: usize = (self.current + offset).min(self.tokens.len() - 1);

        &self.tokens[index].token_type == token_type
    }

    fn consume(&mut self, token_type: &TokenType, message: &str) -> ParseResult<Token> {
        if self.check(token_type) {
            return Ok(self.advance().clone());
        }

        Err(GloxError::parse(self.peek(), message))
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::EOF
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().token_type == TokenType::SEMICOLON {
                return;
            }

            match self.peek().token_type {
                TokenType::CLASS
                | TokenType::FUN
                | TokenType::VAR
                | TokenType::FOR
                | TokenType::IF
                | TokenType::WHILE
                | TokenType::RETURN => return,

                _ => {
                    self.advance();
                }
            }
        }
    }
}
