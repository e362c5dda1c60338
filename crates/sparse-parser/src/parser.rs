//! Recursive descent parser.
//!
//! Statements are dispatched on the current keyword; expressions are read by
//! precedence climbing over the table in [`crate::priority`]. The parser never
//! buffers tokens: it holds the current token plus the end offset of the
//! previous one, and tells the lexer after every token whether an operator
//! may follow.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::ast::*;
use crate::error::{messages, ErrorKind, ParseError};
use crate::lexer::Lexer;
use crate::priority::{self, infix_priority, Fixity};
use crate::span::{contains_line_break, Loc, Position, Span};
use crate::token::{Keyword, Operator, Token, TokenKind};

/// Default bound on statement plus expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Parser configuration options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Deepest statement and expression nesting accepted before the parse
    /// fails instead of growing the call stack further.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserOptions {
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Where a node started: byte offset plus its resolved position.
#[derive(Debug, Clone, Copy)]
struct Marker {
    offset: usize,
    position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelKind {
    Loop,
    Switch,
}

/// An entry on the active label stack.
#[derive(Debug, Clone)]
struct Label {
    /// `None` for the implicit entry of a loop or switch.
    name: Option<String>,
    /// `None` for a named label on anything other than a loop or switch.
    kind: Option<LabelKind>,
    /// Offset of the statement a named label decorates.
    statement_start: Option<usize>,
}

impl Label {
    fn implicit(kind: LabelKind) -> Self {
        Self {
            name: None,
            kind: Some(kind),
            statement_start: None,
        }
    }
}

/// Flags carried into the operands of one expression.
#[derive(Debug, Clone, Copy, Default)]
struct ExprContext {
    /// Head of a counted `for`: a bare `in` ends the expression.
    in_for: bool,
}

/// The parser.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    /// Current token.
    current: Token,
    /// End offset of the last consumed token.
    last_token_end: usize,
    labels: Vec<Label>,
    options: ParserOptions,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser.
    pub fn new(source: &'a str, options: ParserOptions) -> Self {
        Self {
            lexer: Lexer::new(source),
            current: Token::new(TokenKind::Eof, Span::default()),
            last_token_end: 0,
            labels: Vec::new(),
            options,
            depth: 0,
        }
    }

    /// Parse the entire source into a [`Program`].
    pub fn parse(mut self) -> Result<Program, ParseError> {
        debug!(bytes = self.lexer.source().len(), "parse started");
        let result = self.parse_program();
        match &result {
            Ok(program) => debug!(statements = program.body.len(), "parse finished"),
            Err(err) => debug!(kind = ?err.kind, offset = err.offset, error = %err, "parse failed"),
        }
        result
    }

    // =========================================================================
    // Token Handling
    // =========================================================================

    /// Move to the next token.
    fn next(&mut self, expect_operator: bool) -> Result<(), ParseError> {
        let token = self.lexer.next_token(expect_operator)?;
        self.last_token_end = self.current.span.end;
        self.current = token;
        Ok(())
    }

    fn is(&self, kind: &TokenKind) -> bool {
        self.current.kind == *kind
    }

    fn is_keyword(&self, keyword: Keyword) -> bool {
        self.current.kind.is_keyword(keyword)
    }

    fn is_operator(&self, operator: Operator) -> bool {
        self.current.kind.is_operator(operator)
    }

    /// Fail unless the current token is `kind`.
    fn expect(&self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.is(kind) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Require `kind` and move past it.
    fn eat(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        self.expect(kind)?;
        self.next(false)
    }

    fn raise(&self, offset: usize, kind: ErrorKind, template: &str, args: &[&str]) -> ParseError {
        self.lexer.raise(offset, kind, template, args)
    }

    fn unexpected(&self) -> ParseError {
        self.raise(
            self.current.span.start,
            ErrorKind::Syntax,
            messages::UNEXPECTED_TOKEN,
            &[self.current.kind.label(), &self.current.kind.value_text()],
        )
    }

    fn start(&self) -> Marker {
        let offset = self.current.span.start;
        Marker {
            offset,
            position: self.lexer.line_index().position(offset),
        }
    }

    /// Location from `start` to the end of the last consumed token.
    fn finish(&self, start: Marker) -> Loc {
        let end = self.last_token_end.max(start.offset);
        Loc {
            source: self.lexer.source()[start.offset..end].to_string(),
            start: start.position,
            end: self.lexer.line_index().position(end),
        }
    }

    /// Whether the current statement may end here. Consumes a `;`.
    fn is_end(&mut self) -> Result<bool, ParseError> {
        match self.current.kind {
            TokenKind::Eof | TokenKind::RBrace => Ok(true),
            TokenKind::Semicolon => {
                self.next(false)?;
                Ok(true)
            }
            _ => {
                let gap = &self.lexer.source()[self.last_token_end..self.current.span.start];
                Ok(contains_line_break(gap))
            }
        }
    }

    fn check_end(&mut self) -> Result<(), ParseError> {
        if self.is_end()? {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(self.raise(
                self.current.span.start,
                ErrorKind::Syntax,
                messages::NESTING_TOO_DEEP,
                &[&self.options.max_depth.to_string()],
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // =========================================================================
    // Program Parsing
    // =========================================================================

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        self.next(false)?;
        let start = self.start();
        let mut body = Vec::new();
        while !self.is(&TokenKind::Eof) {
            body.push(self.parse_statement()?);
        }
        Ok(Program {
            loc: self.finish(start),
            body,
        })
    }

    // =========================================================================
    // Statement Parsing
    // =========================================================================

    /// Parse a statement.
    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        self.enter()?;
        let result = self.parse_statement_inner();
        self.leave();
        result
    }

    fn parse_statement_inner(&mut self) -> Result<Stmt, ParseError> {
        let start = self.start();
        trace!(offset = start.offset, token = self.current.kind.label(), "statement");

        match self.current.kind {
            TokenKind::Keyword(keyword) => match keyword {
                Keyword::If => self.parse_if(start),
                Keyword::Debugger => self.parse_debugger(start),
                Keyword::With => self.parse_with(start),
                Keyword::Return => self.parse_return(start),
                Keyword::Throw => self.parse_throw(start),
                Keyword::Break => self.parse_break_continue(start, true),
                Keyword::Continue => self.parse_break_continue(start, false),
                Keyword::Switch => self.parse_switch(start),
                Keyword::Try => self.parse_try(start),
                Keyword::While => self.parse_while(start),
                Keyword::Do => self.parse_do_while(start),
                Keyword::Var => self.parse_var(start, false).map(Stmt::from),
                Keyword::For => self.parse_for(start),
                Keyword::Function => self.parse_function_declaration(start),
                other => Err(self.raise(
                    start.offset,
                    ErrorKind::Syntax,
                    messages::UNKNOWN_KEYWORD,
                    &[other.as_str()],
                )),
            },
            TokenKind::Semicolon => {
                self.next(false)?;
                Ok(Stmt::from(EmptyStatement {
                    loc: self.finish(start),
                }))
            }
            TokenKind::LBrace => self.parse_block(start).map(Stmt::from),
            _ => self.parse_expression_statement(start),
        }
    }

    /// `{ ... }` starting at the current `{`.
    fn parse_block(&mut self, start: Marker) -> Result<BlockStatement, ParseError> {
        self.eat(&TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.is(&TokenKind::RBrace) {
            body.push(self.parse_statement()?);
        }
        self.next(false)?;
        Ok(BlockStatement {
            loc: self.finish(start),
            body,
        })
    }

    fn read_block(&mut self) -> Result<BlockStatement, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let start = self.start();
        self.parse_block(start)
    }

    /// `( expr )` in a statement header.
    fn read_paren_expression(&mut self) -> Result<Expr, ParseError> {
        self.eat(&TokenKind::LParen)?;
        let expression = self.read_maybe_sequence(false)?;
        self.expect(&TokenKind::RParen)?;
        self.next(false)?;
        Ok(expression)
    }

    fn parse_if(&mut self, start: Marker) -> Result<Stmt, ParseError> {
        self.next(false)?;
        let test = self.read_paren_expression()?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.is_keyword(Keyword::Else) {
            self.next(false)?;
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::from(IfStatement {
            loc: self.finish(start),
            test,
            consequent,
            alternate,
        }))
    }

    fn parse_debugger(&mut self, start: Marker) -> Result<Stmt, ParseError> {
        self.next(false)?;
        self.check_end()?;
        Ok(Stmt::from(DebuggerStatement {
            loc: self.finish(start),
        }))
    }

    fn parse_with(&mut self, start: Marker) -> Result<Stmt, ParseError> {
        self.next(false)?;
        let object = self.read_paren_expression()?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::from(WithStatement {
            loc: self.finish(start),
            object,
            body,
        }))
    }

    /// Optional argument of `return`/`throw`, up to the statement end.
    fn read_argument(&mut self) -> Result<Option<Expr>, ParseError> {
        self.next(false)?;
        if self.is_end()? {
            return Ok(None);
        }
        let argument = self.read_maybe_sequence(false)?;
        self.check_end()?;
        Ok(Some(argument))
    }

    fn parse_return(&mut self, start: Marker) -> Result<Stmt, ParseError> {
        let argument = self.read_argument()?;
        Ok(Stmt::from(ReturnStatement {
            loc: self.finish(start),
            argument,
        }))
    }

    fn parse_throw(&mut self, start: Marker) -> Result<Stmt, ParseError> {
        let argument = self.read_argument()?;
        if argument.is_none() {
            return Err(self.raise(
                self.current.span.start,
                ErrorKind::Syntax,
                messages::THROW_WITHOUT_ARGUMENT,
                &[],
            ));
        }
        Ok(Stmt::from(ThrowStatement {
            loc: self.finish(start),
            argument,
        }))
    }

    fn parse_break_continue(&mut self, start: Marker, is_break: bool) -> Result<Stmt, ParseError> {
        self.next(false)?;
        let label = if self.is_end()? {
            None
        } else {
            let label = self.read_identifier()?;
            self.check_end()?;
            Some(label)
        };

        let target = label.as_ref().map(|l| l.name.as_str());
        let found = self.labels.iter().any(|entry| {
            let name_matches = target.is_none() || entry.name.as_deref() == target;
            let kind_matches = entry.kind.is_some() && (is_break || entry.kind == Some(LabelKind::Loop));
            name_matches && (kind_matches || (target.is_some() && is_break))
        });
        if !found {
            let keyword = if is_break { "break" } else { "continue" };
            return Err(self.raise(
                start.offset,
                ErrorKind::Syntax,
                messages::INVALID_JUMP_TARGET,
                &[keyword],
            ));
        }

        let loc = self.finish(start);
        Ok(if is_break {
            Stmt::from(BreakStatement { loc, label })
        } else {
            Stmt::from(ContinueStatement { loc, label })
        })
    }

    fn parse_switch(&mut self, start: Marker) -> Result<Stmt, ParseError> {
        self.next(false)?;
        let discriminant = self.read_paren_expression()?;
        self.eat(&TokenKind::LBrace)?;

        self.labels.push(Label::implicit(LabelKind::Switch));
        let mut cases = Vec::new();
        let mut has_default = false;
        while !self.is(&TokenKind::RBrace) {
            let case_start = self.current.span.start;
            let case = self.parse_switch_case()?;
            if case.test.is_none() {
                if has_default {
                    return Err(self.raise(case_start, ErrorKind::Syntax, messages::DUPLICATE_DEFAULT, &[]));
                }
                has_default = true;
            }
            cases.push(case);
        }
        self.labels.pop();
        self.next(false)?;

        Ok(Stmt::from(SwitchStatement {
            loc: self.finish(start),
            discriminant,
            cases,
        }))
    }

    fn parse_switch_case(&mut self) -> Result<SwitchCase, ParseError> {
        let start = self.start();
        let test = match self.current.kind {
            TokenKind::Keyword(Keyword::Case) => {
                self.next(false)?;
                Some(self.read_maybe_sequence(false)?)
            }
            TokenKind::Keyword(Keyword::Default) => {
                self.next(false)?;
                None
            }
            _ => return Err(self.unexpected()),
        };
        self.eat(&TokenKind::Colon)?;

        let mut consequent = Vec::new();
        while !self.is(&TokenKind::RBrace)
            && !self.is_keyword(Keyword::Case)
            && !self.is_keyword(Keyword::Default)
        {
            consequent.push(self.parse_statement()?);
        }
        Ok(SwitchCase {
            loc: self.finish(start),
            test,
            consequent,
        })
    }

    fn parse_try(&mut self, start: Marker) -> Result<Stmt, ParseError> {
        self.next(false)?;
        let block = self.read_block()?;
        let handler = if self.is_keyword(Keyword::Catch) {
            Some(self.parse_catch_clause()?)
        } else {
            None
        };
        if handler.is_none() {
            self.expect(&TokenKind::Keyword(Keyword::Finally))?;
        }
        let finalizer = if self.is_keyword(Keyword::Finally) {
            self.next(false)?;
            Some(self.read_block()?)
        } else {
            None
        };
        Ok(Stmt::from(TryStatement {
            loc: self.finish(start),
            block,
            handler,
            finalizer,
        }))
    }

    fn parse_catch_clause(&mut self) -> Result<CatchClause, ParseError> {
        let start = self.start();
        self.next(false)?;
        self.eat(&TokenKind::LParen)?;
        let param = self.read_identifier()?;
        self.eat(&TokenKind::RParen)?;
        let body = self.read_block()?;
        Ok(CatchClause {
            loc: self.finish(start),
            param,
            body,
        })
    }

    /// Body of a loop, with an implicit loop label in scope.
    fn parse_loop_body(&mut self) -> Result<Box<Stmt>, ParseError> {
        self.labels.push(Label::implicit(LabelKind::Loop));
        let body = self.parse_statement()?;
        self.labels.pop();
        Ok(Box::new(body))
    }

    fn parse_while(&mut self, start: Marker) -> Result<Stmt, ParseError> {
        self.next(false)?;
        let test = self.read_paren_expression()?;
        let body = self.parse_loop_body()?;
        Ok(Stmt::from(WhileStatement {
            loc: self.finish(start),
            test,
            body,
        }))
    }

    /// `do ... while (...)` takes no end check; a trailing `;` is left to
    /// become its own empty statement.
    fn parse_do_while(&mut self, start: Marker) -> Result<Stmt, ParseError> {
        self.next(false)?;
        let body = self.parse_loop_body()?;
        self.eat(&TokenKind::Keyword(Keyword::While))?;
        let test = self.read_paren_expression()?;
        Ok(Stmt::from(DoWhileStatement {
            loc: self.finish(start),
            body,
            test,
        }))
    }

    /// `var` declarations. Inside a `for` header the end check is skipped and
    /// initializers stop at a bare `in`.
    fn parse_var(&mut self, start: Marker, in_for: bool) -> Result<VariableDeclaration, ParseError> {
        self.next(false)?;
        let mut declarations = vec![self.parse_declarator(in_for)?];
        while self.is(&TokenKind::Comma) {
            self.next(false)?;
            declarations.push(self.parse_declarator(in_for)?);
        }
        if !in_for {
            self.check_end()?;
        }
        Ok(VariableDeclaration {
            loc: self.finish(start),
            kind: VariableKind::Var,
            declarations,
        })
    }

    fn parse_declarator(&mut self, in_for: bool) -> Result<VariableDeclarator, ParseError> {
        let start = self.start();
        let id = self.read_identifier()?;
        let init = if self.is_operator(Operator::Eq) {
            self.next(false)?;
            Some(self.read_expression(0, ExprContext { in_for })?)
        } else {
            None
        };
        Ok(VariableDeclarator {
            loc: self.finish(start),
            id,
            init,
        })
    }

    /// `for (init; test; update)` or `for (left in right)`.
    fn parse_for(&mut self, start: Marker) -> Result<Stmt, ParseError> {
        self.next(false)?;
        self.eat(&TokenKind::LParen)?;

        if self.is_keyword(Keyword::Var) {
            let var_start = self.start();
            let declaration = self.parse_var(var_start, true)?;
            if self.is(&TokenKind::Semicolon) {
                return self.parse_for_rest(start, Some(ForInit::Var(declaration)));
            }
            if self.is_operator(Operator::In) {
                return self.parse_for_in_rest(start, ForInLeft::Var(declaration));
            }
            return Err(self.unexpected());
        }

        if self.is(&TokenKind::Semicolon) {
            return self.parse_for_rest(start, None);
        }

        match self.read_maybe_sequence(true)? {
            Expr::Identifier(id) if self.is_operator(Operator::In) => {
                self.parse_for_in_rest(start, ForInLeft::Identifier(*id))
            }
            init => self.parse_for_rest(start, Some(ForInit::Expr(init))),
        }
    }

    fn parse_for_rest(&mut self, start: Marker, init: Option<ForInit>) -> Result<Stmt, ParseError> {
        self.eat(&TokenKind::Semicolon)?;
        let test = if self.is(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.read_maybe_sequence(false)?)
        };
        self.eat(&TokenKind::Semicolon)?;
        let update = if self.is(&TokenKind::RParen) {
            None
        } else {
            Some(self.read_maybe_sequence(false)?)
        };
        self.eat(&TokenKind::RParen)?;
        let body = self.parse_loop_body()?;
        Ok(Stmt::from(ForStatement {
            loc: self.finish(start),
            init,
            test,
            update,
            body,
        }))
    }

    fn parse_for_in_rest(&mut self, start: Marker, left: ForInLeft) -> Result<Stmt, ParseError> {
        if let ForInLeft::Var(declaration) = &left {
            if declaration.declarations.len() > 1 {
                return Err(self.raise(
                    start.offset,
                    ErrorKind::Syntax,
                    messages::FOR_IN_MULTIPLE_BINDINGS,
                    &[],
                ));
            }
        }
        self.eat(&TokenKind::Operator(Operator::In))?;
        let right = self.read_maybe_sequence(false)?;
        self.eat(&TokenKind::RParen)?;
        let body = self.parse_loop_body()?;
        Ok(Stmt::from(ForInStatement {
            loc: self.finish(start),
            left,
            right,
            body,
        }))
    }

    fn parse_function_declaration(&mut self, start: Marker) -> Result<Stmt, ParseError> {
        self.next(false)?;
        let id = self.read_identifier()?;
        let params = self.read_function_params()?;
        let body = self.read_block()?;
        Ok(Stmt::from(FunctionDeclaration {
            loc: self.finish(start),
            id,
            params,
            body,
        }))
    }

    /// An expression statement, or a labeled statement when the expression is
    /// a lone identifier followed by `:`.
    fn parse_expression_statement(&mut self, start: Marker) -> Result<Stmt, ParseError> {
        match self.read_maybe_sequence(false)? {
            Expr::Identifier(label) if self.is(&TokenKind::Colon) => {
                self.next(false)?;
                self.parse_labeled(start, *label)
            }
            expression => {
                self.check_end()?;
                Ok(Stmt::from(ExpressionStatement {
                    loc: self.finish(start),
                    expression,
                }))
            }
        }
    }

    fn parse_labeled(&mut self, start: Marker, label: Identifier) -> Result<Stmt, ParseError> {
        if self.labels.iter().any(|l| l.name.as_deref() == Some(label.name.as_str())) {
            return Err(self.raise(
                start.offset,
                ErrorKind::Syntax,
                messages::DUPLICATE_LABEL,
                &[&label.name],
            ));
        }

        let kind = match self.current.kind {
            TokenKind::Keyword(Keyword::For | Keyword::While | Keyword::Do) => Some(LabelKind::Loop),
            TokenKind::Keyword(Keyword::Switch) => Some(LabelKind::Switch),
            _ => None,
        };
        let statement_start = self.current.span.start;

        // Labels stacked directly on this one decorate the same statement.
        for entry in self.labels.iter_mut().rev() {
            if entry.statement_start != Some(start.offset) {
                break;
            }
            entry.statement_start = Some(statement_start);
            entry.kind = kind;
        }

        self.labels.push(Label {
            name: Some(label.name.clone()),
            kind,
            statement_start: Some(statement_start),
        });
        let body = Box::new(self.parse_statement()?);
        self.labels.pop();

        Ok(Stmt::from(LabeledStatement {
            loc: self.finish(start),
            body,
            label,
        }))
    }

    // =========================================================================
    // Expression Parsing
    // =========================================================================

    /// Comma-joined expressions; a single expression is returned unwrapped.
    fn read_maybe_sequence(&mut self, in_for: bool) -> Result<Expr, ParseError> {
        let start = self.start();
        let ctx = ExprContext { in_for };
        let first = self.read_expression(0, ctx)?;
        if !self.is(&TokenKind::Comma) {
            return Ok(first);
        }

        let mut expressions = vec![first];
        while self.is(&TokenKind::Comma) {
            self.next(false)?;
            expressions.push(self.read_expression(0, ctx)?);
        }
        Ok(Expr::from(SequenceExpression {
            loc: self.finish(start),
            expressions,
        }))
    }

    /// Read an operand, then fold operators binding tighter than
    /// `min_priority`.
    fn read_expression(&mut self, min_priority: u8, ctx: ExprContext) -> Result<Expr, ParseError> {
        self.enter()?;
        let result = self.read_expression_inner(min_priority, ctx);
        self.leave();
        result
    }

    fn read_expression_inner(&mut self, min_priority: u8, ctx: ExprContext) -> Result<Expr, ParseError> {
        let start = self.start();
        let mut node = self.read_primary()?;

        while let Some(priority) = infix_priority(&self.current.kind) {
            if priority <= min_priority || (ctx.in_for && self.is_operator(Operator::In)) {
                break;
            }
            node = self.read_infix(node, start, priority, ctx)?;
        }
        Ok(node)
    }

    fn read_primary(&mut self) -> Result<Expr, ParseError> {
        match self.current.kind {
            TokenKind::LParen => self.read_group().map(Expr::from),
            TokenKind::LBracket => self.read_array().map(Expr::from),
            TokenKind::Operator(Operator::New) => self.read_new().map(Expr::from),
            TokenKind::Operator(op) => self.read_prefix(op),
            _ if self.current.kind.is_literal() => self.read_literal().map(Expr::from),
            TokenKind::Identifier(_) => self.read_identifier().map(Expr::from),
            TokenKind::This => {
                let start = self.start();
                self.next(true)?;
                Ok(Expr::from(ThisExpression {
                    loc: self.finish(start),
                }))
            }
            TokenKind::Keyword(Keyword::Function) => self.read_function_expression().map(Expr::from),
            TokenKind::LBrace => self.read_object().map(Expr::from),
            _ => Err(self.raise(
                self.current.span.start,
                ErrorKind::Syntax,
                messages::UNEXPECTED_TOKEN_KIND,
                &[self.current.kind.label()],
            )),
        }
    }

    fn read_infix(&mut self, left: Expr, start: Marker, priority: u8, ctx: ExprContext) -> Result<Expr, ParseError> {
        let left = Box::new(left);
        let op = match self.current.kind {
            TokenKind::LParen => {
                let arguments = self.read_call_arguments()?;
                return Ok(Expr::from(CallExpression {
                    loc: self.finish(start),
                    callee: left,
                    arguments,
                }));
            }
            TokenKind::LBracket => {
                let property = Box::new(self.read_bracket_expression()?);
                return Ok(Expr::from(MemberExpression {
                    loc: self.finish(start),
                    object: left,
                    property,
                    computed: false,
                }));
            }
            TokenKind::Operator(op) => op,
            _ => return Err(self.unexpected()),
        };

        if op.is_binary() {
            self.next(false)?;
            let right = Box::new(self.read_expression(priority, ctx)?);
            Ok(Expr::from(BinaryExpression {
                loc: self.finish(start),
                operator: op,
                left,
                right,
            }))
        } else if op.is_assignment() {
            self.check_target(&left, start.offset, true)?;
            self.next(false)?;
            let right = Box::new(self.read_expression(priority - 1, ctx)?);
            Ok(Expr::from(AssignmentExpression {
                loc: self.finish(start),
                operator: op,
                left,
                right,
            }))
        } else if op.is_logical() {
            self.next(false)?;
            let right = Box::new(self.read_expression(priority, ctx)?);
            Ok(Expr::from(LogicalExpression {
                loc: self.finish(start),
                operator: op,
                left,
                right,
            }))
        } else if op == Operator::Dot {
            self.next(false)?;
            let property = Box::new(self.read_expression(priority, ctx)?);
            Ok(Expr::from(MemberExpression {
                loc: self.finish(start),
                object: left,
                property,
                computed: true,
            }))
        } else if op == Operator::Question {
            self.next(false)?;
            let consequent = Box::new(self.read_expression(0, ctx)?);
            self.eat(&TokenKind::Colon)?;
            let alternate = Box::new(self.read_expression(0, ctx)?);
            Ok(Expr::from(ConditionalExpression {
                loc: self.finish(start),
                test: left,
                consequent,
                alternate,
            }))
        } else if op.is_update() {
            self.check_target(&left, start.offset, false)?;
            self.next(true)?;
            Ok(Expr::from(UpdateExpression {
                loc: self.finish(start),
                operator: op,
                arguments: left,
                prefix: false,
            }))
        } else {
            Err(self.raise(
                self.current.span.start,
                ErrorKind::Syntax,
                messages::UNKNOWN_OPERATOR,
                &[op.as_str()],
            ))
        }
    }

    /// Assignment and update operands must be an identifier or member access,
    /// possibly inside a single pair of parentheses.
    fn check_target(&self, target: &Expr, offset: usize, assign: bool) -> Result<(), ParseError> {
        if target.is_valid_target() {
            return Ok(());
        }
        let template = if assign {
            messages::INVALID_ASSIGNMENT_TARGET
        } else {
            messages::INVALID_UPDATE_TARGET
        };
        Err(self.raise(offset, ErrorKind::Reference, template, &[]))
    }

    /// A parenthesized group. Always a sequence, even with one member.
    fn read_group(&mut self) -> Result<SequenceExpression, ParseError> {
        let start = self.start();
        self.eat(&TokenKind::LParen)?;
        let mut expressions = vec![self.read_expression(0, ExprContext::default())?];
        while self.is(&TokenKind::Comma) {
            self.next(false)?;
            expressions.push(self.read_expression(0, ExprContext::default())?);
        }
        self.expect(&TokenKind::RParen)?;
        self.next(true)?;
        Ok(SequenceExpression {
            loc: self.finish(start),
            expressions,
        })
    }

    /// `[ expr ]` after an object.
    fn read_bracket_expression(&mut self) -> Result<Expr, ParseError> {
        self.eat(&TokenKind::LBracket)?;
        let expression = self.read_maybe_sequence(false)?;
        self.expect(&TokenKind::RBracket)?;
        self.next(true)?;
        Ok(expression)
    }

    /// Comma-separated expressions up to `close`, which is consumed with
    /// operator context.
    fn read_list(&mut self, close: &TokenKind) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        if !self.is(close) {
            items.push(self.read_expression(0, ExprContext::default())?);
            while self.is(&TokenKind::Comma) {
                self.next(false)?;
                items.push(self.read_expression(0, ExprContext::default())?);
            }
        }
        self.expect(close)?;
        self.next(true)?;
        Ok(items)
    }

    fn read_array(&mut self) -> Result<ArrayExpression, ParseError> {
        let start = self.start();
        self.next(false)?;
        let elements = self.read_list(&TokenKind::RBracket)?;
        Ok(ArrayExpression {
            loc: self.finish(start),
            elements,
        })
    }

    fn read_call_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.next(false)?;
        self.read_list(&TokenKind::RParen)
    }

    /// `new callee(args)`. A call read as the callee donates its parts.
    fn read_new(&mut self) -> Result<NewExpression, ParseError> {
        let start = self.start();
        self.next(false)?;
        let operand = self.read_expression(
            priority::priority(Operator::New, Fixity::Prefix) - 1,
            ExprContext::default(),
        )?;
        let (callee, arguments) = match operand {
            Expr::Call(call) => {
                let CallExpression { callee, arguments, .. } = *call;
                (callee, arguments)
            }
            other => (Box::new(other), Vec::new()),
        };
        Ok(NewExpression {
            loc: self.finish(start),
            callee,
            arguments,
        })
    }

    fn read_prefix(&mut self, op: Operator) -> Result<Expr, ParseError> {
        let start = self.start();
        if !op.is_prefix() {
            return Err(self.raise(
                start.offset,
                ErrorKind::Syntax,
                messages::UNEXPECTED_OPERATOR,
                &[op.as_str()],
            ));
        }
        self.next(false)?;

        let operand_start = self.current.span.start;
        let arguments = Box::new(self.read_expression(
            priority::priority(op, Fixity::Prefix),
            ExprContext::default(),
        )?);

        if op.is_update() {
            self.check_target(&arguments, operand_start, false)?;
            Ok(Expr::from(UpdateExpression {
                loc: self.finish(start),
                operator: op,
                arguments,
                prefix: true,
            }))
        } else {
            Ok(Expr::from(UnaryExpression {
                loc: self.finish(start),
                operator: op,
                arguments,
                prefix: true,
            }))
        }
    }

    fn read_literal(&mut self) -> Result<Literal, ParseError> {
        let start = self.start();
        let (value, regex) = match &self.current.kind {
            TokenKind::Number(n) => (LiteralValue::Number(*n), None),
            TokenKind::String(s) => (LiteralValue::String(s.clone()), None),
            TokenKind::Regex { pattern, flags } => (
                LiteralValue::Regex,
                Some(RegexLiteral {
                    pattern: pattern.clone(),
                    flags: flags.clone(),
                }),
            ),
            TokenKind::True => (LiteralValue::Boolean(true), None),
            TokenKind::False => (LiteralValue::Boolean(false), None),
            TokenKind::Null => (LiteralValue::Null, None),
            TokenKind::Undefined => (LiteralValue::Undefined, None),
            _ => return Err(self.unexpected()),
        };
        self.next(true)?;
        Ok(Literal {
            loc: self.finish(start),
            regex,
            value,
        })
    }

    fn read_identifier(&mut self) -> Result<Identifier, ParseError> {
        let start = self.start();
        let name = match &self.current.kind {
            TokenKind::Identifier(name) => name.clone(),
            _ => return Err(self.unexpected()),
        };
        self.next(true)?;
        Ok(Identifier {
            loc: self.finish(start),
            name,
        })
    }

    fn read_function_expression(&mut self) -> Result<FunctionExpression, ParseError> {
        let start = self.start();
        self.next(false)?;
        let id = if matches!(self.current.kind, TokenKind::Identifier(_)) {
            Some(self.read_identifier()?)
        } else {
            None
        };
        let params = self.read_function_params()?;
        let body = self.read_block()?;
        Ok(FunctionExpression {
            loc: self.finish(start),
            id,
            params,
            body,
        })
    }

    fn read_function_params(&mut self) -> Result<Vec<Identifier>, ParseError> {
        self.eat(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.is(&TokenKind::RParen) {
            params.push(self.read_identifier()?);
            while self.is(&TokenKind::Comma) {
                self.next(false)?;
                params.push(self.read_identifier()?);
            }
        }
        self.expect(&TokenKind::RParen)?;
        self.next(true)?;
        Ok(params)
    }

    fn read_object(&mut self) -> Result<ObjectExpression, ParseError> {
        let start = self.start();
        self.next(false)?;
        let mut properties = Vec::new();
        if !self.is(&TokenKind::RBrace) {
            properties.push(self.read_property()?);
            while self.is(&TokenKind::Comma) {
                self.next(false)?;
                properties.push(self.read_property()?);
            }
        }
        self.expect(&TokenKind::RBrace)?;
        self.next(true)?;
        Ok(ObjectExpression {
            loc: self.finish(start),
            properties,
        })
    }

    fn read_property(&mut self) -> Result<Property, ParseError> {
        let start = self.start();
        let key = match self.current.kind {
            TokenKind::Identifier(_) => PropertyKey::Identifier(self.read_identifier()?),
            _ if self.current.kind.is_literal() => PropertyKey::Literal(self.read_literal()?),
            _ => return Err(self.unexpected()),
        };
        self.eat(&TokenKind::Colon)?;
        let value = self.read_expression(0, ExprContext::default())?;
        Ok(Property {
            loc: self.finish(start),
            key,
            value,
            kind: PropertyKind::Init,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Program, ParseError> {
        Parser::new(source, ParserOptions::default()).parse()
    }

    fn parse_error(source: &str) -> ParseError {
        match parse(source) {
            Ok(program) => panic!("expected {source:?} to fail, got {program:?}"),
            Err(err) => err,
        }
    }

    /// The expression of the first statement.
    fn expr(source: &str) -> Expr {
        match parse(source).unwrap().body.into_iter().next() {
            Some(Stmt::Expression(stmt)) => stmt.expression,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn first(source: &str) -> Stmt {
        parse(source).unwrap().body.into_iter().next().unwrap()
    }

    fn name(expr: &Expr) -> &str {
        match expr {
            Expr::Identifier(id) => &id.name,
            other => panic!("expected identifier, got {other:?}"),
        }
    }

    fn number(expr: &Expr) -> f64 {
        match expr {
            Expr::Literal(literal) => match literal.value {
                LiteralValue::Number(n) => n,
                _ => panic!("expected number, got {literal:?}"),
            },
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence() {
        let Expr::Binary(add) = expr("1 + 2 * 3") else { panic!() };
        assert_eq!(add.operator, Operator::Plus);
        assert_eq!(number(&add.left), 1.0);
        let Expr::Binary(mul) = *add.right else { panic!() };
        assert_eq!(mul.operator, Operator::Star);
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let Expr::Assignment(outer) = expr("a = b = 1") else { panic!() };
        assert_eq!(name(&outer.left), "a");
        let Expr::Assignment(inner) = *outer.right else { panic!() };
        assert_eq!(name(&inner.left), "b");
        assert_eq!(number(&inner.right), 1.0);
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let Expr::Binary(outer) = expr("1 - 2 - 3") else { panic!() };
        assert_eq!(number(&outer.right), 3.0);
        let Expr::Binary(inner) = *outer.left else { panic!() };
        assert_eq!(number(&inner.left), 1.0);
        assert_eq!(number(&inner.right), 2.0);
        assert_eq!(inner.loc.source, "1 - 2");
    }

    #[test]
    fn test_division_after_identifier() {
        let Expr::Binary(div) = expr("a / b") else { panic!() };
        assert_eq!(div.operator, Operator::Slash);
    }

    #[test]
    fn test_regex_after_return() {
        let Stmt::Return(ret) = first("return /x/") else { panic!() };
        let Some(Expr::Literal(literal)) = ret.argument else { panic!() };
        assert_eq!(literal.value, LiteralValue::Regex);
        let regex = literal.regex.unwrap();
        assert_eq!(regex.pattern, "/x/");
        assert_eq!(regex.flags, "");
    }

    #[test]
    fn test_regex_after_statement_header() {
        let Stmt::If(stmt) = first("if (a) /b/.test(c)") else { panic!() };
        assert!(matches!(*stmt.consequent, Stmt::Expression(_)));
    }

    #[test]
    fn test_statement_termination() {
        assert_eq!(parse("a\nb").unwrap().body.len(), 2);
        assert_eq!(parse("a; b").unwrap().body.len(), 2);
        assert_eq!(parse("a + \n b").unwrap().body.len(), 1);
        assert_eq!(parse("{ a }").unwrap().body.len(), 1);

        let err = parse_error("a b");
        assert_eq!(err.message, "Unexpected token: name(b)");
        assert_eq!(err.position, Position::new(1, 2));
    }

    #[test]
    fn test_comment_line_break_ends_statement() {
        assert_eq!(parse("a /*\n*/ b").unwrap().body.len(), 2);
        assert!(parse("a /* */ b").is_err());
    }

    #[test]
    fn test_continue_requires_loop() {
        let err = parse_error("continue");
        assert_eq!(err.message, "Unexpected continue or can't find valid label");
        assert_eq!(err.kind, ErrorKind::Syntax);

        parse("outer: for(;;) { continue outer; }").unwrap();
        parse_error("outer: for(;;) { continue; } continue outer;");
    }

    #[test]
    fn test_break_targets() {
        parse("while (a) { break; }").unwrap();
        parse("switch (a) { case 1: break; }").unwrap();
        parse("block: { break block; }").unwrap();
        parse("for (;;) { switch (a) { default: continue; } }").unwrap();
        parse_error("break");
        parse_error("block: { continue block; }");
        parse_error("block: { break; }");
        parse_error("switch (a) { case 1: continue; }");
    }

    #[test]
    fn test_stacked_labels_share_kind() {
        parse("a: b: for (;;) { continue a; }").unwrap();
        parse("a: b: while (x) { continue b; }").unwrap();
        parse_error("a: b: { continue a; }");
    }

    #[test]
    fn test_duplicate_label() {
        let err = parse_error("a: { a: x; }");
        assert_eq!(err.message, "Label 'a' is already declared");
        assert_eq!(err.position, Position::new(1, 5));
        parse("a: x; a: y;").unwrap();
    }

    #[test]
    fn test_for_in_with_var() {
        let Stmt::ForIn(stmt) = first("for (var i in obj) {}") else { panic!() };
        assert!(matches!(stmt.left, ForInLeft::Var(_)));
        assert_eq!(name(&stmt.right), "obj");
    }

    #[test]
    fn test_for_in_with_identifier() {
        let Stmt::ForIn(stmt) = first("for (key in obj) {}") else { panic!() };
        assert!(matches!(stmt.left, ForInLeft::Identifier(ref id) if id.name == "key"));
    }

    #[test]
    fn test_counted_for() {
        let Stmt::For(stmt) = first("for (var i = 0; i < 10; i++) {}") else { panic!() };
        assert!(matches!(stmt.init, Some(ForInit::Var(_))));
        assert!(matches!(stmt.test, Some(Expr::Binary(_))));
        assert!(matches!(stmt.update, Some(Expr::Update(_))));

        let Stmt::For(empty) = first("for (;;) {}") else { panic!() };
        assert!(empty.init.is_none() && empty.test.is_none() && empty.update.is_none());

        let Stmt::For(with_in) = first("for (a = (b in c); a; ) {}") else { panic!() };
        assert!(matches!(with_in.init, Some(ForInit::Expr(Expr::Assignment(_)))));
    }

    #[test]
    fn test_for_in_rejects_multiple_bindings() {
        let err = parse_error("for (var a, b in obj) {}");
        assert_eq!(err.message, messages::FOR_IN_MULTIPLE_BINDINGS);
    }

    #[test]
    fn test_numeric_literals() {
        assert_eq!(number(&expr("0x1F")), 31.0);
        assert_eq!(number(&expr("010")), 8.0);
        assert_eq!(number(&expr("089")), 89.0);
        assert_eq!(number(&expr("1.5e3")), 1500.0);
    }

    #[test]
    fn test_switch_default() {
        let Stmt::Switch(stmt) = first("switch (x) { case 1: a; default: b; case 2: }") else { panic!() };
        assert_eq!(stmt.cases.len(), 3);
        assert!(stmt.cases[1].test.is_none());

        let err = parse_error("switch (x) { default: a; default: b; }");
        assert_eq!(err.message, messages::DUPLICATE_DEFAULT);
    }

    #[test]
    fn test_parens_always_make_a_sequence() {
        let Expr::Sequence(seq) = expr("(a)") else { panic!() };
        assert_eq!(seq.expressions.len(), 1);
        assert_eq!(seq.loc.source, "(a)");

        let Expr::Sequence(seq) = expr("a, b") else { panic!() };
        assert_eq!(seq.expressions.len(), 2);
        assert!(matches!(expr("a"), Expr::Identifier(_)));
    }

    #[test]
    fn test_member_access() {
        let Expr::Member(dot) = expr("a.b") else { panic!() };
        assert!(dot.computed);

        let Expr::Member(bracket) = expr("a[b]") else { panic!() };
        assert!(!bracket.computed);

        // The property after `.` keeps reading a call.
        let Expr::Member(member) = expr("a.b(c)") else { panic!() };
        assert!(matches!(*member.property, Expr::Call(_)));

        let Expr::Member(chain) = expr("a.b.c") else { panic!() };
        assert_eq!(name(&chain.property), "c");
        assert!(matches!(*chain.object, Expr::Member(_)));
    }

    #[test]
    fn test_new_hoists_call() {
        let Expr::New(with_args) = expr("new Foo(1, 2)") else { panic!() };
        assert_eq!(name(&with_args.callee), "Foo");
        assert_eq!(with_args.arguments.len(), 2);

        let Expr::New(bare) = expr("new Foo") else { panic!() };
        assert_eq!(name(&bare.callee), "Foo");
        assert!(bare.arguments.is_empty());
    }

    #[test]
    fn test_call_and_conditional() {
        let Expr::Call(call) = expr("f(a, b)(c)") else { panic!() };
        assert_eq!(call.arguments.len(), 1);
        assert!(matches!(*call.callee, Expr::Call(_)));

        let Expr::Conditional(cond) = expr("a ? b : c ? d : e") else { panic!() };
        assert!(matches!(*cond.alternate, Expr::Conditional(_)));

        let err = parse_error("a ? b c");
        assert_eq!(err.message, "Unexpected token: name(c)");
    }

    #[test]
    fn test_unary_and_update() {
        let Expr::Unary(neg) = expr("-a.b") else { panic!() };
        assert_eq!(neg.operator, Operator::Minus);
        assert!(neg.prefix);
        assert!(matches!(*neg.arguments, Expr::Member(_)));

        let Expr::Update(pre) = expr("++a") else { panic!() };
        assert!(pre.prefix);
        let Expr::Update(post) = expr("a--") else { panic!() };
        assert!(!post.prefix);

        let Expr::Unary(typeof_) = expr("typeof a") else { panic!() };
        assert_eq!(typeof_.operator, Operator::Typeof);
    }

    #[test]
    fn test_postfix_update_allows_division() {
        let Expr::Binary(div) = expr("a++ / 2") else { panic!() };
        assert_eq!(div.operator, Operator::Slash);
    }

    #[test]
    fn test_logical_expression() {
        let Expr::Logical(or) = expr("a || b && c") else { panic!() };
        assert_eq!(or.operator, Operator::PipePipe);
        assert!(matches!(*or.right, Expr::Logical(_)));
    }

    #[test]
    fn test_invalid_targets() {
        let err = parse_error("1 = a");
        assert!(err.is_reference());
        assert_eq!(err.message, messages::INVALID_ASSIGNMENT_TARGET);

        let err = parse_error("x;\n(a, b)++");
        assert!(err.is_reference());
        assert_eq!(err.message, messages::INVALID_UPDATE_TARGET);
        assert_eq!(err.position, Position::new(2, 0));

        parse("(a) = 1").unwrap();
        parse("a.b += 1").unwrap();
        assert!(parse_error("++this").is_reference());
    }

    #[test]
    fn test_operator_errors() {
        assert_eq!(parse_error("* a").message, "Unexpected operator: *");
        assert_eq!(parse_error("a ! b").message, "Unknown operator: !");
        assert_eq!(parse_error("1 +").message, "Unexpected token: eof");
    }

    #[test]
    fn test_literals_and_collections() {
        let Expr::Array(array) = expr("[1, 'a', null]") else { panic!() };
        assert_eq!(array.elements.len(), 3);

        let Expr::Sequence(seq) = expr("({ a: 1, 'b': 2, 3: c })") else { panic!() };
        let Expr::Object(object) = &seq.expressions[0] else { panic!() };
        assert_eq!(object.properties.len(), 3);
        assert!(matches!(object.properties[1].key, PropertyKey::Literal(_)));

        parse_error("[1, ]");
        parse_error("({ a })");
    }

    #[test]
    fn test_functions() {
        let Stmt::Function(decl) = first("function add(a, b) { return a + b; }") else { panic!() };
        assert_eq!(decl.id.name, "add");
        assert_eq!(decl.params.len(), 2);
        assert_eq!(decl.body.body.len(), 1);

        let Expr::Assignment(assign) = expr("f = function () {}") else { panic!() };
        let Expr::Function(func) = *assign.right else { panic!() };
        assert!(func.id.is_none());

        parse_error("function (a) {}");
        parse_error("function f(a, 1) {}");
    }

    #[test]
    fn test_try_statement() {
        let Stmt::Try(stmt) = first("try { a } catch (e) { b } finally { c }") else { panic!() };
        assert_eq!(stmt.handler.unwrap().param.name, "e");
        assert!(stmt.finalizer.is_some());

        parse("try {} finally {}").unwrap();
        let err = parse_error("try {} x");
        assert_eq!(err.message, "Unexpected token: name(x)");
        parse_error("try a; catch (e) {}");
        parse_error("try {} catch {}");
    }

    #[test]
    fn test_throw_needs_argument() {
        assert_eq!(parse_error("throw;").message, messages::THROW_WITHOUT_ARGUMENT);
        parse("throw new Error('x')").unwrap();
    }

    #[test]
    fn test_do_while_leaves_semicolon() {
        let program = parse("do { a } while (b);").unwrap();
        assert_eq!(program.body.len(), 2);
        assert!(matches!(program.body[1], Stmt::Empty(_)));
    }

    #[test]
    fn test_misc_statements() {
        assert!(matches!(first("debugger"), Stmt::Debugger(_)));
        assert!(matches!(first("with (a) b"), Stmt::With(_)));
        assert!(matches!(first(";"), Stmt::Empty(_)));
        let Stmt::If(stmt) = first("if (a) b; else c") else { panic!() };
        assert!(stmt.alternate.is_some());

        let Stmt::Var(var) = first("var a = 1, b") else { panic!() };
        assert_eq!(var.declarations.len(), 2);
        assert!(var.declarations[1].init.is_none());
    }

    #[test]
    fn test_unknown_keyword() {
        assert_eq!(parse_error("else a").message, "Unknown keyword: else");
    }

    #[test]
    fn test_program_span() {
        let program = parse("  a;\n  b  ").unwrap();
        assert_eq!(program.loc.source, "a;\n  b");
        assert_eq!(program.loc.start, Position::new(1, 2));
        assert_eq!(program.loc.end, Position::new(2, 3));

        let empty = parse("   ").unwrap();
        assert!(empty.body.is_empty());
        assert_eq!(empty.loc.source, "");
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}a{}", "(".repeat(300), ")".repeat(300));
        let err = parse_error(&deep);
        assert_eq!(err.message, "Maximum nesting depth of 128 exceeded");

        let options = ParserOptions::default().with_max_depth(4);
        assert!(Parser::new("((a))", options).parse().is_ok());
        assert!(Parser::new("((((a))))", options).parse().is_err());
    }

    /// `levels` copies of `open`, the leaf, then `levels` copies of `close`.
    fn nested(prefix: &str, open: &str, leaf: &str, close: &str, levels: usize) -> String {
        format!("{prefix}{}{leaf}{}", open.repeat(levels), close.repeat(levels))
    }

    #[test]
    fn test_nesting_at_the_limit_fits_a_default_thread_stack() {
        // No stack size set: the thread gets the platform default.
        let handle = std::thread::Builder::new()
            .spawn(|| {
                let limit = DEFAULT_MAX_DEPTH;
                let shapes = [
                    ("x = ", "{a: ", "1", "}", limit - 3),
                    ("", "[", "1", "]", limit - 2),
                    ("", "(", "1", ")", limit - 2),
                    ("x = ", "!", "a", "", limit - 3),
                    ("", "if (a) ", "x", "", limit - 2),
                    ("", "{", "x", "}", limit - 2),
                    ("x = ", "function () { return ", "1", " }", (limit - 3) / 2),
                ];
                for (prefix, open, leaf, close, levels) in shapes {
                    let source = nested(prefix, open, leaf, close, levels);
                    if let Err(err) = parse(&source) {
                        panic!("{open:?} x {levels} failed: {err}");
                    }
                    let err = parse_error(&nested(prefix, open, leaf, close, levels + 1));
                    assert_eq!(err.message, format!("Maximum nesting depth of {limit} exceeded"));
                }
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_lexical_errors_propagate() {
        let err = parse_error("var s = 'open");
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert_eq!(err.position, Position::new(1, 8));
    }
}
