//! Source printer.
//!
//! Converts a syntax tree back to source text. Grouping needs no precedence
//! analysis: every parenthesized group survives in the tree as a
//! `SequenceExpression`, so printing nodes in order reproduces the structure.

use crate::ast::*;
use crate::token::format_number;

/// Code generation options.
#[derive(Debug, Clone, Default)]
pub struct CodegenOptions {
    /// Drop optional whitespace and newlines.
    pub minify: bool,
    /// Indent string (default: "  ").
    pub indent: Option<String>,
}

/// The code generator.
pub struct Codegen<'a> {
    program: &'a Program,
    options: CodegenOptions,
    output: String,
    indent_level: usize,
    indent_str: String,
}

impl<'a> Codegen<'a> {
    /// Create a new code generator.
    pub fn new(program: &'a Program, options: CodegenOptions) -> Self {
        let indent_str = options.indent.clone().unwrap_or_else(|| "  ".to_string());
        Self {
            program,
            options,
            output: String::new(),
            indent_level: 0,
            indent_str,
        }
    }

    /// Generate source code.
    pub fn generate(mut self) -> String {
        for (i, stmt) in self.program.body.iter().enumerate() {
            if i > 0 {
                self.emit_newline();
            }
            self.emit_stmt(stmt);
        }
        if !self.options.minify && !self.output.is_empty() {
            self.output.push('\n');
        }
        self.output
    }

    // =========================================================================
    // Output Helpers
    // =========================================================================

    /// Append `s`, separating it from the previous output when the two would
    /// otherwise lex as one token or open a comment.
    fn emit(&mut self, s: &str) {
        if let (Some(last), Some(first)) = (self.output.chars().next_back(), s.chars().next()) {
            let merges = (is_word_char(last) && is_word_char(first))
                || (last == '+' && first == '+')
                || (last == '-' && first == '-')
                || (last == '/' && (first == '/' || first == '*' || is_word_char(first)));
            if merges {
                self.output.push(' ');
            }
        }
        self.output.push_str(s);
    }

    fn emit_space(&mut self) {
        if !self.options.minify {
            self.output.push(' ');
        }
    }

    fn emit_newline(&mut self) {
        if !self.options.minify {
            self.output.push('\n');
            for _ in 0..self.indent_level {
                self.output.push_str(&self.indent_str);
            }
        }
    }

    fn emit_separator(&mut self) {
        self.emit(",");
        self.emit_space();
    }

    // =========================================================================
    // Statement Emission
    // =========================================================================

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Empty(_) => self.emit(";"),
            Stmt::Block(block) => self.emit_block(block),
            Stmt::Expression(stmt) => {
                self.emit_expr(&stmt.expression);
                self.emit(";");
            }
            Stmt::Var(decl) => {
                self.emit_var(decl);
                self.emit(";");
            }
            Stmt::If(stmt) => {
                self.emit_keyword_header("if", &stmt.test);
                self.emit_stmt(&stmt.consequent);
                if let Some(alternate) = &stmt.alternate {
                    self.emit_space();
                    self.emit("else");
                    self.emit_space();
                    self.emit_stmt(alternate);
                }
            }
            Stmt::Debugger(_) => self.emit("debugger;"),
            Stmt::With(stmt) => {
                self.emit_keyword_header("with", &stmt.object);
                self.emit_stmt(&stmt.body);
            }
            Stmt::Return(stmt) => self.emit_jump("return", stmt.argument.as_ref()),
            Stmt::Throw(stmt) => self.emit_jump("throw", stmt.argument.as_ref()),
            Stmt::Break(stmt) => self.emit_label_jump("break", stmt.label.as_ref()),
            Stmt::Continue(stmt) => self.emit_label_jump("continue", stmt.label.as_ref()),
            Stmt::Switch(stmt) => {
                self.emit_keyword_header("switch", &stmt.discriminant);
                self.emit("{");
                self.indent_level += 1;
                for case in &stmt.cases {
                    self.emit_newline();
                    match &case.test {
                        Some(test) => {
                            self.emit("case");
                            self.emit_space();
                            self.emit_expr(test);
                            self.emit(":");
                        }
                        None => self.emit("default:"),
                    }
                    self.indent_level += 1;
                    for stmt in &case.consequent {
                        self.emit_newline();
                        self.emit_stmt(stmt);
                    }
                    self.indent_level -= 1;
                }
                self.indent_level -= 1;
                self.emit_newline();
                self.emit("}");
            }
            Stmt::Try(stmt) => {
                self.emit("try");
                self.emit_space();
                self.emit_block(&stmt.block);
                if let Some(handler) = &stmt.handler {
                    self.emit_space();
                    self.emit("catch");
                    self.emit_space();
                    self.emit("(");
                    self.emit(&handler.param.name);
                    self.emit(")");
                    self.emit_space();
                    self.emit_block(&handler.body);
                }
                if let Some(finalizer) = &stmt.finalizer {
                    self.emit_space();
                    self.emit("finally");
                    self.emit_space();
                    self.emit_block(finalizer);
                }
            }
            Stmt::While(stmt) => {
                self.emit_keyword_header("while", &stmt.test);
                self.emit_stmt(&stmt.body);
            }
            Stmt::DoWhile(stmt) => {
                // No trailing `;`: it would read back as an empty statement.
                self.emit("do");
                self.emit_space();
                self.emit_stmt(&stmt.body);
                self.emit_space();
                self.emit("while");
                self.emit_space();
                self.emit("(");
                self.emit_expr(&stmt.test);
                self.emit(")");
            }
            Stmt::For(stmt) => {
                self.emit("for");
                self.emit_space();
                self.emit("(");
                match &stmt.init {
                    Some(ForInit::Var(decl)) => self.emit_var(decl),
                    Some(ForInit::Expr(expr)) => self.emit_expr(expr),
                    None => {}
                }
                self.emit(";");
                if let Some(test) = &stmt.test {
                    self.emit_space();
                    self.emit_expr(test);
                }
                self.emit(";");
                if let Some(update) = &stmt.update {
                    self.emit_space();
                    self.emit_expr(update);
                }
                self.emit(")");
                self.emit_space();
                self.emit_stmt(&stmt.body);
            }
            Stmt::ForIn(stmt) => {
                self.emit("for");
                self.emit_space();
                self.emit("(");
                match &stmt.left {
                    ForInLeft::Var(decl) => self.emit_var(decl),
                    ForInLeft::Identifier(id) => self.emit(&id.name),
                }
                self.emit_space();
                self.emit("in");
                self.emit_space();
                self.emit_expr(&stmt.right);
                self.emit(")");
                self.emit_space();
                self.emit_stmt(&stmt.body);
            }
            Stmt::Function(decl) => self.emit_function(Some(&decl.id), &decl.params, &decl.body),
            Stmt::Labeled(stmt) => {
                self.emit(&stmt.label.name);
                self.emit(":");
                self.emit_space();
                self.emit_stmt(&stmt.body);
            }
        }
    }

    /// `keyword (expr) `
    fn emit_keyword_header(&mut self, keyword: &str, expr: &Expr) {
        self.emit(keyword);
        self.emit_space();
        self.emit("(");
        self.emit_expr(expr);
        self.emit(")");
        self.emit_space();
    }

    fn emit_jump(&mut self, keyword: &str, argument: Option<&Expr>) {
        self.emit(keyword);
        if let Some(argument) = argument {
            self.emit_space();
            self.emit_expr(argument);
        }
        self.emit(";");
    }

    fn emit_label_jump(&mut self, keyword: &str, label: Option<&Identifier>) {
        self.emit(keyword);
        if let Some(label) = label {
            self.emit(&label.name);
        }
        self.emit(";");
    }

    fn emit_block(&mut self, block: &BlockStatement) {
        self.emit("{");
        if !block.body.is_empty() {
            self.indent_level += 1;
            for stmt in &block.body {
                self.emit_newline();
                self.emit_stmt(stmt);
            }
            self.indent_level -= 1;
            self.emit_newline();
        }
        self.emit("}");
    }

    fn emit_var(&mut self, decl: &VariableDeclaration) {
        self.emit("var");
        for (i, declarator) in decl.declarations.iter().enumerate() {
            if i > 0 {
                self.emit_separator();
            }
            self.emit(&declarator.id.name);
            if let Some(init) = &declarator.init {
                self.emit_space();
                self.emit("=");
                self.emit_space();
                self.emit_expr(init);
            }
        }
    }

    fn emit_function(&mut self, id: Option<&Identifier>, params: &[Identifier], body: &BlockStatement) {
        self.emit("function");
        if let Some(id) = id {
            self.emit(&id.name);
        }
        self.emit("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.emit_separator();
            }
            self.emit(&param.name);
        }
        self.emit(")");
        self.emit_space();
        self.emit_block(body);
    }

    // =========================================================================
    // Expression Emission
    // =========================================================================

    fn emit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Identifier(id) => self.emit(&id.name),
            Expr::Literal(literal) => self.emit_literal(literal),
            Expr::This(_) => self.emit("this"),
            Expr::Array(array) => {
                self.emit("[");
                self.emit_list(&array.elements);
                self.emit("]");
            }
            Expr::Object(object) => {
                self.emit("{");
                for (i, property) in object.properties.iter().enumerate() {
                    if i > 0 {
                        self.emit_separator();
                    }
                    match &property.key {
                        PropertyKey::Identifier(id) => self.emit(&id.name),
                        PropertyKey::Literal(literal) => self.emit_literal(literal),
                    }
                    self.emit(":");
                    self.emit_space();
                    self.emit_expr(&property.value);
                }
                self.emit("}");
            }
            Expr::Function(func) => self.emit_function(func.id.as_ref(), &func.params, &func.body),
            Expr::Unary(unary) => {
                self.emit(unary.operator.as_str());
                self.emit_expr(&unary.arguments);
            }
            Expr::Update(update) => {
                if update.prefix {
                    self.emit(update.operator.as_str());
                    self.emit_expr(&update.arguments);
                } else {
                    self.emit_expr(&update.arguments);
                    self.emit(update.operator.as_str());
                }
            }
            Expr::Binary(binary) => self.emit_infix(&binary.left, binary.operator.as_str(), &binary.right),
            Expr::Logical(logical) => self.emit_infix(&logical.left, logical.operator.as_str(), &logical.right),
            Expr::Assignment(assign) => self.emit_infix(&assign.left, assign.operator.as_str(), &assign.right),
            Expr::Conditional(cond) => {
                self.emit_expr(&cond.test);
                self.emit_space();
                self.emit("?");
                self.emit_space();
                self.emit_expr(&cond.consequent);
                self.emit_space();
                self.emit(":");
                self.emit_space();
                self.emit_expr(&cond.alternate);
            }
            Expr::Member(member) => {
                self.emit_expr(&member.object);
                if member.computed {
                    // `1.a` would lex as a malformed number.
                    if is_integer_literal(&member.object) {
                        self.output.push(' ');
                    }
                    self.emit(".");
                    self.emit_expr(&member.property);
                } else {
                    self.emit("[");
                    self.emit_expr(&member.property);
                    self.emit("]");
                }
            }
            Expr::Call(call) => {
                self.emit_expr(&call.callee);
                self.emit("(");
                self.emit_list(&call.arguments);
                self.emit(")");
            }
            Expr::New(new) => {
                self.emit("new");
                self.emit_space();
                self.emit_expr(&new.callee);
                // Empty parens would read back as a call on the callee's last
                // member, so `new Foo()` prints as `new Foo`.
                if !new.arguments.is_empty() {
                    self.emit("(");
                    self.emit_list(&new.arguments);
                    self.emit(")");
                }
            }
            Expr::Sequence(seq) => {
                self.emit("(");
                self.emit_list(&seq.expressions);
                self.emit(")");
            }
        }
    }

    fn emit_infix(&mut self, left: &Expr, operator: &str, right: &Expr) {
        self.emit_expr(left);
        self.emit_space();
        self.emit(operator);
        self.emit_space();
        self.emit_expr(right);
    }

    fn emit_list(&mut self, items: &[Expr]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.emit_separator();
            }
            self.emit_expr(item);
        }
    }

    fn emit_literal(&mut self, literal: &Literal) {
        if let Some(regex) = &literal.regex {
            self.emit(&regex.pattern);
            self.output.push_str(&regex.flags);
            return;
        }
        match &literal.value {
            LiteralValue::Number(n) => self.emit(&number_literal(*n)),
            LiteralValue::String(s) => self.emit(&quote_string(s)),
            LiteralValue::Boolean(b) => self.emit(if *b { "true" } else { "false" }),
            LiteralValue::Null => self.emit("null"),
            LiteralValue::Undefined => self.emit("undefined"),
            LiteralValue::Regex => {}
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn is_integer_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(literal) => match literal.value {
            LiteralValue::Number(n) => !number_literal(n).contains(['.', 'e']),
            _ => false,
        },
        _ => false,
    }
}

/// Source spelling of a number literal. Values that overflowed to infinity
/// print as a literal that overflows again.
fn number_literal(n: f64) -> String {
    if n.is_infinite() {
        "1e999".to_string()
    } else {
        format_number(n)
    }
}

fn quote_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\u{b}' => result.push_str("\\v"),
            '\u{c}' => result.push_str("\\f"),
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}
