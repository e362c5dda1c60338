//! Syntax tree node types.
//!
//! One struct per grammar production, wrapped by the [`Stmt`] and [`Expr`]
//! sum types. Every node serializes as a JSON object whose first two keys are
//! `type` and `loc`; the remaining keys are the production's fields. Field and
//! type names are part of the output contract and are kept verbatim, including
//! the historical spellings `Programs`, `binaryExpression`, `exression`,
//! `Discriminant` and `arguments` on unary/update nodes.

use serde::{Serialize, Serializer};

use crate::span::Loc;
use crate::token::Operator;

/// The root of a parsed script.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Programs")]
pub struct Program {
    pub loc: Loc,
    pub body: Vec<Stmt>,
}

impl Program {
    /// Serialize the tree as single-line JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize the tree as indented JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// =============================================================================
// Statements
// =============================================================================

/// A statement node. Payloads are boxed so a node is two words wide.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Stmt {
    Empty(Box<EmptyStatement>),
    Block(Box<BlockStatement>),
    Expression(Box<ExpressionStatement>),
    Var(Box<VariableDeclaration>),
    If(Box<IfStatement>),
    Debugger(Box<DebuggerStatement>),
    With(Box<WithStatement>),
    Return(Box<ReturnStatement>),
    Throw(Box<ThrowStatement>),
    Break(Box<BreakStatement>),
    Continue(Box<ContinueStatement>),
    Switch(Box<SwitchStatement>),
    Try(Box<TryStatement>),
    While(Box<WhileStatement>),
    DoWhile(Box<DoWhileStatement>),
    For(Box<ForStatement>),
    ForIn(Box<ForInStatement>),
    Function(Box<FunctionDeclaration>),
    Labeled(Box<LabeledStatement>),
}

impl Stmt {
    pub fn loc(&self) -> &Loc {
        match self {
            Stmt::Empty(s) => &s.loc,
            Stmt::Block(s) => &s.loc,
            Stmt::Expression(s) => &s.loc,
            Stmt::Var(s) => &s.loc,
            Stmt::If(s) => &s.loc,
            Stmt::Debugger(s) => &s.loc,
            Stmt::With(s) => &s.loc,
            Stmt::Return(s) => &s.loc,
            Stmt::Throw(s) => &s.loc,
            Stmt::Break(s) => &s.loc,
            Stmt::Continue(s) => &s.loc,
            Stmt::Switch(s) => &s.loc,
            Stmt::Try(s) => &s.loc,
            Stmt::While(s) => &s.loc,
            Stmt::DoWhile(s) => &s.loc,
            Stmt::For(s) => &s.loc,
            Stmt::ForIn(s) => &s.loc,
            Stmt::Function(s) => &s.loc,
            Stmt::Labeled(s) => &s.loc,
        }
    }

    /// The production name as it appears in the `type` key.
    pub fn type_name(&self) -> &'static str {
        match self {
            Stmt::Empty(_) => "EmptyStatement",
            Stmt::Block(_) => "BlockStatement",
            Stmt::Expression(_) => "ExpressionStatement",
            Stmt::Var(_) => "VariableDeclaration",
            Stmt::If(_) => "IfStatement",
            Stmt::Debugger(_) => "DebuggerStatement",
            Stmt::With(_) => "WithStatement",
            Stmt::Return(_) => "ReturnStatement",
            Stmt::Throw(_) => "ThrowStatement",
            Stmt::Break(_) => "BreakStatement",
            Stmt::Continue(_) => "ContinueStatement",
            Stmt::Switch(_) => "SwitchStatement",
            Stmt::Try(_) => "TryStatement",
            Stmt::While(_) => "WhileStatement",
            Stmt::DoWhile(_) => "DoWhileStatement",
            Stmt::For(_) => "ForStatement",
            Stmt::ForIn(_) => "ForInStatement",
            Stmt::Function(_) => "FunctionDeclaration",
            Stmt::Labeled(_) => "LabeledStatement",
        }
    }
}

/// `From` conversions that box a node into its sum type.
macro_rules! impl_from_node {
    ($sum:ident: $($variant:ident($node:ident)),+ $(,)?) => {
        $(
            impl From<$node> for $sum {
                fn from(node: $node) -> Self {
                    $sum::$variant(Box::new(node))
                }
            }
        )+
    };
}

impl_from_node!(Stmt:
    Empty(EmptyStatement),
    Block(BlockStatement),
    Expression(ExpressionStatement),
    Var(VariableDeclaration),
    If(IfStatement),
    Debugger(DebuggerStatement),
    With(WithStatement),
    Return(ReturnStatement),
    Throw(ThrowStatement),
    Break(BreakStatement),
    Continue(ContinueStatement),
    Switch(SwitchStatement),
    Try(TryStatement),
    While(WhileStatement),
    DoWhile(DoWhileStatement),
    For(ForStatement),
    ForIn(ForInStatement),
    Function(FunctionDeclaration),
    Labeled(LabeledStatement),
);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct EmptyStatement {
    pub loc: Loc,
}

/// `{ ... }`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct BlockStatement {
    pub loc: Loc,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ExpressionStatement {
    pub loc: Loc,
    #[serde(rename = "exression")]
    pub expression: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Var,
}

/// `var a = 1, b`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct VariableDeclaration {
    pub loc: Loc,
    pub kind: VariableKind,
    pub declarations: Vec<VariableDeclarator>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct VariableDeclarator {
    pub loc: Loc,
    pub id: Identifier,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct IfStatement {
    pub loc: Loc,
    pub test: Expr,
    pub consequent: Box<Stmt>,
    pub alternate: Option<Box<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct DebuggerStatement {
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct WithStatement {
    pub loc: Loc,
    pub object: Expr,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ReturnStatement {
    pub loc: Loc,
    pub argument: Option<Expr>,
}

/// The argument is always present; it stays nullable on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ThrowStatement {
    pub loc: Loc,
    pub argument: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct BreakStatement {
    pub loc: Loc,
    pub label: Option<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ContinueStatement {
    pub loc: Loc,
    pub label: Option<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct SwitchStatement {
    pub loc: Loc,
    #[serde(rename = "Discriminant")]
    pub discriminant: Expr,
    pub cases: Vec<SwitchCase>,
}

/// A `case` clause, or `default` when `test` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct SwitchCase {
    pub loc: Loc,
    pub test: Option<Expr>,
    pub consequent: Vec<Stmt>,
}

/// At least one of `handler` and `finalizer` is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct TryStatement {
    pub loc: Loc,
    pub block: BlockStatement,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<BlockStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct CatchClause {
    pub loc: Loc,
    pub param: Identifier,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct WhileStatement {
    pub loc: Loc,
    pub test: Expr,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct DoWhileStatement {
    pub loc: Loc,
    pub body: Box<Stmt>,
    pub test: Expr,
}

/// Initializer of a counted `for` loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ForInit {
    Var(VariableDeclaration),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ForStatement {
    pub loc: Loc,
    pub init: Option<ForInit>,
    pub test: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Box<Stmt>,
}

/// Binding side of a `for-in` loop: a single-declarator `var` or a bare
/// identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ForInLeft {
    Var(VariableDeclaration),
    Identifier(Identifier),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ForInStatement {
    pub loc: Loc,
    pub left: ForInLeft,
    pub right: Expr,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct FunctionDeclaration {
    pub loc: Loc,
    pub id: Identifier,
    pub params: Vec<Identifier>,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct LabeledStatement {
    pub loc: Loc,
    pub body: Box<Stmt>,
    pub label: Identifier,
}

// =============================================================================
// Expressions
// =============================================================================

/// An expression node. Payloads are boxed like [`Stmt`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Expr {
    Identifier(Box<Identifier>),
    Literal(Box<Literal>),
    This(Box<ThisExpression>),
    Array(Box<ArrayExpression>),
    Object(Box<ObjectExpression>),
    Function(Box<FunctionExpression>),
    Unary(Box<UnaryExpression>),
    Update(Box<UpdateExpression>),
    Binary(Box<BinaryExpression>),
    Logical(Box<LogicalExpression>),
    Assignment(Box<AssignmentExpression>),
    Conditional(Box<ConditionalExpression>),
    Member(Box<MemberExpression>),
    Call(Box<CallExpression>),
    New(Box<NewExpression>),
    Sequence(Box<SequenceExpression>),
}

impl Expr {
    pub fn loc(&self) -> &Loc {
        match self {
            Expr::Identifier(e) => &e.loc,
            Expr::Literal(e) => &e.loc,
            Expr::This(e) => &e.loc,
            Expr::Array(e) => &e.loc,
            Expr::Object(e) => &e.loc,
            Expr::Function(e) => &e.loc,
            Expr::Unary(e) => &e.loc,
            Expr::Update(e) => &e.loc,
            Expr::Binary(e) => &e.loc,
            Expr::Logical(e) => &e.loc,
            Expr::Assignment(e) => &e.loc,
            Expr::Conditional(e) => &e.loc,
            Expr::Member(e) => &e.loc,
            Expr::Call(e) => &e.loc,
            Expr::New(e) => &e.loc,
            Expr::Sequence(e) => &e.loc,
        }
    }

    /// The production name as it appears in the `type` key.
    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::Identifier(_) => "Identifier",
            Expr::Literal(_) => "Literal",
            Expr::This(_) => "ThisExpression",
            Expr::Array(_) => "ArrayExpression",
            Expr::Object(_) => "ObjectExpression",
            Expr::Function(_) => "FunctionExpression",
            Expr::Unary(_) => "UnaryExpression",
            Expr::Update(_) => "UpdateExpression",
            Expr::Binary(_) => "binaryExpression",
            Expr::Logical(_) => "LogicalExpression",
            Expr::Assignment(_) => "AssignmentExpression",
            Expr::Conditional(_) => "ConditionalExpression",
            Expr::Member(_) => "MemberExpression",
            Expr::Call(_) => "CallExpression",
            Expr::New(_) => "NewExpression",
            Expr::Sequence(_) => "SequenceExpression",
        }
    }

    /// Whether the expression may be assigned to or updated: an identifier,
    /// a member access, or either of those wrapped in a one-element group.
    pub fn is_valid_target(&self) -> bool {
        match self {
            Expr::Identifier(_) | Expr::Member(_) => true,
            Expr::Sequence(seq) => match seq.expressions.as_slice() {
                [only] => only.is_valid_target(),
                _ => false,
            },
            _ => false,
        }
    }
}

impl_from_node!(Expr:
    Identifier(Identifier),
    Literal(Literal),
    This(ThisExpression),
    Array(ArrayExpression),
    Object(ObjectExpression),
    Function(FunctionExpression),
    Unary(UnaryExpression),
    Update(UpdateExpression),
    Binary(BinaryExpression),
    Logical(LogicalExpression),
    Assignment(AssignmentExpression),
    Conditional(ConditionalExpression),
    Member(MemberExpression),
    Call(CallExpression),
    New(NewExpression),
    Sequence(SequenceExpression),
);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Identifier {
    pub loc: Loc,
    pub name: String,
}

/// A literal. Regex literals also carry their source form in `regex`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Literal {
    pub loc: Loc,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<RegexLiteral>,
    #[serde(skip_serializing_if = "LiteralValue::is_undefined")]
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
    /// Serializes as an empty object.
    Regex,
}

impl LiteralValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, LiteralValue::Undefined)
    }
}

/// Largest integer a double represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl Serialize for LiteralValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LiteralValue::Number(n) if !n.is_finite() => serializer.serialize_none(),
            LiteralValue::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            LiteralValue::Number(n) => serializer.serialize_f64(*n),
            LiteralValue::String(s) => serializer.serialize_str(s),
            LiteralValue::Boolean(b) => serializer.serialize_bool(*b),
            LiteralValue::Null | LiteralValue::Undefined => serializer.serialize_unit(),
            LiteralValue::Regex => {
                use serde::ser::SerializeMap;
                serializer.serialize_map(Some(0))?.end()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegexLiteral {
    /// Pattern including the delimiting slashes.
    pub pattern: String,
    pub flags: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ThisExpression {
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ArrayExpression {
    pub loc: Loc,
    pub elements: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ObjectExpression {
    pub loc: Loc,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyKey {
    Literal(Literal),
    Identifier(Identifier),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Init,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Property {
    pub loc: Loc,
    pub key: PropertyKey,
    pub value: Expr,
    pub kind: PropertyKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct FunctionExpression {
    pub loc: Loc,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Identifier>,
    pub params: Vec<Identifier>,
    pub body: BlockStatement,
}

/// `!a`, `-a`, `typeof a`, ...
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct UnaryExpression {
    pub loc: Loc,
    pub operator: Operator,
    pub arguments: Box<Expr>,
    pub prefix: bool,
}

/// `++a`, `a--`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct UpdateExpression {
    pub loc: Loc,
    pub operator: Operator,
    pub arguments: Box<Expr>,
    pub prefix: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "binaryExpression")]
pub struct BinaryExpression {
    pub loc: Loc,
    pub operator: Operator,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct LogicalExpression {
    pub loc: Loc,
    pub operator: Operator,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct AssignmentExpression {
    pub loc: Loc,
    pub operator: Operator,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ConditionalExpression {
    pub loc: Loc,
    pub test: Box<Expr>,
    pub consequent: Box<Expr>,
    pub alternate: Box<Expr>,
}

/// Member access. `computed` is `true` for `a.b` and `false` for `a[b]`.
///
/// The property after `.` is read as an expression at member priority, so
/// `a.b(c)` nests the call inside the property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct MemberExpression {
    pub loc: Loc,
    pub object: Box<Expr>,
    pub property: Box<Expr>,
    pub computed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct CallExpression {
    pub loc: Loc,
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct NewExpression {
    pub loc: Loc,
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
}

/// Comma-joined expressions, and every parenthesized group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct SequenceExpression {
    pub loc: Loc,
    pub expressions: Vec<Expr>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Position;
    use serde_json::json;

    fn loc(source: &str) -> Loc {
        Loc {
            source: source.to_string(),
            start: Position::new(1, 0),
            end: Position::new(1, source.len()),
        }
    }

    fn literal(value: LiteralValue) -> serde_json::Value {
        serde_json::to_value(Literal { loc: loc("x"), regex: None, value }).unwrap()
    }

    #[test]
    fn test_type_and_loc_come_first() {
        let node = Identifier { loc: loc("foo"), name: "foo".into() };
        let text = serde_json::to_string(&node).unwrap();
        assert!(text.starts_with(r#"{"type":"Identifier","loc":{"source":"foo","start":{"line":1,"column":0}"#));
    }

    #[test]
    fn test_literal_values() {
        assert_eq!(literal(LiteralValue::Number(31.0))["value"], json!(31));
        assert!(literal(LiteralValue::Number(31.0))["value"].is_i64());
        assert_eq!(literal(LiteralValue::Number(1.5))["value"], json!(1.5));
        assert_eq!(literal(LiteralValue::Number(f64::INFINITY))["value"], json!(null));
        assert_eq!(literal(LiteralValue::Null)["value"], json!(null));
        assert_eq!(literal(LiteralValue::Boolean(false))["value"], json!(false));
        assert_eq!(literal(LiteralValue::Regex)["value"], json!({}));
        assert!(literal(LiteralValue::Undefined).get("value").is_none());
    }

    #[test]
    fn test_regex_precedes_value() {
        let regex = RegexLiteral { pattern: "/a/".into(), flags: "g".into() };
        let node = Literal { loc: loc("/a/g"), regex: Some(regex), value: LiteralValue::Regex };
        let text = serde_json::to_string(&node).unwrap();
        assert!(text.ends_with(r#""regex":{"pattern":"/a/","flags":"g"},"value":{}}"#), "{text}");
    }

    #[test]
    fn test_wire_names() {
        let one = || Box::new(Expr::from(Literal { loc: loc("1"), regex: None, value: LiteralValue::Number(1.0) }));
        let binary = Expr::from(BinaryExpression {
            loc: loc("1+1"),
            operator: Operator::Plus,
            left: one(),
            right: one(),
        });
        let stmt = Stmt::from(ExpressionStatement { loc: loc("1+1"), expression: binary });
        let value = serde_json::to_value(&stmt).unwrap();
        assert_eq!(value["type"], "ExpressionStatement");
        assert_eq!(value["exression"]["type"], "binaryExpression");
        assert_eq!(value["exression"]["operator"], "+");
    }

    #[test]
    fn test_nodes_are_two_words() {
        let words = 2 * std::mem::size_of::<usize>();
        assert_eq!(std::mem::size_of::<Expr>(), words);
        assert_eq!(std::mem::size_of::<Stmt>(), words);
    }

    #[test]
    fn test_valid_targets() {
        let ident = Expr::from(Identifier { loc: loc("a"), name: "a".into() });
        assert!(ident.is_valid_target());

        let grouped = Expr::from(SequenceExpression { loc: loc("(a)"), expressions: vec![ident.clone()] });
        assert!(grouped.is_valid_target());

        let pair = Expr::from(SequenceExpression { loc: loc("(a,a)"), expressions: vec![ident.clone(), ident] });
        assert!(!pair.is_valid_target());

        let this = Expr::from(ThisExpression { loc: loc("this") });
        assert!(!this.is_valid_target());
    }
}
