use derive_more::Display;
use serde::Serialize;

pub use cicode_core::{Span, Spanned};

use crate::doc::FunctionDoc;

pub type Identifier = String;

#[salsa::tracked(debug)]
pub struct Program<'db> {
    #[tracked]
    #[returns(ref)]
    pub items: Vec<Item<'db>>,
}

impl<'db> Program<'db> {
    pub fn functions(
        self,
        db: &'db dyn salsa::Database,
    ) -> impl Iterator<Item = FunctionDefinition<'db>> + 'db {
        self.items(db).iter().map(move |item| match item.kind(db) {
            ItemKind::Function(function) => *function,
        })
    }
}

#[salsa::tracked(debug)]
pub struct Item<'db> {
    #[tracked]
    #[returns(ref)]
    pub kind: ItemKind<'db>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, salsa::Update)]
#[non_exhaustive]
pub enum ItemKind<'db> {
    Function(FunctionDefinition<'db>),
}

#[salsa::tracked(debug)]
pub struct FunctionDefinition<'db> {
    #[returns(ref)]
    pub name: Identifier,
    pub name_span: Span,
    pub scope: Scope,
    pub return_type: ReturnType,
    #[returns(ref)]
    pub parameters: Vec<Parameter>,
    #[returns(ref)]
    pub locals: Vec<VariableDeclaration>,
    #[returns(ref)]
    pub body: Block,
    #[returns(ref)]
    pub doc: Option<FunctionDoc>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Scope {
    #[default]
    #[display("PUBLIC")]
    Public,
    #[display("PRIVATE")]
    Private,
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CicodeType {
    #[display("INT")]
    Int,
    #[display("STRING")]
    String,
    #[display("REAL")]
    Real,
    #[display("QUALITY")]
    Quality,
    #[display("TIMESTAMP")]
    Timestamp,
    #[display("BOOL")]
    Bool,
    #[display("OBJECT")]
    Object,
    #[display("LONG")]
    Long,
}

impl CicodeType {
    /// Map a canonical type keyword (`INT`, `STRING`, ...) to its type.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "INT" => Self::Int,
            "STRING" => Self::String,
            "REAL" => Self::Real,
            "QUALITY" => Self::Quality,
            "TIMESTAMP" => Self::Timestamp,
            "BOOL" => Self::Bool,
            "OBJECT" => Self::Object,
            "LONG" => Self::Long,
            _ => return None,
        })
    }
}

/// Declared result of a function. An omitted return type means `VOID`.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash, Serialize)]
pub enum ReturnType {
    #[default]
    #[display("VOID")]
    #[serde(rename = "VOID")]
    Void,
    #[display("{_0}")]
    #[serde(untagged)]
    Value(CicodeType),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Parameter {
    pub name: Identifier,
    pub ty: CicodeType,
    pub default: Option<Literal>,
    #[serde(skip)]
    pub span: Span,
}

#[derive(Clone, Debug, Display, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Literal {
    #[display("{_0}")]
    Number(i64),
    #[display("{_0:?}")]
    String(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariableDeclaration {
    pub ty: CicodeType,
    pub variables: Vec<Variable>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Variable {
    pub name: Identifier,
    pub initializer: Option<Spanned<Initializer>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Initializer {
    Literal(Literal),
    Variable(Identifier),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Block {
    pub statements: Vec<Spanned<Statement>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Statement {
    Assign(Assignment),
    Call(CallExpression),
    If(IfStatement),
    Return(Option<Spanned<Expr>>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Assignment {
    pub target: Spanned<Identifier>,
    pub value: Spanned<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IfStatement {
    pub condition: Spanned<Condition>,
    pub then_branch: Block,
    pub else_branch: Option<Block>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Number(i64),
    String(String),
    Variable(Identifier),
    Negate(Box<Spanned<Expr>>),
    Binary(BinaryExpression),
    Call(CallExpression),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BinaryExpression {
    pub left: Box<Spanned<Expr>>,
    pub operator: BinaryOperator,
    pub right: Box<Spanned<Expr>>,
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    #[display("+")]
    Add,
    #[display("-")]
    Subtract,
    #[display("*")]
    Multiply,
    #[display("/")]
    Divide,
    #[display("MOD")]
    Mod,
    #[display("BITAND")]
    BitAnd,
    #[display("BITOR")]
    BitOr,
    #[display("BITXOR")]
    BitXor,
}

impl BinaryOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => Self::Add,
            "-" => Self::Subtract,
            "*" => Self::Multiply,
            "/" => Self::Divide,
            "MOD" => Self::Mod,
            "BITAND" => Self::BitAnd,
            "BITOR" => Self::BitOr,
            "BITXOR" => Self::BitXor,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallExpression {
    pub function: Identifier,
    pub arguments: Vec<Spanned<Expr>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
    Expr(Spanned<Expr>),
    Not(Box<Spanned<Condition>>),
    Binary(ConditionExpression),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConditionExpression {
    pub left: Box<Spanned<Condition>>,
    pub operator: ConditionOperator,
    pub right: Box<Spanned<Condition>>,
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum ConditionOperator {
    #[display("=")]
    Eq,
    #[display("<>")]
    NotEq,
    #[display("<")]
    Lt,
    #[display(">")]
    Gt,
    #[display("<=")]
    LtEq,
    #[display(">=")]
    GtEq,
    #[display("AND")]
    And,
    #[display("OR")]
    Or,
}

impl ConditionOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "=" => Self::Eq,
            "<>" => Self::NotEq,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::LtEq,
            ">=" => Self::GtEq,
            "AND" => Self::And,
            "OR" => Self::Or,
            _ => return None,
        })
    }
}

impl Block {
    /// Every statement in this block and its nested branches, depth first.
    pub fn walk(&self) -> Vec<&Spanned<Statement>> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Spanned<Statement>>) {
        for statement in &self.statements {
            out.push(statement);
            if let (Statement::If(if_statement), _) = statement {
                if_statement.then_branch.collect(out);
                if let Some(else_branch) = &if_statement.else_branch {
                    else_branch.collect(out);
                }
            }
        }
    }
}
