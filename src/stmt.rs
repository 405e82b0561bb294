use crate::expr::Expr;
use crate::token::Token;

/// Represents an expression statement's data in the language.
#[derive(Debug, PartialEq, Clone)]
pub struct ExpressionData {
    pub expr: Expr,
}

/// Represents a variable declaration's data in the language.
#[derive(Debug, PartialEq, Clone)]
pub struct LetData {
    pub name: Token,
    pub initializer: Option<Expr>,
}

/// Represents a function declaration's data in the language.
/// Struct methods reuse this shape; their first parameter is the receiver.
#[derive(Debug, PartialEq, Clone)]
pub struct FunctionData {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

/// Represents a struct declaration's data in the language.
#[derive(Debug, PartialEq, Clone)]
pub struct StructData {
    pub name: Token,
    pub methods: Vec<FunctionData>,
}

/// Represents an if statement's data in the language.
/// The opening parenthesis is kept for runtime condition diagnostics.
#[derive(Debug, PartialEq, Clone)]
pub struct IfData {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub paren: Token,
}

/// Represents a while statement's data in the language.
#[derive(Debug, PartialEq, Clone)]
pub struct WhileData {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub paren: Token,
}

/// Represents a block statement's data in the language.
#[derive(Debug, PartialEq, Clone)]
pub struct BlockData {
    pub statements: Vec<Stmt>,
}

/// Represents a return statement's data in the language.
#[derive(Debug, PartialEq, Clone)]
pub struct ReturnData {
    pub keyword: Token,
    pub value: Option<Expr>,
}

/// Represents a statement in the language.
///
/// `for` loops have no variant of their own; the parser desugars them into
/// `Block`/`While` combinations.
#[derive(Debug, PartialEq, Clone)]
pub enum Stmt {
    Expression(ExpressionData),
    Let(LetData),
    Function(FunctionData),
    Struct(StructData),
    If(IfData),
    While(WhileData),
    Block(BlockData),
    Return(ReturnData),
}
