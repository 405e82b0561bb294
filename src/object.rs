use std::cell::RefCell;
use std::fmt::{self, Display};
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::function::{Builtin, Function, Method};
use crate::interpreter::Interpreter;
use crate::literal::Literal;
use crate::structs::{Struct, StructInstance};
use crate::token::Token;

/// Represents a value that can be stored in a variable or returned from a
/// function. This is an enum that wraps all the possible types of values in
/// the language.
#[derive(Debug, Clone)]
pub enum Object {
    None,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Builtin(Builtin),
    Function(Rc<Function>),
    Method(Rc<RefCell<Method>>),
    Struct(Rc<RefCell<Struct>>),
    Instance(Rc<RefCell<StructInstance>>),
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::None, Object::None) => true,
            (Object::String(left), Object::String(right)) => left == right,
            (Object::Integer(left), Object::Integer(right)) => left == right,
            (Object::Float(left), Object::Float(right)) => left == right,
            (Object::Boolean(left), Object::Boolean(right)) => left == right,
            (Object::Builtin(left), Object::Builtin(right)) => left.name == right.name,
            (Object::Function(left), Object::Function(right)) => Rc::ptr_eq(left, right),
            (Object::Method(left), Object::Method(right)) => Rc::ptr_eq(left, right),
            (Object::Struct(left), Object::Struct(right)) => Rc::ptr_eq(left, right),
            (Object::Instance(left), Object::Instance(right)) => Rc::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl From<Literal> for Object {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::None => Object::None,
            Literal::Bool(value) => Object::Boolean(value),
            Literal::String(value) => Object::String(value),
            Literal::Integer(value) => Object::Integer(value),
            Literal::Float(value) => Object::Float(value),
        }
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::None => write!(f, "none"),
            Object::String(value) => write!(f, "{value}"),
            Object::Integer(value) => write!(f, "{value}"),
            Object::Float(value) => write!(f, "{value}"),
            Object::Boolean(value) => write!(f, "{value}"),
            Object::Builtin(builtin) => write!(f, "{builtin}"),
            Object::Function(function) => write!(f, "{function}"),
            Object::Method(method) => write!(f, "{}", method.borrow()),
            Object::Struct(struct_) => write!(f, "{}", struct_.borrow()),
            Object::Instance(instance) => write!(f, "{}", instance.borrow()),
        }
    }
}

/// Represents a callable value in the language.
pub trait Callable {
    /// Calls the value with the given arguments and the current state of the
    /// interpreter. The token is the call site's closing parenthesis, used to
    /// attach a source line to errors raised inside the call.
    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Object>,
        token: &Token,
    ) -> Result<Object, RuntimeError>;

    /// Returns the arity of the value.
    fn arity(&self) -> usize;
}
