use std::fmt::{self, Debug, Display};
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::{RuntimeError, Signal};
use crate::interpreter::Interpreter;
use crate::object::{Callable, Object};
use crate::stmt::Stmt;
use crate::token::Token;

/// Represents a user-defined function.
///
/// The body runs in a fresh scope chained to the global scope, not to the
/// caller's scope. Functions do not capture locals; the only names a body can
/// see are its parameters and the globals.
#[derive(Debug, PartialEq, Clone)]
pub struct Function {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Rc<Vec<Stmt>>,
}

impl Callable for Function {
    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Object>,
        _token: &Token,
    ) -> Result<Object, RuntimeError> {
        let mut environment = Environment::new(Some(Rc::clone(&interpreter.globals)));

        for (param, argument) in self.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument);
        }

        match interpreter.execute_block(&self.body, environment) {
            Ok(()) => Ok(Object::None),
            Err(Signal::Return(value)) => Ok(value),
            Err(Signal::Error(error)) => Err(error),
        }
    }

    fn arity(&self) -> usize {
        self.params.len()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name.lexeme)
    }
}

/// Represents a method of a struct.
///
/// A method living inside a struct instance keeps a reference to that
/// instance from the moment the instance is created; the reference is passed
/// as the first argument on every call. Prototype methods stored in the
/// struct itself are unbound.
#[derive(PartialEq, Clone)]
pub struct Method {
    pub function: Function,
    pub instance: Option<Object>,
}

impl Callable for Method {
    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Object>,
        token: &Token,
    ) -> Result<Object, RuntimeError> {
        self.function.call(interpreter, arguments, token)
    }

    fn arity(&self) -> usize {
        self.function.arity()
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<method {}>", self.function.name.lexeme)
    }
}

// The bound instance refers back to this method; keep Debug shallow.
impl Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<method {}>", self.function.name.lexeme)
    }
}

/// Represents a host-provided function injected into the global scope.
#[derive(Clone)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: usize,
    pub function: fn(&mut Interpreter, Vec<Object>, &Token) -> Result<Object, RuntimeError>,
}

impl Callable for Builtin {
    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Object>,
        token: &Token,
    ) -> Result<Object, RuntimeError> {
        (self.function)(interpreter, arguments, token)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<builtin function>")
    }
}

impl Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<builtin function {}>", self.name)
    }
}
