use std::io::{self, BufRead, Write};
use std::num::IntErrorKind;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::RuntimeError;
use crate::function::Builtin;
use crate::interpreter::Interpreter;
use crate::object::Object;
use crate::token::Token;

/// Returns the built-in functions injected into the global scope.
pub fn get_globals() -> Vec<Builtin> {
    vec![
        Builtin { name: "clock", arity: 0, function: clock },
        Builtin { name: "print", arity: 1, function: print },
        Builtin { name: "println", arity: 1, function: println },
        Builtin { name: "input", arity: 1, function: input },
        Builtin { name: "str", arity: 1, function: str_ },
        Builtin { name: "int", arity: 1, function: int_ },
        Builtin { name: "float", arity: 1, function: float_ },
        Builtin { name: "bool", arity: 1, function: bool_ },
    ]
}

fn clock(_: &mut Interpreter, _: Vec<Object>, _: &Token) -> Result<Object, RuntimeError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    Ok(Object::Float(now.as_secs_f64()))
}

fn print(_: &mut Interpreter, arguments: Vec<Object>, _: &Token) -> Result<Object, RuntimeError> {
    print!("{}", arguments[0]);
    let _ = io::stdout().flush();

    Ok(Object::None)
}

fn println(_: &mut Interpreter, arguments: Vec<Object>, _: &Token) -> Result<Object, RuntimeError> {
    println!("{}", arguments[0]);

    Ok(Object::None)
}

fn input(_: &mut Interpreter, arguments: Vec<Object>, _: &Token) -> Result<Object, RuntimeError> {
    print!("{}", arguments[0]);
    let _ = io::stdout().flush();

    let mut buffer = String::new();
    match io::stdin().lock().read_line(&mut buffer) {
        Ok(_) => {
            if buffer.ends_with('\n') {
                buffer.pop();

                if buffer.ends_with('\r') {
                    buffer.pop();
                }
            }

            Ok(Object::String(buffer))
        },
        // A failed read behaves like end of input.
        Err(_) => Ok(Object::String(String::new())),
    }
}

fn str_(_: &mut Interpreter, arguments: Vec<Object>, _: &Token) -> Result<Object, RuntimeError> {
    Ok(Object::String(arguments[0].to_string()))
}

fn int_(_: &mut Interpreter, arguments: Vec<Object>, token: &Token) -> Result<Object, RuntimeError> {
    match &arguments[0] {
        Object::String(value) => match value.parse::<i64>() {
            Ok(value) => Ok(Object::Integer(value)),
            Err(error) => match error.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    Err(RuntimeError::new(token, "Integer value out of range"))
                },
                _ => Err(RuntimeError::new(token, "Invalid integer value")),
            },
        },
        Object::Integer(value) => Ok(Object::Integer(*value)),
        Object::Float(value) => Ok(Object::Integer(*value as i64)),
        Object::Boolean(value) => Ok(Object::Integer(*value as i64)),
        _ => Err(RuntimeError::new(token, "int() argument must be either string, integer, float or boolean")),
    }
}

fn float_(_: &mut Interpreter, arguments: Vec<Object>, token: &Token) -> Result<Object, RuntimeError> {
    match &arguments[0] {
        Object::String(value) => match value.parse::<f64>() {
            Ok(value) => Ok(Object::Float(value)),
            Err(_) => Err(RuntimeError::new(token, "Invalid float value")),
        },
        Object::Integer(value) => Ok(Object::Float(*value as f64)),
        Object::Float(value) => Ok(Object::Float(*value)),
        Object::Boolean(value) => Ok(Object::Float((*value as i64) as f64)),
        _ => Err(RuntimeError::new(token, "float() argument must be either string, integer, float or boolean")),
    }
}

fn bool_(_: &mut Interpreter, arguments: Vec<Object>, token: &Token) -> Result<Object, RuntimeError> {
    match &arguments[0] {
        Object::None => Ok(Object::Boolean(false)),
        // The empty string is falsy, like the zero values of the other kinds.
        Object::String(value) => Ok(Object::Boolean(!value.is_empty())),
        Object::Integer(value) => Ok(Object::Boolean(*value != 0)),
        Object::Float(value) => Ok(Object::Boolean(*value != 0.0)),
        Object::Boolean(value) => Ok(Object::Boolean(*value)),
        _ => Err(RuntimeError::new(token, "bool() argument must be either none, string, integer, float or boolean")),
    }
}
