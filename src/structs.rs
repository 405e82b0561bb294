use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::function::Method;
use crate::interpreter::Interpreter;
use crate::object::{Callable, Object};
use crate::token::Token;

/// Represents a struct declaration's runtime value.
///
/// The struct holds the prototype method table. Instances get their own
/// copies at instantiation time so every bound `instance` reference points
/// at the instance it lives in.
#[derive(Clone)]
pub struct Struct {
    pub name: String,
    pub methods: HashMap<String, Rc<RefCell<Method>>>,
}

impl Struct {
    /// Returns the arity of a struct call. Counts the implicit instance
    /// slot, so a struct without an initializer has arity 1.
    pub fn arity(&self) -> usize {
        match self.methods.get("init") {
            Some(init) => init.borrow().arity(),
            None => 1,
        }
    }

    /// Instantiates the struct: fresh instance, per-instance method copies
    /// bound to it, and a call to `init` (if declared) with the instance
    /// prepended to the user arguments. The instance is returned no matter
    /// what `init` evaluates to.
    pub fn instantiate(
        this: &Rc<RefCell<Struct>>,
        interpreter: &mut Interpreter,
        arguments: Vec<Object>,
        token: &Token,
    ) -> Result<Object, RuntimeError> {
        let mut methods = HashMap::new();
        for (name, method) in &this.borrow().methods {
            methods.insert(name.clone(), Rc::new(RefCell::new(method.borrow().clone())));
        }

        let instance = Rc::new(RefCell::new(StructInstance {
            struct_: Rc::clone(this),
            methods,
            fields: HashMap::new(),
        }));
        let object = Object::Instance(Rc::clone(&instance));

        // Bind the instance to its method copies.
        for method in instance.borrow().methods.values() {
            method.borrow_mut().instance = Some(object.clone());
        }

        let init = instance.borrow().methods.get("init").cloned();
        if let Some(init) = init {
            let mut arguments_and_self = vec![object.clone()];
            arguments_and_self.extend(arguments);

            let init = init.borrow().clone();
            init.call(interpreter, arguments_and_self, token)?;
        }

        Ok(object)
    }
}

impl Debug for Struct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<struct {}>", self.name)
    }
}

impl Display for Struct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<struct {}>", self.name)
    }
}

/// Represents an instance of a struct.
pub struct StructInstance {
    pub struct_: Rc<RefCell<Struct>>,
    pub methods: HashMap<String, Rc<RefCell<Method>>>,
    pub fields: HashMap<String, Object>,
}

impl StructInstance {
    /// Reads an attribute. Fields shadow methods of the same name.
    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        if let Some(field) = self.fields.get(&name.lexeme) {
            return Ok(field.clone());
        }

        if let Some(method) = self.methods.get(&name.lexeme) {
            return Ok(Object::Method(Rc::clone(method)));
        }

        Err(RuntimeError::new(name, format!("Undefined attribute `{}`", name.lexeme)))
    }

    /// Writes a field and returns the stored value.
    pub fn set(&mut self, name: &Token, value: Object) -> Object {
        self.fields.insert(name.lexeme.clone(), value.clone());
        value
    }
}

impl Debug for StructInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance>", self.struct_.borrow().name)
    }
}

impl Display for StructInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance>", self.struct_.borrow().name)
    }
}
