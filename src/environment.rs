use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;
use crate::token::Token;

/// A scope of name-to-value bindings, chained to an optional enclosing
/// scope. Lookup and assignment walk the chain outwards; definition always
/// targets the innermost scope, which is what makes shadowing work.
#[derive(Debug)]
pub struct Environment {
    pub enclosing: Option<Rc<RefCell<Environment>>>,
    variables: HashMap<String, Object>,
}

impl Environment {
    pub fn new(enclosing: Option<Rc<RefCell<Environment>>>) -> Self {
        Environment {
            enclosing,
            variables: HashMap::new(),
        }
    }

    /// Binds a name in this scope, shadowing any outer binding.
    pub fn define(&mut self, name: &str, value: Object) {
        self.variables.insert(name.to_string(), value);
    }

    /// Looks a name up through the scope chain.
    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        if let Some(variable) = self.variables.get(&name.lexeme) {
            return Ok(variable.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow().get(name);
        }

        Err(RuntimeError::new(name, format!("Undefined variable `{}`", name.lexeme)))
    }

    /// Updates an existing binding in place. Never creates a new one.
    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if self.variables.contains_key(&name.lexeme) {
            self.variables.insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }

        Err(RuntimeError::new(name, format!("Undefined variable `{}`", name.lexeme)))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::token::Type;

    fn name(lexeme: &str) -> Token {
        Token::new(Type::Identifier, lexeme.to_string(), None, 1)
    }

    #[test]
    fn define_and_get() {
        let mut environment = Environment::default();
        environment.define("x", Object::Integer(1));

        assert_eq!(environment.get(&name("x")).unwrap(), Object::Integer(1));
    }

    #[test]
    fn get_walks_the_chain() {
        let outer = Rc::new(RefCell::new(Environment::default()));
        outer.borrow_mut().define("x", Object::Integer(1));

        let inner = Environment::new(Some(Rc::clone(&outer)));

        assert_eq!(inner.get(&name("x")).unwrap(), Object::Integer(1));
    }

    #[test]
    fn define_shadows_outer_binding() {
        let outer = Rc::new(RefCell::new(Environment::default()));
        outer.borrow_mut().define("x", Object::Integer(1));

        let mut inner = Environment::new(Some(Rc::clone(&outer)));
        inner.define("x", Object::Integer(2));

        assert_eq!(inner.get(&name("x")).unwrap(), Object::Integer(2));
        assert_eq!(outer.borrow().get(&name("x")).unwrap(), Object::Integer(1));
    }

    #[test]
    fn assign_updates_outer_binding() {
        let outer = Rc::new(RefCell::new(Environment::default()));
        outer.borrow_mut().define("x", Object::Integer(1));

        let mut inner = Environment::new(Some(Rc::clone(&outer)));
        inner.assign(&name("x"), Object::Integer(2)).unwrap();

        assert_eq!(outer.borrow().get(&name("x")).unwrap(), Object::Integer(2));
    }

    #[test]
    fn assign_never_defines() {
        let mut environment = Environment::default();
        let error = environment.assign(&name("missing"), Object::None).unwrap_err();

        assert_eq!(error.message, "Undefined variable `missing`");
        assert!(environment.get(&name("missing")).is_err());
    }

    #[test]
    fn get_unknown_name() {
        let environment = Environment::default();
        let error = environment.get(&name("ghost")).unwrap_err();

        assert_eq!(error.message, "Undefined variable `ghost`");
        assert_eq!(error.token.lexeme, "ghost");
    }
}
