use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::builtins;
use crate::context::Context;
use crate::environment::Environment;
use crate::error::{RuntimeError, Signal};
use crate::expr::{self, Expr};
use crate::function::{Function, Method};
use crate::object::{Callable, Object};
use crate::stmt::{self, Stmt};
use crate::structs::Struct;
use crate::token::{Token, Type};

/// Evaluates the AST.
///
/// Expressions evaluate to objects; statements execute for their effects.
/// Statement execution threads a `Signal` so that `return` can unwind out of
/// nested blocks until the enclosing function call catches it, while runtime
/// errors keep unwinding all the way to `interpret`.
pub struct Interpreter {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
}

impl Interpreter {
    /// Creates a new interpreter with the built-in functions injected into
    /// the global scope.
    pub fn new() -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));

        for builtin in builtins::get_globals() {
            globals.borrow_mut().define(builtin.name, Object::Builtin(builtin));
        }

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
        }
    }

    /// Executes the statements in order. The first runtime error is reported
    /// to the context and stops execution.
    pub fn interpret(&mut self, statements: &[Stmt], ctx: &mut Context) {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {},
                Err(Signal::Error(error)) => {
                    ctx.runtime_error(&error);
                    return;
                },
                // The analyzer rejects top-level returns before we get here.
                Err(Signal::Return(_)) => unreachable!(),
            }
        }
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Signal> {
        match stmt {
            Stmt::Expression(data) => {
                self.evaluate(&data.expr)?;
                Ok(())
            },
            Stmt::Let(data) => self.execute_let(data),
            Stmt::Function(data) => {
                let function = Object::Function(Rc::new(make_function(data)));
                self.environment.borrow_mut().define(&data.name.lexeme, function);
                Ok(())
            },
            Stmt::Struct(data) => self.execute_struct(data),
            Stmt::If(data) => self.execute_if(data),
            Stmt::While(data) => self.execute_while(data),
            Stmt::Block(data) => {
                let environment = Environment::new(Some(Rc::clone(&self.environment)));
                self.execute_block(&data.statements, environment)
            },
            Stmt::Return(data) => {
                let value = match &data.value {
                    Some(value) => self.evaluate(value)?,
                    None => Object::None,
                };

                Err(Signal::Return(value))
            },
        }
    }

    /// Executes the statements in the given environment and restores the
    /// previous one afterwards, on the normal path and on unwinding alike.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Environment,
    ) -> Result<(), Signal> {
        let previous = Rc::clone(&self.environment);
        self.environment = Rc::new(RefCell::new(environment));

        let result = statements.iter().try_for_each(|statement| self.execute(statement));

        self.environment = previous;

        result
    }

    fn execute_let(&mut self, data: &stmt::LetData) -> Result<(), Signal> {
        let value = match &data.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::None,
        };

        self.environment.borrow_mut().define(&data.name.lexeme, value);

        Ok(())
    }

    fn execute_struct(&mut self, data: &stmt::StructData) -> Result<(), Signal> {
        for method in &data.methods {
            if method.params.is_empty() {
                return Err(RuntimeError::new(
                    &method.name,
                    "Methods must take at least one parameter",
                ).into());
            }
        }

        // Define the name first so that method bodies can refer to the
        // struct before the value below replaces the placeholder.
        self.environment.borrow_mut().define(&data.name.lexeme, Object::None);

        let mut methods = HashMap::new();
        for method in &data.methods {
            let method = Method {
                function: make_function(method),
                instance: None,
            };
            methods.insert(method.function.name.lexeme.clone(), Rc::new(RefCell::new(method)));
        }

        let value = Object::Struct(Rc::new(RefCell::new(Struct {
            name: data.name.lexeme.clone(),
            methods,
        })));
        self.environment.borrow_mut().assign(&data.name, value)?;

        Ok(())
    }

    fn execute_if(&mut self, data: &stmt::IfData) -> Result<(), Signal> {
        match self.evaluate(&data.condition)? {
            Object::Boolean(true) => self.execute(&data.then_branch),
            Object::Boolean(false) => match &data.else_branch {
                Some(else_branch) => self.execute(else_branch),
                None => Ok(()),
            },
            _ => Err(RuntimeError::new(&data.paren, "Condition must be a boolean").into()),
        }
    }

    fn execute_while(&mut self, data: &stmt::WhileData) -> Result<(), Signal> {
        loop {
            match self.evaluate(&data.condition)? {
                Object::Boolean(true) => self.execute(&data.body)?,
                Object::Boolean(false) => break,
                _ => return Err(RuntimeError::new(&data.paren, "Condition must be a boolean").into()),
            }
        }

        Ok(())
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        match expr {
            Expr::Literal(literal) => Ok(Object::from(literal.clone())),
            Expr::Grouping(data) => self.evaluate(&data.expr),
            Expr::Unary(data) => self.evaluate_unary(data),
            Expr::Binary(data) => self.evaluate_binary(data),
            Expr::Logical(data) => self.evaluate_logical(data),
            Expr::Variable(data) => self.environment.borrow().get(&data.name),
            Expr::Assignment(data) => {
                let value = self.evaluate(&data.value)?;
                self.environment.borrow_mut().assign(&data.name, value.clone())?;

                Ok(value)
            },
            Expr::Call(data) => self.evaluate_call(data),
            Expr::Get(data) => {
                match self.evaluate(&data.object)? {
                    Object::Instance(instance) => instance.borrow().get(&data.name),
                    _ => Err(RuntimeError::new(&data.name, "Only struct instances have properties")),
                }
            },
            Expr::Set(data) => {
                match self.evaluate(&data.object)? {
                    Object::Instance(instance) => {
                        let value = self.evaluate(&data.value)?;
                        Ok(instance.borrow_mut().set(&data.name, value))
                    },
                    _ => Err(RuntimeError::new(&data.name, "Only struct instances have properties")),
                }
            },
        }
    }

    fn evaluate_unary(&mut self, data: &expr::UnaryData) -> Result<Object, RuntimeError> {
        let right = self.evaluate(&data.right)?;

        match data.operator.r#type {
            Type::Minus => match right {
                Object::Integer(value) => Ok(Object::Integer(value.wrapping_neg())),
                Object::Float(value) => Ok(Object::Float(-value)),
                _ => Err(RuntimeError::new(&data.operator, "Operand must be either an integer or a float")),
            },
            Type::Not => match right {
                Object::Boolean(value) => Ok(Object::Boolean(!value)),
                _ => Err(RuntimeError::new(&data.operator, "Operand must be a boolean")),
            },
            _ => unreachable!(),
        }
    }

    /// Binary operators require operands of the same kind; integers and
    /// floats never mix. Comparisons always produce booleans.
    fn evaluate_binary(&mut self, data: &expr::BinaryData) -> Result<Object, RuntimeError> {
        let left = self.evaluate(&data.left)?;
        let right = self.evaluate(&data.right)?;

        let operator = &data.operator;

        match operator.r#type {
            Type::Plus => match (left, right) {
                (Object::Integer(l), Object::Integer(r)) => Ok(Object::Integer(l.wrapping_add(r))),
                (Object::Float(l), Object::Float(r)) => Ok(Object::Float(l + r)),
                (Object::String(l), Object::String(r)) => Ok(Object::String(l + &r)),
                _ => Err(RuntimeError::new(operator, "Operands must be either integers, floats or strings")),
            },
            Type::Minus => match (left, right) {
                (Object::Integer(l), Object::Integer(r)) => Ok(Object::Integer(l.wrapping_sub(r))),
                (Object::Float(l), Object::Float(r)) => Ok(Object::Float(l - r)),
                _ => Err(RuntimeError::new(operator, "Operands must be either integers or floats")),
            },
            Type::Star => match (left, right) {
                (Object::Integer(l), Object::Integer(r)) => Ok(Object::Integer(l.wrapping_mul(r))),
                (Object::Float(l), Object::Float(r)) => Ok(Object::Float(l * r)),
                _ => Err(RuntimeError::new(operator, "Operands must be either integers or floats")),
            },
            Type::Slash => match (left, right) {
                (Object::Integer(_), Object::Integer(0)) => {
                    Err(RuntimeError::new(operator, "Division by zero"))
                },
                (Object::Integer(l), Object::Integer(r)) => Ok(Object::Integer(l.wrapping_div(r))),
                (Object::Float(l), Object::Float(r)) => Ok(Object::Float(l / r)),
                _ => Err(RuntimeError::new(operator, "Operands must be either integers or floats")),
            },
            Type::Greater => match (left, right) {
                (Object::Integer(l), Object::Integer(r)) => Ok(Object::Boolean(l > r)),
                (Object::Float(l), Object::Float(r)) => Ok(Object::Boolean(l > r)),
                _ => Err(RuntimeError::new(operator, "Operands must be either integers or floats")),
            },
            Type::GreaterEqual => match (left, right) {
                (Object::Integer(l), Object::Integer(r)) => Ok(Object::Boolean(l >= r)),
                (Object::Float(l), Object::Float(r)) => Ok(Object::Boolean(l >= r)),
                _ => Err(RuntimeError::new(operator, "Operands must be either integers or floats")),
            },
            Type::Less => match (left, right) {
                (Object::Integer(l), Object::Integer(r)) => Ok(Object::Boolean(l < r)),
                (Object::Float(l), Object::Float(r)) => Ok(Object::Boolean(l < r)),
                _ => Err(RuntimeError::new(operator, "Operands must be either integers or floats")),
            },
            Type::LessEqual => match (left, right) {
                (Object::Integer(l), Object::Integer(r)) => Ok(Object::Boolean(l <= r)),
                (Object::Float(l), Object::Float(r)) => Ok(Object::Boolean(l <= r)),
                _ => Err(RuntimeError::new(operator, "Operands must be either integers or floats")),
            },
            Type::EqualEqual => match (left, right) {
                (Object::Integer(l), Object::Integer(r)) => Ok(Object::Boolean(l == r)),
                (Object::Float(l), Object::Float(r)) => Ok(Object::Boolean(l == r)),
                _ => Err(RuntimeError::new(operator, "Operands must be either integers or floats")),
            },
            Type::BangEqual => match (left, right) {
                (Object::Integer(l), Object::Integer(r)) => Ok(Object::Boolean(l != r)),
                (Object::Float(l), Object::Float(r)) => Ok(Object::Boolean(l != r)),
                _ => Err(RuntimeError::new(operator, "Operands must be either integers or floats")),
            },
            _ => unreachable!(),
        }
    }

    /// `or` and `and` short-circuit: the right operand is only evaluated
    /// when the left one does not decide the result.
    fn evaluate_logical(&mut self, data: &expr::LogicalData) -> Result<Object, RuntimeError> {
        let left = match self.evaluate(&data.left)? {
            Object::Boolean(value) => value,
            _ => return Err(RuntimeError::new(&data.operator, "Operands must be booleans")),
        };

        match data.operator.r#type {
            Type::Or if left => return Ok(Object::Boolean(true)),
            Type::And if !left => return Ok(Object::Boolean(false)),
            _ => {},
        }

        match self.evaluate(&data.right)? {
            Object::Boolean(value) => Ok(Object::Boolean(value)),
            _ => Err(RuntimeError::new(&data.operator, "Operands must be booleans")),
        }
    }

    fn evaluate_call(&mut self, data: &expr::CallData) -> Result<Object, RuntimeError> {
        let callee = self.evaluate(&data.callee)?;

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        match callee {
            Object::Builtin(builtin) => {
                check_arity(arguments.len(), builtin.arity(), &data.paren)?;
                builtin.call(self, arguments, &data.paren)
            },
            Object::Function(function) => {
                check_arity(arguments.len(), function.arity(), &data.paren)?;
                function.call(self, arguments, &data.paren)
            },
            Object::Method(method) => {
                let method = method.borrow().clone();
                let instance = method.instance.clone()
                    .expect("method to be bound to an instance");

                let mut arguments_and_self = vec![instance];
                arguments_and_self.extend(arguments);

                check_arity(arguments_and_self.len(), method.arity(), &data.paren)?;
                method.call(self, arguments_and_self, &data.paren)
            },
            Object::Struct(struct_) => {
                // The implicit instance slot counts towards the arity.
                let arity = struct_.borrow().arity();
                check_arity(arguments.len() + 1, arity, &data.paren)?;
                Struct::instantiate(&struct_, self, arguments, &data.paren)
            },
            _ => Err(RuntimeError::new(&data.paren, "Only functions and classes are callable")),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn make_function(data: &stmt::FunctionData) -> Function {
    Function {
        name: data.name.clone(),
        params: data.params.clone(),
        body: Rc::new(data.body.clone()),
    }
}

fn check_arity(got: usize, expected: usize, token: &Token) -> Result<(), RuntimeError> {
    if got == expected {
        return Ok(());
    }

    let plural = if expected == 1 { "" } else { "s" };

    Err(RuntimeError::new(
        token,
        format!("Expected {expected} argument{plural}, but got {got}"),
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn parse(source: &str) -> Vec<Stmt> {
        let mut ctx = Context::new();
        let tokens = Scanner::new(source, &mut ctx).scan();
        let statements = Parser::new(tokens, &mut ctx).parse();
        assert!(!ctx.had_compile_error(), "unexpected compile error in {source:?}");

        statements
    }

    /// Runs the program and returns the value of the global named `result`.
    fn run(source: &str) -> Result<Object, RuntimeError> {
        let mut interpreter = Interpreter::new();

        for statement in &parse(source) {
            match interpreter.execute(statement) {
                Ok(()) => {},
                Err(Signal::Error(error)) => return Err(error),
                Err(Signal::Return(_)) => unreachable!(),
            }
        }

        let name = Token::new(Type::Identifier, String::from("result"), None, 0);
        let result = interpreter.globals.borrow().get(&name);
        result
    }

    #[test]
    fn integer_arithmetic() {
        assert_eq!(run("let result = 1 + 2 * 3;").unwrap(), Object::Integer(7));
        assert_eq!(run("let result = (1 + 2) * 3;").unwrap(), Object::Integer(9));
        assert_eq!(run("let result = 7 / 2;").unwrap(), Object::Integer(3));
        assert_eq!(run("let result = -7 / 2;").unwrap(), Object::Integer(-3));
        assert_eq!(run("let result = -5;").unwrap(), Object::Integer(-5));
    }

    #[test]
    fn float_arithmetic() {
        assert_eq!(run("let result = 1.5 + 2.25;").unwrap(), Object::Float(3.75));
        assert_eq!(run("let result = 1.0 / 4.0;").unwrap(), Object::Float(0.25));
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(
            run("let result = \"ab\" + \"cd\";").unwrap(),
            Object::String(String::from("abcd")),
        );
    }

    #[test]
    fn mixed_kinds_do_not_add() {
        let error = run("let result = 1 + \"x\";").unwrap_err();
        assert_eq!(error.message, "Operands must be either integers, floats or strings");

        let error = run("let result = 1 + 2.0;").unwrap_err();
        assert_eq!(error.message, "Operands must be either integers, floats or strings");
    }

    #[test]
    fn division_by_zero() {
        let error = run("let result = 1 / 0;").unwrap_err();
        assert_eq!(error.message, "Division by zero");

        // Float division follows IEEE.
        assert_eq!(run("let result = 1.0 / 0.0;").unwrap(), Object::Float(f64::INFINITY));
    }

    #[test]
    fn comparisons_produce_booleans() {
        assert_eq!(run("let result = 1 < 2;").unwrap(), Object::Boolean(true));
        assert_eq!(run("let result = 2.5 >= 2.5;").unwrap(), Object::Boolean(true));
        assert_eq!(run("let result = 1 == 2;").unwrap(), Object::Boolean(false));
        assert_eq!(run("let result = 1 != 2;").unwrap(), Object::Boolean(true));
    }

    #[test]
    fn unary_operators() {
        assert_eq!(run("let result = not true;").unwrap(), Object::Boolean(false));
        assert_eq!(run("let result = -2.5;").unwrap(), Object::Float(-2.5));

        let error = run("let result = not 1;").unwrap_err();
        assert_eq!(error.message, "Operand must be a boolean");

        let error = run("let result = -true;").unwrap_err();
        assert_eq!(error.message, "Operand must be either an integer or a float");
    }

    #[test]
    fn logical_operators_short_circuit() {
        // The right side would assign if it were evaluated.
        let source = "
            let touched = false;
            fun touch() {
                touched = true;
                return true;
            }
            let result = false and touch();
        ";
        assert_eq!(run(&format!("{source} result = touched;")).unwrap(), Object::Boolean(false));

        let source = "
            let touched = false;
            fun touch() {
                touched = true;
                return true;
            }
            let result = true or touch();
        ";
        assert_eq!(run(&format!("{source} result = touched;")).unwrap(), Object::Boolean(false));
    }

    #[test]
    fn logical_operators_require_booleans() {
        let error = run("let result = 1 or true;").unwrap_err();
        assert_eq!(error.message, "Operands must be booleans");

        let error = run("let result = true and 1;").unwrap_err();
        assert_eq!(error.message, "Operands must be booleans");
    }

    #[test]
    fn undefined_variable() {
        let error = run("let result = ghost;").unwrap_err();

        assert_eq!(error.message, "Undefined variable `ghost`");
        assert_eq!(error.token.lexeme, "ghost");
    }

    #[test]
    fn block_shadowing_preserves_outer_binding() {
        let source = "
            let result = 1;
            {
                let result = 2;
                result = 3;
            }
        ";
        assert_eq!(run(source).unwrap(), Object::Integer(1));
    }

    #[test]
    fn assignment_writes_through_blocks() {
        let source = "
            let result = 1;
            {
                result = 2;
            }
        ";
        assert_eq!(run(source).unwrap(), Object::Integer(2));
    }

    #[test]
    fn while_loop() {
        let source = "
            let result = 0;
            let i = 0;
            while (i < 4) {
                result = result + i;
                i = i + 1;
            }
        ";
        assert_eq!(run(source).unwrap(), Object::Integer(6));
    }

    #[test]
    fn condition_must_be_boolean() {
        let error = run("if (1) { let x = 2; }").unwrap_err();
        assert_eq!(error.message, "Condition must be a boolean");

        let error = run("while (1) { let x = 2; }").unwrap_err();
        assert_eq!(error.message, "Condition must be a boolean");
    }

    #[test]
    fn function_call_and_return() {
        let source = "
            fun add(a, b) {
                return a + b;
            }
            let result = add(2, 3);
        ";
        assert_eq!(run(source).unwrap(), Object::Integer(5));
    }

    #[test]
    fn function_without_return_yields_none() {
        let source = "
            fun noop() { }
            let result = noop();
        ";
        assert_eq!(run(source).unwrap(), Object::None);
    }

    #[test]
    fn bare_return_yields_none() {
        let source = "
            fun early() { return; }
            let result = early();
        ";
        assert_eq!(run(source).unwrap(), Object::None);
    }

    #[test]
    fn return_unwinds_nested_blocks() {
        let source = "
            fun find() {
                let i = 0;
                while (true) {
                    if (i == 3) {
                        return i;
                    }
                    i = i + 1;
                }
            }
            let result = find();
        ";
        assert_eq!(run(source).unwrap(), Object::Integer(3));
    }

    #[test]
    fn functions_do_not_capture_locals() {
        let source = "
            fun f() { return y; }
            let result = 0;
            {
                let y = 5;
                result = f();
            }
        ";
        let error = run(source).unwrap_err();
        assert_eq!(error.message, "Undefined variable `y`");
    }

    #[test]
    fn functions_see_globals() {
        let source = "
            let base = 10;
            fun bump() { return base + 1; }
            let result = bump();
        ";
        assert_eq!(run(source).unwrap(), Object::Integer(11));
    }

    #[test]
    fn arity_mismatch_messages() {
        let source = "
            fun one(a) { return a; }
            let result = one(1, 2);
        ";
        let error = run(source).unwrap_err();
        assert_eq!(error.message, "Expected 1 argument, but got 2");

        let source = "
            fun two(a, b) { return a; }
            let result = two();
        ";
        let error = run(source).unwrap_err();
        assert_eq!(error.message, "Expected 2 arguments, but got 0");
    }

    #[test]
    fn only_callables_can_be_called() {
        let error = run("let x = 1; let result = x();").unwrap_err();
        assert_eq!(error.message, "Only functions and classes are callable");
    }

    #[test]
    fn struct_with_init() {
        let source = "
            struct Point {
                fun init(self, x, y) {
                    self.x = x;
                    self.y = y;
                }
            }
            let p = Point(3, 4);
            let result = p.x * p.x + p.y * p.y;
        ";
        assert_eq!(run(source).unwrap(), Object::Integer(25));
    }

    #[test]
    fn struct_without_init() {
        let source = "
            struct Bag { }
            let b = Bag();
            b.item = 7;
            let result = b.item;
        ";
        assert_eq!(run(source).unwrap(), Object::Integer(7));
    }

    #[test]
    fn method_call_binds_instance() {
        let source = "
            struct Point {
                fun init(self, x, y) {
                    self.x = x;
                    self.y = y;
                }

                fun dist(self) {
                    return self.x * self.x + self.y * self.y;
                }
            }
            let p = Point(3, 4);
            let result = p.dist();
        ";
        assert_eq!(run(source).unwrap(), Object::Integer(25));
    }

    #[test]
    fn each_instance_binds_its_own_methods() {
        let source = "
            struct Counter {
                fun init(self, start) {
                    self.count = start;
                }

                fun bump(self) {
                    self.count = self.count + 1;
                    return self.count;
                }
            }
            let a = Counter(0);
            let b = Counter(100);
            a.bump();
            a.bump();
            b.bump();
            let result = a.count + b.count;
        ";
        assert_eq!(run(source).unwrap(), Object::Integer(103));
    }

    #[test]
    fn fields_shadow_methods() {
        let source = "
            struct S {
                fun init(self) { }

                fun tag(self) { return 1; }
            }
            let s = S();
            s.tag = 2;
            let result = s.tag;
        ";
        assert_eq!(run(source).unwrap(), Object::Integer(2));
    }

    #[test]
    fn undefined_attribute() {
        let source = "
            struct S { }
            let s = S();
            let result = s.missing;
        ";
        let error = run(source).unwrap_err();
        assert_eq!(error.message, "Undefined attribute `missing`");
    }

    #[test]
    fn only_instances_have_properties() {
        let error = run("let x = 1; let result = x.y;").unwrap_err();
        assert_eq!(error.message, "Only struct instances have properties");

        let error = run("let x = 1; x.y = 2;").unwrap_err();
        assert_eq!(error.message, "Only struct instances have properties");
    }

    #[test]
    fn struct_arity_counts_instance_slot() {
        let source = "
            struct Point {
                fun init(self, x, y) { }
            }
            let result = Point(1);
        ";
        let error = run(source).unwrap_err();
        assert_eq!(error.message, "Expected 3 arguments, but got 2");
    }

    #[test]
    fn methods_need_a_receiver_parameter() {
        let error = run("struct Bad { fun nope() { } }").unwrap_err();
        assert_eq!(error.message, "Methods must take at least one parameter");
    }

    #[test]
    fn struct_instances_print_by_name() {
        let source = "
            struct Point { }
            let p = Point();
            let result = p;
        ";
        assert_eq!(run(source).unwrap().to_string(), "<Point instance>");
    }

    #[test]
    fn for_loop_desugars_and_runs() {
        let source = "
            let result = 0;
            for (let i = 1; i <= 4; i = i + 1) {
                result = result + i;
            }
        ";
        assert_eq!(run(source).unwrap(), Object::Integer(10));
    }
}
