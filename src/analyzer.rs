use std::mem;

use crate::context::Context;
use crate::expr::Expr;
use crate::stmt::{FunctionData, Stmt};

/// Validates structural rules the grammar cannot express: functions and
/// structs may only be declared at the top level, and `return` may only
/// appear inside a function body. The analyzer never mutates the AST; it
/// only reports.
pub struct Analyzer<'a> {
    inside_function: bool,
    ctx: &'a mut Context,
}

impl<'a> Analyzer<'a> {
    pub fn new(ctx: &'a mut Context) -> Self {
        Analyzer {
            inside_function: false,
            ctx,
        }
    }

    pub fn analyze(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.analyze_stmt(statement);
        }
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(data) => self.analyze_expr(&data.expr),
            Stmt::Let(data) => {
                if let Some(initializer) = &data.initializer {
                    self.analyze_expr(initializer);
                }
            },
            Stmt::Function(data) => {
                if self.inside_function {
                    self.ctx.error_token(&data.name, "Functions can only be declared at the top level");
                }

                self.analyze_function(data);
            },
            Stmt::Struct(data) => {
                if self.inside_function {
                    self.ctx.error_token(&data.name, "Structs can only be declared at the top level");
                }

                for method in &data.methods {
                    self.analyze_function(method);
                }
            },
            Stmt::If(data) => {
                self.analyze_expr(&data.condition);
                self.analyze_stmt(&data.then_branch);
                if let Some(else_branch) = &data.else_branch {
                    self.analyze_stmt(else_branch);
                }
            },
            Stmt::While(data) => {
                self.analyze_expr(&data.condition);
                self.analyze_stmt(&data.body);
            },
            Stmt::Block(data) => self.analyze(&data.statements),
            Stmt::Return(data) => {
                if !self.inside_function {
                    self.ctx.error_token(&data.keyword, "Can only return from inside a function");
                }

                if let Some(value) = &data.value {
                    self.analyze_expr(value);
                }
            },
        }
    }

    fn analyze_function(&mut self, function: &FunctionData) {
        let enclosing = mem::replace(&mut self.inside_function, true);
        self.analyze(&function.body);
        self.inside_function = enclosing;
    }

    fn analyze_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {},
            Expr::Grouping(data) => self.analyze_expr(&data.expr),
            Expr::Unary(data) => self.analyze_expr(&data.right),
            Expr::Binary(data) => {
                self.analyze_expr(&data.left);
                self.analyze_expr(&data.right);
            },
            Expr::Logical(data) => {
                self.analyze_expr(&data.left);
                self.analyze_expr(&data.right);
            },
            Expr::Variable(_) => {},
            Expr::Assignment(data) => self.analyze_expr(&data.value),
            Expr::Call(data) => {
                self.analyze_expr(&data.callee);
                for argument in &data.arguments {
                    self.analyze_expr(argument);
                }
            },
            Expr::Get(data) => self.analyze_expr(&data.object),
            Expr::Set(data) => {
                self.analyze_expr(&data.object);
                self.analyze_expr(&data.value);
            },
        }
    }
}
