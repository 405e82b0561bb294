use crate::expr::Expr;
use crate::stmt::Stmt;

/// Returns a string representation of the expression in parenthesize.
macro_rules! parenthesize {
    ( $self:ident, $name:expr, $( $x:expr ),+ ) => {
        {
            let mut string = String::new();
            string += "(";
            string += $name;
            $(
                string += " ";
                string += &$self.print($x);
            )*
            string += ")";

            string
        }
    };
}

/// Serializes the AST into a compact parenthesized form.
/// Mostly useful for debugging the parser and asserting tree shapes in tests.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Literal(literal) => literal.to_string(),
            Expr::Grouping(grouping) => parenthesize!(self, "group", &grouping.expr),
            Expr::Unary(unary) => parenthesize!(self, &unary.operator.lexeme, &unary.right),
            Expr::Binary(binary) => {
                parenthesize!(self, &binary.operator.lexeme, &binary.left, &binary.right)
            },
            Expr::Logical(logical) => {
                parenthesize!(self, &logical.operator.lexeme, &logical.left, &logical.right)
            },
            Expr::Variable(variable) => variable.name.lexeme.clone(),
            Expr::Assignment(assignment) => {
                parenthesize!(self, format!("= {}", assignment.name.lexeme).as_str(), &assignment.value)
            },
            Expr::Call(call) => {
                let mut string = String::new();
                string += &self.print(&call.callee);
                string += "(";
                for argument in &call.arguments {
                    string += &self.print(argument);
                    string += " ";
                }
                string = string.trim_end().to_string();
                string += ")";
                string
            },
            Expr::Get(get) => {
                format!("(. {} {})", self.print(&get.object), get.name.lexeme)
            },
            Expr::Set(set) => {
                format!(
                    "(= (. {} {}) {})",
                    self.print(&set.object),
                    set.name.lexeme,
                    self.print(&set.value),
                )
            },
        }
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(data) => parenthesize!(self, "expr", &data.expr),
            Stmt::Let(data) => {
                let mut string = String::new();
                string += "(let ";
                string += &data.name.lexeme;
                if let Some(initializer) = &data.initializer {
                    string += " = ";
                    string += &self.print(initializer);
                }
                string += ")";

                string
            },
            Stmt::Function(data) => self.print_function(data),
            Stmt::Struct(data) => {
                let mut string = String::new();
                string += "(struct ";
                string += &data.name.lexeme;
                string += " { ";
                string += &data.methods.iter()
                    .map(|method| self.print_function(method))
                    .collect::<Vec<String>>()
                    .join(" ");
                string += " })";

                string
            },
            Stmt::If(data) => {
                let mut string = String::new();
                string += "(if ";
                string += &self.print(&data.condition);
                string += " ";
                string += &self.print_stmt(&data.then_branch);
                if let Some(else_branch) = &data.else_branch {
                    string += " else ";
                    string += &self.print_stmt(else_branch);
                }
                string += ")";

                string
            },
            Stmt::While(data) => {
                format!(
                    "(while {} {})",
                    self.print(&data.condition),
                    self.print_stmt(&data.body),
                )
            },
            Stmt::Block(data) => {
                let mut string = String::new();
                string += "{";
                for stmt in &data.statements {
                    string += " ";
                    string += &self.print_stmt(stmt);
                }
                string += " }";

                string
            },
            Stmt::Return(data) => {
                match &data.value {
                    Some(value) => parenthesize!(self, "return", value),
                    None => String::from("(return)"),
                }
            },
        }
    }

    fn print_function(&mut self, data: &crate::stmt::FunctionData) -> String {
        let mut string = String::new();
        string += "(fun ";
        string += &data.name.lexeme;
        string += "(";
        for param in &data.params {
            string += &param.lexeme;
            string += " ";
        }
        string = string.trim_end().to_string();
        string += ") { ";
        string += &data.body.iter()
            .map(|stmt| self.print_stmt(stmt))
            .collect::<Vec<String>>()
            .join(" ");
        string += " })";

        string
    }
}
