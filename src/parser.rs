use crate::context::Context;
use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::{Token, Type};

/// Represents an error that interrupts parsing of the current declaration.
struct ParseError {
    token: Token,
    message: String,
}

type ParseResult<T> = Result<T, ParseError>;

/// Returns if the next token is any of the given types.
macro_rules! matches {
    ( $self:ident, $( $type:expr ),+ ) => {
        {
            if $( $self.check($type) ) ||* {
                $self.advance();
                true
            } else {
                false
            }
        }
    }
}

/// Parses the tokens and returns the resulting statements.
///
/// - Program     -> Declaration* EOF ;
/// - Declaration -> LetDecl | FunDecl | StructDecl | Statement ;
/// - LetDecl     -> "let" IDENTIFIER ( "=" Expression )? ";" ;
/// - FunDecl     -> "fun" Function ;
/// - StructDecl  -> "struct" IDENTIFIER "{" Function* "}" ;
/// - Function    -> IDENTIFIER "(" Parameters? ")" Block ;
/// - Parameters  -> IDENTIFIER ( "," IDENTIFIER )* ;
/// - Statement   -> Block | IfStmt | WhileStmt | ForStmt | ReturnStmt | ExprStmt ;
/// - Block       -> "{" Declaration* "}" ;
/// - IfStmt      -> "if" "(" Expression ")" Statement ( "else" Statement )? ;
/// - WhileStmt   -> "while" "(" Expression ")" Statement ;
/// - ForStmt     -> "for" "(" ( ";" | LetDecl | ExprStmt ) Expression? ";" Expression? ")" Statement ;
/// - ReturnStmt  -> "return" Expression? ";" ;
/// - ExprStmt    -> Expression ";" ;
/// - Expression  -> Assignment ;
/// - Assignment  -> IDENTIFIER "=" Assignment | LogicOr ;
/// - LogicOr     -> LogicAnd ( "or" LogicAnd )* ;
/// - LogicAnd    -> Equality ( "and" Equality )* ;
/// - Equality    -> Comparison ( ( "!=" | "==" ) Comparison )* ;
/// - Comparison  -> Term ( ( ">" | ">=" | "<" | "<=" ) Term )* ;
/// - Term        -> Factor ( ( "+" | "-" ) Factor )* ;
/// - Factor      -> Unary ( ( "*" | "/" ) Unary )* ;
/// - Unary       -> ( "not" | "-" ) Unary | Call ;
/// - Call        -> Primary ( "(" Arguments? ")" | "." IDENTIFIER )* ;
/// - Arguments   -> Expression ( "," Expression )* ;
/// - Primary     -> INTEGER | FLOAT | STRING | "true" | "false" | "none" | IDENTIFIER | "(" Expression ")" ;
pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    ctx: &'a mut Context,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, ctx: &'a mut Context) -> Self {
        Parser {
            tokens,
            current: 0,
            ctx,
        }
    }

    /// Parses the tokens and returns a best-effort statement list. Errors are
    /// reported to the context; the caller checks it before going further.
    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        statements
    }

    /// Returns the next token without consuming it.
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    /// Returns the previous token without consuming it.
    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    /// Returns if the parser has reached the end of the file.
    fn is_at_end(&self) -> bool {
        self.peek().r#type == Type::Eof
    }

    /// Returns if the next token is of the given type.
    fn check(&self, r#type: Type) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().r#type == r#type
    }

    /// Consumes the next token and returns it.
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    /// Consumes the next token if it is of the given type.
    fn consume(&mut self, r#type: Type, message: &str) -> ParseResult<&Token> {
        if self.check(r#type) {
            return Ok(self.advance());
        }

        Err(ParseError {
            token: self.peek().clone(),
            message: message.to_string(),
        })
    }

    /// Parses a declaration. A parse error inside one declaration is reported
    /// and recovered from; the parser then continues with the next one.
    fn declaration(&mut self) -> Option<Stmt> {
        let statement = if matches!(self, Type::Let) {
            self.let_declaration()
        } else if matches!(self, Type::Fun) {
            self.function().map(Stmt::Function)
        } else if matches!(self, Type::Struct) {
            self.struct_declaration()
        } else {
            self.statement()
        };

        match statement {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                self.ctx.error_token(&error.token, &error.message);
                self.synchronize();
                None
            },
        }
    }

    /// Parses a variable declaration.
    fn let_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expected a variable name")?.clone();

        let initializer = if matches!(self, Type::Equal) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(Type::Semicolon, "Expected `;` after variable declaration")?;

        Ok(Stmt::Let(LetData { name, initializer }))
    }

    /// Parses a function declaration. Used both for `fun` declarations and
    /// for the methods inside a struct body.
    fn function(&mut self) -> ParseResult<FunctionData> {
        let name = self.consume(Type::Identifier, "Expected a function name")?.clone();

        self.consume(Type::LeftParen, "Expected `(` after function name")?;

        let mut params = vec![];

        if !self.check(Type::RightParen) {
            loop {
                if params.len() >= 255 {
                    // Report without entering panic mode.
                    let token = self.peek().clone();
                    self.ctx.error_token(&token, "Too many parameters (255 maximum)");
                }

                params.push(self.consume(Type::Identifier, "Expected a parameter name")?.clone());

                if !matches!(self, Type::Comma) {
                    break;
                }
            }
        }

        self.consume(Type::RightParen, "Expected `)` after function parameters")?;
        self.consume(Type::LeftBrace, "Expected `{` before function body")?;

        let body = self.block()?;

        Ok(FunctionData { name, params, body })
    }

    /// Parses a struct declaration.
    fn struct_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expected a struct name")?.clone();

        self.consume(Type::LeftBrace, "Expected `{` before struct body")?;

        let mut methods = vec![];
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            self.consume(Type::Fun, "Expected a function name")?;
            methods.push(self.function()?);
        }

        self.consume(Type::RightBrace, "Expected `}` after struct body")?;

        Ok(Stmt::Struct(StructData { name, methods }))
    }

    /// Parses a statement.
    fn statement(&mut self) -> ParseResult<Stmt> {
        if matches!(self, Type::LeftBrace) {
            return Ok(Stmt::Block(BlockData { statements: self.block()? }));
        }

        if matches!(self, Type::If) {
            return self.if_statement();
        }

        if matches!(self, Type::While) {
            return self.while_statement();
        }

        if matches!(self, Type::For) {
            return self.for_statement();
        }

        if matches!(self, Type::Return) {
            return self.return_statement();
        }

        self.expression_statement()
    }

    /// Parses a block statement.
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(Type::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(Type::RightBrace, "Expected `}` after block")?;

        Ok(statements)
    }

    /// Parses an if statement. The opening parenthesis travels with the
    /// statement so the evaluator can point condition errors at it.
    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let paren = self.consume(Type::LeftParen, "Expected `(` after `if`")?.clone();
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expected `)` after if condition")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if matches!(self, Type::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If(IfData { condition, then_branch, else_branch, paren }))
    }

    /// Parses a while statement.
    fn while_statement(&mut self) -> ParseResult<Stmt> {
        let paren = self.consume(Type::LeftParen, "Expected `(` after `while`")?.clone();
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expected `)` after while condition")?;

        let body = self.statement()?;

        Ok(Stmt::While(WhileData {
            condition,
            body: Box::new(body),
            paren,
        }))
    }

    /// Parses a for statement and desugars it into while form.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        let paren = self.consume(Type::LeftParen, "Expected `(` after `for`")?.clone();

        let initializer = if matches!(self, Type::Semicolon) {
            None
        } else if matches!(self, Type::Let) {
            Some(self.let_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = match !self.check(Type::Semicolon) {
            true => Some(self.expression()?),
            false => None,
        };
        self.consume(Type::Semicolon, "Expected `;` after loop condition")?;

        let post = match !self.check(Type::RightParen) {
            true => Some(self.expression()?),
            false => None,
        };
        self.consume(Type::RightParen, "Expected `)` after loop clauses")?;

        let mut body = self.statement()?;

        // Execute the post expression after the body.
        if let Some(post) = post {
            body = Stmt::Block(BlockData {
                statements: vec![
                    body,
                    Stmt::Expression(ExpressionData { expr: post }),
                ],
            });
        }

        // Wrap the body into a while loop.
        // If there is no condition, use true.
        body = Stmt::While(WhileData {
            condition: condition.unwrap_or(Expr::Literal(Literal::Bool(true))),
            body: Box::new(body),
            paren,
        });

        // Run the initializer before the loop if there is one.
        if let Some(initializer) = initializer {
            body = Stmt::Block(BlockData {
                statements: vec![initializer, body],
            });
        }

        Ok(body)
    }

    /// Parses a return statement.
    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let value = match self.check(Type::Semicolon) {
            true => None,
            false => Some(self.expression()?),
        };

        self.consume(Type::Semicolon, "Expected `;` after return")?;

        Ok(Stmt::Return(ReturnData { keyword, value }))
    }

    /// Parses an expression statement.
    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;

        self.consume(Type::Semicolon, "Expected `;` after expression")?;

        Ok(Stmt::Expression(ExpressionData { expr }))
    }

    /// Parses an expression.
    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    /// Parses an assignment expression. Assignments nest to the right; only
    /// a plain variable is a valid target.
    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if matches!(self, Type::Equal) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            if let Expr::Variable(data) = expr {
                return Ok(Expr::Assignment(AssignmentData {
                    name: data.name,
                    value: Box::new(value),
                }));
            } else if let Expr::Get(data) = expr {
                return Ok(Expr::Set(SetData {
                    object: data.object,
                    name: data.name,
                    value: Box::new(value),
                }));
            }

            // Report without entering panic mode and discard the value.
            self.ctx.error_token(&equals, "Invalid assignment target");
        }

        Ok(expr)
    }

    /// Parses an or expression.
    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while matches!(self, Type::Or) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(LogicalData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses an and expression.
    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while matches!(self, Type::And) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(LogicalData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses an equality expression.
    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while matches!(self, Type::BangEqual, Type::EqualEqual) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a comparison expression.
    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while matches!(self, Type::Greater, Type::GreaterEqual, Type::Less, Type::LessEqual) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a term expression.
    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while matches!(self, Type::Minus, Type::Plus) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a factor expression.
    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while matches!(self, Type::Slash, Type::Star) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a unary expression.
    fn unary(&mut self) -> ParseResult<Expr> {
        if matches!(self, Type::Minus, Type::Not) {
            let operator = self.previous().clone();
            let right = self.unary()?;

            return Ok(Expr::Unary(UnaryData {
                operator,
                right: Box::new(right),
            }));
        }

        self.call()
    }

    /// Parses a call expression. Invocations and property accesses chain
    /// left-associatively: `a.b().c.d(x)`.
    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if matches!(self, Type::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if matches!(self, Type::Dot) {
                let name = self.consume(Type::Identifier, "Expected property name after `.`")?.clone();
                expr = Expr::Get(GetData { object: Box::new(expr), name });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parses the arguments of a call expression.
    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = vec![];

        if !self.check(Type::RightParen) {
            loop {
                if arguments.len() >= 255 {
                    // Report without entering panic mode.
                    let token = self.peek().clone();
                    self.ctx.error_token(&token, "Too many arguments (255 maximum)");
                }

                arguments.push(self.expression()?);

                if !matches!(self, Type::Comma) {
                    break;
                }
            }
        }

        let paren = self.consume(Type::RightParen, "Expected `)` after call arguments")?.clone();

        Ok(Expr::Call(CallData {
            callee: Box::new(callee),
            paren,
            arguments,
        }))
    }

    /// Parses a primary expression.
    fn primary(&mut self) -> ParseResult<Expr> {
        if matches!(self, Type::Integer, Type::Float, Type::String) {
            return Ok(Expr::Literal(self.previous().literal.clone()
                .expect("number or string token to have a literal value")));
        }

        if matches!(self, Type::True) {
            return Ok(Expr::Literal(Literal::Bool(true)));
        }

        if matches!(self, Type::False) {
            return Ok(Expr::Literal(Literal::Bool(false)));
        }

        if matches!(self, Type::None) {
            return Ok(Expr::Literal(Literal::None));
        }

        if matches!(self, Type::Identifier) {
            return Ok(Expr::Variable(VariableData {
                name: self.previous().clone(),
            }));
        }

        if matches!(self, Type::LeftParen) {
            let expr = self.expression()?;
            self.consume(Type::RightParen, "Expected `)` after expression")?;

            return Ok(Expr::Grouping(GroupingData { expr: Box::new(expr) }));
        }

        Err(ParseError {
            token: self.peek().clone(),
            message: "Expected an expression".to_string(),
        })
    }

    /// Tries to recover from a parse error by skipping tokens until the next
    /// statement boundary.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().r#type == Type::Semicolon {
                return;
            }

            match self.peek().r#type {
                Type::Let => return,
                Type::Fun => return,
                Type::Struct => return,
                Type::If => return,
                Type::While => return,
                Type::For => return,
                Type::Return => return,
                _ => self.advance(),
            };
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ast::AstPrinter;
    use crate::scanner::Scanner;

    fn parse(source: &str) -> (Vec<Stmt>, bool) {
        let mut ctx = Context::new();
        let tokens = Scanner::new(source, &mut ctx).scan();
        let statements = Parser::new(tokens, &mut ctx).parse();
        (statements, ctx.had_compile_error())
    }

    fn print(source: &str) -> String {
        let (statements, had_error) = parse(source);
        assert!(!had_error, "unexpected parse error in {source:?}");

        statements.iter()
            .map(|stmt| AstPrinter.print_stmt(stmt))
            .collect::<Vec<String>>()
            .join(" ")
    }

    #[test]
    fn precedence() {
        assert_eq!(print("1 + 2 * 3;"), "(expr (+ 1 (* 2 3)))");
        assert_eq!(print("(1 + 2) * 3;"), "(expr (* (group (+ 1 2)) 3))");
        assert_eq!(print("1 < 2 == true;"), "(expr (== (< 1 2) true))");
        assert_eq!(print("not true or false;"), "(expr (or (not true) false))");
    }

    #[test]
    fn unary_nesting() {
        assert_eq!(print("--1;"), "(expr (- (- 1)))");
        assert_eq!(print("not not false;"), "(expr (not (not false)))");
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(print("a = b = 1;"), "(expr (= a (= b 1)))");
    }

    #[test]
    fn invalid_assignment_target() {
        let (_, had_error) = parse("1 = 2;");
        assert!(had_error);
    }

    #[test]
    fn call_chain_is_left_associative() {
        assert_eq!(print("a.b().c.d(x);"), "(expr (. (. (. a b)() c) d)(x))");
    }

    #[test]
    fn let_declaration() {
        assert_eq!(print("let x;"), "(let x)");
        assert_eq!(print("let x = 1 + 2;"), "(let x = (+ 1 2))");
    }

    #[test]
    fn if_else() {
        assert_eq!(
            print("if (true) 1; else 2;"),
            "(if true (expr 1) else (expr 2))",
        );
    }

    #[test]
    fn while_loop() {
        assert_eq!(print("while (x < 3) { x = x + 1; }"), "(while (< x 3) { (expr (= x (+ x 1))) })");
    }

    #[test]
    fn for_desugars_to_while() {
        assert_eq!(
            print("for (let i = 0; i < 3; i = i + 1) print(i);"),
            "{ (let i = 0) (while (< i 3) { (expr print(i)) (expr (= i (+ i 1))) }) }",
        );
    }

    #[test]
    fn for_without_clauses() {
        assert_eq!(print("for (;;) 1;"), "(while true (expr 1))");
    }

    #[test]
    fn function_declaration() {
        assert_eq!(
            print("fun add(a, b) { return a + b; }"),
            "(fun add(a b) { (return (+ a b)) })",
        );
    }

    #[test]
    fn struct_declaration() {
        assert_eq!(
            print("struct Point { fun init(self, x) { self.x = x; } }"),
            "(struct Point { (fun init(self x) { (expr (= (. self x) x)) }) })",
        );
    }

    #[test]
    fn parser_is_deterministic() {
        let source = "fun f(a) { return a * 2; } let x = f(21);";
        assert_eq!(print(source), print(source));
    }

    #[test]
    fn synchronizes_after_error() {
        // The bad first statement is reported; the rest still parses.
        let (statements, had_error) = parse("let = 1; let x = 2;");

        assert!(had_error);
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn missing_semicolon() {
        let (_, had_error) = parse("1 + 2");
        assert!(had_error);
    }
}
