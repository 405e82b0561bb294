//! il is a small dynamically typed, imperative scripting language executed
//! by a tree-walk interpreter with a hand-written recursive descent parser.
//! A program is a sequence of declarations and statements; execution starts
//! at the top and runs in source order. Functions, structs and struct
//! instances are first-class values.
//!
//! ## Scanning
//! The first step is scanning: converting the source text into a list of
//! tokens. The scanner is implemented in the [`scanner`] module as a state
//! machine over a character iterator. Scan errors (an unterminated string,
//! a stray character) are reported as soon as they are encountered and
//! scanning continues, so a single run surfaces every lexical problem.
//!
//! ## Parsing
//! The second step is parsing: converting the token list into an abstract
//! syntax tree. The parser is implemented in the [`parser`] module.
//! [`Expressions`](expr::Expr) are pieces of code that produce a value;
//! [`Statements`](stmt::Stmt) perform an action, like declaring a variable
//! or running a loop. After a syntax error the parser synchronizes to the
//! next statement boundary and keeps going, again to surface as many
//! problems as possible in one run.
//!
//! ## Analyzing
//! The third step is a single static pass over the tree, implemented in the
//! [`analyzer`] module. It enforces the structural rules the grammar cannot
//! express: functions and structs may only be declared at the top level,
//! and `return` only makes sense inside a function body.
//!
//! ## Interpreting
//! The final step is evaluation, implemented in the [`interpreter`] module.
//! Values are [`Objects`](object::Object): none, booleans, integers,
//! floats, strings, functions, methods, structs and struct instances.
//! Variables live in an [`Environment`](environment::Environment) chain of
//! scopes rooted at the global scope, which also holds the built-in
//! functions from the [`builtins`] module. Runtime errors carry their
//! source token up the call stack and end the program with a diagnostic.
//!
//! All diagnostics flow through a [`Context`](context::Context) that is
//! passed to every stage; nothing in the pipeline is global state.

use std::fs;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod analyzer;
pub mod ast;
pub mod builtins;
pub mod context;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod scanner;
pub mod stmt;
pub mod structs;
pub mod token;

use analyzer::Analyzer;
use context::Context;
use interpreter::Interpreter;
use parser::Parser;
use scanner::Scanner;

/// The interpreter driver: owns the diagnostics context and the interpreter
/// state, and runs programs from a file or an interactive prompt.
pub struct Il {
    interpreter: Interpreter,
    ctx: Context,
}

impl Il {
    pub fn new() -> Self {
        Il {
            interpreter: Interpreter::new(),
            ctx: Context::new(),
        }
    }

    /// Runs the file at `path` as one program. Returns the process exit
    /// code: 0 on success, 1 when the file is unreadable or any compile or
    /// runtime error occurred.
    pub fn run_file(&mut self, path: &str) -> i32 {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => {
                eprintln!("il: could not read file `{path}`");
                return 1;
            },
        };

        self.run(&contents);

        if self.ctx.had_compile_error() || self.ctx.had_runtime_error() {
            1
        } else {
            0
        }
    }

    /// Runs the interactive prompt until end of input. Every line is a
    /// program of its own, but the interpreter state carries over, so
    /// definitions from earlier lines stay visible. Always exits 0.
    pub fn run_prompt(&mut self) -> i32 {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(_) => return 1,
        };

        let history = home::home_dir().map(|dir| dir.join(".il_history"));
        if let Some(path) = &history {
            let _ = editor.load_history(path);
        }

        loop {
            match editor.readline("il> ") {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    let _ = editor.add_history_entry(&line);

                    self.run(&line);

                    // An error in one line must not poison the next one.
                    self.ctx.reset();
                },
                Err(ReadlineError::Interrupted) => continue,
                Err(_) => break,
            }
        }

        if let Some(path) = &history {
            let _ = editor.save_history(path);
        }

        0
    }

    /// Runs one program through the pipeline, stopping at the first stage
    /// that reports an error.
    fn run(&mut self, source: &str) {
        let tokens = Scanner::new(source, &mut self.ctx).scan();

        if self.ctx.had_compile_error() {
            return;
        }

        let statements = Parser::new(tokens, &mut self.ctx).parse();

        if self.ctx.had_compile_error() {
            return;
        }

        Analyzer::new(&mut self.ctx).analyze(&statements);

        if self.ctx.had_compile_error() {
            return;
        }

        self.interpreter.interpret(&statements, &mut self.ctx);
    }
}

impl Default for Il {
    fn default() -> Self {
        Self::new()
    }
}
