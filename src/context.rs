use crate::error::RuntimeError;
use crate::token::{Token, Type};

/// Collects the error state of a single program run.
///
/// Every pipeline stage reports its diagnostics through a context instead of
/// printing on its own. The driver inspects the flags between stages and
/// short-circuits the pipeline as soon as one is set.
#[derive(Debug, Default)]
pub struct Context {
    had_compile_error: bool,
    had_runtime_error: bool,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    /// Reports an error at a source line.
    pub fn error(&mut self, line: usize, message: &str) {
        eprintln!("[line {line}] Error: {message}");
        self.had_compile_error = true;
    }

    /// Reports an error at a token.
    pub fn error_token(&mut self, token: &Token, message: &str) {
        if token.r#type == Type::Eof {
            eprintln!("[line {line}] Error at end: {message}", line = token.line);
        } else {
            eprintln!(
                "[line {line}] Error at `{lexeme}`: {message}",
                line = token.line,
                lexeme = token.lexeme,
            );
        }

        self.had_compile_error = true;
    }

    /// Reports an error raised during evaluation.
    pub fn runtime_error(&mut self, error: &RuntimeError) {
        eprintln!("{message}\n[line {line}]", message = error.message, line = error.token.line);
        self.had_runtime_error = true;
    }

    pub fn had_compile_error(&self) -> bool {
        self.had_compile_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Clears both flags. Used by the REPL between lines.
    pub fn reset(&mut self) {
        self.had_compile_error = false;
        self.had_runtime_error = false;
    }
}
