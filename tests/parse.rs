#[macro_use]
mod common;

#[cfg(test)]
mod parse {
    tests! {
        missing_semicolon in parse is ERR
        "[line 1] Error at end: Expected `;` after expression"
    }

    tests! {
        invalid_assignment in parse is ERR
        "[line 1] Error at `=`: Invalid assignment target"
    }

    tests! {
        expected_expression in parse is ERR
        "[line 1] Error at `;`: Expected an expression"
    }

    tests! {
        missing_close_paren in parse is ERR
        "[line 1] Error at `;`: Expected `)` after expression"
    }

    tests! {
        missing_brace in parse is ERR
        "[line 3] Error at end: Expected `}` after block"
    }

    // The parser synchronizes after the first error and reports the second
    // statement's problem too.
    tests! {
        multiple_errors in parse is ERR
        "[line 1] Error at `=`: Expected a variable name"
        "[line 2] Error at `;`: Expected an expression"
    }

    tests! {
        if_missing_paren in parse is ERR
        "[line 1] Error at `true`: Expected `(` after `if`"
    }

    // Synchronization skips to the statement after the bad declaration,
    // which leaves the orphaned `}` behind.
    tests! {
        struct_body in parse is ERR
        "[line 2] Error at `let`: Expected a function name"
        "[line 3] Error at `}`: Expected an expression"
    }
}
