#[macro_use]
mod common;

#[cfg(test)]
mod scan {
    tests! {
        unexpected_character in scan is ERR
        "[line 1] Error: Unexpected character: `@`"
    }

    tests! {
        bare_bang in scan is ERR
        "[line 1] Error: Unexpected bare `!` character"
    }

    tests! {
        unterminated_string in scan is ERR
        "[line 1] Error: Unterminated string"
    }

    tests! {
        number_out_of_range in scan is ERR
        "[line 1] Error: Number out of range"
    }

    // Scanning keeps going after an error so one run reports them all.
    tests! {
        multiple_errors in scan is ERR
        "[line 1] Error: Unexpected character: `@`"
        "[line 2] Error: Unexpected character: `#`"
    }
}
