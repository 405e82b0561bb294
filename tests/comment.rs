#[macro_use]
mod common;

#[cfg(test)]
mod comment {
    tests! {
        line_comment in comment is OK
        "1"
    }

    tests! {
        comment_only in comment is OK
    }
}
