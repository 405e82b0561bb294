#[macro_use]
mod common;

#[cfg(test)]
mod block {
    tests! {
        assign_through in block is OK
        "2"
    }

    tests! {
        nested in block is OK
        "3"
        "2"
        "1"
    }
}
