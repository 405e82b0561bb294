use std::{env, process};

use il_lang::Il;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut il = Il::new();

    let code = match args.len() {
        n if n > 2 => {
            println!("Usage: il [script]");
            1
        },
        2 => il.run_file(&args[1]),
        _ => il.run_prompt(),
    };

    process::exit(code);
}
