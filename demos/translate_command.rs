use roscmd::translate::translate;
use std::env;
use std::process;

fn print_usage() {
    eprintln!("Usage: cargo run --example translate_command -- '<command>'");
    eprintln!("Example: cargo run --example translate_command -- '/system identity set name=router'");
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        print_usage();
        process::exit(2);
    }

    let command = &args[1];
    let structured = match translate(command) {
        Ok(structured) => structured,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    };

    println!("command      = {command}");
    println!("api path     = {}", structured.api_path());
    println!("command word = {}", structured.command_word());
    println!(
        "verb         = {}",
        structured.verb.as_deref().unwrap_or("(none)")
    );
    for (key, value) in &structured.attributes {
        match value {
            Some(value) => println!("attribute    = {key}={value}"),
            None => println!("attribute    = {key} (flag)"),
        }
    }
}
