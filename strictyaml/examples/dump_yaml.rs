use std::env;
use std::fs;

fn main() {
    let args: Vec<_> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: dump_yaml <strictyaml file>");
        return;
    }
    let text = fs::read_to_string(&args[1]).unwrap();
    match strictyaml::parse(&text) {
        Ok(doc) => println!("{}", doc.as_yaml()),
        Err(e) => println!("{e}"),
    }
}
