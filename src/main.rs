fn main() {
    if let Err(err) = owchat::cli::main() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
