fn main() {
    if let Err(err) = vocyolo::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
