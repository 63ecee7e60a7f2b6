fn main() {
    if let Err(err) = pradakshina_lib::run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
