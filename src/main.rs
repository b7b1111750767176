fn main() {
    if let Err(err) = containment_report::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
