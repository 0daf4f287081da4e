fn main() {
    if let Err(err) = crop_advisor::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
