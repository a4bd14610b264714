use std::process::exit;

fn main() {
    if let Err(e) = recordshelf::app::run_cli() {
        eprintln!("Error: {e}");
        exit(1);
    }
}
