//! `jals` binary entry point

fn main() {
    if let Err(err) = jals_cli::run() {
        jals_cli::print_error(&err.to_string());
        std::process::exit(1);
    }
}
