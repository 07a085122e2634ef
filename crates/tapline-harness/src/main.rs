#![forbid(unsafe_code)]

fn main() {
    tapline_harness::init_tracing();
    if let Err(error) = tapline_harness::run_from_env() {
        eprintln!("tapline: {error}");
        std::process::exit(error.exit_code());
    }
}
