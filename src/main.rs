fn main() {
    if let Err(err) = telemetry_csv_merger::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
