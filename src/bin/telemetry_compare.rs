fn main() {
    if let Err(err) = telemetry_csv_merger::run_compare() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
