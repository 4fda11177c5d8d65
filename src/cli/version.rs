/// Display version information
pub fn execute() {
    println!("sigstream {}", env!("CARGO_PKG_VERSION"));
    println!("Signal gateway WebSocket ingestion trigger");
}
