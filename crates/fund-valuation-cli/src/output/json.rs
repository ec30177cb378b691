use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print JSON to stdout.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match serde_json::to_writer_pretty(&mut handle, value) {
        Ok(()) => {
            let _ = handle.write_all(b"\n");
        }
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}
