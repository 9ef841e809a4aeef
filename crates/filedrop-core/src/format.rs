//! Display formatting helpers.

const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

/// Format a byte count as a power-of-1024 magnitude with one decimal.
///
/// Values below 1024 are printed exactly (`"1000 B"`).
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    // Compare what will be printed, so 1048575 is "1.0 MiB" rather than "1024.0 KiB"
    while round_one_decimal(value) >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", value, UNITS[unit])
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
