//! Human-readable byte counts.

const SI_PREFIXES: [&str; 6] = ["k", "M", "G", "T", "P", "E"];
const BINARY_PREFIXES: [&str; 6] = ["Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];

/// Format a byte count with one decimal, e.g. `"976.6 KiB"` or, with `si`, `"1.0 MB"`.
///
/// Counts below one unit are printed as whole bytes. Rounding is done on whole
/// tenths, half up; values that would round up to `1000.0` (or `1024.0`) of a
/// unit are shown as `1.0` of the next unit instead.
///
/// ```
/// assert_eq!(wkr::humanise_bytes(1024, false), "1.0 KiB");
/// assert_eq!(wkr::humanise_bytes(999_950, true), "1.0 MB");
/// assert_eq!(wkr::humanise_bytes(-5, false), "-5 B");
/// ```
pub fn humanise_bytes(bytes: i64, si: bool) -> String {
    let unit: u128 = if si { 1000 } else { 1024 };
    let magnitude = u128::from(bytes.unsigned_abs());
    if magnitude < unit {
        return format!("{} B", bytes);
    }

    let mut exponent = 1;
    let mut scale = unit;
    let mut tenths = rounded_tenths(magnitude, scale);
    while tenths >= unit * 10 && exponent < SI_PREFIXES.len() {
        exponent += 1;
        scale *= unit;
        tenths = rounded_tenths(magnitude, scale);
    }

    let prefixes = if si { &SI_PREFIXES } else { &BINARY_PREFIXES };
    let sign = if bytes < 0 { "-" } else { "" };
    format!(
        "{}{}.{} {}B",
        sign,
        tenths / 10,
        tenths % 10,
        prefixes[exponent - 1]
    )
}

/// `magnitude / scale` in tenths, rounded half up
fn rounded_tenths(magnitude: u128, scale: u128) -> u128 {
    (magnitude * 20 + scale) / (scale * 2)
}
