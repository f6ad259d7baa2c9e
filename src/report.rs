// Human-readable sizes for job reports

/// Format a byte count as `B`, `KB` or `MB` with two decimals above 1 KB.
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    }
}

/// Percentage of the original size saved by compression. Negative when the
/// result grew.
pub fn compression_rate(original_bytes: u64, compressed_bytes: u64) -> f64 {
    if original_bytes == 0 {
        return 0.0;
    }
    (1.0 - compressed_bytes as f64 / original_bytes as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size_units() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1024), "1.00 KB");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2.00 MB");
    }

    #[test]
    fn test_compression_rate() {
        assert_eq!(compression_rate(1000, 250), 75.0);
        assert_eq!(compression_rate(1000, 1000), 0.0);
        assert!(compression_rate(1000, 1200) < 0.0);
        assert_eq!(compression_rate(0, 10), 0.0);
    }
}
