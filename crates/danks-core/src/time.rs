/// Current Unix time in whole seconds.
pub fn unix_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Returns a simple timestamp string (Unix epoch seconds with Z suffix).
pub fn timestamp_now() -> String {
    format!("{}Z", unix_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_ends_with_z() {
        let ts = timestamp_now();
        assert!(ts.ends_with('Z'));
        assert!(ts[..ts.len() - 1].parse::<u64>().is_ok());
    }
}
