const MIB: u64 = 1024 * 1024;

/// Device names are read into a 64-byte buffer by the driver.
pub const DEVICE_NAME_MAX_LEN: usize = 63;
/// Process names are read into a 64-byte buffer by the driver.
pub const PROCESS_NAME_BUFFER_SIZE: usize = 64;
pub const PROCESS_NAME_MAX_LEN: usize = PROCESS_NAME_BUFFER_SIZE - 1;
/// LOGIN_NAME_MAX minus the terminator.
pub const USER_NAME_MAX_LEN: usize = 255;

/// Whole mebibytes, truncating.
pub fn bytes_to_mib(bytes: u64) -> u64 {
    bytes / MIB
}

/// Cuts `text` down to at most `max_len` bytes without splitting a character.
pub fn bounded(mut text: String, max_len: usize) -> String {
    if text.len() > max_len {
        let mut end = max_len;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mebibytes_truncate() {
        assert_eq!(bytes_to_mib(5 * MIB), 5);
        assert_eq!(bytes_to_mib(16 * MIB), 16);
        assert_eq!(bytes_to_mib(2 * MIB - 1), 1);
        assert_eq!(bytes_to_mib(0), 0);
    }

    #[test]
    fn bounded_leaves_short_names_alone() {
        assert_eq!(bounded("python3".to_string(), PROCESS_NAME_MAX_LEN), "python3");
    }

    #[test]
    fn bounded_truncates_on_char_boundary() {
        let long = "a".repeat(70);
        assert_eq!(bounded(long, PROCESS_NAME_MAX_LEN).len(), 63);

        // 'é' is two bytes; a cut at 4 would split the second one.
        assert_eq!(bounded("éaé".to_string(), 4), "éa");
    }
}
