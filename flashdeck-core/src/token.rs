use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

pub const TOKEN_BYTES: usize = 16;

/// 128 random bits, base64url without padding (22 chars).
pub fn new_token() -> String {
    let raw: [u8; TOKEN_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(raw)
}

pub fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_url_safe_and_distinct() {
        let a = new_token();
        let b = new_token();
        assert_eq!(a.len(), 22);
        assert!(is_token(&a));
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_path_like_keys() {
        assert!(!is_token(""));
        assert!(!is_token(".."));
        assert!(!is_token("a/b"));
        assert!(!is_token("x.png"));
        assert!(is_token("AbC-_09"));
    }
}
