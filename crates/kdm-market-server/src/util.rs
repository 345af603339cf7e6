use chrono::Utc;
use getrandom::fill;

pub fn now_ts() -> i64 {
    Utc::now().timestamp()
}

pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    fill(&mut out).expect("Failed to generate random bytes");
    out
}

/// Zero-padded numeric string of `len` digits from OS randomness.
///
/// Bytes of 250 and above are discarded so all ten digits are equally
/// likely.
pub fn numeric_code(len: usize) -> String {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        for b in random_bytes(len - out.len()) {
            if b < 250 && out.len() < len {
                out.push(char::from(b'0' + (b % 10)));
            }
        }
    }
    out
}

/// Derive a url slug from a display name: lowercase ASCII alphanumerics,
/// everything else collapsed to single dashes.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut dash_pending = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if dash_pending && !out.is_empty() {
                out.push('-');
            }
            dash_pending = false;
            out.push(c.to_ascii_lowercase());
        } else {
            dash_pending = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_code_has_requested_shape() {
        for _ in 0..32 {
            let code = numeric_code(4);
            assert_eq!(code.len(), 4);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn numeric_code_reaches_every_digit() {
        // 4096 draws; a digit missing from the sample would mean the
        // rejection step is swallowing values.
        let mut seen = [false; 10];
        for _ in 0..1024 {
            for c in numeric_code(4).bytes() {
                seen[(c - b'0') as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s), "digits seen: {seen:?}");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Red Winter Jacket"), "red-winter-jacket");
        assert_eq!(slugify("  -- spaced --  "), "spaced");
        assert_eq!(slugify("Éclair 2000"), "clair-2000");
        assert_eq!(slugify(""), "");
    }
}
