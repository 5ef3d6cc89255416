//! Field-level checks shared by create and update.

use serde_json::Value;

const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];
// 2^53; past this floats no longer hold every integer exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// String form of an id given as a JSON string or number. Integral floats
/// (`1.0`) read the same as the integer (`1`).
pub fn normalize_id(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_f64() => {
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER {
                Some((f as i64).to_string())
            } else {
                Some(n.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric value of a price given as a JSON number or a numeric string.
/// Non-finite values are rejected.
pub fn parse_price(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// `null` and empty/whitespace strings mean "no value supplied".
pub fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Accepts `http(s)://<something>.<jpg|jpeg|png|gif|webp>` with an optional
/// `?query` suffix. Scheme and extension are case-insensitive.
pub fn is_valid_image_url(url: &str) -> bool {
    if url.contains(['\n', '\r']) {
        return false;
    }
    let lower = url.to_ascii_lowercase();
    let Some(rest) = lower.strip_prefix("http://").or_else(|| lower.strip_prefix("https://")) else {
        return false;
    };
    // the query may itself contain '?', so any '?' can start it
    has_image_extension(rest) || rest.match_indices('?').any(|(i, _)| has_image_extension(&rest[..i]))
}

fn has_image_extension(s: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| s.len() > ext.len() && s.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_normalise_to_strings() {
        assert_eq!(normalize_id(&json!("abc")), Some("abc".into()));
        assert_eq!(normalize_id(&json!(42)), Some("42".into()));
        assert_eq!(normalize_id(&json!(1.0)), Some("1".into()));
        assert_eq!(normalize_id(&json!(-3.0)), Some("-3".into()));
        assert_eq!(normalize_id(&json!(1.5)), Some("1.5".into()));
        assert_eq!(normalize_id(&json!(true)), None);
        assert_eq!(normalize_id(&json!(null)), None);
    }

    #[test]
    fn prices_parse_from_numbers_and_strings() {
        assert_eq!(parse_price(&json!(5.5)), Some(5.5));
        assert_eq!(parse_price(&json!(3)), Some(3.0));
        assert_eq!(parse_price(&json!(" 4.5 ")), Some(4.5));
        assert_eq!(parse_price(&json!("-1")), Some(-1.0));
        assert_eq!(parse_price(&json!("abc")), None);
        assert_eq!(parse_price(&json!("inf")), None);
        assert_eq!(parse_price(&json!("NaN")), None);
        assert_eq!(parse_price(&json!([1])), None);
    }

    #[test]
    fn blank_values() {
        assert!(is_blank(&json!(null)));
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!("   ")));
        assert!(!is_blank(&json!(0)));
        assert!(!is_blank(&json!("x")));
    }

    #[test]
    fn image_urls() {
        for ok in [
            "http://cdn.example.com/burger.jpg",
            "https://cdn.example.com/a/b/fries.JPEG",
            "HTTPS://x.io/p.png?w=200&h=100",
            "https://x.io/p.webp?",
            "http://x.io/p.gif?next=http://y.io?z",
            "http://a.io/x?y.png",
        ] {
            assert!(is_valid_image_url(ok), "{ok} should be accepted");
        }
        for bad in [
            "not-a-url",
            "ftp://x.io/p.png",
            "https://x.io/p.bmp",
            "https://.png",
            "https://x.io/p.png#frag",
            "https://x.io/p.pngx",
            "https://x.io/\np.png",
        ] {
            assert!(!is_valid_image_url(bad), "{bad} should be rejected");
        }
    }
}
