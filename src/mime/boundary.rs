//! MIME boundary token generation.

use chrono::Utc;
use rand::Rng;

/// Random suffix length. Together with the millisecond timestamp this makes
/// token reuse across concurrent invocations practically impossible.
const SUFFIX_LEN: usize = 12;

/// Alphanumeric alphabet for the random suffix (all valid boundary
/// characters per RFC 2046 §5.1.1).
const SUFFIX_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a fresh boundary token: `=_Part_<unix-millis>_<random suffix>`.
///
/// The `=_` prefix can occur in neither base64 nor quoted-printable output
/// (`_` is not in the base64 alphabet and `=` only appears as trailing
/// padding), so the token cannot collide with encoded attachment data.
pub fn generate() -> String {
    let millis = Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARS[rng.gen_range(0..SUFFIX_CHARS.len())] as char)
        .collect();
    format!("=_Part_{millis}_{suffix}")
}
