//! Password normalization shared by EIP-2335 keystores and mnemonic input.

use unicode_normalization::UnicodeNormalization;

/// C0, DEL and C1 control code points
fn is_control(c: char) -> bool {
    let cp = c as u32;
    cp < 0x20 || cp == 0x7f || (0x80..=0x9f).contains(&cp)
}

/// NFKD-normalizes `raw` and strips control characters.
///
/// Must run before any KDF sees the password; two passwords that render the
/// same but differ in composition otherwise derive different keys.
pub fn normalize(raw: &str) -> String {
    raw.nfkd().filter(|c| !is_control(*c)).collect()
}
