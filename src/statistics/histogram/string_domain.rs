// Copyright 2025 StrataDB Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fixed-prefix code domain for string histograms
//!
//! Strings map onto the integers by their first eight bytes, big-endian, so
//! `<` and `<=` on codes agree with raw byte order on the prefix. The
//! mapping is lossy beyond the prefix; it is used only for bucket-width and
//! interpolation arithmetic, never for exclusion decisions.

/// Number of leading bytes that participate in the code
pub const STRING_PREFIX_LENGTH: usize = 8;

/// Map a string to its prefix code
pub fn encode_prefix(value: &str) -> u64 {
    let bytes = value.as_bytes();
    let mut code = 0u64;
    for index in 0..STRING_PREFIX_LENGTH {
        code <<= 8;
        code |= bytes.get(index).copied().unwrap_or(0) as u64;
    }
    code
}

/// Map a prefix code back to the shortest string with that code
///
/// Trailing zero bytes are dropped; non-UTF-8 bytes are replaced. Only used
/// to materialize interpolated bucket boundaries.
pub fn decode_prefix(code: u64) -> String {
    let bytes = code.to_be_bytes();
    let end = bytes
        .iter()
        .rposition(|&byte| byte != 0)
        .map(|position| position + 1)
        .unwrap_or(0);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// The smallest code strictly above every string starting with `prefix`
///
/// Returns `None` when no such code exists (prefix of 0xFF bytes).
pub fn prefix_upper_bound(prefix: &str) -> Option<u64> {
    let code = encode_prefix(prefix);
    let used = prefix.len().min(STRING_PREFIX_LENGTH);
    if used == 0 {
        return None;
    }
    let step = 1u64
        .checked_shl((8 * (STRING_PREFIX_LENGTH - used)) as u32)
        .unwrap_or(1);
    code.checked_add(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_agree_with_byte_order() {
        assert!(encode_prefix("a") < encode_prefix("b"));
        assert!(encode_prefix("ab") < encode_prefix("ac"));
        assert!(encode_prefix("a") < encode_prefix("ab"));
        assert_eq!(encode_prefix(""), 0);
    }

    #[test]
    fn decode_inverts_short_strings() {
        for value in ["", "a", "abc", "stratadb"] {
            assert_eq!(decode_prefix(encode_prefix(value)), value);
        }
    }

    #[test]
    fn long_strings_share_their_prefix_code() {
        assert_eq!(
            encode_prefix("columnar-a"),
            encode_prefix("columnar-b")
        );
    }

    #[test]
    fn upper_bound_brackets_the_prefix() {
        let bound = prefix_upper_bound("ab").unwrap();
        assert!(encode_prefix("ab") < bound);
        assert!(encode_prefix("abzzz") < bound);
        assert!(encode_prefix("ac") >= bound);
        assert_eq!(prefix_upper_bound(""), None);
    }
}
