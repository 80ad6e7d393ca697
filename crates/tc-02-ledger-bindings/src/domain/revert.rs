//! # Revert Reason Codec
//!
//! Ledger reverts carry an ABI-encoded `Error(string)` payload: a 4-byte
//! selector, a 32-byte offset, a 32-byte length, then the UTF-8 bytes padded
//! to a 32-byte boundary. The orchestrator decodes this into the
//! human-readable reason shown to the caller.

/// 4-byte selector of `Error(string)`.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

const WORD: usize = 32;

fn push_word_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&[0u8; WORD - 8]);
    out.extend_from_slice(&value.to_be_bytes());
}

/// Encode a reason string into the standard revert payload.
pub fn encode_revert_reason(reason: &str) -> Vec<u8> {
    let bytes = reason.as_bytes();
    let padded_len = bytes.len().div_ceil(WORD) * WORD;

    let mut out = Vec::with_capacity(4 + WORD * 2 + padded_len);
    out.extend_from_slice(&ERROR_STRING_SELECTOR);
    push_word_u64(&mut out, WORD as u64); // offset to the string head
    push_word_u64(&mut out, bytes.len() as u64);
    out.extend_from_slice(bytes);
    out.resize(4 + WORD * 2 + padded_len, 0);
    out
}

/// Decode the standard revert payload back into the reason string.
///
/// Returns `None` for payloads that are not `Error(string)` encoded or are
/// truncated; callers fall back to a generic message.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.len() < 4 + WORD * 2 || data[..4] != ERROR_STRING_SELECTOR {
        return None;
    }
    let words = &data[4..];

    let offset = read_word_usize(words, 0)?;
    let len = read_word_usize(words, offset)?;
    let start = offset + WORD;
    let bytes = words.get(start..start + len)?;
    String::from_utf8(bytes.to_vec()).ok()
}

fn read_word_usize(words: &[u8], at: usize) -> Option<usize> {
    let word = words.get(at..at + WORD)?;
    // Reject values that do not fit usize; the high bytes must be zero.
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return None;
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(buf)).ok()
}
