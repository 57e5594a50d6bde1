//! Shared big-endian, length-prefixed encode/decode helpers.
//!
//! Every wire format in this crate fixes the same shape — `u64` lengths,
//! big-endian integers, no tagging beyond what's spelled out per format —
//! so bulletin-board entries, tally proofs and event-log exports all
//! build on the same handful of primitives rather than each rolling its
//! own.

use std::io::{Read, Write};

use anyhow::{anyhow, Context, Result};

/// Write a `u64` as 8 big-endian bytes.
pub fn write_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_be_bytes());
}

/// Write a byte slice prefixed with its `u64` big-endian length.
pub fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_u64(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Write a UTF-8 string prefixed with its `u64` big-endian byte length.
pub fn write_str(buf: &mut Vec<u8>, s: &str) {
    write_bytes(buf, s.as_bytes());
}

/// Write an optional field as a flag byte (`0` absent, `1` present)
/// followed by the length-prefixed bytes when present, per the event-log
/// export format.
pub fn write_optional(buf: &mut Vec<u8>, value: Option<&[u8]>) {
    match value {
        Some(bytes) => {
            buf.push(1);
            write_bytes(buf, bytes);
        },
        None => buf.push(0),
    }
}

/// Read a big-endian `u64`.
pub fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut bytes = [0u8; 8];
    reader.read_exact(&mut bytes).context("missing u64 field")?;
    Ok(u64::from_be_bytes(bytes))
}

/// Read a `u64`-length-prefixed byte vector.
pub fn read_bytes<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let len = read_u64(reader)?;
    let len = usize::try_from(len).map_err(|_| anyhow!("length field overflows usize"))?;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).context("truncated length-prefixed field")?;
    Ok(buf)
}

/// Read a `u64`-length-prefixed UTF-8 string.
pub fn read_str<R: Read>(reader: &mut R) -> Result<String> {
    let bytes = read_bytes(reader)?;
    String::from_utf8(bytes).context("length-prefixed field was not valid UTF-8")
}

/// Read a flag byte followed by a length-prefixed field if the flag is `1`.
pub fn read_optional<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut flag = [0u8; 1];
    reader.read_exact(&mut flag).context("missing optional-field flag")?;
    match flag[0] {
        0 => Ok(None),
        1 => Ok(Some(read_bytes(reader)?)),
        other => Err(anyhow!("invalid optional-field flag byte: {other}")),
    }
}

/// Read a fixed-width array, used for 32-byte hashes and signatures whose
/// width is implied by the type rather than length-prefixed.
pub fn read_fixed<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).context("truncated fixed-width field")?;
    Ok(buf)
}

/// Encode a `u64` plaintext as the 32-byte big-endian bigint encoding §6
/// mandates for ciphertext-adjacent integers on the wire. Note this is
/// distinct from a `Ciphertext`'s own compressed-point encoding
/// (`crate::homomorphic::Ciphertext::to_bytes`).
#[must_use]
pub fn u64_to_bigint32(value: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&value.to_be_bytes());
    out
}

/// Write an arbitrary writer-facing byte buffer to a [`Write`] sink,
/// a thin helper so export call sites don't need to import `std::io::Write`
/// themselves just to flush a prepared buffer.
pub fn flush_to<W: Write>(writer: &mut W, buf: &[u8]) -> Result<()> {
    writer.write_all(buf).context("failed to write wire buffer")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u64_roundtrips() {
        let mut buf = Vec::new();
        write_u64(&mut buf, 123_456_789);
        let mut cursor = buf.as_slice();
        assert_eq!(read_u64(&mut cursor).unwrap(), 123_456_789);
    }

    #[test]
    fn bytes_roundtrip() {
        let mut buf = Vec::new();
        write_bytes(&mut buf, b"hello world");
        let mut cursor = buf.as_slice();
        assert_eq!(read_bytes(&mut cursor).unwrap(), b"hello world");
    }

    #[test]
    fn optional_field_roundtrips_present_and_absent() {
        let mut buf = Vec::new();
        write_optional(&mut buf, Some(b"present"));
        write_optional(&mut buf, None);

        let mut cursor = buf.as_slice();
        assert_eq!(read_optional(&mut cursor).unwrap(), Some(b"present".to_vec()));
        assert_eq!(read_optional(&mut cursor).unwrap(), None);
    }

    #[test]
    fn bigint32_encodes_big_endian_in_low_bytes() {
        let encoded = u64_to_bigint32(1);
        assert_eq!(encoded[31], 1);
        assert!(encoded[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn read_bytes_rejects_truncated_input() {
        let mut buf = Vec::new();
        write_u64(&mut buf, 100);
        let mut cursor = buf.as_slice();
        assert!(read_bytes(&mut cursor).is_err());
    }
}
