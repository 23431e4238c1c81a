use crate::DecodeError;

const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const NO_VALUE: u8 = 255;
const BITS_PER_CHAR: u32 = 5;

/// Characters needed for 64 bits: ceil(64 / 5).
pub(crate) const BASE32_LEN: usize = 13;

/// 13 * 5 = 65 bits, so the leading character holds only the top 4.
const MAX_LEADING: u8 = 0xF;

/// Lookup table for Crockford base32 decoding
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    // Main alphabet, allow lower-case
    while i < 32 {
        let c = ALPHABET[i as usize];
        lut[c as usize] = i;
        if c.is_ascii_uppercase() {
            lut[(c + 32) as usize] = i; // lowercase letter
        }
        i += 1;
    }
    // Crockford-specific aliases
    lut[b'O' as usize] = 0;
    lut[b'o' as usize] = 0;
    lut[b'I' as usize] = 1;
    lut[b'i' as usize] = 1;
    lut[b'L' as usize] = 1;
    lut[b'l' as usize] = 1;
    lut
};

/// Encodes `value` as exactly [`BASE32_LEN`] Crockford base32 characters,
/// most significant first. The leading character carries only 4 bits.
pub(crate) fn encode_base32(value: u64) -> String {
    let mut buf = [0_u8; BASE32_LEN];
    for (i, slot) in buf.iter_mut().rev().enumerate() {
        let shift = i as u32 * BITS_PER_CHAR;
        *slot = ALPHABET[((value >> shift) & 0x1F) as usize];
    }
    // Every byte comes from ALPHABET, which is ASCII.
    buf.iter().map(|&b| b as char).collect()
}

/// Decodes a fixed-length Crockford base32 string.
///
/// The first character may carry at most 4 bits; anything above `F` does not
/// fit in a `u64` and yields [`DecodeError::Overflow`].
pub(crate) fn decode_base32(encoded: &str) -> Result<u64, DecodeError> {
    if encoded.len() != BASE32_LEN {
        return Err(DecodeError::InvalidLength {
            len: encoded.len(),
            expected: BASE32_LEN,
        });
    }

    let mut acc = 0_u64;
    let mut leading = 0_u8;
    for (index, byte) in encoded.bytes().enumerate() {
        let val = LOOKUP[byte as usize];
        if val == NO_VALUE {
            return Err(DecodeError::InvalidAscii { byte, index });
        }
        if index == 0 {
            leading = val;
        }
        acc = (acc << BITS_PER_CHAR) | u64::from(val);
    }
    if leading > MAX_LEADING {
        return Err(DecodeError::Overflow);
    }
    Ok(acc)
}
