use crate::DecodeError;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const NO_VALUE: u8 = 255;
const RADIX: u64 = 36;

const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        let c = ALPHABET[i];
        lut[c as usize] = i as u8;
        if c.is_ascii_lowercase() {
            lut[(c - 32) as usize] = i as u8;
        }
        i += 1;
    }
    lut
};

/// Encodes `value` in lower-case base36, shortest form. Zero encodes as `"0"`.
pub(crate) fn encode_base36(mut value: u64) -> String {
    // 36^13 > 2^64
    let mut buf = [0_u8; 13];
    let mut start = buf.len();
    loop {
        start -= 1;
        buf[start] = ALPHABET[(value % RADIX) as usize];
        value /= RADIX;
        if value == 0 {
            break;
        }
    }
    buf[start..].iter().map(|&b| b as char).collect()
}

/// Decodes base36 in either case.
pub(crate) fn decode_base36(encoded: &str) -> Result<u64, DecodeError> {
    if encoded.is_empty() {
        return Err(DecodeError::InvalidLength {
            len: 0,
            expected: 1,
        });
    }

    let mut acc = 0_u64;
    for (index, byte) in encoded.bytes().enumerate() {
        let val = LOOKUP[byte as usize];
        if val == NO_VALUE {
            return Err(DecodeError::InvalidAscii { byte, index });
        }
        acc = acc
            .checked_mul(RADIX)
            .and_then(|acc| acc.checked_add(u64::from(val)))
            .ok_or(DecodeError::Overflow)?;
    }
    Ok(acc)
}
