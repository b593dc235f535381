use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

/// Width class of a bit width: the smallest native container, or a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthClass {
    Native8,
    Native16,
    Native32,
    ByteBuffer,
}

impl WidthClass {
    pub fn of(width: u32) -> Self {
        match width {
            0..=8 => WidthClass::Native8,
            9..=16 => WidthClass::Native16,
            17..=32 => WidthClass::Native32,
            _ => WidthClass::ByteBuffer,
        }
    }

    pub fn native_bits(&self) -> Option<u32> {
        match self {
            WidthClass::Native8 => Some(8),
            WidthClass::Native16 => Some(16),
            WidthClass::Native32 => Some(32),
            WidthClass::ByteBuffer => None,
        }
    }
}

pub fn byte_width(bits: u32) -> u32 {
    (bits + 7) / 8
}

/// `2^width`, as printed in two's-complement rewrites.
pub fn power_of_two(width: u32) -> BigInt {
    BigInt::one() << width as usize
}

pub fn mask_literal(width: u32) -> String {
    let mask = power_of_two(width) - BigInt::one();
    format!("{:#x}", mask)
}

pub fn print_with_base(value: &BigInt, base: u32) -> String {
    match base {
        16 if !value.is_negative() => format!("{:#x}", value),
        2 if !value.is_negative() => format!("{:#b}", value),
        _ => value.to_string(),
    }
}

/// Big-endian bytes of `value`, left-padded (or truncated from the left) to `len` bytes.
pub fn big_endian_bytes(value: &BigInt, len: usize) -> Vec<u8> {
    let (_, bytes) = if value.is_zero() {
        (num_bigint::Sign::NoSign, Vec::new())
    } else {
        value.to_bytes_be()
    };
    if bytes.len() >= len {
        bytes[bytes.len() - len..].to_vec()
    } else {
        let mut padded = vec![0u8; len - bytes.len()];
        padded.extend(bytes);
        padded
    }
}

/// `{0x0a, 0x0b}`-style initializer for a byte array, printed in `base`.
pub fn byte_array_initializer(value: &BigInt, len: usize, base: u32) -> String {
    let bytes = big_endian_bytes(value, len);
    let items: Vec<String> = bytes
        .iter()
        .map(|b| print_with_base(&BigInt::from(*b), base))
        .collect();
    format!("{{{}}}", items.join(", "))
}

/// Zero-padded lowercase hex digits covering `len` bytes.
pub fn hex_digits(value: &BigInt, len: usize) -> String {
    big_endian_bytes(value, len)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_classes() {
        assert_eq!(WidthClass::of(1), WidthClass::Native8);
        assert_eq!(WidthClass::of(8), WidthClass::Native8);
        assert_eq!(WidthClass::of(9), WidthClass::Native16);
        assert_eq!(WidthClass::of(32), WidthClass::Native32);
        assert_eq!(WidthClass::of(33), WidthClass::ByteBuffer);
        assert_eq!(WidthClass::of(48).native_bits(), None);
    }

    #[test]
    fn test_masks() {
        assert_eq!(mask_literal(1), "0x1");
        assert_eq!(mask_literal(8), "0xff");
        assert_eq!(mask_literal(12), "0xfff");
        assert_eq!(mask_literal(32), "0xffffffff");
    }

    #[test]
    fn test_print_with_base() {
        let v = BigInt::from(2048);
        assert_eq!(print_with_base(&v, 16), "0x800");
        assert_eq!(print_with_base(&v, 10), "2048");
        assert_eq!(print_with_base(&BigInt::from(5), 2), "0b101");
    }

    #[test]
    fn test_big_endian_bytes() {
        let v = BigInt::from(0x0a0b0cu32);
        assert_eq!(big_endian_bytes(&v, 4), vec![0, 0x0a, 0x0b, 0x0c]);
        assert_eq!(big_endian_bytes(&v, 2), vec![0x0b, 0x0c]);
        assert_eq!(big_endian_bytes(&BigInt::zero(), 2), vec![0, 0]);
        assert_eq!(byte_array_initializer(&v, 3, 10), "{10, 11, 12}");
        assert_eq!(hex_digits(&v, 4), "000a0b0c");
    }
}
