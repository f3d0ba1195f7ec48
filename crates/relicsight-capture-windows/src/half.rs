/// IEEE 754 binary16 → binary32.
pub(crate) fn f16_to_f32(half: u16) -> f32 {
    let sign = ((half >> 15) & 1) as u32;
    let exponent = ((half >> 10) & 0x1f) as u32;
    let mantissa = (half & 0x3ff) as u32;

    if exponent == 0 {
        if mantissa == 0 {
            f32::from_bits(sign << 31)
        } else {
            // Subnormal: renormalise until the hidden bit appears.
            let mut e = 0i32;
            let mut m = mantissa;
            while (m & 0x400) == 0 {
                m <<= 1;
                e -= 1;
            }
            m &= 0x3ff;
            let f32_exp = (127 - 15 + 1 + e) as u32;
            f32::from_bits((sign << 31) | (f32_exp << 23) | (m << 13))
        }
    } else if exponent == 31 {
        f32::from_bits((sign << 31) | (0xff << 23) | (mantissa << 13))
    } else {
        let f32_exp = (exponent as i32 - 15 + 127) as u32;
        f32::from_bits((sign << 31) | (f32_exp << 23) | (mantissa << 13))
    }
}

/// Decodes one little-endian half and maps non-finite values into range.
#[inline]
pub(crate) fn read_channel(bytes: [u8; 2]) -> f32 {
    let v = f16_to_f32(u16::from_le_bytes(bytes));
    if v.is_nan() {
        0.0
    } else if v.is_infinite() {
        if v > 0.0 { 65504.0 } else { 0.0 }
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_common_values() {
        assert_eq!(f16_to_f32(0x0000), 0.0);
        assert_eq!(f16_to_f32(0x3C00), 1.0);
        assert_eq!(f16_to_f32(0x3800), 0.5);
        assert_eq!(f16_to_f32(0xC000), -2.0);
        assert_eq!(f16_to_f32(0x7BFF), 65504.0);
        // smallest subnormal
        assert_eq!(f16_to_f32(0x0001), 2f32.powi(-24));
    }

    #[test]
    fn non_finite_channels_are_sanitised() {
        assert_eq!(read_channel(0x7E00u16.to_le_bytes()), 0.0);
        assert_eq!(read_channel(0x7C00u16.to_le_bytes()), 65504.0);
        assert_eq!(read_channel(0xFC00u16.to_le_bytes()), 0.0);
    }
}
