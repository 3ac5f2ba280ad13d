#[cfg(test)]
mod util_test;

use bytes::BufMut;

/// get_padding_size returns the padding required to make the length a multiple of 4
pub(crate) fn get_padding_size(len: usize) -> usize {
    if len % 4 == 0 {
        0
    } else {
        4 - (len % 4)
    }
}

/// put_padding pads the buffer up to the next 32-bit boundary; the last
/// padding octet carries the padding count.
pub(crate) fn put_padding(mut buf: &mut [u8], len: usize) {
    let padding_size = get_padding_size(len);
    for i in 0..padding_size {
        if i == padding_size - 1 {
            buf.put_u8(padding_size as u8);
        } else {
            buf.put_u8(0);
        }
    }
}

/// put_zero_padding pads with null octets only, as SDES chunks and BYE
/// reasons require.
pub(crate) fn put_zero_padding(mut buf: &mut [u8], len: usize) {
    for _ in 0..get_padding_size(len) {
        buf.put_u8(0);
    }
}

/// get_24bits_signed reads a big-endian 24-bit two's complement value and
/// sign-extends it to i32.
pub(crate) fn get_24bits_signed(b: [u8; 3]) -> i32 {
    let v = ((b[0] as u32) << 16) | ((b[1] as u32) << 8) | (b[2] as u32);
    // shift the sign bit up to bit 31, then arithmetic-shift back
    ((v << 8) as i32) >> 8
}

/// put_24bits_signed masks an i32 down to its low 24 bits, big-endian.
pub(crate) fn put_24bits_signed(v: i32) -> [u8; 3] {
    let u = (v as u32) & 0x00FF_FFFF;
    [(u >> 16) as u8, (u >> 8) as u8, u as u8]
}
