//! TDM frame layout helpers.
//!
//! One DMA block is one frame: word `i` of a slot is TDM channel `i`. The
//! state machine shifts each word MSB first, so a 24-bit sample sits in the
//! top 24 bits of its word and the low byte is padding.
//!
//! ```text
//!  bit 31                          8 7        0
//! ┌──────────────────────────────┬──────────┐
//! │ sample[23:0]                 │ 0000_0000│
//! └──────────────────────────────┴──────────┘
//! ```

/// Left-justify a signed 24-bit sample in a 32-bit slot word.
///
/// Bits above 24 are discarded.
pub fn pack_i24(sample: i32) -> u32 {
    (sample as u32) << 8
}

/// Recover the signed 24-bit sample from a slot word.
pub fn unpack_i24(word: u32) -> i32 {
    (word as i32) >> 8
}

/// Pack samples into slot words.
///
/// # Panics
///
/// Debug-asserts that both slices have the same length.
pub fn pack_frame(dest: &mut [u32], samples: &[i32]) {
    debug_assert_eq!(dest.len(), samples.len());

    for (word, &sample) in dest.iter_mut().zip(samples) {
        *word = pack_i24(sample);
    }
}

/// Unpack slot words into samples.
///
/// # Panics
///
/// Debug-asserts that both slices have the same length.
pub fn unpack_frame(src: &[u32], samples: &mut [i32]) {
    debug_assert_eq!(src.len(), samples.len());

    for (sample, &word) in samples.iter_mut().zip(src) {
        *sample = unpack_i24(word);
    }
}

/// Zero every slot.
pub fn silence(dest: &mut [u32]) {
    dest.fill(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    const I24_MAX: i32 = (1 << 23) - 1;
    const I24_MIN: i32 = -(1 << 23);

    #[test]
    fn sample_is_msb_aligned() {
        assert_eq!(pack_i24(1), 0x0000_0100);
        assert_eq!(pack_i24(I24_MAX), 0x7FFF_FF00);
        assert_eq!(pack_i24(-1), 0xFFFF_FF00);
        assert_eq!(pack_i24(I24_MIN), 0x8000_0000);
    }

    #[test]
    fn unpack_sign_extends() {
        assert_eq!(unpack_i24(0xFFFF_FF00), -1);
        assert_eq!(unpack_i24(0x8000_0000), I24_MIN);
        assert_eq!(unpack_i24(0x7FFF_FFFF), I24_MAX, "padding ignored");
    }

    #[test]
    fn frame_round_trip() {
        let samples = [0, 1, -1, I24_MAX, I24_MIN, 12345, -12345, 0x12_3456];
        let mut words = [0u32; 8];
        pack_frame(&mut words, &samples);

        let mut back = [0i32; 8];
        unpack_frame(&words, &mut back);
        assert_eq!(back, samples);
    }

    #[test]
    fn out_of_range_sample_wraps_to_24_bits() {
        assert_eq!(unpack_i24(pack_i24(1 << 23)), I24_MIN);
    }

    #[test]
    fn silence_zeroes_frame() {
        let mut frame = [0xDEAD_BEEFu32; 8];
        silence(&mut frame);
        assert!(frame.iter().all(|&w| w == 0));
    }
}
