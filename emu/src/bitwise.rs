use std::ops::RangeInclusive;

/// Bit helpers over the unsigned words the core moves around.
/// Indexes go from lsb to msb (right to left).
pub trait Bits: Copy {
    fn get_bit(self, bit_idx: u8) -> bool;

    fn set_bit(&mut self, bit_idx: u8, value: bool);

    /// Returns the bits in `bits_range` moved down to position 0.
    fn get_bits(self, bits_range: RangeInclusive<u8>) -> Self;

    /// Treats the low `number_of_bits` as a two's complement number and
    /// extends its sign to the whole word.
    fn sign_extended(self, number_of_bits: u8) -> Self;
}

macro_rules! impl_bits {
    ($($unsigned:ty => $signed:ty),* $(,)?) => {
        $(
            impl Bits for $unsigned {
                fn get_bit(self, bit_idx: u8) -> bool {
                    debug_assert!(u32::from(bit_idx) < Self::BITS);
                    (self >> bit_idx) & 1 == 1
                }

                fn set_bit(&mut self, bit_idx: u8, value: bool) {
                    debug_assert!(u32::from(bit_idx) < Self::BITS);
                    let mask = 1 << bit_idx;
                    if value {
                        *self |= mask;
                    } else {
                        *self &= !mask;
                    }
                }

                fn get_bits(self, bits_range: RangeInclusive<u8>) -> Self {
                    let start = *bits_range.start();
                    let end = *bits_range.end();
                    debug_assert!(start <= end && u32::from(end) < Self::BITS);

                    let length = u32::from(end - start) + 1;
                    let shifted = self >> start;
                    if length == Self::BITS {
                        shifted
                    } else {
                        shifted & ((1 << length) - 1)
                    }
                }

                #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
                fn sign_extended(self, number_of_bits: u8) -> Self {
                    debug_assert!(number_of_bits > 0 && u32::from(number_of_bits) <= Self::BITS);
                    let unused = Self::BITS - u32::from(number_of_bits);
                    (((self << unused) as $signed) >> unused) as Self
                }
            }
        )*
    };
}

impl_bits!(u8 => i8, u16 => i16, u32 => i32, u64 => i64);
