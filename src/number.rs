use std::fmt::{Debug, Display};

/// A numeric type whose value can be tracked by a [`PeakValue`](crate::PeakValue).
///
/// Implemented for every primitive integer and floating point type. Integer
/// arithmetic wraps on overflow in two's complement, so an unsigned value can
/// be decremented through [`Number::add`] by passing `!(delta - 1)`, the same
/// trick used with `AtomicU64::fetch_add`.
pub trait Number: Copy + PartialOrd + Debug + Display + Send + Sync + 'static {
    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
}

macro_rules! impl_integer {
    ($($t:ty),*) => {
        $(
            impl Number for $t {
                #[inline]
                fn add(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }

                #[inline]
                fn sub(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }
            }
        )*
    };
}

macro_rules! impl_float {
    ($($t:ty),*) => {
        $(
            impl Number for $t {
                #[inline]
                fn add(self, rhs: Self) -> Self {
                    self + rhs
                }

                #[inline]
                fn sub(self, rhs: Self) -> Self {
                    self - rhs
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_float!(f32, f64);

#[cfg(test)]
mod tests {
    use super::Number;

    #[test]
    fn integers_wrap() {
        assert_eq!(Number::add(u8::MAX, 1), 0);
        assert_eq!(Number::sub(0u16, 1), u16::MAX);
        assert_eq!(Number::add(i32::MAX, 1), i32::MIN);
    }

    #[test]
    fn unsigned_sub_through_add() {
        let delta = 1100u32;
        assert_eq!(Number::add(1300u32, !(delta - 1)), 200);
        assert_eq!(Number::add(1300u32, !(delta - 1)), Number::sub(1300u32, delta));
    }

    #[test]
    fn floats() {
        assert_eq!(Number::add(1.5f64, 2.25), 3.75);
        assert_eq!(Number::sub(1.5f32, 2.5), -1.0);
    }
}
