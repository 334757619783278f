pub trait FloatExt: Sized {
    /// `self == other`
    fn eq(self, other: Self) -> bool;

    /// `self != other`
    fn not_eq(self, other: Self) -> bool;

    /// Linear interpolation between `self` and `other`.
    fn lerp(self, other: Self, amount: Self) -> Self;
}

macro_rules! impl_float_ext {
    ( $ty:ty ) => {
        impl FloatExt for $ty {
            fn eq(self, other: Self) -> bool {
                (self - other).abs() < <$ty>::EPSILON
            }

            fn not_eq(self, other: Self) -> bool {
                (self - other).abs() >= <$ty>::EPSILON
            }

            fn lerp(self, other: Self, amount: Self) -> Self {
                self + (other - self) * amount
            }
        }
    };
}

impl_float_ext!(f32);
impl_float_ext!(f64);
