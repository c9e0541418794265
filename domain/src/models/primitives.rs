/// 整数で表現されるIDを実装する。
///
/// JSONでは内側の整数としてシリアライズする。
#[macro_export]
macro_rules! impl_int_id {
    ($name:ident, $ty:ty) => {
        impl $name {
            pub fn new(value: $ty) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::convert::From<$ty> for $name {
            fn from(value: $ty) -> Self {
                Self(value)
            }
        }

        impl std::convert::From<$name> for $ty {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}
