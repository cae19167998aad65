//! Leveled assertions. Cheap checks run at [`TABULA_ASSERT_SIMPLE`]; checks which rescan whole
//! structures are gated behind the higher levels so they only run in tests or with the
//! `debug-checks` feature.

#[cfg(all(not(test), not(feature = "debug-checks")))]
pub const TABULA_ASSERT_LEVEL_DEFINITION: u8 = TABULA_ASSERT_SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub const TABULA_ASSERT_LEVEL_DEFINITION: u8 = TABULA_ASSERT_ADVANCED;

pub const TABULA_ASSERT_SIMPLE: u8 = 1;
pub const TABULA_ASSERT_MODERATE: u8 = 2;
pub const TABULA_ASSERT_ADVANCED: u8 = 3;

#[macro_export]
#[doc(hidden)]
macro_rules! tabula_assert_simple {
    ($($arg:tt)*) => {
        if $crate::tabula_asserts::TABULA_ASSERT_LEVEL_DEFINITION >= $crate::tabula_asserts::TABULA_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! tabula_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::tabula_asserts::TABULA_ASSERT_LEVEL_DEFINITION >= $crate::tabula_asserts::TABULA_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! tabula_assert_advanced {
    ($($arg:tt)*) => {
        if $crate::tabula_asserts::TABULA_ASSERT_LEVEL_DEFINITION >= $crate::tabula_asserts::TABULA_ASSERT_ADVANCED {
            assert!($($arg)*);
        }
    };
}

