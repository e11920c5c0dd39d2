//! Macro for implementing code conversions on enumerated domain codes
//!
//! Backend codes (crew roles, aircraft types) travel as short upper-case
//! strings. This macro provides a single implementation of `Display`,
//! `FromStr`, serde and the list of accepted codes for such an enum.
//!
//! # Example
//!
//! ```rust
//! use crewconnect_domain::impl_domain_code_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Seat {
//!     Window,
//!     Aisle,
//! }
//!
//! impl_domain_code_conversions!(Seat {
//!     Window => "W",
//!     Aisle => "A",
//! });
//!
//! assert_eq!(Seat::Window.to_string(), "W");
//! assert_eq!("a".parse::<Seat>().unwrap(), Seat::Aisle);
//! assert_eq!(Seat::CODES, &["W", "A"]);
//! ```

/// Implements code conversions for enumerated domain codes
///
/// This macro generates:
/// - `code()` and the `ALL` / `CODES` constants
/// - Display trait: writes the code verbatim
/// - FromStr trait: case-insensitive parse of the code
/// - serde `Serialize` / `Deserialize` through the code
///
/// Codes must be given in upper case.
#[macro_export]
macro_rules! impl_domain_code_conversions {
    ($enum_name:ident { $($variant:ident => $code:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Every accepted code, in declaration order.
            pub const CODES: &'static [&'static str] = &[$($code,)+];

            /// Backend code for this variant.
            pub const fn code(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.code())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(format!(
                        "Invalid {}: {} (expected one of {})",
                        stringify!($enum_name),
                        s,
                        Self::CODES.join(", ")
                    )),
                }
            }
        }

        impl serde::Serialize for $enum_name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.code())
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum_name {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> ::std::result::Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}
