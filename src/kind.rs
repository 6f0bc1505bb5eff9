//! The closed set of shapes a field can have, and the rules deciding which of
//! them can be populated from a string.

use std::fmt;


/// Shape of a type as seen by the field walker and the value converter.
///
/// Every type implementing [`Reflect`][crate::Reflect] reports exactly one
/// `Kind`. Widths are in bits, e.g. `Int(8)` for `i8` and `Complex(64)` for
/// `Complex<f32>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int(u32),
    Uint(u32),
    Float(u32),
    Complex(u32),
    String,

    /// `std::time::Duration`, parsed as a human duration literal.
    Duration,

    /// A point in time, parsed with the field's `format`.
    Timestamp,

    /// A URL, parsed with the WHATWG grammar.
    Url,

    /// A growable sequence, e.g. `Vec<T>`.
    Sequence(Box<Kind>),

    /// A fixed size array `[T; N]`.
    Array(usize, Box<Kind>),

    /// `Option<T>`.
    Optional(Box<Kind>),

    /// A struct deriving `Config`, traversed field by field.
    Struct(&'static str),

    /// Maps are accepted, but never populated.
    Map,

    Function,
    Channel,
    RawPointer,
    UnsafePointer,
    Any,
}

/// A type that cannot be populated. Returned by [`Kind::check`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unsupported {
    /// The offending kind. For sequences this is the element kind.
    pub kind: Kind,

    /// Whether `kind` is the element of a sequence or array.
    pub element: bool,
}

/// An unsupported field somewhere below a type, found without a value at
/// hand. Returned by [`Reflect::check_shape`][crate::Reflect::check_shape].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsupportedField {
    /// Field names from the checked type down to the offending field.
    pub path: Vec<&'static str>,
    pub unsupported: Unsupported,
}

impl Kind {
    /// Checks whether values of this kind can be populated at all. This is
    /// done once for every visited field before any value is read.
    pub fn check(&self) -> Result<(), Unsupported> {
        match self {
            Self::Function
            | Self::Channel
            | Self::RawPointer
            | Self::UnsafePointer
            | Self::Any => Err(Unsupported { kind: self.clone(), element: false }),

            Self::Sequence(elem) | Self::Array(_, elem) => {
                // One level of `Option` is transparent for this check:
                // `Vec<Option<Vec<T>>>` is as multi-dimensional as `Vec<Vec<T>>`.
                let inner = match &**elem {
                    Self::Optional(inner) => &**inner,
                    other => other,
                };
                match inner {
                    Self::Sequence(_) | Self::Array(..) | Self::Struct(_) => {
                        Err(Unsupported { kind: inner.clone(), element: true })
                    }
                    _ => elem.check().map_err(|u| Unsupported { element: true, ..u }),
                }
            }

            Self::Optional(inner) => match &**inner {
                Self::Optional(_) => Err(Unsupported { kind: self.clone(), element: false }),
                _ => inner.check(),
            },

            _ => Ok(()),
        }
    }

    /// Timestamps and URLs are leaves, even though they are structs in
    /// their own crates.
    pub fn is_structured_leaf(&self) -> bool {
        matches!(self, Self::Timestamp | Self::Url)
    }

    /// Returns `true` for structs the walker descends into.
    pub fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }

    /// Returns `true` for `Option<S>` where `S` is a struct to descend into.
    pub fn is_optional_struct(&self) -> bool {
        matches!(self, Self::Optional(inner) if inner.is_struct())
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int(bits) => write!(f, "i{bits}"),
            Self::Uint(bits) => write!(f, "u{bits}"),
            Self::Float(bits) => write!(f, "f{bits}"),
            Self::Complex(bits) => write!(f, "complex{bits}"),
            Self::String => f.write_str("string"),
            Self::Duration => f.write_str("duration"),
            Self::Timestamp => f.write_str("timestamp"),
            Self::Url => f.write_str("url"),
            Self::Sequence(elem) => write!(f, "sequence of {elem}"),
            Self::Array(len, elem) => write!(f, "array [{len}] of {elem}"),
            Self::Optional(inner) => write!(f, "optional {inner}"),
            Self::Struct(name) => write!(f, "struct {name}"),
            Self::Map => f.write_str("map"),
            Self::Function => f.write_str("function"),
            Self::Channel => f.write_str("channel"),
            Self::RawPointer => f.write_str("raw pointer"),
            Self::UnsafePointer => f.write_str("unsafe pointer"),
            Self::Any => f.write_str("any"),
        }
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn seq(k: Kind) -> Kind {
        Kind::Sequence(Box::new(k))
    }

    fn opt(k: Kind) -> Kind {
        Kind::Optional(Box::new(k))
    }

    fn arr(n: usize, k: Kind) -> Kind {
        Kind::Array(n, Box::new(k))
    }

    #[test]
    fn accepted() {
        for k in [
            Kind::Bool,
            Kind::Int(8),
            Kind::Uint(64),
            Kind::Float(32),
            Kind::Complex(128),
            Kind::String,
            Kind::Duration,
            Kind::Timestamp,
            Kind::Url,
            Kind::Map,
            Kind::Struct("Foo"),
            seq(Kind::Int(32)),
            arr(2, Kind::Bool),
            seq(opt(Kind::Uint(8))),
            arr(0, opt(Kind::Timestamp)),
            opt(seq(Kind::String)),
            opt(Kind::Struct("Foo")),
        ] {
            assert_eq!(k.check(), Ok(()), "{k}");
        }
    }

    #[test]
    fn rejected_scalars() {
        for k in [Kind::Function, Kind::Channel, Kind::RawPointer, Kind::UnsafePointer, Kind::Any] {
            assert_eq!(k.check(), Err(Unsupported { kind: k.clone(), element: false }));
            assert_eq!(opt(k.clone()).check(), Err(Unsupported { kind: k.clone(), element: false }));
            assert_eq!(seq(k.clone()).check(), Err(Unsupported { kind: k.clone(), element: true }));
            assert_eq!(seq(opt(k.clone())).check(), Err(Unsupported { kind: k.clone(), element: true }));
            assert_eq!(opt(arr(0, k.clone())).check(), Err(Unsupported { kind: k, element: true }));
        }
    }

    #[test]
    fn rejected_multi_dimensional() {
        let cases = [
            (seq(seq(Kind::Int(64))), seq(Kind::Int(64))),
            (seq(arr(0, Kind::Int(64))), arr(0, Kind::Int(64))),
            (arr(0, arr(0, Kind::Int(64))), arr(0, Kind::Int(64))),
            (arr(0, seq(Kind::Int(64))), seq(Kind::Int(64))),
            (opt(seq(seq(Kind::Int(64)))), seq(Kind::Int(64))),
            (seq(opt(seq(Kind::Int(64)))), seq(Kind::Int(64))),
        ];
        for (k, offending) in cases {
            assert_eq!(k.check(), Err(Unsupported { kind: offending, element: true }), "{k}");
        }
    }

    #[test]
    fn rejected_struct_elements_and_nested_options() {
        assert!(seq(Kind::Struct("Foo")).check().is_err());
        assert!(arr(2, opt(Kind::Struct("Foo"))).check().is_err());
        assert!(opt(opt(Kind::Bool)).check().is_err());
    }

    #[test]
    fn structured_leaves() {
        assert!(Kind::Timestamp.is_structured_leaf());
        assert!(Kind::Url.is_structured_leaf());
        assert!(!Kind::Struct("Url").is_structured_leaf());
        assert!(opt(Kind::Struct("Foo")).is_optional_struct());
        assert!(!opt(Kind::Url).is_optional_struct());
    }

    #[test]
    fn display() {
        assert_eq!(seq(opt(Kind::Int(8))).to_string(), "sequence of optional i8");
        assert_eq!(arr(2, Kind::Complex(64)).to_string(), "array [2] of complex64");
        assert_eq!(Kind::Struct("Conf").to_string(), "struct Conf");
    }
}
