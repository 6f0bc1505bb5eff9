//! Runtime access to the fields and values of configuration structs.
//!
//! [`Reflect`] is implemented for every type a field can have, including the
//! ones that are always rejected (functions, channels, raw pointers, `dyn
//! Any`). Those report their [`Kind`] so that the walker can reject them
//! with a proper error instead of failing to compile.

use std::{
    any::Any,
    collections::{BTreeMap, HashMap},
    ptr::NonNull,
    sync::mpsc,
    time::Duration,
};

use chrono::{DateTime, FixedOffset, Utc};
use num_complex::Complex;
use url::Url;

use crate::{kind::UnsupportedField, meta::Meta, Error, Kind};


/// A typed value that can be stored into a leaf via [`Reflect::set`].
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i128),
    Uint(u128),
    Float(f64),
    Complex(Complex<f64>),
    Str(String),
    Duration(Duration),
    Timestamp(DateTime<FixedOffset>),
    Url(Url),
}

/// Why [`Reflect::set`] rejected a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetError {
    /// The value does not fit into the target type.
    Overflow,

    /// The value has the wrong shape for the target type.
    Mismatch,
}

/// Callback receiving the pointee of an optional value.
pub type PointeeFn<'a> = dyn FnMut(&mut dyn Reflect) -> Result<(), Error> + 'a;

/// Callback receiving the index and the value of a sequence element.
pub type ElementFn<'a> = dyn FnMut(usize, &mut dyn Reflect) -> Result<(), Error> + 'a;

/// A value whose shape can be inspected and which can be written to at
/// runtime. Implemented via `#[derive(Config)]` for structs.
pub trait Reflect {
    /// The kind of all values of this type.
    fn shape() -> Kind
    where
        Self: Sized;

    /// The zero value of this type, used when allocating optional values and
    /// sequence elements. `None` for types that have no such value.
    fn zero() -> Option<Self>
    where
        Self: Sized;

    fn kind(&self) -> Kind;

    /// Checks all fields of this type and of nested struct types, without
    /// needing a value. Only structs and optionals have anything to check.
    fn check_shape() -> Result<(), UnsupportedField>
    where
        Self: Sized,
    {
        Ok(())
    }

    /// [`check_shape`][Self::check_shape] of the pointee type of an optional
    /// value, which works even if the pointee is absent.
    fn check_pointee_shape(&self) -> Result<(), UnsupportedField> {
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Stores `value`. Only leaves accept values.
    fn set(&mut self, _value: Scalar) -> Result<(), SetError> {
        Err(SetError::Mismatch)
    }

    /// The current value, for strings.
    fn as_str(&self) -> Option<&str> {
        None
    }

    fn as_struct_mut(&mut self) -> Option<&mut dyn Struct> {
        None
    }

    /// The present pointee of an optional value.
    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        None
    }

    /// Makes an optional value present, using the zero value if it is absent.
    /// Returns `false` if this is not an optional value or the pointee type
    /// has no zero value.
    fn allocate(&mut self) -> bool {
        false
    }

    /// Runs `f` on the pointee of an optional value. An absent pointee is
    /// created from the zero value and only stored if `f` succeeds. Returns
    /// `None` if this is not an optional value.
    fn with_pointee(&mut self, _f: &mut PointeeFn<'_>) -> Option<Result<(), Error>> {
        None
    }

    /// Replaces the elements of a sequence or array with fresh zero values,
    /// runs `f` on each of the first `count` of them and stores the result
    /// only if all calls succeed. A sequence gets exactly `count` elements,
    /// an array keeps its length. Returns `None` if this is not a sequence.
    fn fill_elements(
        &mut self,
        _count: usize,
        _f: &mut ElementFn<'_>,
    ) -> Option<Result<(), Error>> {
        None
    }
}

/// A struct whose fields can be accessed by index, in declaration order.
pub trait Struct {
    fn meta(&self) -> &'static Meta;

    /// The field with the given index, or `None` if it cannot be written to
    /// (e.g. because it is ignored).
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// Checks the field `name` of type `T`. Used by the derived
/// [`Reflect::check_shape`].
#[doc(hidden)]
pub fn check_field<T: Reflect>(name: &'static str) -> Result<(), UnsupportedField> {
    T::shape()
        .check()
        .map_err(|unsupported| UnsupportedField { path: vec![name], unsupported })?;
    T::check_shape().map_err(|mut e| {
        e.path.insert(0, name);
        e
    })
}


// ===== Leaves ===================================================================================

impl Reflect for bool {
    fn shape() -> Kind {
        Kind::Bool
    }

    fn zero() -> Option<Self> {
        Some(false)
    }

    fn kind(&self) -> Kind {
        Self::shape()
    }

    fn set(&mut self, value: Scalar) -> Result<(), SetError> {
        match value {
            Scalar::Bool(b) => *self = b,
            _ => return Err(SetError::Mismatch),
        }
        Ok(())
    }
}

macro_rules! impl_for_int {
    ($variant:ident: $($ty:ident)*) => {
        $(
            impl Reflect for $ty {
                fn shape() -> Kind {
                    Kind::$variant($ty::BITS)
                }

                fn zero() -> Option<Self> {
                    Some(0)
                }

                fn kind(&self) -> Kind {
                    Self::shape()
                }

                fn set(&mut self, value: Scalar) -> Result<(), SetError> {
                    *self = match value {
                        Scalar::Int(i) => $ty::try_from(i).map_err(|_| SetError::Overflow)?,
                        Scalar::Uint(u) => $ty::try_from(u).map_err(|_| SetError::Overflow)?,
                        _ => return Err(SetError::Mismatch),
                    };
                    Ok(())
                }
            }
        )*
    };
}

impl_for_int!(Int: i8 i16 i32 i64 i128 isize);
impl_for_int!(Uint: u8 u16 u32 u64 u128 usize);

fn narrow(v: f64) -> Result<f32, SetError> {
    if v.is_finite() && v.abs() > f32::MAX as f64 {
        return Err(SetError::Overflow);
    }
    Ok(v as f32)
}

impl Reflect for f32 {
    fn shape() -> Kind {
        Kind::Float(32)
    }

    fn zero() -> Option<Self> {
        Some(0.0)
    }

    fn kind(&self) -> Kind {
        Self::shape()
    }

    fn set(&mut self, value: Scalar) -> Result<(), SetError> {
        match value {
            Scalar::Float(v) => *self = narrow(v)?,
            _ => return Err(SetError::Mismatch),
        }
        Ok(())
    }
}

impl Reflect for f64 {
    fn shape() -> Kind {
        Kind::Float(64)
    }

    fn zero() -> Option<Self> {
        Some(0.0)
    }

    fn kind(&self) -> Kind {
        Self::shape()
    }

    fn set(&mut self, value: Scalar) -> Result<(), SetError> {
        match value {
            Scalar::Float(v) => *self = v,
            _ => return Err(SetError::Mismatch),
        }
        Ok(())
    }
}

impl Reflect for Complex<f32> {
    fn shape() -> Kind {
        Kind::Complex(64)
    }

    fn zero() -> Option<Self> {
        Some(Complex::new(0.0, 0.0))
    }

    fn kind(&self) -> Kind {
        Self::shape()
    }

    fn set(&mut self, value: Scalar) -> Result<(), SetError> {
        match value {
            Scalar::Complex(c) => *self = Complex::new(narrow(c.re)?, narrow(c.im)?),
            _ => return Err(SetError::Mismatch),
        }
        Ok(())
    }
}

impl Reflect for Complex<f64> {
    fn shape() -> Kind {
        Kind::Complex(128)
    }

    fn zero() -> Option<Self> {
        Some(Complex::new(0.0, 0.0))
    }

    fn kind(&self) -> Kind {
        Self::shape()
    }

    fn set(&mut self, value: Scalar) -> Result<(), SetError> {
        match value {
            Scalar::Complex(c) => *self = c,
            _ => return Err(SetError::Mismatch),
        }
        Ok(())
    }
}

impl Reflect for String {
    fn shape() -> Kind {
        Kind::String
    }

    fn zero() -> Option<Self> {
        Some(String::new())
    }

    fn kind(&self) -> Kind {
        Self::shape()
    }

    fn set(&mut self, value: Scalar) -> Result<(), SetError> {
        match value {
            Scalar::Str(s) => *self = s,
            _ => return Err(SetError::Mismatch),
        }
        Ok(())
    }

    fn as_str(&self) -> Option<&str> {
        Some(self)
    }
}

impl Reflect for Duration {
    fn shape() -> Kind {
        Kind::Duration
    }

    fn zero() -> Option<Self> {
        Some(Duration::ZERO)
    }

    fn kind(&self) -> Kind {
        Self::shape()
    }

    fn set(&mut self, value: Scalar) -> Result<(), SetError> {
        match value {
            Scalar::Duration(d) => *self = d,
            _ => return Err(SetError::Mismatch),
        }
        Ok(())
    }
}

impl Reflect for DateTime<FixedOffset> {
    fn shape() -> Kind {
        Kind::Timestamp
    }

    fn zero() -> Option<Self> {
        Some(DateTime::<Utc>::default().fixed_offset())
    }

    fn kind(&self) -> Kind {
        Self::shape()
    }

    fn set(&mut self, value: Scalar) -> Result<(), SetError> {
        match value {
            Scalar::Timestamp(t) => *self = t,
            _ => return Err(SetError::Mismatch),
        }
        Ok(())
    }
}

impl Reflect for DateTime<Utc> {
    fn shape() -> Kind {
        Kind::Timestamp
    }

    fn zero() -> Option<Self> {
        Some(DateTime::<Utc>::default())
    }

    fn kind(&self) -> Kind {
        Self::shape()
    }

    fn set(&mut self, value: Scalar) -> Result<(), SetError> {
        match value {
            Scalar::Timestamp(t) => *self = t.with_timezone(&Utc),
            _ => return Err(SetError::Mismatch),
        }
        Ok(())
    }
}

impl Reflect for Url {
    fn shape() -> Kind {
        Kind::Url
    }

    /// `Url` has no empty value, `about:blank` is used instead.
    fn zero() -> Option<Self> {
        Url::parse("about:blank").ok()
    }

    fn kind(&self) -> Kind {
        Self::shape()
    }

    fn set(&mut self, value: Scalar) -> Result<(), SetError> {
        match value {
            Scalar::Url(u) => *self = u,
            _ => return Err(SetError::Mismatch),
        }
        Ok(())
    }
}


// ===== Containers ===============================================================================

impl<T: Reflect> Reflect for Vec<T> {
    fn shape() -> Kind {
        Kind::Sequence(Box::new(T::shape()))
    }

    fn zero() -> Option<Self> {
        Some(Vec::new())
    }

    fn kind(&self) -> Kind {
        Self::shape()
    }

    fn fill_elements(
        &mut self,
        count: usize,
        f: &mut ElementFn<'_>,
    ) -> Option<Result<(), Error>> {
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let mut elem = T::zero()?;
            if let Err(e) = f(i, &mut elem) {
                return Some(Err(e));
            }
            out.push(elem);
        }

        *self = out;
        Some(Ok(()))
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn shape() -> Kind {
        Kind::Array(N, Box::new(T::shape()))
    }

    fn zero() -> Option<Self> {
        let elems = (0..N).map(|_| T::zero()).collect::<Option<Vec<_>>>()?;
        elems.try_into().ok()
    }

    fn kind(&self) -> Kind {
        Self::shape()
    }

    fn fill_elements(
        &mut self,
        count: usize,
        f: &mut ElementFn<'_>,
    ) -> Option<Result<(), Error>> {
        let mut out = Self::zero()?;
        for (i, elem) in out.iter_mut().take(count).enumerate() {
            if let Err(e) = f(i, elem) {
                return Some(Err(e));
            }
        }

        *self = out;
        Some(Ok(()))
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn shape() -> Kind {
        Kind::Optional(Box::new(T::shape()))
    }

    fn zero() -> Option<Self> {
        Some(None)
    }

    fn kind(&self) -> Kind {
        Self::shape()
    }

    fn check_shape() -> Result<(), UnsupportedField> {
        T::check_shape()
    }

    fn check_pointee_shape(&self) -> Result<(), UnsupportedField> {
        T::check_shape()
    }

    fn as_str(&self) -> Option<&str> {
        self.as_ref().and_then(|v| v.as_str())
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_mut().map(|v| v as &mut dyn Reflect)
    }

    fn allocate(&mut self) -> bool {
        if self.is_none() {
            *self = T::zero();
        }
        self.is_some()
    }

    fn with_pointee(&mut self, f: &mut PointeeFn<'_>) -> Option<Result<(), Error>> {
        if let Some(v) = self {
            return Some(f(v));
        }

        let mut v = T::zero()?;
        let res = f(&mut v);
        if res.is_ok() {
            *self = Some(v);
        }
        Some(res)
    }
}

impl<K, V, S: Default> Reflect for HashMap<K, V, S> {
    fn shape() -> Kind {
        Kind::Map
    }

    fn zero() -> Option<Self> {
        Some(HashMap::default())
    }

    fn kind(&self) -> Kind {
        Self::shape()
    }
}

impl<K, V> Reflect for BTreeMap<K, V> {
    fn shape() -> Kind {
        Kind::Map
    }

    fn zero() -> Option<Self> {
        Some(BTreeMap::new())
    }

    fn kind(&self) -> Kind {
        Self::shape()
    }
}


// ===== Rejected types ===========================================================================

macro_rules! impl_rejected {
    ($kind:ident: $( [$($gen:tt)*] $ty:ty ),* $(,)?) => {
        $(
            impl<$($gen)*> Reflect for $ty {
                fn shape() -> Kind {
                    Kind::$kind
                }

                fn zero() -> Option<Self> {
                    None
                }

                fn kind(&self) -> Kind {
                    Self::shape()
                }
            }
        )*
    };
}

impl_rejected!(Function:
    [R] fn() -> R,
    [A, R] fn(A) -> R,
    [A, B, R] fn(A, B) -> R,
    [A, B, C, R] fn(A, B, C) -> R,
);
impl_rejected!(Channel:
    [T] mpsc::Sender<T>,
    [T] mpsc::SyncSender<T>,
    [T] mpsc::Receiver<T>,
);
impl_rejected!(RawPointer:
    [T] *const T,
    [T] *mut T,
);
impl_rejected!(UnsafePointer: [T: ?Sized] NonNull<T>);
impl_rejected!(Any:
    [] Box<dyn Any>,
    [] Box<dyn Any + Send>,
    [] Box<dyn Any + Send + Sync>,
);
