//! The interface between the loader and the sources of configuration values.

use crate::{Error, Input, Reflect};


/// A source of configuration values.
///
/// A provider offers one or both of two capabilities: a [`Filler`] receives
/// the flat list of leaf fields, an [`Unmarshaler`] receives the whole root
/// value. The loader runs the unmarshaler first, then the filler.
///
/// ```
/// use confill::{Error, Filler, Input, Provider};
///
/// struct Fixed;
///
/// impl Provider for Fixed {
///     fn name(&self) -> String {
///         "fixed values".into()
///     }
///
///     fn filler(&self) -> Option<&dyn Filler> {
///         Some(self)
///     }
/// }
///
/// impl Filler for Fixed {
///     fn fill(&self, input: &mut Input<'_>) -> Result<(), Error> {
///         for i in 0..input.fields().len() {
///             if input.fields()[i].path == ["port"] {
///                 input.set_value(i, "8080")?;
///                 input.mark_set(i);
///             }
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Provider {
    /// Human readable name, used in log messages.
    fn name(&self) -> String;

    fn filler(&self) -> Option<&dyn Filler> {
        None
    }

    fn unmarshaler(&self) -> Option<&dyn Unmarshaler> {
        None
    }
}

/// Sets values of individual leaf fields.
pub trait Filler {
    /// Sets the fields this provider has values for and marks them as set.
    fn fill(&self, input: &mut Input<'_>) -> Result<(), Error>;
}

/// Decodes values into the whole configuration struct at once.
pub trait Unmarshaler {
    fn unmarshal_struct(&self, root: &mut dyn Reflect) -> Result<(), Error>;
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn filler(&self) -> Option<&dyn Filler> {
        (**self).filler()
    }

    fn unmarshaler(&self) -> Option<&dyn Unmarshaler> {
        (**self).unmarshaler()
    }
}
