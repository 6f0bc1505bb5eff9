//! Converting raw string values into typed field values.

use crate::{
    env::Vars,
    error::ErrorInner,
    reflect::{Scalar, SetError},
    tags::ConfigTags,
    Error, Kind, Reflect,
};

pub(crate) mod parse;


use self::parse::Failure;


/// The field a raw value is converted for.
pub(crate) struct Target<'t> {
    /// Dotted path, for error messages.
    pub(crate) path: &'t str,
    pub(crate) tags: &'t ConfigTags,
    pub(crate) vars: &'t Vars,
}

impl Target<'_> {
    fn unsupported(&self, kind: &Kind) -> Error {
        ErrorInner::UnsupportedType {
            kind: kind.clone(),
            element: false,
            path: self.path.into(),
        }.into()
    }

    fn failed(&self, raw: &str, kind: &Kind, failure: Failure) -> Error {
        match failure {
            Failure::Invalid(err) => ErrorInner::Parse {
                literal: raw.into(),
                kind: kind.clone(),
                path: self.path.into(),
                err,
            },
            Failure::Overflow => self.overflow(raw, kind),
        }.into()
    }

    fn overflow(&self, raw: &str, kind: &Kind) -> ErrorInner {
        ErrorInner::ValueOverflow {
            literal: raw.into(),
            kind: kind.clone(),
            path: self.path.into(),
        }
    }
}

/// Converts `raw` into the type of `target` and stores it. `raw` is expanded
/// first if the field has the `expand` tag.
pub(crate) fn set_value(ctx: &Target<'_>, target: &mut dyn Reflect, raw: &str) -> Result<(), Error> {
    if ctx.tags.expand {
        let expanded = ctx.vars.expand(raw);
        return set_raw(ctx, target, &expanded);
    }

    set_raw(ctx, target, raw)
}

/// Like [`set_value`], but never expands.
pub(crate) fn set_raw(ctx: &Target<'_>, target: &mut dyn Reflect, raw: &str) -> Result<(), Error> {
    let kind = target.kind();
    if let Err(unsupported) = kind.check() {
        return Err(ErrorInner::UnsupportedType {
            kind: unsupported.kind,
            element: unsupported.element,
            path: ctx.path.into(),
        }.into());
    }

    convert(ctx, target, &kind, raw)
}

fn convert(ctx: &Target<'_>, target: &mut dyn Reflect, kind: &Kind, raw: &str) -> Result<(), Error> {
    let fail = |failure| ctx.failed(raw, kind, failure);

    let scalar = match kind {
        Kind::String => Scalar::Str(raw.to_owned()),
        Kind::Bool => Scalar::Bool(parse::bool(raw).map_err(fail)?),
        Kind::Int(_) => parse::int(raw, true).map_err(fail)?,
        Kind::Uint(_) => parse::int(raw, false).map_err(fail)?,
        Kind::Float(_) => Scalar::Float(parse::float(raw).map_err(fail)?),
        Kind::Complex(_) => Scalar::Complex(parse::complex(raw).map_err(fail)?),
        Kind::Duration => Scalar::Duration(parse::duration(raw).map_err(fail)?),
        Kind::Timestamp => Scalar::Timestamp(parse::timestamp(raw, ctx.tags.format).map_err(fail)?),
        Kind::Url => Scalar::Url(parse::url(raw).map_err(fail)?),

        Kind::Sequence(elem) | Kind::Array(_, elem) => {
            return set_elements(ctx, target, kind, elem, raw);
        }
        // An absent pointee is only allocated if something is written to it.
        Kind::Optional(inner) if writes_nothing(ctx, inner, raw) => return Ok(()),
        Kind::Optional(inner) => {
            return target.with_pointee(&mut |pointee| convert(ctx, pointee, inner, raw))
                .unwrap_or_else(|| Err(ctx.unsupported(kind)));
        }

        // Maps are accepted but never populated.
        Kind::Map => return Ok(()),

        _ => return Err(ctx.unsupported(kind)),
    };

    target.set(scalar).map_err(|e| match e {
        SetError::Overflow => ctx.overflow(raw, kind).into(),
        SetError::Mismatch => ctx.unsupported(kind),
    })
}

/// The non-blank items of a sequence value.
fn items<'r>(ctx: &Target<'_>, raw: &'r str) -> Vec<&'r str> {
    raw.split(ctx.tags.separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Whether converting `raw` into a value of `kind` leaves the value untouched.
fn writes_nothing(ctx: &Target<'_>, kind: &Kind, raw: &str) -> bool {
    match kind {
        Kind::Array(0, _) | Kind::Map => true,
        Kind::Sequence(_) | Kind::Array(..) => items(ctx, raw).is_empty(),
        _ => false,
    }
}

/// Splits `raw` on the separator and converts each non-blank item into one
/// element. Nothing is written if there are no items.
fn set_elements(
    ctx: &Target<'_>,
    target: &mut dyn Reflect,
    kind: &Kind,
    elem: &Kind,
    raw: &str,
) -> Result<(), Error> {
    if writes_nothing(ctx, kind, raw) {
        return Ok(());
    }

    let items = items(ctx, raw);

    target.fill_elements(items.len(), &mut |i, e| convert(ctx, e, elem, items[i]))
        .unwrap_or_else(|| Err(ctx.unsupported(kind)))
}
