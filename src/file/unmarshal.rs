//! Writing a decoded file into a configuration struct, using the native types
//! of the file format.

use std::{path::Path, time::Duration};

use num_complex::Complex;

use crate::{
    convert::parse::{self, Failure},
    error::{ErrorInner, InvalidInput},
    input::render_path,
    reflect::{Scalar, SetError},
    tags::ConfigTags,
    Error, Kind, Reflect, Struct,
};
use super::{node::Node, FileFormat};


pub(super) fn unmarshal(
    root: &mut dyn Reflect,
    node: &Node,
    format: FileFormat,
    file: &Path,
) -> Result<(), Error> {
    let Kind::Struct(name) = root.kind() else {
        return Err(ErrorInner::InvalidInput(InvalidInput::NonStruct(root.type_name())).into());
    };
    let s = root.as_struct_mut()
        .ok_or(ErrorInner::InvalidInput(InvalidInput::NonStruct(name)))?;

    Decoder { format, file, name, path: vec![] }.decode_struct(s, node)
}

struct Decoder<'a> {
    format: FileFormat,
    file: &'a Path,
    name: &'static str,
    path: Vec<&'static str>,
}

impl Decoder<'_> {
    fn decode_struct(&mut self, s: &mut dyn Struct, node: &Node) -> Result<(), Error> {
        for (i, field) in s.meta().fields.iter().enumerate() {
            let tags = ConfigTags::extract(&field.tags);
            if tags.ignore {
                continue;
            }

            let key = tags.file_key(self.format, field.name);
            let Some(child) = node.get(key) else {
                continue;
            };
            let Some(value) = s.field_mut(i) else {
                continue;
            };

            self.path.push(field.name);
            let res = self.decode_value(value, child, &tags);
            self.path.pop();
            res?;
        }

        Ok(())
    }

    fn decode_value(
        &mut self,
        value: &mut dyn Reflect,
        node: &Node,
        tags: &ConfigTags,
    ) -> Result<(), Error> {
        // `null` leaves the field untouched.
        if node.is_null() {
            return Ok(());
        }

        let kind = value.kind();
        match &kind {
            Kind::Struct(_) => {
                if !matches!(node, Node::Map(_)) {
                    return Err(self.mismatch(&kind, node));
                }
                let s = value.as_struct_mut().ok_or_else(|| self.mismatch(&kind, node))?;
                self.decode_struct(s, node)
            }
            Kind::Optional(_) => {
                let res = value.with_pointee(&mut |p| self.decode_value(p, node, tags));
                res.unwrap_or_else(|| Err(self.mismatch(&kind, node)))
            }
            Kind::Sequence(_) | Kind::Array(..) => {
                let Node::Seq(items) = node else {
                    return Err(self.mismatch(&kind, node));
                };
                let res = value.fill_elements(
                    items.len(),
                    &mut |i, elem| self.decode_value(elem, &items[i], tags),
                );
                res.unwrap_or_else(|| Err(self.mismatch(&kind, node)))
            }
            Kind::Map => Ok(()),
            _ => {
                let scalar = self.scalar(&kind, node, tags)?;
                value.set(scalar).map_err(|e| match e {
                    SetError::Overflow => self.overflow(&kind, node),
                    SetError::Mismatch => self.mismatch(&kind, node),
                })
            }
        }
    }

    fn scalar(&self, kind: &Kind, node: &Node, tags: &ConfigTags) -> Result<Scalar, Error> {
        let parsed = |res: Result<Scalar, Failure>| res.map_err(|failure| match failure {
            Failure::Invalid(e) => self.error(format!("invalid {kind} \"{node}\": {e}")),
            Failure::Overflow => self.overflow(kind, node),
        });

        let scalar = match (kind, node) {
            (Kind::Bool, Node::Bool(b)) => Scalar::Bool(*b),
            (Kind::String, Node::Str(s)) => Scalar::Str(s.clone()),

            (Kind::Int(_) | Kind::Uint(_), Node::Int(i)) => Scalar::Int((*i).into()),
            (Kind::Int(_) | Kind::Uint(_), Node::Uint(u)) => Scalar::Uint((*u).into()),
            (Kind::Int(_) | Kind::Uint(_), Node::Float(f)) if f.fract() == 0.0 => {
                Scalar::Int(*f as i128)
            }

            (Kind::Float(_), Node::Float(f)) => Scalar::Float(*f),
            (Kind::Float(_), Node::Int(i)) => Scalar::Float(*i as f64),
            (Kind::Float(_), Node::Uint(u)) => Scalar::Float(*u as f64),

            (Kind::Complex(_), Node::Float(f)) => Scalar::Complex(Complex::new(*f, 0.0)),
            (Kind::Complex(_), Node::Int(i)) => Scalar::Complex(Complex::new(*i as f64, 0.0)),
            (Kind::Complex(_), Node::Uint(u)) => Scalar::Complex(Complex::new(*u as f64, 0.0)),
            (Kind::Complex(_), Node::Str(s)) => parsed(parse::complex(s).map(Scalar::Complex))?,

            // Plain numbers are nanoseconds.
            (Kind::Duration, Node::Uint(n)) => Scalar::Duration(Duration::from_nanos(*n)),
            (Kind::Duration, Node::Int(n)) => {
                let n = u64::try_from(*n).map_err(|_| self.error("negative duration".into()))?;
                Scalar::Duration(Duration::from_nanos(n))
            }
            (Kind::Duration, Node::Str(s)) => parsed(parse::duration(s).map(Scalar::Duration))?,

            (Kind::Timestamp, Node::Str(s)) => {
                parsed(parse::timestamp(s, tags.format).map(Scalar::Timestamp))?
            }
            (Kind::Url, Node::Str(s)) => parsed(parse::url(s).map(Scalar::Url))?,

            _ => return Err(self.mismatch(kind, node)),
        };

        Ok(scalar)
    }

    fn error(&self, msg: String) -> Error {
        ErrorInner::Decode {
            file: self.file.to_path_buf(),
            path: Some(render_path(self.name, &self.path)),
            msg,
        }.into()
    }

    fn mismatch(&self, kind: &Kind, node: &Node) -> Error {
        self.error(format!("invalid type: expected {kind}, found {}", node.describe()))
    }

    fn overflow(&self, kind: &Kind, node: &Node) -> Error {
        self.error(format!("value {node} overflows type \"{kind}\""))
    }
}
