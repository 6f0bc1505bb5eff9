//! Flattening a configuration struct into the list of its leaf fields.

use crate::{
    convert,
    env::Vars,
    error::{ConfigErrors, ErrorInner, InvalidInput},
    file::FileFormat,
    kind::UnsupportedField,
    tags::ConfigTags,
    Error, Kind, Reflect, Struct,
};


/// A configuration struct prepared for loading: the root value and all of its
/// settable leaf fields, in declaration order (depth first).
///
/// Building an `Input` validates the types of all fields. Nested structs are
/// descended into, absent `Option<Struct>` fields are allocated with their
/// zero value on the way. Everything else is a leaf.
pub struct Input<'a> {
    name: &'static str,
    root: &'a mut dyn Reflect,
    fields: Vec<Field>,
    vars: Vars,
}

/// One leaf field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub(crate) slot: Slot,

    pub kind: Kind,
    pub tags: ConfigTags,

    /// Field names from the root down to this field.
    pub path: Vec<&'static str>,

    /// Tags of the enclosing struct fields, one per segment of `path` but the
    /// last.
    pub(crate) ancestors: Vec<ConfigTags>,

    /// Whether some provider supplied a value.
    pub is_set: bool,
}

/// Location of a field relative to the root value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Slot {
    steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Field with the given index of a struct.
    Field(usize),

    /// Pointee of an `Option`.
    Pointee,
}

impl Slot {
    pub(crate) fn resolve<'r>(&self, root: &'r mut dyn Reflect) -> Option<&'r mut dyn Reflect> {
        let mut cur = root;
        for step in &self.steps {
            cur = match *step {
                Step::Field(i) => cur.as_struct_mut()?.field_mut(i)?,
                Step::Pointee => cur.pointee_mut()?,
            };
        }
        Some(cur)
    }
}

impl Field {
    /// The path of this field within a file of the given format: every
    /// segment with a key override for `format` is renamed.
    pub fn file_path(&self, format: FileFormat) -> Vec<&'static str> {
        self.ancestors.iter()
            .chain(std::iter::once(&self.tags))
            .zip(&self.path)
            .map(|(tags, &name)| tags.file_key(format, name))
            .collect()
    }
}

impl<'a> Input<'a> {
    /// Prepares `root` for loading, using the process environment for
    /// `expand`.
    pub fn new(root: &'a mut dyn Reflect) -> Result<Self, Error> {
        Self::with_vars(root, Vars::os())
    }

    pub fn with_vars(root: &'a mut dyn Reflect, vars: Vars) -> Result<Self, Error> {
        let name = match root.kind() {
            Kind::Struct(name) => name,
            Kind::Optional(_) if root.pointee_mut().is_none() => {
                return Err(ErrorInner::InvalidInput(InvalidInput::Nil).into());
            }
            _ => {
                let ty = root.type_name();
                return Err(ErrorInner::InvalidInput(InvalidInput::NonStruct(ty)).into());
            }
        };

        let mut fields = Vec::new();
        let s = root.as_struct_mut()
            .ok_or(ErrorInner::InvalidInput(InvalidInput::NonStruct(name)))?;
        Walker { name, fields: &mut fields, steps: vec![], path: vec![], ancestors: vec![] }.walk(s)?;
        tracing::debug!(input = name, fields = fields.len(), "collected fields");

        Ok(Self { name, root, fields, vars })
    }

    /// Name of the root struct, the first segment of all error paths.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    /// The dotted path of field `index`, prefixed with the root name.
    pub fn path(&self, index: usize) -> String {
        render_path(self.name, &self.fields[index].path)
    }

    pub fn mark_set(&mut self, index: usize) {
        self.fields[index].is_set = true;
    }

    /// The value of field `index`.
    pub fn slot_mut(&mut self, index: usize) -> Result<&mut dyn Reflect, Error> {
        let path = render_path(self.name, &self.fields[index].path);
        self.fields[index].slot.resolve(&mut *self.root)
            .ok_or_else(|| ErrorInner::UnsettableField { path }.into())
    }

    /// The whole root value.
    pub fn root_mut(&mut self) -> &mut dyn Reflect {
        &mut *self.root
    }

    /// Converts `raw` and stores it into field `index`. Does not mark the
    /// field as set.
    pub fn set_value(&mut self, index: usize, raw: &str) -> Result<(), Error> {
        let field = &self.fields[index];
        let path = render_path(self.name, &field.path);
        let target = field.slot.resolve(&mut *self.root)
            .ok_or_else(|| Error::from(ErrorInner::UnsettableField { path: path.clone() }))?;

        let ctx = convert::Target { path: &path, tags: &field.tags, vars: &self.vars };
        convert::set_value(&ctx, target, raw)
    }

    /// Final pass after all providers ran: reports unset required fields,
    /// applies defaults to the other unset fields and expands `expand`
    /// fields. Errors are added to `errors`.
    pub fn finalize(&mut self, errors: &mut ConfigErrors) {
        for i in 0..self.fields.len() {
            let field = &self.fields[i];
            if !field.is_set {
                if field.tags.required {
                    errors.push(ErrorInner::RequiredField { path: self.path(i) }.into());
                } else if let Some(default) = field.tags.default_value() {
                    tracing::trace!(field = %self.path(i), default, "applying default");
                    if let Err(e) = self.set_value(i, default) {
                        errors.push(e);
                    }
                }
            }

            if self.fields[i].tags.expand {
                if let Err(e) = self.expand(i) {
                    errors.push(e);
                }
            }
        }
    }

    fn expand(&mut self, index: usize) -> Result<(), Error> {
        let field = &self.fields[index];
        let Some(target) = field.slot.resolve(&mut *self.root) else {
            return Ok(());
        };
        let Some(current) = target.as_str() else {
            return Ok(());
        };

        let expanded = self.vars.expand(current);
        if expanded != current {
            let path = render_path(self.name, &field.path);
            let ctx = convert::Target { path: &path, tags: &field.tags, vars: &self.vars };
            convert::set_raw(&ctx, target, &expanded)?;
        }
        Ok(())
    }
}

struct Walker<'f> {
    name: &'static str,
    fields: &'f mut Vec<Field>,
    steps: Vec<Step>,
    path: Vec<&'static str>,
    ancestors: Vec<ConfigTags>,
}

impl Walker<'_> {
    fn walk(&mut self, s: &mut dyn Struct) -> Result<(), Error> {
        for (i, meta) in s.meta().fields.iter().enumerate() {
            let tags = ConfigTags::extract(&meta.tags);
            if tags.ignore {
                continue;
            }
            let Some(value) = s.field_mut(i) else {
                continue;
            };

            self.path.push(meta.name);
            self.steps.push(Step::Field(i));
            self.visit(value, tags)?;
            self.steps.pop();
            self.path.pop();
        }

        Ok(())
    }

    fn visit(&mut self, value: &mut dyn Reflect, tags: ConfigTags) -> Result<(), Error> {
        let kind = value.kind();
        if let Err(unsupported) = kind.check() {
            return Err(ErrorInner::UnsupportedType {
                kind: unsupported.kind,
                element: unsupported.element,
                path: self.current_path(),
            }.into());
        }

        if kind.is_struct() {
            let s = value.as_struct_mut().ok_or_else(|| self.unsettable())?;
            self.ancestors.push(tags);
            self.walk(s)?;
            self.ancestors.pop();
            return Ok(());
        }

        if kind.is_optional_struct() {
            // Allocation fails if the pointee has no zero value, which means
            // one of its fields has a rejected type.
            if !value.allocate() {
                return Err(match value.check_pointee_shape() {
                    Err(UnsupportedField { path, unsupported }) => {
                        let mut full = self.path.clone();
                        full.extend(path);
                        Error::from(ErrorInner::UnsupportedType {
                            kind: unsupported.kind,
                            element: unsupported.element,
                            path: render_path(self.name, &full),
                        })
                    }
                    Ok(()) => self.unsettable(),
                });
            }
            let s = value.pointee_mut()
                .and_then(|p| p.as_struct_mut())
                .ok_or_else(|| self.unsettable())?;

            self.steps.push(Step::Pointee);
            self.ancestors.push(tags);
            self.walk(s)?;
            self.ancestors.pop();
            self.steps.pop();
            return Ok(());
        }

        self.fields.push(Field {
            slot: Slot { steps: self.steps.clone() },
            kind,
            tags,
            path: self.path.clone(),
            ancestors: self.ancestors.clone(),
            is_set: false,
        });
        Ok(())
    }

    fn current_path(&self) -> String {
        render_path(self.name, &self.path)
    }

    fn unsettable(&self) -> Error {
        ErrorInner::UnsettableField { path: self.current_path() }.into()
    }
}

/// `Conf` + `["http", "port"]` -> `Conf.http.port`.
pub(crate) fn render_path(name: &str, path: &[&str]) -> String {
    let mut out = String::from(name);
    for segment in path {
        out.push('.');
        out.push_str(segment);
    }
    out
}
