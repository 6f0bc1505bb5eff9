use darling::Error;
use crate::{ir, util::extract_doc};


macro_rules! bail {
    ($node:expr, $msg:expr $(,)?) => {
        return Err(Error::custom($msg).with_span(&$node))
    };
}

impl ir::Input {
    pub(crate) fn from_ast(mut input: syn::DeriveInput) -> Result<Self, Error> {
        let struct_fields = match input.data {
            syn::Data::Struct(syn::DataStruct { fields: syn::Fields::Named(f), .. }) => f,
            _ => bail!(
                input.ident,
                "`confill::Config` can only be derive for structs with named fields",
            ),
        };

        if !input.generics.params.is_empty() {
            bail!(
                input.generics,
                "`confill::Config` cannot be derived for generic structs",
            );
        }

        let doc = extract_doc(&mut input.attrs);

        let mut errors = Vec::new();
        let mut fields = Vec::new();
        for field in struct_fields.named {
            match ir::Field::from_ast(field) {
                Ok(f) => fields.push(f),
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(Error::multiple(errors));
        }

        Ok(Self {
            doc,
            name: input.ident,
            fields,
        })
    }
}

impl ir::Field {
    fn from_ast(field: syn::Field) -> Result<Self, Error> {
        use darling::FromField;
        let mut field = Field::from_field(&field)?;
        let doc = extract_doc(&mut field.attrs);

        if field.separator.as_deref() == Some("") {
            bail!(field.ident, "`separator` must not be empty");
        }
        if field.ignore && (field.required || field.default.is_some()) {
            bail!(
                field.ident,
                "ignored fields cannot be `required` or have a `default`",
            );
        }

        Ok(Self {
            doc,
            name: field.ident.expect("bug: expected named field"),
            ty: field.ty,
            tags: ir::Tags {
                key: field.key,
                json: field.json,
                yaml: field.yaml,
                toml: field.toml,
                default: field.default,
                required: field.required,
                ignore: field.ignore,
                expand: field.expand,
                separator: field.separator,
                format: field.format,
            },
        })
    }
}

impl darling::FromMeta for ir::Expr {
    fn from_value(lit: &syn::Lit) -> Result<Self, Error> {
        match lit {
            syn::Lit::Str(l) => Ok(Self::Str(l.clone())),
            syn::Lit::Int(l) => Ok(Self::Int(l.clone())),
            syn::Lit::Float(l) => Ok(Self::Float(l.clone())),
            syn::Lit::Bool(l) => Ok(Self::Bool(l.clone())),
            _ => Err(Error::unexpected_lit_type(lit)),
        }
    }
}


#[derive(Debug, darling::FromField)]
#[darling(attributes(config), forward_attrs(doc))]
struct Field {
    ident: Option<syn::Ident>,
    ty: syn::Type,
    attrs: Vec<syn::Attribute>,

    #[darling(default)]
    key: Option<String>,

    #[darling(default)]
    json: Option<String>,

    #[darling(default)]
    yaml: Option<String>,

    #[darling(default)]
    toml: Option<String>,

    #[darling(default)]
    default: Option<ir::Expr>,

    #[darling(default)]
    required: bool,

    #[darling(default)]
    ignore: bool,

    #[darling(default)]
    expand: bool,

    #[darling(default)]
    separator: Option<String>,

    #[darling(default)]
    format: Option<String>,
}
