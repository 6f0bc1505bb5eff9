use proc_macro2::TokenStream;
use quote::quote;

use crate::ir;



/// Generates the whole `const META: ... = ...;` item.
pub(super) fn gen(input: &ir::Input) -> TokenStream {
    let name_str = input.name.to_string();
    let doc = &input.doc;
    let meta_fields = input.fields.iter().map(|f| {
        let name = f.name.to_string();
        let doc = &f.doc;
        let tags = gen_tags(&f.tags);

        quote! {
            confill::meta::Field {
                name: #name,
                doc: &[ #(#doc),* ],
                tags: #tags,
            }
        }
    });

    quote! {
        const META: confill::meta::Meta = confill::meta::Meta {
            name: #name_str,
            doc: &[ #(#doc),* ],
            fields: &[ #( #meta_fields ),* ],
        };
    }
}

fn gen_tags(tags: &ir::Tags) -> TokenStream {
    let key = opt_str(tags.key.as_deref());
    let json = opt_str(tags.json.as_deref());
    let yaml = opt_str(tags.yaml.as_deref());
    let toml = opt_str(tags.toml.as_deref());
    let default = opt_str(tags.default.as_ref().map(ir::Expr::to_raw_string).as_deref());
    let separator = opt_str(tags.separator.as_deref());
    let format = opt_str(tags.format.as_deref());
    let ir::Tags { required, ignore, expand, .. } = tags;

    quote! {
        confill::meta::Tags {
            key: #key,
            json: #json,
            yaml: #yaml,
            toml: #toml,
            default: #default,
            required: #required,
            ignore: #ignore,
            expand: #expand,
            separator: #separator,
            format: #format,
        }
    }
}

fn opt_str(value: Option<&str>) -> TokenStream {
    match value {
        Some(s) => quote! { std::option::Option::Some(#s) },
        None => quote! { std::option::Option::None },
    }
}
