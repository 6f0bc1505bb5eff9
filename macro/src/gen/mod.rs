use proc_macro2::TokenStream;
use quote::quote;

use crate::ir;

mod meta;


/// The main function to generate the output token stream from the parse IR.
pub(crate) fn gen(input: ir::Input) -> TokenStream {
    let config_impl = gen_config_impl(&input);
    let reflect_impl = gen_reflect_impl(&input);
    let struct_impl = gen_struct_impl(&input);

    quote! {
        #config_impl
        #reflect_impl
        #struct_impl
    }
}

/// Generates the `impl Config for ... { ... }`.
fn gen_config_impl(input: &ir::Input) -> TokenStream {
    let name = &input.name;
    let meta_item = meta::gen(input);

    quote! {
        #[automatically_derived]
        impl confill::Config for #name {
            #meta_item
        }
    }
}

/// Generates the `impl Reflect for ... { ... }`. A derived struct is always
/// of kind `Kind::Struct` and is never converted from a string directly.
fn gen_reflect_impl(input: &ir::Input) -> TokenStream {
    let name = &input.name;
    let name_str = name.to_string();

    let field_names = input.fields.iter().map(|f| &f.name);
    let zero_exprs = input.fields.iter().map(|f| {
        let ty = &f.ty;
        if f.is_ignored() {
            quote! { <#ty as std::default::Default>::default() }
        } else {
            quote! { <#ty as confill::Reflect>::zero()? }
        }
    });
    let field_checks = input.fields.iter().filter(|f| !f.is_ignored()).map(|f| {
        let ty = &f.ty;
        let name = f.name.to_string();
        quote! { confill::check_field::<#ty>(#name)?; }
    });

    quote! {
        #[automatically_derived]
        impl confill::Reflect for #name {
            fn shape() -> confill::Kind {
                confill::Kind::Struct(#name_str)
            }

            fn zero() -> std::option::Option<Self> {
                std::option::Option::Some(Self {
                    #( #field_names: #zero_exprs, )*
                })
            }

            fn kind(&self) -> confill::Kind {
                confill::Kind::Struct(#name_str)
            }

            fn check_shape() -> std::result::Result<(), confill::UnsupportedField> {
                #( #field_checks )*
                std::result::Result::Ok(())
            }

            fn as_struct_mut(&mut self) -> std::option::Option<&mut dyn confill::Struct> {
                std::option::Option::Some(self)
            }
        }
    }
}

/// Generates the `impl Struct for ... { ... }`: index based access to all
/// fields in declaration order. Ignored fields are not addressable.
fn gen_struct_impl(input: &ir::Input) -> TokenStream {
    let name = &input.name;
    let arms = input.fields.iter()
        .enumerate()
        .filter(|(_, f)| !f.is_ignored())
        .map(|(i, f)| {
            let field_name = &f.name;
            quote! {
                #i => std::option::Option::Some(&mut self.#field_name),
            }
        });

    quote! {
        #[automatically_derived]
        impl confill::Struct for #name {
            fn meta(&self) -> &'static confill::meta::Meta {
                &<Self as confill::Config>::META
            }

            fn field_mut(
                &mut self,
                index: usize,
            ) -> std::option::Option<&mut dyn confill::Reflect> {
                match index {
                    #( #arms )*
                    _ => std::option::Option::None,
                }
            }
        }
    }
}
