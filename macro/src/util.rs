/// Extracts all doc string attributes from the list and return them as list of
/// strings (in order).
pub(crate) fn extract_doc(attrs: &mut Vec<syn::Attribute>) -> Vec<String> {
    extract_attrs(attrs, |attr| {
        match attr.parse_meta().ok()? {
            syn::Meta::NameValue(syn::MetaNameValue {
                lit: syn::Lit::Str(s),
                path,
                ..
            }) if path.is_ident("doc") => Some(s.value()),
            _ => None,
        }
    })
}

fn extract_attrs<P, O>(attrs: &mut Vec<syn::Attribute>, mut pred: P) -> Vec<O>
where
    P: FnMut(&syn::Attribute) -> Option<O>,
{
    let mut out = Vec::new();
    attrs.retain(|attr| match pred(attr) {
        Some(v) => {
            out.push(v);
            false
        }
        None => true,
    });

    out
}
