use quote::ToTokens;
use syn::punctuated::Punctuated;
use syn::{Attribute, Path, Result, Token};

// 按末段名归一化，`Serialize` 与 `serde::Serialize` 视为同一个派生
fn derive_key(p: &Path) -> String {
    p.segments
        .last()
        .map(|s| s.ident.to_string())
        .unwrap_or_else(|| p.to_token_stream().to_string())
}

/// 把宏要求的派生与用户已写的派生合并为单个 `#[derive(...)]`，置于属性最前
///
/// 必需派生在前；用户已写的同名派生不重复添加。
pub(crate) fn apply_derives(attrs: &mut Vec<Attribute>, required: Vec<Path>) -> Result<()> {
    let mut retained = Vec::new();
    let mut merged: Vec<Path> = required;

    for attr in attrs.drain(..) {
        if !attr.path().is_ident("derive") {
            retained.push(attr);
            continue;
        }
        let list = attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)?;
        for p in list {
            let key = derive_key(&p);
            if !merged.iter().any(|m| derive_key(m) == key) {
                merged.push(p);
            }
        }
    }

    let derive: Attribute = syn::parse_quote!(#[derive(#(#merged),*)]);
    *attrs = std::iter::once(derive).chain(retained).collect();
    Ok(())
}

/// 标准派生集合；`debug = false` 时留给用户手写 `Debug`
pub(crate) fn standard_derives(derive_debug: bool, extra: &[Path]) -> Vec<Path> {
    let mut out: Vec<Path> = Vec::new();
    if derive_debug {
        out.push(syn::parse_quote!(Debug));
    }
    out.push(syn::parse_quote!(Clone));
    out.extend(extra.iter().cloned());
    out.push(syn::parse_quote!(serde::Serialize));
    out.push(syn::parse_quote!(serde::Deserialize));
    out
}
