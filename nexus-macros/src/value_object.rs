use crate::args::MacroArgs;
use crate::derive_utils::{apply_derives, standard_derives};
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, Result};

/// #[value_object] 宏实现
/// - 支持结构体（具名或 tuple）与枚举
/// - 合并/追加派生：Debug（可关闭）, Clone, PartialEq, Serialize, Deserialize
/// - 实现 `::nexus_domain::value_object::ValueObject`
/// - 参数：`#[value_object(debug = true|false, validate = path)]`；
///   `validate` 指向 `fn(&Self) -> DomainResult<()>`，缺省视为恒成立
pub(crate) fn expand(mut args: MacroArgs, item: Item) -> Result<TokenStream> {
    let derive_debug = args.take_bool("debug")?.unwrap_or(true);
    let validate = args.take_path("validate")?;
    args.finish("'debug' | 'validate'")?;

    let required = standard_derives(derive_debug, &[syn::parse_quote!(PartialEq)]);

    let (item, ident, generics) = match item {
        Item::Struct(mut st) => {
            apply_derives(&mut st.attrs, required)?;
            let (ident, generics) = (st.ident.clone(), st.generics.clone());
            (Item::Struct(st), ident, generics)
        }
        Item::Enum(mut en) => {
            apply_derives(&mut en.attrs, required)?;
            let (ident, generics) = (en.ident.clone(), en.generics.clone());
            (Item::Enum(en), ident, generics)
        }
        other => {
            return Err(syn::Error::new(
                other.span(),
                "#[value_object] only supports struct or enum",
            ));
        }
    };

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let body = match validate {
        Some(path) => quote! { #path(self) },
        None => quote! { ::std::result::Result::Ok(()) },
    };

    Ok(quote! {
        #item

        impl #impl_generics ::nexus_domain::value_object::ValueObject for #ident #ty_generics #where_clause {
            fn validate(&self) -> ::nexus_domain::error::DomainResult<()> {
                #body
            }
        }
    })
}
