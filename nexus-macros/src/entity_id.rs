use crate::args::MacroArgs;
use crate::derive_utils::{apply_derives, standard_derives};
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, Result};

/// #[entity_id] 宏实现
/// 仅支持单字段 tuple struct，为强类型标识包装：
/// - 合并/追加派生：Debug（可关闭）, Clone, PartialEq, Eq, Hash, Serialize, Deserialize（透明序列化）
/// - 提供 new(value)、Display、FromStr、AsRef 与双向 From
/// - 与通用标识 `EntityId` 互转（内部类型需实现 Display / FromStr）
pub(crate) fn expand(mut args: MacroArgs, item: Item) -> Result<TokenStream> {
    let derive_debug = args.take_bool("debug")?.unwrap_or(true);
    args.finish("'debug'")?;

    let mut st = match item {
        Item::Struct(s) => s,
        other => return Err(syn::Error::new(other.span(), "#[entity_id] only on struct")),
    };

    let inner_ty = match &st.fields {
        syn::Fields::Unnamed(f) if f.unnamed.len() == 1 => f.unnamed[0].ty.clone(),
        syn::Fields::Unnamed(f) => {
            return Err(syn::Error::new(
                f.span(),
                "#[entity_id] requires a tuple struct with exactly one field",
            ));
        }
        _ => {
            return Err(syn::Error::new(
                st.span(),
                "#[entity_id] supports only tuple struct, e.g., struct X(String);",
            ));
        }
    };

    let required = standard_derives(
        derive_debug,
        &[
            syn::parse_quote!(PartialEq),
            syn::parse_quote!(Eq),
            syn::parse_quote!(Hash),
        ],
    );
    apply_derives(&mut st.attrs, required)?;
    st.attrs.push(syn::parse_quote!(#[serde(transparent)]));

    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    Ok(quote! {
        #st

        impl #impl_generics #ident #ty_generics #where_clause {
            pub fn new(value: #inner_ty) -> Self { Self(value) }

            pub fn value(&self) -> &#inner_ty { &self.0 }
        }

        impl #impl_generics ::std::str::FromStr for #ident #ty_generics #where_clause
        where #inner_ty: ::std::str::FromStr
        {
            type Err = <#inner_ty as ::std::str::FromStr>::Err;
            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                let inner: #inner_ty = s.parse()?;
                ::std::result::Result::Ok(Self(inner))
            }
        }

        impl #impl_generics ::std::fmt::Display for #ident #ty_generics #where_clause
        where #inner_ty: ::std::fmt::Display
        {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl #impl_generics ::core::convert::AsRef<#inner_ty> for #ident #ty_generics #where_clause {
            fn as_ref(&self) -> &#inner_ty { &self.0 }
        }

        impl #impl_generics ::core::convert::From<#inner_ty> for #ident #ty_generics #where_clause {
            fn from(value: #inner_ty) -> Self { Self(value) }
        }

        impl #impl_generics ::core::convert::From<#ident #ty_generics> for #inner_ty #where_clause {
            fn from(value: #ident #ty_generics) -> Self { value.0 }
        }

        impl #impl_generics ::core::convert::From<&#ident #ty_generics> for ::nexus_domain::identity::EntityId #where_clause
        where #inner_ty: ::std::fmt::Display
        {
            fn from(value: &#ident #ty_generics) -> Self {
                ::nexus_domain::identity::EntityId::new(value.0.to_string())
            }
        }

        impl #impl_generics ::core::convert::TryFrom<&::nexus_domain::identity::EntityId> for #ident #ty_generics #where_clause
        where #inner_ty: ::std::str::FromStr
        {
            type Error = <#inner_ty as ::std::str::FromStr>::Err;
            fn try_from(value: &::nexus_domain::identity::EntityId) -> ::std::result::Result<Self, Self::Error> {
                value.as_str().parse()
            }
        }
    })
}
