use crate::args::MacroArgs;
use crate::derive_utils::{apply_derives, standard_derives};
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, ItemEnum, ItemStruct, LitStr, Result};

/// #[domain_event] 宏实现
/// - 合并/追加派生：Debug, Clone, PartialEq, Serialize, Deserialize
/// - 生成 `::nexus_domain::domain_event::EventPayload` 实现（事件类型标签）
/// - 枚举：每个变体默认类型为 `EnumName.Variant`，可用
///   `#[event(event_type = "...")]` 覆写；支持单元、元组与具名变体
/// - 结构体：`#[domain_event(event_type = "...")]`，默认取结构体名
pub(crate) fn expand(mut args: MacroArgs, item: Item) -> Result<TokenStream> {
    let event_type = args.take_str("event_type")?;
    args.finish("'event_type'")?;

    match item {
        Item::Enum(en) => {
            if let Some(lit) = event_type {
                return Err(syn::Error::new(
                    lit.span(),
                    "'event_type' on an enum is not supported; use #[event(event_type = ...)] per variant",
                ));
            }
            expand_enum(en)
        }
        Item::Struct(st) => expand_struct(st, event_type),
        other => Err(syn::Error::new(
            other.span(),
            "#[domain_event] can only be used on enum or struct types",
        )),
    }
}

fn required_derives() -> Vec<syn::Path> {
    standard_derives(true, &[syn::parse_quote!(PartialEq)])
}

fn expand_enum(mut enum_item: ItemEnum) -> Result<TokenStream> {
    apply_derives(&mut enum_item.attrs, required_derives())?;

    let enum_name = enum_item.ident.to_string();
    let mut arms = Vec::new();

    for v in &mut enum_item.variants {
        let mut type_lit: Option<LitStr> = None;
        let mut retained = Vec::new();

        for attr in v.attrs.drain(..) {
            if !attr.path().is_ident("event") {
                retained.push(attr);
                continue;
            }
            if type_lit.is_some() {
                return Err(syn::Error::new(
                    attr.span(),
                    "duplicate #[event(...)] on this variant",
                ));
            }
            let mut vargs = MacroArgs::from_attribute(&attr)?;
            type_lit = vargs.take_str("event_type")?;
            vargs.finish("'event_type'")?;
        }
        v.attrs = retained;

        let v_ident = &v.ident;
        let lit = type_lit.unwrap_or_else(|| {
            LitStr::new(&format!("{enum_name}.{v_ident}"), v_ident.span())
        });
        arms.push(quote! { Self::#v_ident { .. } => #lit });
    }

    let ident = &enum_item.ident;
    let (impl_generics, ty_generics, where_clause) = enum_item.generics.split_for_impl();

    Ok(quote! {
        #enum_item

        impl #impl_generics ::nexus_domain::domain_event::EventPayload for #ident #ty_generics #where_clause {
            fn event_type(&self) -> &'static str {
                match self { #( #arms, )* }
            }
        }
    })
}

fn expand_struct(mut st: ItemStruct, event_type: Option<LitStr>) -> Result<TokenStream> {
    apply_derives(&mut st.attrs, required_derives())?;

    let ident = &st.ident;
    let lit = event_type.unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    Ok(quote! {
        #st

        impl #impl_generics ::nexus_domain::domain_event::EventPayload for #ident #ty_generics #where_clause {
            fn event_type(&self) -> &'static str { #lit }
        }
    })
}
