use crate::args::MacroArgs;
use crate::derive_utils::{apply_derives, standard_derives};
use crate::field_utils::{ensure_leading_field, named_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, Result};

/// #[entity] 宏实现
/// - 若缺失则在最前注入 `#[serde(flatten)] base: ::nexus_domain::entity::BaseEntity`
/// - 合并/追加派生：Debug（可关闭）, Clone, Serialize, Deserialize
/// - 实现 `::nexus_domain::entity::Entity`
/// - 参数：`#[entity(debug = true|false)]`
pub(crate) fn expand(mut args: MacroArgs, item: Item) -> Result<TokenStream> {
    let derive_debug = args.take_bool("debug")?.unwrap_or(true);
    args.finish("'debug'")?;

    let mut st = match item {
        Item::Struct(s) => s,
        other => return Err(syn::Error::new(other.span(), "#[entity] only on struct")),
    };

    ensure_leading_field(
        named_fields(&mut st, "entity")?,
        syn::parse_quote! {
            #[serde(flatten)]
            base: ::nexus_domain::entity::BaseEntity
        },
    );
    apply_derives(&mut st.attrs, standard_derives(derive_debug, &[]))?;

    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    Ok(quote! {
        #st

        impl #impl_generics ::nexus_domain::entity::Entity for #ident #ty_generics #where_clause {
            fn base_entity(&self) -> &::nexus_domain::entity::BaseEntity { &self.base }

            fn base_entity_mut(&mut self) -> &mut ::nexus_domain::entity::BaseEntity { &mut self.base }
        }
    })
}
