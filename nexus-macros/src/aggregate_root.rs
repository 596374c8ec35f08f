use crate::args::MacroArgs;
use crate::derive_utils::{apply_derives, standard_derives};
use crate::field_utils::{ensure_leading_field, named_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, LitStr, Result};

/// #[aggregate_root] 宏实现
/// - 若缺失则在最前注入 `#[serde(flatten)] base: ::nexus_domain::aggregate_root::AggregateBase`
///   （标识、时间戳、版本号与事件缓冲区）
/// - 合并/追加派生：Debug（可关闭）, Clone, Serialize, Deserialize
/// - 实现 `Entity` 与 `AggregateRoot`
/// - 参数：`#[aggregate_root(type = "order", debug = true|false)]`，`type` 默认取结构体名
pub(crate) fn expand(mut args: MacroArgs, item: Item) -> Result<TokenStream> {
    let type_name = args.take_str("type")?;
    let derive_debug = args.take_bool("debug")?.unwrap_or(true);
    args.finish("'type' | 'debug'")?;

    let mut st = match item {
        Item::Struct(s) => s,
        other => {
            return Err(syn::Error::new(
                other.span(),
                "#[aggregate_root] only on struct",
            ));
        }
    };

    ensure_leading_field(
        named_fields(&mut st, "aggregate_root")?,
        syn::parse_quote! {
            #[serde(flatten)]
            base: ::nexus_domain::aggregate_root::AggregateBase
        },
    );
    apply_derives(&mut st.attrs, standard_derives(derive_debug, &[]))?;

    let ident = &st.ident;
    let type_name = type_name.unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    Ok(quote! {
        #st

        impl #impl_generics ::nexus_domain::entity::Entity for #ident #ty_generics #where_clause {
            fn base_entity(&self) -> &::nexus_domain::entity::BaseEntity {
                self.base.entity()
            }

            fn base_entity_mut(&mut self) -> &mut ::nexus_domain::entity::BaseEntity {
                self.base.entity_mut()
            }
        }

        impl #impl_generics ::nexus_domain::aggregate_root::AggregateRoot for #ident #ty_generics #where_clause {
            const TYPE: &'static str = #type_name;

            fn aggregate_base(&self) -> &::nexus_domain::aggregate_root::AggregateBase {
                &self.base
            }

            fn aggregate_base_mut(&mut self) -> &mut ::nexus_domain::aggregate_root::AggregateBase {
                &mut self.base
            }
        }
    })
}
