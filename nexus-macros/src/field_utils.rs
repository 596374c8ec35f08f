use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Field, Fields, FieldsNamed, ItemStruct, Result};

/// 取得结构体的具名字段，其他形态报错
pub(crate) fn named_fields<'a>(st: &'a mut ItemStruct, macro_name: &str) -> Result<&'a mut FieldsNamed> {
    let span = st.span();
    match &mut st.fields {
        Fields::Named(f) => Ok(f),
        _ => Err(syn::Error::new(
            span,
            format!("#[{macro_name}] only supports named-field struct"),
        )),
    }
}

/// 确保给定字段存在并位于最前
///
/// 用户已声明同名字段时保留用户的定义（包括属性），只调整位置。
pub(crate) fn ensure_leading_field(fields_named: &mut FieldsNamed, field: Field) {
    let mut leading = field;
    let mut rest: Punctuated<Field, syn::Token![,]> = Punctuated::new();

    for f in std::mem::take(&mut fields_named.named) {
        if f.ident.is_some() && f.ident == leading.ident {
            leading = f;
        } else {
            rest.push(f);
        }
    }

    let mut named = Punctuated::new();
    named.push(leading);
    named.extend(rest);
    fields_named.named = named;
}
