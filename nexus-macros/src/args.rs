use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;
use syn::{Attribute, Expr, Ident, LitStr, Result, Token};

/// 属性参数：`key = value` 列表，键允许使用关键字（如 `type`）
pub(crate) struct MacroArgs {
    entries: Vec<(Ident, Expr)>,
}

impl Parse for MacroArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut entries: Vec<(Ident, Expr)> = Vec::new();

        while !input.is_empty() {
            let key = Ident::parse_any(input)?;
            let _eq: Token![=] = input.parse()?;
            let value: Expr = input.parse()?;

            if entries.iter().any(|(k, _)| k == &key) {
                return Err(syn::Error::new(
                    key.span(),
                    format!("duplicate key '{key}' in attribute"),
                ));
            }
            entries.push((key, value));

            if input.is_empty() {
                break;
            }
            let _comma: Token![,] = input.parse()?;
        }

        Ok(Self { entries })
    }
}

impl MacroArgs {
    /// 解析字段/变体上的辅助属性，例如 `#[event(event_type = "...")]`
    pub(crate) fn from_attribute(attr: &Attribute) -> Result<Self> {
        attr.parse_args()
    }

    fn take(&mut self, key: &str) -> Option<(Ident, Expr)> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx))
    }

    pub(crate) fn take_str(&mut self, key: &str) -> Result<Option<LitStr>> {
        match self.take(key) {
            None => Ok(None),
            Some((
                _,
                Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(lit),
                    ..
                }),
            )) => Ok(Some(lit)),
            Some((_, other)) => Err(syn::Error::new(
                other.span(),
                format!("expected string literal for '{key}'"),
            )),
        }
    }

    pub(crate) fn take_bool(&mut self, key: &str) -> Result<Option<bool>> {
        match self.take(key) {
            None => Ok(None),
            Some((
                _,
                Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Bool(b),
                    ..
                }),
            )) => Ok(Some(b.value())),
            Some((_, other)) => Err(syn::Error::new(
                other.span(),
                format!("expected boolean literal for '{key}'"),
            )),
        }
    }

    pub(crate) fn take_path(&mut self, key: &str) -> Result<Option<syn::Path>> {
        match self.take(key) {
            None => Ok(None),
            Some((_, Expr::Path(p))) => Ok(Some(p.path)),
            Some((_, other)) => Err(syn::Error::new(
                other.span(),
                format!("expected a path for '{key}'"),
            )),
        }
    }

    /// 仍有未识别的键时报错
    pub(crate) fn finish(self, expected: &str) -> Result<()> {
        match self.entries.into_iter().next() {
            None => Ok(()),
            Some((key, _)) => Err(syn::Error::new(
                key.span(),
                format!("unknown key '{key}'; expected {expected}"),
            )),
        }
    }
}
