//! 领域建模属性宏（nexus-macros）
//!
//! 生成 `nexus-domain` 中各领域 trait 的样板实现：
//! - `#[value_object]`：派生合并 + `ValueObject`
//! - `#[entity_id]`：强类型标识包装
//! - `#[entity]`：注入 `BaseEntity` + `Entity`
//! - `#[aggregate_root]`：注入 `AggregateBase` + `Entity`/`AggregateRoot`
//! - `#[domain_event]`：事件载荷类型标签（`EventPayload`）
//!
//! 生成代码通过 `::nexus_domain` 与 `serde` 路径引用依赖，使用方需同时依赖这两个 crate。
//!
use proc_macro::TokenStream;
use syn::{Item, parse_macro_input};

mod aggregate_root;
mod args;
mod derive_utils;
mod domain_event;
mod entity;
mod entity_id;
mod field_utils;
mod value_object;

use args::MacroArgs;

fn finish(result: syn::Result<proc_macro2::TokenStream>) -> TokenStream {
    result.unwrap_or_else(syn::Error::into_compile_error).into()
}

/// 值对象宏
#[proc_macro_attribute]
pub fn value_object(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as MacroArgs);
    let item = parse_macro_input!(item as Item);
    finish(value_object::expand(args, item))
}

/// 实体 ID 宏
/// 用于 `tuple struct` 形式的 ID 类型（例如 `struct OrderId(String);`、`struct UserId(Uuid);`）
#[proc_macro_attribute]
pub fn entity_id(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as MacroArgs);
    let item = parse_macro_input!(item as Item);
    finish(entity_id::expand(args, item))
}

/// 实体宏
#[proc_macro_attribute]
pub fn entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as MacroArgs);
    let item = parse_macro_input!(item as Item);
    finish(entity::expand(args, item))
}

/// 聚合根宏
#[proc_macro_attribute]
pub fn aggregate_root(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as MacroArgs);
    let item = parse_macro_input!(item as Item);
    finish(aggregate_root::expand(args, item))
}

/// 领域事件载荷宏
#[proc_macro_attribute]
pub fn domain_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as MacroArgs);
    let item = parse_macro_input!(item as Item);
    finish(domain_event::expand(args, item))
}
