//! 领域建模内核（nexus-domain）
//!
//! 为业务应用提供与存储、传输无关的领域层构件：
//! - 校验型值对象（`value_object`）：CPF/CNPJ、邮箱、电话、金额、百分比、日期区间等；
//! - 标识生成（`identity`）：UUIDv4、UUIDv7 与单调 ULID；
//! - 实体与聚合根（`entity`/`aggregate_root`），聚合根携带事件缓冲区；
//! - 领域事件记录（`domain_event`）；
//! - 事务边界与仓储协议（`persist`）。
//!
//! 典型用法：
//! 1. 用 `#[aggregate_root]` 定义聚合，在行为方法中 `raise` 领域事件；
//! 2. 在 `TransactionManager::with_transaction` 中保存聚合；
//! 3. 提交成功后 `drain_events` 并交给应用层分发。
//!
pub mod aggregate_root;
pub mod domain_event;
pub mod entity;
pub mod error;
pub mod identity;
pub mod persist;
pub mod value_object;

// 允许在本 crate 内部通过 ::nexus_domain 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::nexus_domain 路径。
extern crate self as nexus_domain;
