//! 跨模块共享的领域类型

pub mod domain;

pub use domain::*;
