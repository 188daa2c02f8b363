//! 基础设施：日志与存储

pub mod logger;
pub mod store;
