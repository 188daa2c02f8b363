//! 核心模块：错误、时钟、中间件

pub mod clock;
pub mod error;
pub mod middleware;
