//! 命令处理器
//!
//! 调用服务层采集数据，并渲染为标准输出上的文本

pub mod feed;
pub mod market;
