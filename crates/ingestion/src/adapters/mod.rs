//! 输入适配器模块
//!
//! 每个适配器负责把一种输入形式转换为 `SyncGroup`。

pub mod common;
mod four_stream;
mod packed;

pub use four_stream::FourStreamAdapter;
pub use packed::PackedMessageAdapter;
