//! 会话上下文
//!
//! 封装"这是第几轮拍摄"这一信息，只用于日志

use std::fmt::Display;

/// 会话上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCtx {
    /// 第几轮拍摄（从1开始）
    pub session_index: usize,
}

impl SessionCtx {
    pub fn new(session_index: usize) -> Self {
        Self { session_index }
    }
}

impl Display for SessionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[会话 {}]", self.session_index)
    }
}
