use thiserror::Error;

/// 反馈操作的错误类型，错误消息直接展示给用户
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedbackError {
    #[error("评分必须在 1 到 5 之间")]
    InvalidRating,

    #[error("未找到课程: {0}")]
    CourseNotFound(String),
}
