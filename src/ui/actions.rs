//! Action 枚举定义 (Intent)
//!
//! 用户交互转化为明确的语义化 Action

/// 用户操作枚举
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveSelectionUp,
    MoveSelectionDown,

    // 屏幕切换
    GoCourses,
    GoFeedback,
    GoAnalytics,
    // 从列表带着选中课程跳转（会记录选中标记）
    OpenFeedback,
    OpenAnalytics,

    // 列表操作
    StartSearch,
    CycleSort,
    StartAddCourse,
    StartDeleteCourse,

    // 表单 / 选择器
    NextField,   // Tab
    PrevCourse,  // 选择器上一门课程
    NextCourse,  // 选择器下一门课程

    ExportCharts,

    // 表单/通用交互
    Cancel,      // Esc / n
    Submit,      // Enter / y
    Input(char), // 输入字符
    DeleteChar,  // Backspace
}
