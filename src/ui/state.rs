//! App 状态定义 (Model)
//!
//! 包含应用状态结构体、三个屏幕各自的状态及相关枚举

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::models::{Course, SortOrder};
use crate::store::Store;

/// 提交成功后跳转到分析页前的固定延迟（不可取消）
pub const REDIRECT_DELAY: Duration = Duration::from_millis(900);

/// 直方图桶标签（1-5 星）
pub const BUCKET_LABELS: [&str; 5] = ["1★", "2★", "3★", "4★", "5★"];

/// 应用状态
pub struct App {
    pub store: Store,
    pub screen: Screen,
    pub mode: AppMode,
    pub message: Option<String>,

    // 课程列表页
    pub search: String,
    pub sort: SortOrder,
    pub selected_index: usize,
    pub visible_ids: Vec<String>, // 过滤排序后的课程 id
    pub input_buffer: String,     // 新增课程对话框的输入

    // 反馈表单页
    pub form: FeedbackForm,

    // 分析页
    pub analytics: AnalyticsState,

    // 提交成功后的定时跳转目标时刻
    pub redirect_at: Option<Instant>,
    pub export_dir: PathBuf,
}

/// 当前屏幕
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Courses,
    Feedback,
    Analytics,
}

/// 应用模式（覆盖在屏幕之上的交互状态）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Searching,
    AddingCourse,
    Confirm(ConfirmAction),
}

/// 确认操作类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Delete(String),
}

/// 反馈表单的输入焦点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Rating,
    Comment,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Rating => FormField::Comment,
            FormField::Comment => FormField::Rating,
        }
    }
}

/// 反馈表单状态
#[derive(Debug, Clone, Default)]
pub struct FeedbackForm {
    pub course_index: usize, // 选择器在全量目录中的位置
    pub field: FormField,
    pub rating: String,
    pub comment: String,
}

impl FeedbackForm {
    /// 提交成功后清空输入，保留课程选择
    pub fn reset(&mut self) {
        self.rating.clear();
        self.comment.clear();
        self.field = FormField::Rating;
    }
}

/// 分析页状态
#[derive(Debug, Clone, Default)]
pub struct AnalyticsState {
    pub course_index: usize,
    pub charts: Option<ChartSet>,
}

/// 一次绘制的图表数据
///
/// 由分析页独占持有，重绘前先整体释放旧值再重建
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub histogram: [u32; 5],
    pub average: Option<f64>,
    pub total: usize,
}

impl ChartSet {
    pub fn for_course(course: &Course) -> Self {
        Self {
            histogram: course.histogram(),
            average: course.average(),
            total: course.feedback_count(),
        }
    }

    /// 柱状图的文本快照（导出用）
    pub fn bar_snapshot(&self) -> String {
        let max = self.histogram.iter().copied().max().unwrap_or(0).max(1);
        let mut out = String::from("评分分布\n");
        for (label, count) in BUCKET_LABELS.iter().zip(self.histogram.iter()) {
            let width = (count * 40 / max) as usize;
            out.push_str(&format!("{} | {:<40} {}\n", label, "█".repeat(width), count));
        }
        out
    }

    /// 饼图的文本快照（每个桶的占比）
    pub fn pie_snapshot(&self) -> String {
        let total: u32 = self.histogram.iter().sum();
        let mut out = String::from("评分占比\n");
        for (label, count) in BUCKET_LABELS.iter().zip(self.histogram.iter()) {
            let pct = if total == 0 {
                0.0
            } else {
                f64::from(*count) * 100.0 / f64::from(total)
            };
            out.push_str(&format!("{} | {:>5.1}% ({})\n", label, pct, count));
        }
        out
    }
}

impl App {
    /// 创建新的应用实例
    pub fn new(store: Store, export_dir: PathBuf) -> Self {
        let mut app = Self {
            store,
            screen: Screen::Courses,
            mode: AppMode::Normal,
            message: None,
            search: String::new(),
            sort: SortOrder::default(),
            selected_index: 0,
            visible_ids: Vec::new(),
            input_buffer: String::new(),
            form: FeedbackForm::default(),
            analytics: AnalyticsState::default(),
            redirect_at: None,
            export_dir,
        };
        app.refresh_visible();
        app
    }

    /// 重新计算可见课程列表（保持当前过滤与排序）
    pub fn refresh_visible(&mut self) {
        self.visible_ids = self
            .store
            .catalog()
            .filter_sorted(&self.search, self.sort)
            .iter()
            .map(|c| c.id.clone())
            .collect();

        // 确保选中索引有效
        if self.visible_ids.is_empty() {
            self.selected_index = 0;
        } else if self.selected_index >= self.visible_ids.len() {
            self.selected_index = self.visible_ids.len() - 1;
        }
    }

    /// 列表中当前选中的课程
    pub fn selected_course(&self) -> Option<&Course> {
        self.visible_ids
            .get(self.selected_index)
            .and_then(|id| self.store.catalog().get(id))
    }

    /// 列表中当前选中的课程 id
    pub fn selected_course_id(&self) -> Option<String> {
        self.visible_ids.get(self.selected_index).cloned()
    }

    /// 反馈表单选择器指向的课程
    pub fn form_course(&self) -> Option<&Course> {
        self.store.catalog().courses.get(self.form.course_index)
    }

    /// 分析页选择器指向的课程
    pub fn analytics_course(&self) -> Option<&Course> {
        self.store.catalog().courses.get(self.analytics.course_index)
    }

    pub fn form_course_name(&self) -> Option<String> {
        self.form_course().map(|c| c.name.clone())
    }

    pub fn analytics_course_name(&self) -> Option<String> {
        self.analytics_course().map(|c| c.name.clone())
    }
}
