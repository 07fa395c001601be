//! 业务逻辑处理 (Update/Dispatch)
//!
//! 包含核心的 dispatch 逻辑和各屏幕的业务处理方法

use std::fs;
use std::time::Instant;

use log::warn;

use super::actions::Action;
use super::state::{App, AppMode, ChartSet, ConfirmAction, FormField, REDIRECT_DELAY, Screen};

impl App {
    /// 核心逻辑分发，返回是否退出
    pub fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::MoveSelectionUp => self.move_up(),
            Action::MoveSelectionDown => self.move_down(),

            Action::GoCourses => self.show_courses(),
            Action::GoFeedback => self.show_feedback(),
            Action::GoAnalytics => self.show_analytics(),
            Action::OpenFeedback => self.open_feedback(),
            Action::OpenAnalytics => self.open_analytics(),

            Action::StartSearch => {
                self.mode = AppMode::Searching;
                self.message = None;
            }
            Action::CycleSort => self.cycle_sort(),
            Action::StartAddCourse => self.start_add_course(),
            Action::StartDeleteCourse => self.start_delete_course(),

            Action::NextField => self.form.field = self.form.field.next(),
            Action::PrevCourse => self.cycle_course(-1),
            Action::NextCourse => self.cycle_course(1),

            Action::ExportCharts => self.export_charts(),

            Action::Cancel => self.cancel(),

            Action::Submit => match &self.mode {
                AppMode::Searching => self.mode = AppMode::Normal,
                AppMode::AddingCourse => self.confirm_add_course(),
                AppMode::Confirm(_) => self.execute_confirm(),
                AppMode::Normal => {
                    if self.screen == Screen::Feedback {
                        self.submit_feedback();
                    }
                }
            },

            Action::Input(c) => self.input_char(c),
            Action::DeleteChar => self.delete_char(),
        }
        false
    }

    // ============ 导航相关 ============

    /// 向上移动列表选择
    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// 向下移动列表选择
    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.visible_ids.len() {
            self.selected_index += 1;
        }
    }

    /// 切换到课程列表页
    pub fn show_courses(&mut self) {
        self.screen = Screen::Courses;
        self.refresh_visible();
    }

    /// 切换到反馈表单页，选择器按选中标记预选
    pub fn show_feedback(&mut self) {
        self.screen = Screen::Feedback;
        self.form.field = FormField::Rating;

        let len = self.store.catalog().courses.len();
        if let Some(pos) = self.marker_position() {
            self.form.course_index = pos;
        } else if self.form.course_index >= len {
            self.form.course_index = 0;
        }
    }

    /// 切换到分析页，选择器按选中标记预选并重绘
    pub fn show_analytics(&mut self) {
        self.screen = Screen::Analytics;

        let len = self.store.catalog().courses.len();
        if let Some(pos) = self.marker_position() {
            self.analytics.course_index = pos;
        } else if self.analytics.course_index >= len {
            self.analytics.course_index = 0;
        }

        self.draw_selected();
    }

    /// 从列表进入反馈表单（记录选中标记）
    pub fn open_feedback(&mut self) {
        if let Some(id) = self.selected_course_id() {
            self.store.select_course(&id);
            self.show_feedback();
        }
    }

    /// 从列表进入分析页（记录选中标记）
    pub fn open_analytics(&mut self) {
        if let Some(id) = self.selected_course_id() {
            self.store.select_course(&id);
            self.show_analytics();
        }
    }

    /// 选中标记对应的课程在目录中的位置
    fn marker_position(&self) -> Option<usize> {
        self.store
            .selected_course()
            .and_then(|id| self.store.catalog().position(&id))
    }

    /// 选择器切换课程（表单页不记录标记，分析页记录并重绘）
    fn cycle_course(&mut self, step: isize) {
        let len = self.store.catalog().courses.len();
        if len == 0 {
            return;
        }

        match self.screen {
            Screen::Feedback => {
                let idx = self.form.course_index as isize + step;
                self.form.course_index = idx.rem_euclid(len as isize) as usize;
            }
            Screen::Analytics => {
                let idx = self.analytics.course_index as isize + step;
                self.analytics.course_index = idx.rem_euclid(len as isize) as usize;
                if let Some(id) = self.analytics_course().map(|c| c.id.clone()) {
                    self.store.select_course(&id);
                }
                self.draw_selected();
            }
            Screen::Courses => {}
        }
    }

    // ============ 搜索与排序 ============

    /// 循环切换排序方式
    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
        self.refresh_visible();
        self.message = Some(format!("排序方式: {}", self.sort.label()));
    }

    // ============ 新增课程 ============

    /// 开始新增课程
    pub fn start_add_course(&mut self) {
        self.mode = AppMode::AddingCourse;
        self.input_buffer.clear();
    }

    /// 确认新增课程；名称为空时停留在对话框
    pub fn confirm_add_course(&mut self) {
        let name = self.input_buffer.trim().to_string();
        if name.is_empty() {
            return;
        }

        self.store.add_course(&name);
        self.input_buffer.clear();
        self.mode = AppMode::Normal;
        self.refresh_visible();
        self.message = Some("课程已添加".to_string());
    }

    // ============ 删除课程 ============

    /// 开始删除课程（弹出确认）
    pub fn start_delete_course(&mut self) {
        if let Some(id) = self.selected_course_id() {
            self.mode = AppMode::Confirm(ConfirmAction::Delete(id));
        }
    }

    /// 执行确认操作
    pub fn execute_confirm(&mut self) {
        if let AppMode::Confirm(ConfirmAction::Delete(id)) = &self.mode {
            let id = id.clone();
            if self.store.delete_course(&id) {
                self.message = Some("课程已删除".to_string());
            }
        }
        // 保持当前过滤与排序重新渲染
        self.refresh_visible();
        self.mode = AppMode::Normal;
    }

    // ============ 提交反馈 ============

    /// 提交表单；校验失败只提示，不改动任何状态
    pub fn submit_feedback(&mut self) {
        let Some(course_id) = self.form_course().map(|c| c.id.clone()) else {
            self.message = Some("暂无课程，先去添加一门吧".to_string());
            return;
        };

        // 未填写评分按 0 处理，交给校验拒绝
        let rating = self.form.rating.trim().parse::<u8>().unwrap_or(0);

        match self.store.submit_feedback(&course_id, rating, &self.form.comment) {
            Ok(()) => {
                self.message = Some("✅ 反馈已提交，感谢！".to_string());
                self.form.reset();
                self.refresh_visible();
                self.redirect_at = Some(Instant::now() + REDIRECT_DELAY);
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    /// 事件循环的定时回调，驱动提交后的跳转
    pub fn tick(&mut self) {
        if let Some(deadline) = self.redirect_at {
            if Instant::now() >= deadline {
                self.redirect_at = None;
                self.show_analytics();
            }
        }
    }

    // ============ 分析页 ============

    /// 按当前选择重绘；先释放旧图表再重建
    pub fn draw_selected(&mut self) {
        self.analytics.charts = None;
        if let Some(id) = self.analytics_course().map(|c| c.id.clone()) {
            self.draw_for_course(&id);
        }
    }

    /// 按课程 id 绘制图表；课程不存在时静默跳过
    pub fn draw_for_course(&mut self, id: &str) {
        if let Some(course) = self.store.catalog().get(id) {
            self.analytics.charts = Some(ChartSet::for_course(course));
        }
    }

    /// 把两张图表的文本快照写入数据目录
    pub fn export_charts(&mut self) {
        let Some(charts) = &self.analytics.charts else {
            self.message = Some("暂无可导出的图表".to_string());
            return;
        };

        let result = fs::write(self.export_dir.join("bar_chart.txt"), charts.bar_snapshot())
            .and_then(|()| fs::write(self.export_dir.join("pie_chart.txt"), charts.pie_snapshot()));

        match result {
            Ok(()) => {
                self.message = Some(format!("图表已导出到 {}", self.export_dir.display()));
            }
            Err(e) => {
                warn!("导出图表失败: {}", e);
                self.message = Some("导出图表失败".to_string());
            }
        }
    }

    // ============ 通用操作 ============

    /// 取消当前操作
    pub fn cancel(&mut self) {
        match &self.mode {
            AppMode::Normal => {
                if self.screen == Screen::Courses {
                    self.message = None;
                } else {
                    self.show_courses();
                }
            }
            AppMode::Searching => {
                self.search.clear();
                self.mode = AppMode::Normal;
                self.refresh_visible();
            }
            AppMode::AddingCourse => {
                self.input_buffer.clear();
                self.mode = AppMode::Normal;
            }
            AppMode::Confirm(_) => self.mode = AppMode::Normal,
        }
    }

    /// 把字符送进当前活跃的输入
    fn input_char(&mut self, c: char) {
        match self.mode {
            AppMode::Searching => {
                self.search.push(c);
                self.refresh_visible();
            }
            AppMode::AddingCourse => self.input_buffer.push(c),
            AppMode::Normal if self.screen == Screen::Feedback => match self.form.field {
                FormField::Rating => {
                    // 评分只接受一位数字
                    if c.is_ascii_digit() && self.form.rating.is_empty() {
                        self.form.rating.push(c);
                    }
                }
                FormField::Comment => self.form.comment.push(c),
            },
            _ => {}
        }
    }

    fn delete_char(&mut self) {
        match self.mode {
            AppMode::Searching => {
                self.search.pop();
                self.refresh_visible();
            }
            AppMode::AddingCourse => {
                self.input_buffer.pop();
            }
            AppMode::Normal if self.screen == Screen::Feedback => match self.form.field {
                FormField::Rating => {
                    self.form.rating.pop();
                }
                FormField::Comment => {
                    self.form.comment.pop();
                }
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::MemoryBackend;
    use crate::store::Store;

    fn test_app() -> App {
        let store = Store::load(Box::new(MemoryBackend::default()));
        App::new(store, std::env::temp_dir())
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.dispatch(Action::Input(c));
        }
    }

    #[test]
    fn test_search_filters_live() {
        let mut app = test_app();
        assert_eq!(app.visible_ids.len(), 3);

        app.dispatch(Action::StartSearch);
        type_str(&mut app, "PyThOn");

        assert_eq!(app.visible_ids, vec!["c2".to_string()]);

        // Enter 退出搜索模式但保留过滤词
        app.dispatch(Action::Submit);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.visible_ids.len(), 1);

        // Esc 清空搜索
        app.dispatch(Action::StartSearch);
        app.dispatch(Action::Cancel);
        assert_eq!(app.visible_ids.len(), 3);
    }

    #[test]
    fn test_sort_cycling() {
        let mut app = test_app();
        // 默认按名称排序
        assert_eq!(app.visible_ids[0], "c3");

        app.dispatch(Action::CycleSort);
        // 平均分降序: c3 (4.60) 在前
        assert_eq!(app.visible_ids, vec!["c3", "c1", "c2"]);

        app.dispatch(Action::CycleSort);
        // 反馈数降序: c1 (6 条) 在前
        assert_eq!(app.visible_ids[0], "c1");
    }

    #[test]
    fn test_add_course_flow() {
        let mut app = test_app();

        app.dispatch(Action::StartAddCourse);
        assert_eq!(app.mode, AppMode::AddingCourse);
        type_str(&mut app, "Rust 入门");
        app.dispatch(Action::Submit);

        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.store.catalog().courses.len(), 4);
        assert_eq!(app.visible_ids.len(), 4);
        assert_eq!(app.message.as_deref(), Some("课程已添加"));
    }

    #[test]
    fn test_add_course_rejects_blank() {
        let mut app = test_app();

        app.dispatch(Action::StartAddCourse);
        type_str(&mut app, "   ");
        app.dispatch(Action::Submit);

        // 名称为空时停留在对话框，不新增
        assert_eq!(app.mode, AppMode::AddingCourse);
        assert_eq!(app.store.catalog().courses.len(), 3);
    }

    #[test]
    fn test_delete_flow_keeps_filter() {
        let mut app = test_app();

        app.dispatch(Action::StartSearch);
        type_str(&mut app, "data");
        app.dispatch(Action::Submit);
        assert_eq!(app.visible_ids, vec!["c3".to_string()]);

        app.dispatch(Action::StartDeleteCourse);
        assert_eq!(
            app.mode,
            AppMode::Confirm(ConfirmAction::Delete("c3".to_string()))
        );
        app.dispatch(Action::Submit);

        assert_eq!(app.store.catalog().courses.len(), 2);
        // 删除后仍然带着原有过滤条件重新渲染
        assert!(app.visible_ids.is_empty());
        assert_eq!(app.message.as_deref(), Some("课程已删除"));
    }

    #[test]
    fn test_delete_cancelled() {
        let mut app = test_app();

        app.dispatch(Action::StartDeleteCourse);
        app.dispatch(Action::Cancel);

        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.store.catalog().courses.len(), 3);
    }

    #[test]
    fn test_open_feedback_sets_marker() {
        let mut app = test_app();
        // 名称排序下第一项是 c3 "Data Science 101"
        app.dispatch(Action::OpenFeedback);

        assert_eq!(app.screen, Screen::Feedback);
        assert_eq!(app.store.selected_course().as_deref(), Some("c3"));
        // 选择器按标记预选（c3 在目录中的位置是 2）
        assert_eq!(app.form.course_index, 2);
    }

    #[test]
    fn test_submit_feedback_success_redirects() {
        let mut app = test_app();
        app.dispatch(Action::MoveSelectionDown); // c1
        app.dispatch(Action::OpenFeedback);
        assert_eq!(app.store.selected_course().as_deref(), Some("c1"));

        app.dispatch(Action::Input('5'));
        app.dispatch(Action::NextField);
        type_str(&mut app, "很有收获");
        app.dispatch(Action::Submit);

        assert_eq!(app.message.as_deref(), Some("✅ 反馈已提交，感谢！"));
        assert!(app.redirect_at.is_some());
        assert!(app.form.rating.is_empty());

        let c1 = app.store.catalog().get("c1").unwrap();
        assert_eq!(c1.ratings.len(), 7);
        assert_eq!(c1.comments.last().unwrap().text, "很有收获");

        // 到点后跳转到分析页并按标记预选
        app.redirect_at = Some(Instant::now());
        app.tick();
        assert_eq!(app.screen, Screen::Analytics);
        assert!(app.redirect_at.is_none());
        let charts = app.analytics.charts.as_ref().unwrap();
        assert_eq!(charts.total, 7);
    }

    #[test]
    fn test_submit_feedback_invalid_rating() {
        let mut app = test_app();
        app.dispatch(Action::OpenFeedback); // c3
        let before = app.store.catalog().get("c3").unwrap().clone();

        // 评分 6 被拒绝，课程状态不变
        app.dispatch(Action::Input('6'));
        app.dispatch(Action::Submit);
        assert_eq!(app.message.as_deref(), Some("评分必须在 1 到 5 之间"));
        assert!(app.redirect_at.is_none());
        assert_eq!(app.store.catalog().get("c3"), Some(&before));

        // 未填写评分同样被拒绝
        app.form.rating.clear();
        app.dispatch(Action::Submit);
        assert_eq!(app.message.as_deref(), Some("评分必须在 1 到 5 之间"));
        assert_eq!(app.store.catalog().get("c3"), Some(&before));
    }

    #[test]
    fn test_feedback_selector_does_not_touch_marker() {
        let mut app = test_app();
        app.dispatch(Action::GoFeedback);
        app.dispatch(Action::NextCourse);

        assert_eq!(app.form.course_index, 1);
        assert!(app.store.selected_course().is_none());
    }

    #[test]
    fn test_analytics_cycle_persists_marker() {
        let mut app = test_app();
        app.dispatch(Action::GoAnalytics);

        // 无标记时从目录第一门课开始
        assert_eq!(app.analytics.course_index, 0);
        assert!(app.analytics.charts.is_some());

        app.dispatch(Action::NextCourse);
        assert_eq!(app.store.selected_course().as_deref(), Some("c2"));
        assert_eq!(app.analytics.charts.as_ref().unwrap().total, 5);
    }

    #[test]
    fn test_draw_for_course_unknown_silent() {
        let mut app = test_app();
        app.draw_for_course("ghost");
        assert!(app.analytics.charts.is_none());
    }

    #[test]
    fn test_draw_selected_replaces_charts() {
        let mut app = test_app();
        app.dispatch(Action::GoAnalytics);
        let first = app.analytics.charts.clone().unwrap();

        app.dispatch(Action::NextCourse);
        let second = app.analytics.charts.clone().unwrap();

        // 旧图表被释放并按新课程重建
        assert_ne!(first, second);
    }

    #[test]
    fn test_comments_render_newest_first() {
        let mut app = test_app();
        let id = app.store.add_course("评论顺序");
        app.store.submit_feedback(&id, 4, "先来的").unwrap();
        app.store.submit_feedback(&id, 5, "后到的").unwrap();

        let course = app.store.catalog().get(&id).unwrap();
        let newest_first: Vec<&str> = course
            .comments
            .iter()
            .rev()
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(newest_first, vec!["后到的", "先来的"]);
    }

    #[test]
    fn test_export_charts() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app();
        app.export_dir = dir.path().to_path_buf();

        app.dispatch(Action::GoAnalytics);
        app.dispatch(Action::ExportCharts);

        let bar = std::fs::read_to_string(dir.path().join("bar_chart.txt")).unwrap();
        let pie = std::fs::read_to_string(dir.path().join("pie_chart.txt")).unwrap();
        assert!(bar.contains("1★"));
        assert!(pie.contains("%"));
        assert!(app.message.as_deref().unwrap().contains("图表已导出"));
    }
}
