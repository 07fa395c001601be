//! 视图层模块
//!
//! 包含主渲染入口和各屏幕的视图

pub mod charts;
pub mod components;
pub mod layouts;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::state::{App, AppMode, ConfirmAction, FormField, Screen};
use components::{render_dialog_framework, render_input_widget, render_stat};
use layouts::centered_rect;

/// 渲染 UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 标题
            Constraint::Min(10),   // 屏幕主体
            Constraint::Length(3), // 帮助
        ])
        .split(frame.area());

    render_title(frame, app, chunks[0]);

    match app.screen {
        Screen::Courses => render_courses(frame, app, chunks[1]),
        Screen::Feedback => render_feedback(frame, app, chunks[1]),
        Screen::Analytics => render_analytics(frame, app, chunks[1]),
    }

    render_help(frame, app, chunks[2]);

    // 渲染弹窗
    match &app.mode {
        AppMode::AddingCourse => render_add_dialog(frame, app),
        AppMode::Confirm(action) => render_confirm_dialog(frame, action),
        _ => {}
    }
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let tab = |label: &str, active: bool| {
        if active {
            Span::styled(
                label.to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
        } else {
            Span::styled(label.to_string(), Style::default().fg(Color::Gray))
        }
    };

    let line = Line::from(vec![
        Span::styled(
            "📊 课程反馈台",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        tab(" 1 课程列表 ", app.screen == Screen::Courses),
        Span::raw(" "),
        tab(" 2 提交反馈 ", app.screen == Screen::Feedback),
        Span::raw(" "),
        tab(" 3 数据分析 ", app.screen == Screen::Analytics),
    ]);

    let title = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

// ============ 课程列表页 ============

fn render_courses(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 搜索框
            Constraint::Min(5),    // 列表
            Constraint::Length(6), // 详情
        ])
        .split(area);

    render_input_widget(
        frame,
        chunks[0],
        "搜索",
        &app.search,
        app.mode == AppMode::Searching,
        Color::Yellow,
    );

    let items: Vec<ListItem> = app
        .visible_ids
        .iter()
        .enumerate()
        .filter_map(|(i, id)| app.store.catalog().get(id).map(|c| (i, c)))
        .map(|(i, course)| {
            let content = format!(
                "{}  {} ⭐ ({} 条反馈)",
                course.name,
                course.average_label(),
                course.feedback_count()
            );
            let style = if i == app.selected_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(content, style)))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("课程列表 · 排序: {}", app.sort.label()))
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    state.select(Some(app.selected_index));
    frame.render_stateful_widget(list, chunks[1], &mut state);

    render_course_details(frame, app, chunks[2]);
}

fn render_course_details(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(course) = app.selected_course() {
        let latest = course
            .comments
            .last()
            .map(|c| format!("{} ({})", c.text, c.at))
            .unwrap_or_else(|| "暂无评论".to_string());
        format!(
            "名称: {}\n平均分: {} ⭐  反馈数: {}\n最新评论: {}",
            course.name,
            course.average_label(),
            course.feedback_count(),
            latest
        )
    } else if app.search.is_empty() {
        "暂无课程，按 'a' 添加第一门课程".to_string()
    } else {
        "没有匹配的课程，换个关键字试试".to_string()
    };

    let details = Paragraph::new(content)
        .block(Block::default().title("详情").borders(Borders::ALL))
        .wrap(Wrap { trim: true });

    frame.render_widget(details, area);
}

// ============ 反馈表单页 ============

fn render_feedback(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 课程选择器
            Constraint::Length(3), // 评分
            Constraint::Length(3), // 评论
            Constraint::Min(1),    // 提示
        ])
        .split(area);

    render_course_selector(frame, chunks[0], app.form_course_name(), "课程 (↑/↓ 切换)");

    render_input_widget(
        frame,
        chunks[1],
        "评分 (1-5)",
        &app.form.rating,
        app.form.field == FormField::Rating,
        Color::Yellow,
    );
    render_input_widget(
        frame,
        chunks[2],
        "评论 (可选)",
        &app.form.comment,
        app.form.field == FormField::Comment,
        Color::Yellow,
    );

    let hint = Paragraph::new("填写评分后按 Enter 提交，提交成功后会自动跳转到分析页")
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(hint, chunks[3]);
}

fn render_course_selector(frame: &mut Frame, area: Rect, name: Option<String>, title: &str) {
    let label = name
        .map(|n| format!("◂ {} ▸", n))
        .unwrap_or_else(|| "(暂无课程)".to_string());

    let selector = Paragraph::new(label)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(selector, area);
}

// ============ 分析页 ============

fn render_analytics(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 课程选择器
            Constraint::Length(3), // 统计
            Constraint::Min(8),    // 图表
            Constraint::Length(8), // 评论
        ])
        .split(area);

    render_course_selector(frame, chunks[0], app.analytics_course_name(), "课程 (j/k 切换)");

    if let Some(set) = &app.analytics.charts {
        let stats = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        let avg_label = match set.average {
            Some(avg) => format!("{:.2} ⭐", avg),
            None => "—".to_string(),
        };
        render_stat(frame, stats[0], "平均分", &avg_label, Color::Yellow);
        render_stat(frame, stats[1], "反馈总数", &set.total.to_string(), Color::Cyan);

        let chart_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[2]);
        charts::render_bar_chart(frame, chart_area[0], set);
        charts::render_pie_chart(frame, chart_area[1], set);
    } else {
        // 没有可绘制的课程时静默留空
        frame.render_widget(Block::default().borders(Borders::ALL), chunks[2]);
    }

    render_comments(frame, app, chunks[3]);
}

fn render_comments(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title("评论 (最新在前)").borders(Borders::ALL);

    let Some(course) = app.analytics_course() else {
        frame.render_widget(block, area);
        return;
    };

    if course.comments.is_empty() {
        let empty = Paragraph::new("暂无评论")
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    // 倒序展示，最近添加的评论排在最上面
    let items: Vec<ListItem> = course
        .comments
        .iter()
        .rev()
        .map(|c| {
            ListItem::new(Text::from(vec![
                Line::from(Span::styled(c.at.clone(), Style::default().fg(Color::Gray))),
                Line::from(c.text.clone()),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

// ============ 帮助与弹窗 ============

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match &app.mode {
        AppMode::Normal => match app.screen {
            Screen::Courses => {
                "[a] 添加  [d] 删除  [/] 搜索  [s] 排序  [f/Enter] 反馈  [v] 分析  [j/k] 导航  [q] 退出"
            }
            Screen::Feedback => "[↑/↓] 选课程  [Tab] 切换输入框  [Enter] 提交  [Esc] 返回列表",
            Screen::Analytics => "[j/k] 切换课程  [e] 导出图表  [2] 反馈  [Esc/1] 返回列表  [q] 退出",
        },
        AppMode::Searching => "输入关键字实时过滤  [Enter] 完成  [Esc] 清空并退出搜索",
        AppMode::AddingCourse => "输入课程名称后按 [Enter] 确认  [Esc] 取消",
        AppMode::Confirm(_) => "[y] 确认  [n] 取消",
    };

    let message = app.message.as_deref().unwrap_or("");
    let text = if message.is_empty() {
        help_text.to_string()
    } else {
        format!("{}  |  {}", help_text, message)
    };

    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, area);
}

fn render_add_dialog(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 30, frame.area());
    let inner = render_dialog_framework(frame, area, "添加新课程");

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(inner);

    render_input_widget(
        frame,
        chunks[0],
        "课程名称",
        &app.input_buffer,
        true,
        Color::Yellow,
    );

    let hint = Paragraph::new("输入名称后按 Enter 确认（名称不能为空），Esc 取消")
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(hint, chunks[1]);
}

fn render_confirm_dialog(frame: &mut Frame, action: &ConfirmAction) {
    let area = centered_rect(50, 20, frame.area());

    let message = match action {
        ConfirmAction::Delete(_) => "确认删除这门课程？它的评分和评论会一并删除。",
    };

    let inner = render_dialog_framework(frame, area, "⚠️ 确认操作");
    let dialog = Paragraph::new(format!("{}\n\n[y] 确认  [n] 取消", message))
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true });

    frame.render_widget(dialog, inner);
}
