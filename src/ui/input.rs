//! 键盘事件映射 (Input -> Action)
//!
//! 将按键事件按当前屏幕和模式转换为 Action

use std::io;

use crossterm::event::KeyCode;

use super::actions::Action;
use super::state::{App, AppMode, Screen};

/// 根据当前屏幕、模式和按键获取对应的 Action
pub fn get_action(screen: Screen, mode: &AppMode, key: KeyCode) -> Option<Action> {
    match mode {
        AppMode::Normal => match screen {
            Screen::Courses => match key {
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveSelectionDown),
                KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveSelectionUp),
                KeyCode::Char('/') => Some(Action::StartSearch),
                KeyCode::Char('s') => Some(Action::CycleSort),
                KeyCode::Char('a') => Some(Action::StartAddCourse),
                KeyCode::Char('d') => Some(Action::StartDeleteCourse),
                KeyCode::Char('f') | KeyCode::Enter => Some(Action::OpenFeedback),
                KeyCode::Char('v') => Some(Action::OpenAnalytics),
                KeyCode::Char('2') => Some(Action::GoFeedback),
                KeyCode::Char('3') => Some(Action::GoAnalytics),
                _ => None,
            },
            // 表单页的字符都交给输入框，只保留少量控制键
            Screen::Feedback => match key {
                KeyCode::Esc => Some(Action::Cancel),
                KeyCode::Tab => Some(Action::NextField),
                KeyCode::Enter => Some(Action::Submit),
                KeyCode::Backspace => Some(Action::DeleteChar),
                KeyCode::Up => Some(Action::PrevCourse),
                KeyCode::Down => Some(Action::NextCourse),
                KeyCode::Char(c) => Some(Action::Input(c)),
                _ => None,
            },
            Screen::Analytics => match key {
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Esc | KeyCode::Char('1') => Some(Action::GoCourses),
                KeyCode::Char('2') => Some(Action::GoFeedback),
                KeyCode::Char('j') | KeyCode::Down => Some(Action::NextCourse),
                KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevCourse),
                KeyCode::Char('e') => Some(Action::ExportCharts),
                _ => None,
            },
        },
        AppMode::Searching | AppMode::AddingCourse => match key {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Backspace => Some(Action::DeleteChar),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
        AppMode::Confirm(_) => match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Submit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        },
    }
}

/// 处理按键事件，返回是否退出
pub fn handle_key_event(app: &mut App, key: KeyCode) -> io::Result<bool> {
    if let Some(action) = get_action(app.screen, &app.mode, key) {
        Ok(app.dispatch(action))
    } else {
        Ok(false)
    }
}
