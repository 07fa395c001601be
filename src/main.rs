mod error;
mod models;
mod storage;
mod store;
mod ui;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use simplelog::{Config, LevelFilter, WriteLogger};

use crate::storage::FileBackend;
use crate::store::Store;
use crate::ui::{App, render};

/// 获取数据目录路径 (~/.local/share/fankui/)
fn get_data_dir() -> io::Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "无法获取用户数据目录"))?
        .join("fankui");

    fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

/// 日志写到数据目录下的文件（终端被 TUI 占用）
fn init_logging(data_dir: &Path) {
    if let Ok(file) = fs::File::create(data_dir.join("fankui.log")) {
        let _ = WriteLogger::init(LevelFilter::Info, Config::default(), file);
    }
}

fn main() -> io::Result<()> {
    let data_dir = get_data_dir()?;
    init_logging(&data_dir);

    // 加载课程数据（缺失或损坏时回退到演示数据）
    let store = Store::load(Box::new(FileBackend::new(&data_dir)));

    // 创建应用状态
    let mut app = App::new(store, data_dir.clone());

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    println!("数据目录: {}", data_dir.display());

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // 带超时轮询，空闲时驱动提交后的定时跳转
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && ui::handle_key_event(app, key.code)? {
                    break;
                }
            }
        }

        app.tick();
    }
    Ok(())
}
