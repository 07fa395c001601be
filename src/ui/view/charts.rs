//! 图表组件
//!
//! 评分分布用 BarChart 绘制，评分占比用比例条模拟饼图

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
};

use crate::ui::state::{BUCKET_LABELS, ChartSet};

/// 五个评分桶的固定配色（1 星红到 5 星绿）
pub const BUCKET_COLORS: [Color; 5] = [
    Color::Rgb(0xef, 0x44, 0x44),
    Color::Rgb(0xf9, 0x73, 0x16),
    Color::Rgb(0xf5, 0x9e, 0x0b),
    Color::Rgb(0x60, 0xa5, 0xfa),
    Color::Rgb(0x10, 0xb9, 0x81),
];

/// 评分分布柱状图
pub fn render_bar_chart(frame: &mut Frame, area: Rect, charts: &ChartSet) {
    let bars: Vec<Bar> = charts
        .histogram
        .iter()
        .enumerate()
        .map(|(i, count)| {
            Bar::default()
                .value(u64::from(*count))
                .label(Line::from(BUCKET_LABELS[i]))
                .style(Style::default().fg(BUCKET_COLORS[i]))
                .value_style(Style::default().fg(Color::Black).bg(BUCKET_COLORS[i]))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().title("评分分布").borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .bar_width(4)
        .bar_gap(1);

    frame.render_widget(chart, area);
}

/// 评分占比（饼图的终端替身，每桶一条比例线）
pub fn render_pie_chart(frame: &mut Frame, area: Rect, charts: &ChartSet) {
    let total: u32 = charts.histogram.iter().sum();

    let lines: Vec<Line> = charts
        .histogram
        .iter()
        .enumerate()
        .map(|(i, count)| {
            let pct = if total == 0 {
                0.0
            } else {
                f64::from(*count) * 100.0 / f64::from(total)
            };
            // 每 5% 一格，最长 20 格
            let blocks = (pct / 5.0).round() as usize;
            Line::from(vec![
                Span::styled(
                    format!("{} ", BUCKET_LABELS[i]),
                    Style::default().fg(BUCKET_COLORS[i]),
                ),
                Span::styled("█".repeat(blocks), Style::default().fg(BUCKET_COLORS[i])),
                Span::raw(format!(" {:.1}% ({})", pct, count)),
            ])
        })
        .collect();

    let widget =
        Paragraph::new(lines).block(Block::default().title("评分占比").borders(Borders::ALL));
    frame.render_widget(widget, area);
}
