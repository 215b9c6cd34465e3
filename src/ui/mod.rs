mod pages;
pub mod theme;
mod widgets;

use crate::app_state::{App, FocusArea, HealthStatus, InputMode, MENU_LOGOUT};
use crate::config::{APP_TITLE, APP_VERSION};
use crate::pages::PageId;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use theme::Theme;

pub fn draw(f: &mut Frame, app: &App) {
    let theme = Theme::from_mode(app.features.dark_mode);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 顶部标题栏
            Constraint::Min(0),    // 中间内容区域
            Constraint::Min(8),    // 底部命令/日志区域
        ])
        .split(f.size());

    render_top_bar(f, chunks[0], app, &theme);

    if app.authenticated {
        let middle_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(20), Constraint::Min(0)])
            .split(chunks[1]);
        render_left_menu(f, middle_chunks[0], app, &theme);
        render_main_view(f, middle_chunks[1], app, &theme);
    } else {
        pages::render_login(f, chunks[1], &app.login, &theme);
    }

    render_bottom_bar(f, chunks[2], app, &theme);
}

fn render_top_bar(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let title = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().fg(theme.accent));

    let health_style = match app.health {
        HealthStatus::Up(_) => theme.success(),
        HealthStatus::Unreachable => theme.error(),
        HealthStatus::Checking => theme.warn(),
    };

    let title_text = Line::from(vec![
        Span::styled(
            format!(" {} ", APP_TITLE),
            theme.text().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" v{}  ", APP_VERSION)),
        Span::styled(app.health.label(), health_style),
    ]);

    let paragraph = Paragraph::new(title_text)
        .block(title)
        .alignment(ratatui::layout::Alignment::Center);

    f.render_widget(paragraph, area);
}

fn render_left_menu(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let menu_items: Vec<ListItem> = PageId::MENU
        .iter()
        .map(|p| p.title())
        .chain(std::iter::once(MENU_LOGOUT))
        .enumerate()
        .map(|(i, text)| {
            let is_selected = i == app.menu_selected_index;
            let is_active = PageId::MENU.get(i) == Some(&app.current);

            let style = if is_selected {
                if app.focus_area == FocusArea::Menu {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Magenta)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD)
                }
            } else if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                theme.text()
            };

            let prefix = if is_active { "● " } else { "○ " };
            ListItem::new(format!("{}{}", prefix, text)).style(style)
        })
        .collect();

    let title = if app.focus_area == FocusArea::Menu {
        "菜单 (Enter 确认)"
    } else {
        "菜单 (← 切换)"
    };

    let menu = List::new(menu_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(theme.border(app.focus_area == FocusArea::Menu)),
    );

    f.render_widget(menu, area);
}

fn render_main_view(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let focused = app.focus_area == FocusArea::MainView;
    match app.current {
        PageId::Assets => widgets::render_crud(f, area, &app.assets, focused, theme),
        PageId::Tags => pages::render_tags(f, area, &app.tags, focused, theme),
        PageId::Portfolios => widgets::render_crud(f, area, &app.portfolios, focused, theme),
        PageId::Strategies => pages::render_strategy(f, area, &app.strategy, focused, theme),
        PageId::Risk => pages::render_risk(f, area, &app.risk, focused, theme),
        PageId::MarketData => widgets::render_crud(f, area, &app.market_data, focused, theme),
        PageId::Features => widgets::render_crud(f, area, &app.features_page, focused, theme),
        PageId::Login | PageId::Health => pages::render_login(f, area, &app.login, theme),
    }
}

fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let bottom_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let command_prompt = if app.input_mode == InputMode::Command {
        let mut spans = vec![Span::styled(
            "命令: ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )];
        let cur = app
            .command_input
            .char_indices()
            .nth(app.command_cursor)
            .map(|(i, _)| i)
            .unwrap_or(app.command_input.len());
        let (left, right) = app.command_input.split_at(cur);
        spans.push(Span::raw(left));
        spans.push(Span::styled("_", theme.warn()));
        spans.push(Span::raw(right));

        // 补全建议以灰色幽灵文本显示
        if let Some(hint) = app.get_completion_hint() {
            spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
        }

        vec![Line::from(spans)]
    } else {
        vec![Line::from(vec![
            Span::styled("命令: ", theme.warn()),
            Span::raw("(按 / 进入命令模式, help 查看命令)"),
        ])]
    };
    let command_paragraph = Paragraph::new(command_prompt).block(
        Block::default()
            .borders(Borders::ALL)
            .title(if app.input_mode == InputMode::Command {
                "命令输入模式 (Enter执行 Esc取消 Tab补全 ↑↓历史)"
            } else {
                "命令输入 (←→切换 ↑↓导航 Enter确认 q退出)"
            })
            .style(if app.input_mode == InputMode::Command {
                Style::default().fg(Color::Green)
            } else {
                theme.text()
            }),
    );
    f.render_widget(command_paragraph, bottom_chunks[0]);

    // 最新的在顶部，最多 20 条
    let log_items: Vec<ListItem> = app
        .log_messages
        .iter()
        .rev()
        .take(20)
        .map(|msg| {
            let style = if msg.starts_with('✓') {
                theme.success()
            } else if msg.starts_with('✗') {
                theme.error()
            } else if msg.starts_with('⚠') {
                theme.warn()
            } else {
                theme.text()
            };
            ListItem::new(msg.as_str()).style(style)
        })
        .collect();

    let log = List::new(log_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("日志 (共 {} 条)", app.log_messages.len()))
            .style(theme.text()),
    );
    f.render_widget(log, bottom_chunks[1]);
}
