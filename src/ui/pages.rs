use super::theme::Theme;
use super::widgets::{centered_rect, render_crud, render_details, render_form, render_table};
use crate::model::{fmt_opt, label_of, AssetClass, StrategyType, TableRow};
use crate::pages::login::LoginField;
use crate::pages::risk_assessment::{SubmitStatus, QUESTIONS};
use crate::pages::strategy::detail::{NO_BACKTESTS, NO_SIGNALS};
use crate::pages::strategy::{ChildList, DetailFocus, DetailModal, StrategyDetail};
use crate::pages::{LoginPage, RiskAssessmentPage, StrategyPage, TagsPage};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

pub fn render_tags(f: &mut Frame, area: Rect, page: &TagsPage, focused: bool, theme: &Theme) {
    let title = if focused {
        "标签管理 (r 刷新)".to_string()
    } else {
        "标签管理".to_string()
    };
    render_table(f, area, title, &page.list, focused, theme);
}

pub fn render_login(f: &mut Frame, area: Rect, page: &LoginPage, theme: &Theme) {
    let popup = centered_rect(50, 50, area);
    f.render_widget(Clear, popup);

    let field = |label: &str, value: String, active: bool| {
        let style = if active { theme.selected() } else { theme.text() };
        let cursor = if active { "_" } else { "" };
        Line::from(vec![
            Span::styled(format!("{}: ", label), style),
            Span::raw(format!("{}{}", value, cursor)),
        ])
    };

    let mut lines = vec![
        Line::from(""),
        field(
            "用户名",
            page.username.clone(),
            page.focus == LoginField::Username,
        ),
        Line::from(""),
        field(
            "密  码",
            page.masked_password(),
            page.focus == LoginField::Password,
        ),
        Line::from(""),
    ];
    if let Some(err) = &page.error {
        lines.push(Line::from(Span::styled(format!("✗ {}", err), theme.error())));
    }
    if page.submitting {
        lines.push(Line::from(Span::styled("登录中...", theme.warn())));
    }
    lines.push(Line::from(Span::styled(
        "Tab 切换  Enter 登录  Esc 退出",
        theme.hint(),
    )));

    let p = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("登录")
                .style(theme.border(true)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(p, popup);
}

pub fn render_risk(
    f: &mut Frame,
    area: Rect,
    page: &RiskAssessmentPage,
    focused: bool,
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(area);

    let mut lines: Vec<Line> = Vec::new();
    for (idx, q) in QUESTIONS.iter().enumerate() {
        let active = focused && idx == page.cursor;
        let style = if active {
            theme.text().add_modifier(Modifier::BOLD)
        } else {
            theme.text()
        };
        lines.push(Line::from(Span::styled(q.text, style)));
        let chosen = page.answers.get(&q.id).copied();
        let options: Vec<Span> = q
            .options
            .iter()
            .enumerate()
            .map(|(i, opt)| {
                let mark = if chosen == Some(i) { "●" } else { "○" };
                let text = format!("  {} {}. {}", mark, i + 1, opt);
                if chosen == Some(i) && active {
                    Span::styled(text, theme.selected())
                } else if chosen == Some(i) {
                    Span::styled(text, theme.success())
                } else {
                    Span::styled(text, theme.text())
                }
            })
            .collect();
        lines.push(Line::from(options));
    }
    lines.push(Line::from(""));
    if let Some(notice) = &page.notice {
        lines.push(Line::from(Span::styled(format!("⚠ {}", notice), theme.warn())));
    }
    if page.submitting {
        lines.push(Line::from(Span::styled("提交中...", theme.warn())));
    } else if let Some(status) = &page.status {
        let style = match status {
            SubmitStatus::Success => theme.success(),
            SubmitStatus::Failed(_) => theme.error(),
        };
        lines.push(Line::from(Span::styled(status.message(), style)));
    }
    if focused {
        lines.push(Line::from(Span::styled(
            "↑↓ 选题  1-4/空格 选择  Enter 提交  r 刷新结果",
            theme.hint(),
        )));
    }

    let questionnaire = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("风险测评")
                .style(theme.border(focused)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(questionnaire, chunks[0]);

    let latest = match &page.latest {
        Some(latest) => {
            let answers = latest
                .answers
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join("  ");
            vec![
                Line::from(format!("时间: {}", fmt_opt(&latest.created_at))),
                Line::from(format!("答案: {}", answers)),
            ]
        }
        None => vec![Line::from(Span::styled("暂无测评记录", theme.hint()))],
    };
    let p = Paragraph::new(latest)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("最近一次测评")
                .style(theme.border(false)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(p, chunks[1]);
}

pub fn render_strategy(
    f: &mut Frame,
    area: Rect,
    page: &StrategyPage,
    focused: bool,
    theme: &Theme,
) {
    render_crud(f, area, &page.crud, focused, theme);
    if let Some(detail) = &page.detail {
        render_strategy_detail(f, area, detail, theme);
    }
}

fn render_strategy_detail(f: &mut Frame, area: Rect, detail: &StrategyDetail, theme: &Theme) {
    let popup = centered_rect(90, 90, area);
    f.render_widget(Clear, popup);

    let s = &detail.strategy;
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(format!("策略详情 - {}", s.name))
        .style(theme.border(true));
    let inner = outer.inner(popup);
    f.render_widget(outer, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Min(4),
            Constraint::Min(4),
            Constraint::Length(2),
        ])
        .split(inner);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[0]);

    let info = vec![
        Line::from(format!(
            "类型: {}  资产类别: {}",
            label_of::<StrategyType>(&s.strategy_type),
            label_of::<AssetClass>(&s.asset_class)
        )),
        Line::from(format!(
            "风险等级: {}  预期收益: {}  最大回撤: {}",
            s.risk_level,
            fmt_opt(&s.expected_return),
            fmt_opt(&s.max_drawdown)
        )),
        Line::from(format!("描述: {}", fmt_opt(&s.description))),
    ];
    f.render_widget(
        Paragraph::new(info)
            .style(theme.text())
            .wrap(Wrap { trim: false }),
        top[0],
    );
    f.render_widget(
        Paragraph::new(s.pretty_parameters())
            .block(Block::default().borders(Borders::ALL).title("参数"))
            .wrap(Wrap { trim: false }),
        top[1],
    );

    let signals_focused = detail.focus == DetailFocus::Signals;
    render_child(
        f,
        chunks[1],
        "信号 (s 新增 e 编辑 Enter 查看)",
        &detail.signals,
        NO_SIGNALS,
        detail.error(),
        signals_focused,
        theme,
    );
    render_child(
        f,
        chunks[2],
        "回测 (b 新增 t 重试失败回测 Enter 查看)",
        &detail.backtests,
        NO_BACKTESTS,
        detail.error(),
        !signals_focused,
        theme,
    );

    let mut status: Vec<Span> = Vec::new();
    if let Some(err) = detail.error() {
        status.push(Span::styled(format!("✗ {}  ", err), theme.error()));
    }
    if let Some(notice) = &detail.notice {
        status.push(Span::styled(format!("✗ {}  ", notice), theme.error()));
    }
    if detail.retrying {
        status.push(Span::styled("重试中...  ", theme.warn()));
    }
    if !signals_focused {
        if let Some(bt) = detail.backtests.selected_record() {
            if bt.is_failed() {
                status.push(Span::styled("该回测失败，按 t 重试  ", theme.warn()));
            }
        }
    }
    status.push(Span::styled(
        "Tab 切换列表  r 刷新  Esc 关闭",
        theme.hint(),
    ));
    f.render_widget(Paragraph::new(Line::from(status)), chunks[3]);

    match &detail.modal {
        Some(DetailModal::Signal(form)) => render_form(f, area, "信号", form, theme),
        Some(DetailModal::Backtest(form)) => render_form(f, area, "回测", form, theme),
        Some(DetailModal::ViewSignal(signal)) => {
            render_details(f, area, "信号详情", signal.details(), theme)
        }
        Some(DetailModal::ViewBacktest(bt)) => {
            render_details(f, area, "回测详情", bt.details(), theme)
        }
        None => {}
    }
}

fn render_child<R: TableRow>(
    f: &mut Frame,
    area: Rect,
    title: &str,
    list: &ChildList<R>,
    empty: &str,
    failure: Option<&str>,
    focused: bool,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .style(theme.border(focused));

    if let Some(msg) = list.placeholder(empty, failure) {
        let style = if failure.is_some() {
            theme.error()
        } else {
            theme.hint()
        };
        f.render_widget(Paragraph::new(msg).style(style).block(block), area);
        return;
    }

    let headers = R::headers();
    let n = headers.len().max(1) as u32;
    let widths: Vec<Constraint> = (0..n).map(|_| Constraint::Ratio(1, n)).collect();
    let rows: Vec<Row> = list
        .records
        .iter()
        .map(|r| Row::new(r.cells().into_iter().map(Cell::from)).style(theme.text()))
        .collect();
    let mut table = Table::new(rows, widths)
        .header(
            Row::new(headers.iter().map(|h| Cell::from(*h)))
                .style(theme.text().add_modifier(Modifier::BOLD)),
        )
        .block(block);
    let mut state = TableState::default();
    if focused {
        table = table.highlight_style(theme.selected()).highlight_symbol(">> ");
        state.select(Some(list.selected));
    }
    f.render_stateful_widget(table, area, &mut state);
}
