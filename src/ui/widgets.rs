use super::theme::Theme;
use crate::crud::{CrudPage, Draft, FieldKind, FormModal, ListState};
use crate::model::{Identified, TableRow};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

/// 居中的弹窗区域，按百分比
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// 记录表格；加载失败时只显示错误
pub fn render_table<R: TableRow>(
    f: &mut Frame,
    area: Rect,
    title: String,
    list: &ListState<R>,
    focused: bool,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(theme.border(focused));

    if let Some(err) = &list.error {
        let p = Paragraph::new(Line::from(Span::styled(err.as_str(), theme.error())))
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(p, area);
        return;
    }
    if list.records.is_empty() {
        let msg = if list.loading { "加载中..." } else { "暂无数据" };
        f.render_widget(Paragraph::new(msg).style(theme.hint()).block(block), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let headers = R::headers();
    let header = Row::new(headers.iter().map(|h| Cell::from(*h)))
        .style(theme.text().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = list
        .records
        .iter()
        .map(|r| Row::new(r.cells().into_iter().map(Cell::from)).style(theme.text()))
        .collect();
    let n = headers.len().max(1) as u32;
    let widths: Vec<Constraint> = (0..n).map(|_| Constraint::Ratio(1, n)).collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(theme.selected())
        .highlight_symbol(">> ");
    let mut state = TableState::default();
    state.select(Some(list.selected));
    f.render_stateful_widget(table, chunks[0], &mut state);

    let footer = match (&list.notice, list.deleting) {
        (Some(notice), _) => Span::styled(format!(" ✗ {}", notice), theme.error()),
        (None, true) => Span::styled(" 删除中...", theme.warn()),
        (None, false) => Span::styled(format!(" 共 {} 条", list.records.len()), theme.hint()),
    };
    f.render_widget(Paragraph::new(Line::from(footer)), chunks[1]);
}

/// 新增/编辑弹窗
pub fn render_form<D: Draft>(
    f: &mut Frame,
    area: Rect,
    noun: &str,
    form: &FormModal<D>,
    theme: &Theme,
) {
    let popup = centered_rect(70, 80, area);
    f.render_widget(Clear, popup);

    let title = if form.is_edit() {
        format!("编辑{}", noun)
    } else {
        format!("新增{}", noun)
    };

    let mut lines: Vec<Line> = Vec::new();
    for (idx, spec) in form.fields().iter().enumerate() {
        let raw = form.draft.value(idx);
        let selected = idx == form.selected_field;
        let marker = if selected { "> " } else { "  " };
        let required = if spec.required { "*" } else { "" };
        let label = format!("{}{}{}: ", marker, spec.label, required);
        let label_style = if selected {
            theme.selected()
        } else {
            theme.text()
        };
        match spec.kind {
            FieldKind::Json => {
                lines.push(Line::from(Span::styled(label, label_style)));
                for l in raw.lines() {
                    lines.push(Line::from(format!("    {}", l)));
                }
                if raw.is_empty() && selected {
                    lines.push(Line::from("    _"));
                }
            }
            FieldKind::Choice(_) | FieldKind::Toggle => {
                lines.push(Line::from(vec![
                    Span::styled(label, label_style),
                    Span::raw(format!("◀ {} ▶", spec.display(&raw))),
                ]));
            }
            FieldKind::Text | FieldKind::Number => {
                let cursor = if selected { "_" } else { "" };
                lines.push(Line::from(vec![
                    Span::styled(label, label_style),
                    Span::raw(format!("{}{}", raw, cursor)),
                ]));
            }
        }
    }
    lines.push(Line::from(""));
    if let Some(err) = &form.error {
        lines.push(Line::from(Span::styled(format!("✗ {}", err), theme.error())));
    }
    if form.submitting {
        lines.push(Line::from(Span::styled("提交中...", theme.warn())));
    }
    lines.push(Line::from(Span::styled(
        "Tab/↑↓ 切换字段  ←→/空格 切换选项  Enter 提交  Esc 取消",
        theme.hint(),
    )));

    let p = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(theme.border(true)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(p, popup);
}

pub fn render_confirm(f: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let popup = centered_rect(50, 25, area);
    f.render_widget(Clear, popup);
    let p = Paragraph::new(vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled("y/Enter 确认  n/Esc 取消", theme.hint())),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("确认删除")
            .style(theme.warn()),
    )
    .wrap(Wrap { trim: false });
    f.render_widget(p, popup);
}

/// 只读详情
pub fn render_details(
    f: &mut Frame,
    area: Rect,
    title: &str,
    rows: Vec<(&'static str, String)>,
    theme: &Theme,
) {
    let popup = centered_rect(60, 70, area);
    f.render_widget(Clear, popup);
    let mut lines: Vec<Line> = rows
        .into_iter()
        .map(|(k, v)| {
            Line::from(vec![
                Span::styled(format!("{}: ", k), theme.text().add_modifier(Modifier::BOLD)),
                Span::raw(v),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Esc/Enter 关闭", theme.hint())));
    let p = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .style(theme.border(true)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(p, popup);
}

/// 通用增删改查页：表格加上当前打开的弹窗
pub fn render_crud<D>(f: &mut Frame, area: Rect, page: &CrudPage<D>, focused: bool, theme: &Theme)
where
    D: Draft,
    D::Record: TableRow + Identified,
{
    let title = if focused {
        format!("{} (a 新增 e 编辑 d 删除 v 详情 r 刷新)", page.title)
    } else {
        page.title.to_string()
    };
    render_table(f, area, title, &page.list, focused, theme);

    if let Some(form) = &page.form {
        render_form(f, area, page.noun, form, theme);
    } else if let Some(pending) = &page.list.pending_delete {
        render_confirm(
            f,
            area,
            &format!("确定要删除“{}”吗？", pending.name),
            theme,
        );
    } else if page.viewing {
        if let Some(record) = page.list.records.get(page.list.selected) {
            render_details(
                f,
                area,
                &format!("{}详情", page.noun),
                record.details(),
                theme,
            );
        }
    }
}
