use crate::commands::{AppCommand, ConsoleCommand, COMMANDS, PAGE_NAMES};
use crate::config::FeatureFlags;
use crate::pages::{
    assets_page, feature_store_page, market_data_page, portfolios_page, AssetsPage,
    FeatureStorePage, LoginPage, MarketDataPage, Op, Outgoing, Page, PageId, PortfoliosPage,
    RiskAssessmentPage, StrategyPage, TagsPage, Ticket,
};
use crate::session::{ApiError, ApiRequest, PATH_HEALTH};
use crossterm::event::KeyCode;
use log::info;
use serde_json::Value;
use std::str::FromStr;
use tokio::sync::mpsc;

#[derive(PartialEq, Debug, Clone)]
pub enum InputMode {
    Normal,
    Command,
}

#[derive(PartialEq, Debug, Clone)]
pub enum FocusArea {
    Menu,     // 焦点在左侧菜单
    MainView, // 焦点在主视图
}

/// 标题栏里的后端状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Checking,
    Up(String),
    Unreachable,
}

impl HealthStatus {
    pub fn label(&self) -> String {
        match self {
            HealthStatus::Checking => "检查中...".to_string(),
            HealthStatus::Up(s) => format!("后端状态: {}", s),
            HealthStatus::Unreachable => "无法连接后端服务".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum AppEvent {
    Log(String),
    Message(String),
    Error(String),
    Response {
        ticket: Ticket,
        result: Result<Value, ApiError>,
    },
}

/// 菜单末尾的"退出账户"
pub const MENU_LOGOUT: &str = "退出账户";

pub struct App {
    pub features: FeatureFlags,
    /// 当前显示的页面，未登录时为 Login
    pub current: PageId,
    pub authenticated: bool,
    pub health: HealthStatus,
    pub input_mode: InputMode,
    pub focus_area: FocusArea,
    pub menu_selected_index: usize,
    pub login: LoginPage,
    pub assets: AssetsPage,
    pub tags: TagsPage,
    pub portfolios: PortfoliosPage,
    pub strategy: StrategyPage,
    pub risk: RiskAssessmentPage,
    pub market_data: MarketDataPage,
    pub features_page: FeatureStorePage,
    pub command_input: String,
    pub command_cursor: usize,
    pub command_history: Vec<String>,
    pub command_history_index: Option<usize>,
    pub log_messages: Vec<String>,
    pub cmd_tx: mpsc::UnboundedSender<AppCommand>,
    pub evt_rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
}

impl App {
    pub fn new(
        features: FeatureFlags,
        authenticated: bool,
        session_info: Vec<String>,
        cmd_tx: mpsc::UnboundedSender<AppCommand>,
        evt_rx: mpsc::UnboundedReceiver<AppEvent>,
    ) -> App {
        let mut log_messages = vec!["应用已启动".to_string()];
        log_messages.extend(session_info);

        App {
            features,
            current: if authenticated {
                PageId::MENU[0]
            } else {
                PageId::Login
            },
            authenticated,
            health: HealthStatus::Checking,
            input_mode: InputMode::Normal,
            focus_area: if authenticated {
                FocusArea::Menu
            } else {
                FocusArea::MainView
            },
            menu_selected_index: 0,
            login: LoginPage::default(),
            assets: assets_page(),
            tags: TagsPage::default(),
            portfolios: portfolios_page(),
            strategy: StrategyPage::new(),
            risk: RiskAssessmentPage::default(),
            market_data: market_data_page(),
            features_page: feature_store_page(),
            command_input: String::new(),
            command_cursor: 0,
            command_history: Vec::new(),
            command_history_index: None,
            log_messages,
            cmd_tx,
            evt_rx: Some(evt_rx),
        }
    }

    /// 启动时：健康检查，已登录则加载首页
    pub fn start(&mut self) {
        self.check_health();
        if self.authenticated {
            self.open_page(self.current);
        }
    }

    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
    }

    /// 菜单条目数（页面 + 退出账户）
    pub fn menu_len() -> usize {
        PageId::MENU.len() + 1
    }

    pub fn page_mut(&mut self, id: PageId) -> Option<&mut dyn Page> {
        let page: &mut dyn Page = match id {
            PageId::Login => &mut self.login,
            PageId::Assets => &mut self.assets,
            PageId::Tags => &mut self.tags,
            PageId::Portfolios => &mut self.portfolios,
            PageId::Strategies => &mut self.strategy,
            PageId::Risk => &mut self.risk,
            PageId::MarketData => &mut self.market_data,
            PageId::Features => &mut self.features_page,
            PageId::Health => return None,
        };
        Some(page)
    }

    /// 把页面产出的请求交给后台
    fn send(&mut self, page: PageId, out: Outgoing) {
        let mut batch: Vec<(Ticket, ApiRequest)> = out
            .into_iter()
            .map(|(op, req)| (Ticket::new(page, op), req))
            .collect();
        let cmd = match batch.len() {
            0 => return,
            1 => {
                let (ticket, request) = batch.remove(0);
                AppCommand::Request { ticket, request }
            }
            _ => AppCommand::Batch(batch),
        };
        let _ = self.cmd_tx.send(cmd);
    }

    pub fn check_health(&mut self) {
        self.health = HealthStatus::Checking;
        self.send(
            PageId::Health,
            vec![(Op::Health, ApiRequest::get(PATH_HEALTH).anonymous())],
        );
    }

    /// 切换到某页并发出该页的初始读取
    pub fn open_page(&mut self, id: PageId) {
        if !self.authenticated && id != PageId::Login {
            self.add_log("⚠ 请先登录".to_string());
            return;
        }
        self.current = id;
        if let Some(idx) = PageId::MENU.iter().position(|p| *p == id) {
            self.menu_selected_index = idx;
        }
        if self.features.enable_analytics {
            info!("page_view {}", id.title());
        }
        let out = match self.page_mut(id) {
            Some(page) => page.activate(),
            None => Vec::new(),
        };
        self.send(id, out);
    }

    pub fn logout(&mut self) {
        self.authenticated = false;
        self.login.reset();
        self.current = PageId::Login;
        self.focus_area = FocusArea::MainView;
        let _ = self.cmd_tx.send(AppCommand::StoreToken(None));
        self.add_log("✓ 已退出账户".to_string());
    }

    fn on_login_success(&mut self, token: String) {
        self.authenticated = true;
        let _ = self.cmd_tx.send(AppCommand::StoreToken(Some(token)));
        self.add_log("✓ 登录成功".to_string());
        self.focus_area = FocusArea::Menu;
        self.open_page(PageId::MENU[self.menu_selected_index.min(PageId::MENU.len() - 1)]);
    }

    /// 处理后台事件
    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Log(msg) | AppEvent::Message(msg) | AppEvent::Error(msg) => {
                self.add_log(msg)
            }
            AppEvent::Response { ticket, result } => self.apply_response(ticket, result),
        }
    }

    fn apply_response(&mut self, ticket: Ticket, result: Result<Value, ApiError>) {
        if let Err(e) = &result {
            self.add_log(format!("✗ {} {:?}: {}", ticket.page.title(), ticket.op, e));
        }
        match ticket.page {
            PageId::Health => {
                self.health = match result {
                    Ok(v) => HealthStatus::Up(
                        v.get("status")
                            .and_then(|s| s.as_str())
                            .unwrap_or("unknown")
                            .to_string(),
                    ),
                    Err(_) => HealthStatus::Unreachable,
                };
            }
            PageId::Login => {
                self.login.on_response(ticket.op, result);
                if let Some(token) = self.login.take_token() {
                    self.on_login_success(token);
                }
            }
            page => {
                let out = match self.page_mut(page) {
                    Some(p) => p.on_response(ticket.op, result),
                    None => Vec::new(),
                };
                self.send(page, out);
            }
        }
    }

    /// 获取当前的预测建议
    pub fn get_completion_hint(&self) -> Option<String> {
        let input = self.command_input.trim_start();
        if input.is_empty() {
            return None;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.len() == 1 && !input.ends_with(' ') {
            for cmd in COMMANDS {
                if cmd.starts_with(parts[0]) && cmd != parts[0] {
                    return Some(cmd[parts[0].len()..].to_string());
                }
            }
            return None;
        }
        if parts[0] == "goto" {
            let cur = parts.get(1).copied().unwrap_or("");
            for (name, _) in PAGE_NAMES {
                if name.starts_with(cur) && name != cur {
                    return Some(name[cur.len()..].to_string());
                }
            }
        }
        None
    }

    /// 执行命令行输入，返回 true 表示退出
    fn run_console(&mut self, line: &str) -> bool {
        let cmd = ConsoleCommand::from_str(line)
            .unwrap_or_else(|_| ConsoleCommand::Unknown(line.to_string()));
        match cmd {
            ConsoleCommand::Login { username, password } => {
                self.login = LoginPage::with_credentials(&username, &password);
                self.current = PageId::Login;
                if let Some(req) = self.login.submit() {
                    self.send(PageId::Login, vec![(Op::Login, req)]);
                }
            }
            ConsoleCommand::Logout => self.logout(),
            ConsoleCommand::Refresh => self.open_page(self.current),
            ConsoleCommand::Health => self.check_health(),
            ConsoleCommand::Goto(page) => {
                self.open_page(page);
                self.focus_area = FocusArea::MainView;
            }
            ConsoleCommand::Help => {
                let _ = self.cmd_tx.send(AppCommand::Help);
            }
            ConsoleCommand::Quit => {
                let _ = self.cmd_tx.send(AppCommand::Quit);
                return true;
            }
            ConsoleCommand::Unknown(msg) => {
                let _ = self.cmd_tx.send(AppCommand::Unknown(msg));
            }
        }
        false
    }

    fn leave_command_mode(&mut self) {
        self.command_input.clear();
        self.command_cursor = 0;
        self.input_mode = InputMode::Normal;
    }

    fn handle_command_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Enter => {
                let cmd_owned = self.command_input.trim().to_string();
                self.leave_command_mode();
                if cmd_owned.is_empty() {
                    return false;
                }
                self.command_history.push(cmd_owned.clone());
                self.command_history_index = None;
                return self.run_console(&cmd_owned);
            }
            KeyCode::Esc => self.leave_command_mode(),
            KeyCode::Tab => {
                if let Some(hint) = self.get_completion_hint() {
                    let insert = format!("{} ", hint);
                    self.insert_at_cursor(&insert);
                }
            }
            KeyCode::Up => {
                if self.command_history.is_empty() {
                    return false;
                }
                let next = match self.command_history_index {
                    None => self.command_history.len().saturating_sub(1),
                    Some(i) => i.saturating_sub(1),
                };
                self.recall_history(next);
            }
            KeyCode::Down => {
                let Some(i) = self.command_history_index else {
                    return false;
                };
                if i + 1 >= self.command_history.len() {
                    self.command_history_index = None;
                    self.command_input.clear();
                    self.command_cursor = 0;
                } else {
                    self.recall_history(i + 1);
                }
            }
            KeyCode::Backspace => {
                if self.command_cursor > 0 {
                    let idx = self.byte_index(self.command_cursor - 1);
                    self.command_input.remove(idx);
                    self.command_cursor -= 1;
                }
            }
            KeyCode::Delete => {
                if self.command_cursor < self.command_input.chars().count() {
                    let idx = self.byte_index(self.command_cursor);
                    self.command_input.remove(idx);
                }
            }
            KeyCode::Left => self.command_cursor = self.command_cursor.saturating_sub(1),
            KeyCode::Right => {
                if self.command_cursor < self.command_input.chars().count() {
                    self.command_cursor += 1;
                }
            }
            KeyCode::Home => self.command_cursor = 0,
            KeyCode::End => self.command_cursor = self.command_input.chars().count(),
            KeyCode::Char(c) => {
                let idx = self.byte_index(self.command_cursor);
                self.command_input.insert(idx, c);
                self.command_cursor += 1;
            }
            _ => {}
        }
        false
    }

    /// 光标按字符计数，中文输入时要换算成字节下标
    fn byte_index(&self, char_pos: usize) -> usize {
        self.command_input
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.command_input.len())
    }

    fn insert_at_cursor(&mut self, s: &str) {
        let idx = self.byte_index(self.command_cursor);
        self.command_input.insert_str(idx, s);
        self.command_cursor += s.chars().count();
    }

    fn recall_history(&mut self, idx: usize) {
        self.command_history_index = Some(idx);
        if let Some(cmd) = self.command_history.get(idx) {
            self.command_input = cmd.clone();
            self.command_cursor = self.command_input.chars().count();
        }
    }

    fn select_menu(&mut self) {
        match PageId::MENU.get(self.menu_selected_index) {
            Some(page) => {
                self.open_page(*page);
                // 确认后自动切换焦点到主视图
                self.focus_area = FocusArea::MainView;
            }
            None => self.logout(),
        }
    }

    pub fn handle_key_event(&mut self, key: KeyCode) -> bool {
        if self.input_mode == InputMode::Command {
            return self.handle_command_key(key);
        }

        // 未登录：除 Esc 外所有按键都交给登录表单
        if !self.authenticated {
            if key == KeyCode::Esc {
                return true;
            }
            let out = self.login.handle_key(key);
            self.send(PageId::Login, out);
            return false;
        }

        if self.focus_area == FocusArea::MainView {
            let current = self.current;
            let captured = self
                .page_mut(current)
                .map(|p| p.captures_input())
                .unwrap_or(false);
            if captured || !matches!(key, KeyCode::Char('/') | KeyCode::Char('q') | KeyCode::Left)
            {
                let out = match self.page_mut(current) {
                    Some(page) => page.handle_key(key),
                    None => Vec::new(),
                };
                self.send(current, out);
                return false;
            }
        }

        // 正常模式下的全局按键
        match key {
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Command;
                self.command_input.clear();
                self.command_cursor = 0;
                false
            }
            KeyCode::Char('q') => true, // 退出应用
            KeyCode::Left => {
                self.focus_area = FocusArea::Menu;
                false
            }
            KeyCode::Right => {
                self.focus_area = FocusArea::MainView;
                false
            }
            KeyCode::Up => {
                self.menu_selected_index = self.menu_selected_index.saturating_sub(1);
                false
            }
            KeyCode::Down => {
                if self.menu_selected_index + 1 < Self::menu_len() {
                    self.menu_selected_index += 1;
                }
                false
            }
            KeyCode::Enter => {
                self.select_menu();
                false
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use serde_json::json;

    fn app(authenticated: bool) -> (App, mpsc::UnboundedReceiver<AppCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (_evt_tx, evt_rx) = mpsc::unbounded_channel();
        let app = App::new(
            AppConfig::default().features,
            authenticated,
            Vec::new(),
            cmd_tx,
            evt_rx,
        );
        (app, cmd_rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<AppCommand>) -> Vec<AppCommand> {
        let mut out = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            out.push(cmd);
        }
        out
    }

    #[test]
    fn completion_hint() {
        let (mut app, _rx) = app(true);
        app.command_input = "lo".into();
        assert_eq!(app.get_completion_hint().as_deref(), Some("gin"));
        app.command_input = "goto str".into();
        assert_eq!(app.get_completion_hint().as_deref(), Some("ategy"));
    }

    #[test]
    fn menu_enter_opens_page() {
        let (mut app, mut rx) = app(true);
        app.handle_key_event(KeyCode::Down);
        app.handle_key_event(KeyCode::Enter);
        assert_eq!(app.current, PageId::Tags);
        assert_eq!(app.focus_area, FocusArea::MainView);
        match drain(&mut rx).as_slice() {
            [AppCommand::Request { ticket, request }] => {
                assert_eq!(*ticket, Ticket::new(PageId::Tags, Op::List));
                assert_eq!(request.path, "/tags/");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn login_success_stores_token_and_opens_first_page() {
        let (mut app, mut rx) = app(false);
        assert_eq!(app.current, PageId::Login);
        // 登录页里 q 是普通字符
        assert!(!app.handle_key_event(KeyCode::Char('q')));
        app.handle_key_event(KeyCode::Tab);
        app.handle_key_event(KeyCode::Char('x'));
        app.handle_key_event(KeyCode::Enter);
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [AppCommand::Request { ticket, .. }] if ticket.op == Op::Login
        ));

        app.apply_event(AppEvent::Response {
            ticket: Ticket::new(PageId::Login, Op::Login),
            result: Ok(json!({"access_token": "tok"})),
        });
        assert!(app.authenticated);
        assert_eq!(app.current, PageId::Assets);
        let cmds = drain(&mut rx);
        assert!(matches!(&cmds[0], AppCommand::StoreToken(Some(t)) if t == "tok"));
        assert!(matches!(&cmds[1], AppCommand::Request { request, .. } if request.path == "/assets/"));
    }

    #[test]
    fn logout_from_menu_clears_token() {
        let (mut app, mut rx) = app(true);
        for _ in 0..App::menu_len() {
            app.handle_key_event(KeyCode::Down);
        }
        app.handle_key_event(KeyCode::Enter);
        assert!(!app.authenticated);
        assert_eq!(app.current, PageId::Login);
        assert!(matches!(drain(&mut rx).as_slice(), [AppCommand::StoreToken(None)]));
    }

    #[test]
    fn health_failure_shows_unreachable() {
        let (mut app, _rx) = app(true);
        app.apply_event(AppEvent::Response {
            ticket: Ticket::new(PageId::Health, Op::Health),
            result: Err(ApiError::Network("refused".into())),
        });
        assert_eq!(app.health.label(), "无法连接后端服务");
        app.apply_event(AppEvent::Response {
            ticket: Ticket::new(PageId::Health, Op::Health),
            result: Ok(json!({"status": "ok"})),
        });
        assert_eq!(app.health, HealthStatus::Up("ok".into()));
    }

    #[test]
    fn command_mode_goto_and_quit() {
        let (mut app, mut rx) = app(true);
        app.handle_key_event(KeyCode::Char('/'));
        for c in "goto market".chars() {
            app.handle_key_event(KeyCode::Char(c));
        }
        assert!(!app.handle_key_event(KeyCode::Enter));
        assert_eq!(app.current, PageId::MarketData);
        assert_eq!(drain(&mut rx).len(), 1);

        app.handle_key_event(KeyCode::Char('/'));
        app.handle_key_event(KeyCode::Up);
        assert_eq!(app.command_input, "goto market");
        app.handle_key_event(KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
    }
}
