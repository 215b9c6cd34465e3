use async_trait::async_trait;
use crossterm::event::KeyCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use zhitou::app_service::Executor;
use zhitou::app_state::{App, FocusArea, HealthStatus};
use zhitou::commands::AppCommand;
use zhitou::config::AppConfig;
use zhitou::pages::PageId;
use zhitou::session::{ApiError, ApiRequest, Backend, RequestBody};

/// 按 "METHOD path?query" 应答并记录每次调用
#[derive(Default)]
struct Scripted {
    replies: Mutex<HashMap<String, Result<Value, ApiError>>>,
    calls: Mutex<Vec<ApiRequest>>,
    token: Mutex<Option<String>>,
}

impl Scripted {
    fn reply(&self, key: &str, value: Value) {
        self.replies.lock().unwrap().insert(key.to_string(), Ok(value));
    }

    fn fail(&self, key: &str, status: u16, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(key.to_string(), Err(ApiError::status(status, body)));
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|r| r.to_string()).collect()
    }

    fn last_call(&self) -> ApiRequest {
        self.calls.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Backend for Scripted {
    async fn execute(&self, req: &ApiRequest) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push(req.clone());
        self.replies
            .lock()
            .unwrap()
            .get(&req.to_string())
            .cloned()
            .unwrap_or_else(|| Err(ApiError::status(404, r#"{"detail":"Not Found"}"#)))
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.lock().unwrap() = token;
    }
}

struct Harness {
    app: App,
    backend: Arc<Scripted>,
    executor: Executor,
    cmd_rx: mpsc::UnboundedReceiver<AppCommand>,
}

impl Harness {
    fn new(authenticated: bool) -> Self {
        let backend = Arc::new(Scripted::default());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (evt_tx, evt_rx) = mpsc::unbounded_channel();
        let executor = Executor::new(backend.clone(), None, evt_tx);
        let app = App::new(
            AppConfig::default().features,
            authenticated,
            Vec::new(),
            cmd_tx,
            evt_rx,
        );
        Self {
            app,
            backend,
            executor,
            cmd_rx,
        }
    }

    /// 执行 App 发出的全部命令，直到没有新的命令
    async fn pump(&mut self) {
        while let Ok(cmd) = self.cmd_rx.try_recv() {
            match cmd {
                AppCommand::Request { ticket, request } => {
                    let event = self.executor.run(ticket, request).await;
                    self.app.apply_event(event);
                }
                AppCommand::Batch(batch) => {
                    for event in self.executor.run_all(batch).await {
                        self.app.apply_event(event);
                    }
                }
                AppCommand::StoreToken(token) => self.executor.set_token(token),
                _ => {}
            }
        }
    }

    async fn press(&mut self, key: KeyCode) {
        self.app.handle_key_event(key);
        self.pump().await;
    }

    async fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c)).await;
        }
    }
}

#[tokio::test]
async fn assets_list_and_confirmed_delete() {
    let mut h = Harness::new(true);
    h.backend.reply("GET /health", json!({"status": "ok"}));
    h.backend.reply(
        "GET /assets/",
        json!([{"id": 1, "code": "AAPL", "name": "Apple", "asset_type": "STOCK"}]),
    );
    h.backend.reply("DELETE /assets/1", Value::Null);

    h.app.start();
    h.pump().await;
    assert_eq!(h.app.health, HealthStatus::Up("ok".to_string()));
    assert_eq!(h.app.current, PageId::Assets);
    assert_eq!(h.app.assets.list.records.len(), 1);
    assert_eq!(h.app.assets.list.records[0].code, "AAPL");

    h.press(KeyCode::Right).await;
    assert_eq!(h.app.focus_area, FocusArea::MainView);

    // 取消删除不发请求
    h.press(KeyCode::Char('d')).await;
    h.press(KeyCode::Char('n')).await;
    assert_eq!(h.backend.calls(), vec!["GET /health", "GET /assets/"]);

    h.press(KeyCode::Char('d')).await;
    h.press(KeyCode::Char('y')).await;
    assert_eq!(
        h.backend.calls(),
        vec!["GET /health", "GET /assets/", "DELETE /assets/1", "GET /assets/"]
    );
}

#[tokio::test]
async fn failed_create_keeps_form_open_without_refetch() {
    let mut h = Harness::new(true);
    h.backend.reply("GET /assets/", json!([]));
    h.backend
        .fail("POST /assets/", 400, r#"{"detail":"资产代码已存在"}"#);

    h.app.open_page(PageId::Assets);
    h.app.focus_area = FocusArea::MainView;
    h.pump().await;

    h.press(KeyCode::Char('a')).await;
    // 必填项为空：本地报错，不发请求
    h.press(KeyCode::Enter).await;
    let form = h.app.assets.form.as_ref().unwrap();
    assert!(form.error.as_deref().unwrap().contains("资产代码"));
    assert_eq!(h.backend.calls(), vec!["GET /assets/"]);

    h.type_text("AAPL").await;
    h.press(KeyCode::Tab).await;
    h.type_text("Apple").await;
    h.press(KeyCode::Tab).await;
    h.type_text("STOCK").await;
    h.press(KeyCode::Enter).await;

    assert_eq!(h.backend.calls(), vec!["GET /assets/", "POST /assets/"]);
    let form = h.app.assets.form.as_ref().unwrap();
    assert_eq!(form.error.as_deref(), Some("资产代码已存在"));
    assert!(!form.submitting);
}

#[tokio::test]
async fn late_save_error_lands_on_the_form_that_sent_it() {
    let mut h = Harness::new(true);
    h.backend.reply("GET /assets/", json!([]));
    h.backend
        .fail("POST /assets/", 400, r#"{"detail":"资产代码已存在"}"#);

    h.app.open_page(PageId::Assets);
    h.app.focus_area = FocusArea::MainView;
    h.pump().await;

    h.press(KeyCode::Char('a')).await;
    h.type_text("AAPL").await;
    h.press(KeyCode::Tab).await;
    h.type_text("Apple").await;
    h.press(KeyCode::Tab).await;
    h.type_text("STOCK").await;

    // 请求发出后先不执行，期间的按键不能换掉弹窗
    h.app.handle_key_event(KeyCode::Enter);
    for key in [KeyCode::Esc, KeyCode::Char('a'), KeyCode::Char('M')] {
        h.app.handle_key_event(key);
    }
    h.pump().await;

    let form = h.app.assets.form.as_ref().unwrap();
    assert_eq!(form.error.as_deref(), Some("资产代码已存在"));
    assert_eq!(form.draft.code, "AAPL");
    assert!(!form.submitting);
    assert_eq!(h.backend.calls(), vec!["GET /assets/", "POST /assets/"]);
}

#[tokio::test]
async fn strategy_detail_shows_empty_signals_and_retries_failed_backtest() {
    let mut h = Harness::new(true);
    h.backend.reply(
        "GET /strategy/",
        json!([{"id": 7, "name": "动量轮动", "strategy_type": "MOMENTUM",
                "asset_class": "STOCK", "parameters": {"window": 20}}]),
    );
    h.backend.reply("GET /strategy/signals?strategy_id=7", json!([]));
    h.backend.reply(
        "GET /strategy/backtest?strategy_id=7",
        json!([{"id": 3, "strategy_id": 7,
                "start_date": "2023-01-01T00:00:00", "end_date": "2023-12-31T00:00:00",
                "initial_capital": 100000.0, "status": "failed"}]),
    );
    h.backend.reply("POST /strategy/backtest", json!({"id": 4}));

    h.app.open_page(PageId::Strategies);
    h.app.focus_area = FocusArea::MainView;
    h.pump().await;
    assert_eq!(h.app.strategy.crud.list.records.len(), 1);

    h.press(KeyCode::Char('v')).await;
    let detail = h.app.strategy.detail.as_ref().unwrap();
    assert!(detail.signals.records.is_empty());
    assert!(!detail.is_loading());
    assert_eq!(detail.error(), None);
    assert_eq!(detail.backtests.records.len(), 1);
    assert!(detail.backtests.records[0].is_failed());

    h.press(KeyCode::Tab).await;
    h.press(KeyCode::Char('t')).await;
    let retry = h
        .backend
        .calls
        .lock()
        .unwrap()
        .iter()
        .find(|r| r.to_string() == "POST /strategy/backtest")
        .cloned()
        .unwrap();
    assert_eq!(
        retry.json_body().unwrap(),
        &json!({"strategy_id": 7, "start_date": "2023-01-01",
                "end_date": "2023-12-31", "initial_capital": 100000.0})
    );
    // 重试成功后只刷新回测列表
    assert_eq!(
        h.backend.last_call().to_string(),
        "GET /strategy/backtest?strategy_id=7"
    );

    h.press(KeyCode::Esc).await;
    assert!(h.app.strategy.detail.is_none());
}

#[tokio::test]
async fn strategy_detail_failure_shows_single_error() {
    let mut h = Harness::new(true);
    h.backend.reply(
        "GET /strategy/",
        json!([{"id": 7, "name": "动量轮动", "strategy_type": "MOMENTUM", "asset_class": "STOCK"}]),
    );
    h.backend.reply("GET /strategy/signals?strategy_id=7", json!([]));

    h.app.open_page(PageId::Strategies);
    h.app.focus_area = FocusArea::MainView;
    h.pump().await;
    h.press(KeyCode::Char('v')).await;

    let detail = h.app.strategy.detail.as_ref().unwrap();
    assert_eq!(detail.error(), Some("加载详情失败"));
}

#[tokio::test]
async fn login_stores_token_and_loads_first_page() {
    let mut h = Harness::new(false);
    h.backend
        .reply("POST /auth/token", json!({"access_token": "abc", "token_type": "bearer"}));
    h.backend.reply("GET /assets/", json!([]));

    // 空表单不发请求
    h.press(KeyCode::Enter).await;
    assert_eq!(h.app.login.error.as_deref(), Some("请输入用户名和密码"));
    assert!(h.backend.calls().is_empty());

    h.type_text("admin").await;
    h.press(KeyCode::Tab).await;
    h.type_text("secret").await;
    h.press(KeyCode::Enter).await;

    let login = h.backend.calls.lock().unwrap()[0].clone();
    assert!(!login.authenticated);
    assert_eq!(
        login.body,
        RequestBody::Form(vec![
            ("username".to_string(), "admin".to_string()),
            ("password".to_string(), "secret".to_string()),
        ])
    );

    assert!(h.app.authenticated);
    assert_eq!(h.backend.token.lock().unwrap().as_deref(), Some("abc"));
    assert_eq!(h.app.current, PageId::Assets);
    assert_eq!(h.backend.last_call().to_string(), "GET /assets/");
}

#[tokio::test]
async fn login_failure_shows_server_detail() {
    let mut h = Harness::new(false);
    h.backend
        .fail("POST /auth/token", 401, r#"{"detail":"用户名或密码错误"}"#);

    h.type_text("admin").await;
    h.press(KeyCode::Tab).await;
    h.type_text("wrong").await;
    h.press(KeyCode::Enter).await;

    assert!(!h.app.authenticated);
    assert_eq!(h.app.login.error.as_deref(), Some("用户名或密码错误"));
    assert_eq!(h.backend.token.lock().unwrap().as_deref(), None);
}
