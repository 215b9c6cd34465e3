use super::backtest::{retry_request, BacktestDraft};
use super::signal::SignalDraft;
use crate::crud::{FormAction, FormMode, FormModal};
use crate::model::{Backtest, Signal, Strategy};
use crate::pages::{Op, Outgoing};
use crate::session::{ApiError, ApiRequest, PATH_STRATEGY_BACKTEST, PATH_STRATEGY_SIGNALS};
use crossterm::event::KeyCode;
use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const DETAIL_LOAD_FAILED: &str = "加载详情失败";
pub const NO_SIGNALS: &str = "暂无信号";
pub const NO_BACKTESTS: &str = "暂无回测";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailFocus {
    Signals,
    Backtests,
}

/// 详情里再打开的一层弹窗
#[derive(Debug, Clone)]
pub enum DetailModal {
    Signal(FormModal<SignalDraft>),
    Backtest(FormModal<BacktestDraft>),
    ViewSignal(Signal),
    ViewBacktest(Backtest),
}

/// 子列表的加载状态
#[derive(Debug, Clone)]
pub struct ChildList<R> {
    pub records: Vec<R>,
    pub loading: bool,
    pub failed: bool,
    pub selected: usize,
}

impl<R> Default for ChildList<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            loading: false,
            failed: false,
            selected: 0,
        }
    }
}

impl<R> ChildList<R> {
    /// 列表区的占位文字；`None` 表示正常画表格。详情加载失败时两个列表都只显示错误
    pub fn placeholder<'a>(&self, empty: &'a str, failure: Option<&'a str>) -> Option<&'a str> {
        if failure.is_some() {
            return failure;
        }
        if !self.records.is_empty() {
            return None;
        }
        Some(if self.loading { "加载中..." } else { empty })
    }
}

impl<R: DeserializeOwned> ChildList<R> {
    fn apply(&mut self, result: Result<Value, ApiError>) {
        self.loading = false;
        let decoded = result.and_then(|v| {
            serde_json::from_value::<Vec<R>>(v).map_err(|e| ApiError::Decode(e.to_string()))
        });
        match decoded {
            Ok(records) => {
                self.records = records;
                self.failed = false;
                if self.selected >= self.records.len() {
                    self.selected = self.records.len().saturating_sub(1);
                }
            }
            Err(e) => {
                warn!("detail child load failed: {}", e);
                self.records.clear();
                self.selected = 0;
                self.failed = true;
            }
        }
    }
}

impl<R> ChildList<R> {
    fn move_by(&mut self, down: bool) {
        if down {
            if self.selected + 1 < self.records.len() {
                self.selected += 1;
            }
        } else {
            self.selected = self.selected.saturating_sub(1);
        }
    }

    pub fn selected_record(&self) -> Option<&R> {
        self.records.get(self.selected)
    }
}

/// 策略详情：信号与回测两个子列表，各自的新增/编辑弹窗
#[derive(Debug, Clone)]
pub struct StrategyDetail {
    pub strategy: Strategy,
    pub signals: ChildList<Signal>,
    pub backtests: ChildList<Backtest>,
    pub focus: DetailFocus,
    pub modal: Option<DetailModal>,
    /// 重试在途
    pub retrying: bool,
    /// 重试失败等一次性提示
    pub notice: Option<String>,
}

impl StrategyDetail {
    /// 打开详情，同时返回两个子列表的读取
    pub fn open(strategy: Strategy) -> (Self, Outgoing) {
        let mut detail = Self {
            strategy,
            signals: ChildList::default(),
            backtests: ChildList::default(),
            focus: DetailFocus::Signals,
            modal: None,
            retrying: false,
            notice: None,
        };
        let out = detail.reload_all();
        (detail, out)
    }

    pub fn strategy_id(&self) -> i64 {
        self.strategy.id
    }

    /// 任一子列表失败都只显示一条通用错误
    pub fn error(&self) -> Option<&'static str> {
        (self.signals.failed || self.backtests.failed).then_some(DETAIL_LOAD_FAILED)
    }

    pub fn is_loading(&self) -> bool {
        self.signals.loading || self.backtests.loading
    }

    pub fn reload_all(&mut self) -> Outgoing {
        vec![self.reload_signals(), self.reload_backtests()]
    }

    fn reload_signals(&mut self) -> (Op, ApiRequest) {
        self.signals.loading = true;
        let id = self.strategy_id();
        (
            Op::Signals(id),
            ApiRequest::get(PATH_STRATEGY_SIGNALS).with_query("strategy_id", id),
        )
    }

    fn reload_backtests(&mut self) -> (Op, ApiRequest) {
        self.backtests.loading = true;
        let id = self.strategy_id();
        (
            Op::Backtests(id),
            ApiRequest::get(PATH_STRATEGY_BACKTEST).with_query("strategy_id", id),
        )
    }

    pub fn open_add_signal(&mut self) {
        let draft = SignalDraft::for_strategy(self.strategy_id());
        self.modal = Some(DetailModal::Signal(FormModal::create(draft)));
    }

    pub fn open_edit_signal(&mut self) {
        if let Some(sig) = self.signals.selected_record() {
            self.modal = Some(DetailModal::Signal(FormModal::edit(sig.id, sig)));
        }
    }

    pub fn open_add_backtest(&mut self) {
        let draft = BacktestDraft::for_strategy(self.strategy_id());
        self.modal = Some(DetailModal::Backtest(FormModal::create(draft)));
    }

    fn open_view(&mut self) {
        self.modal = match self.focus {
            DetailFocus::Signals => self
                .signals
                .selected_record()
                .cloned()
                .map(DetailModal::ViewSignal),
            DetailFocus::Backtests => self
                .backtests
                .selected_record()
                .cloned()
                .map(DetailModal::ViewBacktest),
        };
    }

    /// 对选中的失败回测重新提交；非失败或重试在途时不发请求
    pub fn retry_selected(&mut self) -> Option<(Op, ApiRequest)> {
        if self.retrying {
            return None;
        }
        let bt = self.backtests.selected_record().filter(|bt| bt.is_failed())?;
        let req = retry_request(bt);
        self.retrying = true;
        self.notice = None;
        Some((Op::RetryBacktest(self.strategy_id()), req))
    }

    fn submit_modal(&mut self) -> Outgoing {
        let id = self.strategy_id();
        match self.modal.as_mut() {
            Some(DetailModal::Signal(form)) => {
                let signal_id = match form.mode {
                    FormMode::Edit(sid) => Some(sid),
                    FormMode::Create => None,
                };
                match form.prepare() {
                    Some(body) => vec![(Op::SaveSignal(id), form.draft.request(signal_id, body))],
                    None => Vec::new(),
                }
            }
            Some(DetailModal::Backtest(form)) => match form.prepare() {
                Some(body) => vec![(
                    Op::SaveBacktest(id),
                    ApiRequest::post_json(PATH_STRATEGY_BACKTEST, body),
                )],
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn handle_modal_key(&mut self, key: KeyCode) -> Outgoing {
        let action = match self.modal.as_mut() {
            Some(DetailModal::Signal(form)) => form.handle_key(key),
            Some(DetailModal::Backtest(form)) => form.handle_key(key),
            Some(DetailModal::ViewSignal(_)) | Some(DetailModal::ViewBacktest(_)) => {
                match key {
                    KeyCode::Esc | KeyCode::Enter => FormAction::Close,
                    _ => FormAction::None,
                }
            }
            None => FormAction::None,
        };
        match action {
            FormAction::Close => {
                self.modal = None;
                Vec::new()
            }
            FormAction::Submit => self.submit_modal(),
            FormAction::None => Vec::new(),
        }
    }

    /// 返回 `None` 表示详情应当关闭
    pub fn handle_key(&mut self, key: KeyCode) -> Option<Outgoing> {
        if self.modal.is_some() {
            return Some(self.handle_modal_key(key));
        }
        match key {
            KeyCode::Esc | KeyCode::Char('q') => return None,
            KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
                self.focus = match self.focus {
                    DetailFocus::Signals => DetailFocus::Backtests,
                    DetailFocus::Backtests => DetailFocus::Signals,
                };
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Down | KeyCode::Char('j') => {
                let down = matches!(key, KeyCode::Down | KeyCode::Char('j'));
                match self.focus {
                    DetailFocus::Signals => self.signals.move_by(down),
                    DetailFocus::Backtests => self.backtests.move_by(down),
                }
            }
            KeyCode::Char('s') => self.open_add_signal(),
            KeyCode::Char('e') if self.focus == DetailFocus::Signals => self.open_edit_signal(),
            KeyCode::Char('b') => self.open_add_backtest(),
            KeyCode::Enter => self.open_view(),
            KeyCode::Char('t') if self.focus == DetailFocus::Backtests => {
                return Some(self.retry_selected().into_iter().collect());
            }
            KeyCode::Char('r') => return Some(self.reload_all()),
            _ => {}
        }
        Some(Vec::new())
    }

    /// 处理子请求结果；不属于当前策略的响应直接丢弃
    pub fn on_response(&mut self, op: Op, result: Result<Value, ApiError>) -> Outgoing {
        let id = self.strategy_id();
        match op {
            Op::Signals(sid) if sid == id => self.signals.apply(result),
            Op::Backtests(sid) if sid == id => self.backtests.apply(result),
            Op::SaveSignal(sid) if sid == id => {
                if let Some(DetailModal::Signal(form)) = self.modal.as_mut() {
                    let fallback = if form.is_edit() {
                        "信号编辑失败"
                    } else {
                        "信号创建失败"
                    };
                    if !form.apply_result(&result, fallback) {
                        return Vec::new();
                    }
                    self.modal = None;
                }
                if result.is_ok() {
                    return vec![self.reload_signals()];
                }
            }
            Op::SaveBacktest(sid) if sid == id => {
                if let Some(DetailModal::Backtest(form)) = self.modal.as_mut() {
                    if !form.apply_result(&result, "回测创建失败") {
                        return Vec::new();
                    }
                    self.modal = None;
                }
                if result.is_ok() {
                    return vec![self.reload_backtests()];
                }
            }
            Op::RetryBacktest(sid) if sid == id => {
                self.retrying = false;
                match result {
                    Ok(_) => return vec![self.reload_backtests()],
                    Err(e) => self.notice = Some(e.user_message("重试回测失败")),
                }
            }
            _ => {}
        }
        Vec::new()
    }
}
