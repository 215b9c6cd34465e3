use super::draft::Draft;
use super::endpoint::{Endpoint, Messages};
use super::form::{FormAction, FormModal};
use super::list::ListState;
use crate::model::{Identified, TableRow};
use crate::pages::{Op, Outgoing, Page};
use crate::session::{ApiError, ApiRequest};
use crossterm::event::KeyCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 通用的"列表 + 新增/编辑弹窗 + 删除确认"页面
pub struct CrudPage<D: Draft> {
    pub title: &'static str,
    /// 记录名称，如"资产"，用于弹窗标题
    pub noun: &'static str,
    pub list: ListState<D::Record>,
    pub form: Option<FormModal<D>>,
    /// 只读详情是否打开
    pub viewing: bool,
    endpoint: Endpoint,
    messages: Messages,
}

impl<D> CrudPage<D>
where
    D: Draft,
    D::Record: DeserializeOwned + Identified,
{
    pub fn new(
        title: &'static str,
        noun: &'static str,
        endpoint: Endpoint,
        messages: Messages,
    ) -> Self {
        Self {
            title,
            noun,
            list: ListState::default(),
            form: None,
            viewing: false,
            endpoint,
            messages,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// 进入页面或刷新：重新读取整张表
    pub fn reload(&mut self) -> ApiRequest {
        self.list.begin_load();
        self.endpoint.list()
    }

    /// 在途的保存只属于当前弹窗
    fn form_busy(&self) -> bool {
        self.form.as_ref().is_some_and(|f| f.submitting)
    }

    pub fn open_create(&mut self) {
        if self.form_busy() {
            return;
        }
        self.viewing = false;
        self.form = Some(FormModal::create(D::default()));
    }

    pub fn open_edit(&mut self) {
        if self.form_busy() {
            return;
        }
        if let Some(record) = self.list.selected_record() {
            self.form = Some(FormModal::edit(record.id(), record));
            self.viewing = false;
        }
    }

    pub fn close_form(&mut self) {
        if self.form_busy() {
            return;
        }
        self.form = None;
    }

    pub fn submit_form(&mut self) -> Option<ApiRequest> {
        let endpoint = self.endpoint;
        self.form.as_mut()?.submit(&endpoint)
    }

    /// 保存结果：成功时关闭弹窗并返回唯一一次列表刷新
    pub fn on_save(&mut self, result: Result<Value, ApiError>) -> Option<ApiRequest> {
        match self.form.as_mut() {
            Some(form) => {
                let fallback = if form.is_edit() {
                    self.messages.update_failed
                } else {
                    self.messages.create_failed
                };
                if form.apply_result(&result, fallback) {
                    self.form = None;
                    Some(self.reload())
                } else {
                    None
                }
            }
            // 弹窗已被关掉，写入仍然成功时照样刷新
            None => result.is_ok().then(|| self.reload()),
        }
    }

    pub fn request_delete(&mut self) -> bool {
        self.list.request_delete()
    }

    pub fn confirm_delete(&mut self) -> Option<ApiRequest> {
        let endpoint = self.endpoint;
        self.list.confirm_delete(&endpoint)
    }

    pub fn cancel_delete(&mut self) {
        self.list.cancel_delete();
    }

    pub fn on_delete(&mut self, result: Result<Value, ApiError>) -> Option<ApiRequest> {
        if self.list.apply_delete(&result, self.messages.delete_failed) {
            Some(self.reload())
        } else {
            None
        }
    }

    pub fn on_list(&mut self, result: Result<Value, ApiError>) {
        self.list.apply_load(result, self.messages.load_failed);
    }

    fn handle_form_key(&mut self, key: KeyCode) -> Outgoing {
        let Some(form) = self.form.as_mut() else {
            return Vec::new();
        };
        match form.handle_key(key) {
            FormAction::Close => self.close_form(),
            FormAction::Submit => {
                if let Some(req) = self.submit_form() {
                    return vec![(Op::Save, req)];
                }
            }
            FormAction::None => {}
        }
        Vec::new()
    }
}

impl<D> Page for CrudPage<D>
where
    D: Draft,
    D::Record: DeserializeOwned + Identified + TableRow,
{
    fn activate(&mut self) -> Outgoing {
        vec![(Op::List, self.reload())]
    }

    fn handle_key(&mut self, key: KeyCode) -> Outgoing {
        if self.form.is_some() {
            return self.handle_form_key(key);
        }
        if self.list.pending_delete.is_some() {
            match key {
                KeyCode::Char('y') | KeyCode::Enter => {
                    if let Some(req) = self.confirm_delete() {
                        return vec![(Op::Delete, req)];
                    }
                }
                KeyCode::Char('n') | KeyCode::Esc => self.cancel_delete(),
                _ => {}
            }
            return Vec::new();
        }
        if self.viewing {
            if matches!(key, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('v')) {
                self.viewing = false;
            }
            return Vec::new();
        }
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_next(),
            KeyCode::Char('a') => self.open_create(),
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit(),
            KeyCode::Char('d') => {
                self.request_delete();
            }
            KeyCode::Char('v') => self.viewing = self.list.selected_record().is_some(),
            KeyCode::Char('r') => return self.activate(),
            _ => {}
        }
        Vec::new()
    }

    fn on_response(&mut self, op: Op, result: Result<Value, ApiError>) -> Outgoing {
        let follow = match op {
            Op::List => {
                self.on_list(result);
                None
            }
            Op::Save => self.on_save(result),
            Op::Delete => self.on_delete(result),
            _ => None,
        };
        follow.map(|req| vec![(Op::List, req)]).unwrap_or_default()
    }

    fn captures_input(&self) -> bool {
        self.form.is_some() || self.list.pending_delete.is_some() || self.viewing
    }
}
