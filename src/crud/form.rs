use super::draft::{Draft, FieldKind, FieldSpec};
use super::endpoint::Endpoint;
use crate::session::{ApiError, ApiRequest};
use crossterm::event::KeyCode;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

/// 弹窗按键的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Close,
    Submit,
}

/// 新增/编辑弹窗
#[derive(Debug, Clone)]
pub struct FormModal<D: Draft> {
    pub mode: FormMode,
    pub draft: D,
    pub selected_field: usize,
    pub error: Option<String>,
    /// 请求在途时为 true，此时拒绝再次提交
    pub submitting: bool,
}

impl<D: Draft> FormModal<D> {
    pub fn create(draft: D) -> Self {
        Self {
            mode: FormMode::Create,
            draft,
            selected_field: 0,
            error: None,
            submitting: false,
        }
    }

    pub fn edit(id: i64, record: &D::Record) -> Self {
        Self {
            mode: FormMode::Edit(id),
            ..Self::create(D::from_record(record))
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        D::fields()
    }

    fn current_spec(&self) -> Option<&'static FieldSpec> {
        D::fields().get(self.selected_field)
    }

    pub fn next_field(&mut self) {
        let n = D::fields().len();
        if n > 0 {
            self.selected_field = (self.selected_field + 1) % n;
        }
    }

    pub fn prev_field(&mut self) {
        let n = D::fields().len();
        if n > 0 {
            self.selected_field = (self.selected_field + n - 1) % n;
        }
    }

    pub fn input_char(&mut self, c: char) {
        let Some(spec) = self.current_spec() else {
            return;
        };
        match spec.kind {
            FieldKind::Text | FieldKind::Number | FieldKind::Json => {
                let mut v = self.draft.value(self.selected_field);
                v.push(c);
                self.draft.set_value(self.selected_field, v);
            }
            FieldKind::Toggle if c == ' ' => self.cycle(true),
            FieldKind::Choice(_) if c == ' ' => self.cycle(true),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        if let Some(spec) = self.current_spec() {
            if matches!(spec.kind, FieldKind::Text | FieldKind::Number | FieldKind::Json) {
                let mut v = self.draft.value(self.selected_field);
                v.pop();
                self.draft.set_value(self.selected_field, v);
            }
        }
    }

    /// 选项字段切换到下一个/上一个取值，开关字段取反
    pub fn cycle(&mut self, forward: bool) {
        let Some(spec) = self.current_spec() else {
            return;
        };
        let current = self.draft.value(self.selected_field);
        let next = match spec.kind {
            FieldKind::Choice(choices) => {
                let options = choices();
                if options.is_empty() {
                    return;
                }
                let n = options.len();
                let pos = options.iter().position(|(code, _)| *code == current);
                let idx = match (pos, forward) {
                    (None, _) => 0,
                    (Some(i), true) => (i + 1) % n,
                    (Some(i), false) => (i + n - 1) % n,
                };
                options[idx].0.to_string()
            }
            FieldKind::Toggle => (current != "true").to_string(),
            _ => return,
        };
        self.draft.set_value(self.selected_field, next);
    }

    /// 弹窗内的编辑按键；提交和关闭交给调用方
    pub fn handle_key(&mut self, key: KeyCode) -> FormAction {
        // 提交中不可关闭，响应回来前弹窗必须保持原样
        if self.submitting {
            return FormAction::None;
        }
        match key {
            KeyCode::Esc => return FormAction::Close,
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Tab | KeyCode::Down => self.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.prev_field(),
            KeyCode::Left => self.cycle(false),
            KeyCode::Right => self.cycle(true),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(c) => self.input_char(c),
            _ => {}
        }
        FormAction::None
    }

    /// 校验并生成请求；校验失败或已在提交中时返回 `None`
    pub fn submit(&mut self, endpoint: &Endpoint) -> Option<ApiRequest> {
        let body = self.prepare()?;
        Some(match self.mode {
            FormMode::Create => endpoint.create(body),
            FormMode::Edit(id) => endpoint.update(id, body),
        })
    }

    /// 只做校验和序列化，供路径特殊的表单自己拼请求
    pub fn prepare(&mut self) -> Option<Value> {
        if self.submitting {
            return None;
        }
        let checked = self.draft.validate().and_then(|_| self.draft.to_payload());
        match checked {
            Ok(body) => {
                self.error = None;
                self.submitting = true;
                Some(body)
            }
            Err(msg) => {
                self.error = Some(msg);
                None
            }
        }
    }

    /// 写入请求结果，成功返回 true（调用方负责关闭弹窗并刷新）
    pub fn apply_result(&mut self, result: &Result<Value, ApiError>, fallback: &str) -> bool {
        self.submitting = false;
        match result {
            Ok(_) => {
                self.error = None;
                true
            }
            Err(e) => {
                self.error = Some(e.user_message(fallback));
                false
            }
        }
    }
}
