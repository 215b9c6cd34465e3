use super::{Op, Outgoing, Page};
use crate::crud::ListState;
use crate::model::Tag;
use crate::session::{ApiError, ApiRequest, PATH_TAGS};
use crossterm::event::KeyCode;
use serde_json::Value;

/// 标签只读列表
#[derive(Debug, Default)]
pub struct TagsPage {
    pub list: ListState<Tag>,
}

impl Page for TagsPage {
    fn activate(&mut self) -> Outgoing {
        self.list.begin_load();
        vec![(Op::List, ApiRequest::get(PATH_TAGS))]
    }

    fn handle_key(&mut self, key: KeyCode) -> Outgoing {
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_next(),
            KeyCode::Char('r') => return self.activate(),
            _ => {}
        }
        Vec::new()
    }

    fn on_response(&mut self, op: Op, result: Result<Value, ApiError>) -> Outgoing {
        if op == Op::List {
            self.list.apply_load(result, "获取标签失败");
        }
        Vec::new()
    }

    fn captures_input(&self) -> bool {
        false
    }
}
