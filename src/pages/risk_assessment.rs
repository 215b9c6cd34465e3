use super::{Op, Outgoing, Page};
use crate::model::RiskAssessment;
use crate::session::{ApiError, ApiRequest, PATH_RISK_LATEST, PATH_RISK_SUBMIT};
use crossterm::event::KeyCode;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub struct Question {
    pub id: u8,
    pub text: &'static str,
    pub options: [&'static str; 4],
}

pub const QUESTIONS: [Question; 5] = [
    Question {
        id: 1,
        text: "1. 您的年龄属于以下哪个区间？",
        options: ["18-30", "31-45", "46-60", "60以上"],
    },
    Question {
        id: 2,
        text: "2. 您的投资经验如何？",
        options: ["无经验", "1-3年", "3-5年", "5年以上"],
    },
    Question {
        id: 3,
        text: "3. 您能承受的最大投资亏损比例？",
        options: ["5%以内", "5%-10%", "10%-20%", "20%以上"],
    },
    Question {
        id: 4,
        text: "4. 您的投资目标更偏向于？",
        options: ["保本", "稳健增值", "平衡", "高风险高收益"],
    },
    Question {
        id: 5,
        text: "5. 遇到市场大幅波动时，您的反应更可能是？",
        options: ["立即止损", "部分减仓", "保持不动", "逢低加仓"],
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    Success,
    Failed(String),
}

impl SubmitStatus {
    pub fn message(&self) -> String {
        match self {
            SubmitStatus::Success => "提交成功！".to_string(),
            SubmitStatus::Failed(msg) => format!("提交失败: {}", msg),
        }
    }
}

/// 风险测评问卷
///
/// 五道单选题全部作答后才会提交；答案以 `{"题号": "选项"}` 发送。
#[derive(Debug, Default)]
pub struct RiskAssessmentPage {
    /// 题号 -> 所选选项下标
    pub answers: BTreeMap<u8, usize>,
    pub cursor: usize,
    pub submitting: bool,
    pub status: Option<SubmitStatus>,
    /// 未答完时的提示
    pub notice: Option<String>,
    pub latest: Option<RiskAssessment>,
}

impl RiskAssessmentPage {
    pub fn answer_of(&self, q: &Question) -> Option<&'static str> {
        self.answers
            .get(&q.id)
            .and_then(|&i| q.options.get(i))
            .copied()
    }

    pub fn choose(&mut self, option: usize) {
        if let Some(q) = QUESTIONS.get(self.cursor) {
            if option < q.options.len() {
                self.answers.insert(q.id, option);
                self.notice = None;
            }
        }
    }

    fn shift(&mut self, forward: bool) {
        let Some(q) = QUESTIONS.get(self.cursor) else {
            return;
        };
        let n = q.options.len();
        let next = match (self.answers.get(&q.id), forward) {
            (None, _) => 0,
            (Some(&i), true) => (i + 1) % n,
            (Some(&i), false) => (i + n - 1) % n,
        };
        self.choose(next);
    }

    pub fn payload(&self) -> Result<Value, String> {
        let mut obj = Map::new();
        for q in QUESTIONS.iter() {
            let answer = self
                .answer_of(q)
                .ok_or_else(|| format!("请回答第{}题", q.id))?;
            obj.insert(q.id.to_string(), Value::String(answer.to_string()));
        }
        Ok(Value::Object(obj))
    }

    pub fn submit(&mut self) -> Option<ApiRequest> {
        if self.submitting {
            return None;
        }
        match self.payload() {
            Ok(body) => {
                self.submitting = true;
                self.notice = None;
                self.status = None;
                Some(ApiRequest::post_json(PATH_RISK_SUBMIT, body))
            }
            Err(msg) => {
                self.notice = Some(msg);
                None
            }
        }
    }

    fn on_latest(&mut self, result: Result<Value, ApiError>) {
        self.latest = match result {
            Ok(v) => serde_json::from_value(v).ok(),
            // 404 表示还没有测评记录
            Err(_) => None,
        };
    }
}

impl Page for RiskAssessmentPage {
    fn activate(&mut self) -> Outgoing {
        vec![(Op::Latest, ApiRequest::get(PATH_RISK_LATEST))]
    }

    fn handle_key(&mut self, key: KeyCode) -> Outgoing {
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                if self.cursor + 1 < QUESTIONS.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::BackTab => self.shift(false),
            KeyCode::Right | KeyCode::Char(' ') => self.shift(true),
            KeyCode::Char(c @ '1'..='4') => self.choose(c as usize - '1' as usize),
            KeyCode::Enter => {
                if let Some(req) = self.submit() {
                    return vec![(Op::Submit, req)];
                }
            }
            KeyCode::Char('r') => return self.activate(),
            _ => {}
        }
        Vec::new()
    }

    fn on_response(&mut self, op: Op, result: Result<Value, ApiError>) -> Outgoing {
        match op {
            Op::Submit => {
                self.submitting = false;
                match result {
                    Ok(_) => {
                        self.status = Some(SubmitStatus::Success);
                        return self.activate();
                    }
                    Err(e) => self.status = Some(SubmitStatus::Failed(e.user_message("提交失败"))),
                }
            }
            Op::Latest => self.on_latest(result),
            _ => {}
        }
        Vec::new()
    }

    fn captures_input(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answer_all(page: &mut RiskAssessmentPage) {
        for i in 0..QUESTIONS.len() {
            page.cursor = i;
            page.handle_key(KeyCode::Char('1'));
        }
    }

    #[test]
    fn unanswered_question_blocks_submit() {
        let mut page = RiskAssessmentPage::default();
        page.handle_key(KeyCode::Char('2'));
        assert!(page.handle_key(KeyCode::Enter).is_empty());
        assert_eq!(page.notice.as_deref(), Some("请回答第2题"));
    }

    #[test]
    fn submit_posts_answer_map() {
        let mut page = RiskAssessmentPage::default();
        answer_all(&mut page);
        page.cursor = 3;
        page.handle_key(KeyCode::Right);
        let out = page.handle_key(KeyCode::Enter);
        assert_eq!(out[0].0, Op::Submit);
        assert_eq!(out[0].1.path, "/risk_assessment/submit");
        assert_eq!(
            out[0].1.json_body(),
            Some(&json!({"1": "18-30", "2": "无经验", "3": "5%以内",
                         "4": "稳健增值", "5": "立即止损"}))
        );

        let out = page.on_response(Op::Submit, Ok(json!({"detail": "提交成功"})));
        assert_eq!(page.status.as_ref().map(|s| s.message()).as_deref(), Some("提交成功！"));
        assert_eq!(out[0].0, Op::Latest);
    }

    #[test]
    fn failure_shows_detail() {
        let mut page = RiskAssessmentPage::default();
        answer_all(&mut page);
        page.handle_key(KeyCode::Enter);
        page.on_response(
            Op::Submit,
            Err(ApiError::status(401, r#"{"detail":"Not authenticated"}"#)),
        );
        assert_eq!(
            page.status.unwrap().message(),
            "提交失败: Not authenticated"
        );
    }

    #[test]
    fn missing_latest_is_empty() {
        let mut page = RiskAssessmentPage::default();
        page.on_response(
            Op::Latest,
            Err(ApiError::status(404, r#"{"detail":"未找到风险测评记录"}"#)),
        );
        assert!(page.latest.is_none());
        page.on_response(
            Op::Latest,
            Ok(json!({"answers": {"1": "31-45"}, "created_at": "2024-05-01T10:00:00"})),
        );
        assert_eq!(page.latest.unwrap().answers["1"], "31-45");
    }
}
