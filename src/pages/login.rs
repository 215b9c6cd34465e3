use super::{Op, Outgoing, Page};
use crate::session::{ApiError, ApiRequest, PATH_AUTH_TOKEN};
use crossterm::event::KeyCode;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

/// 登录表单；成功后 token 由 App 取走并持久化
#[derive(Debug, Default)]
pub struct LoginPage {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    pub submitting: bool,
    token: Option<String>,
}

impl LoginPage {
    pub fn with_credentials(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            ..Self::default()
        }
    }

    /// 密码以掩码显示
    pub fn masked_password(&self) -> String {
        "*".repeat(self.password.chars().count())
    }

    fn current(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn submit(&mut self) -> Option<ApiRequest> {
        if self.submitting {
            return None;
        }
        if self.username.trim().is_empty() || self.password.is_empty() {
            self.error = Some("请输入用户名和密码".to_string());
            return None;
        }
        self.submitting = true;
        self.error = None;
        Some(
            ApiRequest::post_form(
                PATH_AUTH_TOKEN,
                vec![
                    ("username".to_string(), self.username.trim().to_string()),
                    ("password".to_string(), self.password.clone()),
                ],
            )
            .anonymous(),
        )
    }

    /// 取走登录得到的 token
    pub fn take_token(&mut self) -> Option<String> {
        self.token.take()
    }

    pub fn reset(&mut self) {
        *self = Self {
            username: std::mem::take(&mut self.username),
            ..Self::default()
        };
    }
}

impl Page for LoginPage {
    fn activate(&mut self) -> Outgoing {
        Vec::new()
    }

    fn handle_key(&mut self, key: KeyCode) -> Outgoing {
        match key {
            KeyCode::Tab | KeyCode::Down | KeyCode::Up | KeyCode::BackTab => {
                self.focus = match self.focus {
                    LoginField::Username => LoginField::Password,
                    LoginField::Password => LoginField::Username,
                };
            }
            KeyCode::Backspace => {
                self.current().pop();
            }
            KeyCode::Char(c) => self.current().push(c),
            KeyCode::Enter => {
                if let Some(req) = self.submit() {
                    return vec![(Op::Login, req)];
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn on_response(&mut self, op: Op, result: Result<Value, ApiError>) -> Outgoing {
        if op != Op::Login {
            return Vec::new();
        }
        self.submitting = false;
        let token = result.and_then(|v| {
            v.get("access_token")
                .and_then(|t| t.as_str())
                .map(|t| t.to_string())
                .ok_or_else(|| ApiError::Decode("missing access_token".to_string()))
        });
        match token {
            Ok(t) => {
                self.password.clear();
                self.error = None;
                self.token = Some(t);
            }
            Err(e) => self.error = Some(e.user_message("登录失败")),
        }
        Vec::new()
    }

    /// 输入框始终占用键盘
    fn captures_input(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::RequestBody;
    use serde_json::json;

    #[test]
    fn typing_and_submit() {
        let mut page = LoginPage::default();
        for c in "admin".chars() {
            page.handle_key(KeyCode::Char(c));
        }
        page.handle_key(KeyCode::Tab);
        for c in "secret".chars() {
            page.handle_key(KeyCode::Char(c));
        }
        assert_eq!(page.masked_password(), "******");

        let out = page.handle_key(KeyCode::Enter);
        assert_eq!(out[0].0, Op::Login);
        let req = &out[0].1;
        assert!(!req.authenticated);
        assert_eq!(
            req.body,
            RequestBody::Form(vec![
                ("username".into(), "admin".into()),
                ("password".into(), "secret".into()),
            ])
        );

        page.on_response(Op::Login, Ok(json!({"access_token": "tok", "token_type": "bearer"})));
        assert_eq!(page.take_token().as_deref(), Some("tok"));
        assert_eq!(page.take_token(), None);
        assert!(page.password.is_empty());
    }

    #[test]
    fn empty_fields_rejected() {
        let mut page = LoginPage::default();
        assert!(page.handle_key(KeyCode::Enter).is_empty());
        assert_eq!(page.error.as_deref(), Some("请输入用户名和密码"));
    }

    #[test]
    fn failure_uses_detail_or_fallback() {
        let mut page = LoginPage::with_credentials("a", "b");
        page.submit();
        page.on_response(
            Op::Login,
            Err(ApiError::status(401, r#"{"detail":"用户名或密码错误"}"#)),
        );
        assert_eq!(page.error.as_deref(), Some("用户名或密码错误"));

        page.submit();
        page.on_response(Op::Login, Err(ApiError::Network("refused".into())));
        assert_eq!(page.error.as_deref(), Some("登录失败"));
    }
}
