use crate::app_state::AppEvent;
use crate::commands::AppCommand;
use crate::pages::Ticket;
use crate::session::{is_local_path, ApiRequest, Backend};
use crate::storage::TokenRepository;
use futures::future::join_all;
use log::{info, warn};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const HELP_TEXT: &str = "可用命令: login <用户名> <密码> | logout | refresh | health | goto <assets|tags|portfolios|strategy|risk|market|features> | help | quit";

/// 请求执行器
///
/// `/features/` 下的请求交给本地目录，其余发往后端。每个请求一个任务，
/// 结果以 [`AppEvent::Response`] 发回 UI。
#[derive(Clone)]
pub struct Executor {
    remote: Arc<dyn Backend>,
    local: Option<Arc<dyn Backend>>,
    evt_tx: mpsc::UnboundedSender<AppEvent>,
}

impl Executor {
    pub fn new(
        remote: Arc<dyn Backend>,
        local: Option<Arc<dyn Backend>>,
        evt_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            remote,
            local,
            evt_tx,
        }
    }

    fn route(&self, req: &ApiRequest) -> &Arc<dyn Backend> {
        match &self.local {
            Some(local) if is_local_path(&req.path) => local,
            _ => &self.remote,
        }
    }

    /// 执行单个请求并包装成事件
    pub async fn run(&self, ticket: Ticket, request: ApiRequest) -> AppEvent {
        let result = self.route(&request).execute(&request).await;
        if let Err(e) = &result {
            warn!("request {} for {:?} failed: {}", request, ticket, e);
        }
        AppEvent::Response { ticket, result }
    }

    /// 后台执行，不等待结果
    pub fn dispatch(&self, ticket: Ticket, request: ApiRequest) {
        let this = self.clone();
        tokio::spawn(async move {
            let event = this.run(ticket, request).await;
            let _ = this.evt_tx.send(event);
        });
    }

    /// 并发执行一组请求，全部完成后按原顺序返回
    pub async fn run_all(&self, batch: Vec<(Ticket, ApiRequest)>) -> Vec<AppEvent> {
        join_all(
            batch
                .into_iter()
                .map(|(ticket, request)| self.run(ticket, request)),
        )
        .await
    }

    pub fn dispatch_all(&self, batch: Vec<(Ticket, ApiRequest)>) {
        let this = self.clone();
        tokio::spawn(async move {
            for event in this.run_all(batch).await {
                let _ = this.evt_tx.send(event);
            }
        });
    }

    pub fn set_token(&self, token: Option<String>) {
        self.remote.set_token(token);
    }
}

/// 后台 actor：逐条处理 UI 发来的命令
pub async fn run_actor(
    mut cmd_rx: mpsc::UnboundedReceiver<AppCommand>,
    executor: Executor,
    db: Option<Arc<DatabaseConnection>>,
    evt_tx: mpsc::UnboundedSender<AppEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            AppCommand::Request { ticket, request } => executor.dispatch(ticket, request),
            AppCommand::Batch(batch) => executor.dispatch_all(batch),
            AppCommand::StoreToken(token) => {
                executor.set_token(token.clone());
                if let Some(db) = db.as_ref() {
                    let saved = match token.as_deref() {
                        Some(t) => TokenRepository::save(db, t).await,
                        None => TokenRepository::clear(db).await,
                    };
                    if let Err(e) = saved {
                        let _ = evt_tx.send(AppEvent::Error(format!("✗ 保存登录状态失败: {}", e)));
                        continue;
                    }
                }
                info!("token {}", if token.is_some() { "stored" } else { "cleared" });
            }
            AppCommand::Help => {
                let _ = evt_tx.send(AppEvent::Message(HELP_TEXT.to_string()));
            }
            AppCommand::Quit => {
                let _ = evt_tx.send(AppEvent::Message("收到退出命令".to_string()));
            }
            AppCommand::Unknown(msg) => {
                let _ = evt_tx.send(AppEvent::Error(format!("✗ {}", msg)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::{Op, PageId};
    use crate::session::ApiError;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct Fixed(&'static str);

    #[async_trait]
    impl Backend for Fixed {
        async fn execute(&self, _req: &ApiRequest) -> Result<Value, ApiError> {
            Ok(json!(self.0))
        }
    }

    fn executor() -> (Executor, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let exec = Executor::new(Arc::new(Fixed("remote")), Some(Arc::new(Fixed("local"))), tx);
        (exec, rx)
    }

    #[tokio::test]
    async fn features_are_served_locally() {
        let (exec, _rx) = executor();
        let events = exec
            .run_all(vec![
                (Ticket::new(PageId::Features, Op::List), ApiRequest::get("/features/")),
                (Ticket::new(PageId::Assets, Op::List), ApiRequest::get("/assets/")),
            ])
            .await;
        let answers: Vec<Value> = events
            .into_iter()
            .map(|e| match e {
                AppEvent::Response { result, .. } => result.unwrap(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(answers, vec![json!("local"), json!("remote")]);
    }

    #[tokio::test]
    async fn actor_dispatches_requests() {
        let (exec, mut rx) = executor();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let evt_tx = exec.evt_tx.clone();
        tokio::spawn(run_actor(cmd_rx, exec, None, evt_tx));

        let ticket = Ticket::new(PageId::Tags, Op::List);
        cmd_tx
            .send(AppCommand::Request {
                ticket,
                request: ApiRequest::get("/tags/"),
            })
            .unwrap();
        match rx.recv().await {
            Some(AppEvent::Response { ticket: t, result }) => {
                assert_eq!(t, ticket);
                assert_eq!(result.unwrap(), json!("remote"));
            }
            other => panic!("unexpected {:?}", other),
        }

        cmd_tx.send(AppCommand::Help).unwrap();
        assert!(matches!(rx.recv().await, Some(AppEvent::Message(m)) if m == HELP_TEXT));
    }
}
