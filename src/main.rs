use anyhow::Context;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;

use zhitou::app_service::{run_actor, Executor};
use zhitou::app_state::{App, AppEvent};
use zhitou::commands::AppCommand;
use zhitou::config::AppConfig;
use zhitou::session::{ApiSession, Backend};
use zhitou::storage::{self, FeatureCatalog, FeatureRepository, TokenRepository};
use zhitou::ui::draw;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // .env 里的 RUST_LOG 要在日志初始化前生效
    let dotenv_loaded = dotenv::dotenv();

    let ts = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let log_dir = std::path::PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join(format!("app-{}.log", ts));
    let log_file = std::fs::File::create(log_path)?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file))) // TUI 占用 stdout，日志写文件
        .filter_level(log::LevelFilter::Warn)
        .filter_module("zhitou", log::LevelFilter::Info)
        .filter_module("sqlx", log::LevelFilter::Error)
        .filter_module("sea_orm", log::LevelFilter::Error)
        .init();

    let mut session_info = Vec::new();
    match dotenv_loaded {
        Ok(path) => session_info.push(format!("✓ 已加载 .env: {}", path.display())),
        Err(_) => session_info.push("⚠ 未找到 .env 文件，使用系统环境变量".to_string()),
    }

    let config = AppConfig::from_env();
    log::info!("starting with {:?}", config);
    session_info.push(format!("后端地址: {}", config.api_base_url));

    // 初始化数据库
    let db = storage::establish_connection(&config.database_url)
        .await
        .with_context(|| format!("数据库连接失败: {}", config.database_url))?;
    let db = Arc::new(db);
    session_info.push("✓ 数据库连接成功".to_string());

    if config.features.enable_mock {
        match FeatureRepository::seed_if_empty(&db).await {
            Ok(0) => {}
            Ok(n) => session_info.push(format!("✓ 已写入 {} 条示例特征", n)),
            Err(e) => session_info.push(format!("✗ 写入示例特征失败: {}", e)),
        }
    }

    let token = match TokenRepository::load(&db).await {
        Ok(token) => token,
        Err(e) => {
            session_info.push(format!("⚠ 读取登录状态失败: {}", e));
            None
        }
    };
    let authenticated = token.is_some();
    if authenticated {
        session_info.push("✓ 已恢复登录状态".to_string());
    }

    let session = ApiSession::new(&config.api_base_url, config.http_timeout)
        .context("创建 HTTP 客户端失败")?;
    session.set_token(token);

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<AppCommand>();
    let (evt_tx, evt_rx) = mpsc::unbounded_channel::<AppEvent>();

    let catalog = FeatureCatalog::new(Arc::clone(&db), config.feature_failure_rate);
    let executor = Executor::new(
        Arc::new(session),
        Some(Arc::new(catalog)),
        evt_tx.clone(),
    );
    tokio::spawn(run_actor(cmd_rx, executor, Some(Arc::clone(&db)), evt_tx));

    let mut app = App::new(
        config.features.clone(),
        authenticated,
        session_info,
        cmd_tx,
        evt_rx,
    );
    app.start();

    // TUI 初始化
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = match app.evt_rx.take() {
        Some(rx) => run_app_loop(&mut terminal, &mut app, rx).await,
        None => Ok(()),
    };

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

async fn run_app_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut evt_rx: mpsc::UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        while let Ok(event) = evt_rx.try_recv() {
            app.apply_event(event);
        }

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key_event(key.code) {
                    return Ok(());
                }
            }
        }
    }
}
