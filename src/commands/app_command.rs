use crate::pages::{PageId, Ticket};
use crate::session::ApiRequest;
use std::str::FromStr;

/// 发给后台 actor 的命令
#[derive(Debug, Clone)]
pub enum AppCommand {
    Request {
        ticket: Ticket,
        request: ApiRequest,
    },
    /// 同时发出的一组请求（如详情的两个子列表）
    Batch(Vec<(Ticket, ApiRequest)>),
    /// 登录成功写入 token，退出时为 `None`
    StoreToken(Option<String>),
    Help,
    Quit,
    Unknown(String),
}

/// 命令行里输入的命令，由 App 解释
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Login { username: String, password: String },
    Logout,
    Refresh,
    Health,
    Goto(PageId),
    Help,
    Quit,
    Unknown(String),
}

pub const COMMANDS: [&str; 7] = ["login", "logout", "refresh", "health", "goto", "help", "quit"];

/// `goto` 可用的页面名
pub const PAGE_NAMES: [(&str, PageId); 7] = [
    ("assets", PageId::Assets),
    ("tags", PageId::Tags),
    ("portfolios", PageId::Portfolios),
    ("strategy", PageId::Strategies),
    ("risk", PageId::Risk),
    ("market", PageId::MarketData),
    ("features", PageId::Features),
];

impl FromStr for ConsoleCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(ConsoleCommand::Unknown("".to_string()));
        }

        match parts[0] {
            "login" => {
                if parts.len() >= 3 {
                    Ok(ConsoleCommand::Login {
                        username: parts[1].to_string(),
                        password: parts[2..].join(" "),
                    })
                } else {
                    Ok(ConsoleCommand::Unknown(
                        "用法: login <username> <password>".to_string(),
                    ))
                }
            }
            "logout" => Ok(ConsoleCommand::Logout),
            "refresh" | "r" => Ok(ConsoleCommand::Refresh),
            "health" => Ok(ConsoleCommand::Health),
            "goto" | "go" => {
                let target = parts.get(1).copied().unwrap_or("");
                match PAGE_NAMES.iter().find(|(name, _)| *name == target) {
                    Some((_, page)) => Ok(ConsoleCommand::Goto(*page)),
                    None => Ok(ConsoleCommand::Unknown(format!(
                        "用法: goto <{}>",
                        PAGE_NAMES
                            .iter()
                            .map(|(n, _)| *n)
                            .collect::<Vec<_>>()
                            .join("|")
                    ))),
                }
            }
            "help" | "h" => Ok(ConsoleCommand::Help),
            "quit" | "q" | "exit" => Ok(ConsoleCommand::Quit),
            _ => Ok(ConsoleCommand::Unknown(format!("未知命令: {}", parts[0]))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_login_and_goto() {
        assert_eq!(
            "login admin p@ss".parse::<ConsoleCommand>(),
            Ok(ConsoleCommand::Login {
                username: "admin".into(),
                password: "p@ss".into()
            })
        );
        assert_eq!(
            "goto strategy".parse::<ConsoleCommand>(),
            Ok(ConsoleCommand::Goto(PageId::Strategies))
        );
        assert!(matches!(
            "login admin".parse::<ConsoleCommand>(),
            Ok(ConsoleCommand::Unknown(_))
        ));
        assert_eq!("q".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Quit));
    }

    #[test]
    fn unknown_command_is_reported() {
        assert_eq!(
            "fly".parse::<ConsoleCommand>(),
            Ok(ConsoleCommand::Unknown("未知命令: fly".into()))
        );
    }
}
