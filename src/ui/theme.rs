use crate::config::DarkMode;
use ratatui::style::{Color, Modifier, Style};

/// 配色：浅色主题用于亮底终端，深色/跟随系统用终端默认的暗底配色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub text: Color,
    pub accent: Color,
    pub muted: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
}

impl Theme {
    pub fn from_mode(mode: DarkMode) -> Self {
        match mode {
            DarkMode::Light => Theme {
                text: Color::Black,
                accent: Color::Blue,
                muted: Color::DarkGray,
                selected_bg: Color::Blue,
                selected_fg: Color::White,
            },
            DarkMode::Dark | DarkMode::System => Theme {
                text: Color::White,
                accent: Color::Cyan,
                muted: Color::Gray,
                selected_bg: Color::White,
                selected_fg: Color::Black,
            },
        }
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn hint(&self) -> Style {
        Style::default().fg(self.muted).add_modifier(Modifier::ITALIC)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.selected_fg)
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// 边框：有焦点时用强调色
    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            self.text()
        }
    }

    pub fn error(&self) -> Style {
        Style::default().fg(Color::Red)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn warn(&self) -> Style {
        Style::default().fg(Color::Yellow)
    }
}
