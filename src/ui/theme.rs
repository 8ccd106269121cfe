use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for each kind of CLI line
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub label: Style,
}

impl Theme {
    /// Colored unless stdout is not a terminal or `NO_COLOR`/`CLICOLOR=0` is set
    pub fn detect() -> Self {
        Self::new(console::colors_enabled())
    }

    pub fn new(colored: bool) -> Self {
        let paint = |style: Style| if colored { style } else { Style::new() };
        Self {
            header: paint(Style::new().cyan().bold()),
            success: paint(Style::new().green().bold()),
            error: paint(Style::new().red().bold()),
            warn: paint(Style::new().yellow().bold()),
            label: paint(Style::new().bright_black()),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
