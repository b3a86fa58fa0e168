use crossterm::style::{Attribute, Attributes, Color, ContentStyle};

// ── Helpers ─────────────────────────────────────────────────────────────

const fn rgb(hex: u32) -> Color {
    Color::Rgb {
        r: ((hex >> 16) & 0xFF) as u8,
        g: ((hex >>  8) & 0xFF) as u8,
        b: ( hex        & 0xFF) as u8,
    }
}

fn fg(color: Color) -> ContentStyle {
    ContentStyle { foreground_color: Some(color), ..ContentStyle::new() }
}

fn bold(color: Color) -> ContentStyle {
    ContentStyle {
        foreground_color: Some(color),
        attributes: Attributes::from(Attribute::Bold),
        ..ContentStyle::new()
    }
}

// ── Theme variant selector ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeVariant {
    Default,
    Dracula,
    Gruvbox,
    Nord,
}

impl ThemeVariant {
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "dracula" => Self::Dracula,
            "gruvbox" => Self::Gruvbox,
            "nord"    => Self::Nord,
            _         => Self::Default,
        }
    }
}

// ── Theme struct ────────────────────────────────────────────────────────

/// Styles for the text report.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Section headings.
    pub header:   ContentStyle,
    /// Lead-in sentence of a non-empty section.
    pub title:    ContentStyle,
    pub text_dim: ContentStyle,
    /// Things that may keep the machine awake.
    pub warn:     ContentStyle,
    pub ok:       ContentStyle,
    pub crit:     ContentStyle,
}

impl Theme {
    pub fn for_variant(v: ThemeVariant) -> Self {
        match v {
            ThemeVariant::Default => Self::default(),
            ThemeVariant::Dracula => Self::dracula(),
            ThemeVariant::Gruvbox => Self::gruvbox(),
            ThemeVariant::Nord    => Self::nord(),
        }
    }

    pub fn default() -> Self {
        Self {
            header:   bold(Color::Blue),
            title:    bold(Color::White),
            text_dim: fg(Color::DarkGrey),
            warn:     fg(Color::Yellow),
            ok:       fg(Color::Green),
            crit:     bold(Color::Red),
        }
    }

    fn dracula() -> Self {
        // purple: #bd93f9  fg: #f8f8f2  comment: #6272a4
        // yellow: #f1fa8c  green: #50fa7b  red: #ff5555
        Self {
            header:   bold(rgb(0xbd93f9)),
            title:    bold(rgb(0xf8f8f2)),
            text_dim: fg(rgb(0x6272a4)),
            warn:     fg(rgb(0xf1fa8c)),
            ok:       fg(rgb(0x50fa7b)),
            crit:     bold(rgb(0xff5555)),
        }
    }

    fn gruvbox() -> Self {
        // aqua: #83a598  fg1: #ebdbb2  fg4: #a89984
        // yellow: #fabd2f  green: #b8bb26  red: #fb4934
        Self {
            header:   bold(rgb(0x83a598)),
            title:    bold(rgb(0xebdbb2)),
            text_dim: fg(rgb(0xa89984)),
            warn:     fg(rgb(0xfabd2f)),
            ok:       fg(rgb(0xb8bb26)),
            crit:     bold(rgb(0xfb4934)),
        }
    }

    fn nord() -> Self {
        // frost: #88c0d0  snow: #eceff4  polar: #4c566a
        // aurora yellow: #ebcb8b  green: #a3be8c  red: #bf616a
        Self {
            header:   bold(rgb(0x88c0d0)),
            title:    bold(rgb(0xeceff4)),
            text_dim: fg(rgb(0x4c566a)),
            warn:     fg(rgb(0xebcb8b)),
            ok:       fg(rgb(0xa3be8c)),
            crit:     bold(rgb(0xbf616a)),
        }
    }
}

/// Applies theme styles, or passes text through untouched when color is off.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    theme: Option<Theme>,
}

impl Painter {
    pub fn colored(theme: Theme) -> Self {
        Self { theme: Some(theme) }
    }

    pub fn plain() -> Self {
        Self { theme: None }
    }

    pub fn paint(&self, pick: fn(&Theme) -> ContentStyle, text: &str) -> String {
        match &self.theme {
            Some(t) => pick(t).apply(text).to_string(),
            None    => text.to_string(),
        }
    }
}
