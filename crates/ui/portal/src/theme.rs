use std::env;

use contact_guard::ThemePreference;
use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    TrueColor,
    Ansi256,
    Ansi16,
}

impl ColorMode {
    pub fn detect() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Override via env if provided
        if let Some(v) = lookup("PORTAL_COLOR_MODE") {
            match v.to_ascii_lowercase().as_str() {
                "24bit" | "truecolor" | "rgb" => return ColorMode::TrueColor,
                "256" | "ansi256" => return ColorMode::Ansi256,
                "16" | "ansi16" | "ansi" => return ColorMode::Ansi16,
                _ => {}
            }
        }

        if let Some(v) = lookup("COLORTERM") {
            let l = v.to_ascii_lowercase();
            if l.contains("truecolor") || l.contains("24bit") {
                return ColorMode::TrueColor;
            }
        }
        if let Some(v) = lookup("TERM") {
            if v.to_ascii_lowercase().contains("256color") {
                return ColorMode::Ansi256;
            }
        }
        ColorMode::Ansi16
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UiGroup {
    Base,
    Border,
    Dimmed,
    Title,
    Accent,
    NavActive,
    InputFocused,
    Success,
    Error,
    Warn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub bg: Rgb,
    pub fg: Rgb,
    pub dim: Rgb,
    pub border: Rgb,
    pub accent: Rgb,
    pub success: Rgb,
    pub error: Rgb,
    pub warn: Rgb,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            bg: Rgb(18, 18, 22),
            fg: Rgb(235, 230, 220),
            dim: Rgb(120, 116, 110),
            border: Rgb(60, 58, 64),
            accent: Rgb(255, 140, 60),
            success: Rgb(158, 206, 106),
            error: Rgb(247, 118, 142),
            warn: Rgb(224, 175, 104),
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Rgb(250, 247, 242),
            fg: Rgb(26, 26, 26),
            dim: Rgb(110, 106, 100),
            border: Rgb(200, 194, 186),
            accent: Rgb(214, 96, 20),
            success: Rgb(46, 125, 50),
            error: Rgb(198, 40, 40),
            warn: Rgb(176, 110, 0),
        }
    }

    pub fn for_preference(pref: ThemePreference) -> Self {
        match pref {
            ThemePreference::Dark => Self::dark(),
            ThemePreference::Light => Self::light(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Theme {
    pub preference: ThemePreference,
    pub mode: ColorMode,
    pub palette: Palette,
}

impl Theme {
    pub fn new(preference: ThemePreference, mode: ColorMode) -> Self {
        Self {
            preference,
            mode,
            palette: Palette::for_preference(preference),
        }
    }

    pub fn with_preference(&self, preference: ThemePreference) -> Self {
        Self::new(preference, self.mode)
    }

    pub fn style(&self, group: UiGroup) -> Style {
        let p = &self.palette;
        match group {
            UiGroup::Base => Style::default().fg(self.color(p.fg)).bg(self.color(p.bg)),
            UiGroup::Border => Style::default().fg(self.color(p.border)),
            UiGroup::Dimmed => Style::default().fg(self.color(p.dim)),
            UiGroup::Title => Style::default().fg(self.color(p.fg)).add_modifier(Modifier::BOLD),
            UiGroup::Accent => Style::default().fg(self.color(p.accent)),
            UiGroup::NavActive => Style::default()
                .fg(self.color(p.bg))
                .bg(self.color(p.accent))
                .add_modifier(Modifier::BOLD),
            UiGroup::InputFocused => Style::default()
                .fg(self.color(p.fg))
                .add_modifier(Modifier::UNDERLINED),
            UiGroup::Success => Style::default().fg(self.color(p.success)).add_modifier(Modifier::BOLD),
            UiGroup::Error => Style::default().fg(self.color(p.error)),
            UiGroup::Warn => Style::default().fg(self.color(p.warn)),
        }
    }

    pub fn color(&self, rgb: Rgb) -> Color {
        match self.mode {
            ColorMode::TrueColor => Color::Rgb(rgb.0, rgb.1, rgb.2),
            ColorMode::Ansi256 => Color::Indexed(rgb_to_ansi256(rgb)),
            ColorMode::Ansi16 => ansi16_from_rgb(rgb),
        }
    }
}

fn rgb_to_ansi256(Rgb(r, g, b): Rgb) -> u8 {
    // 6x6x6 cube or grayscale ramp, whichever is closer
    let r_idx = (r as f32 / 255.0 * 5.0).round() as u8;
    let g_idx = (g as f32 / 255.0 * 5.0).round() as u8;
    let b_idx = (b as f32 / 255.0 * 5.0).round() as u8;
    let color_idx = 16 + 36 * r_idx + 6 * g_idx + b_idx;

    let avg = (r as u16 + g as u16 + b as u16) as f32 / 3.0;
    let gray_idx = (avg / 255.0 * 23.0).round() as u8;
    let gray_color = 232 + gray_idx;

    let cube = |i: u8| i as f32 * 255.0 / 5.0;
    let dcube = (cube(r_idx) - r as f32).abs()
        + (cube(g_idx) - g as f32).abs()
        + (cube(b_idx) - b as f32).abs();
    let gval = gray_idx as f32 * 255.0 / 23.0;
    let dgray = (gval - r as f32).abs() + (gval - g as f32).abs() + (gval - b as f32).abs();
    if dgray + 15.0 < dcube {
        gray_color
    } else {
        color_idx
    }
}

fn ansi16_from_rgb(Rgb(r, g, b): Rgb) -> Color {
    const BASE: [(Color, Color, (i32, i32, i32)); 8] = [
        (Color::Black, Color::DarkGray, (0, 0, 0)),
        (Color::Red, Color::LightRed, (205, 0, 0)),
        (Color::Green, Color::LightGreen, (0, 205, 0)),
        (Color::Yellow, Color::LightYellow, (205, 205, 0)),
        (Color::Blue, Color::LightBlue, (0, 0, 238)),
        (Color::Magenta, Color::LightMagenta, (205, 0, 205)),
        (Color::Cyan, Color::LightCyan, (0, 205, 205)),
        (Color::Gray, Color::White, (229, 229, 229)),
    ];
    let bright = (r as u16 + g as u16 + b as u16) / 3 > 128;
    let (r, g, b) = (r as i32, g as i32, b as i32);
    BASE.iter()
        .min_by_key(|(_, _, (cr, cg, cb))| (cr - r).abs() + (cg - g).abs() + (cb - b).abs())
        .map(|(normal, light, _)| if bright { *light } else { *normal })
        .unwrap_or(Color::White)
}
