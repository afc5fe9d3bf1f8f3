use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::Color as ComfyColor;
use crossterm::style::Color;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
  Always,
  Auto,
  Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeMode {
  Dark,
  Light,
  Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
  Dark,
  Light,
}

/// What a piece of console output is, independent of the palette it is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  Timestamp,
  Primary,
  Accent,
  Success,
  Warning,
  Label,
  Value,
}

pub struct Colors {
  enabled: bool,
  theme: Theme,
}

impl Colors {
  pub const fn new(enabled: bool, theme: Theme) -> Self {
    Self { enabled, theme }
  }

  pub const fn color(&self, role: Role) -> Color {
    if !self.enabled {
      return Color::Reset;
    }

    let (r, g, b) = match (self.theme, role) {
      (Theme::Dark, Role::Timestamp) => (118, 166, 166),
      (Theme::Dark, Role::Primary) => (191, 126, 4),
      (Theme::Dark, Role::Accent) => (166, 84, 55),
      (Theme::Dark, Role::Success) => (120, 180, 120),
      (Theme::Dark, Role::Warning) => (230, 180, 60),
      (Theme::Dark, Role::Label) => (217, 164, 4),
      (Theme::Dark, Role::Value) => (242, 211, 56),
      (Theme::Light, Role::Timestamp) => (92, 62, 38),
      (Theme::Light, Role::Primary) => (70, 42, 25),
      (Theme::Light, Role::Accent) => (211, 99, 70),
      (Theme::Light, Role::Success) => (34, 142, 90),
      (Theme::Light, Role::Warning) => (176, 103, 20),
      (Theme::Light, Role::Label) => (176, 103, 66),
      (Theme::Light, Role::Value) => (199, 146, 76),
    };
    Color::Rgb { r, g, b }
  }

  pub const fn table_color(&self, role: Role) -> ComfyColor {
    match self.color(role) {
      Color::Rgb { r, g, b } => ComfyColor::Rgb { r, g, b },
      _ => ComfyColor::Reset,
    }
  }
}

pub fn colors_enabled(mode: ColorMode) -> bool {
  match mode {
    ColorMode::Always => true,
    ColorMode::Never => false,
    ColorMode::Auto => std::io::stdout().is_terminal(),
  }
}

pub fn detect_theme(mode: ThemeMode) -> Theme {
  match mode {
    ThemeMode::Dark => Theme::Dark,
    ThemeMode::Light => Theme::Light,
    ThemeMode::Auto => detect_terminal_theme(),
  }
}

fn detect_terminal_theme() -> Theme {
  if let Ok(colorfgbg) = std::env::var("COLORFGBG")
    && let Some(bg) = colorfgbg.split(';').next_back()
    && let Ok(bg_num) = bg.parse::<u8>()
  {
    return if bg_num >= 8 { Theme::Light } else { Theme::Dark };
  }

  Theme::Dark
}
