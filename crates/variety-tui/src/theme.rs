use crossterm::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Grid border and coordinate labels
    pub border: Color,
    /// Interactive component cells
    pub component: Color,
    /// Decorative component cells
    pub decoration: Color,
    /// Cell under the cursor
    pub cursor_bg: Color,
    /// Cells of the selected component
    pub selected_bg: Color,
    /// Lit serial segments
    pub segment_on: Color,
    /// Unlit serial segments
    pub segment_off: Color,
    /// Strike color
    pub error: Color,
    /// Solved color
    pub success: Color,
    /// Info text color
    pub info: Color,
    /// Key binding text color
    pub key: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb { r: 20, g: 22, b: 30 },
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            border: Color::Rgb { r: 70, g: 75, b: 90 },
            component: Color::Rgb { r: 80, g: 180, b: 255 },
            decoration: Color::Rgb { r: 95, g: 100, b: 120 },
            cursor_bg: Color::Rgb { r: 70, g: 90, b: 140 },
            selected_bg: Color::Rgb { r: 35, g: 40, b: 55 },
            segment_on: Color::Rgb { r: 255, g: 80, b: 60 },
            segment_off: Color::Rgb { r: 50, g: 30, b: 30 },
            error: Color::Rgb { r: 255, g: 90, b: 90 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
            info: Color::Rgb { r: 160, g: 165, b: 185 },
            key: Color::Rgb { r: 255, g: 210, b: 100 },
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::Rgb { r: 248, g: 248, b: 252 },
            fg: Color::Rgb { r: 30, g: 30, b: 40 },
            border: Color::Rgb { r: 180, g: 180, b: 195 },
            component: Color::Rgb { r: 30, g: 100, b: 200 },
            decoration: Color::Rgb { r: 150, g: 150, b: 165 },
            cursor_bg: Color::Rgb { r: 180, g: 200, b: 255 },
            selected_bg: Color::Rgb { r: 230, g: 232, b: 242 },
            segment_on: Color::Rgb { r: 200, g: 30, b: 20 },
            segment_off: Color::Rgb { r: 235, g: 215, b: 215 },
            error: Color::Rgb { r: 220, g: 50, b: 50 },
            success: Color::Rgb { r: 40, g: 160, b: 60 },
            info: Color::Rgb { r: 90, g: 90, b: 110 },
            key: Color::Rgb { r: 200, g: 120, b: 20 },
        }
    }

    pub fn is_dark(&self) -> bool {
        self.bg == Self::dark().bg
    }
}
