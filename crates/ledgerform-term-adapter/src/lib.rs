//! ledgerform-term-adapter: cell-frame boundary used to paint engine output.
//!
//! Engine crates only talk to this local abstraction: a theme, a text frame,
//! a handful of widget specs and a canonical key model for edit events.

/// Stable crate label used by bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "ledgerform-term-adapter"
}

/// Style and theme primitives consumed by the engine painter.
pub mod style {
    /// Logical theme choices supported by the adapter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ThemeKind {
        Dark,
        Light,
    }

    /// Stable style tokens exposed to engine crates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum StyleToken {
        Background,
        Surface,
        Foreground,
        Muted,
        Accent,
        Danger,
        Warning,
    }

    /// Adapter palette uses terminal 256-color indexes for portability.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Palette {
        pub background: u8,
        pub surface: u8,
        pub foreground: u8,
        pub muted: u8,
        pub accent: u8,
        pub danger: u8,
        pub warning: u8,
    }

    /// Theme specification exposed to engine crates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ThemeSpec {
        pub kind: ThemeKind,
        pub palette: Palette,
        /// Render muted (read-only) text dimmed.
        pub muted_dim: bool,
    }

    impl ThemeSpec {
        /// Returns the color index for a stable style token.
        #[must_use]
        pub fn color(self, token: StyleToken) -> u8 {
            match token {
                StyleToken::Background => self.palette.background,
                StyleToken::Surface => self.palette.surface,
                StyleToken::Foreground => self.palette.foreground,
                StyleToken::Muted => self.palette.muted,
                StyleToken::Accent => self.palette.accent,
                StyleToken::Danger => self.palette.danger,
                StyleToken::Warning => self.palette.warning,
            }
        }

        /// Builds a theme for the requested style family.
        #[must_use]
        pub fn for_kind(kind: ThemeKind) -> Self {
            let palette = match kind {
                ThemeKind::Dark => Palette {
                    background: 16,
                    surface: 235,
                    foreground: 252,
                    muted: 244,
                    accent: 45,
                    danger: 197,
                    warning: 220,
                },
                ThemeKind::Light => Palette {
                    background: 255,
                    surface: 252,
                    foreground: 234,
                    muted: 244,
                    accent: 25,
                    danger: 160,
                    warning: 172,
                },
            };
            Self {
                kind,
                palette,
                muted_dim: matches!(kind, ThemeKind::Dark),
            }
        }
    }

    impl Default for ThemeSpec {
        fn default() -> Self {
            Self::for_kind(ThemeKind::Light)
        }
    }
}

/// Render and frame primitives consumed by the engine painter.
pub mod render {
    use super::style::{StyleToken, ThemeSpec};

    /// Glyph appended when single-line text is cut to fit.
    pub const ELLIPSIS: char = '…';

    /// Frame dimensions in terminal cells.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FrameSize {
        pub width: usize,
        pub height: usize,
    }

    /// A rectangular region within a frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Rect {
        pub x: usize,
        pub y: usize,
        pub width: usize,
        pub height: usize,
    }

    impl Rect {
        /// Sub-rectangle covering grid units `start..start + span` of a
        /// `units`-wide grid laid over this rect's width.
        #[must_use]
        pub fn grid_slice(self, units: usize, start: usize, span: usize) -> Self {
            if units == 0 {
                return Self { width: 0, ..self };
            }
            let end = (start + span).min(units);
            let x0 = self.width * start.min(units) / units;
            let x1 = self.width * end / units;
            Self {
                x: self.x + x0,
                y: self.y,
                width: x1.saturating_sub(x0),
                height: self.height,
            }
        }
    }

    /// Cell style represented as terminal colors and text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CellStyle {
        pub fg: u8,
        pub bg: u8,
        pub bold: bool,
        pub dim: bool,
    }

    /// A single frame cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FrameCell {
        pub glyph: char,
        pub style: CellStyle,
    }

    /// Semantic role for rendered text.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TextRole {
        Primary,
        Muted,
        Accent,
        Danger,
        Warning,
    }

    /// Stable frame abstraction for engine snapshots.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RenderFrame {
        size: FrameSize,
        cells: Vec<FrameCell>,
        theme: ThemeSpec,
    }

    impl RenderFrame {
        /// Create a blank frame using the provided adapter theme.
        #[must_use]
        pub fn new(size: FrameSize, theme: ThemeSpec) -> Self {
            let default_cell = FrameCell {
                glyph: ' ',
                style: CellStyle {
                    fg: theme.color(StyleToken::Foreground),
                    bg: theme.color(StyleToken::Background),
                    bold: false,
                    dim: false,
                },
            };
            Self {
                size,
                cells: vec![default_cell; size.width.saturating_mul(size.height)],
                theme,
            }
        }

        #[must_use]
        pub fn theme(&self) -> ThemeSpec {
            self.theme
        }

        #[must_use]
        pub fn size(&self) -> FrameSize {
            self.size
        }

        /// Full-frame rect.
        #[must_use]
        pub fn area(&self) -> Rect {
            Rect {
                x: 0,
                y: 0,
                width: self.size.width,
                height: self.size.height,
            }
        }

        /// Returns one frame cell for assertions/snapshot helpers.
        #[must_use]
        pub fn cell(&self, x: usize, y: usize) -> Option<FrameCell> {
            if x >= self.size.width || y >= self.size.height {
                return None;
            }
            Some(self.cells[y * self.size.width + x])
        }

        /// Write a single cell, clipped to frame bounds.
        pub fn set_cell(&mut self, x: usize, y: usize, cell: FrameCell) {
            if x >= self.size.width || y >= self.size.height {
                return;
            }
            self.cells[y * self.size.width + x] = cell;
        }

        /// Draw text on a single row, clipped to frame width.
        pub fn draw_text(&mut self, x: usize, y: usize, text: &str, role: TextRole) {
            let rect = Rect {
                x,
                y,
                width: self.size.width.saturating_sub(x),
                height: 1,
            };
            self.draw_text_in_rect(rect, 0, 0, text, role);
        }

        /// Draw text within a rect, clipped to rect bounds.
        pub fn draw_text_in_rect(
            &mut self,
            rect: Rect,
            x_offset: usize,
            y_offset: usize,
            text: &str,
            role: TextRole,
        ) {
            let abs_x = rect.x + x_offset;
            let abs_y = rect.y + y_offset;
            if abs_y >= rect.y + rect.height || abs_y >= self.size.height {
                return;
            }
            let max_chars = (rect.x + rect.width).saturating_sub(abs_x);
            let style = self.style_for_role(role);
            for (offset, glyph) in text.chars().take(max_chars).enumerate() {
                let col = abs_x + offset;
                if col >= self.size.width {
                    break;
                }
                self.cells[abs_y * self.size.width + col] = FrameCell { glyph, style };
            }
        }

        /// Draw single-line text inside `rect`, replacing the tail with an
        /// ellipsis when it does not fit. Line breaks are flattened to spaces.
        pub fn draw_text_truncated(&mut self, rect: Rect, y_offset: usize, text: &str, role: TextRole) {
            let flat: String = text
                .chars()
                .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
                .collect();
            let fitted = truncate_with_ellipsis(&flat, rect.width);
            self.draw_text_in_rect(rect, 0, y_offset, &fitted, role);
        }

        /// Draw a horizontal rule across a row within a region.
        pub fn draw_horizontal_rule(&mut self, x: usize, y: usize, width: usize, role: TextRole) {
            let style = self.style_for_role(role);
            for col in x..x + width {
                if col >= self.size.width || y >= self.size.height {
                    break;
                }
                self.set_cell(col, y, FrameCell { glyph: '─', style });
            }
        }

        #[must_use]
        pub fn row_text(&self, y: usize) -> String {
            if y >= self.size.height {
                return String::new();
            }
            let start = y * self.size.width;
            let end = start + self.size.width;
            self.cells[start..end]
                .iter()
                .map(|cell| cell.glyph)
                .collect()
        }

        /// Text-only snapshot helper for lightweight regression tests.
        #[must_use]
        pub fn snapshot(&self) -> String {
            (0..self.size.height)
                .map(|row| self.row_text(row))
                .collect::<Vec<_>>()
                .join("\n")
        }

        /// Snapshot with trailing blanks stripped from every row and trailing
        /// empty rows removed. Used by the CLI output.
        #[must_use]
        pub fn trimmed_snapshot(&self) -> String {
            let rows: Vec<String> = (0..self.size.height)
                .map(|row| self.row_text(row).trim_end().to_owned())
                .collect();
            let keep = rows
                .iter()
                .rposition(|row| !row.is_empty())
                .map_or(0, |idx| idx + 1);
            rows[..keep].join("\n")
        }

        fn style_for_role(&self, role: TextRole) -> CellStyle {
            let token = match role {
                TextRole::Primary => StyleToken::Foreground,
                TextRole::Muted => StyleToken::Muted,
                TextRole::Accent => StyleToken::Accent,
                TextRole::Danger => StyleToken::Danger,
                TextRole::Warning => StyleToken::Warning,
            };
            let bg = match role {
                TextRole::Muted => self.theme.color(StyleToken::Surface),
                _ => self.theme.color(StyleToken::Background),
            };
            CellStyle {
                fg: self.theme.color(token),
                bg,
                bold: matches!(role, TextRole::Accent | TextRole::Danger),
                dim: matches!(role, TextRole::Muted) && self.theme.muted_dim,
            }
        }
    }

    /// Cut `text` to at most `width` chars, ending with [`ELLIPSIS`] when cut.
    #[must_use]
    pub fn truncate_with_ellipsis(text: &str, width: usize) -> String {
        let count = text.chars().count();
        if count <= width {
            return text.to_owned();
        }
        if width == 0 {
            return String::new();
        }
        let mut out: String = text.chars().take(width - 1).collect();
        out.push(ELLIPSIS);
        out
    }
}

/// Stable widget primitives consumed by the engine painter.
pub mod widgets {
    /// Text alignment for table columns.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TextAlign {
        Left,
        Right,
    }

    /// Table column primitive: header title, cell width and alignment.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct TableColumnSpec {
        pub key: String,
        pub title: String,
        pub width: u16,
        pub align: TextAlign,
    }

    impl TableColumnSpec {
        /// Pads or truncates `text` to exactly this column's width.
        #[must_use]
        pub fn fit(&self, text: &str) -> String {
            let width = usize::from(self.width);
            let cut = super::render::truncate_with_ellipsis(text, width);
            let pad = width.saturating_sub(cut.chars().count());
            match self.align {
                TextAlign::Left => format!("{cut}{}", " ".repeat(pad)),
                TextAlign::Right => format!("{}{cut}", " ".repeat(pad)),
            }
        }
    }

    /// Splits `total` cells across `count` columns, giving the remainder to
    /// the leftmost columns.
    #[must_use]
    pub fn even_column_widths(total: usize, count: usize) -> Vec<u16> {
        if count == 0 {
            return Vec::new();
        }
        let base = total / count;
        let extra = total % count;
        (0..count)
            .map(|idx| {
                let width = base + usize::from(idx < extra);
                u16::try_from(width).unwrap_or(u16::MAX)
            })
            .collect()
    }
}

/// Snapshot helpers for adapter-based render abstractions.
pub mod snapshot;

/// Canonical key model used for edit keystrokes.
pub mod input {
    /// Canonical key set exposed to engine crates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Key {
        Char(char),
        Enter,
        Escape,
        Tab,
        Backspace,
        Delete,
        Home,
        End,
        Up,
        Down,
        Left,
        Right,
    }

    /// Canonical keyboard modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modifiers {
        pub shift: bool,
        pub ctrl: bool,
        pub alt: bool,
    }

    impl Modifiers {
        #[must_use]
        pub const fn none() -> Self {
            Self {
                shift: false,
                ctrl: false,
                alt: false,
            }
        }

        #[must_use]
        pub const fn ctrl() -> Self {
            Self {
                shift: false,
                ctrl: true,
                alt: false,
            }
        }
    }

    /// Canonical key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeyEvent {
        pub key: Key,
        pub modifiers: Modifiers,
    }

    impl KeyEvent {
        #[must_use]
        pub const fn plain(key: Key) -> Self {
            Self {
                key,
                modifiers: Modifiers::none(),
            }
        }

        #[must_use]
        pub const fn with_ctrl(key: Key) -> Self {
            Self {
                key,
                modifiers: Modifiers::ctrl(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::crate_label;
    use super::snapshot::assert_render_frame_snapshot;
    use super::render::{truncate_with_ellipsis, FrameSize, Rect, RenderFrame, TextRole};
    use super::style::{StyleToken, ThemeKind, ThemeSpec};
    use super::widgets::{even_column_widths, TableColumnSpec, TextAlign};

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "ledgerform-term-adapter");
    }

    #[test]
    fn default_theme_is_light() {
        let theme = ThemeSpec::default();
        assert_eq!(theme.kind, ThemeKind::Light);
        assert_eq!(theme.color(StyleToken::Accent), 25);
    }

    #[test]
    fn render_frame_text_snapshot() {
        let mut frame = RenderFrame::new(
            FrameSize {
                width: 12,
                height: 2,
            },
            ThemeSpec::default(),
        );
        frame.draw_text(0, 0, "Amount", TextRole::Accent);
        frame.draw_text(0, 1, "1.234", TextRole::Muted);
        assert_render_frame_snapshot("two_rows", &frame, "Amount      \n1.234       \n");
    }

    #[test]
    fn muted_role_uses_surface_and_dim_on_dark() {
        let theme = ThemeSpec::for_kind(ThemeKind::Dark);
        let mut frame = RenderFrame::new(
            FrameSize {
                width: 5,
                height: 1,
            },
            theme,
        );
        frame.draw_text(0, 0, "ro", TextRole::Muted);
        let cell = frame.cell(0, 0);
        assert_eq!(cell.map(|c| c.style.dim), Some(true));
        assert_eq!(cell.map(|c| c.style.bg), Some(theme.color(StyleToken::Surface)));
    }

    #[test]
    fn truncated_text_ends_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("abcdef", 4), "abc…");
        assert_eq!(truncate_with_ellipsis("abc", 4), "abc");
        assert_eq!(truncate_with_ellipsis("abc", 0), "");

        let mut frame = RenderFrame::new(
            FrameSize {
                width: 6,
                height: 1,
            },
            ThemeSpec::default(),
        );
        frame.draw_text_truncated(frame.area(), 0, "line\nbreak", TextRole::Primary);
        assert_eq!(frame.snapshot(), "line …");
    }

    #[test]
    fn grid_slice_maps_twelve_units() {
        let rect = Rect {
            x: 0,
            y: 0,
            width: 24,
            height: 3,
        };
        let left = rect.grid_slice(12, 0, 4);
        let right = rect.grid_slice(12, 4, 8);
        assert_eq!((left.x, left.width), (0, 8));
        assert_eq!((right.x, right.width), (8, 16));
        let overflow = rect.grid_slice(12, 8, 12);
        assert_eq!((overflow.x, overflow.width), (16, 8));
    }

    #[test]
    fn trimmed_snapshot_drops_trailing_blanks() {
        let mut frame = RenderFrame::new(
            FrameSize {
                width: 8,
                height: 3,
            },
            ThemeSpec::default(),
        );
        frame.draw_text(1, 0, "x", TextRole::Primary);
        assert_eq!(frame.trimmed_snapshot(), " x");
    }

    #[test]
    fn column_fit_pads_and_aligns() {
        let left = TableColumnSpec {
            key: "note".to_owned(),
            title: "Note".to_owned(),
            width: 5,
            align: TextAlign::Left,
        };
        let right = TableColumnSpec {
            align: TextAlign::Right,
            ..left.clone()
        };
        assert_eq!(left.fit("ab"), "ab   ");
        assert_eq!(right.fit("ab"), "   ab");
        assert_eq!(left.fit("abcdefg"), "abcd…");
        assert_eq!(even_column_widths(10, 3), vec![4, 3, 3]);
    }
}
