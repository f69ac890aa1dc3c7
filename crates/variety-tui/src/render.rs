use crate::app::{App, ScreenState};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use std::io;
use variety_core::{DigitStrip, FactoryKind, Occupant, Puzzle};

/// Width of one grid cell in characters
const CELL_WIDTH: u16 = 3;

pub fn render(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;

    execute!(stdout, Hide, SetBackgroundColor(app.theme.bg), Clear(ClearType::All))?;
    render_game_screen(stdout, app, term_width, term_height)?;
    execute!(stdout, Show)?;
    Ok(())
}

fn render_game_screen(stdout: &mut io::Stdout, app: &App, term_width: u16, term_height: u16) -> io::Result<()> {
    let grid = app.puzzle.grid();
    // Row labels take three columns, each cell CELL_WIDTH
    let grid_width = 3 + CELL_WIDTH * grid.width as u16;
    let grid_height = 1 + grid.height as u16;

    let panel_width = 4 * app.puzzle.digit_cap() as u16 + 2;
    let total_width = grid_width + 3 + panel_width;
    let start_x = if term_width > total_width {
        (term_width - total_width) / 2
    } else {
        1
    };
    let start_y = if term_height > grid_height + 14 { 2 } else { 1 };

    render_grid(stdout, app, start_x, start_y)?;

    let info_x = start_x + grid_width + 3;
    render_info_panel(stdout, app, info_x, start_y)?;

    let controls_y = start_y + grid_height + 2;
    render_controls(stdout, app, start_x, controls_y)?;

    if let Some(ref msg) = app.message {
        render_message(stdout, app, msg, term_width)?;
    }

    if app.show_solution {
        render_solution(stdout, app, info_x, start_y + 14)?;
    }

    Ok(())
}

fn render_grid(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let grid = app.puzzle.grid();

    execute!(stdout, SetBackgroundColor(theme.bg), SetForegroundColor(theme.border), MoveTo(x, y), Print("   "))?;
    for col in 0..grid.width {
        let letter = (b'A' + (col % 26) as u8) as char;
        execute!(stdout, Print(format!("{:^3}", letter)))?;
    }

    for row in 0..grid.height {
        execute!(
            stdout,
            MoveTo(x, y + 1 + row as u16),
            SetBackgroundColor(theme.bg),
            SetForegroundColor(theme.border),
            Print(format!("{:>2} ", row + 1))
        )?;
        for col in 0..grid.width {
            let cell = grid.cell(col, row);
            let occupant = app.puzzle.occupant(cell);
            let selected = matches!(
                (occupant, app.selected),
                (Some(Occupant::Component(p)), Some(s)) if p == s
            );
            let bg = if cell == app.cursor {
                theme.cursor_bg
            } else if selected {
                theme.selected_bg
            } else {
                theme.bg
            };
            let fg = match occupant {
                Some(Occupant::Component(_)) => theme.component,
                Some(Occupant::Decoration(_)) => theme.decoration,
                None => theme.border,
            };
            execute!(
                stdout,
                SetBackgroundColor(bg),
                SetForegroundColor(fg),
                Print(format!("{:^3}", cell_code(&app.puzzle, cell)))
            )?;
        }
    }
    execute!(stdout, SetBackgroundColor(theme.bg))?;
    Ok(())
}

fn render_info_panel(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let puzzle = &app.puzzle;

    execute!(
        stdout,
        SetBackgroundColor(theme.bg),
        MoveTo(x, y),
        SetForegroundColor(theme.key),
        Print(format!("═══ VARIETY #{} ═══", puzzle.id()))
    )?;

    render_digit_strip(stdout, app, &puzzle.digit_strip(), x, y + 2)?;

    execute!(
        stdout,
        MoveTo(x, y + 6),
        SetForegroundColor(theme.info),
        Print(format!("Time: {:>10}", app.elapsed_string())),
        MoveTo(x, y + 7),
        Print(format!("Strikes: {:>7}", puzzle.strikes()))
    )?;

    let (status, color) = match app.screen_state {
        ScreenState::Solved => ("SOLVED", theme.success),
        ScreenState::Playing if puzzle.strikes() > 0 => ("Unsolved", theme.error),
        ScreenState::Playing => ("Unsolved", theme.fg),
    };
    execute!(
        stdout,
        MoveTo(x, y + 8),
        SetForegroundColor(theme.info),
        Print("Status: "),
        SetForegroundColor(color),
        Print(format!("{:>8}", status))
    )?;

    if let Some(position) = app.selected {
        let instance = &puzzle.components()[position];
        let label = puzzle.grid().label(instance.footprint().anchor());
        execute!(
            stdout,
            MoveTo(x, y + 10),
            SetForegroundColor(theme.fg),
            Print(format!("{} at {}", instance.describe(), label)),
            MoveTo(x, y + 11),
            SetForegroundColor(theme.component),
            Print(instance.component().readout())
        )?;
    }

    Ok(())
}

fn render_digit_strip(stdout: &mut io::Stdout, app: &App, strip: &DigitStrip, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    for (row, line) in segment_rows(strip).iter().enumerate() {
        execute!(stdout, MoveTo(x, y + row as u16))?;
        for &(glyph, lit) in line {
            let color = if lit { theme.segment_on } else { theme.segment_off };
            execute!(stdout, SetForegroundColor(color), Print(glyph))?;
        }
    }
    Ok(())
}

fn render_solution(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.key),
        Print("Solution:")
    )?;
    for (i, step) in app.puzzle.expected_actions().iter().enumerate() {
        execute!(
            stdout,
            MoveTo(x, y + 1 + i as u16),
            SetForegroundColor(theme.info),
            Print(format!("{:>2}. {}", i + 1, step))
        )?;
    }
    Ok(())
}

fn render_controls(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;

    execute!(stdout, SetBackgroundColor(theme.bg))?;

    let controls = [
        ("hjkl/Arrows", "Move"),
        ("Tab", "Next"),
        ("Space", "Use"),
        ("1-9", "Keys/slots"),
        ("+/-", "Digits"),
        ("wasd", "Maze/die"),
        ("?", "Solution"),
        ("n", "New puzzle"),
        ("t", "Theme"),
        ("q", "Quit"),
    ];

    for (i, (key, desc)) in controls.iter().enumerate() {
        let col = i / 3;
        let row = i % 3;
        let cx = x + (col as u16) * 20;
        let cy = y + row as u16;

        execute!(
            stdout,
            MoveTo(cx, cy),
            SetForegroundColor(theme.key),
            Print(format!("{:>11}", key)),
            SetForegroundColor(theme.info),
            Print(format!(" {}", desc))
        )?;
    }

    Ok(())
}

fn render_message(stdout: &mut io::Stdout, app: &App, msg: &str, term_width: u16) -> io::Result<()> {
    let theme = &app.theme;
    let padded = format!("  {}  ", msg);
    let x = term_width.saturating_sub(padded.chars().count() as u16) / 2;
    let fg = if msg.starts_with("You received a strike") {
        theme.error
    } else {
        theme.fg
    };

    execute!(
        stdout,
        MoveTo(x, 0),
        SetForegroundColor(fg),
        SetBackgroundColor(theme.cursor_bg),
        Print(&padded),
        SetBackgroundColor(theme.bg),
        SetForegroundColor(Color::Reset)
    )?;

    Ok(())
}

/// Two-letter map code of a component kind
pub fn kind_code(kind: FactoryKind) -> &'static str {
    match kind {
        FactoryKind::Dummy => "··",
        FactoryKind::Wire => "Wi",
        FactoryKind::Key => "Ky",
        FactoryKind::Knob => "Kn",
        FactoryKind::Slider => "Sl",
        FactoryKind::Switch => "Sw",
        FactoryKind::Keypad => "Kp",
        FactoryKind::DigitDisplay => "Dd",
        FactoryKind::Maze => "Mz",
        FactoryKind::Led => "Ld",
        FactoryKind::LetterDisplay => "Lt",
        FactoryKind::Timer => "Tm",
        FactoryKind::ColoredKnob => "Ck",
        FactoryKind::ColoredKeypad => "Cp",
        FactoryKind::Die => "Di",
    }
}

/// Map code of whatever covers `cell`, `.` for an empty cell
pub fn cell_code(puzzle: &Puzzle, cell: usize) -> &'static str {
    match puzzle.occupant(cell) {
        Some(Occupant::Component(p)) => kind_code(puzzle.components()[p].kind()),
        Some(Occupant::Decoration(d)) => kind_code(puzzle.decorations()[d].kind()),
        None => ".",
    }
}

/// Plain-text grid map with coordinate labels
pub fn text_map(puzzle: &Puzzle) -> Vec<String> {
    let grid = puzzle.grid();
    let mut lines = Vec::with_capacity(grid.height + 1);
    let header: String = (0..grid.width)
        .map(|col| format!("{:^3}", (b'A' + (col % 26) as u8) as char))
        .collect();
    lines.push(format!("   {}", header));
    for row in 0..grid.height {
        let cells: String = (0..grid.width)
            .map(|col| format!("{:^3}", cell_code(puzzle, grid.cell(col, row))))
            .collect();
        lines.push(format!("{:>2} {}", row + 1, cells));
    }
    lines
}

/// Three text rows of seven-segment glyphs, each paired with whether it is lit.
///
/// Positions are three characters wide and separated by one space.
pub fn segment_rows(strip: &DigitStrip) -> [Vec<(char, bool)>; 3] {
    let mut rows: [Vec<(char, bool)>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for (i, mask) in strip.segments().iter().enumerate() {
        if i > 0 {
            for row in rows.iter_mut() {
                row.push((' ', false));
            }
        }
        // top, upper-left, upper-right, middle, lower-left, lower-right, bottom
        rows[0].extend([(' ', false), ('_', mask[0]), (' ', false)]);
        rows[1].extend([('|', mask[1]), ('_', mask[3]), ('|', mask[2])]);
        rows[2].extend([('|', mask[4]), ('_', mask[6]), ('|', mask[5])]);
    }
    rows
}

/// Lit segments only, as plain text
pub fn segment_text(strip: &DigitStrip) -> Vec<String> {
    segment_rows(strip)
        .iter()
        .map(|row| {
            row.iter()
                .map(|&(glyph, lit)| if lit { glyph } else { ' ' })
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}
