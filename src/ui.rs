use crate::app::{App, LoadState};
use crate::braille::BrailleCanvas;
use crate::map::{render_markers, to_color, BasemapLayers};
use quake_map::quake::{format_tooltip, LegendEntry};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
    Frame,
};

const TOOLTIP_MAX_WIDTH: u16 = 60;

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", app.feed_title),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // A failed load replaces the whole map surface
    if let LoadState::Failed { message, hint } = &app.load_state {
        render_error(frame, message, *hint, inner);
        return;
    }

    // Braille gives 2x4 resolution per character
    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let width = inner.width as usize;
    let height = inner.height as usize;

    let map_widget = MapWidget {
        basemap: app.basemap.render(width, height, &viewport),
        markers: render_markers(&app.markers, width, height, &viewport),
        cursor_pos: app.mouse_pos.and_then(|(col, row)| {
            // Mouse coordinates are absolute; the widget wants inner-relative
            let cx = col.checked_sub(inner.x)?;
            let cy = row.checked_sub(inner.y)?;
            (cx < inner.width && cy < inner.height).then_some((cx, cy))
        }),
    };
    frame.render_widget(map_widget, inner);

    render_legend(frame, app.basis.scale().name, &app.legend, inner);

    if let Some(record) = app.tooltip_record() {
        let anchor = app.mouse_pos.unwrap_or((inner.x, inner.y));
        render_tooltip(frame, &format_tooltip(record), anchor, inner);
    }
}

/// Braille map: basemap layers, coloured markers, then the cursor
struct MapWidget {
    basemap: BasemapLayers,
    markers: BrailleCanvas,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget {
    /// Copy a canvas into the buffer. Cells without a pen colour use `default`.
    fn render_layer(canvas: &BrailleCanvas, default: Color, area: Rect, buf: &mut Buffer) {
        let rows = canvas.height().min(area.height as usize);
        let cols = canvas.width().min(area.width as usize);
        for row in 0..rows {
            for col in 0..cols {
                if let Some((ch, color)) = canvas.cell(col, row) {
                    let x = area.x + col as u16;
                    let y = area.y + row as u16;
                    buf[(x, y)].set_char(ch).set_fg(color.unwrap_or(default));
                }
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front
        Self::render_layer(&self.basemap.coastlines, Color::Cyan, area, buf);
        Self::render_layer(&self.basemap.borders, Color::DarkGray, area, buf);
        Self::render_layer(&self.markers, Color::White, area, buf);

        if let Some((cx, cy)) = self.cursor_pos {
            buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
        }
    }
}

/// Legend box in the lower right corner of the map
fn render_legend(frame: &mut Frame, title: &str, entries: &[LegendEntry], map: Rect) {
    if entries.is_empty() {
        return;
    }

    let label_width = entries
        .iter()
        .map(|e| e.label.chars().count())
        .max()
        .unwrap_or(0);
    let width = (label_width.max(title.chars().count()) + 6) as u16;
    let height = entries.len() as u16 + 2;
    if width > map.width || height > map.height {
        return;
    }

    let area = Rect {
        x: map.x + map.width - width,
        y: map.y + map.height - height,
        width,
        height,
    };

    let lines: Vec<Line> = entries
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(to_color(entry.color))),
                Span::styled(entry.label.as_str(), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    let legend = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(title, Style::default().fg(Color::Yellow))),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(legend, area);
}

/// Tooltip box next to `anchor`, flipped to stay inside the map
fn render_tooltip(frame: &mut Frame, text: &str, anchor: (u16, u16), map: Rect) {
    let text_width = text.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
    let width = (text_width + 2).min(TOOLTIP_MAX_WIDTH).min(map.width);
    let height = (text.lines().count() as u16 + 2).min(map.height);

    let right_edge = map.x + map.width;
    let bottom_edge = map.y + map.height;

    let x = if anchor.0 + 2 + width <= right_edge {
        anchor.0 + 2
    } else {
        anchor.0.saturating_sub(width + 1).max(map.x)
    };
    let y = if anchor.1 + 1 + height <= bottom_edge {
        anchor.1 + 1
    } else {
        anchor.1.saturating_sub(height).max(map.y)
    };

    let area = Rect {
        x,
        y,
        width,
        height,
    };

    let tooltip = Paragraph::new(text.to_string())
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

    frame.render_widget(Clear, area);
    frame.render_widget(tooltip, area);
}

fn render_error(frame: &mut Frame, message: &str, hint: Option<&str>, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Could not load earthquake data",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::White))),
    ];
    if let Some(hint) = hint {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "u:retry q:quit",
        Style::default().fg(Color::DarkGray),
    )));

    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let area = Rect {
        y: area.y + top,
        height: area.height - top,
        ..area
    };

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::styled(" Zoom: ", dim),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" (", dim),
        Span::styled(app.lod_level(), Style::default().fg(Color::Magenta)),
        Span::styled(") ", dim),
        Span::styled(
            if app.basemap.show_borders { "[B]order " } else { "[b]order " },
            Style::default().fg(if app.basemap.show_borders { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled("[c]olour: ", dim),
        Span::styled(app.basis.label(), Style::default().fg(Color::Green)),
        Span::styled(" | ", dim),
    ];

    match &app.load_state {
        LoadState::Loading => {
            spans.push(Span::styled("Loading feed...", Style::default().fg(Color::Yellow)));
        }
        LoadState::Ready => {
            spans.push(Span::styled(
                format!("{} quakes", app.markers.len()),
                Style::default().fg(Color::White),
            ));
            if let Some(note) = app.skipped_note() {
                spans.push(Span::styled(format!(" ({note})"), Style::default().fg(Color::Red)));
            }
        }
        LoadState::Failed { .. } => {
            spans.push(Span::styled("Load failed", Style::default().fg(Color::Red)));
        }
    }

    spans.extend([
        Span::styled(" | ", dim),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | hjkl:pan +/-:zoom u:reload r:reset q:quit", dim),
    ]);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
