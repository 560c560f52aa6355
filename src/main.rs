mod app;
mod braille;
mod data;
mod map;
mod ui;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use log::{error, info};
use quake_map::quake::{feed, Basis, FeedPreset, FeedSource, Marker};
use ratatui::DefaultTerminal;

#[derive(Parser, Debug)]
#[command(version, about = "Live earthquake map in the terminal")]
struct Args {
    /// USGS summary feed to show (all_hour, all_day, all_week, 4.5_week, significant_month)
    #[arg(long, default_value = "all_day")]
    feed: FeedPreset,

    /// Feed URL or local GeoJSON path; overrides --feed
    #[arg(long)]
    feed_url: Option<String>,

    /// Marker colour basis: depth or magnitude
    #[arg(long, default_value = "depth")]
    basis: Basis,

    /// Directory with Natural Earth basemap GeoJSON
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Feed request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log file for the interactive map (the terminal is in use)
    #[arg(long, default_value = "quake-map.log")]
    log_file: PathBuf,

    /// Print markers and legend to stdout instead of opening the map
    #[arg(long, default_value_t = false)]
    list: bool,
}

impl Args {
    fn source(&self) -> FeedSource {
        match &self.feed_url {
            Some(url) => FeedSource::parse(url),
            None => self.feed.source(),
        }
    }

    fn title(&self) -> String {
        match &self.feed_url {
            Some(url) => url.clone(),
            None => self.feed.title().to_string(),
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level));

    // The interactive map owns the terminal, so logs go to a file
    if !args.list {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&args.log_file)
            .with_context(|| format!("opening log file {}", args.log_file.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    if args.list {
        return list(&args);
    }

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &args);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    if let Err(e) = &result {
        error!("Exiting with error: {:#}", e);
    }
    result
}

/// Non-interactive mode: one line per marker, then the legend
fn list(args: &Args) -> Result<()> {
    let source = args.source();
    let batch = match feed::load(&source, args.timeout()) {
        Ok(batch) => batch,
        Err(e) => {
            if let Some(hint) = e.hint() {
                eprintln!("hint: {hint}");
            }
            return Err(e).with_context(|| format!("loading feed from {source}"));
        }
    };

    println!("{}", batch.title.as_deref().unwrap_or(&args.title()));
    for record in &batch.records {
        let marker = Marker::for_record(record, args.basis);
        let mag = record
            .magnitude
            .map(|m| format!("M{m:.1}"))
            .unwrap_or_else(|| "M?".to_string());
        let depth = record
            .depth_km
            .map(|d| format!("{d:.1} km"))
            .unwrap_or_else(|| "? km".to_string());
        println!(
            "{:<6} {:>9} {:>8.3},{:>9.3} r={:<6.2} {} {}",
            mag,
            depth,
            marker.lat,
            marker.lon,
            marker.radius,
            marker.fill,
            record.place.as_deref().unwrap_or("Unknown location"),
        );
    }

    let scale = args.basis.scale();
    println!();
    println!("{}", scale.name);
    for entry in scale.legend() {
        println!("  {} {}", entry.color, entry.label);
    }

    if !batch.skipped.is_empty() {
        eprintln!("{} feature(s) skipped", batch.skipped.len());
    }
    Ok(())
}

/// Handle mouse events for panning, zooming and tooltips
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for cursor marker and hover
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Click pins a tooltip, click and drag pans
        MouseEventKind::Down(MouseButton::Left) => app.begin_drag(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, args: &Args) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(
        size.width as usize,
        size.height as usize,
        args.source(),
        args.title(),
        args.basis,
        args.timeout(),
    );

    data::load_basemap(&mut app.basemap, &args.data_dir);
    if !app.basemap.has_data() {
        info!("No basemap data in {:?}, using built-in outlines", args.data_dir);
        data::generate_simple_world(&mut app.basemap);
    }

    app.request_load();

    loop {
        app.poll_load();

        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') => app.quit(),
                    KeyCode::Esc => app.escape(),

                    // Pan with hjkl or arrow keys
                    KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                    KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                    KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                    KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                    // Zoom
                    KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                    KeyCode::Char('b') | KeyCode::Char('B') => app.basemap.toggle_borders(),
                    KeyCode::Char('c') | KeyCode::Char('C') => app.toggle_basis(),
                    KeyCode::Char('u') | KeyCode::Char('U') => app.request_load(),
                    KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

                    _ => {}
                },
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width as usize, height as usize),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
