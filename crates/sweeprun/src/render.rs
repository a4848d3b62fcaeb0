//! Live progress view
//!
//! Draws one gauge per dimension, an overall gauge and the most recent
//! command line into an inline viewport below the cursor. Drawing happens on
//! its own thread on a fixed refresh interval, independent of the sweep loop.

use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Gauge, Paragraph};
use ratatui::{Frame, Terminal, TerminalOptions, Viewport};
use sweeprun_core::{ProgressSnapshot, SweepProgress};

/// Standard refresh interval for the live view
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Standard color for dimension gauges
const DIMENSION_COLOR: Color = Color::Cyan;

/// Standard color for the overall gauge
const OVERALL_COLOR: Color = Color::Green;

/// Standard color for the command line
const COMMAND_COLOR: Color = Color::DarkGray;

/// Label of the overall gauge
const OVERALL_LABEL: &str = "step";

/// Rows needed: one per dimension, the overall gauge and the command line
pub fn viewport_height(columns: usize) -> u16 {
    u16::try_from(columns + 2).unwrap_or(u16::MAX)
}

/// Width of the label column
fn label_width(snapshot: &ProgressSnapshot) -> u16 {
    let widest = snapshot
        .columns
        .iter()
        .map(|c| c.label.chars().count())
        .chain(std::iter::once(OVERALL_LABEL.len()))
        .max()
        .unwrap_or(0);
    u16::try_from(widest + 1).unwrap_or(u16::MAX)
}

fn gauge_row(frame: &mut Frame, area: Rect, label_width: u16, label: &str, gauge: Gauge) {
    let [label_area, gauge_area] =
        Layout::horizontal([Constraint::Length(label_width), Constraint::Min(1)]).areas(area);

    frame.render_widget(Paragraph::new(label.to_string()), label_area);
    frame.render_widget(gauge, gauge_area);
}

/// Draw the progress view for one snapshot.
pub fn draw_progress(frame: &mut Frame, area: Rect, snapshot: &ProgressSnapshot) {
    let rows = Layout::vertical(
        (0..viewport_height(snapshot.columns.len())).map(|_| Constraint::Length(1)),
    )
    .split(area);
    let width = label_width(snapshot);

    for (column, row) in snapshot.columns.iter().zip(rows.iter()) {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(DIMENSION_COLOR))
            .ratio(column.ratio())
            .label(format!("{}/{}", column.current, column.total));
        gauge_row(frame, *row, width, &column.label, gauge);
    }

    let overall_row = snapshot.columns.len();
    if let Some(row) = rows.get(overall_row) {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(OVERALL_COLOR))
            .ratio(snapshot.ratio())
            .label(format!("{}/{}", snapshot.completed, snapshot.total));
        gauge_row(frame, *row, width, OVERALL_LABEL, gauge);
    }

    if let Some(row) = rows.get(overall_row + 1) {
        let line = Line::from(Span::styled(
            snapshot.command.clone().unwrap_or_default(),
            Style::default().fg(COMMAND_COLOR),
        ));
        frame.render_widget(Paragraph::new(line), *row);
    }
}

/// Switch shared by the renderer and the interrupt path.
///
/// Once closed no further frame is drawn. A frame in progress finishes
/// before `close` returns.
#[derive(Debug, Clone, Default)]
pub struct ViewGate {
    closed: Arc<Mutex<bool>>,
}

impl ViewGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close(&self) {
        *self.closed.lock().unwrap_or_else(PoisonError::into_inner) = true;
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `draw` unless the gate is closed, holding it shut meanwhile
    fn while_open<R>(&self, draw: impl FnOnce() -> R) -> Option<R> {
        let closed = self.closed.lock().unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return None;
        }
        Some(draw())
    }
}

/// Background thread redrawing the live view
pub struct ProgressRenderer {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<io::Result<()>>>,
}

impl ProgressRenderer {
    /// Create the inline viewport and start redrawing every `interval`.
    ///
    /// The terminal should already be in raw mode. Drawing stops for good
    /// once `gate` is closed.
    pub fn spawn(
        progress: SweepProgress,
        gate: ViewGate,
        interval: Duration,
    ) -> io::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: Viewport::Inline(viewport_height(progress.columns())),
            },
        )?;

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let handle = thread::Builder::new()
            .name("sweeprun-render".to_string())
            .spawn(move || render_loop(terminal, &progress, &gate, &thread_stop, interval))?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stop the refresh cycle after one final draw.
    pub fn stop(mut self) -> io::Result<()> {
        self.stop.store(true, Ordering::Relaxed);
        match self.handle.take().map(JoinHandle::join) {
            Some(Ok(result)) => result,
            Some(Err(_)) => Err(io::Error::other("render thread panicked")),
            None => Ok(()),
        }
    }
}

fn render_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    progress: &SweepProgress,
    gate: &ViewGate,
    stop: &AtomicBool,
    interval: Duration,
) -> io::Result<()> {
    let mut bottom = 0;
    loop {
        let stopping = stop.load(Ordering::Relaxed);
        let snapshot = progress.snapshot();
        let drawn = gate.while_open(|| {
            terminal.draw(|frame| {
                let area = frame.area();
                bottom = area.bottom();
                draw_progress(frame, area, &snapshot);
            })
            .map(|_| ())
        });
        match drawn {
            Some(result) => {
                result?;
            }
            // Interrupted: the terminal belongs to the interrupt path now
            None => return Ok(()),
        }
        if stopping {
            break;
        }
        thread::sleep(interval);
    }

    // Leave the cursor on the last row of the view
    terminal.set_cursor_position((0, bottom.saturating_sub(1)))?;
    terminal.show_cursor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use sweeprun_core::ColumnSnapshot;

    fn render(snapshot: &ProgressSnapshot, width: u16) -> Vec<String> {
        let height = viewport_height(snapshot.columns.len());
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| draw_progress(frame, frame.area(), snapshot))
            .unwrap();

        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    fn snapshot() -> ProgressSnapshot {
        ProgressSnapshot {
            columns: vec![
                ColumnSnapshot {
                    label: "mode".to_string(),
                    current: 1,
                    total: 2,
                },
                ColumnSnapshot {
                    label: "target".to_string(),
                    current: 2,
                    total: 2,
                },
            ],
            completed: 2,
            total: 4,
            command: Some("./run --mode=debug --target=arm".to_string()),
            cancelled: false,
        }
    }

    #[test]
    fn test_viewport_height() {
        assert_eq!(viewport_height(0), 2);
        assert_eq!(viewport_height(3), 5);
    }

    #[test]
    fn test_draws_one_row_per_dimension() {
        let lines = render(&snapshot(), 50);

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("mode "));
        assert!(lines[0].contains("1/2"));
        assert!(lines[1].starts_with("target "));
        assert!(lines[1].contains("2/2"));
        assert!(lines[2].starts_with("step "));
        assert!(lines[2].contains("2/4"));
        assert!(lines[3].starts_with("./run --mode=debug --target=arm"));
    }

    #[test]
    fn test_no_dimensions() {
        let snapshot = ProgressSnapshot {
            completed: 0,
            total: 1,
            ..Default::default()
        };
        let lines = render(&snapshot, 30);

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("step "));
        assert!(lines[0].contains("0/1"));
        assert_eq!(lines[1].trim(), "");
    }

    #[test]
    fn test_closed_gate_skips_drawing() {
        let gate = ViewGate::new();
        assert_eq!(gate.while_open(|| 1), Some(1));

        let shared = gate.clone();
        shared.close();
        assert!(gate.is_closed());

        let mut drawn = false;
        assert_eq!(gate.while_open(|| drawn = true), None);
        assert!(!drawn);
    }

    #[test]
    fn test_label_width_fits_longest_key() {
        let mut snapshot = snapshot();
        snapshot.columns[0].label = "learning_rate".to_string();
        assert_eq!(label_width(&snapshot), 14);
        assert_eq!(label_width(&ProgressSnapshot::default()), 5);
    }
}
