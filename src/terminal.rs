// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(KeyCode),
}

/// The window the rain is shown in. One glyph cell spans `unit × unit` pixels.
pub trait Screen {
    fn pixel_size(&self, unit: u16) -> Result<(u32, u32)>;

    fn present(&mut self, frame: &mut Frame) -> Result<()>;

    // Never blocks.
    fn poll_events(&mut self) -> Result<Vec<InputEvent>>;
}

#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
}

impl Pen {
    fn apply<W: Write>(&mut self, out: &mut W, cell: &Cell) -> Result<()> {
        if cell.fg != self.fg {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = cell.fg;
        }
        if cell.bg != self.bg {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = cell.bg;
        }
        if cell.bold != self.bold {
            out.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            self.bold = cell.bold;
        }
        Ok(())
    }
}

/// Diffs frames against what is already on screen and writes the
/// difference to `out`.
struct Presenter<W: Write> {
    out: W,
    last: Option<Vec<Cell>>,
    run_buf: String,
    row_dirty: Vec<Vec<usize>>,
}

impl<W: Write> Presenter<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            last: None,
            run_buf: String::with_capacity(64),
            row_dirty: Vec::new(),
        }
    }

    fn present(&mut self, frame: &mut Frame) -> Result<()> {
        let len = frame.width as usize * frame.height as usize;
        let stale = self.last.as_ref().map_or(true, |l| l.len() != len);
        let dirty_is_large = len > 0 && frame.dirty_indices().len() >= len / 3;

        // The screen only needs wiping when its shape changed.
        if stale {
            self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        }
        if stale || frame.is_dirty_all() || dirty_is_large {
            self.present_all(frame)?;
        } else {
            self.present_dirty(frame)?;
        }

        self.out.queue(SetAttribute(Attribute::Reset))?;
        self.out.queue(ResetColor)?;
        self.out.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn present_all(&mut self, frame: &Frame) -> Result<()> {
        let mut pen = Pen::default();
        let len = frame.width as usize * frame.height as usize;
        let last = self.last.get_or_insert_with(Vec::new);
        last.clear();
        last.reserve(len);

        for y in 0..frame.height {
            self.out.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(idx);
                pen.apply(&mut self.out, &cell)?;
                self.out.queue(Print(cell.ch))?;
                last.push(cell);
            }
        }
        Ok(())
    }

    // Same-styled neighbours on a row go out as one print.
    fn present_dirty(&mut self, frame: &Frame) -> Result<()> {
        let Some(last) = self.last.as_mut() else {
            return Ok(());
        };
        let mut pen = Pen::default();
        let mut cur_pos: Option<(u16, u16)> = None;
        let width = frame.width as usize;

        if self.row_dirty.len() != frame.height as usize {
            self.row_dirty = vec![Vec::new(); frame.height as usize];
        }
        for &idx in frame.dirty_indices() {
            self.row_dirty[idx / width].push(idx);
        }

        for (y0, row) in self.row_dirty.iter_mut().enumerate() {
            if row.is_empty() {
                continue;
            }
            row.sort_unstable();
            let y0 = y0 as u16;
            let mut i = 0usize;
            while i < row.len() {
                let idx0 = row[i];
                let cell0 = frame.cell_at_index(idx0);
                if last[idx0] == cell0 {
                    i += 1;
                    continue;
                }
                last[idx0] = cell0;

                self.run_buf.clear();
                self.run_buf.push(cell0.ch);
                let mut run_len: u16 = 1;
                let mut j = i + 1;
                while j < row.len() {
                    let idx1 = row[j];
                    if idx1 != row[j - 1] + 1 {
                        break;
                    }
                    let cell1 = frame.cell_at_index(idx1);
                    if last[idx1] == cell1
                        || cell1.fg != cell0.fg
                        || cell1.bg != cell0.bg
                        || cell1.bold != cell0.bold
                    {
                        break;
                    }
                    self.run_buf.push(cell1.ch);
                    last[idx1] = cell1;
                    run_len = run_len.saturating_add(1);
                    j += 1;
                }

                let x0 = (idx0 % width) as u16;
                if cur_pos != Some((x0, y0)) {
                    self.out.queue(cursor::MoveTo(x0, y0))?;
                }
                pen.apply(&mut self.out, &cell0)?;
                self.out.queue(Print(self.run_buf.as_str()))?;
                let next_x = x0.saturating_add(run_len);
                cur_pos = (next_x < frame.width).then_some((next_x, y0));

                i = j;
            }
            row.clear();
        }
        Ok(())
    }
}

/// Full-screen terminal session. Dropping it restores the terminal.
pub struct Terminal {
    presenter: Presenter<Stdout>,
    quit: Arc<AtomicBool>,
}

impl Terminal {
    pub fn new(quit: Arc<AtomicBool>) -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        tracing::debug!("terminal entered alternate screen");
        Ok(Self {
            presenter: Presenter::new(out),
            quit,
        })
    }
}

impl Screen for Terminal {
    fn pixel_size(&self, unit: u16) -> Result<(u32, u32)> {
        let (cols, rows) = terminal::size()?;
        let unit = u32::from(unit);
        Ok((u32::from(cols) * unit, u32::from(rows) * unit))
    }

    fn present(&mut self, frame: &mut Frame) -> Result<()> {
        self.presenter.present(frame)
    }

    fn poll_events(&mut self) -> Result<Vec<InputEvent>> {
        let mut events = Vec::new();
        if self.quit.load(Ordering::Relaxed) {
            events.push(InputEvent::Quit);
        }
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(k) if k.kind == KeyEventKind::Press => {
                    if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
                        events.push(InputEvent::Quit);
                    } else {
                        events.push(InputEvent::KeyDown(k.code));
                    }
                }
                Event::Resize(w, h) => {
                    tracing::debug!(w, h, "resize ignored");
                }
                _ => {}
            }
        }
        Ok(events)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
        tracing::debug!("terminal restored");
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
