// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{Attribute, ResetColor, SetAttribute},
    terminal, Command, ExecutableCommand,
};
use unicode_width::UnicodeWidthChar;

use crate::frame::Frame;
use crate::palette::{Palette, RainColor};

fn push_command(buf: &mut String, cmd: impl Command) {
    // fmt::Write for String never fails.
    let _ = cmd.write_ansi(buf);
}

/// Turns frame changes into escape sequences and hands them to the
/// underlying writer in a single write per frame.
pub struct FrameWriter<W: Write> {
    out: W,
    palette: Palette,
    buf: String,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(out: W, palette: Palette) -> Self {
        Self {
            out,
            palette,
            buf: String::with_capacity(4096),
        }
    }

    #[cfg(test)]
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Write every pending change in `frame` and clear its dirty set.
    ///
    /// A frame marked dirty-all is repainted from a cleared screen;
    /// otherwise only dirty cells are sent, with horizontally adjacent
    /// cells of one color coalesced into a single print.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        self.buf.clear();
        let mut cur_color: Option<RainColor> = None;
        let mut cur_pos: Option<(u16, u16)> = None;

        if frame.is_dirty_all() {
            push_command(&mut self.buf, terminal::Clear(terminal::ClearType::All));
            for y in 0..frame.height {
                for x in 0..frame.width {
                    let idx = y as usize * frame.width as usize + x as usize;
                    let cell = frame.cell_at_index(idx);
                    if cell.is_blank() {
                        continue;
                    }
                    self.put(x, y, cell.ch, cell.color, &mut cur_pos, &mut cur_color, frame.width);
                }
            }
        } else {
            frame.sort_dirty();
            let width = frame.width as usize;
            for &idx in frame.dirty_indices() {
                if width == 0 {
                    break;
                }
                let x = (idx % width) as u16;
                let y = (idx / width) as u16;
                if y >= frame.height {
                    continue;
                }
                let cell = frame.cell_at_index(idx);
                self.put(x, y, cell.ch, cell.color, &mut cur_pos, &mut cur_color, frame.width);
            }
        }

        frame.clear_dirty();
        if self.buf.is_empty() {
            return Ok(());
        }
        if cur_color.is_some() {
            self.buf.push_str(self.palette.reset());
        }

        self.out.write_all(self.buf.as_bytes())?;
        self.out.flush()
    }

    #[allow(clippy::too_many_arguments)]
    fn put(
        &mut self,
        x: u16,
        y: u16,
        ch: char,
        color: RainColor,
        cur_pos: &mut Option<(u16, u16)>,
        cur_color: &mut Option<RainColor>,
        width: u16,
    ) {
        if *cur_pos != Some((x, y)) {
            push_command(&mut self.buf, cursor::MoveTo(x, y));
        }
        if *cur_color != Some(color) {
            self.buf.push_str(self.palette.escape(color));
            *cur_color = Some(color);
        }
        self.buf.push(ch);

        // Only a single-column glyph leaves the cursor on the next cell.
        let next_x = x.saturating_add(1);
        *cur_pos = match ch.width() {
            Some(1) if next_x < width => Some((next_x, y)),
            _ => None,
        };
    }
}

/// The surface the render loop draws to and reads input from.
pub trait Screen {
    fn draw(&mut self, frame: &mut Frame) -> Result<()>;
    fn poll_event(&mut self, timeout: Duration) -> Result<bool>;
    fn read_event(&mut self) -> Result<event::Event>;
}

/// Owns the real terminal for the lifetime of the animation: raw mode,
/// alternate screen and hidden cursor on creation, all undone on drop.
pub struct Terminal {
    writer: FrameWriter<Stdout>,
}

impl Terminal {
    pub fn new(palette: Palette) -> Result<Self> {
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
        Ok(Self {
            writer: FrameWriter::new(out, palette),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

}

impl Screen for Terminal {
    fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        self.writer.draw(frame)
    }

    fn poll_event(&mut self, timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    fn read_event(&mut self) -> Result<event::Event> {
        event::read()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let out = self.writer.get_mut();
        let _ = out.execute(SetAttribute(Attribute::Reset));
        let _ = out.execute(ResetColor);
        let _ = out.execute(terminal::Clear(terminal::ClearType::All));
        let _ = out.execute(cursor::MoveTo(0, 0));
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::EnableLineWrap);
        let _ = out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = out.flush();
    }
}

/// Put the terminal back into its normal state without an owning
/// [`Terminal`]. Used from the panic hook.
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
