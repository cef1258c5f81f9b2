//! The text console (spec §4.6 collaborator, spec §6 control-byte
//! contract): an 80x25 grid of `(glyph, attribute)` cells and the cursor
//! movement rules `console_putchar`/`console_scroll`/`console_clear` define.
//! The real VGA text-mode buffer and its memory-mapped address are an
//! external collaborator; `TextConsole` is the reference implementation a
//! host build or test wires up instead.
#![no_std]

use nanokernel_abi::limits::{CONSOLE_ATTR_DEFAULT, CONSOLE_HEIGHT, CONSOLE_WIDTH};

/// A destination for kernel text output: the shell's only window onto the
/// world, matching spec §1/§6's collaborator interface exactly. Requiring
/// `core::fmt::Write` lets callers format statistics straight into it with
/// `write!`/`writeln!` instead of hand-rolled `itoa`-style conversions.
pub trait Console: core::fmt::Write {
    fn put_char(&mut self, c: u8);
    fn clear(&mut self);
    fn scroll(&mut self);

    fn puts(&mut self, s: &str) {
        for byte in s.bytes() {
            self.put_char(byte);
        }
    }
}

/// Reference console: an in-memory 80x25 grid, cursor-tracked, matching the
/// original `console_putchar` byte-for-byte (newline scrolls, tab aligns to
/// the next multiple of 8 and wraps, backspace steps back one cell — even
/// across a line — and blanks it). Bytes below `0x20` other than those three
/// are opaque: written as an ordinary glyph, per spec §6.
pub struct TextConsole {
    cells: [(u8, u8); CONSOLE_WIDTH * CONSOLE_HEIGHT],
    cursor_x: usize,
    cursor_y: usize,
}

impl TextConsole {
    pub const fn new() -> Self {
        Self {
            cells: [(b' ', CONSOLE_ATTR_DEFAULT); CONSOLE_WIDTH * CONSOLE_HEIGHT],
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_x, self.cursor_y)
    }

    /// Glyph byte at `(x, y)`, or `b' '` out of range.
    pub fn glyph_at(&self, x: usize, y: usize) -> u8 {
        if x >= CONSOLE_WIDTH || y >= CONSOLE_HEIGHT {
            return b' ';
        }
        self.cells[y * CONSOLE_WIDTH + x].0
    }

    /// Render row `y` as text, trailing spaces included.
    pub fn row(&self, y: usize, buf: &mut [u8; CONSOLE_WIDTH]) {
        for x in 0..CONSOLE_WIDTH {
            buf[x] = self.glyph_at(x, y);
        }
    }

    fn write_cell(&mut self, x: usize, y: usize, c: u8) {
        self.cells[y * CONSOLE_WIDTH + x] = (c, CONSOLE_ATTR_DEFAULT);
    }

    fn newline(&mut self) {
        self.cursor_y += 1;
        self.cursor_x = 0;
        if self.cursor_y >= CONSOLE_HEIGHT {
            self.cursor_y = CONSOLE_HEIGHT - 1;
            self.scroll();
        }
    }

    pub fn scroll(&mut self) {
        for i in 0..(CONSOLE_HEIGHT - 1) * CONSOLE_WIDTH {
            self.cells[i] = self.cells[i + CONSOLE_WIDTH];
        }
        for i in (CONSOLE_HEIGHT - 1) * CONSOLE_WIDTH..CONSOLE_HEIGHT * CONSOLE_WIDTH {
            self.cells[i] = (b' ', CONSOLE_ATTR_DEFAULT);
        }
    }

    pub fn clear(&mut self) {
        self.cells = [(b' ', CONSOLE_ATTR_DEFAULT); CONSOLE_WIDTH * CONSOLE_HEIGHT];
        self.cursor_x = 0;
        self.cursor_y = 0;
    }
}

impl Default for TextConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TextConsole {
    fn clear(&mut self) {
        TextConsole::clear(self)
    }

    fn scroll(&mut self) {
        TextConsole::scroll(self)
    }

    fn put_char(&mut self, c: u8) {
        if c == b'\n' {
            self.newline();
            return;
        }

        if c == 0x08 {
            if self.cursor_x > 0 {
                self.cursor_x -= 1;
                self.write_cell(self.cursor_x, self.cursor_y, b' ');
            } else if self.cursor_y > 0 {
                self.cursor_y -= 1;
                self.cursor_x = CONSOLE_WIDTH - 1;
                self.write_cell(self.cursor_x, self.cursor_y, b' ');
            }
            return;
        }

        if c == b'\t' {
            self.cursor_x = (self.cursor_x + 8) & !7;
            if self.cursor_x >= CONSOLE_WIDTH {
                self.newline();
            }
            return;
        }

        if self.cursor_x >= CONSOLE_WIDTH {
            self.newline();
        }
        self.write_cell(self.cursor_x, self.cursor_y, c);
        self.cursor_x += 1;
    }
}

impl core::fmt::Write for TextConsole {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.puts(s);
        Ok(())
    }
}
