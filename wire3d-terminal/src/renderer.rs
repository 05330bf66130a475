/// ASCII presenter: turns a canvas into terminal characters
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use wire3d_core::{Canvas, Pixel};

/// Character luminosity ramp (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Maps blocks of canvas pixels onto a grid of terminal cells.
///
/// Each cell covers `cell_width x cell_height` pixels and shows their mean
/// luminance through the ramp.
pub struct AsciiPresenter {
    columns: usize,
    rows: usize,
    cell_width: usize,
    cell_height: usize,
    char_buffer: Vec<char>,
}

impl AsciiPresenter {
    pub fn new(columns: usize, rows: usize, cell_width: usize, cell_height: usize) -> Self {
        Self {
            columns,
            rows,
            cell_width: cell_width.max(1),
            cell_height: cell_height.max(1),
            char_buffer: vec![' '; columns * rows],
        }
    }

    /// Canvas size that exactly covers the terminal grid.
    pub fn canvas_size(&self) -> (usize, usize) {
        (self.columns * self.cell_width, self.rows * self.cell_height)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Ramp character for a luminance in [0, 1].
    pub fn ramp_char(luminance: f32) -> char {
        let index = (luminance.clamp(0.0, 1.0) * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
        LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
    }

    /// Resample `canvas` into the character buffer.
    pub fn capture<P: Pixel>(&mut self, canvas: &Canvas<P>) {
        for row in 0..self.rows {
            for column in 0..self.columns {
                let mut sum = 0.0;
                let mut count = 0;
                for y in row * self.cell_height..(row + 1) * self.cell_height {
                    for x in column * self.cell_width..(column + 1) * self.cell_width {
                        if let Some(pixel) = canvas.pixel(x, y) {
                            sum += pixel.luminance();
                            count += 1;
                        }
                    }
                }
                let mean = if count > 0 { sum / count as f32 } else { 0.0 };
                self.char_buffer[row * self.columns + column] = Self::ramp_char(mean);
            }
        }
    }

    pub fn line(&self, row: usize) -> String {
        self.char_buffer[row * self.columns..(row + 1) * self.columns]
            .iter()
            .collect()
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for row in 0..self.rows {
            for column in 0..self.columns {
                let c = self.char_buffer[row * self.columns + column];

                // Color based on character intensity
                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '#' | '%' | '@' => Color::Cyan,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if row + 1 < self.rows {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}
