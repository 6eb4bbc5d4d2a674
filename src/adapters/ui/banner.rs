//! Welcome banner: "EMOLENS" in figlet's standard font, shaded top to bottom
//! from violet to pink (the result panel's accent colors).

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rgb(u8, u8, u8);

impl Rgb {
    /// Blend toward `other`; `t = 0` is `self`, `t = 1` is `other`.
    fn mix(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgb(
            channel(self.0, other.0),
            channel(self.1, other.1),
            channel(self.2, other.2),
        )
    }

    fn color(self) -> Color {
        Color::Rgb {
            r: self.0,
            g: self.1,
            b: self.2,
        }
    }
}

const VIOLET: Rgb = Rgb(0x66, 0x7e, 0xea);
const PINK: Rgb = Rgb(0xf0, 0x93, 0xfb);

/// Pair each banner row with its shade. A single row gets the end color.
fn shade_lines(art: &str) -> Vec<(Rgb, &str)> {
    let lines: Vec<&str> = art.lines().collect();
    let last = lines.len().saturating_sub(1);
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let t = if last == 0 { 1.0 } else { i as f64 / last as f64 };
            (VIOLET.mix(PINK, t), line)
        })
        .collect()
}

/// Print the startup banner and version line. Plain text when figlet has no font.
pub fn print_welcome() {
    let art = FIGfont::standard()
        .ok()
        .and_then(|font| font.convert("EMOLENS").map(|fig| fig.to_string()))
        .unwrap_or_else(|| "EMOLENS\n".to_string());

    let mut out = stdout();
    for (shade, line) in shade_lines(&art) {
        let _ = out.execute(SetForegroundColor(shade.color()));
        let _ = out.execute(Print(format!("{}\r\n", line)));
    }
    let _ = out.execute(SetForegroundColor(PINK.color()));
    let _ = out.execute(Print(format!(
        "v{}  multimodal emotion analysis\r\n",
        env!("CARGO_PKG_VERSION")
    )));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
