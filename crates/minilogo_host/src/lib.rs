use std::io::{self, BufRead, Read as _, Write as _};
use std::path::Path;

use kurbo::{Affine, BezPath, Point};
use minilogo::{Console, Device, Geometry};
use svg::node::element::{Circle, Path as SvgPath, Rectangle};
use svg::Document;
use termion::{event::Key, raw::IntoRawMode};

/// The sixteen pen colors, indexed by palette number.
pub const PALETTE: [&str; 16] = [
    "black",
    "blue",
    "green",
    "cyan",
    "red",
    "magenta",
    "brown",
    "lightgray",
    "gray",
    "lightblue",
    "lightgreen",
    "lightcyan",
    "salmon",
    "violet",
    "yellow",
    "white",
];

fn color_name(color: u8) -> &'static str {
    PALETTE
        .get(usize::from(color))
        .copied()
        .unwrap_or(PALETTE[PALETTE.len() - 1])
}

#[derive(Clone, Debug)]
struct Stroke {
    color: u8,
    path: BezPath,
    end: Point,
}

/// Collects the turtle's drawing, to be written out as SVG at the end.
#[derive(Clone, Debug)]
pub struct SvgDevice {
    geometry: Geometry,
    strokes: Vec<Stroke>,
    dots: Vec<(u8, Point)>,
    color: u8,
    current: Point,
    marker: Option<(u8, Point)>,
}

impl SvgDevice {
    pub fn new(geometry: Geometry) -> SvgDevice {
        SvgDevice {
            geometry,
            strokes: Vec::new(),
            dots: Vec::new(),
            color: 0,
            current: Point::ORIGIN,
            marker: None,
        }
    }

    /// Everything drawn so far. The turtle marker is included if it's showing.
    pub fn to_document(&self) -> Document {
        let Geometry { width, height } = self.geometry;
        // Turtle coordinates are y-up, SVG is y-down.
        let flip = Affine::FLIP_Y;
        let mut doc = Document::new()
            .set("viewBox", (-width / 2.0, -height / 2.0, width, height))
            .set("width", width)
            .set("height", height)
            .add(
                Rectangle::new()
                    .set("x", -width / 2.0)
                    .set("y", -height / 2.0)
                    .set("width", width)
                    .set("height", height)
                    .set("fill", color_name(minilogo::turtle::BACKGROUND)),
            );
        for stroke in &self.strokes {
            let path = flip * stroke.path.clone();
            doc = doc.add(
                SvgPath::new()
                    .set("fill", "none")
                    .set("stroke", color_name(stroke.color))
                    .set("stroke-width", 1)
                    .set("d", path.to_svg()),
            );
        }
        for &(color, p) in &self.dots {
            let p = flip * p;
            doc = doc.add(
                Rectangle::new()
                    .set("x", p.x)
                    .set("y", p.y)
                    .set("width", 1)
                    .set("height", 1)
                    .set("fill", color_name(color)),
            );
        }
        if let Some((color, p)) = self.marker {
            let p = flip * p;
            doc = doc.add(
                Circle::new()
                    .set("cx", p.x)
                    .set("cy", p.y)
                    .set("r", 4)
                    .set("fill", "none")
                    .set("stroke", color_name(color)),
            );
        }
        doc
    }

    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        svg::save(path, &self.to_document())
    }
}

impl Device for SvgDevice {
    fn move_to(&mut self, p: Point) {
        self.current = p;
    }

    fn line_to(&mut self, p: Point) {
        match self.strokes.last_mut() {
            Some(s) if s.color == self.color && s.end == self.current => {
                s.path.line_to(p);
                s.end = p;
            }
            _ => {
                let mut path = BezPath::new();
                path.move_to(self.current);
                path.line_to(p);
                self.strokes.push(Stroke {
                    color: self.color,
                    path,
                    end: p,
                });
            }
        }
        self.current = p;
    }

    fn set_color(&mut self, color: u8) {
        self.color = color;
    }

    fn set_pixel(&mut self, p: Point) {
        self.dots.push((self.color, p));
    }

    fn save_image_under(&mut self, p: Point) {
        self.marker = Some((self.color, p));
    }

    fn restore_image_under(&mut self, _p: Point) {
        self.marker = None;
    }

    fn clear_viewport(&mut self) {
        self.strokes.clear();
        self.dots.clear();
    }

    fn geometry(&self) -> Geometry {
        self.geometry
    }
}

enum Input {
    /// An interactive terminal on stdin.
    Terminal,
    /// A script, which also supplies the answers to any questions.
    Script(Box<dyn BufRead>),
}

/// A console on the real terminal, or reading from a script.
pub struct TermConsole {
    input: Input,
    max_line: usize,
}

impl TermConsole {
    pub fn terminal(max_line: usize) -> TermConsole {
        TermConsole {
            input: Input::Terminal,
            max_line,
        }
    }

    pub fn script(input: impl BufRead + 'static, max_line: usize) -> TermConsole {
        TermConsole {
            input: Input::Script(Box::new(input)),
            max_line,
        }
    }

    fn raw_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let len = match &mut self.input {
            Input::Terminal => io::stdin().read_line(&mut line)?,
            Input::Script(r) => r.read_line(&mut line)?,
        };
        if len == 0 {
            return Ok(None);
        }
        let line = line.trim_end_matches(&['\n', '\r'][..]);
        if line.chars().count() > self.max_line {
            log::warn!("line truncated to {} characters", self.max_line);
            return Ok(Some(line.chars().take(self.max_line).collect()));
        }
        Ok(Some(line.to_owned()))
    }
}

fn read_raw_key() -> io::Result<Option<Key>> {
    use termion::input::TermRead;

    let _raw = io::stdout().into_raw_mode()?;
    io::stdin().lock().keys().next().transpose()
}

impl Console for TermConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if let Input::Terminal = self.input {
            print!("{prompt}");
            io::stdout().flush()?;
        }
        self.raw_line()
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        if let Input::Script(_) = self.input {
            let answer = self.raw_line()?;
            log::debug!("{question} {answer:?}");
            return Ok(answer.map_or(false, |a| a.trim_start().starts_with(&['y', 'Y'][..])));
        }

        print!("{question} (y/n) ");
        io::stdout().flush()?;
        loop {
            match read_raw_key()? {
                Some(Key::Char('y' | 'Y')) => {
                    println!("y");
                    return Ok(true);
                }
                Some(Key::Char('n' | 'N')) | Some(Key::Esc) | None => {
                    println!("n");
                    return Ok(false);
                }
                _ => {}
            }
        }
    }

    fn read_key(&mut self) -> io::Result<Option<char>> {
        match &mut self.input {
            Input::Script(r) => {
                let mut byte = [0u8];
                Ok(match r.read(&mut byte)? {
                    0 => None,
                    _ => Some(char::from(byte[0])),
                })
            }
            Input::Terminal => loop {
                match read_raw_key()? {
                    Some(Key::Char(c)) => return Ok(Some(c)),
                    Some(Key::Ctrl('d')) | None => return Ok(None),
                    _ => {}
                }
            },
        }
    }

    fn print(&mut self, text: &str) {
        println!("{text}");
    }
}
