use kurbo::{Point, Vec2};

use crate::typ::Error;

/// Number of entries in the pen color palette.
pub const PALETTE_SIZE: u8 = 16;

/// Palette index of the background, which is what the eraser draws with.
pub const BACKGROUND: u8 = 0;

/// Size of the drawing area, in turtle steps.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Geometry {
    pub width: f64,
    pub height: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry {
            width: 640.0,
            height: 480.0,
        }
    }
}

/// Something the turtle can draw on.
///
/// Coordinates are turtle coordinates: the origin is in the middle of the drawing area and y
/// points up. The device has a current point, which `move_to` and `line_to` update.
pub trait Device {
    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    fn set_color(&mut self, color: u8);
    fn set_pixel(&mut self, p: Point);
    /// Remember what's under the turtle marker at `p`, and draw the marker.
    fn save_image_under(&mut self, p: Point);
    /// Undo the matching `save_image_under`, without disturbing anything else that was drawn.
    fn restore_image_under(&mut self, p: Point);
    fn clear_viewport(&mut self);
    fn geometry(&self) -> Geometry;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Pen {
    Down,
    Up,
    Erase,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Turtle {
    pub pos: Point,
    /// In degrees, clockwise from north. Always in `[0, 360)`.
    pub heading: f64,
    pub pen: Pen,
    pub color: u8,
    pub visible: bool,
}

impl Default for Turtle {
    fn default() -> Self {
        Turtle {
            pos: Point::ORIGIN,
            heading: 0.0,
            pen: Pen::Down,
            color: PALETTE_SIZE - 1,
            visible: true,
        }
    }
}

fn direction(heading: f64) -> Vec2 {
    Vec2::from_angle((90.0 - heading).to_radians())
}

/// The turtle, together with the device it draws on.
pub struct Screen<D> {
    pub turtle: Turtle,
    pub device: D,
    /// If set, the turtle refuses to leave the drawing area.
    pub fence: bool,
}

impl<D: Device> Screen<D> {
    pub fn new(device: D, fence: bool) -> Self {
        let mut ret = Screen {
            turtle: Turtle::default(),
            device,
            fence,
        };
        ret.device.set_color(ret.turtle.color);
        ret.device.move_to(ret.turtle.pos);
        ret.show_marker();
        ret
    }

    fn hide_marker(&mut self) {
        if self.turtle.visible {
            self.device.restore_image_under(self.turtle.pos);
        }
    }

    fn show_marker(&mut self) {
        if self.turtle.visible {
            self.device.save_image_under(self.turtle.pos);
        }
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        let geom = self.device.geometry();
        // A little slack, so that trigonometric noise doesn't trip the fence at the very edge.
        let eps = 1e-9;
        p.x.abs() <= geom.width / 2.0 + eps && p.y.abs() <= geom.height / 2.0 + eps
    }

    fn check_fence(&self, p: Point) -> Result<(), Error> {
        if self.fence && !self.in_bounds(p) {
            Err(Error::FenceViolation)
        } else {
            Ok(())
        }
    }

    /// Move in a straight line to `target`, drawing according to the pen state.
    pub fn move_to(&mut self, target: Point) -> Result<(), Error> {
        self.check_fence(target)?;
        self.hide_marker();
        match self.turtle.pen {
            Pen::Down => self.device.line_to(target),
            Pen::Up => self.device.move_to(target),
            Pen::Erase => {
                self.device.set_color(BACKGROUND);
                self.device.line_to(target);
                self.device.set_color(self.turtle.color);
            }
        }
        self.turtle.pos = target;
        self.show_marker();
        Ok(())
    }

    pub fn forward(&mut self, dist: f64) -> Result<(), Error> {
        let target = self.turtle.pos + direction(self.turtle.heading) * dist;
        self.move_to(target)
    }

    /// Turn clockwise (negative `degrees` turn anti-clockwise).
    pub fn turn(&mut self, degrees: f64) {
        self.set_heading(self.turtle.heading + degrees);
    }

    pub fn set_heading(&mut self, degrees: f64) {
        self.hide_marker();
        self.turtle.heading = degrees.rem_euclid(360.0);
        self.show_marker();
    }

    pub fn home(&mut self) -> Result<(), Error> {
        self.move_to(Point::ORIGIN)?;
        self.set_heading(0.0);
        Ok(())
    }

    pub fn set_pen(&mut self, pen: Pen) {
        self.turtle.pen = pen;
    }

    pub fn set_color(&mut self, color: u8) {
        self.turtle.color = color;
        self.device.set_color(color);
    }

    pub fn set_visible(&mut self, visible: bool) {
        if visible != self.turtle.visible {
            if visible {
                self.turtle.visible = true;
                self.show_marker();
            } else {
                self.hide_marker();
                self.turtle.visible = false;
            }
        }
    }

    /// Draw a single point, without moving the turtle.
    pub fn dot(&mut self, p: Point) -> Result<(), Error> {
        self.check_fence(p)?;
        self.device.set_pixel(p);
        Ok(())
    }

    /// Erase the drawing, leaving the turtle where it is.
    pub fn clean(&mut self) {
        self.hide_marker();
        self.device.clear_viewport();
        self.device.move_to(self.turtle.pos);
        self.show_marker();
    }

    /// Erase the drawing and send the turtle home, without drawing on the way.
    pub fn clear(&mut self) {
        self.hide_marker();
        self.device.clear_viewport();
        self.turtle.pos = Point::ORIGIN;
        self.turtle.heading = 0.0;
        self.device.move_to(Point::ORIGIN);
        self.show_marker();
    }
}

/// A single call on a [`Recording`] device.
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceOp {
    MoveTo(Point),
    LineTo(Point),
    SetColor(u8),
    SetPixel(Point),
    SaveUnder(Point),
    RestoreUnder(Point),
    Clear,
}

/// A device that just remembers what it was asked to do.
#[derive(Clone, Debug, Default)]
pub struct Recording {
    pub ops: Vec<DeviceOp>,
    pub geometry: Geometry,
}

impl Recording {
    /// The end points of every line drawn so far.
    pub fn lines(&self) -> Vec<Point> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DeviceOp::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect()
    }
}

impl Device for Recording {
    fn move_to(&mut self, p: Point) {
        self.ops.push(DeviceOp::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.ops.push(DeviceOp::LineTo(p));
    }

    fn set_color(&mut self, color: u8) {
        self.ops.push(DeviceOp::SetColor(color));
    }

    fn set_pixel(&mut self, p: Point) {
        self.ops.push(DeviceOp::SetPixel(p));
    }

    fn save_image_under(&mut self, p: Point) {
        self.ops.push(DeviceOp::SaveUnder(p));
    }

    fn restore_image_under(&mut self, p: Point) {
        self.ops.push(DeviceOp::RestoreUnder(p));
    }

    fn clear_viewport(&mut self) {
        self.ops.push(DeviceOp::Clear);
    }

    fn geometry(&self) -> Geometry {
        self.geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(p: Point, x: f64, y: f64) {
        assert!((p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9, "{p:?}");
    }

    #[test]
    fn square() {
        let mut screen = Screen::new(Recording::default(), true);
        for _ in 0..4 {
            screen.forward(50.0).unwrap();
            screen.turn(90.0);
        }
        let lines = screen.device.lines();
        assert_eq!(lines.len(), 4);
        assert_near(lines[0], 0.0, 50.0);
        assert_near(lines[1], 50.0, 50.0);
        assert_near(lines[2], 50.0, 0.0);
        assert_near(lines[3], 0.0, 0.0);
        assert_eq!(screen.turtle.heading, 0.0);
    }

    #[test]
    fn fence() {
        let mut screen = Screen::new(Recording::default(), true);
        assert_eq!(screen.forward(240.0), Ok(()));
        assert_eq!(screen.forward(1.0), Err(Error::FenceViolation));
        assert_near(screen.turtle.pos, 0.0, 240.0);

        screen.fence = false;
        assert_eq!(screen.forward(1.0), Ok(()));
    }

    #[test]
    fn pen_modes() {
        let mut screen = Screen::new(Recording::default(), true);
        screen.set_visible(false);
        screen.device.ops.clear();

        screen.set_pen(Pen::Up);
        screen.forward(10.0).unwrap();
        screen.set_pen(Pen::Erase);
        screen.forward(10.0).unwrap();
        assert_eq!(screen.device.ops.len(), 4);
        assert!(matches!(screen.device.ops[0], DeviceOp::MoveTo(_)));
        assert_eq!(screen.device.ops[1], DeviceOp::SetColor(BACKGROUND));
        assert!(matches!(screen.device.ops[2], DeviceOp::LineTo(_)));
        assert_eq!(screen.device.ops[3], DeviceOp::SetColor(15));
    }

    #[test]
    fn headings_wrap() {
        let mut screen = Screen::new(Recording::default(), true);
        screen.turn(-90.0);
        assert_eq!(screen.turtle.heading, 270.0);
        screen.turn(450.0);
        assert_eq!(screen.turtle.heading, 0.0);
    }
}
