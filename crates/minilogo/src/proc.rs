//! The built-in operations.
//!
//! Each primitive takes its own inputs from the front of the caller's buffer, so that (for
//! example) `SAVE` can grab the rest of the line unevaluated while `SUM` evaluates exactly two
//! inputs.

use kurbo::Point;
use rand::Rng as _;

use crate::{
    args::Arity,
    console::Console,
    define::valid_identifier,
    env::{Env, Scope},
    eval::{Flow, Step},
    token::{parse_number, Buffer},
    turtle::{Device, Pen, PALETTE_SIZE},
    typ::{format_num, Error, Value},
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Motion {
    Forward,
    Back,
    Left,
    Right,
    SetPos,
    SetHeading,
    SetX,
    SetY,
    Home,
    Dot,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PenOp {
    Up,
    Down,
    Erase,
    Reverse,
    SetColor,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScreenOp {
    Clear,
    Clean,
    ShowTurtle,
    HideTurtle,
    Fence,
    Window,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Query {
    Heading,
    Pos,
    XCor,
    YCor,
    PenColor,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Math {
    Sum,
    Difference,
    Product,
    Quotient,
    Sqrt,
    Round,
    Int,
    Random,
    EqualP,
    LessP,
    GreaterP,
    List,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Control {
    Make,
    Local,
    Repeat,
    If,
    IfElse,
    Run,
    Stop,
    Output,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Text {
    Print,
    Show,
    ReadChar,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SessionOp {
    Pots,
    Po,
    Erase,
    Save,
    Load,
    Quit,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Primitive {
    Motion(Motion),
    Pen(PenOp),
    Screen(ScreenOp),
    Query(Query),
    Math(Math),
    Control(Control),
    Text(Text),
    Session(SessionOp),
}

// Canonical names come before their abbreviations.
static PRIMITIVES: &[(&str, Primitive)] = &[
    ("FORWARD", Primitive::Motion(Motion::Forward)),
    ("FD", Primitive::Motion(Motion::Forward)),
    ("BACK", Primitive::Motion(Motion::Back)),
    ("BK", Primitive::Motion(Motion::Back)),
    ("LEFT", Primitive::Motion(Motion::Left)),
    ("LT", Primitive::Motion(Motion::Left)),
    ("RIGHT", Primitive::Motion(Motion::Right)),
    ("RT", Primitive::Motion(Motion::Right)),
    ("SETPOS", Primitive::Motion(Motion::SetPos)),
    ("SETHEADING", Primitive::Motion(Motion::SetHeading)),
    ("SETH", Primitive::Motion(Motion::SetHeading)),
    ("SETX", Primitive::Motion(Motion::SetX)),
    ("SETY", Primitive::Motion(Motion::SetY)),
    ("HOME", Primitive::Motion(Motion::Home)),
    ("DOT", Primitive::Motion(Motion::Dot)),
    ("PENUP", Primitive::Pen(PenOp::Up)),
    ("PU", Primitive::Pen(PenOp::Up)),
    ("PENDOWN", Primitive::Pen(PenOp::Down)),
    ("PD", Primitive::Pen(PenOp::Down)),
    ("PENERASE", Primitive::Pen(PenOp::Erase)),
    ("PE", Primitive::Pen(PenOp::Erase)),
    ("PENREVERSE", Primitive::Pen(PenOp::Reverse)),
    ("PX", Primitive::Pen(PenOp::Reverse)),
    ("SETPENCOLOR", Primitive::Pen(PenOp::SetColor)),
    ("SETPC", Primitive::Pen(PenOp::SetColor)),
    ("CLEARSCREEN", Primitive::Screen(ScreenOp::Clear)),
    ("CS", Primitive::Screen(ScreenOp::Clear)),
    ("CLEAN", Primitive::Screen(ScreenOp::Clean)),
    ("SHOWTURTLE", Primitive::Screen(ScreenOp::ShowTurtle)),
    ("ST", Primitive::Screen(ScreenOp::ShowTurtle)),
    ("HIDETURTLE", Primitive::Screen(ScreenOp::HideTurtle)),
    ("HT", Primitive::Screen(ScreenOp::HideTurtle)),
    ("FENCE", Primitive::Screen(ScreenOp::Fence)),
    ("WINDOW", Primitive::Screen(ScreenOp::Window)),
    ("HEADING", Primitive::Query(Query::Heading)),
    ("POS", Primitive::Query(Query::Pos)),
    ("XCOR", Primitive::Query(Query::XCor)),
    ("YCOR", Primitive::Query(Query::YCor)),
    ("PENCOLOR", Primitive::Query(Query::PenColor)),
    ("PC", Primitive::Query(Query::PenColor)),
    ("SUM", Primitive::Math(Math::Sum)),
    ("DIFFERENCE", Primitive::Math(Math::Difference)),
    ("PRODUCT", Primitive::Math(Math::Product)),
    ("QUOTIENT", Primitive::Math(Math::Quotient)),
    ("SQRT", Primitive::Math(Math::Sqrt)),
    ("ROUND", Primitive::Math(Math::Round)),
    ("INT", Primitive::Math(Math::Int)),
    ("RANDOM", Primitive::Math(Math::Random)),
    ("EQUALP", Primitive::Math(Math::EqualP)),
    ("LESSP", Primitive::Math(Math::LessP)),
    ("GREATERP", Primitive::Math(Math::GreaterP)),
    ("LIST", Primitive::Math(Math::List)),
    ("MAKE", Primitive::Control(Control::Make)),
    ("LOCAL", Primitive::Control(Control::Local)),
    ("REPEAT", Primitive::Control(Control::Repeat)),
    ("IF", Primitive::Control(Control::If)),
    ("IFELSE", Primitive::Control(Control::IfElse)),
    ("RUN", Primitive::Control(Control::Run)),
    ("STOP", Primitive::Control(Control::Stop)),
    ("OUTPUT", Primitive::Control(Control::Output)),
    ("PRINT", Primitive::Text(Text::Print)),
    ("PR", Primitive::Text(Text::Print)),
    ("SHOW", Primitive::Text(Text::Show)),
    ("READCHAR", Primitive::Text(Text::ReadChar)),
    ("RC", Primitive::Text(Text::ReadChar)),
    ("POTS", Primitive::Session(SessionOp::Pots)),
    ("PO", Primitive::Session(SessionOp::Po)),
    ("ERASE", Primitive::Session(SessionOp::Erase)),
    ("ER", Primitive::Session(SessionOp::Erase)),
    ("SAVE", Primitive::Session(SessionOp::Save)),
    ("LOAD", Primitive::Session(SessionOp::Load)),
    ("QUIT", Primitive::Session(SessionOp::Quit)),
    ("BYE", Primitive::Session(SessionOp::Quit)),
];

impl Primitive {
    pub fn lookup(name: &str) -> Option<Primitive> {
        PRIMITIVES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, p)| p)
    }

    /// The canonical name, as used in error messages.
    pub fn name(self) -> &'static str {
        PRIMITIVES
            .iter()
            .find(|(_, p)| *p == self)
            .map_or("?", |&(n, _)| n)
    }
}

fn bad_arg(prim: Primitive, arg: &Value) -> Error {
    Error::BadArgument {
        proc: prim.name().to_owned(),
        arg: arg.clone(),
    }
}

fn num(prim: Primitive, v: &Value) -> Result<f64, Error> {
    v.as_num().ok_or_else(|| bad_arg(prim, v))
}

/// An integer in `min..=max`.
fn int(prim: Primitive, v: &Value, min: f64, max: f64) -> Result<i64, Error> {
    let x = num(prim, v)?;
    if x.trunc() != x || x < min || x > max {
        return Err(bad_arg(prim, v));
    }
    Ok(x as i64)
}

fn boolean(prim: Primitive, v: &Value) -> Result<bool, Error> {
    v.as_bool().ok_or_else(|| bad_arg(prim, v))
}

fn list(prim: Primitive, v: &Value) -> Result<&str, Error> {
    v.as_list().ok_or_else(|| bad_arg(prim, v))
}

/// A list of exactly two numbers.
fn point(prim: Primitive, v: &Value) -> Result<Point, Error> {
    let coords: Option<Vec<f64>> = list(prim, v)?
        .split_whitespace()
        .map(parse_number)
        .collect();
    match coords.as_deref() {
        Some(&[x, y]) => Ok(Point::new(x, y)),
        _ => Err(bad_arg(prim, v)),
    }
}

/// A word that can name a variable or procedure.
fn name(prim: Primitive, v: &Value) -> Result<String, Error> {
    let w = v.as_word().ok_or_else(|| bad_arg(prim, v))?;
    if valid_identifier(w) {
        Ok(w.to_owned())
    } else {
        Err(Error::InvalidIdentifier { name: w.to_owned() })
    }
}

/// The file name taken by `SAVE` and `LOAD`: the rest of the line, with an optional quote.
fn file_name(v: &Value) -> String {
    let s = v.print_form().trim();
    s.strip_prefix('"').unwrap_or(s).to_owned()
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_num(), b.as_num()) {
        (Some(x), Some(y)) => x == y,
        _ => a.to_string().eq_ignore_ascii_case(&b.to_string()),
    }
}

impl<D: Device, C: Console> Env<D, C> {
    fn input(&mut self, buf: &mut Buffer, scope: &mut Scope, prim: Primitive) -> Step<Value> {
        self.resolve_one(buf, scope, prim.name())
    }

    fn inputs2(
        &mut self,
        buf: &mut Buffer,
        scope: &mut Scope,
        prim: Primitive,
    ) -> Step<(Value, Value)> {
        let a = self.input(buf, scope, prim)?;
        let b = self.input(buf, scope, prim)?;
        Ok((a, b))
    }

    /// Run a primitive, taking its inputs from `buf`.
    pub(crate) fn dispatch(
        &mut self,
        prim: Primitive,
        buf: &mut Buffer,
        scope: &mut Scope,
    ) -> Step<Option<Value>> {
        log::debug!("primitive {}", prim.name());
        match prim {
            Primitive::Motion(m) => self.motion(prim, m, buf, scope).map(|()| None),
            Primitive::Pen(p) => self.pen(prim, p, buf, scope).map(|()| None),
            Primitive::Screen(s) => {
                self.screen_op(s);
                Ok(None)
            }
            Primitive::Query(q) => Ok(Some(self.query(q))),
            Primitive::Math(m) => self.math(prim, m, buf, scope).map(Some),
            Primitive::Control(c) => self.control(prim, c, buf, scope),
            Primitive::Text(t) => self.text(prim, t, buf, scope),
            Primitive::Session(s) => self.session_op(prim, s, buf, scope).map(|()| None),
        }
    }

    fn motion(
        &mut self,
        prim: Primitive,
        m: Motion,
        buf: &mut Buffer,
        scope: &mut Scope,
    ) -> Step<()> {
        match m {
            Motion::Forward | Motion::Back => {
                let dist = num(prim, &self.input(buf, scope, prim)?)?;
                let dist = if m == Motion::Back { -dist } else { dist };
                self.screen.forward(dist)?;
            }
            Motion::Left | Motion::Right => {
                let angle = num(prim, &self.input(buf, scope, prim)?)?;
                self.screen.turn(if m == Motion::Left { -angle } else { angle });
            }
            Motion::SetPos => {
                let p = point(prim, &self.input(buf, scope, prim)?)?;
                self.screen.move_to(p)?;
            }
            Motion::SetHeading => {
                let h = num(prim, &self.input(buf, scope, prim)?)?;
                self.screen.set_heading(h);
            }
            Motion::SetX | Motion::SetY => {
                let c = num(prim, &self.input(buf, scope, prim)?)?;
                let pos = self.screen.turtle.pos;
                let target = if m == Motion::SetX {
                    Point::new(c, pos.y)
                } else {
                    Point::new(pos.x, c)
                };
                self.screen.move_to(target)?;
            }
            Motion::Home => self.screen.home()?,
            Motion::Dot => {
                let p = point(prim, &self.input(buf, scope, prim)?)?;
                self.screen.dot(p)?;
            }
        }
        Ok(())
    }

    fn pen(
        &mut self,
        prim: Primitive,
        p: PenOp,
        buf: &mut Buffer,
        scope: &mut Scope,
    ) -> Step<()> {
        match p {
            PenOp::Up => self.screen.set_pen(Pen::Up),
            PenOp::Down => self.screen.set_pen(Pen::Down),
            PenOp::Erase => self.screen.set_pen(Pen::Erase),
            PenOp::Reverse => {
                return Err(Error::Unsupported {
                    what: prim.name().to_owned(),
                }
                .into())
            }
            PenOp::SetColor => {
                let max = f64::from(PALETTE_SIZE - 1);
                let val = self.input(buf, scope, prim)?;
                let color = int(prim, &val, 0.0, max)?;
                let color = u8::try_from(color).map_err(|_| bad_arg(prim, &val))?;
                self.screen.set_color(color);
            }
        }
        Ok(())
    }

    fn screen_op(&mut self, s: ScreenOp) {
        match s {
            ScreenOp::Clear => self.screen.clear(),
            ScreenOp::Clean => self.screen.clean(),
            ScreenOp::ShowTurtle => self.screen.set_visible(true),
            ScreenOp::HideTurtle => self.screen.set_visible(false),
            ScreenOp::Fence => self.screen.fence = true,
            ScreenOp::Window => self.screen.fence = false,
        }
    }

    fn query(&self, q: Query) -> Value {
        let turtle = &self.screen.turtle;
        match q {
            Query::Heading => Value::num(turtle.heading),
            Query::Pos => Value::List(format!(
                "{} {}",
                format_num(turtle.pos.x),
                format_num(turtle.pos.y)
            )),
            Query::XCor => Value::num(turtle.pos.x),
            Query::YCor => Value::num(turtle.pos.y),
            Query::PenColor => Value::num(f64::from(turtle.color)),
        }
    }

    fn math(
        &mut self,
        prim: Primitive,
        m: Math,
        buf: &mut Buffer,
        scope: &mut Scope,
    ) -> Step<Value> {
        let val = match m {
            Math::Sqrt | Math::Round | Math::Int | Math::Random => {
                let a = self.input(buf, scope, prim)?;
                let x = num(prim, &a)?;
                match m {
                    Math::Sqrt if x < 0.0 => return Err(bad_arg(prim, &a).into()),
                    Math::Sqrt => Value::num(x.sqrt()),
                    Math::Round => Value::num(x.round()),
                    Math::Int => Value::num(x.trunc()),
                    _ => {
                        let n = int(prim, &a, 1.0, i64::MAX as f64)?;
                        Value::num(rand::thread_rng().gen_range(0..n) as f64)
                    }
                }
            }
            Math::EqualP => {
                let (a, b) = self.inputs2(buf, scope, prim)?;
                Value::boolean(values_equal(&a, &b))
            }
            Math::List => {
                let (a, b) = self.inputs2(buf, scope, prim)?;
                Value::List(format!("{a} {b}"))
            }
            _ => {
                let (a, b) = self.inputs2(buf, scope, prim)?;
                let (x, y) = (num(prim, &a)?, num(prim, &b)?);
                match m {
                    Math::Sum => Value::num(x + y),
                    Math::Difference => Value::num(x - y),
                    Math::Product => Value::num(x * y),
                    Math::Quotient if y == 0.0 => return Err(bad_arg(prim, &b).into()),
                    Math::Quotient => Value::num(x / y),
                    Math::LessP => Value::boolean(x < y),
                    _ => Value::boolean(x > y),
                }
            }
        };
        Ok(val)
    }

    fn control(
        &mut self,
        prim: Primitive,
        c: Control,
        buf: &mut Buffer,
        scope: &mut Scope,
    ) -> Step<Option<Value>> {
        match c {
            Control::Make => {
                let (var, val) = self.inputs2(buf, scope, prim)?;
                let var = name(prim, &var)?;
                self.make(scope, &var, val);
                Ok(None)
            }
            Control::Local => {
                let var = name(prim, &self.input(buf, scope, prim)?)?;
                if scope.contains(&var) {
                    return Err(Error::DuplicateLocal { name: var }.into());
                }
                scope.define(&var, Value::empty());
                Ok(None)
            }
            Control::Repeat => {
                let (count, body) = self.inputs2(buf, scope, prim)?;
                let count = int(prim, &count, 0.0, u32::MAX as f64)?;
                let body = list(prim, &body)?;
                let mut produced = Vec::new();
                for _ in 0..count {
                    produced.extend(self.run_list(body, scope)?);
                }
                Ok(Value::collect(produced))
            }
            Control::If => {
                let (cond, body) = self.inputs2(buf, scope, prim)?;
                let body = list(prim, &body)?;
                if boolean(prim, &cond)? {
                    Ok(Value::collect(self.run_list(body, scope)?))
                } else {
                    Ok(None)
                }
            }
            Control::IfElse => {
                let (cond, yes) = self.inputs2(buf, scope, prim)?;
                let no = self.input(buf, scope, prim)?;
                let body = if boolean(prim, &cond)? { &yes } else { &no };
                let body = list(prim, body)?;
                Ok(Value::collect(self.run_list(body, scope)?))
            }
            Control::Run => {
                let body = self.input(buf, scope, prim)?;
                Ok(Value::collect(self.run_list(body.print_form(), scope)?))
            }
            Control::Stop => Err(Flow::Stop),
            Control::Output => {
                let val = self.input(buf, scope, prim)?;
                Err(Flow::Output(val))
            }
        }
    }

    fn text(
        &mut self,
        prim: Primitive,
        t: Text,
        buf: &mut Buffer,
        scope: &mut Scope,
    ) -> Step<Option<Value>> {
        match t {
            Text::Print => {
                let val = self.input(buf, scope, prim)?;
                self.console.print(val.print_form());
                Ok(None)
            }
            Text::Show => {
                let val = self.input(buf, scope, prim)?;
                self.console.print(&val.to_string());
                Ok(None)
            }
            Text::ReadChar => {
                let key = self.console.read_key()?;
                Ok(Some(key.map_or_else(Value::empty, Value::word)))
            }
        }
    }

    fn session_op(
        &mut self,
        prim: Primitive,
        s: SessionOp,
        buf: &mut Buffer,
        scope: &mut Scope,
    ) -> Step<()> {
        match s {
            SessionOp::Pots => {
                let titles: Vec<String> = self.procs.list().map(|r| r.payload.title()).collect();
                for title in titles {
                    self.console.print(&title);
                }
            }
            SessionOp::Po => {
                let proc = name(prim, &self.input(buf, scope, prim)?)?;
                let Some(text) = self.procs.lookup(&proc).map(|p| p.text()) else {
                    return Err(Error::UnknownCommand { name: proc }.into());
                };
                self.console.print(text.trim_end());
            }
            SessionOp::Erase => {
                let proc = name(prim, &self.input(buf, scope, prim)?)?;
                if !self.procs.remove(&proc) {
                    return Err(Error::EraseFailure { name: proc }.into());
                }
                log::debug!("erased {proc}");
                self.unsaved = true;
            }
            SessionOp::Save | SessionOp::Load => {
                let rest = self.resolve(Arity::Rest, buf, scope, prim.name())?;
                let file = rest.first().map(file_name).unwrap_or_default();
                if s == SessionOp::Save {
                    let count = self.save_procs(&file)?;
                    self.console
                        .print(&format!("Saved {count} procedures to {file}"));
                } else {
                    self.offer_save()?;
                    let count = self.load_procs(&file)?;
                    self.console
                        .print(&format!("Loaded {count} procedures from {file}"));
                }
            }
            SessionOp::Quit => {
                self.offer_save()?;
                self.quit = true;
                return Err(Flow::Quit);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        console::ScriptConsole,
        turtle::{DeviceOp, Recording},
    };

    use super::*;

    type TestEnv = Env<Recording, ScriptConsole>;

    fn env() -> TestEnv {
        Env::new(
            Recording::default(),
            ScriptConsole::default(),
            Default::default(),
        )
    }

    fn words(ws: &[&str]) -> Vec<Value> {
        ws.iter().map(|w| Value::word(*w)).collect()
    }

    #[test]
    fn aliases() {
        assert_eq!(Primitive::lookup("fd"), Primitive::lookup("FORWARD"));
        assert_eq!(Primitive::lookup("Fd").unwrap().name(), "FORWARD");
        assert_eq!(Primitive::lookup("BYE").unwrap().name(), "QUIT");
        assert_eq!(Primitive::lookup("FROB"), None);
    }

    #[test]
    fn arithmetic() {
        let mut env = env();
        assert_eq!(
            env.evaluate("SUM 2 3 DIFFERENCE 10 4 PRODUCT 2 2.5 QUOTIENT 1 4")
                .unwrap(),
            words(&["5", "6", "5", "0.25"])
        );
        assert_eq!(
            env.evaluate("SQRT 16 ROUND 2.5 INT -2.7").unwrap(),
            words(&["4", "3", "-2"])
        );
        assert_eq!(
            env.evaluate("QUOTIENT 1 0"),
            Err(Error::BadArgument {
                proc: "QUOTIENT".to_owned(),
                arg: Value::word("0")
            })
        );
        assert!(matches!(
            env.evaluate("SQRT -1"),
            Err(Error::BadArgument { .. })
        ));
        assert!(matches!(
            env.evaluate("SUM 1 [2]"),
            Err(Error::BadArgument { .. })
        ));
    }

    #[test]
    fn random() {
        let mut env = env();
        for _ in 0..50 {
            let v = env.evaluate("RANDOM 3").unwrap();
            let x = v[0].as_num().unwrap();
            assert!(x == 0.0 || x == 1.0 || x == 2.0);
        }
        assert!(env.evaluate("RANDOM 0").is_err());
    }

    #[test]
    fn predicates() {
        let mut env = env();
        assert_eq!(
            env.evaluate("EQUALP 2 2.0 EQUALP \"a \"A LESSP 1 2 GREATERP 1 2")
                .unwrap(),
            words(&["TRUE", "TRUE", "TRUE", "FALSE"])
        );
        assert_eq!(
            env.evaluate("LIST 1 [2 3]").unwrap(),
            vec![Value::list("1 [2 3]")]
        );
    }

    #[test]
    fn repeat_collects() {
        let mut env = env();
        assert_eq!(
            env.evaluate("REPEAT 3 [1]").unwrap(),
            vec![Value::list("1 1 1")]
        );
        assert!(env.evaluate("REPEAT 0 [FD 10]").unwrap().is_empty());
        assert!(env.screen.device.lines().is_empty());
        assert!(matches!(
            env.evaluate("REPEAT -1 [FD 10]"),
            Err(Error::BadArgument { .. })
        ));
    }

    #[test]
    fn conditionals() {
        let mut env = env();
        assert_eq!(
            env.evaluate("IFELSE LESSP 1 2 [\"YES] [\"NO]").unwrap(),
            words(&["YES"])
        );
        assert!(env.evaluate("IF \"FALSE [\"YES]").unwrap().is_empty());
        assert!(matches!(
            env.evaluate("IF 1 [\"YES]"),
            Err(Error::BadArgument { .. })
        ));
        assert_eq!(env.evaluate("RUN [SUM 1 2]").unwrap(), words(&["3"]));
    }

    #[test]
    fn turtle_queries() {
        let mut env = env();
        assert_eq!(
            env.evaluate("SETPOS [30 40] POS XCOR").unwrap(),
            vec![Value::list("30 40"), Value::word("30")]
        );
        assert_eq!(
            env.evaluate("RT 90 LT 45 HEADING").unwrap(),
            words(&["45"])
        );
        assert_eq!(
            env.evaluate("SETX 5 SETY -5 POS").unwrap(),
            vec![Value::list("5 -5")]
        );
        assert_eq!(
            env.evaluate("HOME POS HEADING").unwrap(),
            vec![Value::list("0 0"), Value::word("0")]
        );
        assert!(matches!(
            env.evaluate("SETPOS [1]"),
            Err(Error::BadArgument { .. })
        ));
    }

    #[test]
    fn pen_colors() {
        let mut env = env();
        assert_eq!(env.evaluate("SETPC 3 PC").unwrap(), words(&["3"]));
        assert_eq!(env.screen.turtle.color, 3);
        assert!(env.evaluate("SETPC 16").is_err());
        assert!(env.evaluate("SETPC 1.5").is_err());
        assert_eq!(
            env.evaluate("PX"),
            Err(Error::Unsupported {
                what: "PENREVERSE".to_owned()
            })
        );
    }

    #[test]
    fn screen_ops() {
        let mut env = env();
        env.evaluate("HT FD 10 CS").unwrap();
        assert!(!env.screen.turtle.visible);
        assert_eq!(env.screen.turtle.pos, Point::ORIGIN);
        assert!(env.screen.device.ops.contains(&DeviceOp::Clear));

        assert_eq!(env.evaluate("FD 1000"), Err(Error::FenceViolation));
        env.evaluate("WINDOW FD 1000").unwrap();
        assert_eq!(env.evaluate("FENCE FD 10"), Err(Error::FenceViolation));
    }

    #[test]
    fn locals() {
        let mut env = env();
        assert_eq!(
            env.evaluate("LOCAL \"X LOCAL \"x"),
            Err(Error::DuplicateLocal {
                name: "x".to_owned()
            })
        );
        assert_eq!(
            env.evaluate("MAKE \"1X 5"),
            Err(Error::InvalidIdentifier {
                name: "1X".to_owned()
            })
        );
    }

    #[test]
    fn text_output() {
        let mut env = env();
        env.evaluate("PRINT [1 [2] 3] SHOW [1 2] PR \"HI").unwrap();
        assert_eq!(env.console.transcript(), "1 [2] 3\n[1 2]\nHI\n");
    }

    #[test]
    fn read_char() {
        let mut env = Env::new(
            Recording::default(),
            ScriptConsole::default().with_keys("q"),
            Default::default(),
        );
        assert_eq!(
            env.evaluate("RC RC").unwrap(),
            vec![Value::word("q"), Value::empty()]
        );
    }

    #[test]
    fn erase() {
        let mut env = env();
        assert_eq!(
            env.evaluate("ERASE \"NOPE"),
            Err(Error::EraseFailure {
                name: "NOPE".to_owned()
            })
        );
        assert_eq!(
            env.evaluate("PO \"NOPE"),
            Err(Error::UnknownCommand {
                name: "NOPE".to_owned()
            })
        );
    }
}
