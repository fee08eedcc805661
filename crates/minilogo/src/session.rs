use crate::{
    console::Console,
    define::{is_definition, is_end, Feed, Recorder},
    env::{Config, Env},
    token::normalize,
    turtle::Device,
    typ::Error,
};

pub const PROMPT: &str = "? ";
/// Shown while reading the body of a definition.
pub const CONTINUE_PROMPT: &str = "> ";

/// The read-eval-print loop.
pub struct Session<D, C> {
    pub env: Env<D, C>,
}

impl<D: Device, C: Console> Session<D, C> {
    pub fn new(device: D, console: C, config: Config) -> Self {
        Session {
            env: Env::new(device, console, config),
        }
    }

    /// Read and run lines until the input runs out or someone says `QUIT`.
    ///
    /// Errors in the instructions are reported on the console, and don't stop the loop. Only
    /// failing to read the next line does.
    pub fn run(&mut self) -> Result<(), Error> {
        while !self.env.quit {
            let Some(line) = self.env.console.read_line(PROMPT)? else {
                break;
            };
            self.feed(&line);
        }
        Ok(())
    }

    /// Handle one line of input, which might start a definition.
    pub fn feed(&mut self, line: &str) {
        let line = normalize(line);
        if line.is_empty() {
            return;
        }
        let res = if is_definition(&line) {
            self.define(&line)
        } else {
            self.env.run_line(&line)
        };
        if let Err(e) = res {
            log::debug!("error running {line:?}: {e}");
            self.env.console.print(&e.to_string());
        }
    }

    fn define(&mut self, header: &str) -> Result<(), Error> {
        let mut rec = match Recorder::start(header) {
            Ok(rec) => rec,
            Err(e) => {
                self.skip_body()?;
                return Err(e);
            }
        };
        let name = rec.name().to_owned();
        if self.env.procs.contains(&name) {
            let question = format!("{name} is already defined. Replace it?");
            if !self.env.console.confirm(&question)? {
                self.skip_body()?;
                self.env.console.print(&format!("{name} not redefined"));
                return Ok(());
            }
        }

        while let Some(line) = self.env.console.read_line(CONTINUE_PROMPT)? {
            match rec.feed(&normalize(&line)) {
                Feed::More => {}
                Feed::Skipped => self
                    .env
                    .console
                    .print("Can't define a procedure inside another one"),
                Feed::Done => break,
            }
        }
        self.env.define_proc(rec.finish());
        self.env.console.print(&format!("{name} defined"));
        Ok(())
    }

    /// Throw away the lines of a definition we're not going to record.
    fn skip_body(&mut self) -> Result<(), Error> {
        while let Some(line) = self.env.console.read_line(CONTINUE_PROMPT)? {
            if is_end(&line) {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{console::ScriptConsole, env::MAX_DEPTH, turtle::Recording, typ::Value};

    use super::*;

    fn session(script: &str) -> Session<Recording, ScriptConsole> {
        Session::new(
            Recording::default(),
            ScriptConsole::new(script),
            Config::default(),
        )
    }

    fn run(script: &str) -> Session<Recording, ScriptConsole> {
        let mut s = session(script);
        s.run().unwrap();
        s
    }

    #[test]
    fn define_and_call() {
        let s = run("to square :side\nrepeat 4 [fd :side rt 90]\nend\nSquare 50\n");
        assert_eq!(s.env.console.transcript(), "SQUARE defined\n");
        assert_eq!(s.env.screen.device.lines().len(), 4);
        assert_eq!(s.env.screen.turtle.heading, 0.0);
        assert!(s.env.unsaved);
    }

    #[test]
    fn globals_are_visible_in_procedures() {
        let s = run("MAKE \"X 5\nTO SHOWX\nPRINT :X\nEND\nSHOWX\n");
        assert_eq!(s.env.console.transcript(), "SHOWX defined\n5\n");
    }

    #[test]
    fn make_creates_globals_from_inside() {
        let s = run("TO SETY2\nMAKE \"Y 2\nEND\nSETY2\nPRINT :Y\n");
        assert_eq!(s.env.console.transcript(), "SETY2 defined\n2\n");
    }

    #[test]
    fn make_updates_nearest_binding() {
        let s = run("MAKE \"X 1\nTO F :X\nMAKE \"X 2\nPRINT :X\nEND\nF 9\nPRINT :X\n");
        assert_eq!(s.env.console.transcript(), "F defined\n2\n1\n");
    }

    #[test]
    fn callers_scope_is_invisible() {
        let s = run("TO INNER\nPRINT :A\nEND\nTO OUTER :A\nINNER\nEND\nOUTER 3\n");
        assert_eq!(
            s.env.console.transcript(),
            "INNER defined\nOUTER defined\nA has no value\n"
        );
    }

    #[test]
    fn output_and_stop() {
        let s = run(
            "TO FIVE\nOUTPUT 5\nPRINT \"NEVER\nEND\nPRINT FIVE\nOUTPUT 5\n\
             TO EARLY\nPRINT 1\nSTOP\nPRINT 2\nEND\nEARLY\nSTOP PRINT 3\n",
        );
        assert_eq!(
            s.env.console.transcript(),
            "FIVE defined\n5\nOUTPUT can only be used inside a procedure\nEARLY defined\n1\n"
        );
    }

    #[test]
    fn output_from_inside_a_loop() {
        let s = run("TO FIRST\nREPEAT 10 [OUTPUT 7]\nPRINT 0\nEND\nSHOW FIRST\n");
        assert_eq!(s.env.console.transcript(), "FIRST defined\n7\n");
    }

    #[test]
    fn redefinition() {
        let mut s = Session::new(
            Recording::default(),
            ScriptConsole::new("TO A\nPRINT 1\nEND\nTO A\nPRINT 2\nEND\nA\nTO A\nPRINT 3\nEND\nA\n")
                .with_answers([false, true]),
            Config::default(),
        );
        s.run().unwrap();
        assert_eq!(
            s.env.console.transcript(),
            "A defined\nA not redefined\n1\nA defined\n3\n"
        );
    }

    #[test]
    fn bad_headers_skip_their_body() {
        let s = run("TO SAVE\nPRINT 1\nEND\nTO 2X\nEND\nPRINT 2\n");
        assert_eq!(
            s.env.console.transcript(),
            "SAVE is a reserved word\n2X is not a valid name\n2\n"
        );
        assert!(s.env.procs.is_empty());
    }

    #[test]
    fn nested_definitions_are_skipped() {
        let s = run("TO A\nTO B\nPRINT 1\nEND\nA\n");
        assert_eq!(
            s.env.console.transcript(),
            "Can't define a procedure inside another one\nA defined\n1\n"
        );
    }

    #[test]
    fn errors_leave_stores_alone() {
        let mut s = run("MAKE \"X 1\n");
        s.feed("MAKE \"X [1 2 3");
        assert_eq!(s.env.console.transcript(), "Unbalanced brackets in list\n");
        assert_eq!(s.env.globals.lookup("X"), Some(&Value::word("1")));
    }

    #[test]
    fn unused_values() {
        let s = run("SUM 1 2\n[FD 10]\nFROB\n");
        assert_eq!(
            s.env.console.transcript(),
            "You don't say what to do with 3\nI don't know how to [FD 10]\nI don't know how to FROB\n"
        );
    }

    #[test]
    fn stack_exhaustion() {
        let s = run("TO LOOP :N\nLOOP SUM :N 1\nEND\nLOOP 1\nPRINT \"OK\n");
        assert_eq!(
            s.env.console.transcript(),
            "LOOP defined\nStack exhausted: calls nested more than 128 deep\nOK\n"
        );
    }

    #[test]
    fn deeply_nested_list_input() {
        let depth = 20_000;
        let mut s = session("");
        s.feed(&format!("PRINT {}1{}", "[".repeat(depth), "]".repeat(depth)));
        s.feed(&format!("PRINT {}1", "[".repeat(depth)));
        let out = &s.env.console.output;
        assert_eq!(out.len(), 2);
        assert!(out[0].starts_with("[[") && out[0].ends_with("]]"));
        assert_eq!(out[1], "Unbalanced brackets in list");
    }

    #[test]
    fn stack_exhaustion_at_the_deepest_limit() {
        let config = Config {
            max_depth: MAX_DEPTH,
            ..Config::default()
        };
        let stack = config.stack_size();
        let transcript = std::thread::Builder::new()
            .stack_size(stack)
            .spawn(move || {
                let mut s = Session::new(
                    Recording::default(),
                    ScriptConsole::new("TO R\nR\nEND\nR\n"),
                    config,
                );
                s.run().unwrap();
                s.env.console.transcript()
            })
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(
            transcript,
            format!("R defined\nStack exhausted: calls nested more than {MAX_DEPTH} deep\n")
        );
    }

    #[test]
    fn depth_limit_is_capped() {
        let s = Session::new(
            Recording::default(),
            ScriptConsole::new(""),
            Config {
                max_depth: 100_000,
                ..Config::default()
            },
        );
        assert_eq!(s.env.config.max_depth, MAX_DEPTH);
    }

    #[test]
    fn quit_stops_reading() {
        let s = run("PRINT 1\nBYE\nPRINT 2\n");
        assert_eq!(s.env.console.transcript(), "1\n");
        assert!(s.env.quit);
    }
}
