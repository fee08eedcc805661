use crate::{
    args::Arity,
    console::Console,
    env::{Env, Scope},
    proc::Primitive,
    token::{Buffer, Token},
    turtle::Device,
    typ::{Error, Procedure, Value},
};

/// Why evaluation stopped before running out of instructions.
#[derive(Debug)]
pub(crate) enum Flow {
    Error(Error),
    /// `OUTPUT`, on its way to the nearest procedure call.
    Output(Value),
    /// `STOP`, on its way to the nearest procedure call.
    Stop,
    /// `QUIT`, on its way to the top level.
    Quit,
}

impl From<Error> for Flow {
    fn from(e: Error) -> Self {
        Flow::Error(e)
    }
}

impl From<std::io::Error> for Flow {
    fn from(e: std::io::Error) -> Self {
        Flow::Error(e.into())
    }
}

pub(crate) type Step<T> = Result<T, Flow>;

const OUTPUT: &str = "OUTPUT";

impl<D: Device, C: Console> Env<D, C> {
    /// Run one line as the body of the (parameterless) top-level procedure.
    pub fn run_line(&mut self, line: &str) -> Result<(), Error> {
        self.depth = 0;
        let mut scope = Scope::default();
        let mut buf = Buffer::new(line);
        match self.run_body(&mut buf, &mut scope, true) {
            Ok(_) | Err(Flow::Stop) | Err(Flow::Quit) => Ok(()),
            Err(Flow::Output(_)) => Err(Error::ReturnOutsideProcedure),
            Err(Flow::Error(e)) => Err(e),
        }
    }

    /// Evaluate `text` at the top level, returning every value it produces.
    pub fn evaluate(&mut self, text: &str) -> Result<Vec<Value>, Error> {
        self.depth = 0;
        let mut scope = Scope::default();
        match self.run_list(text, &mut scope) {
            Ok(vals) => Ok(vals),
            Err(Flow::Stop) | Err(Flow::Quit) => Ok(Vec::new()),
            Err(Flow::Output(_)) => Err(Error::ReturnOutsideProcedure),
            Err(Flow::Error(e)) => Err(e),
        }
    }

    /// Run `f` one call deeper, refusing if that would go past the depth limit.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Step<T>) -> Step<T> {
        if self.depth >= self.config.max_depth {
            return Err(Error::StackExhausted {
                limit: self.config.max_depth,
            }
            .into());
        }
        self.depth += 1;
        let ret = f(self);
        self.depth -= 1;
        ret
    }

    /// Call `name`, taking its inputs from `buf`.
    ///
    /// User procedures are looked up first, every time, so that they can shadow primitives.
    pub(crate) fn call(
        &mut self,
        name: &str,
        buf: &mut Buffer,
        scope: &mut Scope,
    ) -> Step<Option<Value>> {
        self.nested(|env| {
            if let Some(proc) = env.procs.lookup(name).cloned() {
                env.call_procedure(&proc, buf, scope)
            } else if let Some(prim) = Primitive::lookup(name) {
                env.dispatch(prim, buf, scope)
            } else {
                Err(Error::UnknownCommand {
                    name: name.to_owned(),
                }
                .into())
            }
        })
    }

    /// Call a user procedure.
    ///
    /// Its inputs are taken from `params` (the caller's remaining instructions) and resolved in
    /// the caller's scope. The body then runs in a fresh scope holding just the parameters.
    pub(crate) fn call_procedure(
        &mut self,
        proc: &Procedure,
        params: &mut Buffer,
        caller: &mut Scope,
    ) -> Step<Option<Value>> {
        let args = self.resolve(Arity::Fixed(proc.params.len()), params, caller, &proc.name)?;
        log::debug!("calling {} with {:?}", proc.name, args);
        let mut scope: Scope = proc.params.iter().cloned().zip(args).collect();
        let mut body = Buffer::new(proc.body.as_str());
        match self.run_body(&mut body, &mut scope, false) {
            Ok(v) => Ok(v),
            Err(Flow::Output(v)) => Ok(Some(v)),
            Err(Flow::Stop) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Run instructions until they run out, or something stops them.
    ///
    /// Whenever a call produces a value it gets spliced back onto the front of `buf`. If nothing
    /// consumes it, the next trip around the loop complains about it.
    fn run_body(
        &mut self,
        buf: &mut Buffer,
        scope: &mut Scope,
        top_level: bool,
    ) -> Step<Option<Value>> {
        while let Some(tok) = buf.peek()? {
            let name = match tok {
                Token::Word(w) if w.eq_ignore_ascii_case(OUTPUT) => {
                    if top_level {
                        return Err(Error::ReturnOutsideProcedure.into());
                    }
                    buf.remove_leading(1)?;
                    let val = self.resolve_one(buf, scope, OUTPUT)?;
                    buf.clear();
                    return Ok(Some(val));
                }
                Token::Word(w) => w,
                Token::List(l) => {
                    return Err(Error::UnknownCommand {
                        name: format!("[{l}]"),
                    }
                    .into())
                }
                // Produced by the previous call and not consumed by anything.
                Token::Value(val) => return Err(Error::UnusedValue { val }.into()),
            };
            buf.remove_leading(1)?;
            if let Some(val) = self.call(&name, buf, scope)? {
                buf.splice(val);
            }
        }
        Ok(None)
    }
}
