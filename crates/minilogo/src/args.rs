use crate::{
    console::Console,
    env::{Env, Scope},
    eval::Step,
    token::{parse_number, Buffer, Token},
    turtle::Device,
    typ::{Error, Value},
};

/// How many inputs to take from a buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Arity {
    /// Exactly this many, each of which must produce a value.
    Fixed(usize),
    /// Everything that's left, unevaluated, as a single list.
    Rest,
    /// Evaluate everything that's left, keeping whatever values come out. This is how lists get
    /// run.
    Exhaust,
}

/// What a token turned out to be, before any evaluation.
enum Resolved {
    Value(Value),
    Call(String),
}

impl<D: Device, C: Console> Env<D, C> {
    /// Resolve a token that doesn't need evaluating; anything else is a call.
    fn classify(&self, tok: Token, scope: &Scope) -> Result<Resolved, Error> {
        let w = match tok {
            Token::Value(v) => return Ok(Resolved::Value(v)),
            Token::List(l) => return Ok(Resolved::Value(Value::List(l))),
            Token::Word(w) => w,
        };
        if let Some(name) = w.strip_prefix(':') {
            self.lookup_var(scope, name)
                .cloned()
                .map(Resolved::Value)
                .ok_or_else(|| Error::UnknownVariable {
                    name: name.to_owned(),
                })
        } else if let Some(word) = w.strip_prefix('"') {
            Ok(Resolved::Value(Value::word(word)))
        } else if parse_number(&w).is_some() {
            Ok(Resolved::Value(Value::Word(w)))
        } else {
            Ok(Resolved::Call(w))
        }
    }

    /// Take one input for `proc` from the front of `buf`.
    ///
    /// Calls are evaluated right away, taking their own inputs from `buf` in turn.
    pub(crate) fn resolve_one(
        &mut self,
        buf: &mut Buffer,
        scope: &mut Scope,
        proc: &str,
    ) -> Step<Value> {
        let tok = buf.next_token()?.ok_or_else(|| Error::BadArgumentCount {
            proc: proc.to_owned(),
        })?;
        match self.classify(tok, scope)? {
            Resolved::Value(v) => Ok(v),
            Resolved::Call(name) => {
                let val = self.call(&name, buf, scope)?;
                val.ok_or_else(|| {
                    Error::NoOutput {
                        callee: name,
                        proc: proc.to_owned(),
                    }
                    .into()
                })
            }
        }
    }

    /// Take inputs for `proc` from the front of `buf`, according to `arity`.
    pub(crate) fn resolve(
        &mut self,
        arity: Arity,
        buf: &mut Buffer,
        scope: &mut Scope,
        proc: &str,
    ) -> Step<Vec<Value>> {
        match arity {
            Arity::Fixed(count) => {
                let mut ret = Vec::with_capacity(count);
                for _ in 0..count {
                    ret.push(self.resolve_one(buf, scope, proc)?);
                }
                Ok(ret)
            }
            Arity::Rest => {
                if buf.is_empty() {
                    return Err(Error::BadArgumentCount {
                        proc: proc.to_owned(),
                    }
                    .into());
                }
                Ok(vec![Value::List(buf.take_rest())])
            }
            Arity::Exhaust => {
                let mut ret = Vec::new();
                while let Some(tok) = buf.next_token()? {
                    match self.classify(tok, scope)? {
                        Resolved::Value(v) => ret.push(v),
                        Resolved::Call(name) => ret.extend(self.call(&name, buf, scope)?),
                    }
                }
                Ok(ret)
            }
        }
    }

    /// Run a list in the current scope.
    pub(crate) fn run_list(&mut self, list: &str, scope: &mut Scope) -> Step<Vec<Value>> {
        let mut buf = Buffer::new(list);
        self.resolve(Arity::Exhaust, &mut buf, scope, "RUN")
    }
}
