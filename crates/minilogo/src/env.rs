use std::{path::Path, rc::Rc};

use crate::{
    console::Console,
    parse,
    symbols::SymbolStore,
    turtle::{Device, Screen},
    typ::{Error, Procedure, Value},
};

pub const DEFAULT_MAX_DEPTH: usize = 128;
pub const DEFAULT_MAX_LINE: usize = 255;
/// The deepest nesting `max_depth` may ask for.
pub const MAX_DEPTH: usize = 1024;

const BASE_STACK: usize = 1024 * 1024;
const STACK_PER_CALL: usize = 128 * 1024;

/// Interpreter settings.
#[derive(clap::Args, Clone, Debug, PartialEq)]
pub struct Config {
    /// How deeply calls may nest before evaluation gives up.
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_DEPTH,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..=MAX_DEPTH as u64),
    )]
    pub max_depth: usize,

    /// Longest accepted input line, in characters.
    #[arg(long, default_value_t = DEFAULT_MAX_LINE)]
    pub max_line: usize,

    /// Let the turtle wander off the drawing area instead of fencing it in.
    #[arg(long)]
    pub window: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: DEFAULT_MAX_DEPTH,
            max_line: DEFAULT_MAX_LINE,
            window: false,
        }
    }
}

impl Config {
    /// Stack needed by a thread that evaluates calls nested `max_depth` deep.
    pub fn stack_size(&self) -> usize {
        BASE_STACK + self.max_depth.min(MAX_DEPTH) * STACK_PER_CALL
    }
}

/// The variables bound during one active call.
pub type Scope = SymbolStore<Value>;

/// Everything a running session needs: the global stores, the turtle and the outside world.
pub struct Env<D, C> {
    pub globals: Scope,
    pub procs: SymbolStore<Rc<Procedure>>,
    pub screen: Screen<D>,
    pub console: C,
    pub config: Config,
    /// Procedures were defined or erased since the last save or load.
    pub unsaved: bool,
    /// Set by `QUIT`; the session loop stops when it sees this.
    pub quit: bool,
    pub(crate) depth: usize,
}

impl<D: Device, C: Console> Env<D, C> {
    pub fn new(device: D, console: C, mut config: Config) -> Self {
        if config.max_depth > MAX_DEPTH {
            log::warn!("max_depth {} lowered to {MAX_DEPTH}", config.max_depth);
            config.max_depth = MAX_DEPTH;
        }
        Env {
            globals: Scope::default(),
            procs: SymbolStore::default(),
            screen: Screen::new(device, !config.window),
            console,
            config,
            unsaved: false,
            quit: false,
            depth: 0,
        }
    }

    /// Look up a variable, first in the current scope and then in the globals.
    pub fn lookup_var<'a>(&'a self, scope: &'a Scope, name: &str) -> Option<&'a Value> {
        scope.lookup(name).or_else(|| self.globals.lookup(name))
    }

    /// Assign to the nearest existing binding of `name`, or create a global one.
    pub fn make(&mut self, scope: &mut Scope, name: &str, val: Value) {
        if let Some(local) = scope.lookup_mut(name) {
            *local = val;
        } else {
            self.globals.define(name, val);
        }
    }

    pub fn define_proc(&mut self, proc: Procedure) {
        log::debug!("defining {}", proc.title());
        let name = proc.name.clone();
        self.procs.define(&name, Rc::new(proc));
        self.unsaved = true;
    }

    /// Write every procedure to `path`, returning how many there were.
    pub fn save_procs(&mut self, path: impl AsRef<Path>) -> Result<usize, Error> {
        let path = path.as_ref();
        let text = parse::render(self.procs.list().map(|r| r.payload.as_ref()));
        std::fs::write(path, text)?;
        log::info!("saved {} procedures to {}", self.procs.len(), path.display());
        self.unsaved = false;
        Ok(self.procs.len())
    }

    /// Replace every procedure with the ones in `path`, returning how many there were.
    ///
    /// If the file can't be read or parsed, the current procedures are left alone.
    pub fn load_procs(&mut self, path: impl AsRef<Path>) -> Result<usize, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let procs = parse::procedures(&text)?;
        self.procs = procs
            .into_iter()
            .map(|p| (p.name.clone(), Rc::new(p)))
            .collect();
        log::info!("loaded {} procedures from {}", self.procs.len(), path.display());
        self.unsaved = false;
        Ok(self.procs.len())
    }

    /// If there are unsaved procedures, offer to save them.
    pub fn offer_save(&mut self) -> Result<(), Error> {
        if !self.unsaved || !self.console.confirm("Save your procedures first?")? {
            return Ok(());
        }
        let Some(name) = self.console.read_line("Save as: ")? else {
            return Ok(());
        };
        let name = name.trim();
        if !name.is_empty() {
            let count = self.save_procs(name)?;
            self.console.print(&format!("Saved {count} procedures to {name}"));
        }
        Ok(())
    }
}
