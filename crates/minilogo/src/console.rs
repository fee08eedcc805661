use std::collections::VecDeque;
use std::io;

/// Where a session gets its lines from and prints its output to.
pub trait Console {
    /// Show `prompt` and read one line. `None` means the input is exhausted.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Ask a yes/no question.
    fn confirm(&mut self, question: &str) -> io::Result<bool>;

    /// Wait for a single keypress.
    fn read_key(&mut self) -> io::Result<Option<char>>;

    fn print(&mut self, text: &str);
}

/// A console that reads from a script and collects everything printed.
///
/// Questions are answered from a queue of canned answers, falling back to "no".
#[derive(Clone, Debug, Default)]
pub struct ScriptConsole {
    lines: VecDeque<String>,
    answers: VecDeque<bool>,
    keys: VecDeque<char>,
    pub output: Vec<String>,
}

impl ScriptConsole {
    pub fn new(script: &str) -> Self {
        ScriptConsole {
            lines: script.lines().map(str::to_owned).collect(),
            ..ScriptConsole::default()
        }
    }

    pub fn with_answers(mut self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.answers.extend(answers);
        self
    }

    pub fn with_keys(mut self, keys: &str) -> Self {
        self.keys.extend(keys.chars());
        self
    }

    /// Append more lines to the script.
    pub fn push_line(&mut self, line: &str) {
        self.lines.push_back(line.to_owned());
    }

    /// Everything printed so far, one line each.
    pub fn transcript(&self) -> String {
        let mut ret = String::new();
        for line in &self.output {
            ret.push_str(line);
            ret.push('\n');
        }
        ret
    }
}

impl Console for ScriptConsole {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }

    fn confirm(&mut self, _question: &str) -> io::Result<bool> {
        Ok(self.answers.pop_front().unwrap_or(false))
    }

    fn read_key(&mut self) -> io::Result<Option<char>> {
        Ok(self.keys.pop_front())
    }

    fn print(&mut self, text: &str) {
        if text.is_empty() {
            self.output.push(String::new());
        } else {
            self.output.extend(text.lines().map(str::to_owned));
        }
    }
}
