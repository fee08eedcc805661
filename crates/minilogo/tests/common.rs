use std::path::Path;

use minilogo::{Config, Recording, ScriptConsole, Session};

#[derive(Default, Clone)]
pub struct TestCase {
    input: String,
    expected: String,
}

fn exec_one(s: &str) -> Session<Recording, ScriptConsole> {
    let mut session = Session::new(
        Recording::default(),
        ScriptConsole::new(s),
        Config::default(),
    );
    session.run().unwrap();
    session
}

impl TestCase {
    fn exec(&self) {
        let session = exec_one(&self.input);
        assert_eq!(
            session.env.console.transcript().trim_end(),
            self.expected.trim_end(),
            "input:\n{}",
            self.input
        );
    }

    fn exec_failure(&self) {
        let session = exec_one(&self.input);
        let last = session.env.console.output.last().cloned();
        assert_eq!(
            last.as_deref(),
            Some(self.expected.trim()),
            "input:\n{}",
            self.input
        );
    }
}

pub fn read_tests(path: impl AsRef<Path>) -> Vec<TestCase> {
    let text = std::fs::read_to_string(path).unwrap();
    let mut ret = Vec::new();
    let mut in_input = true;
    let mut cur = TestCase::default();

    fn separator_line(line: &str, ch: u8) -> bool {
        line.trim().len() >= 2 && line.trim().bytes().all(|c| c == ch)
    }

    for line in text.split_inclusive('\n') {
        if in_input {
            if separator_line(line, b'-') {
                in_input = false;
            } else {
                cur.input += line;
            }
        } else if separator_line(line, b'=') {
            in_input = true;
            ret.push(std::mem::take(&mut cur));
        } else {
            cur.expected += line;
        }
    }
    ret
}

#[test]
fn text_tests() {
    let tests = read_tests("tests/basic.txt");
    assert!(!tests.is_empty());
    for test in tests {
        test.exec();
    }
}

#[test]
fn exec_failures() {
    let tests = read_tests("tests/exec-failures.txt");
    assert!(!tests.is_empty());
    for test in tests {
        test.exec_failure();
    }
}

#[test]
fn save_and_load() {
    let file = "SAVE-LOAD-TEST.LGO";
    let script = format!(
        "TO SQUARE :SIDE\nREPEAT 4 [FD :SIDE RT 90]\nEND\nSAVE {file}\nERASE \"SQUARE\nLOAD {file}\nSQUARE 10\n"
    );
    let session = exec_one(&script);
    let saved = std::fs::read_to_string(file);
    let _ = std::fs::remove_file(file);

    assert_eq!(
        session.env.console.transcript(),
        format!("SQUARE defined\nSaved 1 procedures to {file}\nLoaded 1 procedures from {file}\n")
    );
    assert_eq!(
        saved.unwrap(),
        "TO SQUARE :SIDE\nREPEAT 4 [FD :SIDE RT 90]\nEND\n"
    );
    assert_eq!(session.env.screen.device.lines().len(), 4);
    assert!(!session.env.unsaved);
}

#[test]
fn unsaved_procedures_are_offered_for_saving() {
    let (kept, quit) = ("PROMPT-KEPT.LGO", "PROMPT-QUIT.LGO");
    let script = format!(
        "TO A\nEND\nSAVE {kept}\nTO B\nEND\nLOAD {kept}\nPOTS\nTO C\nEND\nQUIT\n{quit}\nPRINT 1\n"
    );
    let mut session = Session::new(
        Recording::default(),
        ScriptConsole::new(&script).with_answers([false, true]),
        Config::default(),
    );
    session.run().unwrap();
    let saved = std::fs::read_to_string(quit);
    let _ = std::fs::remove_file(kept);
    let _ = std::fs::remove_file(quit);

    // Declining the offer on LOAD loses B, since LOAD replaces every procedure.
    assert_eq!(
        session.env.console.transcript(),
        format!(
            "A defined\nSaved 1 procedures to {kept}\nB defined\nLoaded 1 procedures from {kept}\n\
             TO A\nC defined\nSaved 2 procedures to {quit}\n"
        )
    );
    assert!(!session.env.procs.contains("B"));
    assert_eq!(saved.unwrap(), "TO A\nEND\n\nTO C\nEND\n");
    assert!(session.env.quit);
}
