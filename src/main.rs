//! Interactive shell for the microprolog engine.

use anyhow::{Context, Result};
use log::info;
use microprolog::{parser, samples, EngineConfig, KnowledgeBase, QueryEngine};
use std::io::{self, BufRead, Write};

/// Solutions printed per query before the rest are cut off
const DEFAULT_SOLUTION_LIMIT: usize = 25;

const HELP: &str = "\
Enter clauses such as `parent(tom, bob).` to add them, or `?- goal.` to query.
Commands:
  :help              show this text
  :list              print every clause
  :count             number of clauses
  :clear             remove every clause
  :samples           list the sample programs
  :load NAME         add a sample program
  :occurs on|off     toggle the occurs check
  :depth N|off       bound the resolution depth
  :limit N           print at most N solutions per query
  :quit              leave";

/// The line up to a `%` comment; a `%` inside a quoted atom does not count
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '\'' => quoted = !quoted,
            '%' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Debug)]
struct Shell {
    kb: KnowledgeBase,
    config: EngineConfig,
    solution_limit: usize,
    pending: String,
}

impl Shell {
    fn new() -> Self {
        Self {
            kb: KnowledgeBase::new(),
            config: EngineConfig::default(),
            solution_limit: DEFAULT_SOLUTION_LIMIT,
            pending: String::new(),
        }
    }

    fn load_sample(&mut self, name: &str, out: &mut impl Write) -> Result<()> {
        let Some(sample) = samples::find(name) else {
            writeln!(out, "unknown sample `{name}`; try :samples")?;
            return Ok(());
        };
        let clauses = parser::parse_program(sample.source)
            .with_context(|| format!("sample `{name}` does not parse"))?;
        let count = clauses.len();
        self.kb.add_clauses(clauses)?;
        info!("loaded sample {name} ({count} clauses)");
        writeln!(out, "loaded {name}: {}", sample.description)?;
        for query in sample.queries {
            writeln!(out, "  try: ?- {query}")?;
        }
        Ok(())
    }

    /// Handles one line of input. Clauses may span lines; they are buffered
    /// until a line ends with `.`, not counting a trailing `%` comment.
    fn handle(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        let line = line.trim();
        if self.pending.is_empty() {
            if line.is_empty() || line.starts_with('%') {
                return Ok(Flow::Continue);
            }
            if let Some(command) = line.strip_prefix(':') {
                return self.command(command, out);
            }
        }

        if !self.pending.is_empty() {
            self.pending.push('\n');
        }
        self.pending.push_str(line);
        if !strip_comment(line).trim_end().ends_with('.') {
            return Ok(Flow::Continue);
        }
        let input = std::mem::take(&mut self.pending);

        if input.starts_with("?-") {
            self.query(&input, out)?;
        } else {
            match parser::parse_program(&input) {
                Ok(clauses) => {
                    for clause in clauses {
                        match self.kb.add_clause(clause) {
                            Ok(()) => writeln!(out, "ok")?,
                            Err(err) => writeln!(out, "error: {err}")?,
                        }
                    }
                }
                Err(err) => writeln!(out, "{err}")?,
            }
        }
        Ok(Flow::Continue)
    }

    fn query(&self, input: &str, out: &mut impl Write) -> Result<()> {
        let goal = match parser::parse_query(input) {
            Ok(goal) => goal,
            Err(err) => {
                writeln!(out, "{err}")?;
                return Ok(());
            }
        };
        let engine = QueryEngine::with_config(&self.kb, self.config);
        let solutions = match engine.solve(&goal) {
            Ok(solutions) => solutions,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                return Ok(());
            }
        };

        let mut found = 0;
        for solution in solutions {
            if found == self.solution_limit {
                writeln!(out, "... (stopped after {found} solutions)")?;
                return Ok(());
            }
            match solution {
                Ok(solution) => {
                    found += 1;
                    writeln!(out, "{solution}")?;
                }
                Err(err) => {
                    writeln!(out, "error: {err}")?;
                    return Ok(());
                }
            }
        }
        writeln!(out, "{}", if found > 0 { "yes" } else { "no" })?;
        Ok(())
    }

    fn command(&mut self, command: &str, out: &mut impl Write) -> Result<Flow> {
        let mut words = command.split_whitespace();
        let name = words.next().unwrap_or_default();
        let argument = words.next();
        match (name, argument) {
            ("quit" | "q", _) => return Ok(Flow::Quit),
            ("help" | "h", _) => writeln!(out, "{HELP}")?,
            ("list", _) => {
                for clause in self.kb.clauses() {
                    writeln!(out, "{clause}")?;
                }
            }
            ("count", _) => writeln!(out, "{} clauses", self.kb.clause_count())?,
            ("clear", _) => {
                self.kb.clear();
                writeln!(out, "cleared")?;
            }
            ("samples", _) => {
                for sample in samples::catalog() {
                    writeln!(out, "{:<10} {}", sample.name, sample.description)?;
                }
            }
            ("load", Some(sample)) => self.load_sample(sample, out)?,
            ("occurs", Some(setting @ ("on" | "off"))) => {
                self.config = self.config.with_occurs_check(setting == "on");
                writeln!(out, "occurs check {setting}")?;
            }
            ("depth", Some("off")) => {
                self.config.max_depth = None;
                writeln!(out, "depth unbounded")?;
            }
            ("depth", Some(limit)) => match limit.parse() {
                Ok(limit) => {
                    self.config = self.config.with_max_depth(limit);
                    writeln!(out, "depth limit {limit}")?;
                }
                Err(_) => writeln!(out, "expected a number or `off`")?,
            },
            ("limit", Some(limit)) => match limit.parse() {
                Ok(limit) => {
                    self.solution_limit = limit;
                    writeln!(out, "showing at most {limit} solutions")?;
                }
                Err(_) => writeln!(out, "expected a number")?,
            },
            _ => writeln!(out, "unknown command `:{command}`; try :help")?,
        }
        Ok(Flow::Continue)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut shell = Shell::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for name in std::env::args().skip(1) {
        shell.load_sample(&name, &mut stdout)?;
    }
    writeln!(stdout, "microprolog; :help for commands")?;

    let mut line = String::new();
    loop {
        write!(stdout, "{}", if shell.pending.is_empty() { "| " } else { "  " })?;
        stdout.flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if shell.handle(&line, &mut stdout)? == Flow::Quit {
            break;
        }
    }
    Ok(())
}
