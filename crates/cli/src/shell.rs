//! `pgrid shell`: line-oriented parcel form.
//!
//! Mirrors the calculator form: set the two areas, generate parcel rows, edit
//! them, calculate, and copy the table as text. Every edit is recorded in a
//! bounded undo/redo history. Rows are addressed by their 1-based position.

use std::io::{self, BufRead, IsTerminal, Write};

use parcelgrid_config::Settings;
use parcelgrid_core::{History, ParcelForm};
use parcelgrid_io::text;
use parcelgrid_recon::{reconcile_inputs, ReconciliationResult};

use crate::reconcile::text_options;
use crate::CliError;

const HELP: &str = "\
commands:
  count <n>                set the number of parcels for generate
  registered <area>        set the registered area (m²)
  calculated <area>        set the calculated area (m²)
  generate [count]         replace rows with blank parcels (default: count)
  add                      append a parcel row
  remove <row>             delete a parcel row
  label <row> <text>       set a parcel label
  area <row> <area>        set a parcel area
  show                     list the form
  calc                     reconcile and print the table
  copy [tsv|table]         print the last result as text
  undo | redo              step through edit history
  help | quit";

pub fn cmd_shell(settings: &Settings) -> Result<(), CliError> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let stdout = io::stdout();
    run(stdin.lock(), stdout.lock(), settings, interactive)
        .map_err(|e| CliError::io(e.to_string()))
}

/// What a command did to the form.
enum Outcome {
    Edited,
    Unchanged,
    Quit,
}

struct Session<'a> {
    form: ParcelForm,
    history: History<ParcelForm>,
    last_result: Option<ReconciliationResult>,
    settings: &'a Settings,
}

pub fn run<R: BufRead, W: Write>(
    input: R,
    mut out: W,
    settings: &Settings,
    interactive: bool,
) -> io::Result<()> {
    let mut session = Session {
        form: ParcelForm::new(),
        history: History::with_depth(settings.history_depth),
        last_result: None,
        settings,
    };
    session.history.record(session.form.clone());

    if interactive {
        writeln!(out, "pgrid shell: type 'help' for commands")?;
    }

    let mut lines = input.lines();
    loop {
        if interactive {
            write!(out, "pgrid> ")?;
            out.flush()?;
        }
        let Some(line) = lines.next() else { break };
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match session.execute(line, &mut out) {
            Ok(Outcome::Edited) => session.history.record(session.form.clone()),
            Ok(Outcome::Unchanged) => {}
            Ok(Outcome::Quit) => break,
            Err(msg) => writeln!(out, "error: {msg}")?,
        }
    }
    Ok(())
}

impl Session<'_> {
    /// Run one command. `Err` carries a message for the user; the shell keeps going.
    fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Outcome, String> {
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };
        let io_err = |e: io::Error| e.to_string();

        match cmd {
            "count" => {
                self.form.parcel_count = required(rest, "count <n>")?.to_string();
                Ok(Outcome::Edited)
            }
            "registered" => {
                self.form.registered_area = required(rest, "registered <area>")?.to_string();
                Ok(Outcome::Edited)
            }
            "calculated" => {
                self.form.calculated_area = required(rest, "calculated <area>")?.to_string();
                Ok(Outcome::Edited)
            }
            "generate" => {
                let count = if rest.is_empty() {
                    self.form.parcel_count.clone()
                } else {
                    rest.to_string()
                };
                self.form.generate(&count).map_err(|e| e.to_string())?;
                writeln!(out, "{} parcel row(s)", self.form.rows.len()).map_err(io_err)?;
                self.last_result = None;
                Ok(Outcome::Edited)
            }
            "add" => {
                self.form.add_row();
                writeln!(out, "row {} added", self.form.rows.len()).map_err(io_err)?;
                Ok(Outcome::Edited)
            }
            "remove" => {
                let id = self.row_id(rest)?;
                self.form.remove_row(id).map_err(|e| e.to_string())?;
                Ok(Outcome::Edited)
            }
            "label" | "area" => {
                let usage = if cmd == "label" { "label <row> <text>" } else { "area <row> <area>" };
                let (row, value) = rest.split_once(char::is_whitespace).ok_or(format!("usage: {usage}"))?;
                let id = self.row_id(row)?;
                let value = value.trim();
                let edited = if cmd == "label" {
                    self.form.set_label(id, value)
                } else {
                    self.form.set_area(id, value)
                };
                edited.map_err(|e| e.to_string())?;
                Ok(Outcome::Edited)
            }
            "show" => {
                self.show(out).map_err(io_err)?;
                Ok(Outcome::Unchanged)
            }
            "calc" => {
                let inputs = self.form.to_inputs().map_err(|e| e.to_string())?;
                let result = reconcile_inputs(&inputs).map_err(|e| e.to_string())?;
                let opts = text_options(self.settings, self.settings.decimals);
                write!(out, "{}", text::to_fixed_width(&result, &opts)).map_err(io_err)?;
                if result.exceeds_limit {
                    writeln!(out, "Error exceeds permissible limits. Using original areas.")
                        .map_err(io_err)?;
                }
                self.last_result = Some(result);
                Ok(Outcome::Unchanged)
            }
            "copy" => {
                let result = self.last_result.as_ref().ok_or("No table found to copy.")?;
                let decimals = self.settings.decimals;
                let rendered = match rest {
                    "" | "table" => text::to_fixed_width(result, &text_options(self.settings, decimals)),
                    "tsv" => text::to_tsv(result, decimals),
                    other => return Err(format!("unknown copy format '{other}' (expected tsv or table)")),
                };
                write!(out, "{rendered}").map_err(io_err)?;
                Ok(Outcome::Unchanged)
            }
            "undo" => {
                let snapshot = self.history.undo().cloned().ok_or("nothing to undo")?;
                self.form = snapshot;
                Ok(Outcome::Unchanged)
            }
            "redo" => {
                let snapshot = self.history.redo().cloned().ok_or("nothing to redo")?;
                self.form = snapshot;
                Ok(Outcome::Unchanged)
            }
            "help" | "?" => {
                writeln!(out, "{HELP}").map_err(io_err)?;
                Ok(Outcome::Unchanged)
            }
            "quit" | "exit" => Ok(Outcome::Quit),
            other => Err(format!("unknown command '{other}' (try 'help')")),
        }
    }

    fn row_id(&self, text: &str) -> Result<u64, String> {
        let pos: usize = text
            .trim()
            .parse()
            .map_err(|_| format!("'{text}' is not a row number"))?;
        pos.checked_sub(1)
            .and_then(|idx| self.form.rows.get(idx))
            .map(|row| row.id)
            .ok_or_else(|| format!("no row {pos} (form has {} row(s))", self.form.rows.len()))
    }

    fn show<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "registered: {}", display_or_dash(&self.form.registered_area))?;
        writeln!(out, "calculated: {}", display_or_dash(&self.form.calculated_area))?;
        writeln!(out, "count:      {}", display_or_dash(&self.form.parcel_count))?;
        for (i, row) in self.form.rows.iter().enumerate() {
            writeln!(
                out,
                "{:>3}  {:<12} {}",
                i + 1,
                display_or_dash(&row.label),
                display_or_dash(&row.area)
            )?;
        }
        Ok(())
    }
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(rest)
    }
}

fn display_or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_script(script: &str) -> String {
        run_with(script, &Settings::default())
    }

    fn run_with(script: &str, settings: &Settings) -> String {
        let mut out = Vec::new();
        run(script.as_bytes(), &mut out, settings, false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn calc_prints_table() {
        let out = run_script(
            "registered 1000\ncalculated 998\ngenerate 2\narea 1 500\narea 2 498\ncalc\n",
        );
        assert!(out.contains("2 parcel row(s)"));
        assert!(out.contains("     1            501.00             501"));
        assert!(out.contains("Status: Calculation within acceptable limits"));
    }

    #[test]
    fn exceeded_limit_is_announced() {
        let out = run_script("registered 1000\ncalculated 500\ngenerate 1\narea 1 500\ncalc\n");
        assert!(out.contains("*** WARNING: Error exceeds permissible limits! ***"));
        assert!(out.contains("Error exceeds permissible limits. Using original areas."));
    }

    #[test]
    fn undo_restores_previous_edit() {
        let out = run_script(
            "registered 100\ncalculated 100\ngenerate 1\narea 1 10\narea 1 20\nundo\ncopy\ncalc\ncopy tsv\n",
        );
        assert!(out.contains("error: No table found to copy."));
        assert!(out.contains("1\t10.00\t10\n"));
    }

    #[test]
    fn redo_after_undo() {
        let out = run_script("generate 2\nadd\nundo\nshow\nredo\nshow\nredo\n");
        let shows: Vec<&str> = out.matches("  3  3").collect();
        assert_eq!(shows.len(), 1, "{out}");
        assert!(out.contains("error: nothing to redo"));
    }

    #[test]
    fn history_depth_comes_from_settings() {
        let settings = Settings {
            history_depth: 2,
            ..Settings::default()
        };
        let out = run_with("registered 1\nregistered 2\nregistered 3\nundo\nundo\nshow\n", &settings);
        assert!(out.contains("error: nothing to undo"));
        assert!(out.contains("registered: 2"));
    }

    #[test]
    fn bad_commands_report_and_continue() {
        let out = run_script("frobnicate\ngenerate 0\nremove 4\narea 1\ncalc\nquit\nshow\n");
        assert!(out.contains("error: unknown command 'frobnicate'"));
        assert!(out.contains("error: Please enter a valid number of parcels."));
        assert!(out.contains("error: no row 4 (form has 0 row(s))"));
        assert!(out.contains("error: usage: area <row> <area>"));
        assert!(out.contains("error: registered area: '' is not a number"));
        // nothing after quit runs
        assert!(!out.contains("registered: -"));
    }

    #[test]
    fn count_drives_generate() {
        let out = run_script("count 3\nshow\ngenerate\nshow\ncount 1\nundo\ngenerate\n");
        assert!(out.contains("count:      3"));
        assert_eq!(out.matches("3 parcel row(s)").count(), 2, "{out}");
        assert!(out.contains("  3  3            -"));
    }

    #[test]
    fn generate_without_count_is_rejected() {
        let out = run_script("generate\ncount x\ngenerate\n");
        assert_eq!(
            out.matches("error: Please enter a valid number of parcels.").count(),
            2
        );
    }

    #[test]
    fn remove_and_label_rows() {
        let out = run_script("generate 3\nremove 2\nlabel 2 North lot\nshow\n");
        assert!(out.contains("  1  1            -"));
        assert!(out.contains("  2  North lot    -"));
        assert!(!out.contains("  3  "));
    }

    #[test]
    fn zero_calculated_area_is_rejected() {
        let out = run_script("registered 100\ncalculated 0\ncalc\n");
        assert!(out.contains("error: calculated area must be a positive number, got 0"));
    }
}
