//! Output formatting for ranked reports

use crate::query::scorer::Report;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub const NO_MATCHES: &str = "No matches found";

/// Write a report as a `Scores:` block, one `name: pct%` line per document
pub fn write_report<W: WriteColor>(out: &mut W, report: &Report) -> io::Result<()> {
    let entries = match report {
        Report::NoMatches => {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            writeln!(out, "{}", NO_MATCHES)?;
            out.reset()?;
            return Ok(());
        }
        Report::Ranked(entries) => entries,
    };

    writeln!(out, "Scores:")?;
    for entry in entries {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(out, "{}", entry.name)?;
        out.reset()?;
        write!(out, ": ")?;

        let color = if entry.matched_units == 0 {
            Color::White
        } else {
            Color::Green
        };
        out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(entry.matched_units > 0))?;
        write!(out, "{:.2}%", entry.percentage)?;
        out.reset()?;
        writeln!(out)?;
    }

    Ok(())
}

/// Print a report to stdout, colored when `color` is set and stdout is a terminal
pub fn print_report(report: &Report, color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_report(&mut stdout, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::scorer::RankedDocument;
    use termcolor::NoColor;

    fn render(report: &Report) -> String {
        let mut out = NoColor::new(Vec::new());
        write_report(&mut out, report).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn test_no_matches() {
        assert_eq!(render(&Report::NoMatches), "No matches found\n");
    }

    #[test]
    fn test_ranked() {
        let report = Report::Ranked(vec![
            RankedDocument {
                doc_id: 0,
                name: "A".to_string(),
                matched_units: 2,
                percentage: 100.0,
            },
            RankedDocument {
                doc_id: 1,
                name: "B".to_string(),
                matched_units: 1,
                percentage: 50.0,
            },
        ]);
        assert_eq!(render(&report), "Scores:\nA: 100.00%\nB: 50.00%\n");
    }

    #[test]
    fn test_fractional_percentage() {
        let report = Report::Ranked(vec![RankedDocument {
            doc_id: 3,
            name: "third.txt".to_string(),
            matched_units: 1,
            percentage: 100.0 / 3.0,
        }]);
        assert_eq!(render(&report), "Scores:\nthird.txt: 33.33%\n");
    }
}
