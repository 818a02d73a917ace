use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use crate::charts::{self, Figure};
use crate::data::model::Catalog;
use crate::ui::Renderer;

pub const EXIT_CODE: &str = "q";
pub const FAREWELL: &str = "Thank you for your interest in science!";
pub const INVALID_OPTION: &str = "\tInvalid option.";

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// One menu entry: its two-letter code and the chart it draws.
pub struct Action {
    pub code: &'static str,
    pub label: &'static str,
    /// Printed when the action starts.
    pub notice: &'static str,
    pub build: fn(&Catalog, &Settings) -> Figure,
}

/// Parameters the chart routines take besides the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub point_alpha: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            point_alpha: charts::DEFAULT_POINT_ALPHA,
        }
    }
}

pub static ACTIONS: [Action; 6] = [
    Action {
        code: "aa",
        label: "Map objects in supergalactic coordinates",
        notice: "- galaxies_3d: mapping objects in supergalactic coordinates",
        build: |c, _| charts::galaxies_3d(c),
    },
    Action {
        code: "ab",
        label: "Colour galaxies by distance error",
        notice: "- galaxies_by_error: shading galaxies by their errors",
        build: |c, _| charts::galaxies_by_error(c),
    },
    Action {
        code: "ac",
        label: "Vector field of galaxy motion without galaxies",
        notice: "- vector_field: mapping the motion of galaxies",
        build: |c, _| charts::vector_field(c),
    },
    Action {
        code: "ad",
        label: "Vector field of galaxy motion with galaxies",
        notice: "- vector_field_with_galaxies: mapping the motion of galaxies with galaxies plotted",
        build: |c, s| charts::vector_field_with_galaxies(c, s.point_alpha),
    },
    Action {
        code: "ae",
        label: "Histogram of the distance modulus (DM)",
        notice: "- magnitude_histogram: distribution of the distance modulus",
        build: |c, _| charts::magnitude_histogram(c),
    },
    Action {
        code: "af",
        label: "Scatter plot coloured by distance modulus (DM)",
        notice: "- scatter_with_magnitude: scatter coloured by distance modulus",
        build: |c, _| charts::scatter_with_magnitude(c),
    },
];

/// What a line of input asks for.
pub enum Selection {
    Run(&'static Action),
    Exit,
    Invalid,
}

/// Look up a token, ignoring case and surrounding whitespace.
pub fn parse_selection(input: &str) -> Selection {
    let token = input.trim().to_lowercase();
    if token == EXIT_CODE {
        return Selection::Exit;
    }
    ACTIONS
        .iter()
        .find(|a| a.code == token)
        .map_or(Selection::Invalid, Selection::Run)
}

// ---------------------------------------------------------------------------
// Prompt loop
// ---------------------------------------------------------------------------

fn print_menu(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "\nINDEX")?;
    for action in &ACTIONS {
        writeln!(out, "{} - {}", action.code, action.label)?;
    }
    writeln!(out, "{EXIT_CODE} - Quit")?;
    write!(out, "Enter your choice: ")?;
    out.flush()
}

/// Read selections from `input` until the exit code or end of input.
///
/// A failed render is reported and the prompt comes back; only I/O errors on
/// `input`/`output` end the loop with an error.
pub fn run<R, W, G>(
    catalog: &Catalog,
    settings: &Settings,
    mut input: R,
    mut output: W,
    renderer: &mut G,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    G: Renderer + ?Sized,
{
    let mut line = String::new();
    loop {
        print_menu(&mut output).context("writing menu")?;

        line.clear();
        let read = input.read_line(&mut line).context("reading selection")?;
        if read == 0 {
            writeln!(output).context("writing to console")?;
            log::info!("end of input, leaving");
            return Ok(());
        }

        match parse_selection(&line) {
            Selection::Exit => {
                writeln!(output, "{FAREWELL}").context("writing to console")?;
                return Ok(());
            }
            Selection::Invalid => {
                writeln!(output, "{INVALID_OPTION}").context("writing to console")?;
            }
            Selection::Run(action) => {
                writeln!(output, "{}", action.notice).context("writing to console")?;
                let figure = (action.build)(catalog, settings);
                log::debug!(
                    "{}: '{}' with {} elements",
                    action.code,
                    figure.title,
                    figure.element_count()
                );
                if let Err(e) = renderer.show(figure) {
                    log::error!("{}: {e:#}", action.code);
                    writeln!(output, "\tCould not display the chart: {e:#}")
                        .context("writing to console")?;
                }
            }
        }
    }
}
