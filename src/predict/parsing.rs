use sgp4::Elements;

use crate::predict::error::PredictError;
use crate::predict::propagation::OrbitalState;

pub const TLE_LINE_LENGTH: usize = 69;

type Field = (&'static str, usize, usize);

// epoch, first derivative of mean motion
const LINE1_DECIMAL_FIELDS: &[Field] = &[("epoch", 18, 32), ("mean motion derivative", 33, 43)];

const LINE2_DECIMAL_FIELDS: &[Field] = &[
    ("inclination", 8, 16),
    ("right ascension", 17, 25),
    ("argument of perigee", 34, 42),
    ("mean anomaly", 43, 51),
    ("mean motion", 52, 63),
];

// implied leading decimal point
const LINE2_DIGIT_FIELDS: &[Field] = &[("eccentricity", 26, 33)];

/// Parses a three-line TLE (name, line 1, line 2). Lines after the third are
/// ignored.
pub fn parse_tle(tle: &str) -> Result<OrbitalState, PredictError> {
    let lines: Vec<&str> = tle.lines().collect();
    if lines.len() < 3 {
        return Err(PredictError::malformed(
            lines.len() + 1,
            format!("expected name and two element lines, got {} line(s)", lines.len()),
        ));
    }

    let name = Some(lines[0].trim())
        .filter(|n| !n.is_empty())
        .map(String::from);
    parse_tle_lines(name, lines[1], lines[2])
}

/// Parses the two element lines, with an optional object name.
pub fn parse_tle_lines(
    name: Option<String>,
    line1: &str,
    line2: &str,
) -> Result<OrbitalState, PredictError> {
    let line1 = line1.trim();
    let line2 = line2.trim();
    check_element_line(line1, '1', 2)?;
    check_element_line(line2, '2', 3)?;
    check_numeric_fields(line1, LINE1_DECIMAL_FIELDS, &[], 2)?;
    check_numeric_fields(line2, LINE2_DECIMAL_FIELDS, LINE2_DIGIT_FIELDS, 3)?;

    let elements = Elements::from_tle(name, line1.as_bytes(), line2.as_bytes())
        .map_err(|e| PredictError::malformed(2, e.to_string()))?;

    log::debug!(
        "parsed elements for NORAD {} (epoch {})",
        elements.norad_id,
        elements.datetime
    );

    OrbitalState::from_elements(elements)
}

fn check_element_line(line: &str, number: char, text_line: usize) -> Result<(), PredictError> {
    if line.is_empty() {
        return Err(PredictError::malformed(text_line, "element line is empty"));
    }
    if !line.is_ascii() {
        return Err(PredictError::malformed(text_line, "element line must be ASCII"));
    }
    if line.len() != TLE_LINE_LENGTH {
        return Err(PredictError::malformed(
            text_line,
            format!("expected {} characters, got {}", TLE_LINE_LENGTH, line.len()),
        ));
    }
    if !line.starts_with(number) || line.as_bytes()[1] != b' ' {
        return Err(PredictError::malformed(
            text_line,
            format!("expected line to start with \"{} \"", number),
        ));
    }

    let expected = checksum(&line[..TLE_LINE_LENGTH - 1]);
    let found = line.as_bytes()[TLE_LINE_LENGTH - 1];
    if !found.is_ascii_digit() || u32::from(found - b'0') != expected {
        return Err(PredictError::malformed(
            text_line,
            format!("bad checksum, expected {}", expected),
        ));
    }
    Ok(())
}

/// Per-line field decoding, so a bad field is reported against its own line.
/// Expects a line that already passed `check_element_line`.
fn check_numeric_fields(
    line: &str,
    decimals: &[Field],
    digits: &[Field],
    text_line: usize,
) -> Result<(), PredictError> {
    for &(name, start, end) in decimals {
        let value = line[start..end].trim();
        if !value.parse::<f64>().is_ok_and(f64::is_finite) {
            return Err(PredictError::malformed(
                text_line,
                format!("{} \"{}\" is not a number", name, value),
            ));
        }
    }
    for &(name, start, end) in digits {
        let value = &line[start..end];
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PredictError::malformed(
                text_line,
                format!("{} \"{}\" is not a digit field", name, value),
            ));
        }
    }
    Ok(())
}

/// Modulo-10 sum of digits, with '-' counting as one.
fn checksum(body: &str) -> u32 {
    body.chars()
        .map(|c| match c {
            '-' => 1,
            c => c.to_digit(10).unwrap_or(0),
        })
        .sum::<u32>()
        % 10
}
