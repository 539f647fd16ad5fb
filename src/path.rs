//! Interpreter for the restricted path mini-language found in `d` attributes.
//!
//! Only single-space separated tokens are understood. Operands are either a
//! single number or a comma-joined `x,y` pair, depending on the active
//! command. After a move operand the interpreter continues with relative
//! line-tos until the next command letter, even after an uppercase `M`.

use log::trace;

use crate::{CoordinatePair, ResolvedPath};

/// Command letters that are valid SVG but cannot be represented as a
/// polyline by this interpreter.
const UNSUPPORTED_COMMANDS: &str = "cCsSqQtTaALV";

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("Unsupported path command \"{0}\" (curves are not supported, only m, M, l, v, h, H and z)")]
    UnsupportedCommand(String),
    #[error("Malformed token \"{token}\": {reason}")]
    MalformedToken { token: String, reason: &'static str },
}

impl PathError {
    fn malformed(token: &str, reason: &'static str) -> Self {
        PathError::MalformedToken {
            token: token.to_string(),
            reason,
        }
    }
}

/// The active command mode.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Mode {
    /// `M`
    MoveAbsolute,
    /// `m`
    MoveRelative,
    /// `l`
    LineRelative,
    /// `v`
    VerticalRelative,
    /// `h`
    HorizontalRelative,
    /// `H`
    HorizontalAbsolute,
}

impl Mode {
    fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "M" => Some(Mode::MoveAbsolute),
            "m" => Some(Mode::MoveRelative),
            "l" => Some(Mode::LineRelative),
            "v" => Some(Mode::VerticalRelative),
            "h" => Some(Mode::HorizontalRelative),
            "H" => Some(Mode::HorizontalAbsolute),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Command(Mode),
    Close,
    Unsupported(&'a str),
    Operand(&'a str),
}

impl<'a> Token<'a> {
    fn classify(raw: &'a str) -> Self {
        if let Some(mode) = Mode::from_letter(raw) {
            Token::Command(mode)
        } else if raw == "z" || raw == "Z" {
            Token::Close
        } else if raw.len() == 1 && UNSUPPORTED_COMMANDS.contains(raw) {
            Token::Unsupported(raw)
        } else {
            Token::Operand(raw)
        }
    }
}

/// Interpreter state: the active mode plus the cursor, which stays `None`
/// until the first move operand has been processed.
#[derive(Debug, PartialEq)]
struct Cursor {
    mode: Option<Mode>,
    pos: Option<CoordinatePair>,
    points: ResolvedPath,
}

impl Cursor {
    fn new() -> Self {
        Self {
            mode: None,
            pos: None,
            points: ResolvedPath::new(),
        }
    }

    fn feed(mut self, raw: &str) -> Result<Self, PathError> {
        match Token::classify(raw) {
            Token::Command(mode) => {
                trace!("interpret: Mode {:?}", mode);
                self.mode = Some(mode);
            }
            Token::Close => trace!("interpret: Ignoring close path"),
            Token::Unsupported(cmd) => return Err(PathError::UnsupportedCommand(cmd.to_string())),
            Token::Operand(operand) => self.operand(operand)?,
        }
        Ok(self)
    }

    fn operand(&mut self, token: &str) -> Result<(), PathError> {
        if token.is_empty() {
            return Err(PathError::malformed(token, "empty token (repeated space)"));
        }
        let mode = self
            .mode
            .ok_or_else(|| PathError::malformed(token, "operand before any command"))?;
        let next = match (mode, self.pos) {
            // The first moveto is always absolute, whatever its case.
            (Mode::MoveAbsolute, _) | (Mode::MoveRelative, None) => {
                self.mode = Some(Mode::LineRelative);
                parse_pair(token)?
            }
            (Mode::MoveRelative, Some(pos)) => {
                self.mode = Some(Mode::LineRelative);
                pos.offset(parse_pair(token)?)
            }
            (_, None) => {
                return Err(PathError::malformed(token, "drawing operand before moveto"));
            }
            (Mode::LineRelative, Some(pos)) => pos.offset(parse_pair(token)?),
            (Mode::VerticalRelative, Some(pos)) => {
                CoordinatePair::new(pos.x, pos.y + parse_number(token)?)
            }
            (Mode::HorizontalRelative, Some(pos)) => {
                CoordinatePair::new(pos.x + parse_number(token)?, pos.y)
            }
            (Mode::HorizontalAbsolute, Some(pos)) => CoordinatePair::new(parse_number(token)?, pos.y),
        };
        self.pos = Some(next);
        self.points.push(next);
        Ok(())
    }
}

fn parse_number(token: &str) -> Result<f64, PathError> {
    let value: f64 = token
        .parse()
        .map_err(|_| PathError::malformed(token, "expected a number"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PathError::malformed(token, "number is not finite"))
    }
}

fn parse_pair(token: &str) -> Result<CoordinatePair, PathError> {
    let (x, y) = token
        .split_once(',')
        .ok_or_else(|| PathError::malformed(token, "expected an x,y pair"))?;
    match (parse_number(x), parse_number(y)) {
        (Ok(x), Ok(y)) => Ok(CoordinatePair::new(x, y)),
        _ => Err(PathError::malformed(token, "expected an x,y pair")),
    }
}

/// Interpret a single path-data string, returning one absolute coordinate
/// pair per operand token.
pub fn interpret(path_data: &str) -> Result<ResolvedPath, PathError> {
    trace!("interpret");
    let trimmed = path_data.trim();
    if trimmed.is_empty() {
        return Ok(ResolvedPath::new());
    }
    let cursor = trimmed.split(' ').try_fold(Cursor::new(), Cursor::feed)?;
    trace!("interpret: Return {} points", cursor.points.len());
    Ok(cursor.points)
}
