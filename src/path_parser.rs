//! Parser for SVG path data, restricted to the `M L H V C Z` commands.

use std::fmt;
use std::iter::Enumerate;
use std::str;
use std::str::Bytes;

use crate::path::PathBuilder;

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Token {
    // pub to allow benchmarking
    Number(f64),
    Command(u8),
    Comma,
}

use crate::path_parser::Token::{Comma, Command, Number};

#[derive(Debug)]
pub struct Lexer<'a> {
    // pub to allow benchmarking
    input: &'a [u8],
    ci: Enumerate<Bytes<'a>>,
    current: Option<(usize, u8)>,
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum LexError {
    // pub to allow benchmarking
    ParseFloatError,
    UnexpectedByte(u8),
    UnexpectedEof,
}

impl<'a> Lexer<'_> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        let mut ci = input.bytes().enumerate();
        let current = ci.next();
        Lexer {
            input: input.as_bytes(),
            ci,
            current,
        }
    }

    fn current_pos(&self) -> usize {
        match self.current {
            None => self.input.len(),
            Some((pos, _)) => pos,
        }
    }

    fn advance(&mut self) {
        self.current = self.ci.next();
    }

    fn advance_while(&mut self, pred: impl Fn(u8) -> bool) -> bool {
        let mut found_some = false;
        while let Some((_, c)) = self.current {
            if !pred(c) {
                break;
            }
            found_some = true;
            self.advance();
        }
        found_some
    }

    fn advance_over_optional(&mut self, needle: u8) -> bool {
        match self.current {
            Some((_, c)) if c == needle => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn advance_over_digits(&mut self) -> bool {
        self.advance_while(|c| c.is_ascii_digit())
    }

    fn advance_over_simple_number(&mut self) -> bool {
        let _ = self.advance_over_optional(b'-') || self.advance_over_optional(b'+');
        let found_digit = self.advance_over_digits();
        let _ = self.advance_over_optional(b'.');
        self.advance_over_digits() || found_digit
    }

    fn match_number(&mut self) -> Result<Token, LexError> {
        let start_pos = self.current_pos();

        if !self.advance_over_simple_number() {
            return match self.current {
                None => Err(LexError::UnexpectedEof),
                Some((_, c)) => Err(LexError::UnexpectedByte(c)),
            };
        }

        if self.advance_over_optional(b'e') || self.advance_over_optional(b'E') {
            let _ = self.advance_over_optional(b'-') || self.advance_over_optional(b'+');
            let _ = self.advance_over_digits();
        }

        let end_pos = self.current_pos();

        str::from_utf8(&self.input[start_pos..end_pos])
            .map_err(|_| LexError::ParseFloatError)?
            .parse::<f64>()
            .map(Number)
            .map_err(|_| LexError::ParseFloatError)
    }
}

impl Iterator for Lexer<'_> {
    type Item = (usize, Result<Token, LexError>);

    fn next(&mut self) -> Option<Self::Item> {
        self.advance_while(|c| c.is_ascii_whitespace());

        match self.current {
            Some((pos, b',')) => {
                self.advance();
                Some((pos, Ok(Comma)))
            }

            Some((pos, c)) if c.is_ascii_alphabetic() => {
                self.advance();
                Some((pos, Ok(Command(c))))
            }

            Some((pos, c)) if c.is_ascii_digit() || c == b'-' || c == b'+' || c == b'.' => {
                Some((pos, self.match_number()))
            }

            Some((pos, c)) => {
                self.advance();
                Some((pos, Err(LexError::UnexpectedByte(c))))
            }

            None => None,
        }
    }
}

pub struct PathParser<'b> {
    tokens: Lexer<'b>,
    current_pos_and_token: Option<(usize, Result<Token, LexError>)>,

    builder: &'b mut PathBuilder,

    current_x: f64,
    current_y: f64,

    // Position of the last moveto; closepath returns here.
    subpath_start_x: f64,
    subpath_start_y: f64,
}

// Recursive descent parser for the subset of the path data grammar in
// https://www.w3.org/TR/SVG/paths.html#PathDataBNF that has no arcs or quadratics.
//
// Commas are optional between numbers and whitespace is optional where it is not
// needed to separate tokens, so "M-10,20-30-40" is "M -10 20 -30 -40".
impl<'b> PathParser<'b> {
    pub fn new(builder: &'b mut PathBuilder, path_str: &'b str) -> PathParser<'b> {
        let mut lexer = Lexer::new(path_str);
        let pt = lexer.next();
        PathParser {
            tokens: lexer,
            current_pos_and_token: pt,

            builder,

            current_x: 0.0,
            current_y: 0.0,

            subpath_start_x: 0.0,
            subpath_start_y: 0.0,
        }
    }

    // The match_* methods consume the requested token and return its value, or
    // return an error without advancing.

    fn unexpected(&self) -> ParseError {
        match &self.current_pos_and_token {
            Some((pos, Ok(t))) => ParseError::new(*pos, UnexpectedToken(*t)),
            Some((pos, Err(e))) => ParseError::new(*pos, LexError(*e)),
            None => ParseError::new(self.tokens.input.len(), UnexpectedEof),
        }
    }

    fn match_command(&mut self) -> Result<u8, ParseError> {
        match self.current_pos_and_token {
            Some((_, Ok(Command(c)))) => {
                self.current_pos_and_token = self.tokens.next();
                Ok(c)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn match_number(&mut self) -> Result<f64, ParseError> {
        match self.current_pos_and_token {
            Some((_, Ok(Number(n)))) => {
                self.current_pos_and_token = self.tokens.next();
                Ok(n)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn match_comma(&mut self) -> Result<(), ParseError> {
        match self.current_pos_and_token {
            Some((_, Ok(Comma))) => {
                self.current_pos_and_token = self.tokens.next();
                Ok(())
            }
            _ => Err(self.unexpected()),
        }
    }

    fn eat_optional_comma(&mut self) {
        let _ = self.match_comma();
    }

    fn match_comma_number(&mut self) -> Result<f64, ParseError> {
        self.eat_optional_comma();
        self.match_number()
    }

    fn peek_command(&self) -> Option<u8> {
        match self.current_pos_and_token {
            Some((_, Ok(Command(c)))) => Some(c),
            _ => None,
        }
    }

    fn peek_number(&self) -> Option<f64> {
        match self.current_pos_and_token {
            Some((_, Ok(Number(n)))) => Some(n),
            _ => None,
        }
    }

    /// Parses the whole path data string into the builder.
    pub fn parse(&mut self) -> Result<(), ParseError> {
        if self.current_pos_and_token.is_none() {
            return Ok(());
        }

        loop {
            self.moveto()?;
            while self.drawto_command()? {}

            if self.current_pos_and_token.is_none() {
                break;
            }
        }

        Ok(())
    }

    fn coordinate_pair(&mut self) -> Result<(f64, f64), ParseError> {
        Ok((self.match_number()?, self.match_comma_number()?))
    }

    fn emit_move_to(&mut self, x: f64, y: f64) {
        self.current_x = x;
        self.current_y = y;
        self.subpath_start_x = x;
        self.subpath_start_y = y;

        self.builder.move_to(x, y);
    }

    fn emit_line_to(&mut self, x: f64, y: f64) {
        self.current_x = x;
        self.current_y = y;

        self.builder.line_to(x, y);
    }

    fn emit_curve_to(&mut self, x2: f64, y2: f64, x3: f64, y3: f64, x4: f64, y4: f64) {
        self.current_x = x4;
        self.current_y = y4;

        self.builder.curve_to(x2, y2, x3, y3, x4, y4);
    }

    fn emit_close_path(&mut self) {
        self.current_x = self.subpath_start_x;
        self.current_y = self.subpath_start_y;

        self.builder.close_path();
    }

    fn moveto(&mut self) -> Result<(), ParseError> {
        let pos = self.current_pos_and_token.as_ref().map_or(0, |(pos, _)| *pos);

        let absolute = match self.match_command()? {
            b'M' => true,
            b'm' => false,
            c => return Err(ParseError::new(pos, UnexpectedCommand(c))),
        };

        let (mut x, mut y) = self.coordinate_pair()?;

        if !absolute {
            x += self.current_x;
            y += self.current_y;
        }

        self.emit_move_to(x, y);

        // Extra coordinate pairs after a moveto are implicit linetos.
        if self.match_comma().is_ok() || self.peek_number().is_some() {
            self.lineto_argument_sequence(absolute)
        } else {
            Ok(())
        }
    }

    fn drawto_command(&mut self) -> Result<bool, ParseError> {
        let (cmd, absolute) = match self.peek_command() {
            Some(b'M') | Some(b'm') | None => return Ok(false),
            Some(c) => (c.to_ascii_uppercase(), c.is_ascii_uppercase()),
        };

        let pos = self.current_pos_and_token.as_ref().map_or(0, |(pos, _)| *pos);
        self.match_command()?;

        match cmd {
            b'Z' => self.emit_close_path(),
            b'L' => self.lineto_argument_sequence(absolute)?,
            b'H' => self.horizontal_lineto_argument_sequence(absolute)?,
            b'V' => self.vertical_lineto_argument_sequence(absolute)?,
            b'C' => self.curveto_argument_sequence(absolute)?,
            _ => return Err(ParseError::new(pos, UnexpectedCommand(cmd))),
        }

        Ok(true)
    }

    fn should_break_arg_sequence(&mut self) -> bool {
        if self.match_comma().is_ok() {
            false
        } else {
            self.peek_number().is_none()
        }
    }

    fn lineto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let (mut x, mut y) = self.coordinate_pair()?;

            if !absolute {
                x += self.current_x;
                y += self.current_y;
            }

            self.emit_line_to(x, y);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn horizontal_lineto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let mut x = self.match_number()?;

            if !absolute {
                x += self.current_x;
            }

            let y = self.current_y;
            self.emit_line_to(x, y);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn vertical_lineto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let mut y = self.match_number()?;

            if !absolute {
                y += self.current_y;
            }

            let x = self.current_x;
            self.emit_line_to(x, y);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn curveto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let (mut x2, mut y2) = self.coordinate_pair()?;

            self.eat_optional_comma();
            let (mut x3, mut y3) = self.coordinate_pair()?;

            self.eat_optional_comma();
            let (mut x4, mut y4) = self.coordinate_pair()?;

            if !absolute {
                x2 += self.current_x;
                y2 += self.current_y;
                x3 += self.current_x;
                y3 += self.current_y;
                x4 += self.current_x;
                y4 += self.current_y;
            }

            self.emit_curve_to(x2, y2, x3, y3, x4, y4);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    UnexpectedToken(Token),
    UnexpectedCommand(u8),
    UnexpectedEof,
    LexError(LexError),
}

#[derive(Debug, PartialEq)]
pub struct ParseError {
    pub position: usize,
    pub kind: ErrorKind,
}

impl ParseError {
    fn new(pos: usize, k: ErrorKind) -> ParseError {
        ParseError {
            position: pos,
            kind: k,
        }
    }
}

use crate::path_parser::ErrorKind::*;

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self.kind {
            UnexpectedToken(_t) => "unexpected token",
            UnexpectedCommand(_c) => "unexpected command",
            UnexpectedEof => "unexpected end of data",
            LexError(_le) => "error processing token",
        };
        write!(f, "error at position {}: {}", self.position, description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{PathVector, Segment};

    fn parse(s: &str) -> Result<PathVector, ParseError> {
        let mut builder = PathBuilder::default();
        builder.parse(s)?;
        Ok(builder.into_path_vector())
    }

    fn line(from: (f64, f64), to: (f64, f64)) -> Segment {
        Segment::Line { from, to }
    }

    #[test]
    fn handles_empty_data() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("  \t\n").unwrap().is_empty());
    }

    #[test]
    fn lexes_numbers_without_separators() {
        let tokens: Vec<_> = Lexer::new("M.1-2,3E2-4")
            .map(|(_, t)| t.unwrap())
            .collect();

        assert_eq!(
            tokens,
            vec![
                Command(b'M'),
                Number(0.1),
                Number(-2.0),
                Comma,
                Number(300.0),
                Number(-4.0)
            ]
        );
    }

    #[test]
    fn moveto_extra_pairs_are_linetos() {
        let pv = parse("M10 20 30 40 m 5,5 5,5").unwrap();

        assert_eq!(pv.sub_paths().len(), 2);
        assert_eq!(pv.sub_paths()[0].segments(), &[line((10.0, 20.0), (30.0, 40.0))]);
        assert_eq!(pv.sub_paths()[1].segments(), &[line((35.0, 45.0), (40.0, 50.0))]);
    }

    #[test]
    fn handles_horizontal_and_vertical_lines() {
        let pv = parse("M1 1 H 5 v 3 h-2 V 0").unwrap();

        assert_eq!(
            pv.sub_paths()[0].segments(),
            &[
                line((1.0, 1.0), (5.0, 1.0)),
                line((5.0, 1.0), (5.0, 4.0)),
                line((5.0, 4.0), (3.0, 4.0)),
                line((3.0, 4.0), (3.0, 0.0)),
            ]
        );
    }

    #[test]
    fn handles_relative_curveto() {
        let pv = parse("M10 10 c 1 2 3 4 5 6").unwrap();

        assert_eq!(
            pv.sub_paths()[0].segments(),
            &[Segment::Cubic {
                from: (10.0, 10.0),
                ctrl1: (11.0, 12.0),
                ctrl2: (13.0, 14.0),
                to: (15.0, 16.0),
            }]
        );
    }

    #[test]
    fn close_path_returns_to_subpath_start() {
        let pv = parse("M0 0 L 10 0 10 10 z l 5 5").unwrap();

        assert_eq!(pv.sub_paths().len(), 2);
        assert!(pv.sub_paths()[0].is_closed());
        assert_eq!(pv.sub_paths()[1].segments(), &[line((0.0, 0.0), (5.0, 5.0))]);
    }

    #[test]
    fn first_command_must_be_moveto() {
        assert_eq!(
            parse("L 10 10"),
            Err(ParseError::new(0, UnexpectedCommand(b'L')))
        );
    }

    #[test]
    fn rejects_unsupported_commands() {
        assert_eq!(
            parse("M 0 0 Q 1 1 2 2"),
            Err(ParseError::new(6, UnexpectedCommand(b'Q')))
        );
    }

    #[test]
    fn reports_missing_arguments() {
        assert_eq!(parse("M 10"), Err(ParseError::new(4, UnexpectedEof)));
        assert_eq!(
            parse("M 10 20 L 5 x"),
            Err(ParseError::new(12, UnexpectedToken(Command(b'x'))))
        );
        assert_eq!(
            parse("M 10 20 C 1 2 3 4,,"),
            Err(ParseError::new(18, UnexpectedToken(Comma)))
        );
    }
}
