//! Template-driven control sequence matcher.

use crate::sequence::{SequenceId, Template, Token, TEMPLATES};

/// Largest number of numeric parameters kept from one sequence.
///
/// Further parameters are still consumed, but their values are dropped.
pub const MAX_PARAMS: usize = 16;

/// A fully recognized control sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceMatch {
    /// Which sequence was recognized
    pub id: SequenceId,
    /// Numeric parameters in order of appearance
    pub params: Vec<u32>,
    /// Byte captured by a [`Token::Character`] placeholder
    pub captured: Option<u8>,
    /// Number of input bytes the sequence occupies
    pub consumed: usize,
}

impl SequenceMatch {
    /// Parameter at `index`, or `default` when absent.
    pub fn param_or(&self, index: usize, default: u32) -> u32 {
        self.params.get(index).copied().unwrap_or(default)
    }

    /// Parameter at `index` used as a repeat count: absent or zero means one.
    pub fn count(&self, index: usize) -> u32 {
        self.param_or(index, 1).max(1)
    }
}

/// Outcome of matching a byte window against the template table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// A template matched completely.
    Matched(SequenceMatch),
    /// No template can match, whatever bytes follow.
    NoMatch,
    /// At least one template could still match once more bytes arrive.
    Partial,
}

enum Walk {
    Complete(SequenceMatch),
    Partial,
    Mismatch,
}

/// Match the start of `input` against every known sequence.
///
/// Only `input[..max_len]` is examined. Templates are tried in table order
/// and the first complete match wins.
pub fn match_sequence(input: &[u8], max_len: usize) -> MatchResult {
    let window = &input[..input.len().min(max_len)];
    let mut partial = false;

    for template in TEMPLATES {
        match walk(template, window) {
            Walk::Complete(m) => return MatchResult::Matched(m),
            Walk::Partial => partial = true,
            Walk::Mismatch => {}
        }
    }

    if partial {
        MatchResult::Partial
    } else {
        MatchResult::NoMatch
    }
}

fn walk(template: &Template, window: &[u8]) -> Walk {
    let mut pos = 0;
    let mut params = Vec::new();
    let mut captured = None;

    for token in template.tokens {
        match *token {
            Token::Literal(expected) => match window.get(pos) {
                None => return Walk::Partial,
                Some(&b) if b == expected => pos += 1,
                Some(_) => return Walk::Mismatch,
            },
            Token::OptionalNumber => {
                let (value, digits) = read_number(&window[pos..]);
                pos += digits;
                if pos == window.len() {
                    return Walk::Partial;
                }
                if digits > 0 {
                    push_param(&mut params, value);
                }
            }
            Token::NumberList => {
                let mut fields = 0;
                loop {
                    let (value, digits) = read_number(&window[pos..]);
                    pos += digits;
                    match window.get(pos) {
                        None => return Walk::Partial,
                        Some(b';') => {
                            // An empty field still holds its place.
                            push_param(&mut params, value);
                            fields += 1;
                            pos += 1;
                        }
                        Some(_) => {
                            if digits > 0 || fields > 0 {
                                push_param(&mut params, value);
                            }
                            break;
                        }
                    }
                }
            }
            Token::Character => match window.get(pos) {
                None => return Walk::Partial,
                Some(&b) => {
                    captured = Some(b);
                    pos += 1;
                }
            },
            Token::OptionalString => {
                pos += window[pos..].iter().take_while(|&&b| b >= 0x20).count();
                if pos == window.len() {
                    return Walk::Partial;
                }
            }
        }
    }

    Walk::Complete(SequenceMatch {
        id: template.id,
        params,
        captured,
        consumed: pos,
    })
}

/// Parse leading ASCII digits, saturating on overflow.
fn read_number(bytes: &[u8]) -> (u32, usize) {
    let mut value: u32 = 0;
    let mut digits = 0;
    for &b in bytes.iter().take_while(|b| b.is_ascii_digit()) {
        value = value.saturating_mul(10).saturating_add(u32::from(b - b'0'));
        digits += 1;
    }
    (value, digits)
}

fn push_param(params: &mut Vec<u32>, value: u32) {
    if params.len() < MAX_PARAMS {
        params.push(value);
    }
}
