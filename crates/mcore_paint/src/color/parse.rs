//! CSS color syntax parser
//!
//! Built on nom combinators. Every entry point returns `Option`; malformed
//! input is a soft failure that callers resolve with their own fallback.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{alpha1, char, multispace0, multispace1},
    combinator::{map, opt, value},
    multi::separated_list1,
    number::complete::float,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use tracing::debug;

use super::named::named_color;
use super::space::{hsl_to_srgb, lab_to_srgb, lch_to_srgb, Oklab, Oklch};
use super::Color;

/// One argument of a color function.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Component {
    Number(f32),
    Percent(f32),
    Degrees(f32),
    /// The CSS `none` keyword, treated as zero.
    None,
}

impl Component {
    /// Resolve against the range that `100%` maps to.
    fn resolve(self, percent_scale: f32) -> f32 {
        match self {
            Component::Number(v) | Component::Degrees(v) => v,
            Component::Percent(p) => p / 100.0 * percent_scale,
            Component::None => 0.0,
        }
    }

    fn hue(self) -> f32 {
        match self {
            Component::Number(v) | Component::Degrees(v) => v,
            // Percentages are not valid hues; treat as a fraction of a turn
            Component::Percent(p) => p / 100.0 * 360.0,
            Component::None => 0.0,
        }
    }

    fn alpha(self) -> f32 {
        self.resolve(1.0).clamp(0.0, 1.0)
    }
}

pub(crate) fn parse_color(input: &str) -> Option<Color> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok((rest, color)) = parse_hex_color(input) {
        if rest.trim().is_empty() {
            return Some(color);
        }
    }

    if let Ok((rest, color)) = parse_function(input) {
        if rest.trim().is_empty() {
            return color;
        }
    }

    let named = named_color(input);
    if named.is_none() {
        debug!("unrecognized color syntax: {input:?}");
    }
    named
}

/// Parse hex color: #RGB, #RGBA, #RRGGBB, or #RRGGBBAA
fn parse_hex_color(input: &str) -> IResult<&str, Color> {
    let (rest, hex) = preceded(char('#'), take_while1(|c: char| c.is_ascii_hexdigit()))(input)?;

    // take_while1 guarantees every char is a hex digit
    let digits: Vec<u8> = hex
        .chars()
        .map(|c| c.to_digit(16).unwrap_or(0) as u8)
        .collect();
    let pair_at = |i: usize| digits[i] * 16 + digits[i + 1];

    let [r, g, b, a] = match digits.len() {
        3 => [digits[0] * 17, digits[1] * 17, digits[2] * 17, 255],
        4 => [digits[0] * 17, digits[1] * 17, digits[2] * 17, digits[3] * 17],
        6 => [pair_at(0), pair_at(2), pair_at(4), 255],
        8 => [pair_at(0), pair_at(2), pair_at(4), pair_at(6)],
        _ => {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::LengthValue,
            )))
        }
    };

    Ok((rest, Color::from_bytes(r, g, b, a)))
}

fn parse_component(input: &str) -> IResult<&str, Component> {
    alt((
        value(Component::None, tag_no_case("none")),
        map(
            pair(
                float,
                opt(alt((
                    tag("%"),
                    tag_no_case("deg"),
                    tag_no_case("grad"),
                    tag_no_case("rad"),
                    tag_no_case("turn"),
                ))),
            ),
            |(v, unit): (f32, Option<&str>)| match unit.map(|u| u.to_ascii_lowercase()) {
                None => Component::Number(v),
                Some(u) if u == "%" => Component::Percent(v),
                Some(u) if u == "deg" => Component::Degrees(v),
                Some(u) if u == "grad" => Component::Degrees(v * 0.9),
                Some(u) if u == "rad" => Component::Degrees(v.to_degrees()),
                Some(_) => Component::Degrees(v * 360.0),
            },
        ),
    ))(input)
}

/// Comma or whitespace between components (legacy and modern syntax).
fn separator(input: &str) -> IResult<&str, ()> {
    alt((
        value((), delimited(multispace0, char(','), multispace0)),
        value((), multispace1),
    ))(input)
}

/// `name( c1 c2 c3 [/ alpha] )` or `name(c1, c2, c3[, alpha])`.
///
/// The outer `Option` is `None` when the syntax parsed but the function or its
/// arity is not supported.
fn parse_function(input: &str) -> IResult<&str, Option<Color>> {
    let (input, name) = alpha1(input)?;
    let (input, (components, slash_alpha)) = delimited(
        pair(char('('), multispace0),
        pair(
            separated_list1(separator, parse_component),
            opt(preceded(
                tuple((multispace0, char('/'), multispace0)),
                parse_component,
            )),
        ),
        pair(multispace0, char(')')),
    )(input)?;

    let (channels, alpha) = match (components.len(), slash_alpha) {
        (3, alpha) => (&components[..3], alpha),
        (4, None) => (&components[..3], Some(components[3])),
        _ => return Ok((input, None)),
    };
    let alpha = alpha.map(Component::alpha).unwrap_or(1.0);
    let [c0, c1, c2] = [channels[0], channels[1], channels[2]];

    let rgb = match name.to_ascii_lowercase().as_str() {
        "rgb" | "rgba" => {
            let channel = |c: Component| match c {
                Component::Percent(p) => p / 100.0,
                other => other.resolve(1.0) / 255.0,
            };
            [channel(c0), channel(c1), channel(c2)]
        }
        "hsl" | "hsla" => {
            let fraction = |c: Component| match c {
                Component::Number(v) => v / 100.0,
                other => other.resolve(1.0),
            };
            hsl_to_srgb(c0.hue(), fraction(c1), fraction(c2))
        }
        "oklab" => Oklab {
            l: c0.resolve(1.0),
            a: c1.resolve(0.4),
            b: c2.resolve(0.4),
        }
        .to_srgb(),
        "oklch" => Oklch {
            l: c0.resolve(1.0),
            c: c1.resolve(0.4),
            h: c2.hue(),
        }
        .to_oklab()
        .to_srgb(),
        "lab" => lab_to_srgb(c0.resolve(100.0), c1.resolve(125.0), c2.resolve(125.0)),
        "lch" => lch_to_srgb(c0.resolve(100.0), c1.resolve(150.0), c2.hue()),
        other => {
            debug!("unsupported color function: {other}()");
            return Ok((input, None));
        }
    };

    Ok((
        input,
        Some(Color::new(rgb[0], rgb[1], rgb[2], alpha).clamped()),
    ))
}
