use crate::value::Color;

pub fn write_integer_into(out: &mut String, value: i64) {
    let mut buffer = itoa::Buffer::new();
    out.push_str(buffer.format(value));
}

/// Shortest round-tripping form; integral floats drop their `.0`.
pub fn write_float_into(out: &mut String, value: f64) {
    let mut buffer = ryu::Buffer::new();
    let formatted = buffer.format(value);
    out.push_str(formatted.strip_suffix(".0").unwrap_or(formatted));
}

pub fn write_color_into(out: &mut String, color: Color) {
    let mut buffer = itoa::Buffer::new();
    out.push_str(buffer.format(color.r));
    out.push(' ');
    out.push_str(buffer.format(color.g));
    out.push(' ');
    out.push_str(buffer.format(color.b));
    if color.a != u8::MAX {
        out.push(' ');
        out.push_str(buffer.format(color.a));
    }
}

pub fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

pub fn parse_float(text: &str) -> Option<f64> {
    let value = text.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Accepts `r g b`, `r g b a` and `#rrggbb` / `#rrggbbaa`.
pub fn parse_color(text: &str) -> Option<Color> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    let mut channels = [u8::MAX; 4];
    let mut count = 0;
    for part in text.split_ascii_whitespace() {
        if count == channels.len() {
            return None;
        }
        channels[count] = part.parse::<u8>().ok()?;
        count += 1;
    }
    if count < 3 {
        return None;
    }
    Some(Color::rgba(channels[0], channels[1], channels[2], channels[3]))
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    if !matches!(hex.len(), 6 | 8) || !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { u8::MAX };
    Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(1.0, "1")]
    #[case(0.5, "0.5")]
    #[case(-2.25, "-2.25")]
    fn test_write_float_into(#[case] value: f64, #[case] expected: &str) {
        let mut out = String::new();
        write_float_into(&mut out, value);
        assert_eq!(out, expected);
    }

    #[rstest::rstest]
    fn test_write_color_into() {
        let mut out = String::new();
        write_color_into(&mut out, Color::rgb(255, 128, 0));
        assert_eq!(out, "255 128 0");

        out.clear();
        write_color_into(&mut out, Color::rgba(1, 2, 3, 4));
        assert_eq!(out, "1 2 3 4");
    }

    #[rstest::rstest]
    fn test_parse_color() {
        assert_eq!(parse_color("255 128 0"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(parse_color(" 1 2 3 4 "), Some(Color::rgba(1, 2, 3, 4)));
        assert_eq!(parse_color("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(parse_color("#ff800080"), Some(Color::rgba(255, 128, 0, 128)));
        assert_eq!(parse_color("1 2"), None);
        assert_eq!(parse_color("1 2 3 4 5"), None);
        assert_eq!(parse_color("256 0 0"), None);
        assert_eq!(parse_color("#ff80"), None);
    }

    #[rstest::rstest]
    fn test_parse_numbers() {
        assert_eq!(parse_integer(" 42 "), Some(42));
        assert_eq!(parse_integer("4.2"), None);
        assert_eq!(parse_float("4.5"), Some(4.5));
        assert_eq!(parse_float("inf"), None);
    }
}
