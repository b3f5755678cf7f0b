//! Utility functions

use crate::constants::APP_NAME;
use std::path::PathBuf;

// Droplet over a wave, used for the sidebar logo and window icon
pub const LOGO_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 120 120"><defs><style>.d{fill:#2dd4bf}.w{fill:none;stroke:#5dade2;stroke-width:7;stroke-linecap:round}</style></defs><path class="d" d="M60 8C60 8 28 46 28 68a32 32 0 0 0 64 0C92 46 60 8 60 8z"/><path class="w" d="M10 108c12-10 22-10 34 0s22 10 34 0s22-10 34 0"/></svg>"#;

/// Rasterize the logo SVG at the given width, preserving aspect ratio.
pub fn rasterize_logo(width: u32) -> Option<(Vec<u8>, u32, u32)> {
    let tree = resvg::usvg::Tree::from_str(LOGO_SVG, &resvg::usvg::Options::default()).ok()?;
    let svg_size = tree.size();
    let scale = width as f32 / svg_size.width();
    let height = (svg_size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Some((premul_to_straight(&pixmap), width, height))
}

fn premul_to_straight(pixmap: &resvg::tiny_skia::Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let a = p.alpha();
            if a == 0 {
                [0, 0, 0, 0]
            } else {
                let r = (p.red() as u16 * 255 / a as u16) as u8;
                let g = (p.green() as u16 * 255 / a as u16) as u8;
                let b = (p.blue() as u16 * 255 / a as u16) as u8;
                [r, g, b, a]
            }
        })
        .collect()
}

/// Get the app data directory (settings, logs)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Round to two decimal places, ties to even.
/// Goes through the exact decimal expansion so 0.46499999999999997 stays below the tie.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Uppercase the first character, lowercase the rest ("lead" -> "Lead")
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Flow rate as shown in prompts and summaries: always carries a decimal part ("100.0", "2.5").
/// Very large or small values use a signed two-digit exponent ("1e+16", "2.5e-05").
pub fn format_flow_rate(flow_rate: f64) -> String {
    if flow_rate.is_nan() {
        return "nan".to_string();
    }
    let repr = format!("{:?}", flow_rate);
    match repr.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}

/// Quote a CSV field when it contains a separator, quote or newline
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_matches_two_decimal_rounding() {
        assert_eq!(round2(0.8 * 100.0), 80.0);
        assert_eq!(round2(0.12 * 37.5), 4.5);
        assert_eq!(round2(2.2 * 333.0), 732.6);
        assert_eq!(round2(-0.8 * 10.0), -8.0);
    }

    #[test]
    fn round2_below_tie_and_exact_ties() {
        // 1.5 * 0.31 is 0.46499999999999997, below the tie
        assert_eq!(round2(1.5 * 0.31), 0.46);
        // 1.5 * 1.75 is exactly 2.625, ties go to even
        assert_eq!(round2(1.5 * 1.75), 2.62);
        assert_eq!(round2(-2.625), -2.62);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
    }

    #[test]
    fn capitalize_words() {
        assert_eq!(capitalize("lead"), "Lead");
        assert_eq!(capitalize("cHROMIUM"), "Chromium");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn flow_rate_format() {
        assert_eq!(format_flow_rate(100.0), "100.0");
        assert_eq!(format_flow_rate(2.5), "2.5");
        assert_eq!(format_flow_rate(-40.0), "-40.0");
    }

    #[test]
    fn flow_rate_format_extremes() {
        assert_eq!(format_flow_rate(1e16), "1e+16");
        assert_eq!(format_flow_rate(1.5e20), "1.5e+20");
        assert_eq!(format_flow_rate(0.00001), "1e-05");
        assert_eq!(format_flow_rate(0.0001), "0.0001");
        assert_eq!(format_flow_rate(f64::INFINITY), "inf");
        assert_eq!(format_flow_rate(f64::NAN), "nan");
    }

    #[test]
    fn csv_quoting() {
        assert_eq!(csv_field("Ion Exchange"), "Ion Exchange");
        assert_eq!(csv_field("Cost ($/m³), daily"), "\"Cost ($/m³), daily\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn logo_rasterizes() {
        let (pixels, w, h) = rasterize_logo(64).unwrap();
        assert_eq!(w, 64);
        assert_eq!(h, 64);
        assert_eq!(pixels.len(), (w * h * 4) as usize);
    }
}
