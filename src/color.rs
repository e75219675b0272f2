//! Deterministic name → color assignment.
//!
//! Every entity gets a color derived from a 32-bit rolling hash of its name, so the
//! same country is painted the same way in every frame and every session. Results are
//! memoized per assigner; the cache only ever grows.

use std::collections::HashMap;

/// Memoizing color source. One instance is owned by whoever builds frames.
#[derive(Debug, Default)]
pub struct ColorAssigner {
    cache: HashMap<String, String>,
}

impl ColorAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the `#rrggbb` color for `name`, computing and caching it on first use.
    pub fn color_for(&mut self, name: &str) -> String {
        if let Some(c) = self.cache.get(name) {
            return c.clone();
        }
        let color = color_from_hash(hash_name(name));
        self.cache.insert(name.to_string(), color.clone());
        color
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }
}

/// Polynomial rolling hash (`h = c + (h << 5) - h`) over UTF-16 code units,
/// with 32-bit two's-complement wraparound.
pub fn hash_name(name: &str) -> i32 {
    name.encode_utf16().fold(0i32, |hash, unit| {
        (unit as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    })
}

/// Format the low 24 bits of `hash` as `#rrggbb`.
pub fn color_from_hash(hash: i32) -> String {
    let r = (hash >> 16) & 0xff;
    let g = (hash >> 8) & 0xff;
    let b = hash & 0xff;
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Parse `#rrggbb` back into its components.
pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_hex_color(s: &str) -> bool {
        s.len() == 7
            && s.starts_with('#')
            && s[1..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    #[test]
    fn known_names_hash_to_known_colors() {
        let mut colors = ColorAssigner::new();
        assert_eq!(colors.color_for("China"), "#e10537");
        assert_eq!(colors.color_for("India"), "#383917");
        assert_eq!(colors.color_for("World"), "#fe2b72");
        assert_eq!(colors.color_for("a"), "#000061");
        assert_eq!(colors.color_for(""), "#000000");
    }

    #[test]
    fn negative_hash_keeps_low_24_bits() {
        assert_eq!(hash_name("United States"), -2_032_517_217);
        assert_eq!(color_from_hash(hash_name("United States")), "#da3f9f");
        assert_eq!(color_from_hash(-1), "#ffffff");
    }

    #[test]
    fn long_names_wrap_instead_of_overflowing() {
        let name = "Saint Vincent and the Grenadines (United Nations definition)";
        let c = color_from_hash(hash_name(name));
        assert!(is_hex_color(&c), "{c}");
    }

    #[test]
    fn color_for_is_idempotent_and_memoized() {
        let mut colors = ColorAssigner::new();
        let first = colors.color_for("Brazil");
        let second = colors.color_for("Brazil");
        assert_eq!(first, second);
        assert!(is_hex_color(&first));
        assert_eq!(colors.len(), 1);
    }

    #[test]
    fn fresh_cache_recomputes_same_color() {
        let mut a = ColorAssigner::new();
        let mut b = ColorAssigner::new();
        for name in ["Nigeria", "Côte d'Ivoire", "Indonesia", "Pakistan"] {
            assert_eq!(a.color_for(name), b.color_for(name));
        }
    }

    #[test]
    fn non_ascii_names_hash_utf16_units() {
        let mut colors = ColorAssigner::new();
        assert_eq!(colors.color_for("Côte d'Ivoire"), "#12097b");
    }

    #[test]
    fn hex_colors_parse_back() {
        assert_eq!(parse_hex_color("#e10537"), Some((0xe1, 0x05, 0x37)));
        assert_eq!(parse_hex_color("e10537"), None);
        assert_eq!(parse_hex_color("#e1053"), None);
        assert_eq!(parse_hex_color("#zz0537"), None);
    }
}
