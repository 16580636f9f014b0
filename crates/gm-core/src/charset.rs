use crate::error::CoreError;

/// 21 symboles — rampe par défaut, du plus sombre au plus clair.
pub const DEFAULT_RAMP: &[&str] = &[
    "@", "#", "8", "&", "W", "M", "B", "Q", "H", "D", "X", "Y", "O", "C", "I", "*", "!", ";", ":",
    ".", " ",
];

/// 67 entrées — rampe détaillée (dense→clair), pour les grandes largeurs.
pub const DETAILED_RAMP: &[&str] = &[
    "@", "B", "%", "8", "&", "W", "M", "#", "*", "o", "a", "h", "k", "b", "d", "p", "q", "w", "m",
    "Z", "O", "0", "Q", "L", "C", "J", "U", "Y", "X", "z", "c", "v", "u", "n", "x", "r", "j", "f",
    "t", "/", "|", "(", ")", "1", "{", "}", "[", "]", "?", "-", "_", "+", "~", "<", ">", "i", "!",
    "l", "I", ";", ":", ",", "\"", "^", "`", "'.", " ",
];

/// Presets accessibles par nom depuis la config et la CLI.
pub const PRESETS: &[(&str, &[&str])] = &[("default", DEFAULT_RAMP), ("detailed", DETAILED_RAMP)];

/// Quantize a luminance sample into a bucket index.
///
/// `floor(luminance / scale)` clamped to `len - 1`. With `scale = 256 / len`
/// the clamp only matters for palette sizes that do not divide 256 evenly.
///
/// # Example
/// ```
/// use gm_core::charset::quantize;
/// assert_eq!(quantize(255, 256.0 / 21.0, 21), 20);
/// assert_eq!(quantize(0, 256.0 / 21.0, 21), 0);
/// ```
#[inline(always)]
#[must_use]
pub fn quantize(luminance: u8, scale: f64, len: usize) -> usize {
    let idx = (f64::from(luminance) / scale).floor() as usize;
    idx.min(len.saturating_sub(1))
}

/// Ordered glyph palette with its quantization scale.
///
/// Pre-computes a 256-entry lookup table at construction so the per-sample
/// cost is a single index.
///
/// # Example
/// ```
/// use gm_core::charset::Palette;
/// let palette = Palette::default();
/// assert_eq!(palette.len(), 21);
/// assert_eq!(palette.glyph_for(0), "@");
/// assert_eq!(palette.glyph_for(255), " ");
/// ```
#[derive(Clone, Debug)]
pub struct Palette {
    glyphs: Vec<String>,
    scale: f64,
    lut: [u16; 256],
}

impl Palette {
    /// Build a palette ordered darkest→lightest.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] if fewer than 2 glyphs are given or if a
    /// glyph is the empty string.
    ///
    /// # Example
    /// ```
    /// use gm_core::charset::Palette;
    /// let palette = Palette::new(["#", ".", " "]).unwrap();
    /// assert_eq!(palette.index_of(128), 1);
    /// assert!(Palette::new(["#"]).is_err());
    /// ```
    pub fn new<I, S>(glyphs: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let glyphs: Vec<String> = glyphs.into_iter().map(Into::into).collect();
        if glyphs.len() < 2 {
            return Err(CoreError::Config(format!(
                "la palette doit contenir au moins 2 glyphes (reçu {})",
                glyphs.len()
            )));
        }
        if glyphs.len() > usize::from(u16::MAX) {
            return Err(CoreError::Config(format!(
                "palette trop grande ({} glyphes)",
                glyphs.len()
            )));
        }
        if let Some(pos) = glyphs.iter().position(String::is_empty) {
            return Err(CoreError::Config(format!("glyphe vide à l'index {pos}")));
        }

        Ok(Self::build(glyphs))
    }

    fn build(glyphs: Vec<String>) -> Self {
        let scale = 256.0 / glyphs.len() as f64;
        let mut lut = [0u16; 256];
        for (lum, slot) in lut.iter_mut().enumerate() {
            *slot = quantize(lum as u8, scale, glyphs.len()) as u16;
        }
        Self { glyphs, scale, lut }
    }

    /// Build a palette from the characters of a string, one glyph per char.
    ///
    /// # Errors
    /// Same conditions as [`Palette::new`].
    pub fn from_chars(chars: &str) -> Result<Self, CoreError> {
        Self::new(chars.chars().map(String::from))
    }

    /// Look up a built-in preset (`"default"`, `"detailed"`).
    #[must_use]
    pub fn preset(name: &str) -> Option<Self> {
        PRESETS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .and_then(|(_, ramp)| Self::new(ramp.iter().copied()).ok())
    }

    /// Number of glyphs (N).
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Always false: a palette holds at least 2 glyphs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Quantization scale `256 / N`.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// All glyphs, darkest first.
    #[must_use]
    pub fn glyphs(&self) -> &[String] {
        &self.glyphs
    }

    /// Bucket index for a luminance value.
    #[inline(always)]
    #[must_use]
    pub fn index_of(&self, luminance: u8) -> usize {
        usize::from(self.lut[usize::from(luminance)])
    }

    /// Glyph for a luminance value.
    #[inline(always)]
    #[must_use]
    pub fn glyph_for(&self, luminance: u8) -> &str {
        &self.glyphs[self.index_of(luminance)]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::build(DEFAULT_RAMP.iter().map(|g| (*g).to_string()).collect())
    }
}
