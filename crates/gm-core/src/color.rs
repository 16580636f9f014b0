use crate::error::CoreError;

/// Couleur RGB 8 bits, même représentation que les cellules de la grille.
pub type Rgb = (u8, u8, u8);

/// Blanc, fond par défaut du canvas.
pub const WHITE: Rgb = (255, 255, 255);

/// Luminance ITU-R 601-2 en virgule fixe (poids 0.299/0.587/0.114).
///
/// Même arrondi que la conversion RGB→"L" des bibliothèques d'imagerie
/// courantes : blanc pur donne 255, noir pur 0.
///
/// # Example
/// ```
/// use gm_core::color::luminance_601;
/// assert_eq!(luminance_601(255, 255, 255), 255);
/// assert_eq!(luminance_601(0, 0, 0), 0);
/// assert_eq!(luminance_601(255, 0, 0), 76);
/// ```
#[inline(always)]
#[must_use]
pub fn luminance_601(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 19_595 + u32::from(g) * 38_470 + u32::from(b) * 7_471 + 0x8000) >> 16) as u8
}

/// Mélange `fg` sur `bg` avec une couverture `alpha` ∈ [0, 1].
///
/// # Example
/// ```
/// use gm_core::color::blend;
/// assert_eq!(blend((255, 0, 0), (0, 0, 255), 1.0), (255, 0, 0));
/// assert_eq!(blend((255, 0, 0), (0, 0, 255), 0.0), (0, 0, 255));
/// ```
#[inline(always)]
#[must_use]
pub fn blend(fg: Rgb, bg: Rgb, alpha: f32) -> Rgb {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |f: u8, b: u8| (f32::from(f) * a + f32::from(b) * (1.0 - a)).round() as u8;
    (mix(fg.0, bg.0), mix(fg.1, bg.1), mix(fg.2, bg.2))
}

/// Parse une couleur de config : nom simple ou `#rrggbb`.
///
/// # Errors
/// Returns [`CoreError::Config`] for unknown names or malformed hex.
///
/// # Example
/// ```
/// use gm_core::color::parse_color;
/// assert_eq!(parse_color("white").unwrap(), (255, 255, 255));
/// assert_eq!(parse_color("#102030").unwrap(), (16, 32, 48));
/// ```
pub fn parse_color(value: &str) -> Result<Rgb, CoreError> {
    let v = value.trim();
    match v.to_ascii_lowercase().as_str() {
        "white" => return Ok(WHITE),
        "black" => return Ok((0, 0, 0)),
        "gray" | "grey" => return Ok((128, 128, 128)),
        _ => {}
    }

    let hex = v
        .strip_prefix('#')
        .ok_or_else(|| CoreError::Config(format!("couleur inconnue : {v}")))?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(CoreError::Config(format!("couleur hex invalide : {v}")));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| CoreError::Config(format!("couleur hex invalide : {v}")))
    };
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
