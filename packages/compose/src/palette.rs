//! Colour palettes.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::layer::Rgb;

/// Named colour scheme. Palettes change colours only; widths, opacities
/// and layer order are the same for all of them.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Palette {
    /// Grey points on pink roads.
    #[default]
    Pink,
    /// White points on pale cyan roads.
    Flickr,
}

impl Palette {
    #[must_use]
    pub const fn points(self) -> Rgb {
        match self {
            Self::Pink => Rgb::grey(0.7),
            Self::Flickr => Rgb::WHITE,
        }
    }

    #[must_use]
    pub const fn roads(self) -> Rgb {
        match self {
            Self::Pink => Rgb::new(1.0, 0.0, 132.0 / 255.0),
            Self::Flickr => Rgb::new(0.5, 1.0, 1.0),
        }
    }

    /// Place outlines are black under every palette.
    #[must_use]
    pub const fn outlines(self) -> Rgb {
        Rgb::BLACK
    }

    #[must_use]
    pub const fn background(self) -> Rgb {
        Rgb::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_palette_names() {
        assert_eq!("pink".parse::<Palette>().unwrap(), Palette::Pink);
        assert_eq!("flickr".parse::<Palette>().unwrap(), Palette::Flickr);
        assert!("sepia".parse::<Palette>().is_err());
        assert_eq!(Palette::Flickr.to_string(), "flickr");
    }

    #[test]
    fn flickr_palette_colours() {
        assert_eq!(Palette::Flickr.points(), Rgb::WHITE);
        assert_eq!(Palette::Flickr.roads(), Rgb::new(0.5, 1.0, 1.0));
    }
}
