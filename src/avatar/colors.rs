//! Avatar tint colors and the material-name heuristic that applies them

use crate::scene::SceneNode;
use glam::Vec4;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RGBA color, serialized as `#RRGGBB` or `#RRGGBBAA`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub Vec4);

impl Color {
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self(Vec4::new(r, g, b, 1.0))
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) || (hex.len() != 6 && hex.len() != 8) {
            return Err(format!("expected #RRGGBB or #RRGGBBAA, got {}", s));
        }

        let mut channels = [1.0_f32; 4];
        for (i, channel) in channels.iter_mut().enumerate().take(hex.len() / 2) {
            let byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|e| format!("invalid color {}: {}", s, e))?;
            *channel = f32::from(byte) / 255.0;
        }
        Ok(Self(Vec4::from(channels)))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0.to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        if a == u8::MAX {
            write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvatarColors {
    pub skin: Color,
    pub hair: Color,
    pub eyes: Color,
}

impl Default for AvatarColors {
    fn default() -> Self {
        Self {
            skin: Color::rgb(0.949, 0.761, 0.580),
            hair: Color::rgb(0.235, 0.153, 0.114),
            eyes: Color::rgb(0.373, 0.227, 0.137),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    Skin,
    Hair,
    Eyes,
}

/// Which avatar color a material takes, judged by its name
pub fn color_target(material_name: &str) -> Option<ColorTarget> {
    let name = material_name.to_ascii_lowercase();
    if name.contains("skin") || name.contains("mouth") {
        Some(ColorTarget::Skin)
    } else if name.contains("hair") || name.contains("eyebrows") {
        Some(ColorTarget::Hair)
    } else if name.contains("eyes") {
        Some(ColorTarget::Eyes)
    } else {
        None
    }
}

impl AvatarColors {
    pub fn color_for(&self, target: ColorTarget) -> Color {
        match target {
            ColorTarget::Skin => self.skin,
            ColorTarget::Hair => self.hair,
            ColorTarget::Eyes => self.eyes,
        }
    }

    /// Tint every matching material in the tree, returns how many changed
    pub fn apply(&self, node: &mut SceneNode) -> usize {
        let mut tinted = 0;
        node.for_each_material_mut(&mut |material| {
            if let Some(target) = color_target(&material.name) {
                material.color = self.color_for(target).0;
                tinted += 1;
            }
        });
        tinted
    }
}
