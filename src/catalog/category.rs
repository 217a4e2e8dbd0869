//! Category tags used by wearables and emotes

pub const BODY_SHAPE: &str = "body_shape";
pub const SKIN: &str = "skin";
pub const UPPER_BODY: &str = "upper_body";
pub const LOWER_BODY: &str = "lower_body";
pub const HANDS_WEAR: &str = "hands_wear";
pub const HANDS: &str = "hands";
pub const HEAD: &str = "head";
pub const FEET: &str = "feet";
pub const HELMET: &str = "helmet";
pub const HAT: &str = "hat";
pub const TOP_HEAD: &str = "top_head";
pub const MASK: &str = "mask";
pub const EYEWEAR: &str = "eyewear";
pub const EARRING: &str = "earring";
pub const TIARA: &str = "tiara";
pub const HAIR: &str = "hair";
pub const EYEBROWS: &str = "eyebrows";
pub const EYES: &str = "eyes";
pub const MOUTH: &str = "mouth";
pub const FACIAL_HAIR: &str = "facial_hair";

/// Hiding priority, highest first
pub const PRIORITY: [&str; 18] = [
    SKIN,
    UPPER_BODY,
    HANDS_WEAR,
    LOWER_BODY,
    FEET,
    HELMET,
    HAT,
    TOP_HEAD,
    MASK,
    EYEWEAR,
    EARRING,
    TIARA,
    HAIR,
    EYEBROWS,
    EYES,
    MOUTH,
    FACIAL_HAIR,
    BODY_SHAPE,
];

/// Categories a full-body skin hides on its own
pub const SKIN_IMPLICIT_HIDES: [&str; 11] = [
    EYES,
    MOUTH,
    EYEBROWS,
    HAIR,
    UPPER_BODY,
    LOWER_BODY,
    FEET,
    HANDS,
    HANDS_WEAR,
    HEAD,
    FACIAL_HAIR,
];

/// Categories drawn as textures on the body's head mesh
pub const FACIAL_FEATURES: [&str; 3] = [EYES, EYEBROWS, MOUTH];

/// Parts of the base body mesh, by category
pub const BODY_PARTS: [&str; 5] = [HEAD, UPPER_BODY, LOWER_BODY, FEET, HANDS];

pub fn priority_of(category: &str) -> Option<usize> {
    PRIORITY.iter().position(|c| *c == category)
}

pub fn is_facial_feature(category: &str) -> bool {
    FACIAL_FEATURES.contains(&category)
}
