//! Avatar/prop clip disambiguation for emotes
//!
//! One emote asset may carry a clip for the avatar and a clip for a prop.
//! Precedence:
//! 1. a single clip animates the avatar;
//! 2. `_avatar` / `_prop` name suffixes (case-insensitive);
//! 3. when only one of the two matched and exactly one other clip remains,
//!    that clip is the counterpart.
//!
//! Anything still unresolved is a structural anomaly.

use crate::avatar::{AvatarError, AvatarResult};
use crate::scene::AnimationClip;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static AVATAR_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[_\-. ]avatar$").expect("valid avatar suffix pattern"));
static PROP_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[_\-. ]prop$").expect("valid prop suffix pattern"));

#[derive(Debug, Clone, PartialEq)]
pub struct EmoteClips {
    pub avatar: AnimationClip,
    pub prop: Option<AnimationClip>,
}

pub fn disambiguate(urn: &str, clips: &[AnimationClip]) -> AvatarResult<EmoteClips> {
    match clips {
        [] => {
            return Err(AvatarError::StructuralAnomaly {
                urn: urn.to_string(),
                reason: "emote has no animation clips".to_string(),
            })
        }
        [only] => {
            return Ok(EmoteClips { avatar: only.clone(), prop: None });
        }
        _ => {}
    }

    let mut avatar = clips.iter().position(|c| AVATAR_SUFFIX.is_match(&c.name));
    let mut prop = clips
        .iter()
        .enumerate()
        .position(|(i, c)| Some(i) != avatar && PROP_SUFFIX.is_match(&c.name));

    let remaining: Vec<usize> = (0..clips.len())
        .filter(|i| Some(*i) != avatar && Some(*i) != prop)
        .collect();

    match (avatar, prop, remaining.as_slice()) {
        (Some(_), None, [other]) => prop = Some(*other),
        (None, Some(_), [other]) => avatar = Some(*other),
        _ => {}
    }

    let Some(avatar) = avatar else {
        let names: Vec<&str> = clips.iter().map(|c| c.name.as_str()).collect();
        return Err(AvatarError::StructuralAnomaly {
            urn: urn.to_string(),
            reason: format!("cannot tell which clip animates the avatar among {:?}", names),
        });
    };

    let unused = clips.len() - 1 - usize::from(prop.is_some());
    if unused > 0 {
        debug!("🎭 Emote {} carries {} unused clips", urn, unused);
    }

    Ok(EmoteClips {
        avatar: clips[avatar].clone(),
        prop: prop.map(|i| clips[i].clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clips(names: &[&str]) -> Vec<AnimationClip> {
        names.iter().map(|n| AnimationClip::new(*n, 1.0)).collect()
    }

    #[test]
    fn single_clip_is_the_avatar_clip() {
        let result = disambiguate("urn:wave", &clips(&["Wave"])).unwrap();
        assert_eq!(result.avatar.name, "Wave");
        assert!(result.prop.is_none());
    }

    #[test]
    fn suffixes_pick_both_clips() {
        let result = disambiguate("urn:guitar", &clips(&["Guitar_Prop", "Guitar_Avatar"])).unwrap();
        assert_eq!(result.avatar.name, "Guitar_Avatar");
        assert_eq!(result.prop.unwrap().name, "Guitar_Prop");
    }

    #[test]
    fn counterpart_is_inferred_from_the_remaining_clip() {
        let result = disambiguate("urn:a", &clips(&["dance_avatar", "Take 001"])).unwrap();
        assert_eq!(result.prop.unwrap().name, "Take 001");

        let result = disambiguate("urn:b", &clips(&["Take 001", "dance_PROP"])).unwrap();
        assert_eq!(result.avatar.name, "Take 001");
        assert_eq!(result.prop.unwrap().name, "dance_PROP");
    }

    #[test]
    fn ambiguous_clips_are_an_anomaly() {
        let result = disambiguate("urn:c", &clips(&["Take 001", "Take 002"]));
        assert!(matches!(result, Err(AvatarError::StructuralAnomaly { .. })));

        let result = disambiguate("urn:d", &clips(&["x_prop", "Take 001", "Take 002"]));
        assert!(matches!(result, Err(AvatarError::StructuralAnomaly { .. })));

        assert!(disambiguate("urn:e", &[]).is_err());
    }
}
