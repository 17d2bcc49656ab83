//! User profile singleton.

use serde::{Deserialize, Serialize};

/// Badge color options for the profile tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagColor {
    #[serde(rename = "tag-purple")]
    Purple,
    #[serde(rename = "tag-pink")]
    Pink,
    #[serde(rename = "tag-green")]
    Green,
    #[serde(rename = "tag-orange")]
    Orange,
    #[serde(rename = "tag-cyan")]
    Cyan,
    #[serde(rename = "tag-blue")]
    Blue,
}

impl TagColor {
    pub const ALL: [TagColor; 6] = [
        TagColor::Purple,
        TagColor::Pink,
        TagColor::Green,
        TagColor::Orange,
        TagColor::Cyan,
        TagColor::Blue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Purple => "tag-purple",
            Self::Pink => "tag-pink",
            Self::Green => "tag-green",
            Self::Orange => "tag-orange",
            Self::Cyan => "tag-cyan",
            Self::Blue => "tag-blue",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Purple => "Purple",
            Self::Pink => "Pink",
            Self::Green => "Green",
            Self::Orange => "Orange",
            Self::Cyan => "Cyan",
            Self::Blue => "Blue",
        }
    }

    /// Parses either the style tag (`tag-cyan`) or the bare label (`cyan`).
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|color| {
            color.as_str() == normalized || color.label().eq_ignore_ascii_case(&normalized)
        })
    }
}

/// The single user profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    /// Avatar image URI.
    pub avatar: String,
    pub about: String,
    /// Status badge text.
    pub tag: String,
    pub tag_color: TagColor,
}

/// Shallow partial update for the profile; `None` keeps the prior value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub about: Option<String>,
    pub tag: Option<String>,
    pub tag_color: Option<TagColor>,
}

impl ProfilePatch {
    /// Returns a copy of `profile` with supplied fields merged in.
    pub fn merged_into(&self, profile: &UserProfile) -> UserProfile {
        UserProfile {
            name: self.name.clone().unwrap_or_else(|| profile.name.clone()),
            avatar: self.avatar.clone().unwrap_or_else(|| profile.avatar.clone()),
            about: self.about.clone().unwrap_or_else(|| profile.about.clone()),
            tag: self.tag.clone().unwrap_or_else(|| profile.tag.clone()),
            tag_color: self.tag_color.unwrap_or(profile.tag_color),
        }
    }
}
