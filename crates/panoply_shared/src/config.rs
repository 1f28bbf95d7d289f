//! # Configuration
//!
//! Two documents, both TOML:
//!
//! - [`RenderConfig`]: per player, owned by that player's own client and
//!   pushed to the authoritative side. Keys missing from a pushed document
//!   mean "disabled"; a config that never arrived means
//!   [`RenderConfig::default`].
//! - [`PanoplySettings`]: host level, every key defaulted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SharedResult;

/// Maximum number of favorited inventory slots.
pub const MAX_FAVORITES: usize = 5;

/// Favorite slots used when no config has been supplied.
pub const DEFAULT_FAVORITES: [usize; MAX_FAVORITES] = [0, 1, 2, 3, 4];

/// A per-player render toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Small tools on the forearms.
    Forearm,
    /// Tools on the back.
    Back,
    /// Shield mount.
    Shield,
    /// Restrict eligibility to favorited inventory slots.
    Favorites,
}

/// Per-player feature toggles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Render small tools on the forearms.
    #[serde(default)]
    pub forearm_enabled: bool,
    /// Render tools on the back.
    #[serde(default)]
    pub back_enabled: bool,
    /// Render the shield mount.
    #[serde(default)]
    pub shield_enabled: bool,
    /// Only favorited inventory slots are eligible.
    #[serde(default)]
    pub favorites_enabled: bool,
    /// Favorited inventory indices, at most [`MAX_FAVORITES`].
    #[serde(default)]
    pub favorite_slots: Vec<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            forearm_enabled: true,
            back_enabled: true,
            shield_enabled: true,
            favorites_enabled: false,
            favorite_slots: DEFAULT_FAVORITES.to_vec(),
        }
    }
}

impl RenderConfig {
    /// Every feature off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            forearm_enabled: false,
            back_enabled: false,
            shield_enabled: false,
            favorites_enabled: false,
            favorite_slots: Vec::new(),
        }
    }

    /// Parses a pushed config document.
    ///
    /// # Errors
    ///
    /// Fails when the document is not valid TOML for this shape.
    pub fn from_toml_str(document: &str) -> SharedResult<Self> {
        let mut config: Self = toml::from_str(document)?;
        let favorites = std::mem::take(&mut config.favorite_slots);
        config.set_favorites(&favorites);
        Ok(config)
    }

    /// Parses a pushed config, falling back to [`RenderConfig::disabled`].
    #[must_use]
    pub fn from_toml_lenient(document: &str) -> Self {
        match Self::from_toml_str(document) {
            Ok(config) => config,
            Err(error) => {
                tracing::warn!(%error, "unparsable render config, disabling all features");
                Self::disabled()
            }
        }
    }

    /// Serializes for pushing to the authoritative side.
    ///
    /// # Errors
    ///
    /// Fails only if TOML serialization fails.
    pub fn to_toml_string(&self) -> SharedResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Reads a feature toggle.
    #[must_use]
    pub const fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Forearm => self.forearm_enabled,
            Feature::Back => self.back_enabled,
            Feature::Shield => self.shield_enabled,
            Feature::Favorites => self.favorites_enabled,
        }
    }

    /// Flips a feature toggle.
    pub fn set_feature(&mut self, feature: Feature, enabled: bool) {
        match feature {
            Feature::Forearm => self.forearm_enabled = enabled,
            Feature::Back => self.back_enabled = enabled,
            Feature::Shield => self.shield_enabled = enabled,
            Feature::Favorites => self.favorites_enabled = enabled,
        }
    }

    /// Replaces the favorites list.
    ///
    /// Duplicates are dropped (first occurrence kept) and the list is cut
    /// at [`MAX_FAVORITES`].
    pub fn set_favorites(&mut self, slots: &[usize]) {
        self.favorite_slots.clear();
        for &slot in slots {
            if self.favorite_slots.len() == MAX_FAVORITES {
                break;
            }
            if !self.favorite_slots.contains(&slot) {
                self.favorite_slots.push(slot);
            }
        }
    }

    /// True if `inventory_index` is in the favorites list.
    #[must_use]
    pub fn is_favorite(&self, inventory_index: usize) -> bool {
        self.favorite_slots.contains(&inventory_index)
    }
}

/// Maps a number key (`1..=9`, `0`) to its hotbar index (`0..=9`).
#[must_use]
pub const fn favorite_slot_for_key(key: u8) -> Option<usize> {
    match key {
        0 => Some(9),
        1..=9 => Some(key as usize - 1),
        _ => None,
    }
}

/// Host-level settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanoplySettings {
    /// Slot policy knobs.
    pub policy: PolicySettings,
    /// Renderer knobs.
    pub rendering: RenderSettings,
    /// Channel knobs.
    pub network: NetworkSettings,
}

impl PanoplySettings {
    /// Parses a settings document.
    ///
    /// # Errors
    ///
    /// Fails on invalid TOML.
    pub fn from_toml_str(document: &str) -> SharedResult<Self> {
        Ok(toml::from_str(document)?)
    }

    /// Loads settings from a file.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors or invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> SharedResult<Self> {
        let document = std::fs::read_to_string(path)?;
        Self::from_toml_str(&document)
    }
}

/// Slot policy settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Code domains always mounted on the back, tool or not.
    pub back_only_domains: Vec<String>,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            back_only_domains: vec!["spearexpantion".to_owned()],
        }
    }
}

/// Renderer settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Code substrings that select the large two-handed back transform.
    pub large_tool_keywords: Vec<String>,
    /// Lateral shift of back tools when a shield hangs on a bare back.
    pub shield_back_offset: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            large_tool_keywords: vec!["hammer".to_owned(), "saw".to_owned()],
            shield_back_offset: 0.075,
        }
    }
}

/// Channel settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Largest packet the channel will send or accept.
    pub max_packet_size: usize,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            max_packet_size: 65_536,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_everything_but_favorites() {
        let config = RenderConfig::default();
        assert!(config.forearm_enabled && config.back_enabled && config.shield_enabled);
        assert!(!config.favorites_enabled);
        assert_eq!(config.favorite_slots, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_missing_keys_are_disabled() {
        let config = RenderConfig::from_toml_str("back_enabled = true").unwrap();
        assert!(config.back_enabled);
        assert!(!config.forearm_enabled);
        assert!(!config.shield_enabled);
        assert!(!config.favorites_enabled);
        assert!(config.favorite_slots.is_empty());
    }

    #[test]
    fn test_unparsable_config_disables() {
        let config = RenderConfig::from_toml_lenient("forearm_enabled = [[[");
        assert_eq!(config, RenderConfig::disabled());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = RenderConfig::default();
        config.set_feature(Feature::Favorites, true);
        config.set_favorites(&[2, 7]);

        let text = config.to_toml_string().unwrap();
        assert_eq!(RenderConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_favorites_dedup_and_cap() {
        let config =
            RenderConfig::from_toml_str("favorite_slots = [3, 3, 1, 0, 9, 8, 7]").unwrap();
        assert_eq!(config.favorite_slots, vec![3, 1, 0, 9, 8]);
        assert!(config.is_favorite(9));
        assert!(!config.is_favorite(7));
    }

    #[test]
    fn test_feature_toggles() {
        let mut config = RenderConfig::default();
        config.set_feature(Feature::Shield, false);
        assert!(!config.is_enabled(Feature::Shield));
        assert!(config.is_enabled(Feature::Back));
    }

    #[test]
    fn test_hotbar_key_mapping() {
        assert_eq!(favorite_slot_for_key(1), Some(0));
        assert_eq!(favorite_slot_for_key(9), Some(8));
        assert_eq!(favorite_slot_for_key(0), Some(9));
        assert_eq!(favorite_slot_for_key(10), None);
    }

    #[test]
    fn test_settings_defaults_fill_gaps() {
        let settings = PanoplySettings::from_toml_str(
            "[rendering]\nshield_back_offset = 0.1\n",
        )
        .unwrap();
        assert!((settings.rendering.shield_back_offset - 0.1).abs() < f32::EPSILON);
        assert_eq!(settings.rendering.large_tool_keywords, vec!["hammer", "saw"]);
        assert_eq!(settings.policy.back_only_domains, vec!["spearexpantion"]);
        assert_eq!(settings.network.max_packet_size, 65_536);
    }
}
