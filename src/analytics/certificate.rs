//! Detection of the Meteora LP Army Certificate among a wallet's DAS assets.
//!
//! Assets are checked in order. An asset matches on its legacy asset id,
//! on the certificate creator together with the certificate name, or on
//! the creator together with any mention of "meteora" in its content. When
//! nothing matches, the first asset with the creator in its top-level
//! `creators` list is accepted.

use serde_json::Value;
use tracing::debug;

use crate::chain::constants::{CERTIFICATE_CREATOR, CERTIFICATE_NAME, LEGACY_CERTIFICATE_ASSET_ID};
use crate::chain::types::DasAsset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    LegacyAssetId,
    CreatorAndName,
    CreatorAndContent,
    CreatorOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateMatch {
    pub asset_id: String,
    pub index: usize,
    pub kind: MatchKind,
}

#[derive(Debug, Clone)]
pub struct CertificateMatcher {
    creator: String,
    name_pattern: String,
    legacy_asset_id: String,
}

impl Default for CertificateMatcher {
    fn default() -> Self {
        Self::new(CERTIFICATE_CREATOR, CERTIFICATE_NAME, LEGACY_CERTIFICATE_ASSET_ID)
    }
}

impl CertificateMatcher {
    pub fn new(
        creator: impl Into<String>,
        name_pattern: impl Into<String>,
        legacy_asset_id: impl Into<String>,
    ) -> Self {
        Self {
            creator: creator.into(),
            name_pattern: name_pattern.into(),
            legacy_asset_id: legacy_asset_id.into(),
        }
    }

    pub fn find(&self, assets: &[DasAsset]) -> Option<CertificateMatch> {
        for (index, asset) in assets.iter().enumerate() {
            if let Some(kind) = self.classify(asset) {
                return Some(CertificateMatch {
                    asset_id: asset.id.clone(),
                    index,
                    kind,
                });
            }
        }

        assets
            .iter()
            .enumerate()
            .find(|(_, asset)| self.has_top_level_creator(asset))
            .map(|(index, asset)| {
                debug!("Fallback certificate match on creator at asset {}", index);
                CertificateMatch {
                    asset_id: asset.id.clone(),
                    index,
                    kind: MatchKind::CreatorOnly,
                }
            })
    }

    fn classify(&self, asset: &DasAsset) -> Option<MatchKind> {
        if asset.id == self.legacy_asset_id {
            return Some(MatchKind::LegacyAssetId);
        }

        if !self.has_creator(asset) {
            return None;
        }
        if self.has_name(asset) {
            return Some(MatchKind::CreatorAndName);
        }
        let mentions_meteora = asset
            .content
            .as_ref()
            .map(|c| c.to_string().to_lowercase().contains("meteora"))
            .unwrap_or(false);
        mentions_meteora.then_some(MatchKind::CreatorAndContent)
    }

    fn has_top_level_creator(&self, asset: &DasAsset) -> bool {
        asset.creators.iter().any(|c| c.address == self.creator)
    }

    fn has_creator(&self, asset: &DasAsset) -> bool {
        if self.has_top_level_creator(asset) {
            return true;
        }
        asset
            .content
            .as_ref()
            .and_then(|c| c.get("creators"))
            .and_then(Value::as_array)
            .map(|creators| {
                creators.iter().any(|c| {
                    c.get("address").and_then(Value::as_str) == Some(self.creator.as_str())
                })
            })
            .unwrap_or(false)
    }

    fn has_name(&self, asset: &DasAsset) -> bool {
        let content = asset.content.as_ref();
        let candidates = [
            content
                .and_then(|c| c.pointer("/metadata/name"))
                .and_then(Value::as_str),
            asset.name.as_deref(),
            content.and_then(|c| c.get("name")).and_then(Value::as_str),
        ];
        candidates
            .into_iter()
            .flatten()
            .any(|name| name.contains(&self.name_pattern))
    }
}
