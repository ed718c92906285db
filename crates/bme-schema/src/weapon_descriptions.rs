//! `weapon_descriptions.xml`: crafting weapon classes, their flags and the
//! pieces they accept.

use bme_ingest::{IndexedEntity, SecondaryIndex};
use bme_model::{ElementBuilder, NodeReader, Optional, ParseContext, RoundTripNode, Unknown, XmlElement};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeaponDescription {
    pub id: Option<String>,
    pub weapon_class: Option<String>,
    pub item_usage_features: Option<String>,
    pub weapon_flags: Optional<WeaponFlags>,
    pub available_pieces: Optional<AvailablePieces>,
    pub unknown: Unknown,
}

impl WeaponDescription {
    /// `item_usage_features` split on `:`, trimmed, empties dropped.
    pub fn usage_features(&self) -> Vec<String> {
        self.item_usage_features
            .as_deref()
            .unwrap_or_default()
            .split(':')
            .map(str::trim)
            .filter(|feature| !feature.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn flag_values(&self) -> Vec<String> {
        self.weapon_flags
            .get()
            .map(|flags| flags.flags.iter().filter_map(|flag| flag.value.clone()).collect())
            .unwrap_or_default()
    }

    pub fn piece_ids(&self) -> Vec<String> {
        self.available_pieces
            .get()
            .map(|pieces| {
                pieces
                    .pieces
                    .iter()
                    .filter_map(|piece| piece.id.clone())
                    .filter(|id| !id.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_flag(&self, value: &str) -> bool {
        self.flag_values().iter().any(|flag| flag == value)
    }

    pub fn has_piece(&self, id: &str) -> bool {
        self.piece_ids().iter().any(|piece| piece == id)
    }

    pub fn is_craftable(&self) -> bool {
        !self.piece_ids().is_empty()
    }

    pub fn is_ranged(&self) -> bool {
        self.weapon_class.as_deref().is_some_and(|class| {
            ["Bow", "Crossbow", "Javelin", "ThrowingAxe", "ThrowingKnife", "Stone"]
                .iter()
                .any(|ranged| class.contains(ranged))
        })
    }

    pub fn is_two_handed(&self) -> bool {
        self.weapon_class
            .as_deref()
            .is_some_and(|class| class.starts_with("TwoHanded"))
            || self.has_flag("NotUsableWithOneHand")
    }
}

impl RoundTripNode for WeaponDescription {
    const TAG: &'static str = "WeaponDescription";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let id = reader.attr("id");
        let weapon_class = reader.attr("weapon_class");
        let item_usage_features = reader.attr("item_usage_features");
        let weapon_flags = reader.optional();
        let available_pieces = reader.optional();
        Self {
            id,
            weapon_class,
            item_usage_features,
            weapon_flags,
            available_pieces,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("id", self.id.as_deref())
            .attr("weapon_class", self.weapon_class.as_deref())
            .attr("item_usage_features", self.item_usage_features.as_deref())
            .optional(&self.weapon_flags)
            .optional(&self.available_pieces)
            .finish(&self.unknown)
    }
}

impl IndexedEntity for WeaponDescription {
    const ROOT_TAG: &'static str = "WeaponDescriptions";

    fn indexes() -> Vec<SecondaryIndex<Self>> {
        vec![
            SecondaryIndex::single("by_weapon_class", |weapon: &WeaponDescription| {
                weapon.weapon_class.clone()
            }),
            SecondaryIndex::new("by_usage_feature", |weapon: &WeaponDescription| {
                Ok(weapon.usage_features())
            }),
            SecondaryIndex::new("by_flag", |weapon: &WeaponDescription| {
                Ok(weapon.flag_values())
            }),
            SecondaryIndex::new("by_piece", |weapon: &WeaponDescription| {
                Ok(weapon.piece_ids())
            }),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeaponFlags {
    pub flags: Vec<WeaponFlag>,
    pub unknown: Unknown,
}

impl RoundTripNode for WeaponFlags {
    const TAG: &'static str = "WeaponFlags";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let flags = reader.repeated();
        Self {
            flags,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .repeated(&self.flags)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeaponFlag {
    pub value: Option<String>,
    pub unknown: Unknown,
}

impl RoundTripNode for WeaponFlag {
    const TAG: &'static str = "WeaponFlag";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let value = reader.attr("value");
        Self {
            value,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("value", self.value.as_deref())
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailablePieces {
    pub pieces: Vec<AvailablePiece>,
    pub unknown: Unknown,
}

impl RoundTripNode for AvailablePieces {
    const TAG: &'static str = "AvailablePieces";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let pieces = reader.repeated();
        Self {
            pieces,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .repeated(&self.pieces)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailablePiece {
    pub id: Option<String>,
    pub unknown: Unknown,
}

impl RoundTripNode for AvailablePiece {
    const TAG: &'static str = "AvailablePiece";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let id = reader.attr("id");
        Self {
            id,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("id", self.id.as_deref())
            .finish(&self.unknown)
    }
}
