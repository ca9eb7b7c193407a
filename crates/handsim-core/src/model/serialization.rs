use crate::error::OddsResult;
use crate::model::card::CardEntry;
use crate::model::deck::DeckModel;
use serde::{Deserialize, Serialize};

/// Wire form of a normalized deck list exchanged with loaders and presenters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeckSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_size: Option<u32>,
    pub cards: Vec<CardEntry>,
}

impl DeckSnapshot {
    pub fn capture(deck: &DeckModel) -> Self {
        DeckSnapshot {
            declared_size: deck.total_size().ok(),
            cards: deck.entries().to_vec(),
        }
    }

    pub fn restore(self) -> OddsResult<DeckModel> {
        match self.declared_size {
            Some(declared) => DeckModel::with_declared_size(self.cards, declared),
            None => DeckModel::new(self.cards),
        }
    }

    pub fn to_json(deck: &DeckModel) -> serde_json::Result<String> {
        let snapshot = Self::capture(deck);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
