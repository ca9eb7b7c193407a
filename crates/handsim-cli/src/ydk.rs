//! Reader for `.ydk` deck lists.
//!
//! Only the main deck is used. Each non-comment line inside `#main` is a
//! numeric card id, one line per copy.

use handsim_core::OddsResult;
use handsim_core::model::card::CardEntry;
use handsim_core::model::category::Category;
use handsim_core::model::deck::MAX_COPIES;
use std::collections::BTreeMap;
use thiserror::Error;

const MAIN_MARKER: &str = "#main";
const SECTION_MARKERS: [&str; 3] = ["#extra", "#side", "!side"];

/// Main-deck ids with copy counts, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YdkDeck {
    cards: Vec<(String, u32)>,
}

impl YdkDeck {
    pub fn cards(&self) -> &[(String, u32)] {
        &self.cards
    }

    pub fn total(&self) -> u32 {
        self.cards.iter().map(|(_, copies)| copies).sum()
    }

    /// Tag each id with its category, falling back to `default`.
    pub fn into_entries(
        self,
        categories: &BTreeMap<String, Category>,
        default: &Category,
    ) -> OddsResult<Vec<CardEntry>> {
        self.cards
            .into_iter()
            .map(|(id, copies)| {
                let category = categories.get(&id).unwrap_or(default).clone();
                CardEntry::new(id, category, copies)
            })
            .collect()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum YdkError {
    #[error("no #main section found")]
    NoMainDeck,
    #[error("line {line}: '{text}' is not a card id")]
    InvalidLine { line: usize, text: String },
    #[error("card {id} appears {copies} times; at most {max} copies are allowed", max = MAX_COPIES)]
    TooManyCopies { id: String, copies: u32 },
}

pub fn parse_ydk(text: &str) -> Result<YdkDeck, YdkError> {
    let mut in_main = false;
    let mut seen_main = false;
    let mut cards: Vec<(String, u32)> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case(MAIN_MARKER) {
            in_main = true;
            seen_main = true;
            continue;
        }
        if SECTION_MARKERS
            .iter()
            .any(|marker| line.eq_ignore_ascii_case(marker))
        {
            in_main = false;
            continue;
        }
        if line.starts_with('#') || line.starts_with('!') || !in_main {
            continue;
        }
        if !line.chars().all(|c| c.is_ascii_digit()) {
            return Err(YdkError::InvalidLine {
                line: index + 1,
                text: line.to_string(),
            });
        }

        match cards.iter_mut().find(|(id, _)| id == line) {
            Some((_, copies)) => *copies += 1,
            None => cards.push((line.to_string(), 1)),
        }
    }

    if !seen_main {
        return Err(YdkError::NoMainDeck);
    }
    if let Some((id, copies)) = cards.iter().find(|(_, copies)| *copies > MAX_COPIES) {
        return Err(YdkError::TooManyCopies {
            id: id.clone(),
            copies: *copies,
        });
    }

    Ok(YdkDeck { cards })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = "#created by deck editor
#main
14558127
14558127
14558127
23434538
\r
89538537
89538537
#extra
86066372
!side
23434538
";

    #[test]
    fn counts_main_deck_copies_in_order() {
        let deck = parse_ydk(LIST).unwrap();
        assert_eq!(
            deck.cards(),
            &[
                ("14558127".to_string(), 3),
                ("23434538".to_string(), 1),
                ("89538537".to_string(), 2),
            ]
        );
        assert_eq!(deck.total(), 6);
    }

    #[test]
    fn extra_and_side_are_ignored() {
        let deck = parse_ydk(LIST).unwrap();
        assert!(deck.cards().iter().all(|(id, _)| id != "86066372"));
    }

    #[test]
    fn missing_main_section() {
        assert_eq!(parse_ydk("#extra\n86066372\n"), Err(YdkError::NoMainDeck));
    }

    #[test]
    fn rejects_fourth_copy() {
        let text = "#main\n1\n1\n1\n1\n";
        assert_eq!(
            parse_ydk(text),
            Err(YdkError::TooManyCopies {
                id: "1".into(),
                copies: 4
            })
        );
    }

    #[test]
    fn rejects_non_numeric_line() {
        let err = parse_ydk("#main\nAsh Blossom\n").unwrap_err();
        assert_eq!(
            err,
            YdkError::InvalidLine {
                line: 2,
                text: "Ash Blossom".into()
            }
        );
    }

    #[test]
    fn entries_use_category_map() {
        let deck = parse_ydk(LIST).unwrap();
        let mut map = BTreeMap::new();
        map.insert("14558127".to_string(), Category::handtrap());
        let entries = deck.into_entries(&map, &Category::engine()).unwrap();
        assert_eq!(entries[0].category, Category::handtrap());
        assert_eq!(entries[1].category, Category::engine());
        assert_eq!(entries[2].copies, 2);
    }
}
