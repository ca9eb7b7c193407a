pub mod card;
pub mod category;
pub mod deck;
pub mod hand;
pub mod serialization;
