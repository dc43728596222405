//! Game initialization from a template catalog
//!
//! Every character gets `cards_per_template` copies of each template,
//! shuffled into its deck, then draws its opening hand off the top.

use crate::core::{CharacterId, CharacterName};
use crate::game::{GameConfig, GameState};
use crate::loader::Catalog;
use crate::zones::Location;
use crate::{GameError, Result};
use std::path::Path;
use std::sync::Arc;

/// Game builder
pub struct GameInitializer {
    config: GameConfig,
    catalog: Arc<Catalog>,
    names: Vec<CharacterName>,
}

impl GameInitializer {
    pub fn new(config: GameConfig, catalog: Arc<Catalog>) -> Self {
        GameInitializer {
            config,
            catalog,
            names: Vec::new(),
        }
    }

    /// Load the catalog from a template directory without blocking
    pub async fn from_template_dir(config: GameConfig, dir: &Path) -> Result<Self> {
        let catalog = Catalog::load_from_dir_async(dir).await?;
        Ok(GameInitializer::new(config, Arc::new(catalog)))
    }

    pub fn with_characters<N: Into<CharacterName>>(mut self, names: impl IntoIterator<Item = N>) -> Self {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Build the game; returns it with the character ids in seat order
    pub fn init(self) -> Result<(GameState, Vec<CharacterId>)> {
        if self.names.is_empty() {
            return Err(GameError::InvalidAction("a game needs characters".to_string()));
        }
        if self.catalog.is_empty() {
            return Err(GameError::InvalidAction("the catalog has no templates".to_string()));
        }

        let hand_size = self.config.starting_hand_size;
        let copies = self.config.cards_per_template;
        let mut game = GameState::new(self.config, self.catalog);

        let ids = self
            .names
            .into_iter()
            .map(|name| game.add_character(name))
            .collect::<Result<Vec<_>>>()?;

        let templates: Vec<_> = game.catalog.all_templates().iter().map(|t| t.id).collect();
        for &id in &ids {
            for &template in &templates {
                for _ in 0..copies {
                    game.deal_card(id, template, Location::Deck)?;
                }
            }
            game.shuffle(id, Location::Deck)?;
            game.draw(id, hand_size)?;
        }

        game.set_initial_character();
        game.logger.normal(&format!(
            "Game started: {} characters, {} cards each",
            ids.len(),
            templates.len() * copies
        ));
        Ok((game, ids))
    }
}
