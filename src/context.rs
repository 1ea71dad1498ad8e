//! Provisioning of the dedicated world/room for autonomous thoughts.

use async_trait::async_trait;

use crate::config::ContextConfig;
use crate::domain::{AUTONOMY_SOURCE, ConversationContext, Room, World};
use crate::error::Result;
use crate::id::{derive_entity_id, generate_entity_id};

/// Host runtime APIs for worlds, rooms, and participants.
///
/// Every call is create-if-absent and safe to repeat.
#[async_trait]
pub trait ContextApi: Send + Sync {
    async fn ensure_world_exists(&self, world: &World) -> Result<()>;
    async fn ensure_room_exists(&self, room: &Room) -> Result<()>;
    async fn add_participant(&self, agent_id: &str, room_id: &str) -> Result<()>;
}

/// Resolves and ensures the dedicated context once at startup.
#[derive(Debug, Clone)]
pub struct ContextProvisioner {
    config: ContextConfig,
}

impl ContextProvisioner {
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Ids the context will use for `agent_id`, without touching the host.
    pub fn resolve(&self, agent_id: &str) -> ConversationContext {
        let world_id = derive_entity_id("world", &format!("{}:{}", agent_id, self.config.world_name));
        let room_id = match (&self.config.room_id, self.config.stable_room) {
            (Some(explicit), _) => explicit.clone(),
            (None, true) => derive_entity_id("room", &format!("{}:{}", agent_id, self.config.room_name)),
            (None, false) => generate_entity_id(),
        };
        ConversationContext::new(world_id, room_id)
    }

    /// Ensure world, room, and membership exist, returning the context to reuse.
    pub async fn provision(&self, api: &dyn ContextApi, agent_id: &str) -> Result<ConversationContext> {
        let context = self.resolve(agent_id);

        let world = World {
            id: context.world_id.clone(),
            name: self.config.world_name.clone(),
            agent_id: agent_id.to_string(),
        };
        api.ensure_world_exists(&world).await?;

        let room = Room {
            id: context.room_id.clone(),
            name: self.config.room_name.clone(),
            world_id: context.world_id.clone(),
            agent_id: agent_id.to_string(),
            source: AUTONOMY_SOURCE.to_string(),
        };
        api.ensure_room_exists(&room).await?;
        api.add_participant(agent_id, &context.room_id).await?;

        tracing::info!(
            world_id = %context.world_id,
            room_id = %context.room_id,
            "Autonomy context provisioned"
        );
        Ok(context)
    }
}
