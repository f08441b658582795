use crate::types::enums::Role;
use crate::types::ids::UserId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use wb_events::types::EventSource;

/// Identity forwarded by the auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Caller {
    Member { user_id: UserId },
    Coach { user_id: UserId },
    Admin { user_id: UserId },
}

impl Caller {
    pub fn new(role: Role, user_id: UserId) -> Self {
        match role {
            Role::Member => Self::Member { user_id },
            Role::Coach => Self::Coach { user_id },
            Role::Admin => Self::Admin { user_id },
        }
    }

    pub fn user_id(self) -> UserId {
        match self {
            Self::Member { user_id } | Self::Coach { user_id } | Self::Admin { user_id } => user_id,
        }
    }

    pub fn role(self) -> Role {
        match self {
            Self::Member { .. } => Role::Member,
            Self::Coach { .. } => Role::Coach,
            Self::Admin { .. } => Role::Admin,
        }
    }

    pub fn is_staff(self) -> bool {
        matches!(self, Self::Coach { .. } | Self::Admin { .. })
    }

    pub fn event_source(self) -> EventSource {
        match self {
            Self::Member { .. } => EventSource::Member,
            Self::Coach { .. } => EventSource::Coach,
            Self::Admin { .. } => EventSource::Admin,
        }
    }
}
