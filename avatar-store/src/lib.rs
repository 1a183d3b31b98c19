pub mod adapters;
pub mod config;
pub mod domain;
pub mod factory;

pub use adapters::inbound::AvatarClient;
pub use domain::{
    models::{Avatar, AvatarId, UserId, UserIdentity, DEFAULT_AVATAR_NAME},
    ports::inbound::AvatarService,
    AvatarError,
};
