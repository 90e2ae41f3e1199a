
pub use helpers::{
    local_transport::{LocalTransport, ServerHandle},
    server::{DynamicEntitySpec, SentFrame, StaticEntitySpec, TestServer},
    startup, startup_in_room,
    test_protocol::{
        avatar_walk, crate_walk, protocol, unchanged_walk, ChatEvent, PingEvent, AVATAR_TYPE,
        CRATE_TYPE,
    },
};
