use std::sync::Arc;

use stride_core::{
    gateway::ScriptedTransport, Coach, CoachBuilder, Input, Interaction, Reply, StorageKind,
};
use tempfile::TempDir;

pub const USER: &str = "u1";

/// Helper function to create a test coach on a temporary data directory
pub async fn create_test_coach(storage: StorageKind) -> (TempDir, Arc<ScriptedTransport>, Coach) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let transport = Arc::new(ScriptedTransport::strict());
    let coach = build_coach(&temp_dir, storage, transport.clone()).await;
    (temp_dir, transport, coach)
}

/// Opens a coach on an existing data directory
pub async fn build_coach(
    temp_dir: &TempDir,
    storage: StorageKind,
    transport: Arc<ScriptedTransport>,
) -> Coach {
    CoachBuilder::new()
        .with_data_dir(Some(temp_dir.path()))
        .with_storage(storage)
        .with_transport(transport)
        .build()
        .await
        .expect("Failed to create coach")
}

/// Sends one line as the test user
pub async fn send(coach: &Coach, text: &str) -> Reply {
    let input = Input::parse(text).expect("Failed to parse input");
    coach.handle(Interaction::new(USER, "Ann", input)).await
}
