use paige_model_client::NoopModelClient;
use paige_memory_store::NoopMemoryStore;
use tokio::sync::broadcast;

use super::*;

#[tokio::test]
async fn coach_stage_surfaces_noop_client_schema_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let action_log = Arc::new(ActionLogStore::open(dir.path()).expect("open"));
    let memory_store: Arc<dyn MemoryStore> = Arc::new(NoopMemoryStore::new());
    let model_client: Arc<dyn ModelClient> = Arc::new(NoopModelClient);
    let (tx, _rx) = broadcast::channel(8);

    let pipeline = CoachingPipeline::new(action_log, memory_store, model_client, tx);
    let phase = Phase::new(1, "Understand");

    let err = pipeline.coach(&phase, 1).await.unwrap_err();
    assert!(matches!(err, PaigeError::ModelSchema { .. }));

    pipeline.shutdown();
}
