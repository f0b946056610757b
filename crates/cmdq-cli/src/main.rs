use std::sync::Arc;

use cmdq_core::observability::init_tracing;
use cmdq_core::ports::InMemoryFailureSink;
use cmdq_core::ship::{
    BurnFuelCommand, CheckFuelCommand, MoveCommand, RotateAndChangeVelocity, SpaceShip, Vector,
    move_with_fuel,
};
use cmdq_core::{CmdqError, CommandQueue, ConcurrentTaskQueue, EngineConfig};

/// Fly two ships through the command queue, then push a few jobs through the
/// concurrent task queue. Failure records are printed as JSON lines.
#[tokio::main]
async fn main() -> Result<(), CmdqError> {
    let config = EngineConfig::default().with_env_overrides()?;
    init_tracing(&config.log_filter);

    // (A) command queue: one ship with enough fuel, one without
    let sink = Arc::new(InMemoryFailureSink::new());
    let mut queue = CommandQueue::builder()
        .config(config.clone())
        .sink(sink.clone())
        .build()?;

    let mut fueled = SpaceShip::new(Vector::new(12.0, 5.0), 0.0, 10.0);
    fueled.set_velocity(Vector::new(-7.0, 3.0));
    let fueled = fueled.shared();

    let mut stranded = SpaceShip::new(Vector::ZERO, 0.0, 3.0);
    stranded.set_velocity(Vector::new(1.0, 0.0));
    let stranded = stranded.shared();

    queue.enqueue(CheckFuelCommand::new(fueled.clone(), 5.0));
    queue.enqueue(BurnFuelCommand::new(fueled.clone(), 5.0));
    queue.enqueue(MoveCommand::new(fueled.clone()));
    queue.enqueue(RotateAndChangeVelocity::new(fueled.clone(), 90.0));
    queue.enqueue(move_with_fuel(stranded.clone(), 5.0));

    // draining is synchronous; keep it off the async executor
    let (queue, report) = tokio::task::spawn_blocking(move || {
        let report = queue.process_all();
        (queue, report)
    })
    .await
    .map_err(|e| CmdqError::Join(e.to_string()))?;
    drop(queue);

    tracing::info!(?report, "command queue drained");
    for record in sink.records() {
        match serde_json::to_string(&record) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "failed to encode failure record"),
        }
    }

    // (B) concurrent task queue: soft stop drains everything queued
    let mut tasks = ConcurrentTaskQueue::with_config(&config);
    for n in 1..=3 {
        tasks.add_task(move || {
            tracing::info!(task = n, "working");
            Ok(())
        })?;
    }
    tasks.add_task(|| Err("simulated task failure".into()))?;
    tasks.add_operation(MoveCommand::new(fueled.clone()))?;
    tasks.start()?;
    tasks.soft_stop();

    let worker = tasks.join_async().await?;
    tracing::info!(?worker, "worker finished");

    if let Ok(ship) = fueled.lock() {
        tracing::info!(fuel = ship.fuel(), "fueled ship after run");
    }

    Ok(())
}
