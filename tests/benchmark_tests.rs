//! Performance benchmarks for critical game systems

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use server::actions;
use server::broadcast::{BroadcastBus, Outbound};
use server::game::GameState;
use server::tick;
use server::world::WorldStore;
use shared::{ActionRequest, ClientMessage, ServerEvent, BLOCK_COLLISION_RADIUS};
use std::time::Instant;
use tokio::sync::mpsc;

fn walled_world(blocks: usize) -> WorldStore {
    let mut world = WorldStore::new();
    for i in 0..blocks as i32 {
        world.place_block(-1480 + i * 40, 200);
    }
    world
}

/// Benchmarks block collision checks against a long wall
#[test]
fn benchmark_block_collision() {
    let world = walled_world(70);
    let mut rng = StdRng::seed_from_u64(1);
    let points: Vec<(f32, f32)> = (0..1000)
        .map(|_| (rng.gen_range(-1500.0..1500.0), rng.gen_range(-1500.0..1500.0)))
        .collect();

    let iterations = 100;
    let start = Instant::now();

    for _ in 0..iterations {
        for &(x, y) in &points {
            let _ = world.collides_with_blocks(x, y, BLOCK_COLLISION_RADIUS);
        }
    }

    let duration = start.elapsed();
    println!(
        "Block collision: {} checks in {:?} ({:.2} ns/check)",
        iterations * points.len(),
        duration,
        duration.as_nanos() as f64 / (iterations * points.len()) as f64
    );

    // 100k checks against 70 blocks should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks move resolution with sliding
#[test]
fn benchmark_move_resolution() {
    let world = walled_world(70);
    let iterations = 50_000;
    let start = Instant::now();

    for i in 0..iterations {
        let x = (i % 3000) as f32 - 1500.0;
        let _ = world.resolve_move((x, 150.0), (x + 5.0, 170.0));
    }

    let duration = start.elapsed();
    println!(
        "Move resolution: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 2000);
}

/// Benchmarks the vitals tick with a full server
#[test]
fn benchmark_vitals_tick() {
    let mut state = GameState::new(64, Some(2));
    for i in 0..64 {
        actions::join(&mut state, &format!("p{}", i));
    }

    let iterations = 1000;
    let start = Instant::now();

    for _ in 0..iterations {
        let _ = tick::vitals_tick(&mut state);
    }

    let duration = start.elapsed();
    println!(
        "Vitals tick (64 players): {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 2000);
}

/// Benchmarks intent resolution on a generated world
#[test]
fn benchmark_action_resolution() {
    let mut state = GameState::generated(8, Some(3));
    actions::join(&mut state, "p1");
    let mut rng = StdRng::seed_from_u64(3);

    let iterations = 20_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let message = ClientMessage::Action(ActionRequest::Mine {
            resource_type: shared::ResourceType::Stone,
            x: rng.gen_range(-1500.0..1500.0),
            y: rng.gen_range(-1500.0..1500.0),
        });
        let _ = actions::handle_message(&mut state, "p1", message, 0);
    }

    let duration = start.elapsed();
    println!(
        "Action resolution: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 5000);
}

/// Benchmarks fan-out of one event to many sessions
#[test]
fn stress_test_broadcast_fanout() {
    let mut bus = BroadcastBus::new();
    let mut receivers = Vec::new();
    for i in 0..64 {
        let (tx, rx) = mpsc::unbounded_channel();
        bus.register(format!("p{}", i), tx);
        receivers.push(rx);
    }

    let iterations = 500;
    let start = Instant::now();

    let mut delivered = 0;
    for i in 0..iterations {
        delivered += bus.dispatch(vec![Outbound::all(ServerEvent::PlayerLeft {
            player_id: format!("ghost{}", i),
        })]);
    }

    let duration = start.elapsed();
    println!(
        "Broadcast fan-out: {} messages in {:?}",
        delivered, duration
    );

    assert_eq!(delivered, iterations * 64);
    assert!(duration.as_millis() < 2000);
}
