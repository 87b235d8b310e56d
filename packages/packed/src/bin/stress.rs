use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use packed::{component, ComponentRegistry, EcsError, EntityID, Signature, World, WorldConfig};

const CAPACITY: usize = 4096;
const ROUNDS: usize = 64;
const OPS_PER_ROUND: usize = 2048;

#[derive(Debug, Clone, Copy, Default)]
pub struct Position(f32, f32);
#[derive(Debug, Clone, Copy, Default)]
pub struct Velocity(f32, f32);
#[derive(Debug, Clone, Copy, Default)]
pub struct Health(u32);
#[derive(Debug, Clone, Copy, Default)]
pub struct Tag;

component!(Position, Velocity, Health, Tag);

/// Treat a full world as a normal outcome of the churn.
fn count_full(result: Result<EntityID, EcsError>) -> Result<usize, EcsError> {
    match result {
        Ok(_) => Ok(0),
        Err(EcsError::CapacityExceeded { .. }) => Ok(1),
        Err(err) => Err(err),
    }
}

fn main() -> Result<(), EcsError> {
    env_logger::init();

    let seed = std::env::args().nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(26);
    let mut rng = StdRng::seed_from_u64(seed);

    let registry = ComponentRegistry::new()
        .with::<Position>()?
        .with::<Velocity>()?
        .with::<Health>()?
        .with::<Tag>()?;
    let mut world = World::new(registry, WorldConfig::with_capacity(CAPACITY))?;
    let kinds = world.registry().len() as u8;

    let mut full = 0;
    for round in 0..ROUNDS {
        for _ in 0..OPS_PER_ROUND {
            match rng.gen_range(0..16) {
                0..=7 => {
                    let signature = Signature::from_bits(rng.gen_range(1..(1 << kinds)));
                    full += count_full(world.create_with_signature(signature))?;
                }
                8..=12 if !world.is_empty() => {
                    let id = EntityID::new(rng.gen_range(0..world.len()));
                    world.destroy(id);
                }
                13 if !world.is_empty() => {
                    let id = EntityID::new(rng.gen_range(0..world.len()));
                    world.attach::<Tag>(id)?;
                }
                14 if !world.is_empty() => {
                    let id = EntityID::new(rng.gen_range(0..world.len()));
                    world.detach::<Velocity>(id)?;
                }
                _ if !world.is_empty() => {
                    let id = EntityID::new(rng.gen_range(0..world.len()));
                    full += count_full(world.clone_entity(id))?;
                }
                _ => {}
            }
        }

        if let Err(err) = world.check_invariants() {
            panic!("round {}: {}", round, err);
        }

        if round % 8 == 7 {
            world.defragment();
            if let Err(err) = world.check_invariants() {
                panic!("round {} after defragment: {}", round, err);
            }
        }

        debug!("round {}: {} entities in {} groups", round, world.len(), world.groups().len());
    }

    info!("finished with {} entities in {} groups ({} creations hit capacity)",
          world.len(), world.groups().len(), full);
    println!("world: {} entities, {} groups", world.len(), world.groups().len());
    Ok(())
}
