use log::info;

use packed::{component, EcsError, SystemGroup, World};

const TICKS: usize = 10;
const DELTA_TIME: f32 = 1.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Translation {
    velocity: (f32, f32),
    acceleration: (f32, f32),
}

component!(Position, Translation);

fn translate(world: &mut World, delta_time: f32) {
    let moving = match world.query::<(Position, Translation)>() {
        Ok(moving) => moving,
        Err(err) => {
            log::error!("cannot query moving entities: {}", err);
            return;
        }
    };

    for id in moving {
        let translation = world.get_mut::<Translation>(id);
        translation.velocity.0 += translation.acceleration.0 * delta_time;
        translation.velocity.1 += translation.acceleration.1 * delta_time;
        let velocity = translation.velocity;

        let position = world.get_mut::<Position>(id);
        position.x += velocity.0 * delta_time;
        position.y += velocity.1 * delta_time;
        println!("entity {}: ({}, {})", id.index(), position.x, position.y);
    }
}

fn main() -> Result<(), EcsError> {
    env_logger::init();

    let mut world = World::with_capacity::<(Position, Translation)>(16)?;

    // One entity built up component by component, one created whole, and a
    // static one which the system should skip.
    let rocket = world.create::<(Position,)>()?;
    world.attach::<Translation>(rocket)?;
    world.get_mut::<Translation>(rocket).acceleration = (0.0, 1.0);

    let drifter = world.create::<(Position, Translation)>()?;
    world.get_mut::<Translation>(drifter).velocity = (1.0, 0.0);

    world.create::<(Position,)>()?;

    world.refactor();
    info!("world: {} entities in {} groups", world.len(), world.groups().len());

    let mut systems = SystemGroup::new();
    systems.insert(translate);

    for tick in 0..TICKS {
        info!("tick {}", tick);
        systems.update(&mut world, DELTA_TIME);
    }

    Ok(())
}
