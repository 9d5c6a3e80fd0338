//! Movement demo: moves entities, drains the health of anything moving,
//! lets resting entities recover, and drops the dead.
//!
//! Usage: `movement_demo [CONFIG_JSON] [TICKS]`
//!
//! `CONFIG_JSON` is an optional path to a [`WorldConfig`] in JSON form; any
//! field left out keeps its default. Set `RUST_LOG` to see more or less.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use demo_components::{Health, Name, Position, Velocity};
use miniecs_component::{Component, EntityId};
use miniecs_world::{QueryEvent, System, TickContext, World, WorldConfig};

const DEFAULT_TICKS: u64 = 5;

/// Health lost per second while moving.
const DECAY_PER_SECOND: f64 = 25.0;

/// Health regained per second while at rest.
const REGEN_PER_SECOND: f64 = 10.0;

/// Frame delta handed to every system.
const DT: f64 = 1.0;

struct Movement;

impl System<TickContext> for Movement {
    fn name() -> &'static str {
        "movement"
    }

    fn update(&mut self, world: &mut World<TickContext>, ctx: &TickContext) {
        let moving = world.create_query(&[Position::kind(), Velocity::kind()]);
        let ids: Vec<EntityId> = world
            .query(moving)
            .map(|q| q.entities().cloned().collect())
            .unwrap_or_default();

        for id in &ids {
            let Some(mut entity) = world.entity_mut(id) else {
                continue;
            };
            let Some(velocity) = entity.get_component::<Velocity>().copied() else {
                continue;
            };
            if let Some(position) = entity.get_component_mut::<Position>() {
                position.advance(&velocity, ctx.dt);
            }
        }
        info!(tick = world.tick_id(), count = ids.len(), "moved entities");
    }
}

struct Decay;

impl System<TickContext> for Decay {
    fn name() -> &'static str {
        "decay"
    }

    fn update(&mut self, world: &mut World<TickContext>, ctx: &TickContext) {
        let living = world.create_query(&[Health::kind()]);
        let ids: Vec<EntityId> = world
            .query(living)
            .map(|q| q.entities().cloned().collect())
            .unwrap_or_default();

        for id in &ids {
            let alive = world
                .entity_mut(id)
                .and_then(|mut entity| {
                    let resting = entity
                        .get_component::<Velocity>()
                        .is_none_or(|v| *v == Velocity::ZERO);
                    let health = entity.get_component_mut::<Health>()?;
                    if resting {
                        health.heal(REGEN_PER_SECOND * ctx.dt);
                    } else {
                        health.damage(DECAY_PER_SECOND * ctx.dt);
                    }
                    Some(health.is_alive())
                })
                .unwrap_or(true);
            if !alive && world.remove_entity(id).is_ok() {
                info!(tick = world.tick_id(), entity = %id, "entity died");
            }
        }
    }
}

fn load_config(path: &Path) -> Result<WorldConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading world config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing world config {}", path.display()))
}

fn spawn(world: &mut World<TickContext>) -> Result<()> {
    let mut tired = Health::full(80.0);
    tired.damage(50.0);

    world
        .add_entity()?
        .add_component(Name::new("runner"))
        .add_component(Position::new(0.0, 0.0))
        .add_component(Velocity::new(1.0, 0.5))
        .add_component(Health::full(100.0));
    world
        .add_entity()?
        .add_component(Name::new("sprinter"))
        .add_component(Position::new(5.0, 5.0))
        .add_component(Velocity::new(-3.0, 0.0))
        .add_component(Health::full(40.0));
    world
        .add_entity()?
        .add_component(Name::new("rock"))
        .add_component(Position::new(2.0, -1.0));
    world
        .add_entity()?
        .add_component(Name::new("sleeper"))
        .add_component(Position::new(-4.0, 2.0))
        .add_component(Velocity::ZERO)
        .add_component(tired);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("movement_demo=info".parse()?)
                .add_directive("miniecs_world=debug".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_config(Path::new(&path))?,
        None => WorldConfig::default(),
    };
    let ticks = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("invalid tick count {raw:?}"))?,
        None => DEFAULT_TICKS,
    };

    let mut world = World::<TickContext>::with_config(config);
    world.register_system(Movement);
    world.register_system(Decay);

    let living = world.create_query(&[Health::kind()]);
    if let Some(query) = world.query_mut(living) {
        query.subscribe(|event| match event {
            QueryEvent::Matched(id) => info!(entity = %id, "gained health"),
            QueryEvent::Unmatched(id) => info!(entity = %id, "lost health"),
        });
    }

    spawn(&mut world)?;
    let kinds: Vec<String> = world.component_kinds().map(|k| k.to_string()).collect();
    info!(
        entities = world.entity_count(),
        kinds = %kinds.join(","),
        ticks,
        "movement demo starting"
    );

    let ctx = TickContext::new(DT);
    for _ in 0..ticks {
        let summary = world.tick(&ctx)?;
        info!(
            tick = summary.tick_id,
            systems = summary.systems_run,
            purged = summary.purged,
            remaining = world.entity_count(),
            "tick finished"
        );
    }

    for id in world.entity_ids() {
        let Some(entity) = world.entity(id) else {
            continue;
        };
        let name = entity.get_component::<Name>().map_or("?", |n| n.value.as_str());
        if let Some(position) = entity.get_component::<Position>() {
            info!(entity = %id, name, x = position.x, y = position.y, "final position");
        }
    }

    Ok(())
}
