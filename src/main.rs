use anyhow::Context;
use itertools::Itertools;
use log::LevelFilter;
use spritegrid::components::Name;
use spritegrid::input::{GridMover, InputEvent};
use spritegrid::loader::{load_level_from_file, load_sprites_from_file};
use spritegrid::misc::{Direction, init_logger};
use spritegrid::{EntityId, Outcome, Scene};
use std::io::BufRead;
use tap::TapOptional;

const DEFAULT_LEVEL_PATH: &str = "data/level.json";
const PLAYER_SPRITE_NAME: &str = "player";

// Headless driver: loads a level, binds the player sprite to the arrow commands, and reads
// commands from stdin one line at a time
//
// usage: spritegrid [level.json] [extra_sprites.json]
fn main() -> anyhow::Result<()> {
    init_logger(LevelFilter::Info)?;

    let mut args = std::env::args().skip(1);
    let level_path = args.next().unwrap_or(DEFAULT_LEVEL_PATH.to_string());
    let mut scene = load_level_from_file(&level_path)?;
    if let Some(sprites_path) = args.next() {
        load_sprites_from_file(&mut scene, sprites_path);
    }

    let player = scene
        .ecs
        .entity_with_name(PLAYER_SPRITE_NAME)
        .with_context(|| format!("level {level_path} has no \"{PLAYER_SPRITE_NAME}\" sprite"))?;
    let mut mover = GridMover::new();
    mover.move_with_buttons(player);

    print_grid(&mut scene)?;
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let words = line.split_whitespace().collect::<Vec<_>>();
        let Some((&command, args)) = words.split_first() else {
            continue;
        };

        match (command, args) {
            ("quit" | "q", _) => {
                mover.process_input(&mut scene, [InputEvent::Quit])?;
                break;
            }

            // Player movement
            ("up" | "w", _) => step(&mut mover, &mut scene, Direction::Up)?,
            ("down" | "s", _) => step(&mut mover, &mut scene, Direction::Down)?,
            ("left" | "a", _) => step(&mut mover, &mut scene, Direction::Left)?,
            ("right" | "d", _) => step(&mut mover, &mut scene, Direction::Right)?,

            ("swap", [a, b]) => {
                if let (Some(a), Some(b)) = (sprite(&scene, a), sprite(&scene, b)) {
                    report(scene.swap(a, b)?);
                }
            }
            ("snap", [name]) => {
                if let Some(id) = sprite(&scene, name) {
                    report(scene.snap(id)?);
                }
            }
            ("place", [name, col, row]) => {
                let (Ok(col), Ok(row)) = (col.parse(), row.parse()) else {
                    log::error!("Invalid cell: {col} {row}");
                    continue;
                };
                if let Some(id) = sprite(&scene, name) {
                    let location = scene.location(col, row)?;
                    report(scene.place(id, location)?);
                }
            }
            ("remove", [name]) => {
                if let Some(id) = sprite(&scene, name) {
                    report(scene.remove(id)?);
                }
            }
            ("destroy", [name]) => {
                if let Some(id) = sprite(&scene, name) {
                    scene.ecs.remove_entity(id);
                }
            }
            ("where", [name]) => {
                if let Some(id) = sprite(&scene, name) {
                    match scene.location_of(id)? {
                        Some(l) => log::info!("{name} is at ({}, {})", l.col(), l.row()),
                        None => log::info!("{name} is not on the grid"),
                    }
                }
            }
            ("show", _) => {}
            _ => {
                log::error!("Unknown command: {line}");
                continue;
            }
        }
        print_grid(&mut scene)?;
    }

    Ok(())
}

fn step(mover: &mut GridMover, scene: &mut Scene, direction: Direction) -> anyhow::Result<()> {
    mover.process_input(scene, [InputEvent::KeyDown(direction), InputEvent::KeyUp(direction)])?;
    Ok(())
}

fn sprite(scene: &Scene, name: &str) -> Option<EntityId> {
    scene.ecs.entity_with_name(name).tap_none(|| log::error!("No sprite named {name}"))
}

fn report(outcome: Outcome) {
    match outcome {
        Outcome::Ignored(reason) => log::info!("Nothing happened: {reason:?}"),
        Outcome::Evicted(id) => log::info!("Evicted {id:?}"),
        _ => {}
    }
}

// One character per cell: the first letter of the occupant's name, or '.' when empty
fn print_grid(scene: &mut Scene) -> anyhow::Result<()> {
    let rows = scene.grid()?.rows();
    let columns = scene.grid()?.columns();

    let mut lines = Vec::new();
    for row in 0..rows {
        let mut line = String::new();
        for col in 0..columns {
            let location = scene.location(col, row)?;
            let symbol = scene
                .occupant_at(location)?
                .and_then(|id| scene.ecs.component::<Name>(id).map(|n| n.chars().next()))
                .flatten()
                .unwrap_or('.');
            line.push(symbol);
        }
        lines.push(line);
    }
    println!("{}", lines.iter().join("\n"));
    Ok(())
}
