use crate::components::{Name, Position};
use crate::ecs::EntityId;
use crate::grid::Outcome;
use crate::math::CellPos;
use crate::scene::Scene;
use crate::tilemap::TileMap;
use anyhow::Context;
use serde_json::Value;
use std::path::Path;
use tap::TapFallible;

// Level files look like:
//
// {
//   "tilemap": { "name": "meadow", "area_width": 256, "area_height": 192, "scale": 4 },
//   "sprites": [
//     { "name": "player", "cell": { "x": 2, "y": 3 } },
//     { "name": "crate", "position": { "x": 40.0, "y": 72.0 } }
//   ]
// }
//
// "cell" isn't a component. It places the sprite on the grid once its components are loaded.

pub fn load_level_from_file<P>(path: P) -> anyhow::Result<Scene>
where
    P: AsRef<Path>,
{
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("Could not read file: {}", path.as_ref().to_string_lossy()))?;
    load_level_from_json(&json)
        .with_context(|| format!("Invalid level JSON: {}", path.as_ref().to_string_lossy()))
}

pub fn load_level_from_json(json: &str) -> anyhow::Result<Scene> {
    let level: Value = serde_json::from_str(json)?;
    let level = level.as_object().context("level is not an object")?;

    let tilemap_value = level.get("tilemap").context("level has no tilemap")?;
    let tilemap: TileMap =
        serde_json::from_value(tilemap_value.clone()).context("invalid tilemap")?;
    if let Some(scale) = tilemap.scale {
        anyhow::ensure!(scale < i32::BITS, "tilemap scale {scale} is too large");
    }
    log::info!(
        "Loaded tile map {} ({}x{}px)",
        tilemap.name,
        tilemap.area_width,
        tilemap.area_height
    );

    let mut scene = Scene::with_tilemap(tilemap);
    if let Some(sprites) = level.get("sprites") {
        load_sprites_from_value(&mut scene, sprites)?;
    }
    Ok(scene)
}

pub fn load_sprites_from_file<P>(scene: &mut Scene, path: P)
where
    P: AsRef<Path>,
{
    let Ok(json) = std::fs::read_to_string(&path) else {
        log::error!("Could not read file: {}", path.as_ref().to_string_lossy());
        return;
    };

    let _ = load_sprites_from_json(scene, &json).tap_err(|err| {
        log::error!(
            "Invalid sprites JSON: {} (err: \"{}\")",
            path.as_ref().to_string_lossy(),
            err
        )
    });
}

pub fn load_sprites_from_json(scene: &mut Scene, json: &str) -> anyhow::Result<Vec<EntityId>> {
    let value: Value = serde_json::from_str(json)?;
    load_sprites_from_value(scene, &value)
}

fn load_sprites_from_value(scene: &mut Scene, value: &Value) -> anyhow::Result<Vec<EntityId>> {
    let sprites_array = value.as_array().context("sprites is not an array")?;

    let mut ids = Vec::new();
    let mut placements = Vec::new();
    for components_value in sprites_array {
        let components_map =
            components_value.as_object().context("sprite is not an object")?;

        // Reuse the existing sprite with the same name, if any
        // Otherwise, generate a new sprite
        let id = components_map
            .get("name")
            .and_then(|v| v.as_str())
            .and_then(|n| scene.ecs.entity_with_name(n))
            .unwrap_or_else(|| scene.ecs.add_entity());
        ids.push(id);

        for (key, val) in components_map {
            if key == "cell" {
                let cell: CellPos = serde_json::from_value(val.clone())
                    .with_context(|| format!("invalid cell: {val}"))?;
                placements.push((id, cell));
                continue;
            }
            load_component_from_json_value(scene, id, key, val);
        }
    }

    // After every sprite exists, so a later sprite on the same cell evicts an earlier one
    // the same way it would in play
    for (id, cell) in placements {
        let location = scene.location(cell.x, cell.y)?;
        match scene.place(id, location)? {
            Outcome::Ignored(reason) => {
                log::warn!("Sprite {id:?} not placed at ({}, {}): {reason:?}", cell.x, cell.y)
            }
            Outcome::Evicted(other) => {
                log::warn!("Sprite {id:?} evicted {other:?} at ({}, {})", cell.x, cell.y)
            }
            _ => {}
        }
    }

    Ok(ids)
}

pub fn load_component_from_json_value(
    scene: &mut Scene,
    id: EntityId,
    name: &str,
    data: &Value,
) {
    add_component_from_json_value(scene, id, name, data.clone()).unwrap_or_else(|e| {
        log::error!(
            "Invalid JSON component:\nname: {name}\ndata: {}\nerr: \"{e}\"",
            serde_json::to_string_pretty(data).unwrap_or("invalid json".to_string())
        )
    });
}

fn add_component_from_json_value(
    scene: &mut Scene,
    id: EntityId,
    name: &str,
    data: Value,
) -> serde_json::Result<()> {
    // To keep the match arms single line
    use serde_json::from_value as sjfv;

    match name {
        "name" => scene.ecs.add_component(id, sjfv::<Name>(data)?),
        "position" => scene.ecs.add_component(id, sjfv::<Position>(data)?),
        _ => log::error!("Invalid JSON component name: {}", name),
    };
    Ok(())
}
