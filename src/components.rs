use crate::ecs::Component;
use crate::math::PixelPos;
use derived_deref::{Deref, DerefMut};
use serde::{Deserialize, Serialize};

// A name is used to refer to sprites from level files and the demo's command line
// The actual non-optional, guaranteed-unique identifier is EntityId
#[derive(Deref, Debug, Clone, Serialize, Deserialize)]
pub struct Name(pub String);
impl Component for Name {}

// Pixel position of the sprite's center on the map. This is the "physical" position, which the
// grid keeps in sync with the cell a sprite is placed on
#[derive(Deref, DerefMut, Default, Clone, Debug, Serialize, Deserialize)]
pub struct Position(pub PixelPos);
impl Component for Position {}
