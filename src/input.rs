use crate::ecs::EntityId;
use crate::grid::Outcome;
use crate::misc::Direction;
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Direction),
    KeyUp(Direction),
    Quit,
}

/// Moves one sprite a cell at a time with the directional keys
#[derive(Default)]
pub struct GridMover {
    pub target: Option<EntityId>,
}

impl GridMover {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_with_buttons(&mut self, id: EntityId) {
        self.target = Some(id);
    }

    /// Handle events in order. Returns false once a quit event is seen
    ///
    /// Events after a quit are dropped. Every key press is one step, so holding a key doesn't
    /// repeat; whoever produces the events decides about repeat.
    pub fn process_input<I>(&mut self, scene: &mut Scene, events: I) -> anyhow::Result<bool>
    where
        I: IntoIterator<Item = InputEvent>,
    {
        for event in events {
            match event {
                InputEvent::Quit => return Ok(false),

                InputEvent::KeyDown(direction) => {
                    let Some(id) = self.target else {
                        continue;
                    };
                    let (cols, rows) = direction.delta();
                    if let Outcome::Ignored(reason) = scene.move_by(id, cols, rows)? {
                        log::debug!("{id:?} can't move {direction:?}: {reason:?}");
                    }
                }

                InputEvent::KeyUp(_) => {}
            }
        }
        Ok(true)
    }
}
