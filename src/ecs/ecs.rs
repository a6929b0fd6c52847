use crate::components::Name;
use anymap::AnyMap;
use slotmap::{SecondaryMap, SlotMap, new_key_type};
use std::cell::{Ref, RefCell, RefMut};

pub trait Component {
    // Unique name of the component
    // By default, it's the unqualified type name
    fn name() -> &'static str {
        std::any::type_name::<Self>().split("::").last().unwrap_or("?")
    }
}

new_key_type! { pub struct EntityId; }

pub type ComponentMap<C> = SecondaryMap<EntityId, RefCell<C>>;

// Removing an entity only frees its id. Component maps keep the stale entries, but a
// SecondaryMap lookup with a dead id misses, so they are never observed through `component`.
// Code that iterates a component map directly has to check `is_alive` itself.
pub struct Ecs {
    pub entity_ids: SlotMap<EntityId, ()>,
    pub component_maps: AnyMap,
}

impl Ecs {
    pub fn new() -> Self {
        Self { entity_ids: SlotMap::with_key(), component_maps: AnyMap::new() }
    }

    pub fn add_entity(&mut self) -> EntityId {
        self.entity_ids.insert(())
    }

    pub fn remove_entity(&mut self, entity_id: EntityId) {
        self.entity_ids.remove(entity_id);
    }

    pub fn is_alive(&self, entity_id: EntityId) -> bool {
        self.entity_ids.contains_key(entity_id)
    }

    pub fn add_component<C>(&mut self, entity_id: EntityId, component: C)
    where
        C: Component + 'static,
    {
        log::trace!("Adding {} to {entity_id:?}", C::name());
        if let Some(cm) = self.component_maps.get_mut::<ComponentMap<C>>() {
            cm.insert(entity_id, RefCell::new(component));
        } else {
            let mut cm = ComponentMap::<C>::new();
            cm.insert(entity_id, RefCell::new(component));
            self.component_maps.insert(cm);
        }
    }

    pub fn remove_component<C>(&mut self, entity_id: EntityId)
    where
        C: Component + 'static,
    {
        if let Some(cm) = self.component_maps.get_mut::<ComponentMap<C>>() {
            cm.remove(entity_id);
        }
    }

    pub fn component<C>(&self, entity_id: EntityId) -> Option<Ref<'_, C>>
    where
        C: Component + 'static,
    {
        self.live_cell::<C>(entity_id).map(|c| c.borrow())
    }

    pub fn component_mut<C>(&self, entity_id: EntityId) -> Option<RefMut<'_, C>>
    where
        C: Component + 'static,
    {
        self.live_cell::<C>(entity_id).map(|c| c.borrow_mut())
    }

    pub fn entity_with_name(&self, name: &str) -> Option<EntityId> {
        self.component_maps
            .get::<ComponentMap<Name>>()?
            .iter()
            .find(|(id, n)| self.is_alive(*id) && n.borrow().as_str() == name)
            .map(|(id, _)| id)
    }

    fn live_cell<C>(&self, entity_id: EntityId) -> Option<&RefCell<C>>
    where
        C: Component + 'static,
    {
        if !self.is_alive(entity_id) {
            return None;
        }
        self.component_maps.get::<ComponentMap<C>>()?.get(entity_id)
    }
}
