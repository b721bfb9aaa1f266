//! Concrete component implementations, one per [`ComponentFamily`].

mod actor;
mod collidable;
mod damageable;
mod inventory;
mod light;
mod renderable;
mod transform;
mod velocity;

pub use actor::ActorComponent;
pub use collidable::CollidableComponent;
pub use damageable::DamageableComponent;
pub use inventory::InventoryComponent;
pub use light::LightComponent;
pub use renderable::RenderableComponent;
pub use transform::TransformComponent;
pub use velocity::VelocityComponent;

use crate::component::Component;
use crate::family::ComponentFamily;

/// Instantiate a default component of the given family.
///
/// Prototype-declared initial values are applied afterwards via
/// [`Component::handle_state`] with sequence 0.
#[must_use]
pub fn instantiate(family: ComponentFamily) -> Box<dyn Component> {
    match family {
        ComponentFamily::Transform => Box::new(TransformComponent::default()),
        ComponentFamily::Velocity => Box::new(VelocityComponent::default()),
        ComponentFamily::Collidable => Box::new(CollidableComponent::default()),
        ComponentFamily::Renderable => Box::new(RenderableComponent::default()),
        ComponentFamily::Inventory => Box::new(InventoryComponent::default()),
        ComponentFamily::Light => Box::new(LightComponent::default()),
        ComponentFamily::Damageable => Box::new(DamageableComponent::default()),
        ComponentFamily::Actor => Box::new(ActorComponent::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instantiate_matches_family() {
        for family in ComponentFamily::ALL {
            let component = instantiate(family);
            assert_eq!(component.family(), family);
        }
    }
}
