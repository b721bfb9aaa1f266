//! Movement system — integrates velocity into transforms.

use station_core::ComponentFamily;
use station_core::components::{TransformComponent, VelocityComponent};
use station_core::EntityId;

use crate::entity_manager::EntityManager;
use crate::system::{EntityQuery, EntitySystem, SystemError};

/// Applies linear and angular velocity to every moving entity each tick.
#[derive(Debug, Default)]
pub struct MovementSystem;

impl EntitySystem for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn query(&self) -> EntityQuery {
        EntityQuery::new()
            .with_all(ComponentFamily::Transform)
            .with_all(ComponentFamily::Velocity)
    }

    fn update(
        &mut self,
        entities: &mut EntityManager,
        matched: &[EntityId],
        frame_time: f32,
    ) -> Result<(), SystemError> {
        for &id in matched {
            let Some(velocity) = entities.component::<VelocityComponent>(id, ComponentFamily::Velocity)
            else {
                continue;
            };
            let linear = velocity.linear();
            let angular = velocity.angular();

            if let Some(transform) =
                entities.component_mut::<TransformComponent>(id, ComponentFamily::Transform)
            {
                transform.translate(linear * frame_time);
                if angular != 0.0 {
                    let rotation = transform.rotation() + angular * frame_time;
                    transform.set_rotation(rotation);
                }
            }
        }
        Ok(())
    }
}
