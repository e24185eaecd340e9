use std::sync::Arc;

use bevy_ecs::prelude::World;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::clock::SimulationClock;
use crate::ecs::{ActiveRoutes, Position};
use crate::error::EngineResult;
use crate::narrative::NarrativeLog;
use crate::network::RoadNetwork;
use crate::routing::{build_route_provider, RouteProviderResource};
use crate::scoring::{build_scoring_policy, ScoringPolicyResource};
use crate::systems::dispatch::DispatchOutcomes;
use crate::telemetry::DispatchTelemetry;

use super::city::CityDefinition;
use super::params::EngineParams;
use super::{
    RoadNetworkResource, ScenarioRng, ScenarioState, ScenarioTemplates, SimulationEnabled,
};

/// Populate `world` with every resource and responder the engine needs.
///
/// Fails with a configuration error when the params or the city are invalid;
/// the world is left untouched in that case.
pub fn build_engine(
    world: &mut World,
    params: EngineParams,
    city: CityDefinition,
) -> EngineResult<()> {
    params.validate()?;
    city.validate()?;
    let network = Arc::new(RoadNetwork::from_definition(&city.network)?);

    world.insert_resource(SimulationClock::default());
    world.insert_resource(SimulationEnabled(params.start_enabled));
    world.insert_resource(ScenarioState::default());
    world.insert_resource(ScenarioRng(StdRng::seed_from_u64(params.seed)));
    world.insert_resource(ScenarioTemplates(city.scenarios));
    world.insert_resource(NarrativeLog::with_capacity(params.log_capacity));
    world.insert_resource(DispatchTelemetry::default());
    world.insert_resource(DispatchOutcomes::default());
    world.insert_resource(ActiveRoutes::default());

    let route_provider = build_route_provider(&params.routing, Arc::clone(&network));
    world.insert_resource(RouteProviderResource(route_provider));
    world.insert_resource(ScoringPolicyResource::new(build_scoring_policy(
        &params.scoring,
        city.capabilities,
    )));
    world.insert_resource(RoadNetworkResource(Arc::clone(&network)));

    for spec in &city.responders {
        world.spawn((spec.to_component(), Position(spec.position)));
    }

    let summary = format!(
        "{} dispatch grid online: {} units, {} intersections, {} roads",
        city.name,
        city.responders.len(),
        network.len(),
        network.edge_count()
    );
    world.insert_resource(params);
    world.resource_mut::<NarrativeLog>().info(0, summary);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Responder;
    use crate::error::EngineError;
    use crate::network::RoadNode;

    #[test]
    fn build_spawns_the_roster() {
        let mut world = World::new();
        build_engine(&mut world, EngineParams::default(), CityDefinition::koramangala())
            .expect("engine");

        let mut query = world.query::<(&Responder, &Position)>();
        let mut ids: Vec<String> = query.iter(&world).map(|(r, _)| r.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["o1", "o2", "o3", "o4", "o5"]);
        assert!(world.resource::<SimulationEnabled>().0);
        assert_eq!(world.resource::<NarrativeLog>().len(), 1);
    }

    #[test]
    fn invalid_network_is_a_configuration_error() {
        let mut city = CityDefinition::koramangala();
        city.network.nodes.push(RoadNode::new("StJohns", "Duplicate", 0.0, 0.0));

        let mut world = World::new();
        let result = build_engine(&mut world, EngineParams::default(), city);
        assert!(matches!(result, Err(EngineError::Configuration(_))));
        assert!(world.get_resource::<SimulationClock>().is_none());
    }
}
