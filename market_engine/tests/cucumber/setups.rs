use cucumber::given;

use crate::cucumber::{world::MarketSystem, MarketWorld};

#[given("a fresh marketplace")]
async fn fresh_database(world: &mut MarketWorld) {
    let system = MarketSystem::new().await;
    world.system = Some(system);
}
