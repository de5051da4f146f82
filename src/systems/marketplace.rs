use anyhow::Result;
use rand::Rng;

use crate::{
    engine::{System, SystemContext},
    params::Mode,
    particle::TravelIntent,
    rng::SystemRng,
    world::World,
};

/// Scatter applied around the marketplace point so attendees don't stack.
const TARGET_JITTER: f64 = 0.15;
const HOME_JITTER: f64 = 0.1;

/// Periodic mass-gathering events. On qualifying day boundaries every
/// eligible particle independently decides to attend, stores its home
/// coordinates and walks to the marketplace; attendance timers count down
/// every tick and send expired attendees home.
pub struct MarketplaceSystem;

impl MarketplaceSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MarketplaceSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MarketplaceSystem {
    fn name(&self) -> &str {
        "marketplace"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let params = ctx.params;
        if !params.marketplace_enabled {
            return Ok(());
        }

        for zone in &mut world.zones {
            for p in &mut zone.particles {
                if p.intent == TravelIntent::AtMarket {
                    if p.market_timer > 0 {
                        p.market_timer -= 1;
                    }
                    if p.market_timer == 0 {
                        p.intent = TravelIntent::ReturningHome {
                            x: p.home_x + rng.gen_range(-HOME_JITTER..HOME_JITTER),
                            y: p.home_y + rng.gen_range(-HOME_JITTER..HOME_JITTER),
                        };
                    }
                }
            }
        }

        if !ctx.day_boundary {
            return Ok(());
        }
        let days_since = i64::from(ctx.day) - world.last_marketplace_day;
        if days_since < i64::from(params.marketplace_interval) {
            return Ok(());
        }
        world.last_marketplace_day = i64::from(ctx.day);

        let (mx, my) = match ctx.mode {
            Mode::Simple => (params.marketplace_x, params.marketplace_y),
            Mode::Communities => world.zones[params.marketplace_community.min(8)]
                .bounds
                .center(),
        };

        let mut attending = 0;
        for zone in &mut world.zones {
            for p in &mut zone.particles {
                if !p.quarantined
                    && p.intent == TravelIntent::None
                    && rng.gen::<f64>() < params.marketplace_attendance
                {
                    p.home_x = p.x;
                    p.home_y = p.y;
                    p.market_timer = params.marketplace_duration;
                    p.intent = TravelIntent::ToMarket {
                        x: mx + rng.gen_range(-TARGET_JITTER..TARGET_JITTER),
                        y: my + rng.gen_range(-TARGET_JITTER..TARGET_JITTER),
                    };
                    attending += 1;
                }
            }
        }
        if attending > 0 {
            world.log(format!("marketplace gathering: {attending} traveling"));
        }
        Ok(())
    }
}
