//! The simulation harness: wires clock, market, registry and agents
//! for one run.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Tick 0: every agent enrolls on its default tariffs.
//!   2. Each tick: agents step in registration order, strictly
//!      serialized, so a customer's registry mutations are visible to
//!      every later read in the same tick.
//!
//! RULES:
//!   - The registry is the only shared mutable state.
//!   - All randomness flows through the RngBank.
//!   - Everything the engine observes is recorded in the event log.

use crate::{
    clock::SimClock,
    config::SimConfig,
    customer::{CustomerAgent, CustomerInfo},
    error::SimResult,
    event::SimEvent,
    market::SimTariffMarket,
    registry::SubscriptionRegistry,
    rng::{ComponentSlot, RngBank},
    selector::RandomTariffSelector,
    types::{CustomerId, RunId, TariffId},
};
use chrono::{DateTime, Utc};

pub struct SimEngine {
    pub run_id:   RunId,
    pub clock:    SimClock,
    pub rng_bank: RngBank,
    pub market:   SimTariffMarket,
    pub registry: SubscriptionRegistry,
    agents:       Vec<CustomerAgent>,
    events:       Vec<SimEvent>,
    seed:         u64,
    started_at:   DateTime<Utc>,
    enrolled:     bool,
}

impl SimEngine {
    /// Build a fully wired engine: tariffs published, defaults
    /// designated, one agent per configured customer.
    pub fn build(run_id: RunId, seed: u64, config: &SimConfig) -> Self {
        let rng_bank = RngBank::new(seed);
        let mut market = SimTariffMarket::new();
        for t in &config.tariffs {
            if t.is_default {
                market.publish_default(&t.broker, t.power_type, t.rate, t.min_duration, t.expiration);
            } else {
                market.publish(&t.broker, t.power_type, t.rate, t.min_duration, t.expiration);
            }
        }

        let agents = config
            .customers
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let mut info = CustomerInfo::new(CustomerId(i as u64 + 1), &c.name, c.population);
                info.power_types = c.power_types.clone();
                if let Some(cap) = c.upper_power_cap {
                    info.upper_power_cap = cap;
                }
                if let Some(cap) = c.lower_power_cap {
                    info.lower_power_cap = cap;
                }
                if let Some(rate) = c.carbon_emission_rate {
                    info.carbon_emission_rate = rate;
                }
                let policy = RandomTariffSelector::new(
                    rng_bank.for_agent(ComponentSlot::TariffSelection, i),
                );
                CustomerAgent::new(info, Box::new(policy))
            })
            .collect();

        Self {
            clock: SimClock::new(run_id.clone()),
            rng_bank,
            market,
            registry: SubscriptionRegistry::new(),
            agents,
            events: Vec::new(),
            seed,
            started_at: Utc::now(),
            run_id,
            enrolled: false,
        }
    }

    /// A fresh run identifier for the given seed.
    pub fn fresh_run_id(seed: u64) -> RunId {
        format!("run-{seed}-{}", uuid::Uuid::new_v4().simple())
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn agent(&mut self, index: usize) -> &mut CustomerAgent {
        &mut self.agents[index]
    }

    /// Ids of all configured customers, in registration order.
    pub fn customer_ids(&self) -> Vec<CustomerId> {
        self.agents.iter().map(|a| a.id()).collect()
    }

    /// Everything recorded so far, in emission order.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Advance one tick: serialized agent steps, revocation recovery
    /// included.
    pub fn tick(&mut self) -> SimResult<Vec<SimEvent>> {
        assert!(!self.clock.paused, "tick() called on paused engine");

        let current_tick = self.clock.advance();
        let mut tick_events = vec![SimEvent::TickStarted { tick: current_tick }];

        let Self {
            agents,
            market,
            registry,
            ..
        } = self;
        for agent in agents.iter_mut() {
            let new_events = agent.step(current_tick, market, registry)?;
            tick_events.extend(new_events);
        }

        tick_events.push(SimEvent::TickCompleted { tick: current_tick });
        self.record(&tick_events)?;
        Ok(tick_events)
    }

    /// Run n ticks in a loop. Performs tick-0 default enrollment on the
    /// first call.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<()> {
        if !self.enrolled {
            self.enroll_defaults()?;
        }
        self.clock.resume();
        for _ in 0..n {
            self.tick()?;
        }
        self.clock.pause();
        Ok(())
    }

    /// Full switch for one agent via its selection policy, recorded as
    /// a TariffSwitched event.
    pub fn policy_switch(
        &mut self,
        agent_index: usize,
        old_tariff: TariffId,
    ) -> SimResult<SimEvent> {
        let tick = self.clock.current_tick;
        let Self {
            agents,
            market,
            registry,
            ..
        } = self;
        let agent = &mut agents[agent_index];
        let customer = agent.id();
        let count = registry
            .find_by_customer_and_tariff(customer, old_tariff)
            .map(|s| s.customers_committed())
            .unwrap_or(0);
        let new_tariff = agent.change_subscription(market, registry, old_tariff)?;
        let event = SimEvent::TariffSwitched {
            tick,
            customer,
            from: old_tariff,
            to: new_tariff,
            count,
        };
        self.record(std::slice::from_ref(&event))?;
        Ok(event)
    }

    /// Reset subscription state for another run on the same wiring.
    pub fn recycle(&mut self) {
        self.registry.recycle();
        self.events.clear();
        self.clock = SimClock::new(self.run_id.clone());
        self.enrolled = false;
    }

    fn enroll_defaults(&mut self) -> SimResult<()> {
        let init = SimEvent::RunInitialized {
            run_id: self.run_id.clone(),
            seed: self.seed,
        };
        self.record(std::slice::from_ref(&init))?;

        let Self {
            agents,
            market,
            registry,
            ..
        } = self;
        let mut enroll_events = Vec::new();
        for agent in agents.iter_mut() {
            agent.subscribe_default(market, registry)?;
            for sub in registry.find_by_customer(agent.id()) {
                enroll_events.push(SimEvent::DefaultEnrolled {
                    tick: 0,
                    customer: sub.customer(),
                    tariff: sub.tariff(),
                    count: sub.customers_committed(),
                });
            }
        }
        self.record(&enroll_events)?;
        self.enrolled = true;
        Ok(())
    }

    fn record(&mut self, events: &[SimEvent]) -> SimResult<()> {
        for event in events {
            log::debug!("event: {}", serde_json::to_string(event)?);
            self.events.push(event.clone());
        }
        Ok(())
    }
}
