//! tariff-runner: headless runner for the tariff subscription core.
//!
//! Usage:
//!   tariff-runner --seed 12345 --ticks 48
//!   tariff-runner --seed 12345 --ticks 96 --data-dir ./data --revoke-at 36

use anyhow::Result;
use tariffsim_core::{
    config::SimConfig,
    engine::SimEngine,
    event::SimEvent,
    market::TariffMarket,
    tariff::PowerType,
    types::TariffId,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 48u64);
    let switch_every = parse_arg(&args, "--switch-every", 24u64);
    let revoke_at = parse_arg(&args, "--revoke-at", 36u64);
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str());

    let config = match data_dir {
        Some(dir) => SimConfig::load(dir)?,
        None => SimConfig::default_demo(),
    };

    let run_id = SimEngine::fresh_run_id(seed);
    println!("tariff-runner");
    println!("  run_id:       {run_id}");
    println!("  seed:         {seed}");
    println!("  ticks:        {ticks}");
    println!("  customers:    {}", config.customers.len());
    println!("  tariffs:      {}", config.tariffs.len());
    println!();

    let mut engine = SimEngine::build(run_id, seed, &config);

    // Scripted scenario: periodic policy switches off the default
    // tariff, one revocation partway through.
    engine.run_ticks(0)?; // tick-0 enrollment
    for tick in 1..=ticks {
        engine.clock.resume();
        engine.tick()?;
        engine.clock.pause();

        if switch_every > 0 && tick % switch_every == 0 {
            run_policy_switches(&mut engine)?;
        }
        if revoke_at > 0 && tick == revoke_at {
            revoke_popular_tariff(&mut engine)?;
        }
    }

    print_summary(&engine);
    Ok(())
}

/// Every agent holding the consumption default moves off it through
/// its selection policy.
fn run_policy_switches(engine: &mut SimEngine) -> Result<()> {
    let Some(default) = default_consumption_tariff(engine) else {
        return Ok(());
    };
    for i in 0..engine.agent_count() {
        let customer = engine.agent(i).id();
        if engine
            .registry
            .find_by_customer_and_tariff(customer, default)
            .is_some()
        {
            let event = engine.policy_switch(i, default)?;
            log::info!("switch: {}", serde_json::to_string(&event)?);
        }
    }
    Ok(())
}

/// Revoke the non-default consumption tariff with the most committed
/// population; its subscribers fall back to the default on the next tick.
fn revoke_popular_tariff(engine: &mut SimEngine) -> Result<()> {
    let default = default_consumption_tariff(engine);
    let candidate = engine
        .market
        .active_tariff_list(PowerType::Consumption)
        .into_iter()
        .filter(|t| Some(t.id) != default)
        .max_by_key(|t| {
            engine
                .registry
                .find_by_tariff(t.id)
                .iter()
                .map(|s| s.customers_committed() as u64)
                .sum::<u64>()
        });
    if let Some(tariff) = candidate {
        engine.market.revoke(tariff.id, None)?;
        println!("revoked {} at tick {}", tariff.id, engine.clock.current_tick);
    }
    Ok(())
}

fn default_consumption_tariff(engine: &SimEngine) -> Option<TariffId> {
    engine
        .market
        .default_tariff(PowerType::Consumption)
        .map(|t| t.id)
}

fn print_summary(engine: &SimEngine) {
    let mut enrollments = 0u64;
    let mut switches = 0u64;
    let mut revocations = 0u64;
    for event in engine.events() {
        match event {
            SimEvent::DefaultEnrolled { .. } => enrollments += 1,
            SimEvent::TariffSwitched { .. } => switches += 1,
            SimEvent::RevocationHandled { .. } => revocations += 1,
            _ => {}
        }
    }

    println!();
    println!("── Summary ──────────────────────────────────");
    println!("  started:              {}", engine.started_at());
    println!("  final tick:           {}", engine.clock.current_tick);
    println!("  events recorded:      {}", engine.events().len());
    println!("  default enrollments:  {enrollments}");
    println!("  tariff switches:      {switches}");
    println!("  revocations handled:  {revocations}");
    println!("  live subscriptions:   {}", engine.registry.subscription_count());
    println!();
    println!("── Subscriptions ────────────────────────────");
    for customer in engine.customer_ids() {
        for sub in engine.registry.find_by_customer(customer) {
            println!(
                "  {} -> {}: {} committed",
                sub.customer(),
                sub.tariff(),
                sub.customers_committed()
            );
        }
    }
}

fn parse_arg(args: &[String], flag: &str, default: u64) -> u64 {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
